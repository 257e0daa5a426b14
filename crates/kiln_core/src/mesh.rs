//! Triangle mesh geometry loaded from OBJ files.
//!
//! A [`Mesh`] is plain data (positions plus triangle indices). The renderer
//! turns it into a polygon primitive with a material attached.

use std::io::BufRead;
use std::path::Path;

use kiln_math::{Aabb, Vec3};
use thiserror::Error;

/// Errors that can occur while ingesting a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Failed to load OBJ '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Mesh '{0}' has no triangles")]
    Empty(String),

    #[error("Triangle index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("Index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
}

pub type MeshResult<T> = Result<T, MeshError>;

/// A triangle soup: vertex positions and counter-clockwise index triples.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a mesh, checking that every index triple refers to a real vertex.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> MeshResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: positions.len(),
            });
        }

        let bounds = positions
            .iter()
            .fold(Aabb::EMPTY, |b, &p| Aabb::surrounding(&b, &Aabb::from_points(p, p)));

        Ok(Self {
            positions,
            indices,
            bounds,
        })
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Iterate over the triangles as vertex triples, in file order.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|c| {
            [
                self.positions[c[0] as usize],
                self.positions[c[1] as usize],
                self.positions[c[2] as usize],
            ]
        })
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    }
}

/// Load every model in an OBJ file into a single mesh.
///
/// Faces with more than three vertices are triangulated. Normals, texture
/// coordinates and materials in the file are ignored.
pub fn load_obj(path: impl AsRef<Path>) -> MeshResult<Mesh> {
    let path = path.as_ref();
    let name = path.display().to_string();

    let (models, _materials) =
        tobj::load_obj(path, &load_options()).map_err(|source| MeshError::Load {
            path: name.clone(),
            source,
        })?;

    let mesh = merge_models(&name, models)?;
    log::info!(
        "Loaded {}: {} vertices, {} faces",
        name,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Parse OBJ text from a reader. Material libraries are not resolved.
pub fn parse_obj(name: &str, reader: &mut impl BufRead) -> MeshResult<Mesh> {
    let (models, _materials) = tobj::load_obj_buf(reader, &load_options(), |_| {
        Ok(Default::default())
    })
    .map_err(|source| MeshError::Load {
        path: name.to_string(),
        source,
    })?;

    merge_models(name, models)
}

fn merge_models(name: &str, models: Vec<tobj::Model>) -> MeshResult<Mesh> {
    let mut positions = Vec::new();
    let mut indices = Vec::new();

    for model in models {
        let base = positions.len() as u32;
        positions.extend(
            model
                .mesh
                .positions
                .chunks_exact(3)
                .map(|c| Vec3::new(c[0], c[1], c[2])),
        );
        indices.extend(model.mesh.indices.iter().map(|&i| base + i));
    }

    if indices.is_empty() {
        return Err(MeshError::Empty(name.to_string()));
    }

    Mesh::new(positions, indices)
}
