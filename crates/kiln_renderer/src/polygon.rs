//! Triangle soup sharing one material.

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Triangle,
};
use kiln_core::Mesh;
use kiln_math::{Aabb, Interval, Ray};
use rand::RngCore;

/// A list of triangles tested by brute force.
///
/// Each call scans every face, so large meshes should sit under a BVH at
/// the scene level rather than being tested directly.
pub struct Polygon<M: Material> {
    faces: Vec<Triangle>,
    material: M,
    bbox: Aabb,
}

impl<M: Material> Polygon<M> {
    pub fn new(faces: Vec<Triangle>, material: M) -> Self {
        let bbox = faces.iter().fold(Aabb::EMPTY, |bbox, face| {
            Aabb::surrounding(&bbox, &face.bounding_box())
        });

        Self {
            faces,
            material,
            bbox,
        }
    }

    /// Build from a loaded mesh, one face per index triple.
    pub fn from_mesh(mesh: &Mesh, material: M) -> Self {
        let faces = mesh
            .triangles()
            .map(|[a, b, c]| Triangle::new(a, b, c))
            .collect();
        Self::new(faces, material)
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

impl<M: Material> Hittable for Polygon<M> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let mut closest: Option<(f32, &Triangle)> = None;

        for face in &self.faces {
            let t_max = closest.map_or(ray_t.max, |(t, _)| t);
            if let Some(t) = face.hit(ray, ray_t.with_max(t_max)) {
                closest = Some((t, face));
            }
        }

        let (t, face) = closest?;
        let uv = face.barycentric(ray.at(t));
        Some(HitRecord::new(ray, t, face.normal(), &self.material, uv))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
