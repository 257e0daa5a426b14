//! Kiln Core - the scene inputs a render consumes.
//!
//! This crate provides:
//!
//! - **Textures**: solid, checker, image-backed and Perlin-noise color sources
//! - **Meshes**: OBJ ingestion into a flat triangle list
//!
//! Everything here is built once while a scene is assembled and only read
//! afterwards, so all types are `Send + Sync`.

pub mod mesh;
pub mod noise;
pub mod texture;

// Re-export commonly used types
pub use mesh::{load_obj, Mesh, MeshError, MeshResult};
pub use noise::Perlin;
pub use texture::{
    ImageTexture, Interpolation, NoiseTexture, Texture, TextureError, TextureResult, WrapMode,
};
