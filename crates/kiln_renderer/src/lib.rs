//! Kiln renderer - CPU path tracing
//!
//! A Monte Carlo path tracer: hittable primitives under a BVH, a small
//! closed set of materials, and a camera with normal, fixed and adaptive
//! pixel sampling. Output goes to a linear [`ImageBuffer`], written as PPM
//! by [`write_ppm`].
//!
//! All randomness is drawn from a caller-supplied generator, so a render
//! is reproducible from its seed.

mod adaptive;
mod bucket;
mod bvh;
mod camera;
mod cube;
mod error;
mod hittable;
mod material;
mod medium;
mod polygon;
mod ppm;
pub mod random;
mod renderer;
mod sphere;
mod transformed;
mod triangle;

pub use adaptive::{sample_adaptive, AdaptiveSample, ADAPTIVE_MAX_DEPTH, ADAPTIVE_THRESHOLD};
pub use bucket::{
    generate_buckets, render_bucket, render_parallel, Bucket, BucketResult, DEFAULT_BUCKET_SIZE,
};
pub use bvh::Bvh;
pub use camera::{Camera, CameraConfig, SamplingMode};
pub use cube::{Cube, CONTAINMENT_EPSILON};
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{
    Dielectric, DiffuseLight, FresnelMode, Isotropic, Lambertian, Material, Metal, Plain,
    ScatterResult, ScatteredRay,
};
pub use medium::ConstantMedium;
pub use polygon::Polygon;
pub use ppm::{quantize, write_ppm, GAMMA_EXPONENT};
pub use renderer::{
    ray_color, render, render_pixel, ImageBuffer, DEPTH_EXHAUSTED_COLOR, SHADOW_ACNE_EPSILON,
};
pub use sphere::Sphere;
pub use transformed::Transformed;
pub use triangle::Triangle;

/// Re-export common math types from kiln_math
pub use kiln_math::{Aabb, Color, Interval, Mat4, Ray, Vec3};
