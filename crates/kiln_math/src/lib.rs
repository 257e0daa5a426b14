//! Math types for the kiln path tracer.
//!
//! Vector and matrix types come straight from `glam`; this crate adds the
//! ray-tracing specific pieces on top (intervals, bounding boxes, rays,
//! planes and transform helpers).

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod plane;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use plane::{Plane, PARALLEL_EPSILON};
pub use ray::Ray;
pub use transform::Mat4Ext;

/// Linear RGB color. Channels are nominally in [0, 1] but emitters exceed it.
pub type Color = Vec3;

/// Returns true if every component of `v` is within `1e-8` of zero.
#[inline]
pub fn near_zero(v: Vec3) -> bool {
    const S: f32 = 1e-8;
    v.x.abs() < S && v.y.abs() < S && v.z.abs() < S
}

/// Mirror `v` about the plane with normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract unit vector `uv` through a surface with normal `n`.
///
/// `etai_over_etat` is the ratio of refractive indices on the incoming and
/// outgoing sides.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
