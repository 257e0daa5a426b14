// Transform utilities for Mat4
//
// glam::Mat4 already provides transform_point3(), transform_vector3() and
// inverse(); these add the ray and bounding box variants the tracer needs.

use crate::{Aabb, Ray};
use glam::{Mat3, Mat4, Vec3};

/// Extension trait for Mat4 with ray-tracing specific transforms.
pub trait Mat4Ext: Sized {
    /// Inverse of the matrix, or `None` if it is singular or not finite.
    fn checked_inverse(&self) -> Option<Self>;

    /// Transform a ray. The direction is transformed as a vector and left
    /// unnormalized, so hit distances `t` mean the same thing on both sides.
    fn transform_ray(&self, ray: &Ray) -> Ray;

    /// Transform a surface normal by this matrix (inverse-transpose of the
    /// upper 3x3). The result is not normalized.
    fn transform_normal(&self, normal: Vec3) -> Vec3;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn checked_inverse(&self) -> Option<Mat4> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = self.inverse();
        inv.is_finite().then_some(inv)
    }

    fn transform_ray(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.transform_point3(ray.origin()),
            self.transform_vector3(ray.direction()),
            ray.time(),
        )
    }

    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        Mat3::from_mat4(*self).inverse().transpose() * normal
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let mut corners = aabb.corners().map(|c| self.transform_point3(c)).into_iter();
        let first = corners.next().unwrap_or(Vec3::ZERO);
        let (lo, hi) = corners.fold((first, first), |(lo, hi), c| (lo.min(c), hi.max(c)));

        Aabb::from_points(lo, hi)
    }
}
