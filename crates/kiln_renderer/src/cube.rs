//! Axis-aligned box built from six planes.

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use kiln_math::{Aabb, DVec3, Interval, Plane, Ray, Vec3, PARALLEL_EPSILON};
use rand::RngCore;

/// Slack allowed when checking that a plane hit lies on the cube surface.
pub const CONTAINMENT_EPSILON: f64 = 1e-6;

/// An axis-aligned cube (box) given by its center and edge lengths.
///
/// The surface is six inward-facing planes in the order
/// `[+x, -x, +y, -y, +z, -z]`. A ray hits a face when it crosses that
/// face's plane at a point lying within all six planes, and the nearest
/// such face wins. Intersection runs in double precision so the fixed
/// containment tolerance holds for large coordinates.
///
/// Hit records are oriented against the inward plane normal, so a ray
/// arriving from outside reports `front_face == false` and one leaving
/// from inside reports `true`. The stored normal still faces the ray.
pub struct Cube<M: Material> {
    planes: [Plane; 6],
    material: M,
    bbox: Aabb,
}

impl<M: Material> Cube<M> {
    pub fn new(center: Vec3, size: Vec3, material: M) -> Self {
        let half = size / 2.0;
        let planes = [
            Plane::new(center + Vec3::new(half.x, 0.0, 0.0), -Vec3::X),
            Plane::new(center - Vec3::new(half.x, 0.0, 0.0), Vec3::X),
            Plane::new(center + Vec3::new(0.0, half.y, 0.0), -Vec3::Y),
            Plane::new(center - Vec3::new(0.0, half.y, 0.0), Vec3::Y),
            Plane::new(center + Vec3::new(0.0, 0.0, half.z), -Vec3::Z),
            Plane::new(center - Vec3::new(0.0, 0.0, half.z), Vec3::Z),
        ];

        Self {
            planes,
            material,
            bbox: Aabb::from_points(center - half, center + half),
        }
    }

    fn on_surface(&self, p: DVec3) -> bool {
        let bound = |i: usize| self.planes[i].point.as_dvec3();
        let eps = CONTAINMENT_EPSILON;

        p.x <= bound(0).x + eps
            && p.x >= bound(1).x - eps
            && p.y <= bound(2).y + eps
            && p.y >= bound(3).y - eps
            && p.z <= bound(4).z + eps
            && p.z >= bound(5).z - eps
    }
}

impl<M: Material> Hittable for Cube<M> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let origin = ray.origin().as_dvec3();
        let direction = ray.direction().as_dvec3();
        let t_min = ray_t.min as f64;
        let mut t_max = ray_t.max as f64;
        let mut nearest = None;

        for (i, plane) in self.planes.iter().enumerate() {
            let normal = plane.normal.as_dvec3();
            let denom = normal.dot(direction);
            if denom.abs() <= PARALLEL_EPSILON as f64 {
                continue;
            }

            let t = (plane.point.as_dvec3() - origin).dot(normal) / denom;
            if !(t_min < t && t < t_max) {
                continue;
            }

            if self.on_surface(origin + t * direction) {
                nearest = Some(i);
                // Later planes must beat this one
                t_max = t;
            }
        }

        let face = nearest?;
        let t = t_max as f32;
        if !ray_t.surrounds(t) {
            return None;
        }

        Some(HitRecord::new(
            ray,
            t,
            self.planes[face].normal,
            &self.material,
            (0.0, 0.0),
        ))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
