//! Affine-transform wrapper around another hittable.

use std::sync::Arc;

use crate::{
    error::{RenderError, RenderResult},
    hittable::{HitRecord, Hittable},
};
use kiln_math::{Aabb, Interval, Mat4, Mat4Ext, Ray};
use rand::RngCore;

/// Places a shared object in the world through an affine transform.
///
/// Rays are taken into the object's local frame with the inverse matrix
/// and hits are mapped back with the forward one. Directions are not
/// renormalized, so `t` is the same in both frames. The bounding box is
/// the box around the eight transformed corners of the local box, which
/// is loose under rotation.
pub struct Transformed {
    object: Arc<dyn Hittable>,
    local_to_world: Mat4,
    world_to_local: Mat4,
    bbox: Aabb,
}

impl Transformed {
    /// Wrap `object` with the `local_to_world` matrix.
    ///
    /// Fails if the matrix cannot be inverted.
    pub fn new(object: Arc<dyn Hittable>, local_to_world: Mat4) -> RenderResult<Self> {
        let world_to_local = local_to_world
            .checked_inverse()
            .ok_or(RenderError::SingularTransform(local_to_world.determinant()))?;
        let bbox = local_to_world.transform_aabb(&object.bounding_box());

        Ok(Self {
            object,
            local_to_world,
            world_to_local,
            bbox,
        })
    }

    pub fn local_to_world(&self) -> Mat4 {
        self.local_to_world
    }

    pub fn world_to_local(&self) -> Mat4 {
        self.world_to_local
    }
}

impl Hittable for Transformed {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local_ray = self.world_to_local.transform_ray(ray);
        let mut rec = self.object.hit(&local_ray, ray_t, rng)?;

        rec.p = self.local_to_world.transform_point3(rec.p);
        rec.normal = self
            .local_to_world
            .transform_normal(rec.normal)
            .normalize_or_zero();

        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cube, Lambertian, Sphere};
    use kiln_math::{Quat, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f32::consts::FRAC_PI_4;

    fn unit_sphere() -> Arc<dyn Hittable> {
        Arc::new(Sphere::new(Vec3::ZERO, 1.0, Lambertian::new(Vec3::ONE)))
    }

    #[test]
    fn test_translated_sphere() {
        let moved = Transformed::new(
            unit_sphere(),
            Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);

        let rec = moved
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 4.0).abs() < 1e-5);
        assert!((rec.p - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
        assert!((rec.normal - Vec3::Z).length() < 1e-5);
        assert!(rec.front_face);
    }

    #[test]
    fn test_scaled_sphere_keeps_world_t() {
        let scaled = Transformed::new(
            unit_sphere(),
            Mat4::from_scale_rotation_translation(
                Vec3::splat(2.0),
                Quat::IDENTITY,
                Vec3::new(0.0, 0.0, -10.0),
            ),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);

        let rec = scaled
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 8.0).abs() < 1e-4);
        assert!((rec.p.z + 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotated_cube_normal_is_unit() {
        let cube: Arc<dyn Hittable> = Arc::new(Cube::new(
            Vec3::ZERO,
            Vec3::ONE,
            Lambertian::new(Vec3::ONE),
        ));
        let rotated = Transformed::new(
            cube,
            Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)) * Mat4::from_rotation_y(FRAC_PI_4),
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::new(0.1, 0.0, 0.0), -Vec3::Z, 0.0);

        let rec = rotated
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        // The diamond's front edge sits sqrt(0.5) in front of its center
        let expected = 5.0 - 0.5f32.sqrt() + 0.1;
        assert!((rec.t - expected).abs() < 1e-3);
        // Cube orientation survives the transform
        assert!(!rec.front_face);
        assert!(rec.normal.dot(ray.direction()) < 0.0);
        assert!((rec.normal.length() - 1.0).abs() < 1e-5);
        assert!(rotated.bounding_box().contains_point(rec.p, 1e-3));
    }

    #[test]
    fn test_singular_transform_is_rejected() {
        let flat = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        assert!(matches!(
            Transformed::new(unit_sphere(), flat),
            Err(RenderError::SingularTransform(_))
        ));
    }

    #[test]
    fn test_bounding_box_covers_rotation() {
        let rotated =
            Transformed::new(unit_sphere(), Mat4::from_rotation_z(FRAC_PI_4)).unwrap();
        let bbox = rotated.bounding_box();
        // Corners of the rotated local box reach sqrt(2)
        assert!((bbox.x.max - 2.0f32.sqrt()).abs() < 1e-4);
        assert!(bbox.contains_point(Vec3::new(1.0, 0.0, 0.0), 0.0));
    }
}
