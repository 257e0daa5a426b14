//! Sphere primitive for ray tracing.

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use kiln_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// A sphere, either static or moving along a path of centers.
///
/// A moving sphere sits at `centers[k]` at time `k` and is linearly
/// interpolated in between; times outside the path clamp to its ends.
/// A negative radius flips the normals inward, which models a hollow
/// bubble inside a dielectric.
pub struct Sphere<M: Material> {
    centers: Vec<Vec3>,
    radius: f32,
    material: M,
    bbox: Aabb,
}

impl<M: Material> Sphere<M> {
    /// Create a new static sphere.
    pub fn new(center: Vec3, radius: f32, material: M) -> Self {
        Self::moving(center, std::iter::empty(), radius, material)
    }

    /// Create a sphere starting at `start` (time 0) and passing through each
    /// center of `path` at times 1, 2, ...
    pub fn moving(
        start: Vec3,
        path: impl IntoIterator<Item = Vec3>,
        radius: f32,
        material: M,
    ) -> Self {
        let centers: Vec<Vec3> = std::iter::once(start).chain(path).collect();

        let rvec = Vec3::splat(radius.abs());
        let bbox = centers.iter().fold(Aabb::EMPTY, |bbox, &c| {
            Aabb::surrounding(&bbox, &Aabb::from_points(c - rvec, c + rvec))
        });

        Self {
            centers,
            radius,
            material,
            bbox,
        }
    }

    /// Center of the sphere at `time`.
    pub fn center(&self, time: f32) -> Vec3 {
        let last = self.centers.len() - 1;
        if time >= last as f32 {
            return self.centers[last];
        }
        if time < 0.0 {
            return self.centers[0];
        }

        let step = time.floor() as usize;
        let from = self.centers[step];
        let to = self.centers[step + 1];
        from + (time - step as f32) * (to - from)
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // p is a point on the unit sphere centered at origin
        // theta: angle up from -Y
        // phi: angle around Y axis from -X
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        let u = phi / (2.0 * PI);
        let v = theta / PI;
        (u, v)
    }
}

impl<M: Material> Hittable for Sphere<M> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let center = self.center(ray.time());
        let oc = center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - center) / self.radius;
        Some(HitRecord::new(
            ray,
            root,
            outward_normal,
            &self.material,
            Self::get_sphere_uv(outward_normal),
        ))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grey() -> Lambertian {
        Lambertian::new(Vec3::splat(0.5))
    }

    #[test]
    fn test_sphere_near_and_far_roots() {
        let d = 5.0;
        let r = 1.5;
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -d), r, grey());
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let mut rng = StdRng::seed_from_u64(42);

        let near = sphere
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        assert!((near.t - (d - r)).abs() < 1e-5);
        assert!(near.front_face);
        assert!((near.normal - Vec3::Z).length() < 1e-5);

        // Exclude the near root and the far one is reported
        let far = sphere
            .hit(&ray, Interval::new(d - r + 0.01, f32::INFINITY), &mut rng)
            .unwrap();
        assert!((far.t - (d + r)).abs() < 1e-5);
        assert!(!far.front_face);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey());
        let mut rng = StdRng::seed_from_u64(42);

        // Ray pointing away from sphere
        let ray = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);
        assert!(sphere
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .is_none());

        // Sphere beyond the interval
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        assert!(sphere.hit(&ray, Interval::new(0.001, 0.4), &mut rng).is_none());
    }

    #[test]
    fn test_sphere_uv() {
        let (u, v) = Sphere::<Lambertian>::get_sphere_uv(Vec3::X);
        assert!((u - 0.5).abs() < 1e-6 && (v - 0.5).abs() < 1e-6);

        let (u, v) = Sphere::<Lambertian>::get_sphere_uv(Vec3::Z);
        assert!((u - 0.25).abs() < 1e-6 && (v - 0.5).abs() < 1e-6);

        let (_, v) = Sphere::<Lambertian>::get_sphere_uv(-Vec3::Y);
        assert!(v.abs() < 1e-6);
    }

    #[test]
    fn test_hollow_sphere_flips_normal() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -5.0), -1.0, grey());
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let mut rng = StdRng::seed_from_u64(42);

        let rec = sphere
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 4.0).abs() < 1e-5);
        // The outward normal points into the sphere, so this counts as a back face
        assert!(!rec.front_face);
        assert!(sphere.bounding_box().contains_point(Vec3::new(0.0, 0.0, -6.0), 1e-4));
    }

    #[test]
    fn test_moving_sphere_center() {
        let sphere = Sphere::moving(
            Vec3::ZERO,
            [Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 0.0)],
            0.5,
            grey(),
        );

        assert_eq!(sphere.center(-1.0), Vec3::ZERO);
        assert_eq!(sphere.center(0.5), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(sphere.center(1.25), Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(sphere.center(2.0), Vec3::new(2.0, 4.0, 0.0));
        assert_eq!(sphere.center(9.0), Vec3::new(2.0, 4.0, 0.0));

        // Box covers the whole path
        let bbox = sphere.bounding_box();
        assert!(bbox.contains_point(Vec3::new(-0.5, -0.5, 0.0), 1e-4));
        assert!(bbox.contains_point(Vec3::new(2.5, 4.5, 0.0), 1e-4));
    }

    #[test]
    fn test_moving_sphere_hit_follows_time() {
        let sphere = Sphere::moving(Vec3::new(0.0, 0.0, -5.0), [Vec3::new(10.0, 0.0, -5.0)], 1.0, grey());
        let mut rng = StdRng::seed_from_u64(42);
        let interval = Interval::new(0.001, f32::INFINITY);

        let early = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        assert!(sphere.hit(&early, interval, &mut rng).is_some());

        let late = Ray::new(Vec3::ZERO, -Vec3::Z, 1.0);
        assert!(sphere.hit(&late, interval, &mut rng).is_none());
    }
}
