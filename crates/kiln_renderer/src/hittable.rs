//! Ray intersection: the [`Hittable`] trait, hit records and flat lists.

use std::sync::Arc;

use crate::Material;
use kiln_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// Where and how a ray met a surface.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    pub p: Vec3,
    /// Unit normal, facing back toward the ray origin
    pub normal: Vec3,
    pub material: &'a dyn Material,
    /// Surface coordinates for texture lookup
    pub u: f32,
    pub v: f32,
    pub t: f32,
    /// False when the ray arrived from inside the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record for a hit at `t`, orienting `outward_normal` against the ray.
    pub fn new(
        ray: &Ray,
        t: f32,
        outward_normal: Vec3,
        material: &'a dyn Material,
        (u, v): (f32, f32),
    ) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            u,
            v,
            t,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Orient `outward_normal` against the ray and record which side was hit.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Anything a ray can strike.
///
/// The scene graph is immutable once built and shared across render
/// threads, hence the `Send + Sync` bound.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with `t` strictly inside `ray_t`, if any.
    ///
    /// `rng` is only drawn from by stochastic primitives (participating media).
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore)
        -> Option<HitRecord<'a>>;

    /// Box enclosing every point `hit` can return, over the whole shutter.
    fn bounding_box(&self) -> Aabb;
}

impl<H: Hittable + ?Sized> Hittable for Arc<H> {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        (**self).hit(ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Aabb {
        (**self).bounding_box()
    }
}

/// A flat list of hittable objects, tested one after another.
#[derive(Clone, Default)]
pub struct HittableList {
    objects: Vec<Arc<dyn Hittable>>,
    bbox: Aabb,
}

impl HittableList {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Take ownership of `object`.
    pub fn add(&mut self, object: impl Hittable + 'static) {
        self.add_shared(Arc::new(object));
    }

    /// Add an object that may also be referenced elsewhere in the scene.
    pub fn add_shared(&mut self, object: Arc<dyn Hittable>) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Arc<dyn Hittable>] {
        &self.objects
    }

    /// Take the objects out, e.g. to build a BVH over them.
    pub fn into_objects(self) -> Vec<Arc<dyn Hittable>> {
        self.objects
    }
}

impl Hittable for HittableList {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let mut closest = None;

        for object in &self.objects {
            let t_max = closest.as_ref().map_or(ray_t.max, |rec: &HitRecord| rec.t);
            if let Some(rec) = object.hit(ray, ray_t.with_max(t_max), rng) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_set_face_normal() {
        let mat = Lambertian::new(Vec3::ONE);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);

        let front = HitRecord::new(&ray, 1.0, Vec3::Z, &mat, (0.0, 0.0));
        assert!(front.front_face);
        assert_eq!(front.normal, Vec3::Z);

        let back = HitRecord::new(&ray, 1.0, -Vec3::Z, &mat, (0.0, 0.0));
        assert!(!back.front_face);
        assert_eq!(back.normal, Vec3::Z);
    }

    #[test]
    fn test_list_returns_nearest() {
        let mut list = HittableList::new();
        list.add(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0, Lambertian::new(Vec3::X)));
        list.add(Sphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0, Lambertian::new(Vec3::Y)));
        list.add(Sphere::new(Vec3::new(0.0, 0.0, -7.0), 1.0, Lambertian::new(Vec3::Z)));

        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let rec = list
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();

        assert!((rec.t - 3.0).abs() < 1e-5);
        assert_eq!(list.len(), 3);
        assert!(list.bounding_box().contains_point(Vec3::new(0.0, 0.0, -10.5), 0.0));
    }

    #[test]
    fn test_empty_list_misses() {
        let list = HittableList::new();
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        assert!(list.hit(&ray, Interval::UNIVERSE, &mut rng).is_none());
    }
}
