use crate::{Interval, Ray, Vec3};

/// Below this `|normal . direction|` a ray counts as parallel to a plane.
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// An infinite plane through `point` with (unit) `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal }
    }

    /// Ray parameter where `r` crosses the plane, if it lies strictly inside `ray_t`.
    ///
    /// Rays (nearly) parallel to the plane never hit, whichever side they are on.
    pub fn hit(&self, r: &Ray, ray_t: Interval) -> Option<f32> {
        let denom = self.normal.dot(r.direction());
        if denom.abs() <= PARALLEL_EPSILON {
            return None;
        }

        let t = (self.point - r.origin()).dot(self.normal) / denom;
        ray_t.surrounds(t).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_hit_from_either_side() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Y);
        let all = Interval::new(0.0, f32::INFINITY);

        let down = Ray::new(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, 0.0);
        assert_eq!(plane.hit(&down, all), Some(2.0));

        let up = Ray::new(Vec3::new(3.0, -4.0, 1.0), Vec3::Y, 0.0);
        assert_eq!(plane.hit(&up, all), Some(4.0));
    }

    #[test]
    fn test_plane_parallel_and_out_of_range() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Y);

        let parallel = Ray::new(Vec3::Y, Vec3::X, 0.0);
        assert_eq!(plane.hit(&parallel, Interval::UNIVERSE), None);

        let down = Ray::new(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, 0.0);
        assert_eq!(plane.hit(&down, Interval::new(0.0, 1.0)), None);
        // Endpoints are excluded
        assert_eq!(plane.hit(&down, Interval::new(0.0, 2.0)), None);
    }
}
