//! Triangle face used by polygon meshes.
//!
//! Intersects the supporting plane first, then keeps the hit only if it
//! lies on the inner side of all three edges.

use kiln_math::{Aabb, Interval, Plane, Ray, Vec3};

/// A single triangle with counter-clockwise vertices.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    vertices: [Vec3; 3],
    plane: Plane,
}

impl Triangle {
    /// Create a new triangle from three vertices. The face normal follows the
    /// right-hand rule over `a -> b -> c`.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        // Degenerate triangles get a zero normal and are never hit
        let normal = (b - a).cross(c - a).normalize_or_zero();
        Self {
            vertices: [a, b, c],
            plane: Plane::new(a, normal),
        }
    }

    /// Equilateral triangle in the XY plane with edge `length`, centered on `center`.
    pub fn equilateral(center: Vec3, length: f32) -> Self {
        let h = length * 3.0f32.sqrt() / 2.0;
        Self::new(
            center + Vec3::new(0.0, 2.0 * h / 3.0, 0.0),
            center + Vec3::new(-length / 2.0, -h / 3.0, 0.0),
            center + Vec3::new(length / 2.0, -h / 3.0, 0.0),
        )
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        self.vertices
    }

    /// Unit face normal.
    pub fn normal(&self) -> Vec3 {
        self.plane.normal
    }

    pub fn bounding_box(&self) -> Aabb {
        let [a, b, c] = self.vertices;
        Aabb::from_points(a.min(b).min(c), a.max(b).max(c))
    }

    /// Ray parameter of the hit, if the ray crosses the triangle strictly inside `ray_t`.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let t = self.plane.hit(ray, ray_t)?;
        let p = ray.at(t);
        let n = self.plane.normal;
        let [a, b, c] = self.vertices;

        let inside = (b - a).cross(p - a).dot(n) >= 0.0
            && (c - b).cross(p - b).dot(n) >= 0.0
            && (a - c).cross(p - c).dot(n) >= 0.0;

        inside.then_some(t)
    }

    /// Barycentric weights of `p` for vertices `b` and `c`, used as texture coordinates.
    pub fn barycentric(&self, p: Vec3) -> (f32, f32) {
        let [a, b, c] = self.vertices;
        let e1 = b - a;
        let e2 = c - a;
        let w = p - a;

        let d11 = e1.dot(e1);
        let d12 = e1.dot(e2);
        let d22 = e2.dot(e2);
        let denom = d11 * d22 - d12 * d12;
        if denom.abs() < f32::EPSILON {
            return (0.0, 0.0);
        }

        let dw1 = w.dot(e1);
        let dw2 = w.dot(e2);
        let u = (d22 * dw1 - d12 * dw2) / denom;
        let v = (d11 * dw2 - d12 * dw1) / denom;
        (u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy_triangle() -> Triangle {
        // Triangle in XY plane at z=-1, facing +Z
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = xy_triangle();
        assert_eq!(tri.normal(), Vec3::Z);

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let t = tri.hit(&ray, Interval::new(0.001, f32::INFINITY)).unwrap();
        assert!((t - 1.0).abs() < 1e-6);

        // Back side is hit too
        let ray = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z, 0.0);
        assert!(tri.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_some());
    }

    #[test]
    fn test_triangle_miss() {
        let tri = xy_triangle();
        let interval = Interval::new(0.001, f32::INFINITY);

        // Outside the edges
        let ray = Ray::new(Vec3::new(0.9, 0.9, 0.0), -Vec3::Z, 0.0);
        assert!(tri.hit(&ray, interval).is_none());

        // Parallel to the plane
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::X, 0.0);
        assert!(tri.hit(&ray, interval).is_none());
    }

    #[test]
    fn test_triangle_vertex_is_inside() {
        let tri = xy_triangle();
        let ray = Ray::new(Vec3::new(-1.0, -1.0, 0.0), -Vec3::Z, 0.0);
        assert!(tri.hit(&ray, Interval::new(0.001, f32::INFINITY)).is_some());
    }

    #[test]
    fn test_degenerate_triangle_never_hits() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        let ray = Ray::new(Vec3::new(0.5, 0.0, 1.0), -Vec3::Z, 0.0);
        assert!(tri.hit(&ray, Interval::UNIVERSE).is_none());
    }

    #[test]
    fn test_barycentric_corners() {
        let tri = xy_triangle();
        let [a, b, c] = tri.vertices();

        assert_eq!(tri.barycentric(a), (0.0, 0.0));
        let (u, v) = tri.barycentric(b);
        assert!((u - 1.0).abs() < 1e-6 && v.abs() < 1e-6);
        let (u, v) = tri.barycentric(c);
        assert!(u.abs() < 1e-6 && (v - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_equilateral_is_centered() {
        let tri = Triangle::equilateral(Vec3::new(1.0, 2.0, 3.0), 2.0);
        let [a, b, c] = tri.vertices();
        let centroid = (a + b + c) / 3.0;

        assert!((centroid - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
        assert!(((a - b).length() - 2.0).abs() < 1e-5);
        assert!(((b - c).length() - 2.0).abs() < 1e-5);
    }
}
