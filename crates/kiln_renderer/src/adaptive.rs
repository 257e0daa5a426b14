//! Edge-adaptive pixel supersampling.
//!
//! A pixel starts from its four corner samples. While neighbouring corners
//! differ by more than [`ADAPTIVE_THRESHOLD`] the square is split into four
//! quadrants, adding a center sample and four edge midpoints, down to
//! [`ADAPTIVE_MAX_DEPTH`] levels. Sample positions live on a fixed lattice
//! of `2^ADAPTIVE_MAX_DEPTH` steps per pixel side and every lattice point is
//! traced at most once, so quadrants sharing an edge share its samples.

use std::collections::HashMap;

use crate::{camera::Camera, hittable::Hittable, renderer::ray_color};
use kiln_math::{Color, Vec3};
use rand::RngCore;

/// Color distance between neighbouring corners that triggers a split.
pub const ADAPTIVE_THRESHOLD: f32 = 0.2;

/// Number of times a pixel may be split.
pub const ADAPTIVE_MAX_DEPTH: u32 = 5;

const LATTICE_STEPS: u32 = 1 << ADAPTIVE_MAX_DEPTH;

/// Color of one adaptively sampled pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveSample {
    pub color: Color,
    /// Number of rays cast from the camera for this pixel.
    pub samples: usize,
}

/// Adaptively sample pixel (i, j).
pub fn sample_adaptive(
    camera: &Camera,
    world: &dyn Hittable,
    i: u32,
    j: u32,
    rng: &mut dyn RngCore,
) -> AdaptiveSample {
    let (delta_u, delta_v) = camera.pixel_deltas();
    let mut lattice = Lattice {
        camera,
        world,
        upper_left: camera.pixel_center(i, j) - delta_u / 2.0 - delta_v / 2.0,
        step_u: delta_u / LATTICE_STEPS as f32,
        step_v: delta_v / LATTICE_STEPS as f32,
        samples: HashMap::new(),
    };

    let n = LATTICE_STEPS;
    // UL, UR, LL, LR
    let corners = [
        lattice.sample(0, 0, rng),
        lattice.sample(n, 0, rng),
        lattice.sample(0, n, rng),
        lattice.sample(n, n, rng),
    ];
    let color = lattice.refine(0, 0, n, ADAPTIVE_MAX_DEPTH, corners, rng);

    AdaptiveSample {
        color,
        samples: lattice.samples.len(),
    }
}

/// Sample cache over the lattice of one pixel.
struct Lattice<'a> {
    camera: &'a Camera,
    world: &'a dyn Hittable,
    upper_left: Vec3,
    step_u: Vec3,
    step_v: Vec3,
    samples: HashMap<(u32, u32), Color>,
}

impl Lattice<'_> {
    fn sample(&mut self, x: u32, y: u32, rng: &mut dyn RngCore) -> Color {
        if let Some(&color) = self.samples.get(&(x, y)) {
            return color;
        }

        let point = self.upper_left + x as f32 * self.step_u + y as f32 * self.step_v;
        let ray = self.camera.ray_through(point, rng);
        let color = ray_color(
            &ray,
            self.world,
            self.camera.max_depth(),
            self.camera.background(),
            rng,
        );
        self.samples.insert((x, y), color);
        color
    }

    /// Resolve the square at lattice `(x, y)` with side `size`.
    ///
    /// `corners` are in UL, UR, LL, LR order.
    fn refine(
        &mut self,
        x: u32,
        y: u32,
        size: u32,
        depth: u32,
        corners: [Color; 4],
        rng: &mut dyn RngCore,
    ) -> Color {
        let contrast = corners
            .windows(2)
            .any(|pair| (pair[0] - pair[1]).length() > ADAPTIVE_THRESHOLD);
        if !contrast || depth == 0 {
            return corners.iter().sum::<Color>() / 4.0;
        }

        let half = size / 2;
        let (mx, my) = (x + half, y + half);
        let (ex, ey) = (x + size, y + size);

        let center = self.sample(mx, my, rng);
        let top = self.sample(mx, y, rng);
        let left = self.sample(x, my, rng);
        let right = self.sample(ex, my, rng);
        let bottom = self.sample(mx, ey, rng);

        let [ul, ur, ll, lr] = corners;
        let quadrants = [
            self.refine(x, y, half, depth - 1, [ul, top, left, center], rng),
            self.refine(mx, y, half, depth - 1, [top, ur, center, right], rng),
            self.refine(x, my, half, depth - 1, [left, center, ll, bottom], rng),
            self.refine(mx, my, half, depth - 1, [center, right, bottom, lr], rng),
        ];
        quadrants.iter().sum::<Color>() / 4.0
    }
}
