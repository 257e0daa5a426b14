//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with configurable depth
//! - Energy split over every outgoing ray a material returns
//! - Normal, fixed and adaptive pixel sampling

use std::time::Instant;

use crate::{
    adaptive::sample_adaptive,
    camera::{Camera, SamplingMode},
    hittable::Hittable,
};
use kiln_math::{Color, Interval, Ray};
use rand::RngCore;

/// Closest `t` a bounce may hit, keeping rays off the surface they left.
pub const SHADOW_ACNE_EPSILON: f32 = 0.001;

/// Returned once the bounce budget runs out.
///
/// Full white rather than black: an exhausted path counts as fully lit.
pub const DEPTH_EXHAUSTED_COLOR: Color = Color::ONE;

/// Compute the color seen by a ray.
///
/// Misses return `background`. A hit returns the material's emission plus
/// its attenuation times the weighted sum of every scattered ray's color.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    background: Color,
    rng: &mut dyn RngCore,
) -> Color {
    if depth == 0 {
        return DEPTH_EXHAUSTED_COLOR;
    }

    let Some(rec) = world.hit(ray, Interval::new(SHADOW_ACNE_EPSILON, f32::INFINITY), rng) else {
        return background;
    };

    // Get emission from material (for lights)
    let emission = rec.material.emitted(rec.u, rec.v, rec.p);

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            let mut incoming = Color::ZERO;
            for scattered in &result.scattered {
                incoming += scattered.weight
                    * ray_color(&scattered.ray, world, depth - 1, background, rng);
            }
            emission + result.attenuation * incoming
        }
        // Absorbed
        None => emission,
    }
}

/// Render a single pixel with the camera's sampling mode.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let depth = camera.max_depth();
    let background = camera.background();

    match camera.sampling() {
        SamplingMode::Normal => {
            let ray = camera.get_ray(x, y, rng);
            ray_color(&ray, world, depth, background, rng)
        }
        SamplingMode::SuperSampling => {
            let samples = camera.config().samples_per_pixel;
            let mut pixel_color = Color::ZERO;
            for _ in 0..samples {
                let ray = camera.get_ray(x, y, rng);
                pixel_color += ray_color(&ray, world, depth, background, rng);
            }
            pixel_color / samples as f32
        }
        SamplingMode::Adaptive => sample_adaptive(camera, world, x, y, rng).color,
    }
}

/// Linear-color image, row-major, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Gamma-encoded 8-bit RGB bytes, quantized like the PPM writer.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| [c.x, c.y, c.z])
            .map(crate::ppm::quantize)
            .collect()
    }
}

/// Render the entire scene to an image buffer, one pixel at a time.
pub fn render(camera: &Camera, world: &dyn Hittable, rng: &mut dyn RngCore) -> ImageBuffer {
    let (width, height) = (camera.image_width(), camera.image_height());
    log_render_start(camera, "sequential");
    let start = Instant::now();

    let mut image = ImageBuffer::new(width, height);
    for y in 0..height {
        log::debug!("Scanlines remaining: {}", height - y);
        for x in 0..width {
            let color = render_pixel(camera, world, x, y, rng);
            image.set(x, y, color);
        }
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}

pub(crate) fn log_render_start(camera: &Camera, how: &str) {
    let config = camera.config();
    log::info!(
        "Rendering {}x{} ({}), {:?} sampling, {} spp, depth {}",
        camera.image_width(),
        camera.image_height(),
        how,
        config.sampling,
        config.samples_per_pixel,
        config.max_depth
    );
}
