//! Camera for ray generation.

use serde::{Deserialize, Serialize};

use crate::{
    error::{RenderError, RenderResult},
    random::{gen_f32, random_in_unit_disk, sample_square},
};
use kiln_math::{Color, Ray, Vec3};
use rand::RngCore;

/// How many rays are traced per pixel and how they are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// One jittered ray per pixel.
    Normal,
    /// `samples_per_pixel` jittered rays, averaged.
    #[default]
    SuperSampling,
    /// Corner samples refined where neighbouring colors differ.
    Adaptive,
}

/// Everything needed to set up a camera. Plain data, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Ratio of image width over height
    pub aspect_ratio: f32,
    /// Rendered image width in pixels
    pub image_width: u32,
    pub samples_per_pixel: u32,
    /// Maximum number of ray bounces into the scene
    pub max_depth: u32,
    pub background: Color,

    /// Vertical field of view in degrees
    pub vfov: f32,
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,

    /// Variation angle of rays through each pixel, in degrees
    pub defocus_angle: f32,
    /// Distance from `look_from` to the plane of perfect focus
    pub focus_dist: f32,

    /// Ray times are drawn from `[0, shutter_duration)`
    pub shutter_duration: f32,
    pub sampling: SamplingMode,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            samples_per_pixel: 10,
            max_depth: 10,
            background: Color::ZERO,
            vfov: 90.0,
            look_from: Vec3::new(0.0, 0.0, -1.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            defocus_angle: 0.0,
            focus_dist: 10.0,
            shutter_duration: 0.0,
            sampling: SamplingMode::SuperSampling,
        }
    }
}

impl CameraConfig {
    /// Set image shape: aspect ratio and pixel width.
    pub fn with_resolution(mut self, aspect_ratio: f32, image_width: u32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.image_width = image_width;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn with_shutter(mut self, duration: f32) -> Self {
        self.shutter_duration = duration;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingMode) -> Self {
        self.sampling = sampling;
        self
    }
}

/// A configured camera with its viewport derived.
///
/// Built once per render through [`Camera::new`] and never changed
/// afterwards, so it can be shared between render threads.
#[derive(Debug, Clone)]
pub struct Camera {
    config: CameraConfig,
    image_height: u32,

    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Validate `config` and derive the viewport.
    pub fn new(config: CameraConfig) -> RenderResult<Self> {
        validate(&config)?;

        let image_height = ((config.image_width as f32 / config.aspect_ratio) as u32).max(1);
        let center = config.look_from;

        // Calculate viewport dimensions
        let theta = config.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * config.focus_dist;
        let viewport_width = viewport_height * (config.image_width as f32 / image_height as f32);

        // Calculate camera basis vectors
        let w = (config.look_from - config.look_at).normalize_or_zero();
        let u = config.vup.cross(w).normalize_or_zero();
        if w == Vec3::ZERO || u == Vec3::ZERO {
            return Err(RenderError::InvalidCamera(
                "look_from, look_at and vup do not span a view frame".into(),
            ));
        }
        let v = w.cross(u);

        // Viewport edges: right along u, down along -v
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let pixel_delta_u = viewport_u / config.image_width as f32;
        let pixel_delta_v = viewport_v / image_height as f32;

        let viewport_upper_left =
            center - config.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius = config.focus_dist * (config.defocus_angle / 2.0).to_radians().tan();

        Ok(Self {
            image_height,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            u,
            v,
            w,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
            config,
        })
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn image_width(&self) -> u32 {
        self.config.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn max_depth(&self) -> u32 {
        self.config.max_depth
    }

    pub fn background(&self) -> Color {
        self.config.background
    }

    pub fn sampling(&self) -> SamplingMode {
        self.config.sampling
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Camera frame `(u, v, w)`: right, up and backwards.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    /// Offsets from one pixel to the next, rightwards and downwards.
    pub fn pixel_deltas(&self) -> (Vec3, Vec3) {
        (self.pixel_delta_u, self.pixel_delta_v)
    }

    /// Center of pixel (i, j) on the focus plane.
    pub fn pixel_center(&self, i: u32, j: u32) -> Vec3 {
        self.pixel00_loc + (i as f32) * self.pixel_delta_u + (j as f32) * self.pixel_delta_v
    }

    /// Generate a ray through a random point of pixel (i, j).
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);
        let pixel_sample = self.pixel_center(i, j)
            + offset.x * self.pixel_delta_u
            + offset.y * self.pixel_delta_v;

        self.ray_through(pixel_sample, rng)
    }

    /// Generate a ray aimed at `sample` on the focus plane.
    ///
    /// The origin is the camera center, or a point on the defocus disk
    /// when a defocus angle is set. The time is drawn from the shutter window.
    pub fn ray_through(&self, sample: Vec3, rng: &mut dyn RngCore) -> Ray {
        let ray_origin = if self.config.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        let ray_direction = sample - ray_origin;
        let ray_time = self.config.shutter_duration * gen_f32(rng);

        Ray::new(ray_origin, ray_direction, ray_time)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

fn validate(config: &CameraConfig) -> RenderResult<()> {
    let fail = |reason: &str| Err(RenderError::InvalidCamera(reason.to_string()));

    if config.image_width == 0 {
        return fail("image width must be at least 1");
    }
    if !(config.aspect_ratio.is_finite() && config.aspect_ratio > 0.0) {
        return fail("aspect ratio must be positive");
    }
    if !(config.vfov > 0.0 && config.vfov < 180.0) {
        return fail("vertical field of view must be within (0, 180) degrees");
    }
    if !(config.focus_dist.is_finite() && config.focus_dist > 0.0) {
        return fail("focus distance must be positive");
    }
    if config.sampling == SamplingMode::SuperSampling && config.samples_per_pixel == 0 {
        return fail("supersampling needs at least one sample per pixel");
    }
    if config.shutter_duration < 0.0 {
        return fail("shutter duration must not be negative");
    }
    Ok(())
}
