//! Color sources for materials.
//!
//! A [`Texture`] maps a surface lookup `(u, v, p)` to a color. Image textures
//! never fail at lookup time: missing pixel data degrades to fixed debug colors
//! so a render always completes.

use std::path::Path;
use std::sync::Arc;

use kiln_math::{Color, Vec3};
use rand::RngCore;
use thiserror::Error;

use crate::noise::{Perlin, DEFAULT_TURBULENCE_DEPTH};

/// Returned by an image texture that has no pixel data.
pub const MISSING_IMAGE_COLOR: Color = Color::new(0.0, 1.0, 1.0);

/// Returned by a [`WrapMode::ClampToBorder`] lookup outside [0, 1].
pub const BORDER_COLOR: Color = Color::new(1.0, 0.0, 1.0);

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// How out-of-range image coordinates are brought back into [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    Repeat,
    MirroredRepeat,
    #[default]
    ClampToEdge,
    ClampToBorder,
}

/// Pixel filter used for image lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Nearest,
    Linear,
}

/// A procedural or image-backed color source.
#[derive(Debug, Clone)]
pub enum Texture {
    Solid(Color),
    /// 3D checkerboard keyed on the parity of the floored, scaled coordinates.
    Checker {
        inv_scale: f32,
        even: Arc<Texture>,
        odd: Arc<Texture>,
    },
    Image(Arc<ImageTexture>),
    Noise(Arc<NoiseTexture>),
}

impl Texture {
    pub fn solid(color: Color) -> Self {
        Self::Solid(color)
    }

    /// Checkerboard with cells of edge length `scale`.
    pub fn checker(scale: f32, even: Texture, odd: Texture) -> Self {
        Self::Checker {
            inv_scale: 1.0 / scale,
            even: Arc::new(even),
            odd: Arc::new(odd),
        }
    }

    /// Checkerboard alternating between two solid colors.
    pub fn checker_colors(scale: f32, even: Color, odd: Color) -> Self {
        Self::checker(scale, Self::Solid(even), Self::Solid(odd))
    }

    pub fn image(image: ImageTexture) -> Self {
        Self::Image(Arc::new(image))
    }

    pub fn noise(noise: NoiseTexture) -> Self {
        Self::Noise(Arc::new(noise))
    }

    /// Color at surface coordinates `(u, v)` and world point `p`.
    pub fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        match self {
            Self::Solid(color) => *color,
            Self::Checker {
                inv_scale,
                even,
                odd,
            } => {
                let x = (inv_scale * p.x).floor() as i32;
                let y = (inv_scale * p.y).floor() as i32;
                let z = (inv_scale * p.z).floor() as i32;

                if (x + y + z) % 2 == 0 {
                    even.value(u, v, p)
                } else {
                    odd.value(u, v, p)
                }
            }
            Self::Image(image) => image.value(u, v),
            Self::Noise(noise) => noise.value(p),
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

/// Marble-like turbulence: `scale * (1 + sin(s.z + 10 * turb(s)))` with `s = freq * p`.
#[derive(Debug, Clone)]
pub struct NoiseTexture {
    noise: Perlin,
    freq: f32,
    scale: f32,
}

impl NoiseTexture {
    pub fn new(freq: f32, scale: f32, rng: &mut dyn RngCore) -> Self {
        Self {
            noise: Perlin::new(rng),
            freq,
            scale,
        }
    }

    pub fn value(&self, p: Vec3) -> Color {
        let s = self.freq * p;
        let turb = self.noise.turb(s, DEFAULT_TURBULENCE_DEPTH);
        Color::ONE * self.scale * (1.0 + (s.z + 10.0 * turb).sin())
    }
}

/// An RGB image sampled by texture coordinates.
///
/// Pixels are stored row-major, top row first, normalized to [0, 1] without
/// any color-space conversion.
#[derive(Debug, Clone, Default)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 3]>,
    wrap: WrapMode,
    interpolation: Interpolation,
}

impl ImageTexture {
    /// Create a texture from normalized pixel data.
    ///
    /// If `pixels` does not hold exactly `width * height` entries the texture
    /// is treated as having no data.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<[f32; 3]>) -> Self {
        if pixels.len() != width as usize * height as usize {
            log::warn!(
                "Image data has {} pixels, expected {}x{}; using empty texture",
                pixels.len(),
                width,
                height
            );
            return Self::default();
        }
        Self {
            width,
            height,
            pixels,
            ..Self::default()
        }
    }

    /// Load an image, failing on any I/O or decode error.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();

        let pixels = rgb
            .pixels()
            .map(|p| {
                [
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                ]
            })
            .collect();

        log::debug!("Loaded texture: {} ({}x{})", path.display(), width, height);

        Ok(Self::from_pixels(width, height, pixels))
    }

    /// Load an image, degrading to an empty texture (rendered in
    /// [`MISSING_IMAGE_COLOR`]) if it cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("Could not load image '{}': {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn has_data(&self) -> bool {
        !self.pixels.is_empty()
    }

    /// Color at `(u, v)`, with `v = 0` at the bottom of the image.
    pub fn value(&self, u: f32, v: f32) -> Color {
        if !self.has_data() {
            return MISSING_IMAGE_COLOR;
        }

        // Flip V to image rows
        let mut u = u;
        let mut v = 1.0 - v;

        let outside = |x: f32| !(0.0..=1.0).contains(&x);
        if outside(u) || outside(v) {
            match self.wrap {
                WrapMode::ClampToEdge => {
                    u = u.clamp(0.0, 1.0);
                    v = v.clamp(0.0, 1.0);
                }
                WrapMode::Repeat => {
                    u = u.fract();
                    v = v.fract();
                }
                WrapMode::MirroredRepeat => {
                    u = 1.0 - u.fract();
                    v = 1.0 - v.fract();
                }
                WrapMode::ClampToBorder => return BORDER_COLOR,
            }
        }

        match self.interpolation {
            Interpolation::Nearest => {
                let x = ((u * self.width as f32) as i64).clamp(0, self.width as i64 - 1);
                let y = ((v * self.height as f32) as i64).clamp(0, self.height as i64 - 1);
                self.pixel(x as u32, y as u32)
            }
            Interpolation::Linear => self.sample_bilinear(u, v),
        }
    }

    fn sample_bilinear(&self, u: f32, v: f32) -> Color {
        let x = (u * (self.width as f32 - 1.0)).max(0.0);
        let y = (v * (self.height as f32 - 1.0)).max(0.0);

        let x0 = (x.floor() as u32).min(self.width - 1);
        let y0 = (y.floor() as u32).min(self.height - 1);
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x.fract();
        let fy = y.fract();

        let top = self.pixel(x0, y0).lerp(self.pixel(x1, y0), fx);
        let bottom = self.pixel(x0, y1).lerp(self.pixel(x1, y1), fx);

        top.lerp(bottom, fy)
    }

    fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels
            .get(idx)
            .map(|&p| Color::from(p))
            .unwrap_or(MISSING_IMAGE_COLOR)
    }
}
