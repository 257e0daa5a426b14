//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel using rayon. Each bucket draws from its own generator
//! seeded from the render seed and the bucket origin, so the image does
//! not depend on how buckets are scheduled across threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

use crate::{
    camera::Camera,
    hittable::Hittable,
    renderer::{log_render_start, render_pixel, ImageBuffer},
};
use kiln_math::Color;

/// A tile of the image, addressed by its top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position in center-out order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Seed for this bucket's generator, derived from the render seed.
    pub fn seed(&self, render_seed: u64) -> u64 {
        let origin = (u64::from(self.x) << 32) | u64::from(self.y);
        render_seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ origin
    }
}

/// Edge length of a full tile in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// Tile a `width` x `height` image, nearest-to-center tiles first.
///
/// Edge tiles are clipped to the image.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);
    let mut buckets: Vec<Bucket> = (0..height)
        .step_by(size as usize)
        .flat_map(|y| {
            (0..width).step_by(size as usize).map(move |x| {
                Bucket::new(x, y, size.min(width - x), size.min(height - y), 0)
            })
        })
        .collect();

    sort_spiral(&mut buckets, width, height);
    for (index, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = index;
    }
    buckets
}

/// Order by squared distance from the image center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let (cx, cy) = (0.5 * width as f32, 0.5 * height as f32);
    let distance = |b: &Bucket| {
        let dx = b.x as f32 + 0.5 * b.width as f32 - cx;
        let dy = b.y as f32 + 0.5 * b.height as f32 - cy;
        dx * dx + dy * dy
    };

    // Stable, so equidistant tiles stay in scanline order
    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Render every pixel of `bucket`, row-major within the tile.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    world: &dyn Hittable,
    rng: &mut dyn RngCore,
) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);
    for y in bucket.y..bucket.y + bucket.height {
        for x in bucket.x..bucket.x + bucket.width {
            pixels.push(render_pixel(camera, world, x, y, rng));
        }
    }
    pixels
}

/// A rendered tile waiting to be copied into the frame.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy the bucket's pixels into their region of `image`.
    pub fn write_into(&self, image: &mut ImageBuffer) {
        let width = self.bucket.width as usize;
        for (row, line) in self.pixels.chunks(width).enumerate() {
            for (col, color) in line.iter().enumerate() {
                image.set(
                    self.bucket.x + col as u32,
                    self.bucket.y + row as u32,
                    *color,
                );
            }
        }
    }
}

/// Render the scene with one rayon task per bucket.
pub fn render_parallel(
    camera: &Camera,
    world: &dyn Hittable,
    seed: u64,
    bucket_size: u32,
) -> ImageBuffer {
    let (width, height) = (camera.image_width(), camera.image_height());
    log_render_start(camera, "parallel buckets");
    let start = Instant::now();

    let buckets = generate_buckets(width, height, bucket_size);
    let total = buckets.len();
    let done = AtomicUsize::new(0);

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut rng = StdRng::seed_from_u64(bucket.seed(seed));
            let pixels = render_bucket(bucket, camera, world, &mut rng);

            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!("Bucket {} done ({}/{})", bucket.index, finished, total);
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        result.write_into(&mut image);
    }

    log::info!(
        "Render finished in {:.2?} ({} buckets)",
        start.elapsed(),
        total
    );
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{render, CameraConfig, HittableList, Lambertian, SamplingMode, Sphere};
    use kiln_math::Vec3;

    fn scene() -> (Camera, HittableList) {
        let camera = Camera::new(
            CameraConfig::default()
                .with_resolution(1.5, 24)
                .with_position(Vec3::ZERO, -Vec3::Z, Vec3::Y)
                .with_lens(90.0, 0.0, 1.0)
                .with_quality(2, 3)
                .with_background(Color::new(0.7, 0.8, 1.0))
                .with_sampling(SamplingMode::SuperSampling),
        )
        .unwrap();
        let mut world = HittableList::new();
        world.add(Sphere::new(-Vec3::Z, 0.5, Lambertian::new(Color::splat(0.5))));
        (camera, world)
    }

    #[test]
    fn test_buckets_cover_image() {
        for (w, h, size, count) in [(128, 128, 64, 4), (100, 100, 64, 4), (400, 225, 32, 13 * 8)] {
            let buckets = generate_buckets(w, h, size);
            assert_eq!(buckets.len(), count);
            let covered: u32 = buckets.iter().map(Bucket::pixel_count).sum();
            assert_eq!(covered, w * h);
            assert!(buckets.iter().all(|b| b.x + b.width <= w && b.y + b.height <= h));
        }
    }

    #[test]
    fn test_center_bucket_first() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9);
        assert_eq!((buckets[0].x, buckets[0].y), (64, 64));
        assert!(buckets.iter().enumerate().all(|(i, b)| b.index == i));
    }

    #[test]
    fn test_bucket_seeds_differ() {
        let a = Bucket::new(0, 32, 32, 32, 0);
        let b = Bucket::new(32, 0, 32, 32, 1);
        assert_ne!(a.seed(1), b.seed(1));
        assert_ne!(a.seed(1), a.seed(2));
    }

    #[test]
    fn test_parallel_render_independent_of_threads() {
        let (camera, world) = scene();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap();
        let single = pool.install(|| render_parallel(&camera, &world, 42, 8));
        let many = render_parallel(&camera, &world, 42, 8);

        assert_eq!(single, many);
        assert_eq!(single.width, 24);
        assert_eq!(single.height, 16);
    }

    #[test]
    fn test_parallel_matches_sequential_on_sky() {
        // Nothing random reaches the pixel when every ray misses
        let (camera, _) = scene();
        let world = HittableList::new();
        let mut rng = StdRng::seed_from_u64(0);

        let sequential = render(&camera, &world, &mut rng);
        let parallel = render_parallel(&camera, &world, 0, 5);
        assert_eq!(sequential, parallel);
    }
}
