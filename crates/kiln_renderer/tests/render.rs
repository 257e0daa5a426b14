//! End-to-end renders through the public API.

use std::sync::Arc;

use kiln_core::Texture;
use kiln_renderer::{
    render, render_parallel, write_ppm, Bvh, Camera, CameraConfig, Color, ConstantMedium, Cube,
    DiffuseLight, Hittable, HittableList, Lambertian, Mat4, SamplingMode, Sphere, Transformed,
    Vec3,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn ppm_text(image: &kiln_renderer::ImageBuffer) -> String {
    let mut out = Vec::new();
    write_ppm(&mut out, image).unwrap();
    String::from_utf8(out).unwrap()
}

/// One large diffuse sphere filling a 2x2 frame.
fn filled_frame() -> (Camera, HittableList) {
    let camera = Camera::new(
        CameraConfig::default()
            .with_resolution(1.0, 2)
            .with_position(Vec3::ZERO, -Vec3::Z, Vec3::Y)
            .with_lens(90.0, 0.0, 1.0)
            .with_quality(1, 1)
            .with_background(Color::ZERO)
            .with_sampling(SamplingMode::Normal),
    )
    .unwrap();

    let mut world = HittableList::new();
    world.add(Sphere::new(
        Vec3::new(0.0, 0.0, -5.0),
        4.0,
        Lambertian::new(Color::splat(0.5)),
    ));
    (camera, world)
}

#[test]
fn test_two_by_two_diffuse_sphere() {
    let (camera, world) = filled_frame();
    let mut rng = StdRng::seed_from_u64(42);

    let image = render(&camera, &world, &mut rng);
    let text = ppm_text(&image);

    assert!(text.starts_with("P3\n2 2\n255\n"));
    let triples: Vec<&str> = text.lines().skip(3).collect();
    assert_eq!(triples.len(), 4);
    assert!(triples.iter().all(|t| *t == triples[0]));
    assert_ne!(triples[0], "0 0 0");
    // Depth 1: albedo times the white sentinel
    assert_eq!(triples[0], "187 187 187");
}

#[test]
fn test_parallel_output_matches_format() {
    let (camera, world) = filled_frame();

    let image = render_parallel(&camera, &world, 42, 1);
    assert_eq!(ppm_text(&image), "P3\n2 2\n255\n187 187 187\n187 187 187\n187 187 187\n187 187 187\n");
}

#[test]
fn test_small_scene_with_every_primitive() {
    let mut rng = StdRng::seed_from_u64(42);

    let white = Lambertian::new(Color::splat(0.73));
    let mut objects: Vec<Arc<dyn Hittable>> = vec![
        Arc::new(Cube::new(
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(10.0, 0.2, 10.0),
            white.clone(),
        )),
        Arc::new(Sphere::new(
            Vec3::new(0.0, 4.0, 0.0),
            1.0,
            DiffuseLight::new(Color::splat(7.0)),
        )),
        Arc::new(Sphere::moving(
            Vec3::new(-1.5, 0.0, 0.0),
            [Vec3::new(-1.5, 0.5, 0.0)],
            0.5,
            white.clone(),
        )),
    ];

    let unit_cube: Arc<dyn Hittable> =
        Arc::new(Cube::new(Vec3::ZERO, Vec3::ONE, white.clone()));
    objects.push(Arc::new(
        Transformed::new(
            unit_cube.clone(),
            Mat4::from_translation(Vec3::new(1.5, 0.0, 0.0)) * Mat4::from_rotation_y(0.3),
        )
        .unwrap(),
    ));
    objects.push(Arc::new(ConstantMedium::new(
        Arc::new(Sphere::new(Vec3::ZERO, 0.6, white)),
        2.0,
        Texture::Solid(Color::ONE),
    )));

    let world = Bvh::new(objects, &mut rng);
    let camera = Camera::new(
        CameraConfig::default()
            .with_resolution(1.0, 8)
            .with_position(Vec3::new(0.0, 1.0, 6.0), Vec3::ZERO, Vec3::Y)
            .with_lens(40.0, 0.0, 6.0)
            .with_quality(4, 8)
            .with_shutter(1.0),
    )
    .unwrap();

    let image = render(&camera, &world, &mut rng);
    assert_eq!(image.pixels.len(), 64);
    assert!(image.pixels.iter().all(|c| c.is_finite()));
    assert!(image.pixels.iter().any(|c| c.length() > 0.0));

    let text = ppm_text(&image);
    assert_eq!(text.lines().count(), 3 + 64);
}

#[test]
fn test_adaptive_render_of_sky_is_background() {
    let camera = Camera::new(
        CameraConfig::default()
            .with_resolution(2.0, 4)
            .with_background(Color::new(0.7, 0.8, 1.0))
            .with_sampling(SamplingMode::Adaptive),
    )
    .unwrap();
    let world = HittableList::new();
    let mut rng = StdRng::seed_from_u64(1);

    let image = render(&camera, &world, &mut rng);
    for color in &image.pixels {
        assert!((*color - Color::new(0.7, 0.8, 1.0)).length() < 1e-6);
    }
}
