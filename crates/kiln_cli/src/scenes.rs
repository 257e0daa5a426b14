//! Demo scenes.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use kiln_core::{load_obj, ImageTexture, NoiseTexture, Texture};
use kiln_math::{Color, Mat4, Vec3};
use kiln_renderer::{
    Bvh, CameraConfig, ConstantMedium, Cube, Dielectric, DiffuseLight, Hittable, Lambertian,
    Metal, Polygon, Sphere, Transformed,
};
use rand::{Rng, RngCore};

/// Scene names, in menu order.
pub const SCENES: [&str; 6] = [
    "two_spheres",
    "random_spheres",
    "earth",
    "perlin_spheres",
    "simple_light",
    "cornell_smoke",
];

/// A world ready to render and the camera settings it was framed for.
pub struct Scene {
    pub name: &'static str,
    pub camera: CameraConfig,
    pub world: Arc<dyn Hittable>,
}

/// Resolve a scene by name or by its 1-based menu number.
pub fn resolve(selector: &str) -> Result<&'static str> {
    if let Some(name) = SCENES.iter().find(|name| **name == selector) {
        return Ok(name);
    }
    match selector.parse::<usize>() {
        Ok(n) if (1..=SCENES.len()).contains(&n) => Ok(SCENES[n - 1]),
        _ => bail!(
            "Unknown scene '{}' (expected one of {} or 1-{})",
            selector,
            SCENES.join(", "),
            SCENES.len()
        ),
    }
}

/// Build the named scene, reading meshes and textures from `assets`.
pub fn build(name: &str, assets: &Path, rng: &mut dyn RngCore) -> Result<Scene> {
    let name = resolve(name)?;
    let (camera, objects) = match name {
        "two_spheres" => two_spheres(assets)?,
        "random_spheres" => random_spheres(assets, rng)?,
        "earth" => earth(assets),
        "perlin_spheres" => perlin_spheres(rng),
        "simple_light" => simple_light(rng),
        "cornell_smoke" => cornell_smoke(),
        _ => bail!("Scene '{}' has no builder", name),
    };

    Ok(Scene {
        name,
        camera,
        world: Arc::new(Bvh::new(objects, rng)),
    })
}

/// Camera settings shared by every scene.
fn base_camera() -> CameraConfig {
    CameraConfig::default()
        .with_resolution(16.0 / 9.0, 400)
        .with_quality(10, 10)
        .with_background(Color::new(0.70, 0.80, 1.00))
}

fn checker_ground() -> Arc<dyn Hittable> {
    let checker =
        Texture::checker_colors(0.32, Color::new(0.2, 0.3, 0.1), Color::new(0.9, 0.9, 0.9));
    Arc::new(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Lambertian::textured(checker),
    ))
}

fn load_cube(assets: &Path, material: Lambertian) -> Result<Polygon<Lambertian>> {
    let path = assets.join("cube1.obj");
    let mesh = load_obj(&path).with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(Polygon::from_mesh(&mesh, material))
}

fn random_color(rng: &mut dyn RngCore) -> Color {
    Color::new(rng.gen(), rng.gen(), rng.gen())
}

type SceneParts = (CameraConfig, Vec<Arc<dyn Hittable>>);

fn two_spheres(assets: &Path) -> Result<SceneParts> {
    let material_center = Lambertian::new(Color::new(0.1, 0.2, 0.5));
    let objects: Vec<Arc<dyn Hittable>> =
        vec![Arc::new(load_cube(assets, material_center)?), checker_ground()];

    let camera = base_camera()
        .with_quality(10, 2)
        .with_position(Vec3::new(1.5, 2.0, 2.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_lens(90.0, 0.0, 3.4)
        .with_shutter(2.0);
    Ok((camera, objects))
}

fn random_spheres(assets: &Path, rng: &mut dyn RngCore) -> Result<SceneParts> {
    let material_ground = Lambertian::new(Color::new(0.8, 0.8, 0.0));
    let material_center = Lambertian::new(Color::new(0.1, 0.2, 0.5));
    let material_left = Dielectric::new(1.5);
    let material_right = Metal::new(Color::new(0.8, 0.6, 0.2), 0.0);

    let mut objects: Vec<Arc<dyn Hittable>> = Vec::new();

    let cube: Arc<dyn Hittable> = Arc::new(load_cube(assets, material_center.clone())?);
    let placement = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.2))
        * Mat4::from_rotation_y(0.5)
        * Mat4::from_scale(Vec3::splat(1.2));
    objects.push(Arc::new(Transformed::new(cube, placement)?));

    objects.push(checker_ground());
    objects.push(Arc::new(Sphere::new(
        Vec3::new(0.0, -102.0, -1.0),
        100.0,
        material_ground,
    )));

    // The same sphere twice: in place and lifted by a transform
    let center: Arc<dyn Hittable> = Arc::new(Sphere::new(
        Vec3::new(0.0, 0.0, -1.0),
        0.5,
        material_center,
    ));
    objects.push(Arc::new(Transformed::new(
        center.clone(),
        Mat4::from_translation(Vec3::Y),
    )?));
    objects.push(center);

    // Hollow glass: a bubble inside a glass ball
    objects.push(Arc::new(Sphere::new(
        Vec3::new(-1.0, 0.0, -1.0),
        0.5,
        material_left.clone(),
    )));
    objects.push(Arc::new(Sphere::new(
        Vec3::new(-1.0, 0.0, -1.0),
        -0.4,
        material_left,
    )));
    objects.push(Arc::new(Sphere::new(
        Vec3::new(1.0, 0.0, -1.0),
        0.5,
        material_right,
    )));

    for a in -5..5 {
        for b in -1..1 {
            let choose_mat: f32 = rng.gen();
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let end = center + Vec3::new(0.0, rng.gen_range(0.0..0.5), 0.0);
            let sphere: Arc<dyn Hittable> = if choose_mat < 0.5 {
                let albedo = random_color(rng) * random_color(rng);
                Arc::new(Sphere::moving(center, [end], 0.2, Lambertian::new(albedo)))
            } else {
                let albedo = random_color(rng);
                Arc::new(Sphere::moving(center, [end], 0.2, Metal::new(albedo, 0.3)))
            };
            objects.push(sphere);
        }
    }

    let camera = base_camera()
        .with_quality(10, 2)
        .with_position(Vec3::new(1.5, 2.0, 2.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
        .with_lens(90.0, 0.0, 3.4)
        .with_shutter(2.0);
    Ok((camera, objects))
}

fn earth(assets: &Path) -> SceneParts {
    // A missing map renders in the debug color instead of failing
    let earth_texture = ImageTexture::open(assets.join("earthmap.jpg"));
    let globe: Arc<dyn Hittable> = Arc::new(Sphere::new(
        Vec3::ZERO,
        2.0,
        Lambertian::textured(Texture::image(earth_texture)),
    ));

    let camera = base_camera()
        .with_quality(10, 10)
        .with_position(Vec3::new(0.0, 0.0, 12.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.0, 10.0);
    (camera, vec![globe])
}

fn perlin_spheres(rng: &mut dyn RngCore) -> SceneParts {
    let pertext = Texture::noise(NoiseTexture::new(4.0, 0.5, rng));
    let objects: Vec<Arc<dyn Hittable>> = vec![
        Arc::new(Sphere::new(
            Vec3::new(0.0, -1000.0, 0.0),
            1000.0,
            Lambertian::textured(pertext.clone()),
        )),
        Arc::new(Sphere::new(
            Vec3::new(0.0, 2.0, 0.0),
            2.0,
            Lambertian::textured(pertext),
        )),
    ];

    let camera = base_camera()
        .with_quality(10, 20)
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.0, 10.0);
    (camera, objects)
}

fn simple_light(rng: &mut dyn RngCore) -> SceneParts {
    let pertext = Texture::noise(NoiseTexture::new(4.0, 3.0, rng));
    let objects: Vec<Arc<dyn Hittable>> = vec![
        Arc::new(Sphere::new(
            Vec3::new(0.0, -1000.0, 0.0),
            1000.0,
            Lambertian::textured(pertext.clone()),
        )),
        Arc::new(Sphere::new(
            Vec3::new(0.0, 2.0, 0.0),
            2.0,
            Lambertian::textured(pertext),
        )),
        Arc::new(Cube::new(
            Vec3::new(3.0, 1.0, -2.0),
            Vec3::splat(2.0),
            DiffuseLight::new(Color::splat(4.0)),
        )),
    ];

    let camera = base_camera()
        .with_quality(10, 20)
        .with_position(Vec3::new(26.0, 3.0, 6.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y)
        .with_lens(20.0, 0.0, 10.0);
    (camera, objects)
}

fn cornell_smoke() -> SceneParts {
    let green = Lambertian::new(Color::new(0.12, 0.45, 0.15));
    let boundary: Arc<dyn Hittable> = Arc::new(Cube::new(
        Vec3::new(265.0, 0.0, 295.0),
        Vec3::new(165.0, 330.0, 165.0),
        green,
    ));
    let objects: Vec<Arc<dyn Hittable>> = vec![Arc::new(ConstantMedium::new(
        boundary,
        0.1,
        Texture::solid(Color::ONE),
    ))];

    let camera = base_camera()
        .with_quality(10, 40)
        .with_position(
            Vec3::new(278.0, 278.0, -800.0),
            Vec3::new(278.0, 278.0, 0.0),
            Vec3::Y,
        )
        .with_lens(40.0, 0.0, 10.0);
    (camera, objects)
}
