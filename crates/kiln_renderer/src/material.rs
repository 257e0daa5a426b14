//! Material trait for surface scattering.

use std::sync::Arc;

use arrayvec::ArrayVec;
use kiln_core::Texture;
use kiln_math::{near_zero, reflect, refract, Color, Ray, Vec3};
use rand::RngCore;

use crate::hittable::HitRecord;
use crate::random::{gen_f32, random_unit_vector};

/// One outgoing ray of a scatter event and the share of energy it carries.
#[derive(Debug, Clone, Copy)]
pub struct ScatteredRay {
    pub weight: f32,
    pub ray: Ray,
}

/// Result of a successful scatter: a color filter plus one or two outgoing rays.
#[derive(Debug, Clone)]
pub struct ScatterResult {
    pub attenuation: Color,
    pub scattered: ArrayVec<ScatteredRay, 2>,
}

impl ScatterResult {
    /// A single outgoing ray with weight 1.
    pub fn single(attenuation: Color, ray: Ray) -> Self {
        let mut scattered = ArrayVec::new();
        scattered.push(ScatteredRay { weight: 1.0, ray });
        Self {
            attenuation,
            scattered,
        }
    }
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore)
        -> Option<ScatterResult>;

    /// Get emitted light from this material.
    ///
    /// Most materials return black (no emission).
    fn emitted(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        Color::ZERO
    }
}

impl<M: Material + ?Sized> Material for Arc<M> {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        (**self).scatter(ray_in, rec, rng)
    }

    fn emitted(&self, u: f32, v: f32, p: Vec3) -> Color {
        (**self).emitted(u, v, p)
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Texture,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self::textured(Texture::Solid(albedo))
    }

    pub fn textured(albedo: Texture) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if near_zero(scatter_direction) {
            scatter_direction = rec.normal;
        }

        let scattered = Ray::new(rec.p, scatter_direction, ray_in.time());
        Some(ScatterResult::single(
            self.albedo.value(rec.u, rec.v, rec.p),
            scattered,
        ))
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror; values of 1.0 and above are clamped to 1.0
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction(), rec.normal).normalize();
        let scattered_dir = reflected + self.fuzz * random_unit_vector(rng);

        // Absorbed if fuzz pushed the reflection below the surface
        if scattered_dir.dot(rec.normal) <= 0.0 {
            return None;
        }

        let scattered = Ray::new(rec.p, scattered_dir, ray_in.time());
        Some(ScatterResult::single(self.albedo, scattered))
    }
}

/// How a dielectric divides energy between reflection and refraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FresnelMode {
    /// Follow one branch: reflect when refraction is impossible or the
    /// Schlick reflectance exceeds 0.5, otherwise refract.
    #[default]
    Threshold,
    /// Follow both branches, weighted by reflectance and its complement.
    EnergySplit,
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
    mode: FresnelMode,
}

impl Dielectric {
    /// Reflectance above which threshold mode reflects.
    pub const REFLECT_THRESHOLD: f32 = 0.5;

    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self {
            ior,
            mode: FresnelMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: FresnelMode) -> Self {
        self.mode = mode;
        self
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let attenuation = Color::ONE;
        let refraction_ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;
        let reflectance = Self::reflectance(cos_theta, refraction_ratio);

        let reflected = Ray::new(
            rec.p,
            reflect(unit_direction, rec.normal),
            ray_in.time(),
        );
        let refracted = || {
            Ray::new(
                rec.p,
                refract(unit_direction, rec.normal, refraction_ratio),
                ray_in.time(),
            )
        };

        match self.mode {
            FresnelMode::Threshold => {
                let ray = if cannot_refract || reflectance > Self::REFLECT_THRESHOLD {
                    reflected
                } else {
                    refracted()
                };
                Some(ScatterResult::single(attenuation, ray))
            }
            FresnelMode::EnergySplit => {
                if cannot_refract {
                    return Some(ScatterResult::single(attenuation, reflected));
                }

                let mut scattered = ArrayVec::new();
                scattered.push(ScatteredRay {
                    weight: reflectance,
                    ray: reflected,
                });
                scattered.push(ScatteredRay {
                    weight: 1.0 - reflectance,
                    ray: refracted(),
                });
                Some(ScatterResult {
                    attenuation,
                    scattered,
                })
            }
        }
    }
}

/// Scatters uniformly in every direction; the phase function of a
/// constant-density medium.
#[derive(Debug, Clone)]
pub struct Isotropic {
    albedo: Texture,
}

impl Isotropic {
    pub fn new(albedo: Color) -> Self {
        Self::textured(Texture::Solid(albedo))
    }

    pub fn textured(albedo: Texture) -> Self {
        Self { albedo }
    }
}

impl Material for Isotropic {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let scattered = Ray::new(rec.p, random_unit_vector(rng), ray_in.time());
        Some(ScatterResult::single(
            self.albedo.value(rec.u, rec.v, rec.p),
            scattered,
        ))
    }
}

/// Diffuse light emitter.
#[derive(Debug, Clone)]
pub struct DiffuseLight {
    emit: Texture,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self::textured(Texture::Solid(emit))
    }

    pub fn textured(emit: Texture) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        // Lights don't scatter rays
        None
    }

    fn emitted(&self, u: f32, v: f32, p: Vec3) -> Color {
        self.emit.value(u, v, p)
    }
}

/// Flat color with no scattering, for debug shading.
#[derive(Debug, Clone)]
pub struct Plain {
    color: Color,
}

impl Plain {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

impl Material for Plain {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        None
    }
}
