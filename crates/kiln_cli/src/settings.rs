//! JSON render settings layered over a scene's camera.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kiln_renderer::{CameraConfig, SamplingMode};
use serde::{Deserialize, Serialize};

/// Optional overrides read from a settings file.
///
/// Every field left out keeps the scene's own value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    pub image_width: Option<u32>,
    pub samples_per_pixel: Option<u32>,
    pub max_depth: Option<u32>,
    pub sampling: Option<SamplingMode>,
    pub seed: Option<u64>,
    /// Render buckets on the rayon pool instead of one scanline pass
    pub parallel: Option<bool>,
    pub bucket_size: Option<u32>,
    pub output: Option<PathBuf>,
}

impl RenderSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid settings file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply the camera overrides to `config`.
    pub fn apply(&self, mut config: CameraConfig) -> CameraConfig {
        if let Some(width) = self.image_width {
            config.image_width = width;
        }
        if let Some(samples) = self.samples_per_pixel {
            config.samples_per_pixel = samples;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(sampling) = self.sampling {
            config.sampling = sampling;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_change_nothing() {
        let settings = RenderSettings::parse("{}").unwrap();
        assert_eq!(settings, RenderSettings::default());

        let config = CameraConfig::default().with_quality(7, 3);
        assert_eq!(settings.apply(config.clone()), config);
    }

    #[test]
    fn test_overrides_apply() {
        let settings = RenderSettings::parse(
            r#"{
                "image_width": 64,
                "samples_per_pixel": 4,
                "sampling": "adaptive",
                "seed": 9,
                "parallel": false,
                "output": "out/frame.png"
            }"#,
        )
        .unwrap();

        let config = settings.apply(CameraConfig::default().with_quality(10, 20));
        assert_eq!(config.image_width, 64);
        assert_eq!(config.samples_per_pixel, 4);
        assert_eq!(config.max_depth, 20);
        assert_eq!(config.sampling, SamplingMode::Adaptive);
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.parallel, Some(false));
        assert_eq!(settings.output, Some(PathBuf::from("out/frame.png")));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(RenderSettings::parse(r#"{ "widht": 10 }"#).is_err());
        assert!(RenderSettings::parse(r#"{ "sampling": "stratified" }"#).is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = RenderSettings::load(Path::new("no/such/settings.json")).unwrap_err();
        assert!(err.to_string().contains("no/such/settings.json"));
    }
}
