//! Game settings
//!
//! Loaded once from JSON and passed to the constructors that need it. There is
//! no process-wide config; the speed multiplier reaches particles through
//! [`Step`](crate::sim::Step).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{GRAVITY, HEIGHT, MAX_WIND_SPEED, WIDTH};
use crate::error::ConfigError;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Clouds kept alive by the cloud emitter
    pub fn max_clouds(&self) -> usize {
        match self {
            QualityPreset::Low => 3,
            QualityPreset::Medium => 7,
            QualityPreset::High => 10,
        }
    }

    /// Live wind-blown debris specks
    pub fn max_debris(&self) -> usize {
        match self {
            QualityPreset::Low => 50,
            QualityPreset::Medium => 200,
            QualityPreset::High => 1000,
        }
    }

    /// Sparks thrown out by one explosion
    pub fn explosion_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 16,
            QualityPreset::Medium => 48,
            QualityPreset::High => 128,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Playfield width in pixels
    pub width: f32,
    /// Playfield height in pixels
    pub height: f32,
    /// Global speed factor applied to integration, gravity and wind
    pub speed_multiplier: f32,
    /// Downward acceleration for projectiles and sparks
    pub gravity: f32,
    /// Upper bound for randomly sampled wind speed
    pub max_wind_speed: f32,
    /// Effect density
    pub quality: QualityPreset,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            speed_multiplier: 5.0,
            gravity: GRAVITY,
            max_wind_speed: MAX_WIND_SPEED,
            quality: QualityPreset::Medium,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse settings from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Reject values the simulation can't work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let whole_pixel = |v: f32| v.is_finite() && v >= 1.0;
        if !(whole_pixel(self.width) && whole_pixel(self.height)) {
            return Err(ConfigError::Invalid(format!(
                "playfield must be at least 1x1 and finite, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.speed_multiplier.is_finite() || self.speed_multiplier <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "speed_multiplier must be positive, got {}",
                self.speed_multiplier
            )));
        }
        if !self.max_wind_speed.is_finite() || self.max_wind_speed < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_wind_speed must be >= 0, got {}",
                self.max_wind_speed
            )));
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid("gravity must be finite".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "speed_multiplier": 2.5, "quality": "high" }"#)
            .unwrap();
        assert_eq!(settings.speed_multiplier, 2.5);
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.width, WIDTH);
        assert_eq!(settings.max_wind_speed, MAX_WIND_SPEED);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Settings::from_json(r#"{ "speed_multiplier": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Settings::from_json(r#"{ "width": -1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Settings::from_json(r#"{ "height": 0.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = Settings::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!(QualityPreset::from_str("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
        assert!(QualityPreset::Low.max_debris() < QualityPreset::High.max_debris());
    }
}
