//! Editing parameters and TOML presets.
//!
//! A [`ParameterSet`] holds one value per pipeline stage, grouped the way an
//! editing panel groups its controls:
//!
//! - **Position**: rotation, zoom, flip
//! - **Filters**: brightness, saturation, grayscale, invert, four-color
//! - **Effects**: blur, contrast, hue
//!
//! Every field has a neutral value at which its stage leaves the image
//! untouched; `ParameterSet::default()` is all-neutral.
//!
//! # Preset files
//!
//! ```toml
//! [position]
//! rotation = 90.0
//! flip = "x"
//!
//! [effects]
//! hue = -40
//! ```
//!
//! Missing groups and fields fall back to their neutral values.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editor::Stage;

/// Largest hue shift in either direction.
pub const HUE_LIMIT: i32 = 100;

/// Largest blur sigma.
pub const BLUR_LIMIT: f32 = 30.0;

/// Largest unsharp mask strength.
pub const CONTRAST_LIMIT: f32 = 10.0;

/// Errors for invalid parameter values and preset files.
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Unknown flip axis '{0}' (expected none, x, y or both)")]
    UnknownFlipAxis(String),

    #[error("Failed to parse preset: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize preset: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to read preset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Axis selection for the flip stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipAxis {
    #[default]
    None,
    /// Mirror left to right.
    #[serde(alias = "X", alias = "horizontal")]
    X,
    /// Flip top to bottom.
    #[serde(alias = "Y", alias = "vertical")]
    Y,
    #[serde(alias = "Both")]
    Both,
}

impl FlipAxis {
    pub fn name(self) -> &'static str {
        match self {
            FlipAxis::None => "none",
            FlipAxis::X => "x",
            FlipAxis::Y => "y",
            FlipAxis::Both => "both",
        }
    }
}

impl fmt::Display for FlipAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FlipAxis {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(FlipAxis::None),
            "x" | "horizontal" => Ok(FlipAxis::X),
            "y" | "vertical" => Ok(FlipAxis::Y),
            "both" => Ok(FlipAxis::Both),
            _ => Err(ParamError::UnknownFlipAxis(s.to_string())),
        }
    }
}

/// Geometric placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    /// Rotation in degrees, counter-clockwise (neutral 0)
    pub rotation: f32,
    /// Border removed from every edge, in pixels (neutral 0)
    pub zoom: u32,
    /// Flip axis (neutral none)
    pub flip: FlipAxis,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            zoom: 0,
            flip: FlipAxis::None,
        }
    }
}

/// Tonal and color filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// Brightness multiplier (neutral 1.0, 0 = black)
    pub brightness: f32,
    /// Saturation multiplier (neutral 1.0, 0 = gray)
    pub saturation: f32,
    pub grayscale: bool,
    pub invert: bool,
    /// Reduce to an adaptive four-color palette
    pub four_color: bool,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            saturation: 1.0,
            grayscale: false,
            invert: false,
            four_color: false,
        }
    }
}

/// Convolution and hue effects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Effects {
    /// Gaussian blur sigma (neutral 0)
    pub blur: f32,
    /// Unsharp mask strength (neutral 0)
    pub contrast: f32,
    /// Hue shift in byte-scaled steps, -100 to 100 (neutral 0)
    pub hue: i32,
}

/// The complete set of values for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    pub position: Position,
    pub filters: Filters,
    pub effects: Effects,
}

impl ParameterSet {
    /// Create a new all-neutral parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if every stage is at its neutral value
    pub fn is_neutral(&self) -> bool {
        Stage::ORDER.iter().all(|&stage| self.is_stage_neutral(stage))
    }

    /// Check if one stage would leave the image untouched.
    pub fn is_stage_neutral(&self, stage: Stage) -> bool {
        let Self {
            position,
            filters,
            effects,
        } = self;
        match stage {
            Stage::Rotate => position.rotation.rem_euclid(360.0) == 0.0,
            Stage::Zoom => position.zoom == 0,
            Stage::Flip => position.flip == FlipAxis::None,
            Stage::Brightness => filters.brightness == 1.0,
            Stage::Saturation => filters.saturation == 1.0,
            Stage::Grayscale => !filters.grayscale,
            Stage::Invert => !filters.invert,
            Stage::FourColor => !filters.four_color,
            Stage::Blur => effects.blur == 0.0,
            Stage::Contrast => effects.contrast == 0.0,
            Stage::Hue => effects.hue == 0,
        }
    }

    /// Reject values no stage can apply.
    pub fn validate(&self) -> Result<(), ParamError> {
        check_finite("rotation", self.position.rotation)?;
        check_non_negative("brightness", self.filters.brightness)?;
        check_non_negative("saturation", self.filters.saturation)?;
        check_at_most("blur", self.effects.blur, BLUR_LIMIT)?;
        check_at_most("contrast", self.effects.contrast, CONTRAST_LIMIT)?;

        if !(-HUE_LIMIT..=HUE_LIMIT).contains(&self.effects.hue) {
            return Err(ParamError::InvalidValue {
                field: "hue",
                reason: format!("{} is outside -{HUE_LIMIT}..={HUE_LIMIT}", self.effects.hue),
            });
        }
        Ok(())
    }

    /// Revert rotation, zoom and flip.
    pub fn reset_position(&mut self) {
        self.position = Position::default();
    }

    /// Revert brightness, saturation and the color toggles.
    pub fn reset_filters(&mut self) {
        self.filters = Filters::default();
    }

    /// Revert blur, contrast and hue.
    pub fn reset_effects(&mut self) {
        self.effects = Effects::default();
    }

    /// Parse and validate a TOML preset.
    pub fn from_toml_str(text: &str) -> Result<Self, ParamError> {
        let params: ParameterSet = toml::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Load a TOML preset from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ParamError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded preset {}", path.display());
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ParamError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn check_finite(field: &'static str, value: f32) -> Result<(), ParamError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParamError::InvalidValue {
            field,
            reason: format!("{value} is not a finite number"),
        })
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ParamError> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(ParamError::InvalidValue {
            field,
            reason: format!("{value} is negative"),
        });
    }
    Ok(())
}

fn check_at_most(field: &'static str, value: f32, limit: f32) -> Result<(), ParamError> {
    check_non_negative(field, value)?;
    if value > limit {
        return Err(ParamError::InvalidValue {
            field,
            reason: format!("{value} is above {limit}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        let params = ParameterSet::new();
        assert!(params.is_neutral());
        assert_eq!(params.filters.brightness, 1.0);
        assert_eq!(params.filters.saturation, 1.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_single_change_is_not_neutral() {
        let mut params = ParameterSet::new();
        params.effects.hue = 5;
        assert!(!params.is_neutral());
        assert!(!params.is_stage_neutral(Stage::Hue));
        assert!(params.is_stage_neutral(Stage::Blur));
    }

    #[test]
    fn test_full_turn_rotation_is_neutral() {
        let mut params = ParameterSet::new();
        params.position.rotation = 360.0;
        assert!(params.is_stage_neutral(Stage::Rotate));
        params.position.rotation = -720.0;
        assert!(params.is_stage_neutral(Stage::Rotate));
        params.position.rotation = 90.0;
        assert!(!params.is_stage_neutral(Stage::Rotate));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut params = ParameterSet::new();
        params.filters.brightness = -0.5;
        assert!(matches!(
            params.validate(),
            Err(ParamError::InvalidValue { field: "brightness", .. })
        ));

        let mut params = ParameterSet::new();
        params.effects.blur = f32::NAN;
        assert!(matches!(
            params.validate(),
            Err(ParamError::InvalidValue { field: "blur", .. })
        ));

        let mut params = ParameterSet::new();
        params.effects.hue = 101;
        assert!(matches!(params.validate(), Err(ParamError::InvalidValue { field: "hue", .. })));
        params.effects.hue = -100;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate_caps_blur_and_contrast() {
        let mut params = ParameterSet::new();
        params.effects.blur = BLUR_LIMIT;
        params.effects.contrast = CONTRAST_LIMIT;
        assert!(params.validate().is_ok());

        params.effects.blur = 1.0e9;
        assert!(matches!(
            params.validate(),
            Err(ParamError::InvalidValue { field: "blur", .. })
        ));

        params.effects.blur = 0.0;
        params.effects.contrast = CONTRAST_LIMIT + 0.5;
        assert!(matches!(
            params.validate(),
            Err(ParamError::InvalidValue { field: "contrast", .. })
        ));
    }

    #[test]
    fn test_resets_are_per_group() {
        let mut params = ParameterSet::new();
        params.position.zoom = 12;
        params.filters.invert = true;
        params.effects.blur = 2.0;

        params.reset_filters();
        assert!(!params.filters.invert);
        assert_eq!(params.position.zoom, 12);
        assert_eq!(params.effects.blur, 2.0);

        params.reset_position();
        assert_eq!(params.position, Position::default());
        params.reset_effects();
        assert!(params.is_neutral());
    }

    #[test]
    fn test_flip_axis_parsing() {
        assert_eq!("x".parse::<FlipAxis>().unwrap(), FlipAxis::X);
        assert_eq!("Both".parse::<FlipAxis>().unwrap(), FlipAxis::Both);
        assert_eq!("vertical".parse::<FlipAxis>().unwrap(), FlipAxis::Y);
        assert!(matches!("diagonal".parse::<FlipAxis>(), Err(ParamError::UnknownFlipAxis(_))));
    }

    #[test]
    fn test_partial_preset_defaults_to_neutral() {
        let params = ParameterSet::from_toml_str(
            r#"
            [position]
            flip = "X"

            [effects]
            hue = -40
            "#,
        )
        .unwrap();

        assert_eq!(params.position.flip, FlipAxis::X);
        assert_eq!(params.position.zoom, 0);
        assert_eq!(params.effects.hue, -40);
        assert_eq!(params.filters, Filters::default());
    }

    #[test]
    fn test_preset_rejects_negative_zoom() {
        let err = ParameterSet::from_toml_str("[position]\nzoom = -3\n").unwrap_err();
        assert!(matches!(err, ParamError::Parse(_)));
    }

    #[test]
    fn test_preset_rejects_invalid_values() {
        let err = ParameterSet::from_toml_str("[effects]\nhue = 300\n").unwrap_err();
        assert!(matches!(err, ParamError::InvalidValue { field: "hue", .. }));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut params = ParameterSet::new();
        params.position.rotation = 45.0;
        params.position.flip = FlipAxis::Both;
        params.filters.four_color = true;
        params.effects.contrast = 2.5;

        let text = params.to_toml_string().unwrap();
        assert!(text.contains("flip = \"both\""));
        assert_eq!(ParameterSet::from_toml_str(&text).unwrap(), params);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ParameterSet::load("/nonexistent/preset.toml").unwrap_err();
        assert!(matches!(err, ParamError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/preset.toml"));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warm.toml");
        std::fs::write(&path, "[filters]\nbrightness = 1.5\ngrayscale = true\n").unwrap();

        let params = ParameterSet::load(&path).unwrap();
        assert_eq!(params.filters.brightness, 1.5);
        assert!(params.filters.grayscale);
    }
}
