//! The eleven-stage image editor.
//!
//! ## Stage Order
//! 1. Rotate
//! 2. Zoom
//! 3. Flip
//! 4. Brightness
//! 5. Saturation
//! 6. Grayscale
//! 7. Invert
//! 8. Four-color
//! 9. Blur
//! 10. Contrast
//! 11. Hue
//!
//! Each stage is skipped when its parameter is at the neutral value, so a
//! neutral [`ParameterSet`] leaves the image byte-for-byte unchanged.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::adjustments;
use crate::color;
use crate::error::EditError;
use crate::filter::{self, UNSHARP_AMOUNT, UNSHARP_THRESHOLD};
use crate::params::{FlipAxis, ParameterSet, BLUR_LIMIT, CONTRAST_LIMIT};
use crate::quantize::{self, FOUR_COLORS};
use crate::raster::{ColorMode, Raster};
use crate::transform::{self, InterpolationFilter};

/// One step of the editing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Rotate,
    Zoom,
    Flip,
    Brightness,
    Saturation,
    Grayscale,
    Invert,
    FourColor,
    Blur,
    Contrast,
    Hue,
}

impl Stage {
    /// The order in which [`ImageEditor::apply`] runs the stages.
    pub const ORDER: [Stage; 11] = [
        Stage::Rotate,
        Stage::Zoom,
        Stage::Flip,
        Stage::Brightness,
        Stage::Saturation,
        Stage::Grayscale,
        Stage::Invert,
        Stage::FourColor,
        Stage::Blur,
        Stage::Contrast,
        Stage::Hue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Rotate => "rotate",
            Stage::Zoom => "zoom",
            Stage::Flip => "flip",
            Stage::Brightness => "brightness",
            Stage::Saturation => "saturation",
            Stage::Grayscale => "grayscale",
            Stage::Invert => "invert",
            Stage::FourColor => "four_color",
            Stage::Blur => "blur",
            Stage::Contrast => "contrast",
            Stage::Hue => "hue",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stage that was skipped because it could not run on the current image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub stage: Stage,
    pub error: EditError,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} skipped: {}", self.stage, self.error)
    }
}

/// Stateful editor wrapping one raster.
///
/// Every stage method replaces the wrapped raster with its result. Stages
/// must be called in [`Stage::ORDER`] to reproduce [`ImageEditor::apply`].
#[derive(Debug, Clone)]
pub struct ImageEditor {
    image: Raster,
    filter: InterpolationFilter,
}

impl ImageEditor {
    /// Wrap a source raster. Palette images are expanded to RGB (or RGBA if
    /// the palette carries transparency).
    pub fn new(image: Raster) -> Self {
        let image = match image.mode() {
            ColorMode::Indexed | ColorMode::Hsv => image.into_direct(),
            _ => image,
        };
        Self {
            image,
            filter: InterpolationFilter::default(),
        }
    }

    /// Use `filter` for free-angle rotation.
    pub fn with_filter(mut self, filter: InterpolationFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn image(&self) -> &Raster {
        &self.image
    }

    pub fn into_image(self) -> Raster {
        self.image
    }

    /// Rotate counter-clockwise by `angle` degrees, expanding the canvas.
    pub fn rotate(&mut self, angle: f32) {
        if angle.rem_euclid(360.0) == 0.0 {
            return;
        }
        self.image = transform::apply_rotation(&self.image, angle as f64, self.filter);
    }

    /// Remove `border` pixels from every edge.
    ///
    /// # Errors
    ///
    /// [`EditError::Bounds`] when nothing would be left; the image is unchanged.
    pub fn zoom(&mut self, border: u32) -> Result<(), EditError> {
        if border == 0 {
            return Ok(());
        }
        self.image = transform::crop_border(&self.image, border)?;
        Ok(())
    }

    pub fn flip(&mut self, axis: FlipAxis) {
        if axis == FlipAxis::None {
            return;
        }
        self.image = transform::apply_flip(&self.image, axis);
    }

    pub fn brightness(&mut self, factor: f32) {
        if factor == 1.0 {
            return;
        }
        self.image = adjustments::adjust_brightness(&self.image, factor);
    }

    pub fn saturation(&mut self, factor: f32) {
        if factor == 1.0 {
            return;
        }
        self.image = adjustments::adjust_saturation(&self.image, factor);
    }

    pub fn grayscale(&mut self, enabled: bool) {
        if enabled {
            self.image = adjustments::to_grayscale(&self.image);
        }
    }

    /// Invert every channel.
    ///
    /// # Errors
    ///
    /// [`EditError::InvalidOperation`] for modes other than grayscale and
    /// RGB; the image is unchanged.
    pub fn invert(&mut self, enabled: bool) -> Result<(), EditError> {
        if enabled {
            self.image = adjustments::invert(&self.image)?;
        }
        Ok(())
    }

    /// Reduce to an adaptive four-color palette. The image stays indexed
    /// until a later stage needs direct colors.
    pub fn four_color(&mut self, enabled: bool) {
        if enabled {
            self.image = quantize::quantize(&self.image, FOUR_COLORS);
        }
    }

    /// Gaussian blur with `radius` as sigma.
    ///
    /// # Errors
    ///
    /// [`EditError::InvalidParameters`] above [`BLUR_LIMIT`].
    pub fn blur(&mut self, radius: f32) -> Result<(), EditError> {
        if !(radius > 0.0) {
            return Ok(());
        }
        check_limit("blur", radius, BLUR_LIMIT)?;
        self.image = filter::gaussian_blur(&self.image, radius)?;
        Ok(())
    }

    /// Unsharp mask with `strength` as the blur radius.
    ///
    /// # Errors
    ///
    /// [`EditError::InvalidParameters`] above [`CONTRAST_LIMIT`].
    pub fn contrast(&mut self, strength: f32) -> Result<(), EditError> {
        if !(strength > 0.0) {
            return Ok(());
        }
        check_limit("contrast", strength, CONTRAST_LIMIT)?;
        self.image = filter::unsharp_mask(&self.image, strength, UNSHARP_AMOUNT, UNSHARP_THRESHOLD)?;
        Ok(())
    }

    /// Shift hue by `shift` steps on the 256-step hue circle.
    pub fn hue(&mut self, shift: i32) {
        if shift == 0 {
            return;
        }
        self.image = color::shift_hue(&self.image, shift);
    }

    /// Run a single stage with its value from `params`.
    pub fn apply_stage(&mut self, stage: Stage, params: &ParameterSet) -> Result<(), EditError> {
        let ParameterSet {
            position,
            filters,
            effects,
        } = params;
        match stage {
            Stage::Rotate => self.rotate(position.rotation),
            Stage::Zoom => self.zoom(position.zoom)?,
            Stage::Flip => self.flip(position.flip),
            Stage::Brightness => self.brightness(filters.brightness),
            Stage::Saturation => self.saturation(filters.saturation),
            Stage::Grayscale => self.grayscale(filters.grayscale),
            Stage::Invert => self.invert(filters.invert)?,
            Stage::FourColor => self.four_color(filters.four_color),
            Stage::Blur => self.blur(effects.blur)?,
            Stage::Contrast => self.contrast(effects.contrast)?,
            Stage::Hue => self.hue(effects.hue),
        }
        Ok(())
    }

    /// Run all eleven stages in order.
    ///
    /// Stages that cannot run on the current color mode are skipped and
    /// reported as notices. Any other error stops the run.
    pub fn apply(&mut self, params: &ParameterSet) -> Result<Vec<Notice>, EditError> {
        self.run(params, None)
    }

    /// Like [`ImageEditor::apply`], checking `cancel` before every stage.
    ///
    /// # Errors
    ///
    /// [`EditError::Cancelled`] once the flag is set. Stages that already ran
    /// stay applied; no stage is ever half applied.
    pub fn apply_with_cancel(&mut self, params: &ParameterSet, cancel: &AtomicBool) -> Result<Vec<Notice>, EditError> {
        self.run(params, Some(cancel))
    }

    fn run(&mut self, params: &ParameterSet, cancel: Option<&AtomicBool>) -> Result<Vec<Notice>, EditError> {
        let mut notices = Vec::new();

        for stage in Stage::ORDER {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                log::debug!("Editing cancelled before {}", stage);
                return Err(EditError::Cancelled);
            }
            if params.is_stage_neutral(stage) {
                continue;
            }

            match self.apply_stage(stage, params) {
                Ok(()) => log::debug!(
                    "Applied {} -> {}x{} {}",
                    stage,
                    self.image.width(),
                    self.image.height(),
                    self.image.mode()
                ),
                Err(error) if error.is_recoverable() => {
                    let notice = Notice { stage, error };
                    log::warn!("{}", notice);
                    notices.push(notice);
                }
                Err(error) => return Err(error),
            }
        }

        Ok(notices)
    }
}

/// Refuse convolution radii above `limit`.
fn check_limit(stage: &'static str, value: f32, limit: f32) -> Result<(), EditError> {
    if value > limit {
        return Err(EditError::InvalidParameters(format!("{stage} of {value} is above {limit}")));
    }
    Ok(())
}
