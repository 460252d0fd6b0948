//! Shared full-run pipeline used by the controllers and the batch exporter.

use std::sync::atomic::AtomicBool;

use crate::editor::{ImageEditor, Notice};
use crate::error::EditError;
use crate::params::ParameterSet;
use crate::raster::Raster;
use crate::transform::InterpolationFilter;

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub image: Raster,
    pub notices: Vec<Notice>,
}

/// Runs every stage from an untouched source on each call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pipeline {
    filter: InterpolationFilter,
}

impl Pipeline {
    pub fn new(filter: InterpolationFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> InterpolationFilter {
        self.filter
    }

    /// Edit a copy of `source`; the source itself is never modified.
    ///
    /// # Errors
    ///
    /// [`EditError::InvalidParameters`] when `params` fails validation.
    pub fn run(&self, source: &Raster, params: &ParameterSet) -> Result<Rendered, EditError> {
        check(params)?;
        let mut editor = ImageEditor::new(source.clone()).with_filter(self.filter);
        let notices = editor.apply(params)?;
        Ok(Rendered {
            image: editor.into_image(),
            notices,
        })
    }

    /// Like [`Pipeline::run`], giving up with [`EditError::Cancelled`] once
    /// `cancel` is set.
    pub fn run_with_cancel(
        &self,
        source: &Raster,
        params: &ParameterSet,
        cancel: &AtomicBool,
    ) -> Result<Rendered, EditError> {
        check(params)?;
        let mut editor = ImageEditor::new(source.clone()).with_filter(self.filter);
        let notices = editor.apply_with_cancel(params, cancel)?;
        Ok(Rendered {
            image: editor.into_image(),
            notices,
        })
    }
}

fn check(params: &ParameterSet) -> Result<(), EditError> {
    params
        .validate()
        .map_err(|e| EditError::InvalidParameters(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ColorMode;

    #[test]
    fn test_run_leaves_source_untouched() {
        let source = Raster::solid(6, 6, ColorMode::Rgb, &[100, 50, 25]).unwrap();
        let mut params = ParameterSet::default();
        params.filters.invert = true;

        let rendered = Pipeline::default().run(&source, &params).unwrap();
        assert_eq!(rendered.image.pixel(0, 0), Some(&[155u8, 205, 230][..]));
        assert_eq!(source.pixel(0, 0), Some(&[100u8, 50, 25][..]));
    }

    #[test]
    fn test_repeated_runs_do_not_accumulate() {
        let source = Raster::solid(4, 4, ColorMode::Rgb, &[100, 100, 100]).unwrap();
        let mut params = ParameterSet::default();
        params.filters.brightness = 2.0;

        let pipeline = Pipeline::new(InterpolationFilter::Lanczos3);
        let first = pipeline.run(&source, &params).unwrap();
        let second = pipeline.run(&source, &params).unwrap();
        assert_eq!(first.image, second.image);
        assert_eq!(first.image.pixel(0, 0), Some(&[200u8, 200, 200][..]));
    }

    #[test]
    fn test_run_rejects_invalid_parameters() {
        let source = Raster::solid(4, 4, ColorMode::Rgb, &[9, 9, 9]).unwrap();
        let mut params = ParameterSet::default();
        params.effects.blur = f32::NAN;
        let err = Pipeline::default().run(&source, &params).unwrap_err();
        assert!(matches!(err, EditError::InvalidParameters(ref msg) if msg.contains("blur")), "{}", err);

        params.effects.blur = 0.0;
        params.effects.contrast = 1.0e9;
        assert!(matches!(
            Pipeline::default().run(&source, &params),
            Err(EditError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_run_with_cancel() {
        let source = Raster::solid(4, 4, ColorMode::Luma, &[1]).unwrap();
        let mut params = ParameterSet::default();
        params.effects.blur = 1.0;
        let cancel = AtomicBool::new(true);
        let err = Pipeline::default().run_with_cancel(&source, &params, &cancel).unwrap_err();
        assert_eq!(err, EditError::Cancelled);
    }
}
