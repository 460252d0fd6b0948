//! Single-image and batch editing sessions.
//!
//! Both controllers own a [`Pipeline`] and re-run it from the untouched
//! source whenever the parameters change. Neither builds on the other; the
//! editing mode is chosen once with [`EditingMode`] when a [`Controller`] is
//! created.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::batch::{self, BatchError, BatchJob, BatchReport};
use crate::codec::{self, DecodeError, DecodedSource, EncodeError, FileFormat, QualityPolicy};
use crate::editor::Notice;
use crate::error::EditError;
use crate::params::{ParamError, ParameterSet};
use crate::pipeline::Pipeline;
use crate::raster::Raster;

/// Errors surfaced to the presentation layer.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Params(#[from] ParamError),

    #[error("Export name must not be empty")]
    EmptyName,
}

/// Whether a session edits one image or a directory of images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditingMode {
    Single,
    Batch,
}

/// Editing session for one image.
#[derive(Debug, Clone)]
pub struct SingleImageController {
    pipeline: Pipeline,
    source: DecodedSource,
    params: ParameterSet,
    output: Raster,
    notices: Vec<Notice>,
}

impl SingleImageController {
    /// Decode `path` and start with neutral parameters.
    pub fn open(path: impl AsRef<Path>, pipeline: Pipeline) -> Result<Self, ControllerError> {
        Ok(Self::new(codec::decode(path)?, pipeline))
    }

    pub fn new(source: DecodedSource, pipeline: Pipeline) -> Self {
        let output = source.raster.clone();
        Self {
            pipeline,
            source,
            params: ParameterSet::default(),
            output,
            notices: Vec::new(),
        }
    }

    pub fn original(&self) -> &Raster {
        &self.source.raster
    }

    pub fn source_format(&self) -> FileFormat {
        self.source.format
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    /// The result of the last successful run.
    pub fn output(&self) -> &Raster {
        &self.output
    }

    /// Notices from the last successful run.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Re-run the whole pipeline from the original image with `params`.
    ///
    /// On error the previous parameters and output are kept.
    pub fn parameters_changed(&mut self, params: ParameterSet) -> Result<&[Notice], ControllerError> {
        params.validate()?;
        let rendered = self.pipeline.run(&self.source.raster, &params)?;

        self.params = params;
        self.output = rendered.image;
        self.notices = rendered.notices;
        Ok(&self.notices)
    }

    /// Write the current output to `dir/<name>.<extension>`.
    ///
    /// Spaces in `name` become underscores. `extension` must be `jpg`,
    /// `jpeg` or `png`; an existing file is overwritten.
    pub fn export(&self, name: &str, extension: &str, dir: impl AsRef<Path>) -> Result<PathBuf, ControllerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ControllerError::EmptyName);
        }
        let target = FileFormat::from_extension(extension)
            .ok_or_else(|| EncodeError::UnsupportedExtension(extension.to_string()))?;

        let path = dir.as_ref().join(format!("{}.{}", name.replace(' ', "_"), extension));
        codec::encode(self.output.clone(), &path, self.quality_for(target))?;
        Ok(path)
    }

    /// Encode the current output in memory, with the same quality rules as
    /// [`SingleImageController::export`].
    pub fn encode_output(&self, target: FileFormat) -> Result<Vec<u8>, ControllerError> {
        Ok(codec::encode_to_vec(&self.output, target, self.quality_for(target))?)
    }

    fn quality_for(&self, target: FileFormat) -> QualityPolicy {
        QualityPolicy::for_export(Some(self.source.format), self.source.jpeg_quality, target)
    }
}

/// Editing session for a directory of images sharing one parameter set.
#[derive(Debug, Clone)]
pub struct BatchController {
    pipeline: Pipeline,
    job: BatchJob,
    params: ParameterSet,
    /// `None` until the first preview request; `Some(None)` when the first
    /// item could not be decoded.
    preview_source: Option<Option<Raster>>,
    preview: Option<Raster>,
}

impl BatchController {
    /// Enumerate `dir` and start with neutral parameters.
    pub fn open(dir: impl AsRef<Path>, pipeline: Pipeline) -> Result<Self, ControllerError> {
        Ok(Self::new(batch::enumerate(dir)?, pipeline))
    }

    /// Nothing is decoded until a preview is requested.
    pub fn new(job: BatchJob, pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            job,
            params: ParameterSet::default(),
            preview_source: None,
            preview: None,
        }
    }

    pub fn job(&self) -> &BatchJob {
        &self.job
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    /// The first item rendered with the current parameters, if it has been
    /// loaded with [`BatchController::load_preview`].
    pub fn preview(&self) -> Option<&Raster> {
        self.preview.as_ref()
    }

    /// Decode the first item on first use and render it with the current
    /// parameters. If it cannot be decoded there is no preview, but the job
    /// can still be exported.
    pub fn load_preview(&mut self) -> Option<&Raster> {
        if self.preview_source.is_none() {
            let decoded = self.job.items().first().and_then(|item| match codec::decode(&item.path) {
                Ok(source) => Some(source.raster),
                Err(e) => {
                    log::warn!("No preview for {}: {}", item.path.display(), e);
                    None
                }
            });
            self.preview_source = Some(decoded);
        }
        if self.preview.is_none() {
            if let Some(Some(source)) = &self.preview_source {
                match self.pipeline.run(source, &self.params) {
                    Ok(rendered) => self.preview = Some(rendered.image),
                    Err(e) => log::warn!("Preview render failed: {}", e),
                }
            }
        }
        self.preview.as_ref()
    }

    /// Store `params` for the next export and refresh a loaded preview.
    pub fn parameters_changed(&mut self, params: ParameterSet) -> Result<Vec<Notice>, ControllerError> {
        params.validate()?;
        let mut notices = Vec::new();
        if let Some(Some(source)) = &self.preview_source {
            let rendered = self.pipeline.run(source, &params)?;
            self.preview = Some(rendered.image);
            notices = rendered.notices;
        }
        self.params = params;
        Ok(notices)
    }

    /// Export every item with the current parameters.
    pub fn export_all(&self, destination: impl AsRef<Path>) -> BatchReport {
        batch::apply_and_export_with(&self.pipeline, &self.job, &self.params, destination.as_ref())
    }
}

/// A session in either editing mode.
#[derive(Debug, Clone)]
pub enum Controller {
    Single(SingleImageController),
    Batch(BatchController),
}

impl Controller {
    /// Open `path` as a single image or as a batch directory.
    pub fn new(mode: EditingMode, path: impl AsRef<Path>, pipeline: Pipeline) -> Result<Self, ControllerError> {
        Ok(match mode {
            EditingMode::Single => Controller::Single(SingleImageController::open(path, pipeline)?),
            EditingMode::Batch => Controller::Batch(BatchController::open(path, pipeline)?),
        })
    }

    pub fn mode(&self) -> EditingMode {
        match self {
            Controller::Single(_) => EditingMode::Single,
            Controller::Batch(_) => EditingMode::Batch,
        }
    }

    pub fn parameters(&self) -> &ParameterSet {
        match self {
            Controller::Single(c) => c.parameters(),
            Controller::Batch(c) => c.parameters(),
        }
    }

    /// Feed a parameter change to the active controller.
    pub fn parameters_changed(&mut self, params: ParameterSet) -> Result<Vec<Notice>, ControllerError> {
        match self {
            Controller::Single(c) => c.parameters_changed(params).map(<[Notice]>::to_vec),
            Controller::Batch(c) => c.parameters_changed(params),
        }
    }

    /// The image to display: the edited image, or the batch preview.
    pub fn display(&self) -> Option<&Raster> {
        match self {
            Controller::Single(c) => Some(c.output()),
            Controller::Batch(c) => c.preview(),
        }
    }
}
