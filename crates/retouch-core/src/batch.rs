//! Batch export: one parameter set applied to every image in a directory.
//!
//! A [`BatchJob`] is enumerated once and never changes afterwards. Exporting
//! runs the full pipeline on each item and writes
//! `destination/<basename>.<extension>`, overwriting existing files. A
//! failing item is recorded in the [`BatchReport`] and the remaining items
//! still run.

use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use thiserror::Error;

use crate::codec::{self, DecodeError, EncodeError, FileFormat, QualityPolicy};
use crate::editor::Notice;
use crate::error::EditError;
use crate::params::ParameterSet;
use crate::pipeline::Pipeline;

/// File name suffixes picked up by enumeration. Matching is case-sensitive.
pub const SUPPORTED_SUFFIXES: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// Errors from listing a directory or processing one batch item.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Failed to list {path}: {source}")]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("Failed to edit {path}: {source}")]
    Edit {
        path: PathBuf,
        #[source]
        source: EditError,
    },

    #[error("Failed to export {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: EncodeError,
    },
}

/// One source image of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub path: PathBuf,
    /// File name up to the last dot.
    pub basename: String,
    /// File name after the last dot, as found on disk.
    pub extension: String,
}

impl BatchItem {
    fn from_file_name(dir: &Path, name: &str) -> Option<Self> {
        let (basename, extension) = name.rsplit_once('.')?;
        Some(Self {
            path: dir.join(name),
            basename: basename.to_string(),
            extension: extension.to_string(),
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.basename, self.extension)
    }

    /// Where this item is written in `destination`.
    pub fn output_path(&self, destination: &Path) -> PathBuf {
        destination.join(self.file_name())
    }
}

/// An ordered, immutable set of images sharing one export pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    source_dir: PathBuf,
    items: Vec<BatchItem>,
}

impl BatchJob {
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Result for one batch item.
#[derive(Debug)]
pub enum ItemOutcome {
    Exported {
        source: PathBuf,
        output: PathBuf,
        notices: Vec<Notice>,
    },
    Failed {
        source: PathBuf,
        error: BatchError,
    },
}

impl ItemOutcome {
    pub fn source(&self) -> &Path {
        match self {
            ItemOutcome::Exported { source, .. } | ItemOutcome::Failed { source, .. } => source,
        }
    }
}

/// Per-item results of an export pass, in job order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    /// Output paths of the items that were written.
    pub fn exported(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ItemOutcome::Exported { output, .. } => Some(output.as_path()),
                ItemOutcome::Failed { .. } => None,
            })
            .collect()
    }

    /// Items that failed, with their errors.
    pub fn failed(&self) -> Vec<(&Path, &BatchError)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ItemOutcome::Failed { source, error } => Some((source.as_path(), error)),
                ItemOutcome::Exported { .. } => None,
            })
            .collect()
    }

    /// Whether every item was exported.
    pub fn is_complete(&self) -> bool {
        self.outcomes
            .iter()
            .all(|outcome| matches!(outcome, ItemOutcome::Exported { .. }))
    }
}

/// List the supported image files in `dir`, sorted by name.
///
/// Only regular files whose names end in `.png`, `.jpg` or `.jpeg` are
/// returned; directories and other files are skipped.
pub fn list_images(dir: impl AsRef<Path>) -> Result<Vec<String>, BatchError> {
    let dir = dir.as_ref();
    let list_error = |source| BatchError::ListDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_error)? {
        let entry = entry.map_err(list_error)?;
        if !entry.path().is_file() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            log::debug!("Skipping non UTF-8 file name in {}", dir.display());
            continue;
        };
        if SUPPORTED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

/// Enumerate the images in `dir` into a batch job.
pub fn enumerate(dir: impl AsRef<Path>) -> Result<BatchJob, BatchError> {
    let dir = dir.as_ref();
    let items: Vec<BatchItem> = list_images(dir)?
        .iter()
        .filter_map(|name| BatchItem::from_file_name(dir, name))
        .collect();

    log::info!("Found {} images in {}", items.len(), dir.display());
    Ok(BatchJob {
        source_dir: dir.to_path_buf(),
        items,
    })
}

/// Run the pipeline on every item of `job` and write the results to
/// `destination`.
pub fn apply_and_export(job: &BatchJob, params: &ParameterSet, destination: impl AsRef<Path>) -> BatchReport {
    apply_and_export_with(&Pipeline::default(), job, params, destination.as_ref())
}

/// [`apply_and_export`] with an explicit pipeline configuration.
pub fn apply_and_export_with(
    pipeline: &Pipeline,
    job: &BatchJob,
    params: &ParameterSet,
    destination: &Path,
) -> BatchReport {
    let run = |item: &BatchItem| match export_item(pipeline, item, params, destination) {
        Ok((output, notices)) => ItemOutcome::Exported {
            source: item.path.clone(),
            output,
            notices,
        },
        Err(error) => {
            log::warn!("{}", error);
            ItemOutcome::Failed {
                source: item.path.clone(),
                error,
            }
        }
    };

    #[cfg(feature = "parallel")]
    let outcomes: Vec<ItemOutcome> = job.items.par_iter().map(run).collect();
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<ItemOutcome> = job.items.iter().map(run).collect();

    let report = BatchReport { outcomes };
    log::info!(
        "Batch export to {}: {} exported, {} failed",
        destination.display(),
        report.exported().len(),
        report.failed().len()
    );
    report
}

/// Decode, edit and encode one item. Returns the output path and any notices.
pub fn export_item(
    pipeline: &Pipeline,
    item: &BatchItem,
    params: &ParameterSet,
    destination: &Path,
) -> Result<(PathBuf, Vec<Notice>), BatchError> {
    let source = codec::decode(&item.path).map_err(|source| BatchError::Decode {
        path: item.path.clone(),
        source,
    })?;

    let rendered = pipeline
        .run(&source.raster, params)
        .map_err(|source| BatchError::Edit {
            path: item.path.clone(),
            source,
        })?;

    let output = item.output_path(destination);
    let policy = match FileFormat::from_extension(&item.extension) {
        Some(target) => QualityPolicy::for_export(Some(source.format), source.jpeg_quality, target),
        None => QualityPolicy::Maximum,
    };

    codec::encode(rendered.image, &output, policy).map_err(|source| BatchError::Encode {
        path: output.clone(),
        source,
    })?;

    Ok((output, rendered.notices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{ColorMode, Raster};

    fn write_image(dir: &Path, name: &str, color: [u8; 3]) {
        let raster = Raster::solid(12, 10, ColorMode::Rgb, &color).unwrap();
        codec::encode(raster, dir.join(name), QualityPolicy::Maximum).unwrap();
    }

    #[test]
    fn test_enumerate_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "b.jpg", [0, 255, 0]);
        write_image(dir.path(), "a.png", [255, 0, 0]);
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

        let job = enumerate(dir.path()).unwrap();
        assert_eq!(job.len(), 2);
        assert_eq!(job.items()[0].file_name(), "a.png");
        assert_eq!(job.items()[1].basename, "b");
        assert_eq!(job.items()[1].extension, "jpg");
        assert_eq!(job.source_dir(), dir.path());
    }

    #[test]
    fn test_invalid_parameters_fail_every_item() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write_image(src.path(), "a.png", [10, 20, 30]);
        write_image(src.path(), "b.png", [40, 50, 60]);

        let mut params = ParameterSet::default();
        params.effects.blur = f32::NAN;

        let job = enumerate(src.path()).unwrap();
        let report = apply_and_export(&job, &params, dst.path());

        let failed = report.failed();
        assert_eq!(failed.len(), 2);
        assert!(failed
            .iter()
            .all(|(_, error)| matches!(error, BatchError::Edit { source: EditError::InvalidParameters(_), .. })));
        assert_eq!(std::fs::read_dir(dst.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_list_is_case_sensitive_and_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "upper.PNG", [1, 2, 3]);
        write_image(dir.path(), "photo.jpeg", [1, 2, 3]);
        write_image(dir.path(), "archive.tar.png", [1, 2, 3]);
        std::fs::create_dir(dir.path().join("folder.png")).unwrap();

        let names = list_images(dir.path()).unwrap();
        assert_eq!(names, vec!["archive.tar.png", "photo.jpeg"]);

        let job = enumerate(dir.path()).unwrap();
        assert_eq!(job.items()[0].basename, "archive.tar");
        assert_eq!(job.items()[0].extension, "png");
    }

    #[test]
    fn test_list_missing_directory() {
        let err = list_images("/nonexistent/batch").unwrap_err();
        assert!(matches!(err, BatchError::ListDirectory { .. }));
    }

    #[test]
    fn test_export_writes_every_item() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write_image(src.path(), "a.png", [255, 0, 0]);
        write_image(src.path(), "b.jpg", [0, 255, 0]);
        std::fs::write(src.path().join("notes.txt"), "skip me").unwrap();

        let mut params = ParameterSet::default();
        params.position.zoom = 1;
        params.filters.grayscale = true;

        let job = enumerate(src.path()).unwrap();
        let report = apply_and_export(&job, &params, dst.path());

        assert!(report.is_complete());
        assert_eq!(report.exported().len(), 2);

        let mut written: Vec<String> = std::fs::read_dir(dst.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        written.sort();
        assert_eq!(written, vec!["a.png", "b.jpg"]);

        let out = codec::decode(dst.path().join("a.png")).unwrap().raster;
        assert_eq!(out.dimensions(), (10, 8));
        let px = out.pixel(0, 0).unwrap();
        assert!(px[0] == px[1] && px[1] == px[2]);
    }

    #[test]
    fn test_corrupt_item_does_not_abort_batch() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write_image(src.path(), "a.png", [10, 20, 30]);
        std::fs::write(src.path().join("b.jpg"), b"definitely not a jpeg").unwrap();
        write_image(src.path(), "c.png", [30, 20, 10]);

        let job = enumerate(src.path()).unwrap();
        let report = apply_and_export(&job, &ParameterSet::default(), dst.path());

        assert!(!report.is_complete());
        assert_eq!(report.exported().len(), 2);
        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].0.ends_with("b.jpg"));
        assert!(matches!(failed[0].1, BatchError::Decode { .. }));

        // Report order follows job order
        assert!(report.outcomes[1].source().ends_with("b.jpg"));
        assert!(!dst.path().join("b.jpg").exists());
    }

    #[test]
    fn test_unwritable_destination_is_reported_per_item() {
        let src = tempfile::tempdir().unwrap();
        write_image(src.path(), "a.png", [10, 20, 30]);
        let missing = src.path().join("does-not-exist");

        let job = enumerate(src.path()).unwrap();
        let report = apply_and_export(&job, &ParameterSet::default(), &missing);

        let failed = report.failed();
        assert_eq!(failed.len(), 1);
        match failed[0].1 {
            BatchError::Encode { path, .. } => assert_eq!(path, &missing.join("a.png")),
            other => panic!("Expected Encode error, got: {:?}", other),
        }
    }

    #[test]
    fn test_export_overwrites_existing_files() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write_image(src.path(), "a.png", [10, 20, 30]);
        std::fs::write(dst.path().join("a.png"), b"old").unwrap();

        let job = enumerate(src.path()).unwrap();
        assert!(apply_and_export(&job, &ParameterSet::default(), dst.path()).is_complete());
        assert!(codec::decode(dst.path().join("a.png")).is_ok());
    }

    #[test]
    fn test_bounds_error_fails_small_items_only() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let big = Raster::solid(40, 40, ColorMode::Rgb, &[5, 5, 5]).unwrap();
        codec::encode(big, src.path().join("big.png"), QualityPolicy::Maximum).unwrap();
        write_image(src.path(), "small.png", [5, 5, 5]);

        let mut params = ParameterSet::default();
        params.position.zoom = 6;

        let job = enumerate(src.path()).unwrap();
        let report = apply_and_export(&job, &params, dst.path());
        assert_eq!(report.exported().len(), 1);
        assert!(matches!(
            report.failed()[0].1,
            BatchError::Edit {
                source: EditError::Bounds { .. },
                ..
            }
        ));
    }
}
