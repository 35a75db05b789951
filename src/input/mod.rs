use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

pub mod annotations;
pub mod ground_truth;
pub mod id_map;
pub mod ids;
pub mod scores;
pub mod submission;

pub use annotations::{Annotations, read_annotations};
pub use ground_truth::{GroundTruth, TestAnnotations};
pub use id_map::IdMap;
pub use ids::SubVid;
pub use scores::{LoadOptions, ScoresTable, TableOrder, load_scores};
pub use submission::{PredictedFile, ScenarioSubmission};

/// Directory names that hold annotation CSVs: `.../test/annotations/*.csv`.
pub const ANNOTATIONS_DIR: &str = "annotations";
pub const SPLIT_DIR: &str = "test";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing column '{column}' in {}", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("invalid value '{value}' in column '{column}' of {} (row {row})", .path.display())]
    InvalidValue {
        path: PathBuf,
        column: &'static str,
        row: usize,
        value: String,
    },
    #[error("no ground truth matches submitted file {0}")]
    GroundTruthNotFound(String),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Every annotation CSV below `root`, sorted by path. Symlinked
/// directories are not descended into.
pub fn find_annotation_files(root: &Path) -> Result<Vec<PathBuf>, InputError> {
    if !root.is_dir() {
        return Err(InputError::MissingInput(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    let mut out = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_dir() && is_annotation_file(entry.path()) {
            out.push(entry.into_path());
        }
    }
    out.sort();
    Ok(out)
}

fn is_annotation_file(path: &Path) -> bool {
    if path.extension().is_none_or(|ext| ext != "csv") {
        return false;
    }
    let parent = path.parent();
    let grandparent = parent.and_then(Path::parent);
    parent.and_then(Path::file_name).is_some_and(|n| n == ANNOTATIONS_DIR)
        && grandparent
            .and_then(Path::file_name)
            .is_some_and(|n| n == SPLIT_DIR)
}

/// `path` relative to `base`, joined with `/` regardless of platform.
pub fn relative_key(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Immediate subdirectories of `dir`, sorted by name.
pub fn list_dirs(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
