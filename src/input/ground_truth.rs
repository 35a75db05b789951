use std::collections::BTreeMap;
use std::path::Path;

use crate::input::ids::ground_truth_key;
use crate::input::{Annotations, InputError, find_annotation_files, read_annotations, relative_key};

/// Source of the reference annotations a submitted file is scored against.
pub trait GroundTruth {
    /// Annotations matching a submitted file key such as
    /// `scenario_2/fold_0/test/annotations/sub_1_vid_2.csv`.
    fn lookup(&self, file_key: &str) -> Result<&Annotations, InputError>;
}

/// Test annotations loaded eagerly, keyed by path relative to the test root.
#[derive(Debug, Clone, Default)]
pub struct TestAnnotations {
    by_key: BTreeMap<String, Annotations>,
}

impl TestAnnotations {
    pub fn load(test_dir: &Path) -> Result<Self, InputError> {
        let mut by_key = BTreeMap::new();
        for path in find_annotation_files(test_dir)? {
            let key = relative_key(&path, test_dir);
            by_key.insert(key, read_annotations(&path)?);
        }
        let truth = Self { by_key };
        if truth.is_empty() {
            return Err(InputError::MissingInput(format!(
                "no test annotations under {}",
                test_dir.display()
            )));
        }
        tracing::info!(
            files = truth.len(),
            dir = %test_dir.display(),
            "loaded test annotations"
        );
        Ok(truth)
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Annotations)>,
    {
        Self {
            by_key: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl GroundTruth for TestAnnotations {
    fn lookup(&self, file_key: &str) -> Result<&Annotations, InputError> {
        ground_truth_key(file_key)
            .and_then(|key| self.by_key.get(key))
            .ok_or_else(|| InputError::GroundTruthNotFound(file_key.to_string()))
    }
}
