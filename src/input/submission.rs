use std::collections::BTreeMap;
use std::path::Path;

use crate::input::ids::{SubVid, extract_fold, extract_scenario};
use crate::input::{Annotations, InputError, find_annotation_files, read_annotations, relative_key};

/// One predicted annotation file of a submission.
#[derive(Debug, Clone)]
pub struct PredictedFile {
    /// Path relative to the results directory, starting with the scenario.
    pub key: String,
    pub stem: String,
    pub subvid: SubVid,
    pub fold: Option<String>,
    pub annotations: Annotations,
}

impl PredictedFile {
    pub fn new(key: impl Into<String>, annotations: Annotations) -> Result<Self, InputError> {
        let key = key.into();
        let file_name = key.rsplit('/').next().unwrap_or(&key);
        let stem = file_name
            .strip_suffix(".csv")
            .unwrap_or(file_name)
            .to_string();
        let subvid = SubVid::parse(&stem).ok_or_else(|| {
            InputError::InvalidInput(format!(
                "annotation file {key} is not named sub_<subject>_vid_<video>.csv"
            ))
        })?;
        let fold = extract_fold(&key);
        Ok(Self {
            key,
            stem,
            subvid,
            fold,
            annotations,
        })
    }
}

/// Predicted files of one scenario directory, in discovery order.
#[derive(Debug, Clone)]
pub struct ScenarioSubmission {
    pub scenario: String,
    files: Vec<PredictedFile>,
}

impl ScenarioSubmission {
    pub fn load(scenario_dir: &Path) -> Result<Self, InputError> {
        let scenario = scenario_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                InputError::InvalidInput(format!(
                    "scenario directory {} has no name",
                    scenario_dir.display()
                ))
            })?;
        if extract_scenario(&scenario).as_deref() != Some(scenario.as_str()) {
            tracing::warn!(scenario = %scenario, "directory is not named scenario_<n>");
        }
        let base = scenario_dir.parent().unwrap_or(scenario_dir);

        let mut files = Vec::new();
        for path in find_annotation_files(scenario_dir)? {
            let key = relative_key(&path, base);
            let annotations = read_annotations(&path)?;
            if annotations.is_empty() {
                tracing::warn!(file = %key, "predicted file has no rows");
            } else {
                tracing::trace!(file = %key, rows = annotations.len(), "read predictions");
            }
            files.push(PredictedFile::new(key, annotations)?);
        }
        tracing::debug!(scenario = %scenario, files = files.len(), "loaded predictions");
        Ok(Self { scenario, files })
    }

    pub fn from_files(scenario: impl Into<String>, files: Vec<PredictedFile>) -> Self {
        Self {
            scenario: scenario.into(),
            files,
        }
    }

    pub fn files(&self) -> &[PredictedFile] {
        &self.files
    }

    /// Files per `sub_<id>` key; each group keeps file order.
    pub fn group_by_subject(&self) -> BTreeMap<String, Vec<&PredictedFile>> {
        self.group_by(|f| f.subvid.subject_key())
    }

    /// Files per `vid_<id>` key; each group keeps file order.
    pub fn group_by_video(&self) -> BTreeMap<String, Vec<&PredictedFile>> {
        self.group_by(|f| f.subvid.video_key())
    }

    fn group_by<F>(&self, key: F) -> BTreeMap<String, Vec<&PredictedFile>>
    where
        F: Fn(&PredictedFile) -> String,
    {
        let mut groups: BTreeMap<String, Vec<&PredictedFile>> = BTreeMap::new();
        for file in &self.files {
            groups.entry(key(file)).or_default().push(file);
        }
        groups
    }

    /// Distinct fold ids present in the scenario.
    pub fn folds(&self) -> Vec<&str> {
        let mut folds = self
            .files
            .iter()
            .filter_map(|f| f.fold.as_deref())
            .collect::<Vec<_>>();
        folds.sort_unstable();
        folds.dedup();
        folds
    }
}
