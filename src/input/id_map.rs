use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::input::{InputError, SubVid};

/// Original-to-anonymized ids of one scenario, as stored on disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioIds {
    #[serde(default)]
    pub subjects: BTreeMap<String, u32>,
    #[serde(default)]
    pub videos: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Reverse {
    subjects: BTreeMap<String, String>,
    videos: BTreeMap<String, String>,
}

/// Translates anonymized subject/video ids back to the original ones.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    new_to_old: BTreeMap<String, Reverse>,
}

impl IdMap {
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text).map_err(|source| InputError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let old_to_new: BTreeMap<String, ScenarioIds> = serde_json::from_str(text)?;
        Ok(Self::from_old_to_new(old_to_new))
    }

    pub fn from_old_to_new(old_to_new: BTreeMap<String, ScenarioIds>) -> Self {
        let new_to_old = old_to_new
            .into_iter()
            .map(|(scenario, ids)| {
                let reverse = Reverse {
                    subjects: invert(ids.subjects),
                    videos: invert(ids.videos),
                };
                (scenario, reverse)
            })
            .collect();
        Self { new_to_old }
    }

    pub fn original_subject(&self, scenario: &str, subject: &str) -> Option<&str> {
        self.new_to_old
            .get(scenario)?
            .subjects
            .get(subject)
            .map(String::as_str)
    }

    pub fn original_video(&self, scenario: &str, video: &str) -> Option<&str> {
        self.new_to_old
            .get(scenario)?
            .videos
            .get(video)
            .map(String::as_str)
    }

    pub fn original_subvid(&self, scenario: &str, subvid: &SubVid) -> Option<SubVid> {
        Some(SubVid::new(
            self.original_subject(scenario, &subvid.subject)?,
            self.original_video(scenario, &subvid.video)?,
        ))
    }
}

fn invert(ids: BTreeMap<String, u32>) -> BTreeMap<String, String> {
    ids.into_iter()
        .map(|(old, new)| (new.to_string(), old))
        .collect()
}
