use std::fmt;

/// Subject/video pair encoded in an annotation file stem, `sub_<S>_vid_<V>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubVid {
    pub subject: String,
    pub video: String,
}

impl SubVid {
    pub fn new(subject: impl Into<String>, video: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            video: video.into(),
        }
    }

    pub fn parse(stem: &str) -> Option<Self> {
        let mut parts = stem.split('_');
        let (Some("sub"), Some(subject), Some("vid"), Some(video), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return None;
        };
        if subject.is_empty() || video.is_empty() {
            return None;
        }
        Some(Self::new(subject, video))
    }

    pub fn subject_key(&self) -> String {
        format!("sub_{}", self.subject)
    }

    pub fn video_key(&self) -> String {
        format!("vid_{}", self.video)
    }
}

impl fmt::Display for SubVid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub_{}_vid_{}", self.subject, self.video)
    }
}

/// First `fold_<digit>` in a path key, e.g. `fold_3`.
pub fn extract_fold(path_key: &str) -> Option<String> {
    first_tagged_digit(path_key, "fold_")
}

/// First `scenario_<digit>` in a path key, e.g. `scenario_2`.
pub fn extract_scenario(path_key: &str) -> Option<String> {
    first_tagged_digit(path_key, "scenario_")
}

fn first_tagged_digit(haystack: &str, tag: &str) -> Option<String> {
    haystack.match_indices(tag).find_map(|(idx, _)| {
        let digit_at = idx + tag.len();
        let digit = haystack[digit_at..].chars().next()?;
        digit
            .is_ascii_digit()
            .then(|| haystack[idx..digit_at + 1].to_string())
    })
}

/// Ground-truth key of a submitted file: the span from the first
/// `scenario_` to the last `.csv`, with at least one character between.
pub fn ground_truth_key(path_key: &str) -> Option<&str> {
    const TAG: &str = "scenario_";
    const EXT: &str = ".csv";
    let start = path_key.find(TAG)?;
    let ext_at = path_key.rfind(EXT)?;
    if ext_at <= start + TAG.len() {
        return None;
    }
    Some(&path_key[start..ext_at + EXT.len()])
}
