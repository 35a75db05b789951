use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::metrics::{Metric, MetricRecord};

/// One tier of the score hierarchy, in the order it is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Files,
    Subjects,
    Videos,
    Folds,
    Scenarios,
    ScenarioSubjects,
    ScenarioVideos,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Files,
        Level::Subjects,
        Level::Videos,
        Level::Folds,
        Level::Scenarios,
        Level::ScenarioSubjects,
        Level::ScenarioVideos,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Files => "files_level",
            Level::Subjects => "subjects_level",
            Level::Videos => "videos_level",
            Level::Folds => "folds_level",
            Level::Scenarios => "scenarios_level",
            Level::ScenarioSubjects => "scenarios_level-subjects",
            Level::ScenarioVideos => "scenarios_level-videos",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Signal {
    Arousal,
    Valence,
}

impl Signal {
    pub const ALL: [Signal; 2] = [Signal::Arousal, Signal::Valence];

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Arousal => "arousal",
            Signal::Valence => "valence",
        }
    }
}

/// Aggregation history of a stored statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatKind {
    Raw,
    Mean,
    Std,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricKey {
    pub metric: Metric,
    pub kind: StatKind,
}

impl MetricKey {
    pub fn raw(metric: Metric) -> Self {
        Self {
            metric,
            kind: StatKind::Raw,
        }
    }

    pub fn mean(metric: Metric) -> Self {
        Self {
            metric,
            kind: StatKind::Mean,
        }
    }

    pub fn std(metric: Metric) -> Self {
        Self {
            metric,
            kind: StatKind::Std,
        }
    }

    /// Key used in the persisted document.
    pub fn label(&self) -> String {
        match self.kind {
            StatKind::Raw => self.metric.name().to_string(),
            StatKind::Mean => format!("{}-mean", self.metric.name()),
            StatKind::Std => format!("{}-std", self.metric.name()),
        }
    }
}

/// Address of a leaf below `level -> scenario`.
///
/// `groups` holds the grouping segments outermost first, e.g.
/// `[fold_0, sub_1_vid_2]` at files level of a folded scenario, `[fold_0]`
/// at folds level, `[]` at scenario level.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScorePath {
    pub groups: Vec<String>,
    pub signal: Signal,
    pub metric: MetricKey,
}

impl ScorePath {
    pub fn new(groups: Vec<String>, signal: Signal, metric: MetricKey) -> Self {
        Self {
            groups,
            signal,
            metric,
        }
    }

    /// Drops the innermost group segment. `None` when there is none left.
    pub fn collapse(&self) -> Option<ScorePath> {
        let (_, outer) = self.groups.split_last()?;
        Some(ScorePath {
            groups: outer.to_vec(),
            signal: self.signal,
            metric: self.metric,
        })
    }

    pub fn with_kind(&self, kind: StatKind) -> ScorePath {
        ScorePath {
            groups: self.groups.clone(),
            signal: self.signal,
            metric: MetricKey {
                metric: self.metric.metric,
                kind,
            },
        }
    }

    pub fn segments(&self) -> Vec<String> {
        let mut out = self.groups.clone();
        out.push(self.signal.as_str().to_string());
        out.push(self.metric.label());
        out
    }
}

impl fmt::Display for ScorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments().join("/"))
    }
}

/// Leaves of one `(level, scenario)` pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subtree {
    leaves: BTreeMap<ScorePath, f64>,
}

impl Subtree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: ScorePath, value: f64) -> Option<f64> {
        self.leaves.insert(path, value)
    }

    pub fn get(&self, path: &ScorePath) -> Option<f64> {
        self.leaves.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ScorePath, f64)> + '_ {
        self.leaves.iter().map(|(path, &value)| (path, value))
    }

    /// Stores every metric of `record` as a raw leaf under `groups/signal`.
    pub fn insert_record(&mut self, groups: &[String], signal: Signal, record: &MetricRecord) {
        for (&metric, &value) in record {
            self.insert(
                ScorePath::new(groups.to_vec(), signal, MetricKey::raw(metric)),
                value,
            );
        }
    }

    /// Rewrites the innermost group segment of every leaf. When two
    /// segments map to the same name, the leaf visited first is kept.
    pub fn map_innermost_group<F, E>(&self, mut f: F) -> Result<Subtree, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        let mut out = Subtree::new();
        for (path, value) in self.iter() {
            let mut mapped = path.clone();
            if let Some(segment) = mapped.groups.last_mut() {
                *segment = f(segment)?;
            }
            if out.leaves.contains_key(&mapped) {
                tracing::warn!(from = %path, to = %mapped, "duplicate leaf after renaming; keeping first");
                continue;
            }
            out.insert(mapped, value);
        }
        Ok(out)
    }

    pub fn to_json_value(&self) -> Value {
        let mut root = Map::new();
        for (path, value) in self.iter() {
            insert_nested(&mut root, &path.segments(), json_number(value));
        }
        Value::Object(root)
    }
}

/// Score hierarchy of one team: `level -> scenario -> subtree`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreTree {
    levels: BTreeMap<Level, BTreeMap<String, Subtree>>,
}

impl ScoreTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subtree(&self, level: Level, scenario: &str) -> Option<&Subtree> {
        self.levels.get(&level)?.get(scenario)
    }

    pub fn subtree_mut(&mut self, level: Level, scenario: &str) -> &mut Subtree {
        self.levels
            .entry(level)
            .or_default()
            .entry(scenario.to_string())
            .or_default()
    }

    pub fn set_subtree(&mut self, level: Level, scenario: &str, subtree: Subtree) {
        self.levels
            .entry(level)
            .or_default()
            .insert(scenario.to_string(), subtree);
    }

    pub fn scenarios(&self, level: Level) -> impl Iterator<Item = &str> + '_ {
        self.levels
            .get(&level)
            .into_iter()
            .flat_map(|scenarios| scenarios.keys().map(String::as_str))
    }

    pub fn leaf_count(&self) -> usize {
        self.levels
            .values()
            .flat_map(|scenarios| scenarios.values())
            .map(Subtree::len)
            .sum()
    }

    pub fn to_json_value(&self) -> Value {
        let mut root = Map::new();
        for (level, scenarios) in &self.levels {
            let mut level_obj = Map::new();
            for (scenario, subtree) in scenarios {
                level_obj.insert(scenario.clone(), subtree.to_json_value());
            }
            root.insert(level.as_str().to_string(), Value::Object(level_obj));
        }
        Value::Object(root)
    }
}

impl Serialize for ScoreTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}

/// Finite values become JSON numbers; NaN and infinities are kept as
/// explicit string markers since JSON numbers cannot carry them.
pub fn json_number(value: f64) -> Value {
    if value.is_nan() {
        Value::String("NaN".to_string())
    } else if value.is_infinite() {
        let marker = if value > 0.0 { "Infinity" } else { "-Infinity" };
        Value::String(marker.to_string())
    } else {
        Value::from(value)
    }
}

fn insert_nested(root: &mut Map<String, Value>, segments: &[String], value: Value) {
    let Some((last, outer)) = segments.split_last() else {
        return;
    };
    let mut node = root;
    for segment in outer {
        let entry = node
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        node = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }
    node.insert(last.clone(), value);
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/tree.rs"]
mod tests;
