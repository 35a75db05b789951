use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use walkdir::WalkDir;

use crate::input::ids::extract_scenario;
use crate::input::{IdMap, InputError, SubVid};
use crate::model::Level;
use crate::model::tree::json_number;

/// File name of a persisted team score document.
pub const SCORES_FILE: &str = "scores.json";

/// Name under which a bare `results` directory is reported.
pub const ANONYMOUS_TEAM: &str = ".";

/// Leaves of one level of one team, keyed `scenario/.../signal/metric`.
pub type FlatScores = BTreeMap<String, f64>;

/// Nesting of a [`ScoresTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableOrder {
    #[default]
    LevelFirst,
    TeamFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub levels: Vec<Level>,
    pub exclude_teams: BTreeSet<String>,
    pub order: TableOrder,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            levels: vec![Level::Folds, Level::Scenarios, Level::Files],
            exclude_teams: BTreeSet::new(),
            order: TableOrder::default(),
        }
    }
}

/// Flattened scores of every team of a scoring directory, nested
/// `level -> team` or `team -> level` depending on [`TableOrder`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoresTable {
    order: TableOrder,
    entries: BTreeMap<String, BTreeMap<String, FlatScores>>,
}

impl ScoresTable {
    pub fn new(order: TableOrder) -> Self {
        Self {
            order,
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, level: Level, team: &str, scores: FlatScores) {
        let (outer, inner) = self.keys(level, team);
        self.entries.entry(outer).or_default().insert(inner, scores);
    }

    pub fn get(&self, level: Level, team: &str) -> Option<&FlatScores> {
        let (outer, inner) = self.keys(level, team);
        self.entries.get(&outer)?.get(&inner)
    }

    pub fn to_json_value(&self) -> Value {
        let mut root = Map::new();
        for (outer, inner) in &self.entries {
            let mut outer_obj = Map::new();
            for (key, scores) in inner {
                let flat = scores
                    .iter()
                    .map(|(path, &value)| (path.clone(), json_number(value)))
                    .collect::<Map<_, _>>();
                outer_obj.insert(key.clone(), Value::Object(flat));
            }
            root.insert(outer.clone(), Value::Object(outer_obj));
        }
        Value::Object(root)
    }

    fn keys(&self, level: Level, team: &str) -> (String, String) {
        let level = level.as_str().to_string();
        let team = team.to_string();
        match self.order {
            TableOrder::LevelFirst => (level, team),
            TableOrder::TeamFirst => (team, level),
        }
    }
}

/// Every `scores.json` below `scores_root`, sorted by path.
pub fn find_scores_files(scores_root: &Path) -> Result<Vec<PathBuf>, InputError> {
    if !scores_root.is_dir() {
        return Err(InputError::MissingInput(format!(
            "{} is not a directory",
            scores_root.display()
        )));
    }
    let mut out = Vec::new();
    for entry in WalkDir::new(scores_root).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.file_name() == SCORES_FILE {
            out.push(entry.into_path());
        }
    }
    out.sort();
    Ok(out)
}

/// Reads one score document. With an id map, `sub_X_vid_Y` keys are
/// rewritten to the original ids.
pub fn load_scores_file(path: &Path, id_map: Option<&IdMap>) -> Result<Value, InputError> {
    let text = std::fs::read_to_string(path)?;
    let doc: Value = serde_json::from_str(&text).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    match id_map {
        Some(map) => restore_subvid_keys(doc, map, None),
        None => Ok(doc),
    }
}

/// Loads the selected levels of every team below `scores_root`.
pub fn load_scores(
    scores_root: &Path,
    options: &LoadOptions,
    id_map: Option<&IdMap>,
) -> Result<ScoresTable, InputError> {
    let mut table = ScoresTable::new(options.order);
    let mut teams = 0usize;
    for path in find_scores_files(scores_root)? {
        let team = team_name(&path, scores_root);
        if options.exclude_teams.contains(&team) {
            tracing::debug!(team = %team, "excluded from summary");
            continue;
        }
        let doc = load_scores_file(&path, id_map)?;
        for &level in &options.levels {
            let mut flat = FlatScores::new();
            match doc.get(level.as_str()) {
                Some(value) => flatten(value, "", &mut flat).map_err(|key| {
                    InputError::InvalidInput(format!(
                        "{}: non-numeric score at {key}",
                        path.display()
                    ))
                })?,
                None => {
                    tracing::warn!(team = %team, level = level.as_str(), "level missing from scores")
                }
            }
            table.insert(level, &team, flat);
        }
        teams += 1;
    }
    tracing::info!(teams, dir = %scores_root.display(), "loaded scores");
    Ok(table)
}

fn team_name(path: &Path, scores_root: &Path) -> String {
    match path.parent() {
        Some(parent) if parent != scores_root => parent
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ANONYMOUS_TEAM.to_string()),
        _ => ANONYMOUS_TEAM.to_string(),
    }
}

fn restore_subvid_keys(
    value: Value,
    id_map: &IdMap,
    scenario: Option<&str>,
) -> Result<Value, InputError> {
    let Value::Object(obj) = value else {
        return Ok(value);
    };
    let mut out = Map::new();
    for (key, child) in obj {
        if let Some(subvid) = SubVid::parse(&key) {
            let scenario = scenario.ok_or_else(|| {
                InputError::InvalidInput(format!("{key} is not below a scenario"))
            })?;
            let original = id_map.original_subvid(scenario, &subvid).ok_or_else(|| {
                InputError::InvalidInput(format!("no original ids for {subvid} in {scenario}"))
            })?;
            out.entry(original.to_string()).or_insert(child);
            continue;
        }
        let inner = match extract_scenario(&key) {
            Some(found) if found == key => restore_subvid_keys(child, id_map, Some(key.as_str()))?,
            _ => restore_subvid_keys(child, id_map, scenario)?,
        };
        out.insert(key, inner);
    }
    Ok(Value::Object(out))
}

/// Err carries the keypath of the offending leaf.
fn flatten(value: &Value, prefix: &str, out: &mut FlatScores) -> Result<(), String> {
    match value {
        Value::Object(obj) => {
            for (key, child) in obj {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}/{key}")
                };
                flatten(child, &path, out)?;
            }
            Ok(())
        }
        Value::Number(n) => {
            let v = n.as_f64().ok_or_else(|| prefix.to_string())?;
            out.insert(prefix.to_string(), v);
            Ok(())
        }
        Value::String(marker) => {
            let v = match marker.as_str() {
                "NaN" => f64::NAN,
                "Infinity" => f64::INFINITY,
                "-Infinity" => f64::NEG_INFINITY,
                _ => return Err(prefix.to_string()),
            };
            out.insert(prefix.to_string(), v);
            Ok(())
        }
        _ => Err(prefix.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/scores.rs"]
mod tests;
