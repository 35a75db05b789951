use std::fs;
use std::path::{Path, PathBuf};

use crate::input::ScoresTable;
use crate::input::scores::SCORES_FILE;
use crate::model::ScoreTree;
use crate::pipeline::{ANONYMOUS_TEAM, ScoreError};

/// Cross-team summary written next to the team documents.
pub const SUMMARY_FILE: &str = "summary.json";

/// Output directory of one submission. Runs with forced-finite CCC get a
/// `-finite` suffix so both variants can coexist.
pub fn scores_root(scores_dir: &Path, name: &str, finite: bool) -> PathBuf {
    if finite {
        scores_dir.join(format!("{name}-finite"))
    } else {
        scores_dir.join(name)
    }
}

pub fn scores_path(root: &Path, team: &str) -> PathBuf {
    if team == ANONYMOUS_TEAM {
        root.join(SCORES_FILE)
    } else {
        root.join(team).join(SCORES_FILE)
    }
}

pub fn render_scores_json(tree: &ScoreTree) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tree)
}

pub fn write_scores(root: &Path, team: &str, tree: &ScoreTree) -> Result<PathBuf, ScoreError> {
    let path = scores_path(root, team);
    write_atomic(&path, &render_scores_json(tree)?)?;
    tracing::info!(
        team,
        leaves = tree.leaf_count(),
        path = %path.display(),
        "wrote scores"
    );
    Ok(path)
}

/// Writes the flattened cross-team table to `<root>/summary.json`.
pub fn write_summary(root: &Path, table: &ScoresTable) -> Result<PathBuf, ScoreError> {
    let path = root.join(SUMMARY_FILE);
    let rendered = serde_json::to_string_pretty(&table.to_json_value())?;
    write_atomic(&path, &rendered)?;
    tracing::info!(path = %path.display(), "wrote summary");
    Ok(path)
}

/// Writes next to the final location first and renames into place, so a
/// failed run never leaves a truncated document.
fn write_atomic(path: &Path, contents: &str) -> Result<(), ScoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err(parent))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).map_err(write_err(&tmp))?;
    fs::rename(&tmp, path).map_err(write_err(path))?;
    Ok(())
}

fn write_err(path: &Path) -> impl FnOnce(std::io::Error) -> ScoreError {
    let path = path.to_path_buf();
    move |source| ScoreError::Write { path, source }
}
