use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::input::{GroundTruth, IdMap, InputError, ScenarioSubmission, SubVid, list_dirs};
use crate::metrics::{MetricError, MetricSet};
use crate::model::{Level, ScenarioLayout, ScoreTree};

pub mod stage1_build;
pub mod stage2_aggregate;
pub mod stage3_report;

use stage2_aggregate::AggregateError;

pub use crate::input::scores::ANONYMOUS_TEAM;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("metric error for {context}: {source}")]
    Metric {
        context: String,
        #[source]
        source: MetricError,
    },
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error("submission '{name}' not found in {}", .root.display())]
    UnknownSubmission { name: String, root: PathBuf },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render scores: {0}")]
    Render(#[from] serde_json::Error),
}

/// Collaborators shared by every scenario of a scoring run.
#[derive(Clone, Copy)]
pub struct ScoringContext<'a> {
    pub ground_truth: &'a dyn GroundTruth,
    pub metrics: &'a MetricSet,
    pub layout: &'a ScenarioLayout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamResults {
    pub name: String,
    pub results_dir: PathBuf,
}

/// Submission directory `name` under `predictions_dir`; fails before any
/// scoring when it does not exist.
pub fn resolve_submission(predictions_dir: &Path, name: &str) -> Result<PathBuf, ScoreError> {
    let unknown = || ScoreError::UnknownSubmission {
        name: name.to_string(),
        root: predictions_dir.to_path_buf(),
    };
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(unknown());
    }
    let path = predictions_dir.join(name);
    if !path.is_dir() {
        return Err(unknown());
    }
    Ok(path)
}

/// Teams of a submission. `tmp` is skipped, a `results` directory is the
/// anonymous team, any other directory `T` holds its results in `T/results`.
pub fn discover_teams(submission_dir: &Path) -> Result<Vec<TeamResults>, InputError> {
    let mut teams = Vec::new();
    for dir in list_dirs(submission_dir)? {
        let Some(name) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        match name.as_str() {
            "tmp" => continue,
            "results" => teams.push(TeamResults {
                name: ANONYMOUS_TEAM.to_string(),
                results_dir: dir,
            }),
            _ => {
                let results_dir = dir.join("results");
                teams.push(TeamResults { name, results_dir });
            }
        }
    }
    Ok(teams)
}

/// Builds and rolls up the full score tree of one results directory.
pub fn score_results_dir(
    results_dir: &Path,
    ctx: &ScoringContext<'_>,
) -> Result<ScoreTree, ScoreError> {
    let mut tree = ScoreTree::new();
    for scenario_dir in list_dirs(results_dir)? {
        let submission = ScenarioSubmission::load(&scenario_dir)?;
        stage1_build::build_scenario(&mut tree, &submission, ctx)?;
        stage2_aggregate::rollup_scenario(&mut tree, &submission.scenario, ctx.layout)?;
    }
    Ok(tree)
}

/// Rewrites files-level `sub_X_vid_Y` identifiers to the original ids.
pub fn restore_original_ids(mut tree: ScoreTree, id_map: &IdMap) -> Result<ScoreTree, ScoreError> {
    let scenarios = tree
        .scenarios(Level::Files)
        .map(str::to_string)
        .collect::<Vec<_>>();
    for scenario in scenarios {
        let Some(subtree) = tree.subtree(Level::Files, &scenario) else {
            continue;
        };
        let remapped = subtree.map_innermost_group(|segment| {
            let Some(subvid) = SubVid::parse(segment) else {
                return Ok(segment.to_string());
            };
            id_map
                .original_subvid(&scenario, &subvid)
                .map(|original| original.to_string())
                .ok_or_else(|| {
                    InputError::InvalidInput(format!(
                        "no original ids for {subvid} in {scenario}"
                    ))
                })
        })?;
        tree.set_subtree(Level::Files, &scenario, remapped);
    }
    Ok(tree)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
