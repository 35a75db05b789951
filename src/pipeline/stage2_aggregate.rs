use std::collections::BTreeMap;

use thiserror::Error;

use crate::metrics::{mean, population_std};
use crate::model::{Level, ScenarioLayout, ScorePath, ScoreTree, StatKind, Subtree};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("cannot aggregate {path}: no grouping segment left to collapse")]
    ShallowPath { path: String },
}

/// Derives the next coarser level from `subtree`.
///
/// Leaves that differ only in their innermost group segment form one group.
/// Each group yields one Mean and one Std leaf (population std). Std leaves
/// of an already aggregated level are dropped, and Mean leaves are
/// re-averaged into a fresh Mean/Std pair, so a quantity keeps exactly one
/// mean and one std however many times it is rolled up.
pub fn aggregate(subtree: &Subtree) -> Result<Subtree, AggregateError> {
    let mut groups: BTreeMap<ScorePath, Vec<f64>> = BTreeMap::new();
    for (path, value) in subtree.iter() {
        let collapsed = path.collapse().ok_or_else(|| AggregateError::ShallowPath {
            path: path.to_string(),
        })?;
        groups.entry(collapsed).or_default().push(value);
    }

    let mut out = Subtree::new();
    for (path, samples) in groups {
        match path.metric.kind {
            StatKind::Std => continue,
            StatKind::Raw | StatKind::Mean => {
                out.insert(path.with_kind(StatKind::Mean), mean(&samples));
                out.insert(path.with_kind(StatKind::Std), population_std(&samples));
            }
        }
    }
    Ok(out)
}

/// Fills the folds, scenarios and scenario-summary levels of one scenario
/// from its files, subjects and videos levels.
pub fn rollup_scenario(
    tree: &mut ScoreTree,
    scenario: &str,
    layout: &ScenarioLayout,
) -> Result<(), AggregateError> {
    let folds = aggregate_level(tree, Level::Files, scenario)?;
    let scenarios = if layout.has_folds(scenario) {
        aggregate(&folds)?
    } else {
        // Files already collapse straight to scenario granularity.
        folds.clone()
    };
    let subjects = aggregate_level(tree, Level::Subjects, scenario)?;
    let videos = aggregate_level(tree, Level::Videos, scenario)?;

    tracing::debug!(
        scenario,
        folds = folds.len(),
        scenarios = scenarios.len(),
        subjects = subjects.len(),
        videos = videos.len(),
        "rolled up scenario"
    );

    tree.set_subtree(Level::Folds, scenario, folds);
    tree.set_subtree(Level::Scenarios, scenario, scenarios);
    tree.set_subtree(Level::ScenarioSubjects, scenario, subjects);
    tree.set_subtree(Level::ScenarioVideos, scenario, videos);
    Ok(())
}

fn aggregate_level(
    tree: &ScoreTree,
    level: Level,
    scenario: &str,
) -> Result<Subtree, AggregateError> {
    match tree.subtree(level, scenario) {
        Some(subtree) => aggregate(subtree),
        None => Ok(Subtree::new()),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_aggregate.rs"]
mod tests;
