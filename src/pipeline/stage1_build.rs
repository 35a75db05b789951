use crate::input::{Annotations, GroundTruth, InputError, PredictedFile, ScenarioSubmission};
use crate::metrics::MetricRecord;
use crate::model::{Level, ScoreTree, Signal};
use crate::pipeline::{ScoreError, ScoringContext};

/// Writes the files, subjects and videos levels of one scenario.
pub fn build_scenario(
    tree: &mut ScoreTree,
    submission: &ScenarioSubmission,
    ctx: &ScoringContext<'_>,
) -> Result<(), ScoreError> {
    let scenario = submission.scenario.as_str();
    let folded = ctx.layout.has_folds(scenario);
    check_fold_count(submission, ctx);

    for file in submission.files() {
        let truth = ctx.ground_truth.lookup(&file.key)?;
        let groups = file_groups(file, folded)?;
        for signal in Signal::ALL {
            let record = score_signal(ctx, truth, &file.annotations, signal, &file.key)?;
            tree.subtree_mut(Level::Files, scenario)
                .insert_record(&groups, signal, &record);
        }
        tracing::debug!(scenario, file = %file.key, "scored file");
    }

    for (group, files) in submission.group_by_subject() {
        score_concatenated(tree, Level::Subjects, scenario, &group, &files, ctx)?;
    }

    for (group, files) in submission.group_by_video() {
        score_concatenated(tree, Level::Videos, scenario, &group, &files, ctx)?;
    }

    tracing::info!(
        scenario,
        files = submission.files().len(),
        folded,
        "built raw scores"
    );
    Ok(())
}

fn file_groups(file: &PredictedFile, folded: bool) -> Result<Vec<String>, InputError> {
    if !folded {
        return Ok(vec![file.stem.clone()]);
    }
    let fold = file.fold.clone().ok_or_else(|| {
        InputError::InvalidInput(format!(
            "{} belongs to a folded scenario but has no fold_<n> segment",
            file.key
        ))
    })?;
    Ok(vec![fold, file.stem.clone()])
}

/// CCC is not an average of per-file CCCs, so grouped levels are scored on
/// the concatenated value streams of their files.
fn score_concatenated(
    tree: &mut ScoreTree,
    level: Level,
    scenario: &str,
    group: &str,
    files: &[&PredictedFile],
    ctx: &ScoringContext<'_>,
) -> Result<(), ScoreError> {
    let (truth, predicted) = concatenate(files, ctx.ground_truth)?;
    let groups = vec![group.to_string()];
    let context = format!("{scenario}/{group}");
    for signal in Signal::ALL {
        let record = score_signal(ctx, &truth, &predicted, signal, &context)?;
        tree.subtree_mut(level, scenario)
            .insert_record(&groups, signal, &record);
    }
    Ok(())
}

pub fn concatenate(
    files: &[&PredictedFile],
    ground_truth: &dyn GroundTruth,
) -> Result<(Annotations, Annotations), InputError> {
    let mut truth = Annotations::default();
    let mut predicted = Annotations::default();
    for file in files {
        truth.extend_from(ground_truth.lookup(&file.key)?);
        predicted.extend_from(&file.annotations);
    }
    Ok((truth, predicted))
}

fn score_signal(
    ctx: &ScoringContext<'_>,
    truth: &Annotations,
    predicted: &Annotations,
    signal: Signal,
    context: &str,
) -> Result<MetricRecord, ScoreError> {
    ctx.metrics
        .compute(truth.signal(signal), predicted.signal(signal))
        .map_err(|source| ScoreError::Metric {
            context: format!("{context} ({})", signal.as_str()),
            source,
        })
}

fn check_fold_count(submission: &ScenarioSubmission, ctx: &ScoringContext<'_>) {
    let scenario = submission.scenario.as_str();
    if !ctx.layout.is_known(scenario) {
        tracing::warn!(scenario, "scenario missing from layout; treating it as folded");
        return;
    }
    let Some(expected) = ctx.layout.expected_folds(scenario) else {
        return;
    };
    let found = submission.folds().len();
    if found != expected as usize {
        tracing::warn!(scenario, expected, found, "unexpected number of folds");
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_build.rs"]
mod tests;
