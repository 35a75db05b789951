mod input;
mod logging;
mod metrics;
mod model;
mod pipeline;

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::input::{IdMap, LoadOptions, TableOrder, TestAnnotations, load_scores};
use crate::metrics::MetricSet;
use crate::model::{Level, ScenarioLayout};
use crate::pipeline::stage3_report::{scores_root, write_scores, write_summary};
use crate::pipeline::{
    ScoreError, ScoringContext, discover_teams, resolve_submission, restore_original_ids,
    score_results_dir,
};

#[derive(Debug, Parser)]
#[command(
    name = "epic-score",
    version,
    about = "Score affect annotation submissions against the competition test annotations."
)]
struct Cli {
    /// Submission directory under the predictions root.
    #[arg(long)]
    name: String,

    /// Replace non-finite CCC values with 1.0 (exact match) or 0.0.
    #[arg(long, default_value = "true", value_parser = parse_bool_flag, action = ArgAction::Set)]
    finite: bool,

    /// Project root holding data/, predictions/ and scores/.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Test annotations directory [default: <root>/data/competition/test_annotations].
    #[arg(long)]
    test_dir: Option<PathBuf>,

    /// Predictions directory [default: <root>/predictions].
    #[arg(long)]
    predictions_dir: Option<PathBuf>,

    /// Output directory [default: <root>/scores].
    #[arg(long)]
    scores_dir: Option<PathBuf>,

    /// JSON map of original to anonymized ids; file-level scores are written
    /// under the original ids.
    #[arg(long)]
    ids_map: Option<PathBuf>,

    /// After scoring, collect every team's scores.json of the output
    /// directory into summary.json.
    #[arg(long)]
    summary: bool,

    /// Levels kept in the summary, comma separated
    /// [default: folds_level,scenarios_level,files_level].
    #[arg(long, value_delimiter = ',', value_parser = parse_level)]
    summary_levels: Vec<Level>,

    /// Team left out of the summary; repeatable.
    #[arg(long = "exclude-team")]
    exclude_teams: Vec<String>,

    /// Nest the summary by team first, then level.
    #[arg(long)]
    team_first: bool,

    /// Debug-level logging.
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Debug, Clone)]
struct RunConfig {
    name: String,
    finite: bool,
    test_dir: PathBuf,
    predictions_dir: PathBuf,
    scores_dir: PathBuf,
    ids_map: Option<PathBuf>,
    summary: Option<LoadOptions>,
}

impl RunConfig {
    fn from_cli(cli: Cli) -> Self {
        let root = cli.root;
        let summary = cli.summary.then(|| {
            let mut options = LoadOptions::default();
            if !cli.summary_levels.is_empty() {
                options.levels = cli.summary_levels;
            }
            options.exclude_teams = cli.exclude_teams.into_iter().collect::<BTreeSet<_>>();
            if cli.team_first {
                options.order = TableOrder::TeamFirst;
            }
            options
        });
        Self {
            test_dir: cli
                .test_dir
                .unwrap_or_else(|| root.join("data/competition/test_annotations")),
            predictions_dir: cli
                .predictions_dir
                .unwrap_or_else(|| root.join("predictions")),
            scores_dir: cli.scores_dir.unwrap_or_else(|| root.join("scores")),
            name: cli.name,
            finite: cli.finite,
            ids_map: cli.ids_map,
            summary,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(RunConfig::from_cli(cli)) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(config: RunConfig) -> Result<(), ScoreError> {
    let submission_dir = resolve_submission(&config.predictions_dir, &config.name)?;
    let ground_truth = TestAnnotations::load(&config.test_dir)?;
    let id_map = config.ids_map.as_deref().map(IdMap::load).transpose()?;
    let metrics = MetricSet::standard(config.finite);
    let layout = ScenarioLayout::epic();
    let ctx = ScoringContext {
        ground_truth: &ground_truth,
        metrics: &metrics,
        layout: &layout,
    };

    let out_root = scores_root(&config.scores_dir, &config.name, config.finite);
    let teams = discover_teams(&submission_dir)?;
    tracing::info!(
        submission = %config.name,
        teams = teams.len(),
        finite = config.finite,
        "scoring submission"
    );

    for team in &teams {
        tracing::info!(team = %team.name, "scoring team");
        let tree = score_results_dir(&team.results_dir, &ctx)?;
        let tree = match &id_map {
            Some(map) => restore_original_ids(tree, map)?,
            None => tree,
        };
        write_scores(&out_root, &team.name, &tree)?;
    }

    if let Some(options) = &config.summary {
        if teams.is_empty() {
            tracing::warn!(submission = %config.name, "no teams scored; skipping summary");
        } else {
            // Ids were already restored on write.
            let table = load_scores(&out_root, options, None)?;
            write_summary(&out_root, &table)?;
        }
    }
    Ok(())
}

fn parse_level(value: &str) -> Result<Level, String> {
    Level::from_name(value.trim()).ok_or_else(|| format!("unknown level '{value}'"))
}

/// Accepts the spellings `--finite` is usually given with.
fn parse_bool_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(format!("expected true or false, got '{other}'")),
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
