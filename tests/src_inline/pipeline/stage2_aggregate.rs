use super::*;
use crate::metrics::Metric;
use crate::model::{MetricKey, Signal};

fn groups(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

fn leaf(segments: &[&str], signal: Signal, key: MetricKey) -> ScorePath {
    ScorePath::new(groups(segments), signal, key)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

/// Two folds of three files with known arousal CCC values.
fn two_fold_files() -> Subtree {
    let mut files = Subtree::new();
    let folds = [
        ("fold_0", [0.9, 0.8, 0.7]),
        ("fold_1", [0.6, 0.5, 0.4]),
    ];
    for (fold, values) in folds {
        for (i, value) in values.into_iter().enumerate() {
            let stem = format!("sub_{}_vid_1", i + 1);
            files.insert(
                leaf(&[fold, stem.as_str()], Signal::Arousal, MetricKey::raw(Metric::Ccc)),
                value,
            );
        }
    }
    files
}

#[test]
fn test_raw_group_emits_mean_and_population_std() {
    let mut subtree = Subtree::new();
    for (file, value) in [("a", 1.0), ("b", 2.0), ("c", 4.0), ("d", 5.0)] {
        subtree.insert(
            leaf(&[file], Signal::Valence, MetricKey::raw(Metric::Rmse)),
            value,
        );
    }
    let out = aggregate(&subtree).unwrap();
    assert_eq!(out.len(), 2);
    let mean = out
        .get(&leaf(&[], Signal::Valence, MetricKey::mean(Metric::Rmse)))
        .unwrap();
    let std = out
        .get(&leaf(&[], Signal::Valence, MetricKey::std(Metric::Rmse)))
        .unwrap();
    assert!(close(mean, 3.0));
    // ddof = 0: sqrt(((4 + 1 + 1 + 4) / 4))
    assert!(close(std, 2.5f64.sqrt()));
}

#[test]
fn test_groups_keep_outer_and_inner_segments() {
    let out = aggregate(&two_fold_files()).unwrap();
    assert_eq!(out.len(), 4);
    for (path, _) in out.iter() {
        assert_eq!(path.groups.len(), 1);
        assert_eq!(path.signal, Signal::Arousal);
        assert_eq!(path.metric.metric, Metric::Ccc);
    }
}

#[test]
fn test_std_leaves_are_dropped_on_reaggregation() {
    let folds = aggregate(&two_fold_files()).unwrap();
    let std_in = folds
        .iter()
        .filter(|(p, _)| p.metric.kind == StatKind::Std)
        .count();
    assert_eq!(std_in, 2);

    let scenario = aggregate(&folds).unwrap();
    let std_out = scenario
        .iter()
        .filter(|(p, _)| p.metric.kind == StatKind::Std)
        .count();
    let mean_out = scenario
        .iter()
        .filter(|(p, _)| p.metric.kind == StatKind::Mean)
        .count();
    // One mean and one std per (signal, metric), not four leaves.
    assert_eq!(scenario.len(), 2);
    assert_eq!(std_out, 1);
    assert_eq!(mean_out, 1);
}

#[test]
fn test_already_aggregated_input_keeps_std_count() {
    let mut subtree = Subtree::new();
    for (fold, mean, std) in [("fold_0", 0.4, 0.1), ("fold_1", 0.6, 0.3), ("fold_2", 0.8, 0.2)] {
        for signal in Signal::ALL {
            subtree.insert(leaf(&[fold], signal, MetricKey::mean(Metric::Ccc)), mean);
            subtree.insert(leaf(&[fold], signal, MetricKey::std(Metric::Ccc)), std);
        }
    }
    let out = aggregate(&subtree).unwrap();
    assert_eq!(out.len(), 4);
    for signal in Signal::ALL {
        let mean = out
            .get(&leaf(&[], signal, MetricKey::mean(Metric::Ccc)))
            .unwrap();
        let std = out
            .get(&leaf(&[], signal, MetricKey::std(Metric::Ccc)))
            .unwrap();
        assert!(close(mean, 0.6));
        // std of the means, the input stds never enter
        assert!(close(std, (0.08f64 / 3.0).sqrt()));
    }
}

#[test]
fn test_input_is_not_mutated() {
    let files = two_fold_files();
    let before = files.clone();
    let _ = aggregate(&files).unwrap();
    assert_eq!(files, before);
}

#[test]
fn test_shallow_path_fails_fast() {
    let mut subtree = Subtree::new();
    let p = leaf(&[], Signal::Arousal, MetricKey::mean(Metric::Ccc));
    subtree.insert(p, 0.5);
    let err = aggregate(&subtree).unwrap_err();
    assert_eq!(
        err,
        AggregateError::ShallowPath {
            path: "arousal/ccc-mean".to_string()
        }
    );
}

#[test]
fn test_empty_subtree_aggregates_to_empty() {
    assert!(aggregate(&Subtree::new()).unwrap().is_empty());
}

#[test]
fn test_two_fold_rollup_end_to_end() {
    let mut tree = ScoreTree::new();
    tree.set_subtree(Level::Files, "scenario_2", two_fold_files());
    rollup_scenario(&mut tree, "scenario_2", &ScenarioLayout::epic()).unwrap();

    let folds = tree.subtree(Level::Folds, "scenario_2").unwrap();
    let fold_mean = |fold: &str| {
        folds
            .get(&leaf(&[fold], Signal::Arousal, MetricKey::mean(Metric::Ccc)))
            .unwrap()
    };
    assert!(close(fold_mean("fold_0"), 0.8));
    assert!(close(fold_mean("fold_1"), 0.5));

    let scenario = tree.subtree(Level::Scenarios, "scenario_2").unwrap();
    let mean = scenario
        .get(&leaf(&[], Signal::Arousal, MetricKey::mean(Metric::Ccc)))
        .unwrap();
    let std = scenario
        .get(&leaf(&[], Signal::Arousal, MetricKey::std(Metric::Ccc)))
        .unwrap();
    assert!(close(mean, 0.65));
    assert!(close(std, 0.15));
}

#[test]
fn test_scenario_without_folds_is_copied() {
    let mut files = Subtree::new();
    for (stem, value) in [("sub_1_vid_1", 0.3), ("sub_2_vid_1", 0.7)] {
        files.insert(
            leaf(&[stem], Signal::Arousal, MetricKey::raw(Metric::Ccc)),
            value,
        );
    }
    let mut tree = ScoreTree::new();
    tree.set_subtree(Level::Files, "scenario_1", files);
    rollup_scenario(&mut tree, "scenario_1", &ScenarioLayout::epic()).unwrap();

    let folds = tree.subtree(Level::Folds, "scenario_1").unwrap();
    let scenario = tree.subtree(Level::Scenarios, "scenario_1").unwrap();
    assert_eq!(folds.len(), scenario.len());
    for ((pa, va), (pb, vb)) in folds.iter().zip(scenario.iter()) {
        assert_eq!(pa, pb);
        assert_eq!(va.to_bits(), vb.to_bits());
    }
    let mean = scenario
        .get(&leaf(&[], Signal::Arousal, MetricKey::mean(Metric::Ccc)))
        .unwrap();
    assert!(close(mean, 0.5));
}

#[test]
fn test_rollup_summarizes_subjects_and_videos() {
    let mut tree = ScoreTree::new();
    for (level, group, value) in [
        (Level::Subjects, "sub_1", 0.2),
        (Level::Subjects, "sub_2", 0.4),
        (Level::Videos, "vid_1", 0.9),
    ] {
        tree.subtree_mut(level, "scenario_4").insert(
            leaf(&[group], Signal::Valence, MetricKey::raw(Metric::R2Score)),
            value,
        );
    }
    rollup_scenario(&mut tree, "scenario_4", &ScenarioLayout::epic()).unwrap();

    let subjects = tree.subtree(Level::ScenarioSubjects, "scenario_4").unwrap();
    let mean = subjects
        .get(&leaf(&[], Signal::Valence, MetricKey::mean(Metric::R2Score)))
        .unwrap();
    assert!(close(mean, 0.3));

    let videos = tree.subtree(Level::ScenarioVideos, "scenario_4").unwrap();
    let std = videos
        .get(&leaf(&[], Signal::Valence, MetricKey::std(Metric::R2Score)))
        .unwrap();
    assert_eq!(std, 0.0);
    assert!(tree.subtree(Level::Folds, "scenario_4").unwrap().is_empty());
}
