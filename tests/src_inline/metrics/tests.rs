use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

#[test]
fn test_ccc_reference_value() {
    let y_true = [3.0, -0.5, 2.0, 7.0];
    let y_pred = [2.5, 0.0, 2.0, 8.0];
    assert!(close(ccc(&y_true, &y_pred, false), 0.9767891682785301));
    assert!(close(ccc(&y_true, &y_pred, true), 0.9767891682785301));
}

#[test]
fn test_ccc_perfect_agreement() {
    let y = [0.1, 0.4, -0.2, 0.9];
    assert!(close(ccc(&y, &y, false), 1.0));
}

#[test]
fn test_ccc_force_finite_identical_constant() {
    let y = [0.5, 0.5, 0.5];
    assert!(ccc(&y, &y, false).is_nan());
    assert_eq!(ccc(&y, &y, true), 1.0);
}

#[test]
fn test_ccc_force_finite_distinct_constant() {
    let y_true = [0.5, 0.5, 0.5];
    let y_pred = [0.2, 0.2, 0.2];
    assert!(!ccc(&y_true, &y_pred, false).is_finite());
    assert_eq!(ccc(&y_true, &y_pred, true), 0.0);
}

#[test]
fn test_ccc_force_finite_one_side_constant() {
    let y_true = [0.0, 0.0, 0.0];
    let y_pred = [0.1, -0.1, 0.3];
    assert!(ccc(&y_true, &y_pred, false).is_nan());
    assert_eq!(ccc(&y_true, &y_pred, true), 0.0);
}

#[test]
fn test_rmse_r2_residuals() {
    let y_true = [3.0, -0.5, 2.0, 7.0];
    let y_pred = [2.5, 0.0, 2.0, 8.0];
    assert!(close(rmse(&y_true, &y_pred), 0.6123724356957945));
    assert!(close(r2_score(&y_true, &y_pred), 0.9486081370449679));
    assert!(close(residuals_std(&y_true, &y_pred), 0.5590169943749475));
}

#[test]
fn test_r2_constant_truth() {
    let y_true = [1.0, 1.0, 1.0];
    assert_eq!(r2_score(&y_true, &[1.0, 1.0, 1.0]), 1.0);
    assert_eq!(r2_score(&y_true, &[1.0, 2.0, 1.0]), 0.0);
    assert!(r2_score(&[1.0], &[1.0]).is_nan());
}

#[test]
fn test_mean_and_population_std() {
    let v = [0.8, 0.5];
    assert!(close(mean(&v), 0.65));
    assert!(close(population_std(&v), 0.15));
    assert!(mean(&[]).is_nan());
    assert_eq!(population_std(&[2.0, 2.0, 2.0]), 0.0);
}

#[test]
fn test_metric_set_computes_every_metric() {
    let set = MetricSet::standard(true);
    let record = set.compute(&[1.0, 2.0, 3.0], &[1.0, 2.0, 4.0]).unwrap();
    assert_eq!(record.len(), 4);
    for metric in Metric::ALL {
        assert!(record.contains_key(&metric), "missing {metric}");
    }
    assert!(set.force_finite());
}

#[test]
fn test_metric_set_rejects_length_mismatch() {
    let set = MetricSet::standard(false);
    let err = set.compute(&[1.0, 2.0], &[1.0]).unwrap_err();
    assert_eq!(
        err,
        MetricError::LengthMismatch {
            y_true: 2,
            y_pred: 1
        }
    );
    assert_eq!(set.compute(&[], &[]).unwrap_err(), MetricError::Empty);
}

#[test]
fn test_metric_names() {
    let names = Metric::ALL.iter().map(|m| m.to_string()).collect::<Vec<_>>();
    assert_eq!(names, vec!["ccc", "r2_score", "rmse", "residuals_std"]);
}
