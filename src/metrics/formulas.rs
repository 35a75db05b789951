//! Agreement formulas between a ground-truth and a predicted sequence.
//!
//! All moments are population moments (ddof = 0). Callers check that both
//! sequences have the same non-zero length; the formulas themselves only
//! zip over the shorter one.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64
}

pub fn population_std(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

fn covariance(a: &[f64], b: &[f64]) -> f64 {
    let ma = mean(a);
    let mb = mean(b);
    let n = a.len().min(b.len());
    if n == 0 {
        return f64::NAN;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - ma) * (y - mb))
        .sum::<f64>()
        / n as f64
}

/// Concordance correlation coefficient (Lin, 1989).
///
/// A zero denominator (constant sequences) yields NaN or an infinity. With
/// `force_finite` such a result is replaced by `1.0` when the sequences are
/// exactly equal and by `0.0` otherwise.
pub fn ccc(y_true: &[f64], y_pred: &[f64], force_finite: bool) -> f64 {
    let mean_true = mean(y_true);
    let mean_pred = mean(y_pred);
    let var_true = variance(y_true);
    let var_pred = variance(y_pred);

    // Pearson correlation, clipped like numpy's corrcoef. NaN stays NaN.
    let cor = (covariance(y_true, y_pred) / (var_true * var_pred).sqrt()).clamp(-1.0, 1.0);

    let numerator = 2.0 * cor * var_true.sqrt() * var_pred.sqrt();
    let denominator = var_true + var_pred + (mean_true - mean_pred).powi(2);
    let score = numerator / denominator;

    if force_finite && !score.is_finite() {
        return if y_true == y_pred { 1.0 } else { 0.0 };
    }
    score
}

pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len().min(y_pred.len());
    if n == 0 {
        return f64::NAN;
    }
    let sq = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum::<f64>();
    (sq / n as f64).sqrt()
}

/// Coefficient of determination. A constant ground truth gives `1.0` for a
/// perfect prediction and `0.0` otherwise; fewer than two samples give NaN.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.len() < 2 || y_pred.len() < 2 {
        return f64::NAN;
    }
    let mean_true = mean(y_true);
    let ss_res = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p) * (t - p))
        .sum::<f64>();
    let ss_tot = y_true
        .iter()
        .map(|t| (t - mean_true) * (t - mean_true))
        .sum::<f64>();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

pub fn residuals_std(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let residuals = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| t - p)
        .collect::<Vec<_>>();
    population_std(&residuals)
}
