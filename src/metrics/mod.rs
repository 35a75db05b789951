pub mod formulas;

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

pub use formulas::{ccc, mean, population_std, r2_score, residuals_std, rmse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Ccc,
    R2Score,
    Rmse,
    ResidualsStd,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Ccc,
        Metric::R2Score,
        Metric::Rmse,
        Metric::ResidualsStd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Ccc => "ccc",
            Metric::R2Score => "r2_score",
            Metric::Rmse => "rmse",
            Metric::ResidualsStd => "residuals_std",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per metric for a single (signal, group) pair.
pub type MetricRecord = BTreeMap<Metric, f64>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("length mismatch: ground truth has {y_true} values, prediction has {y_pred}")]
    LengthMismatch { y_true: usize, y_pred: usize },
    #[error("cannot score empty sequences")]
    Empty,
}

/// Metrics evaluated at one level, together with the CCC finiteness policy.
#[derive(Debug, Clone)]
pub struct MetricSet {
    metrics: Vec<Metric>,
    force_finite: bool,
}

impl MetricSet {
    pub fn new(metrics: Vec<Metric>, force_finite: bool) -> Self {
        Self {
            metrics,
            force_finite,
        }
    }

    pub fn standard(force_finite: bool) -> Self {
        Self::new(Metric::ALL.to_vec(), force_finite)
    }

    pub fn force_finite(&self) -> bool {
        self.force_finite
    }

    pub fn compute(&self, y_true: &[f64], y_pred: &[f64]) -> Result<MetricRecord, MetricError> {
        if y_true.len() != y_pred.len() {
            return Err(MetricError::LengthMismatch {
                y_true: y_true.len(),
                y_pred: y_pred.len(),
            });
        }
        if y_true.is_empty() {
            return Err(MetricError::Empty);
        }
        let mut record = MetricRecord::new();
        for &metric in &self.metrics {
            record.insert(metric, self.evaluate(metric, y_true, y_pred));
        }
        Ok(record)
    }

    fn evaluate(&self, metric: Metric, y_true: &[f64], y_pred: &[f64]) -> f64 {
        match metric {
            Metric::Ccc => ccc(y_true, y_pred, self.force_finite),
            Metric::R2Score => r2_score(y_true, y_pred),
            Metric::Rmse => rmse(y_true, y_pred),
            Metric::ResidualsStd => residuals_std(y_true, y_pred),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/metrics/tests.rs"]
mod tests;
