//! Scoring functions. Every metric follows the "higher is better" convention.
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::RfeError;

pub type MetricFunction = Arc<dyn Fn(&[usize], &[usize]) -> f64 + Send + Sync>;

#[derive(Clone)]
pub enum Metric {
    /// Negated number of misclassifications.
    Miss,
    Accuracy,
    BalancedAccuracy,
    /// Precision, recall and F1 of label 1 against the rest.
    Precision,
    Recall,
    F1,
    /// Unweighted means over the classes seen in either labelling.
    PrecisionMacro,
    RecallMacro,
    F1Macro,
    MatthewsCorrcoef,
    Custom(MetricFunction),
}

impl Metric {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[usize], &[usize]) -> f64 + Send + Sync + 'static,
    {
        Metric::Custom(Arc::new(f))
    }

    pub fn score(&self, y_true: &[usize], y_pred: &[usize]) -> f64 {
        match self {
            Metric::Miss => miss_score(y_true, y_pred),
            Metric::Accuracy => accuracy_score(y_true, y_pred),
            Metric::BalancedAccuracy => balanced_accuracy_score(y_true, y_pred),
            Metric::Precision => precision_score(y_true, y_pred, POSITIVE_LABEL),
            Metric::Recall => recall_score(y_true, y_pred, POSITIVE_LABEL),
            Metric::F1 => f1_score(y_true, y_pred, POSITIVE_LABEL),
            Metric::PrecisionMacro => macro_average(y_true, y_pred, precision_score),
            Metric::RecallMacro => macro_average(y_true, y_pred, recall_score),
            Metric::F1Macro => macro_average(y_true, y_pred, f1_score),
            Metric::MatthewsCorrcoef => matthews_corrcoef(y_true, y_pred),
            Metric::Custom(f) => f(y_true, y_pred),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Metric::Miss => "MISS",
            Metric::Accuracy => "accuracy",
            Metric::BalancedAccuracy => "balanced_accuracy",
            Metric::Precision => "precision",
            Metric::Recall => "recall",
            Metric::F1 => "f1",
            Metric::PrecisionMacro => "precision_macro",
            Metric::RecallMacro => "recall_macro",
            Metric::F1Macro => "f1_macro",
            Metric::MatthewsCorrcoef => "matthews_corrcoef",
            Metric::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Metric({})", self.name())
    }
}

impl FromStr for Metric {
    type Err = RfeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MISS" => Ok(Metric::Miss),
            "accuracy" => Ok(Metric::Accuracy),
            "balanced_accuracy" => Ok(Metric::BalancedAccuracy),
            "precision" => Ok(Metric::Precision),
            "recall" => Ok(Metric::Recall),
            "f1" => Ok(Metric::F1),
            "precision_macro" => Ok(Metric::PrecisionMacro),
            "recall_macro" => Ok(Metric::RecallMacro),
            "f1_macro" => Ok(Metric::F1Macro),
            "matthews_corrcoef" => Ok(Metric::MatthewsCorrcoef),
            _ => Err(RfeError::InvalidMetric(s.to_string())),
        }
    }
}

/// Label scored by the binary `precision`, `recall` and `f1` metrics.
pub const POSITIVE_LABEL: usize = 1;

/// Number of wrong classifications preceded by a minus sign, so that the
/// higher the score the better the model.
pub fn miss_score(y_true: &[usize], y_pred: &[usize]) -> f64 {
    let misses = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t != p)
        .count();
    -(misses as f64)
}

pub fn accuracy_score(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let hits = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t == p).count();
    hits as f64 / y_true.len() as f64
}

/// Mean per-class recall over the classes present in `y_true`.
pub fn balanced_accuracy_score(y_true: &[usize], y_pred: &[usize]) -> f64 {
    let classes: BTreeSet<usize> = y_true.iter().copied().collect();
    if classes.is_empty() {
        return 0.0;
    }
    let recall_sum: f64 = classes
        .iter()
        .map(|&c| {
            let (support, hits) = y_true
                .iter()
                .zip(y_pred.iter())
                .filter(|&(&t, _)| t == c)
                .fold((0usize, 0usize), |(n, h), (_, &p)| (n + 1, h + usize::from(p == c)));
            hits as f64 / support as f64
        })
        .sum();
    recall_sum / classes.len() as f64
}

/// True positives, false positives and false negatives of `label`.
fn confusion(y_true: &[usize], y_pred: &[usize], label: usize) -> (usize, usize, usize) {
    y_true
        .iter()
        .zip(y_pred.iter())
        .fold((0, 0, 0), |(tp, fp, fneg), (&t, &p)| match (t == label, p == label) {
            (true, true) => (tp + 1, fp, fneg),
            (false, true) => (tp, fp + 1, fneg),
            (true, false) => (tp, fp, fneg + 1),
            (false, false) => (tp, fp, fneg),
        })
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Zero when nothing was predicted as `label`.
pub fn precision_score(y_true: &[usize], y_pred: &[usize], label: usize) -> f64 {
    let (tp, fp, _) = confusion(y_true, y_pred, label);
    ratio(tp, tp + fp)
}

/// Zero when `label` never occurs in `y_true`.
pub fn recall_score(y_true: &[usize], y_pred: &[usize], label: usize) -> f64 {
    let (tp, _, fneg) = confusion(y_true, y_pred, label);
    ratio(tp, tp + fneg)
}

pub fn f1_score(y_true: &[usize], y_pred: &[usize], label: usize) -> f64 {
    let (tp, fp, fneg) = confusion(y_true, y_pred, label);
    ratio(2 * tp, 2 * tp + fp + fneg)
}

fn macro_average(y_true: &[usize], y_pred: &[usize], score: fn(&[usize], &[usize], usize) -> f64) -> f64 {
    let labels: BTreeSet<usize> = y_true.iter().chain(y_pred.iter()).copied().collect();
    if labels.is_empty() {
        return 0.0;
    }
    labels.iter().map(|&l| score(y_true, y_pred, l)).sum::<f64>() / labels.len() as f64
}

/// Multiclass Matthews correlation coefficient. Zero when either labelling is
/// constant.
pub fn matthews_corrcoef(y_true: &[usize], y_pred: &[usize]) -> f64 {
    let labels: BTreeSet<usize> = y_true.iter().chain(y_pred.iter()).copied().collect();
    let n = y_true.len() as f64;
    let correct = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t == p).count() as f64;

    let (mut cov_tp, mut sum_p2, mut sum_t2) = (0.0, 0.0, 0.0);
    for &label in &labels {
        let t_k = y_true.iter().filter(|&&t| t == label).count() as f64;
        let p_k = y_pred.iter().filter(|&&p| p == label).count() as f64;
        cov_tp += t_k * p_k;
        sum_p2 += p_k * p_k;
        sum_t2 += t_k * t_k;
    }

    let denominator = ((n * n - sum_p2) * (n * n - sum_t2)).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    (correct * n - cov_tp) / denominator
}
