use ndarray::Array1;

use crate::data_handling::InputData;
use crate::error::{Result, RfeError};
use crate::metrics::Metric;
use crate::models::ClassifierModel;
use crate::results::{FeatureEvaluationResults, FeatureRanks};
use crate::splitter::DataSplitter;

/// Fits a fresh model on one fold with a feature subset, scores it on the
/// held-out rows and ranks the features by the model's importances.
pub struct FeatureEvaluator<'a, M: ClassifierModel> {
    input: &'a InputData,
    model: M,
    metric: Metric,
    splitter: DataSplitter,
    n_inner: usize,
}

impl<'a, M: ClassifierModel> FeatureEvaluator<'a, M> {
    pub fn new(
        input: &'a InputData,
        n_outer: usize,
        n_inner: usize,
        model: M,
        metric: Metric,
        random_state: u64,
    ) -> Result<Self> {
        let splitter = DataSplitter::fit(input, n_outer, n_inner, random_state)?;
        Ok(FeatureEvaluator {
            input,
            model,
            metric,
            splitter,
            n_inner,
        })
    }

    /// Train on the train side of fold (`outer_idx`, `inner_idx`) using only
    /// `features`, and evaluate on its test side. `inner_idx = None` uses the
    /// outer split itself.
    pub fn evaluate_features(
        &self,
        features: &[usize],
        outer_idx: usize,
        inner_idx: Option<usize>,
    ) -> Result<FeatureEvaluationResults> {
        if features.is_empty() {
            return Err(RfeError::InvalidInput(
                "cannot evaluate an empty feature set".to_string(),
            ));
        }
        let split = self.splitter.get_split(outer_idx, inner_idx)?;

        let (x_train, y_train) = self.input.slice(&split.train, features)?;
        let mut model = self.model.clone_unfitted();
        model.fit(x_train.view(), y_train.view())?;

        let (x_test, y_test) = self.input.slice(&split.test, features)?;
        let y_pred = model.predict(x_test.view())?;
        let test_score = self.metric.score(&y_test.to_vec(), &y_pred.to_vec());

        let importances = model
            .feature_importances()
            .ok_or_else(|| RfeError::ImportanceUnavailable(model.name().to_string()))?;
        if importances.len() != features.len() {
            return Err(RfeError::ImportanceUnavailable(format!(
                "{} returned {} importances for {} features",
                model.name(),
                importances.len(),
                features.len()
            )));
        }
        let ranks = rank_features(features, &importances, self.n_features())?;

        log::trace!(
            "Outer fold {} inner fold {:?}: {} features, score {:.4}",
            outer_idx,
            inner_idx,
            features.len(),
            test_score
        );

        Ok(FeatureEvaluationResults { test_score, ranks })
    }

    pub fn n_features(&self) -> usize {
        self.input.n_features()
    }

    pub fn inner_loop_size(&self) -> usize {
        self.n_inner
    }

    pub fn outer_loop_size(&self) -> usize {
        self.splitter.n_outer()
    }

    pub fn splitter(&self) -> &DataSplitter {
        &self.splitter
    }

    pub fn refresh_splits(&mut self) -> Result<()> {
        self.splitter.refresh()
    }
}

/// Rank 1 goes to the largest importance; ties go to the smaller feature id.
/// NaN importances rank last.
fn rank_features(features: &[usize], importances: &Array1<f64>, n_feats: usize) -> Result<FeatureRanks> {
    let mut order: Vec<usize> = (0..features.len()).collect();
    order.sort_by(|&a, &b| {
        let ia = if importances[a].is_nan() { f64::NEG_INFINITY } else { importances[a] };
        let ib = if importances[b].is_nan() { f64::NEG_INFINITY } else { importances[b] };
        ib.total_cmp(&ia).then(features[a].cmp(&features[b]))
    });

    let mut ranks = vec![0.0; features.len()];
    for (position, &i) in order.iter().enumerate() {
        ranks[i] = (position + 1) as f64;
    }
    FeatureRanks::new(features, &ranks, n_feats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2, ArrayView1, ArrayView2};

    /// Predicts the majority training class; importance is the column mean.
    #[derive(Clone)]
    struct MeanImportance {
        fitted: Option<(usize, Array1<f64>)>,
        expose_importances: bool,
    }

    impl ClassifierModel for MeanImportance {
        fn clone_unfitted(&self) -> Self {
            MeanImportance {
                fitted: None,
                expose_importances: self.expose_importances,
            }
        }

        fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<usize>) -> Result<()> {
            let ones = y.iter().filter(|&&v| v == 1).count();
            let majority = usize::from(2 * ones > y.len());
            let means = x.mean_axis(ndarray::Axis(0)).unwrap();
            self.fitted = Some((majority, means));
            Ok(())
        }

        fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<usize>> {
            let (majority, _) = self.fitted.as_ref().unwrap();
            Ok(Array1::from_elem(x.nrows(), *majority))
        }

        fn feature_importances(&self) -> Option<Array1<f64>> {
            if !self.expose_importances {
                return None;
            }
            self.fitted.as_ref().map(|(_, means)| means.clone())
        }
    }

    fn dataset() -> InputData {
        // column means: 3.0, 1.0, 2.0, 2.0
        let mut rows = Vec::new();
        for _ in 0..12 {
            rows.extend_from_slice(&[3.0, 1.0, 2.0, 2.0]);
        }
        let x = Array2::from_shape_vec((12, 4), rows).unwrap();
        let y = Array1::from_vec((0..12).map(|i| i % 2).collect());
        InputData::new(x, y).unwrap()
    }

    #[test]
    fn test_rank_features_breaks_ties_by_feature_id() {
        let ranks = rank_features(&[7, 2, 5], &array![0.5, 0.5, 0.9], 10).unwrap();
        assert_eq!(ranks.get(5), 1.0);
        assert_eq!(ranks.get(2), 2.0);
        assert_eq!(ranks.get(7), 3.0);
    }

    #[test]
    fn test_evaluate_features_keeps_feature_ids() {
        let data = dataset();
        let model = MeanImportance {
            fitted: None,
            expose_importances: true,
        };
        let evaluator = FeatureEvaluator::new(&data, 3, 2, model, Metric::Miss, 0).unwrap();

        let result = evaluator.evaluate_features(&[3, 0, 1], 0, Some(1)).unwrap();
        assert_eq!(result.ranks.features(), vec![0, 1, 3]);
        assert_eq!(result.ranks.get(0), 1.0);
        assert_eq!(result.ranks.get(3), 2.0);
        assert_eq!(result.ranks.get(1), 3.0);
        assert_eq!(result.ranks.n_feats(), 4);
        assert!(result.test_score <= 0.0);

        let mut sorted: Vec<f64> = result.ranks.data().values().copied().collect();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(sorted, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_missing_importances_is_an_error() {
        let data = dataset();
        let model = MeanImportance {
            fitted: None,
            expose_importances: false,
        };
        let evaluator = FeatureEvaluator::new(&data, 3, 2, model, Metric::Miss, 0).unwrap();
        assert!(matches!(
            evaluator.evaluate_features(&[0, 1], 1, None),
            Err(RfeError::ImportanceUnavailable(_))
        ));
    }

    #[test]
    fn test_bad_fold_coordinates() {
        let data = dataset();
        let model = MeanImportance {
            fitted: None,
            expose_importances: true,
        };
        let evaluator = FeatureEvaluator::new(&data, 3, 2, model, Metric::Miss, 0).unwrap();
        assert!(matches!(
            evaluator.evaluate_features(&[0], 3, None),
            Err(RfeError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            evaluator.evaluate_features(&[0], 0, Some(2)),
            Err(RfeError::IndexOutOfRange { .. })
        ));
    }
}
