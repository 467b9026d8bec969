use crate::error::{Result, RfeError};
use crate::executor::Executor;
use crate::feature_evaluator::FeatureEvaluator;
use crate::models::ClassifierModel;
use crate::recursive_feature_eliminator::RecursiveFeatureEliminator;
use crate::results::OuterLoopResults;

/// Runs the recursive elimination on every outer fold and scores the selected
/// feature subsets on the fold's held-out rows.
pub struct OuterLoop<'a, M: ClassifierModel> {
    evaluator: FeatureEvaluator<'a, M>,
    dropout_rate: f64,
    robust_minimum: f64,
}

impl<'a, M: ClassifierModel> OuterLoop<'a, M> {
    pub fn new(evaluator: FeatureEvaluator<'a, M>, dropout_rate: f64, robust_minimum: f64) -> Self {
        OuterLoop {
            evaluator,
            dropout_rate,
            robust_minimum,
        }
    }

    /// Run every outer fold through `executor`.
    ///
    /// One failing fold fails the whole run; results are ordered by outer
    /// fold index.
    pub fn run(&self, executor: &Executor) -> Result<Vec<OuterLoopResults>> {
        let n_outer = self.evaluator.outer_loop_size();
        log::info!(
            "Running {} outer folds on {} thread(s)",
            n_outer,
            executor.n_threads()
        );

        let results = executor.map_ordered(n_outer, |outer_idx| {
            self.execute_loop(outer_idx).map_err(|e| {
                log::error!("Outer fold {} failed: {}", outer_idx, e);
                e
            })
        });
        results.into_iter().collect()
    }

    /// Eliminate on the inner folds of `outer_idx`, then evaluate the min, mid
    /// and max feature sets on the outer split.
    pub fn execute_loop(&self, outer_idx: usize) -> Result<OuterLoopResults> {
        if outer_idx >= self.evaluator.outer_loop_size() {
            return Err(RfeError::IndexOutOfRange {
                what: "outer fold",
                index: outer_idx,
                len: self.evaluator.outer_loop_size(),
            });
        }
        log::info!("Starting outer fold {}", outer_idx);

        let rfe = RecursiveFeatureEliminator::new(&self.evaluator, self.dropout_rate, self.robust_minimum);
        let rfe_results = rfe.run(outer_idx)?;

        let evals = rfe_results
            .best_feats
            .try_map(|features| self.evaluator.evaluate_features(features, outer_idx, None))?;

        log::info!(
            "Outer fold {} test scores: min {:.4}, mid {:.4}, max {:.4}",
            outer_idx,
            evals.min.test_score,
            evals.mid.test_score,
            evals.max.test_score
        );

        Ok(OuterLoopResults {
            outer_index: outer_idx,
            min_eval: evals.min,
            mid_eval: evals.mid,
            max_eval: evals.max,
            score_vs_feats: rfe_results.score_vs_feats,
        })
    }

    /// Draw a fresh split plan for the next run.
    pub fn refresh_splits(&mut self) -> Result<()> {
        self.evaluator.refresh_splits()
    }

    pub fn evaluator(&self) -> &FeatureEvaluator<'a, M> {
        &self.evaluator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionMode;
    use crate::metrics::Metric;
    use crate::testing::{synthetic_dataset, NearestCentroid};

    fn outer_loop(data: &crate::data_handling::InputData) -> OuterLoop<'_, NearestCentroid> {
        let evaluator =
            FeatureEvaluator::new(data, 3, 2, NearestCentroid::default(), Metric::Miss, 5).unwrap();
        OuterLoop::new(evaluator, 0.3, 0.05)
    }

    #[test]
    fn test_run_returns_one_result_per_fold_in_order() {
        let data = synthetic_dataset(36, 7, 1);
        let outer = outer_loop(&data);
        let results = outer.run(&Executor::Inline).unwrap();

        assert_eq!(results.len(), 3);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.outer_index, i);
            let n_min = result.min_eval.ranks.len();
            let n_mid = result.mid_eval.ranks.len();
            let n_max = result.max_eval.ranks.len();
            assert!(n_min <= n_mid && n_mid <= n_max && n_max <= 7);
            assert!(result.score_vs_feats.contains_key(&7));
        }
    }

    #[test]
    fn test_parallel_run_matches_sequential_run() {
        let data = synthetic_dataset(36, 7, 1);
        let outer = outer_loop(&data);
        let pool = Executor::from_mode(&ExecutionMode::Parallel { n_threads: 3 }).unwrap();
        assert_eq!(outer.run(&pool).unwrap(), outer.run(&Executor::Inline).unwrap());
    }

    #[test]
    fn test_refresh_changes_splits() {
        let data = synthetic_dataset(36, 7, 1);
        let mut outer = outer_loop(&data);
        let before = outer.evaluator().splitter().plan().clone();
        outer.refresh_splits().unwrap();
        assert_ne!(&before, outer.evaluator().splitter().plan());
    }

    #[test]
    fn test_bad_outer_index() {
        let data = synthetic_dataset(36, 7, 1);
        let outer = outer_loop(&data);
        assert!(matches!(
            outer.execute_loop(3),
            Err(RfeError::IndexOutOfRange { .. })
        ));
    }

    /// Fails whenever it is trained on exactly `fail_on_rows` samples.
    #[derive(Debug, Clone, Default)]
    struct FailingModel {
        fail_on_rows: usize,
        inner: NearestCentroid,
    }

    impl ClassifierModel for FailingModel {
        fn clone_unfitted(&self) -> Self {
            FailingModel {
                fail_on_rows: self.fail_on_rows,
                inner: self.inner.clone_unfitted(),
            }
        }

        fn fit(&mut self, x: ndarray::ArrayView2<f64>, y: ndarray::ArrayView1<usize>) -> Result<()> {
            if x.nrows() == self.fail_on_rows {
                return Err(RfeError::ModelFit(format!("refusing {} rows", x.nrows())));
            }
            self.inner.fit(x, y)
        }

        fn predict(&self, x: ndarray::ArrayView2<f64>) -> Result<ndarray::Array1<usize>> {
            self.inner.predict(x)
        }

        fn feature_importances(&self) -> Option<ndarray::Array1<f64>> {
            self.inner.feature_importances()
        }
    }

    #[test]
    fn test_one_failing_fold_fails_the_run() {
        // 35 rows in 3 outer folds: only the last outer train set has 24 rows,
        // every inner train set has 11 or 12
        let data = synthetic_dataset(35, 5, 2);
        let model = FailingModel {
            fail_on_rows: 24,
            inner: NearestCentroid::default(),
        };
        let evaluator = FeatureEvaluator::new(&data, 3, 2, model, Metric::Miss, 5).unwrap();
        let outer = OuterLoop::new(evaluator, 0.3, 0.05);

        assert!(outer.execute_loop(0).is_ok());
        assert!(outer.execute_loop(1).is_ok());

        let pool = Executor::from_mode(&ExecutionMode::Parallel { n_threads: 3 }).unwrap();
        for executor in [Executor::Inline, pool] {
            match outer.run(&executor) {
                Err(RfeError::ModelFit(message)) => assert_eq!(message, "refusing 24 rows"),
                other => panic!("expected the fold failure, got {:?}", other.map(|r| r.len())),
            }
        }
    }
}
