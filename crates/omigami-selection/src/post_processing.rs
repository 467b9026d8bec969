//! Turns the per-fold outcomes of all repetitions into one selection.
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Result, RfeError};
use crate::results::{FeatureEvaluationResults, FeatureSelectionResults, OuterLoopResults, Selection};
use crate::utils::{average_ranks, average_scores, get_best_n_features};

pub struct PostProcessor {
    n_features: usize,
    random_state: u64,
}

impl PostProcessor {
    pub fn new(n_features: usize, random_state: u64) -> Self {
        PostProcessor {
            n_features,
            random_state,
        }
    }

    /// Aggregate `results` (per repetition, per outer fold).
    ///
    /// The size of each min/mid/max set is the rounded mean of the per-fold
    /// sizes; its members are the best features by averaged rank.
    pub fn process_results(&self, results: Vec<Vec<OuterLoopResults>>) -> Result<FeatureSelectionResults> {
        let folds: Vec<&OuterLoopResults> = results.iter().flatten().collect();
        if folds.is_empty() {
            return Err(RfeError::InvalidInput(
                "no outer fold results to aggregate".to_string(),
            ));
        }

        let curves: Vec<_> = folds.iter().map(|r| r.score_vs_feats.clone()).collect();
        let score_vs_feats = average_scores(&curves);

        let evals: Selection<Vec<&FeatureEvaluationResults>> = folds.iter().map(|&r| r.evals()).collect();
        let avg_ranks = evals.try_map(|e| average_ranks(e.iter().map(|r| &r.ranks)))?;
        let test_scores = evals.map(|e| e.iter().map(|r| r.test_score).sum::<f64>() / e.len() as f64);
        let n_selected = evals.map(|e| {
            let total: usize = e.iter().map(|r| r.ranks.len()).sum();
            (total as f64 / e.len() as f64).round() as usize
        });

        let mut rng = StdRng::seed_from_u64(self.random_state);
        let selected_features = Selection {
            min: get_best_n_features(&avg_ranks.min, n_selected.min, &mut rng)?,
            mid: get_best_n_features(&avg_ranks.mid, n_selected.mid, &mut rng)?,
            max: get_best_n_features(&avg_ranks.max, n_selected.max, &mut rng)?,
        };

        log::info!(
            "Selected {} / {} / {} of {} features (min / mid / max)",
            n_selected.min,
            n_selected.mid,
            n_selected.max,
            self.n_features
        );

        Ok(FeatureSelectionResults {
            n_features: self.n_features,
            score_vs_feats,
            selected_features,
            avg_ranks,
            test_scores,
            raw_results: results,
        })
    }
}
