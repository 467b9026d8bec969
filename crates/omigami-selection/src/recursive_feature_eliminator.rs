use std::collections::BTreeMap;

use crate::error::{Result, RfeError};
use crate::feature_evaluator::FeatureEvaluator;
use crate::models::ClassifierModel;
use crate::results::{FeatureEvaluationResults, FeatureRanks, RecursiveFeatureEliminationResults, Selection};
use crate::stats::compute_t_student_p_value;
use crate::utils::average_ranks;

/// A feature dropped during elimination. `rank_fraction` is its position in
/// the averaged ranking of the iteration that dropped it, over the number of
/// features active in that iteration.
#[derive(Debug, Clone, PartialEq)]
struct EliminatedFeature {
    feature: usize,
    iteration: usize,
    rank_fraction: f64,
}

/// Recursive feature elimination over the inner folds of one outer fold.
///
/// Every iteration evaluates the active features on all inner folds, records
/// the mean inner score for the current feature count and drops the worst
/// `dropout_rate` share of the features by averaged rank. The loop ends once
/// a single feature has been evaluated.
pub struct RecursiveFeatureEliminator<'e, 'a, M: ClassifierModel> {
    evaluator: &'e FeatureEvaluator<'a, M>,
    dropout_rate: f64,
    robust_minimum: f64,
}

impl<'e, 'a, M: ClassifierModel> RecursiveFeatureEliminator<'e, 'a, M> {
    pub fn new(evaluator: &'e FeatureEvaluator<'a, M>, dropout_rate: f64, robust_minimum: f64) -> Self {
        RecursiveFeatureEliminator {
            evaluator,
            dropout_rate,
            robust_minimum,
        }
    }

    pub fn run(&self, outer_idx: usize) -> Result<RecursiveFeatureEliminationResults> {
        let n_feats = self.evaluator.n_features();
        let mut features: Vec<usize> = (0..n_feats).collect();
        let mut inner_scores: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        let mut active_sets: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut eliminated: Vec<EliminatedFeature> = Vec::new();
        let mut iteration = 0;

        let survivors = loop {
            let results = self.evaluate_inner_folds(&features, outer_idx)?;
            let ranks = average_ranks(results.iter().map(|r| &r.ranks))?;
            let scores: Vec<f64> = results.iter().map(|r| r.test_score).collect();

            log::debug!(
                "Outer fold {} iteration {}: {} features, mean inner score {:.4}",
                outer_idx,
                iteration,
                features.len(),
                mean(&scores)
            );

            // best first
            let mut ordered = features.clone();
            ordered.sort_by(|&a, &b| ranks.get(a).total_cmp(&ranks.get(b)).then(a.cmp(&b)));

            inner_scores.insert(features.len(), scores);
            active_sets.insert(features.len(), features.clone());

            if ordered.len() == 1 {
                break ordered;
            }

            let n_active = ordered.len();
            let keep = n_active - n_features_to_drop(n_active, self.dropout_rate);
            for (position, &feature) in ordered.iter().enumerate().skip(keep) {
                eliminated.push(EliminatedFeature {
                    feature,
                    iteration,
                    rank_fraction: position as f64 / n_active as f64,
                });
            }
            features = ordered[..keep].to_vec();
            features.sort_unstable();
            iteration += 1;
        };

        let n_best_feats = select_n_best_features(&inner_scores, self.robust_minimum)?;
        let best_feats = n_best_feats.try_map(|n| {
            active_sets.get(n).cloned().ok_or_else(|| {
                RfeError::InvalidInput(format!("no elimination step kept {} features", n))
            })
        })?;
        let score_vs_feats = inner_scores.iter().map(|(&n, s)| (n, mean(s))).collect();
        let ranks = final_ranks(&survivors, eliminated, n_feats)?;

        log::info!(
            "Outer fold {}: selected {} / {} / {} features (min / mid / max)",
            outer_idx,
            n_best_feats.min,
            n_best_feats.mid,
            n_best_feats.max
        );

        Ok(RecursiveFeatureEliminationResults {
            score_vs_feats,
            n_best_feats,
            best_feats,
            ranks,
        })
    }

    fn evaluate_inner_folds(&self, features: &[usize], outer_idx: usize) -> Result<Vec<FeatureEvaluationResults>> {
        (0..self.evaluator.inner_loop_size())
            .map(|inner_idx| self.evaluator.evaluate_features(features, outer_idx, Some(inner_idx)))
            .collect()
    }
}

/// At least one feature goes per iteration, and at least one stays.
fn n_features_to_drop(n_active: usize, dropout_rate: f64) -> usize {
    let n = (dropout_rate * n_active as f64).floor() as usize;
    n.max(1).min(n_active.saturating_sub(1))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Pick the smallest, largest and middle feature count whose mean score is
/// not significantly worse than the best one. The inner scores of the best
/// count are the reference population; ties for best go to fewer features.
pub(crate) fn select_n_best_features(
    inner_scores: &BTreeMap<usize, Vec<f64>>,
    robust_minimum: f64,
) -> Result<Selection<usize>> {
    let curve: Vec<(usize, f64)> = inner_scores.iter().map(|(&n, s)| (n, mean(s))).collect();

    let mut best: Option<(usize, f64)> = None;
    for &(n, score) in &curve {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((n, score)),
        }
    }
    let (best_n, _) = best.ok_or_else(|| RfeError::InvalidInput("empty score curve".to_string()))?;
    let population = &inner_scores[&best_n];

    let mut passing = Vec::new();
    for (i, &(n, score)) in curve.iter().enumerate() {
        let p_value = compute_t_student_p_value(score, population)?;
        log::trace!("{} features: score {:.4}, p-value {:.4}", n, score, p_value);
        if p_value > robust_minimum {
            passing.push(i);
        }
    }

    match (passing.first(), passing.last()) {
        (Some(&i_min), Some(&i_max)) => Ok(Selection {
            min: curve[i_min].0,
            mid: curve[(i_min + i_max) / 2].0,
            max: curve[i_max].0,
        }),
        _ => Ok(Selection {
            min: best_n,
            mid: best_n,
            max: best_n,
        }),
    }
}

/// Full ranking over all `n_feats` features: survivors of the last iteration
/// first, then the eliminated features, latest iteration first and better
/// positions first within one iteration.
fn final_ranks(survivors: &[usize], mut eliminated: Vec<EliminatedFeature>, n_feats: usize) -> Result<FeatureRanks> {
    eliminated.sort_by(|a, b| {
        b.iteration
            .cmp(&a.iteration)
            .then(a.rank_fraction.total_cmp(&b.rank_fraction))
            .then(a.feature.cmp(&b.feature))
    });
    let order: Vec<usize> = survivors
        .iter()
        .copied()
        .chain(eliminated.into_iter().map(|e| e.feature))
        .collect();
    let ranks: Vec<f64> = (1..=order.len()).map(|r| r as f64).collect();
    FeatureRanks::new(&order, &ranks, n_feats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metric;
    use crate::testing::{synthetic_dataset, NearestCentroid};

    fn curve(points: &[(usize, &[f64])]) -> BTreeMap<usize, Vec<f64>> {
        points.iter().map(|(n, s)| (*n, s.to_vec())).collect()
    }

    #[test]
    fn test_n_features_to_drop() {
        assert_eq!(n_features_to_drop(10, 0.2), 2);
        assert_eq!(n_features_to_drop(4, 0.2), 1);
        assert_eq!(n_features_to_drop(2, 0.9), 1);
        assert_eq!(n_features_to_drop(5, 0.99), 4);
        assert_eq!(n_features_to_drop(1, 0.5), 0);
    }

    #[test]
    fn test_select_n_best_features_uses_significance() {
        // best is 3 features; its inner scores have mean -2 and std 1
        let scores = curve(&[
            (1, &[-20.0, -20.0]),
            (2, &[-3.0, -3.0]),
            (3, &[-1.0, -3.0]),
            (4, &[-2.5, -2.5]),
            (5, &[-30.0, -30.0]),
        ]);
        let selection = select_n_best_features(&scores, 0.05).unwrap();
        assert_eq!(selection, Selection { min: 2, mid: 3, max: 4 });
    }

    #[test]
    fn test_select_n_best_features_falls_back_to_best() {
        let scores = curve(&[(1, &[-4.0, -4.0]), (2, &[-1.0, -3.0]), (3, &[-5.0, -5.0])]);
        let selection = select_n_best_features(&scores, 0.99).unwrap();
        assert_eq!(selection, Selection { min: 2, mid: 2, max: 2 });
    }

    #[test]
    fn test_best_score_ties_go_to_fewer_features() {
        let scores = curve(&[(2, &[0.0, -2.0]), (4, &[-1.0, -1.0]), (6, &[-2.0, 0.0])]);
        let selection = select_n_best_features(&scores, 0.99).unwrap();
        assert_eq!(selection.min, 2);
    }

    #[test]
    fn test_final_ranks_orders_by_elimination() {
        let eliminated = vec![
            EliminatedFeature { feature: 4, iteration: 0, rank_fraction: 0.8 },
            EliminatedFeature { feature: 2, iteration: 1, rank_fraction: 0.75 },
            EliminatedFeature { feature: 0, iteration: 2, rank_fraction: 0.5 },
            EliminatedFeature { feature: 3, iteration: 0, rank_fraction: 0.6 },
        ];
        let ranks = final_ranks(&[1], eliminated, 5).unwrap();
        assert_eq!(ranks.get(1), 1.0);
        assert_eq!(ranks.get(0), 2.0);
        assert_eq!(ranks.get(2), 3.0);
        assert_eq!(ranks.get(3), 4.0);
        assert_eq!(ranks.get(4), 5.0);
    }

    #[test]
    fn test_elimination_keeps_informative_features() {
        let data = synthetic_dataset(40, 6, 7);
        let evaluator =
            FeatureEvaluator::new(&data, 2, 2, NearestCentroid::default(), Metric::Miss, 0).unwrap();
        let rfe = RecursiveFeatureEliminator::new(&evaluator, 0.2, 0.05);
        let results = rfe.run(0).unwrap();

        let counts: Vec<usize> = results.score_vs_feats.keys().copied().collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 5, 6]);

        let n = results.n_best_feats;
        assert!(n.min <= n.mid && n.mid <= n.max);
        assert!(results.score_vs_feats.contains_key(&n.min));
        assert_eq!(results.best_feats.min.len(), n.min);
        assert_eq!(results.best_feats.mid.len(), n.mid);
        assert_eq!(results.best_feats.max.len(), n.max);
        assert!(results.best_feats.min.contains(&0));

        assert_eq!(results.ranks.len(), 6);
        assert_eq!(results.ranks.get(0), 1.0);
        assert_eq!(results.ranks.get(1), 2.0);
        let mut ranks: Vec<f64> = results.ranks.data().values().copied().collect();
        ranks.sort_by(f64::total_cmp);
        assert_eq!(ranks, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_elimination_is_reproducible() {
        let data = synthetic_dataset(30, 8, 3);
        let evaluator =
            FeatureEvaluator::new(&data, 3, 2, NearestCentroid::default(), Metric::Miss, 11).unwrap();
        let rfe = RecursiveFeatureEliminator::new(&evaluator, 0.5, 0.05);
        assert_eq!(rfe.run(1).unwrap(), rfe.run(1).unwrap());

        // 8 -> 4 -> 2 -> 1
        let counts: Vec<usize> = rfe.run(2).unwrap().score_vs_feats.keys().copied().collect();
        assert_eq!(counts, vec![1, 2, 4, 8]);
    }
}
