//! Value types produced by the feature selection and handed up the call chain.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data_handling::InputData;
use crate::error::{Result, RfeError};

/// Rank per feature id (1 = most important) over a subset of the features of
/// a dataset with `n_feats` columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRanks {
    n_feats: usize,
    data: BTreeMap<usize, f64>,
}

impl FeatureRanks {
    pub fn new(features: &[usize], ranks: &[f64], n_feats: usize) -> Result<Self> {
        if features.len() != ranks.len() {
            return Err(RfeError::InvalidInput(format!(
                "{} features but {} ranks",
                features.len(),
                ranks.len()
            )));
        }
        let mut data = BTreeMap::new();
        for (&feature, &rank) in features.iter().zip(ranks.iter()) {
            if feature >= n_feats {
                return Err(RfeError::IndexOutOfRange {
                    what: "feature",
                    index: feature,
                    len: n_feats,
                });
            }
            if data.insert(feature, rank).is_some() {
                return Err(RfeError::InvalidInput(format!(
                    "feature {} appears twice",
                    feature
                )));
            }
        }
        Ok(FeatureRanks { n_feats, data })
    }

    /// Rank of `feature`; features outside the subset get the worst rank, `n_feats`.
    pub fn get(&self, feature: usize) -> f64 {
        self.data
            .get(&feature)
            .copied()
            .unwrap_or(self.n_feats as f64)
    }

    pub fn n_feats(&self) -> usize {
        self.n_feats
    }

    pub fn data(&self) -> &BTreeMap<usize, f64> {
        &self.data
    }

    pub fn features(&self) -> Vec<usize> {
        self.data.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEvaluationResults {
    pub test_score: f64,
    pub ranks: FeatureRanks,
}

/// The minimal, mid and maximal choice of something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection<T> {
    pub min: T,
    pub mid: T,
    pub max: T,
}

impl<T> Selection<T> {
    pub fn map<U, F: FnMut(&T) -> U>(&self, mut f: F) -> Selection<U> {
        Selection {
            min: f(&self.min),
            mid: f(&self.mid),
            max: f(&self.max),
        }
    }

    pub fn try_map<U, F: FnMut(&T) -> Result<U>>(&self, mut f: F) -> Result<Selection<U>> {
        Ok(Selection {
            min: f(&self.min)?,
            mid: f(&self.mid)?,
            max: f(&self.max)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
        [("min", &self.min), ("mid", &self.mid), ("max", &self.max)].into_iter()
    }
}

impl<T> FromIterator<Selection<T>> for Selection<Vec<T>> {
    fn from_iter<I: IntoIterator<Item = Selection<T>>>(iter: I) -> Self {
        let mut out = Selection {
            min: Vec::new(),
            mid: Vec::new(),
            max: Vec::new(),
        };
        for s in iter {
            out.min.push(s.min);
            out.mid.push(s.mid);
            out.max.push(s.max);
        }
        out
    }
}

/// Output of the recursive elimination on one outer fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecursiveFeatureEliminationResults {
    /// Averaged inner score per number of active features.
    pub score_vs_feats: BTreeMap<usize, f64>,
    pub n_best_feats: Selection<usize>,
    pub best_feats: Selection<Vec<usize>>,
    /// Ranking over every original feature, eliminated ones included.
    pub ranks: FeatureRanks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OuterLoopResults {
    pub outer_index: usize,
    pub min_eval: FeatureEvaluationResults,
    pub mid_eval: FeatureEvaluationResults,
    pub max_eval: FeatureEvaluationResults,
    pub score_vs_feats: BTreeMap<usize, f64>,
}

impl OuterLoopResults {
    pub fn evals(&self) -> Selection<&FeatureEvaluationResults> {
        Selection {
            min: &self.min_eval,
            mid: &self.mid_eval,
            max: &self.max_eval,
        }
    }
}

/// Figures aggregated over every outer fold of every repetition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSelectionResults {
    pub n_features: usize,
    pub score_vs_feats: BTreeMap<usize, f64>,
    pub selected_features: Selection<Vec<usize>>,
    pub avg_ranks: Selection<FeatureRanks>,
    pub test_scores: Selection<f64>,
    /// Per repetition, per outer fold.
    pub raw_results: Vec<Vec<OuterLoopResults>>,
}

impl FeatureSelectionResults {
    pub fn feature_names(&self, input: &InputData) -> Selection<Vec<String>> {
        self.selected_features.map(|features| {
            features
                .iter()
                .map(|&f| input.feature_name(f).unwrap_or("unknown").to_string())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_feature_gets_worst_rank() {
        let ranks = FeatureRanks::new(&[0, 3], &[2.0, 1.0], 5).unwrap();
        assert_eq!(ranks.get(3), 1.0);
        assert_eq!(ranks.get(1), 5.0);
        assert_eq!(ranks.features(), vec![0, 3]);
    }

    #[test]
    fn test_rejects_duplicates_and_out_of_range() {
        assert!(FeatureRanks::new(&[1, 1], &[1.0, 2.0], 3).is_err());
        assert!(FeatureRanks::new(&[4], &[1.0], 3).is_err());
        assert!(FeatureRanks::new(&[0, 1], &[1.0], 3).is_err());
    }

    #[test]
    fn test_collect_selections_by_kind() {
        let collected: Selection<Vec<usize>> = vec![
            Selection { min: 1, mid: 2, max: 3 },
            Selection { min: 4, mid: 5, max: 6 },
        ]
        .into_iter()
        .collect();
        assert_eq!(collected.min, vec![1, 4]);
        assert_eq!(collected.mid, vec![2, 5]);
        assert_eq!(collected.max, vec![3, 6]);
    }
}
