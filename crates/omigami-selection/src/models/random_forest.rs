use std::collections::BTreeMap;

use linfa::prelude::*;
use linfa::DatasetBase;
use linfa_trees::DecisionTree;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::error::{Result, RfeError};
use crate::models::classifier_trait::ClassifierModel;

/// One tree of the ensemble and the columns it was grown on.
#[derive(Debug, Clone)]
struct ForestTree {
    columns: Vec<usize>,
    tree: DecisionTree<f64, usize>,
}

/// Random forest of decision trees. Each tree is grown on a bootstrap sample
/// of the rows and a random subset of `ceil(sqrt(n_features))` columns, both
/// drawn from a generator seeded with `seed`, so two fits on the same data
/// agree.
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    n_trees: usize,
    max_depth: Option<usize>,
    min_weight_split: f32,
    seed: u64,
    trees: Vec<ForestTree>,
    n_features: usize,
}

impl RandomForestClassifier {
    pub fn new(n_trees: usize, max_depth: Option<usize>, min_weight_split: f32, seed: u64) -> Self {
        RandomForestClassifier {
            n_trees: n_trees.max(1),
            max_depth,
            min_weight_split,
            seed,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.n_trees
    }
}

/// Columns considered by each tree.
fn max_features(n_features: usize) -> usize {
    ((n_features as f64).sqrt().ceil() as usize).clamp(1, n_features.max(1))
}

impl ClassifierModel for RandomForestClassifier {
    fn clone_unfitted(&self) -> Self {
        RandomForestClassifier::new(self.n_trees, self.max_depth, self.min_weight_split, self.seed)
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<usize>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples == 0 || n_features == 0 {
            return Err(RfeError::ModelFit(format!(
                "cannot fit on a {}x{} training set",
                n_samples, n_features
            )));
        }

        let n_columns = max_features(n_features);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_trees);
        for _ in 0..self.n_trees {
            let rows: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
            let mut columns = index::sample(&mut rng, n_features, n_columns).into_vec();
            columns.sort_unstable();

            let dataset = DatasetBase::new(
                x.select(Axis(0), &rows).select(Axis(1), &columns),
                y.select(Axis(0), &rows),
            );
            let tree = DecisionTree::params()
                .max_depth(self.max_depth)
                .min_weight_split(self.min_weight_split)
                .fit(&dataset)
                .map_err(|e| RfeError::ModelFit(format!("decision tree: {}", e)))?;
            trees.push(ForestTree { columns, tree });
        }

        log::trace!(
            "Fitted {} trees on {} samples, {} of {} features each",
            trees.len(),
            n_samples,
            n_columns,
            n_features
        );
        self.trees = trees;
        self.n_features = n_features;
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<usize>> {
        if self.trees.is_empty() {
            return Err(RfeError::ModelFit("random forest used before fit".to_string()));
        }
        if x.ncols() != self.n_features {
            return Err(RfeError::ModelFit(format!(
                "random forest fitted on {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }

        let votes: Vec<Array1<usize>> = self
            .trees
            .iter()
            .map(|t| t.tree.predict(&x.select(Axis(1), &t.columns)))
            .collect();
        let predictions = (0..x.nrows())
            .map(|row| {
                let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
                for tree_votes in &votes {
                    *counts.entry(tree_votes[row]).or_insert(0) += 1;
                }
                // ties go to the smallest label
                counts
                    .into_iter()
                    .fold((0, 0), |best, (label, count)| if count > best.1 { (label, count) } else { best })
                    .0
            })
            .collect();
        Ok(predictions)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        if self.trees.is_empty() {
            return None;
        }
        let mut total = Array1::<f64>::zeros(self.n_features);
        for t in &self.trees {
            for (&column, value) in t.columns.iter().zip(t.tree.feature_importance()) {
                if value.is_finite() {
                    total[column] += value;
                }
            }
        }
        Some(total / self.trees.len() as f64)
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}
