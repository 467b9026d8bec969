//! Labelled dataset used by every stage of the feature selection.
//!
//! Features are addressed by their 0-based column in the original matrix.
//! Those identifiers stay stable while the elimination narrows the active
//! feature set; slicing never renumbers them.
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Result, RfeError};

#[derive(Debug, Clone)]
pub struct InputData {
    /// Feature matrix, shape (n_samples, n_features)
    pub x: Array2<f64>,
    /// Encoded class labels, shape (n_samples,)
    pub y: Array1<usize>,
    /// Optional group id per sample; samples of one group are never split apart
    pub groups: Option<Vec<usize>>,
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
}

impl InputData {
    pub fn new(x: Array2<f64>, y: Array1<usize>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(RfeError::InvalidInput(format!(
                "feature matrix has {} rows but {} labels were given",
                x.nrows(),
                y.len()
            )));
        }
        if x.ncols() == 0 {
            return Err(RfeError::InvalidInput(
                "feature matrix has no columns".to_string(),
            ));
        }
        if x.nrows() == 0 {
            return Err(RfeError::InvalidInput("dataset has no samples".to_string()));
        }

        let n_classes = y.iter().max().map(|&m| m + 1).unwrap_or(0);
        let feature_names = (0..x.ncols()).map(|i| format!("feature_{}", i)).collect();
        let class_names = (0..n_classes).map(|c| c.to_string()).collect();

        Ok(InputData {
            x,
            y,
            groups: None,
            feature_names,
            class_names,
        })
    }

    pub fn with_groups(mut self, groups: Vec<usize>) -> Result<Self> {
        if groups.len() != self.n_samples() {
            return Err(RfeError::InvalidInput(format!(
                "{} group ids given for {} samples",
                groups.len(),
                self.n_samples()
            )));
        }
        self.groups = Some(groups);
        Ok(self)
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.n_features() {
            return Err(RfeError::InvalidInput(format!(
                "{} feature names given for {} features",
                names.len(),
                self.n_features()
            )));
        }
        self.feature_names = names;
        Ok(self)
    }

    pub fn with_class_names(mut self, names: Vec<String>) -> Self {
        self.class_names = names;
        self
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn feature_name(&self, feature: usize) -> Option<&str> {
        self.feature_names.get(feature).map(|s| s.as_str())
    }

    /// Rows `rows` restricted to the columns `features`, in the order given.
    pub fn slice(&self, rows: &[usize], features: &[usize]) -> Result<(Array2<f64>, Array1<usize>)> {
        let n_features = self.n_features();
        if let Some(&bad) = features.iter().find(|&&f| f >= n_features) {
            return Err(RfeError::IndexOutOfRange {
                what: "feature",
                index: bad,
                len: n_features,
            });
        }
        let n_samples = self.n_samples();
        if let Some(&bad) = rows.iter().find(|&&r| r >= n_samples) {
            return Err(RfeError::IndexOutOfRange {
                what: "sample",
                index: bad,
                len: n_samples,
            });
        }

        let x = self.x.select(Axis(0), rows).select(Axis(1), features);
        let y = self.y.select(Axis(0), rows);
        Ok((x, y))
    }

    /// Copy of the dataset with the labels shuffled across samples.
    pub fn with_permuted_labels<R: Rng + ?Sized>(&self, rng: &mut R) -> InputData {
        let mut labels = self.y.to_vec();
        labels.shuffle(rng);
        InputData {
            y: Array1::from_vec(labels),
            ..self.clone()
        }
    }

    pub fn log_input_data_summary(&self) {
        let mut counts = vec![0usize; self.class_names.len()];
        for &label in self.y.iter() {
            if label < counts.len() {
                counts[label] += 1;
            }
        }
        log::info!(
            "{} samples, {} features, class sizes {:?}",
            self.n_samples(),
            self.n_features(),
            counts
        );
        if let Some(groups) = &self.groups {
            let mut unique = groups.clone();
            unique.sort_unstable();
            unique.dedup();
            log::info!("{} sample groups", unique.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dataset() -> InputData {
        let x = Array2::from_shape_vec((4, 3), (0..12).map(|v| v as f64).collect()).unwrap();
        let y = Array1::from_vec(vec![0, 1, 0, 1]);
        InputData::new(x, y).unwrap()
    }

    #[test]
    fn test_rejects_mismatched_labels() {
        let x = Array2::<f64>::zeros((3, 2));
        let y = Array1::from_vec(vec![0, 1]);
        assert!(matches!(
            InputData::new(x, y),
            Err(RfeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_slice_keeps_requested_columns() {
        let data = dataset();
        let (x, y) = data.slice(&[1, 3], &[2, 0]).unwrap();
        assert_eq!(x.shape(), &[2, 2]);
        assert_eq!(x[(0, 0)], 5.0);
        assert_eq!(x[(0, 1)], 3.0);
        assert_eq!(y.to_vec(), vec![1, 1]);
    }

    #[test]
    fn test_slice_rejects_unknown_feature() {
        let data = dataset();
        assert!(matches!(
            data.slice(&[0], &[3]),
            Err(RfeError::IndexOutOfRange { what: "feature", .. })
        ));
    }

    #[test]
    fn test_permuted_labels_keep_class_counts() {
        let data = dataset();
        let mut rng = StdRng::seed_from_u64(3);
        let permuted = data.with_permuted_labels(&mut rng);
        let mut labels = permuted.y.to_vec();
        labels.sort_unstable();
        assert_eq!(labels, vec![0, 0, 1, 1]);
        assert_eq!(permuted.x, data.x);
    }
}
