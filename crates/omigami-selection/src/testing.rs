//! Deterministic model double and synthetic data shared by the unit tests.
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data_handling::InputData;
use crate::error::{Result, RfeError};
use crate::models::ClassifierModel;

/// Nearest class centroid. Importance of a feature is the spread of the class
/// centroids along it.
#[derive(Debug, Clone, Default)]
pub(crate) struct NearestCentroid {
    centroids: Vec<(usize, Array1<f64>)>,
}

impl ClassifierModel for NearestCentroid {
    fn clone_unfitted(&self) -> Self {
        NearestCentroid::default()
    }

    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<usize>) -> Result<()> {
        let mut classes: Vec<usize> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        self.centroids = classes
            .into_iter()
            .map(|c| {
                let rows: Vec<usize> = (0..y.len()).filter(|&i| y[i] == c).collect();
                let centroid = x
                    .select(Axis(0), &rows)
                    .mean_axis(Axis(0))
                    .ok_or_else(|| RfeError::ModelFit("empty class".to_string()))?;
                Ok((c, centroid))
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<usize>> {
        if self.centroids.is_empty() {
            return Err(RfeError::ModelFit("centroids used before fit".to_string()));
        }
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let mut best = (f64::INFINITY, 0);
                for (label, centroid) in &self.centroids {
                    let d: f64 = (&row - centroid).mapv(|v| v * v).sum();
                    if d < best.0 {
                        best = (d, *label);
                    }
                }
                best.1
            })
            .collect())
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        let (_, first) = self.centroids.first()?;
        let mut lo = first.clone();
        let mut hi = first.clone();
        for (_, centroid) in &self.centroids[1..] {
            lo.zip_mut_with(centroid, |a, &b| *a = a.min(b));
            hi.zip_mut_with(centroid, |a, &b| *a = a.max(b));
        }
        Some(hi - lo)
    }

    fn name(&self) -> &str {
        "nearest_centroid"
    }
}

/// Two classes alternating by row. Feature 0 separates them strongly,
/// feature 1 moderately, every other feature is uniform noise.
pub(crate) fn synthetic_dataset(n_samples: usize, n_features: usize, seed: u64) -> InputData {
    let mut rng = StdRng::seed_from_u64(seed);
    let y = Array1::from_vec((0..n_samples).map(|i| i % 2).collect());
    let x = Array2::from_shape_fn((n_samples, n_features), |(i, j)| {
        let noise: f64 = rng.gen_range(-1.0..1.0);
        match j {
            0 => 4.0 * y[i] as f64 + 0.5 * noise,
            1 => 2.0 * y[i] as f64 + noise,
            _ => noise,
        }
    });
    match InputData::new(x, y) {
        Ok(input) => input,
        Err(e) => panic!("synthetic dataset is malformed: {}", e),
    }
}
