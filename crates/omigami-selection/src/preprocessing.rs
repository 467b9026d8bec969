//! Feature standardization used as a pipeline step.
//!
//! Provides a simple Scaler for per-column mean/std standardization. The
//! statistics are computed on the training slice only and then reused to
//! transform test slices.
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug, PartialEq)]
pub struct Scaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-12;

    /// Fit a `Scaler` where rows are samples and columns are features.
    pub fn fit(x: ArrayView2<f64>) -> Scaler {
        let ncols = x.ncols();
        if x.nrows() == 0 {
            return Scaler {
                mean: Array1::zeros(ncols),
                std: Array1::ones(ncols),
            };
        }
        let mean = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(ncols));
        let std = x.std_axis(Axis(0), 0.0).mapv(|s| s.max(Self::MIN_STD));
        Scaler { mean, std }
    }

    pub fn transform(&self, x: ArrayView2<f64>) -> Array2<f64> {
        (&x - &self.mean) / &self.std
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standardizes_columns() {
        let x = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let scaler = Scaler::fit(x.view());
        let z = scaler.transform(x.view());
        assert_eq!(scaler.mean, array![3.0, 10.0]);
        let col0 = z.column(0);
        assert!((col0.sum()).abs() < 1e-12);
        assert!((col0[2] - 1.224744871391589).abs() < 1e-9);
        // constant column maps to zero instead of NaN
        assert!(z.column(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_transform_uses_training_statistics() {
        let train = array![[0.0], [2.0]];
        let scaler = Scaler::fit(train.view());
        let test = array![[4.0]];
        assert_eq!(scaler.transform(test.view()), array![[3.0]]);
    }
}
