use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{Result, RfeError};

/// Probability that `sample` was drawn from the distribution of `population`.
///
/// `population` is treated as n observations of a normal distribution with
/// unknown mean and unknown variance. The statistic describing one additional
/// observation follows a Student's t distribution with n - 1 degrees of
/// freedom, scaled by sqrt(1 + 1/n) (prediction interval).
///
/// See: https://en.wikipedia.org/wiki/Prediction_interval#Unknown_mean,_unknown_variance
///
/// # Arguments
///
/// * `sample` - The value for which we want the p-value.
/// * `population` - Values describing the null hypothesis for `sample`.
///
/// # Returns
///
/// The lower-tail probability, in [0, 1]. A sample equal to the population
/// mean gets 0.5; samples far below the mean approach 0.
pub fn compute_t_student_p_value(sample: f64, population: &[f64]) -> Result<f64> {
    let n = population.len();
    if n < 2 {
        return Err(RfeError::InsufficientSamples {
            found: n,
            required: 2,
        });
    }

    let n_f = n as f64;
    let mean = population.iter().sum::<f64>() / n_f;
    // population standard deviation (ddof = 0)
    let std = (population.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n_f).sqrt();

    if std == 0.0 {
        return Ok(if sample == mean {
            0.5
        } else if sample > mean {
            1.0
        } else {
            0.0
        });
    }

    let t = (sample - mean) / (std * (1.0 + 1.0 / n_f).sqrt());
    let dist = StudentsT::new(0.0, 1.0, n_f - 1.0)
        .map_err(|e| RfeError::InvalidInput(format!("t distribution: {}", e)))?;
    Ok(dist.cdf(t))
}
