//! Cross-fold aggregation of scores and ranks.
use std::collections::{BTreeMap, BTreeSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Result, RfeError};
use crate::results::FeatureRanks;

/// Average score per number of features over several curves.
///
/// A curve missing a feature count contributes 0 to that count's average.
pub fn average_scores(scores: &[BTreeMap<usize, f64>]) -> BTreeMap<usize, f64> {
    if scores.is_empty() {
        return BTreeMap::new();
    }
    let keys: BTreeSet<usize> = scores.iter().flat_map(|s| s.keys().copied()).collect();
    let n = scores.len() as f64;
    keys.into_iter()
        .map(|k| {
            let total: f64 = scores.iter().map(|s| s.get(&k).copied().unwrap_or(0.0)).sum();
            (k, total / n)
        })
        .collect()
}

/// Rescale scores so that the minimum maps to 0 and the maximum to 1.
pub fn normalize_score(score: &BTreeMap<usize, f64>) -> BTreeMap<usize, f64> {
    let max_s = score.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_s = score.values().copied().fold(f64::INFINITY, f64::min);
    let delta = if max_s != min_s { max_s - min_s } else { 1.0 };
    score
        .iter()
        .map(|(&k, &v)| (k, (v - min_s) / delta))
        .collect()
}

/// Mean rank of every feature across `ranks`.
///
/// A feature absent from one input counts as ranked `n_feats` there: it was
/// eliminated, so it is the least important feature of that fold.
pub fn average_ranks<'a, I>(ranks: I) -> Result<FeatureRanks>
where
    I: IntoIterator<Item = &'a FeatureRanks>,
{
    let ranks: Vec<&FeatureRanks> = ranks.into_iter().collect();
    let n_feats: BTreeSet<usize> = ranks.iter().map(|r| r.n_feats()).collect();
    if n_feats.len() > 1 {
        return Err(RfeError::InconsistentFeatureSpace(format!(
            "feature counts {:?}",
            n_feats
        )));
    }
    let n_feats = n_feats.into_iter().next().ok_or_else(|| {
        RfeError::InconsistentFeatureSpace("no ranks to average".to_string())
    })?;

    let n = ranks.len() as f64;
    let features: Vec<usize> = (0..n_feats).collect();
    let avg_ranks: Vec<f64> = features
        .iter()
        .map(|&f| ranks.iter().map(|r| r.get(f)).sum::<f64>() / n)
        .collect();
    FeatureRanks::new(&features, &avg_ranks, n_feats)
}

/// The `n_to_keep` features with the lowest rank.
///
/// If fewer features are ranked, the remainder is drawn from the unranked
/// features in a uniformly shuffled order, so the padding favours none of them.
pub fn get_best_n_features<R: Rng + ?Sized>(
    ranks: &FeatureRanks,
    n_to_keep: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if n_to_keep > ranks.n_feats() {
        return Err(RfeError::TooManyFeatures {
            requested: n_to_keep,
            available: ranks.n_feats(),
        });
    }

    let mut sorted: Vec<(usize, f64)> = ranks.data().iter().map(|(&f, &r)| (f, r)).collect();
    // stable: equal ranks keep ascending feature order
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
    let mut feats: Vec<usize> = sorted.into_iter().take(n_to_keep).map(|(f, _)| f).collect();

    if feats.len() < n_to_keep {
        let mut all_feats: Vec<usize> = (0..ranks.n_feats()).collect();
        all_feats.shuffle(rng);
        for f in all_feats {
            if feats.len() == n_to_keep {
                break;
            }
            if !ranks.data().contains_key(&f) {
                feats.push(f);
            }
        }
    }

    Ok(feats)
}
