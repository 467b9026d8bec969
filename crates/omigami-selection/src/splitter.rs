//! Reproducible outer/inner k-fold partitions.
//!
//! The outer test sets partition every row exactly once. Each outer train set
//! is partitioned again into `n_inner` inner folds, so inner splits never see
//! outer test rows. When the dataset carries group ids, whole groups are
//! assigned to folds instead of single rows.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data_handling::InputData;
use crate::error::{Result, RfeError};

/// Row indices of one train/test split, both sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPlan {
    outer: Vec<Split>,
    inner: Vec<Vec<Split>>,
}

impl SplitPlan {
    /// Build the plan for `input`. Identical inputs give identical plans.
    pub fn build(input: &InputData, n_outer: usize, n_inner: usize, seed: u64) -> Result<Self> {
        Self::build_from_parts(
            input.n_samples(),
            input.groups.as_deref(),
            n_outer,
            n_inner,
            seed,
        )
    }

    fn build_from_parts(
        n_samples: usize,
        groups: Option<&[usize]>,
        n_outer: usize,
        n_inner: usize,
        seed: u64,
    ) -> Result<Self> {
        if n_outer < 2 || n_inner < 2 {
            return Err(RfeError::InvalidSplit(format!(
                "n_outer and n_inner must be at least 2, got {} and {}",
                n_outer, n_inner
            )));
        }

        if let Some(groups) = groups {
            if groups.len() != n_samples {
                return Err(RfeError::InvalidInput(format!(
                    "{} group ids for {} samples",
                    groups.len(),
                    n_samples
                )));
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let rows: Vec<usize> = (0..n_samples).collect();
        let outer = kfold(&rows, groups, n_outer, &mut rng)
            .map_err(|reason| RfeError::InvalidSplit(format!("outer loop: {}", reason)))?;

        let mut inner = Vec::with_capacity(n_outer);
        for (i, split) in outer.iter().enumerate() {
            let folds = kfold(&split.train, groups, n_inner, &mut rng).map_err(|reason| {
                RfeError::InvalidSplit(format!("inner loop of outer fold {}: {}", i, reason))
            })?;
            inner.push(folds);
        }

        Ok(SplitPlan { outer, inner })
    }

    pub fn n_outer(&self) -> usize {
        self.outer.len()
    }

    pub fn n_inner(&self) -> usize {
        self.inner.first().map_or(0, |folds| folds.len())
    }

    pub fn outer_splits(&self) -> &[Split] {
        &self.outer
    }

    pub fn inner_splits(&self, outer_idx: usize) -> Result<&[Split]> {
        self.inner
            .get(outer_idx)
            .map(|folds| folds.as_slice())
            .ok_or(RfeError::IndexOutOfRange {
                what: "outer fold",
                index: outer_idx,
                len: self.outer.len(),
            })
    }

    /// The outer split when `inner_idx` is `None`, else the inner split nested in it.
    pub fn get_split(&self, outer_idx: usize, inner_idx: Option<usize>) -> Result<&Split> {
        let outer = self.outer.get(outer_idx).ok_or(RfeError::IndexOutOfRange {
            what: "outer fold",
            index: outer_idx,
            len: self.outer.len(),
        })?;
        match inner_idx {
            None => Ok(outer),
            Some(inner_idx) => {
                let folds = &self.inner[outer_idx];
                folds.get(inner_idx).ok_or(RfeError::IndexOutOfRange {
                    what: "inner fold",
                    index: inner_idx,
                    len: folds.len(),
                })
            }
        }
    }
}

/// Owns the split plan of one run and rebuilds it on request.
#[derive(Debug, Clone)]
pub struct DataSplitter {
    n_outer: usize,
    n_inner: usize,
    random_state: u64,
    n_samples: usize,
    groups: Option<Vec<usize>>,
    plan: SplitPlan,
}

impl DataSplitter {
    pub fn fit(input: &InputData, n_outer: usize, n_inner: usize, random_state: u64) -> Result<Self> {
        let plan = SplitPlan::build(input, n_outer, n_inner, random_state)?;
        Ok(DataSplitter {
            n_outer,
            n_inner,
            random_state,
            n_samples: input.n_samples(),
            groups: input.groups.clone(),
            plan,
        })
    }

    /// Replace the plan with one drawn from a seed derived from the current one.
    pub fn refresh(&mut self) -> Result<()> {
        let seed = derive_seed(self.random_state);
        self.plan = SplitPlan::build_from_parts(
            self.n_samples,
            self.groups.as_deref(),
            self.n_outer,
            self.n_inner,
            seed,
        )?;
        self.random_state = seed;
        log::debug!("Refreshed data splits with seed {}", seed);
        Ok(())
    }

    pub fn get_split(&self, outer_idx: usize, inner_idx: Option<usize>) -> Result<&Split> {
        self.plan.get_split(outer_idx, inner_idx)
    }

    pub fn plan(&self) -> &SplitPlan {
        &self.plan
    }

    pub fn random_state(&self) -> u64 {
        self.random_state
    }

    pub fn n_outer(&self) -> usize {
        self.n_outer
    }

    pub fn n_inner(&self) -> usize {
        self.n_inner
    }
}

pub(crate) fn derive_seed(seed: u64) -> u64 {
    StdRng::seed_from_u64(seed).gen()
}

/// Shuffle the rows (or their groups) and cut them into `k` folds whose sizes
/// differ by at most one unit.
fn kfold(
    rows: &[usize],
    groups: Option<&[usize]>,
    k: usize,
    rng: &mut StdRng,
) -> std::result::Result<Vec<Split>, String> {
    let mut units: Vec<Vec<usize>> = match groups {
        None => rows.iter().map(|&r| vec![r]).collect(),
        Some(groups) => {
            let mut ids: Vec<usize> = rows.iter().map(|&r| groups[r]).collect();
            ids.sort_unstable();
            ids.dedup();
            ids.iter()
                .map(|&g| rows.iter().copied().filter(|&r| groups[r] == g).collect())
                .collect()
        }
    };

    if units.len() < k {
        let what = if groups.is_some() { "groups" } else { "samples" };
        return Err(format!(
            "cannot make {} folds out of {} {}",
            k,
            units.len(),
            what
        ));
    }

    units.shuffle(rng);

    let base = units.len() / k;
    let extra = units.len() % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = base + usize::from(fold < extra);
        let mut test: Vec<usize> = units[start..start + size].iter().flatten().copied().collect();
        test.sort_unstable();
        start += size;
        folds.push(test);
    }

    Ok(folds
        .into_iter()
        .map(|test| {
            // rows arrive sorted, so train stays sorted
            let train = rows
                .iter()
                .copied()
                .filter(|r| test.binary_search(r).is_err())
                .collect();
            Split { train, test }
        })
        .collect())
}
