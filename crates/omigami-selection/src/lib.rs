//! omigami-selection: feature selection for classification by recursive
//! feature elimination inside a double (nested) cross-validation.
//!
//! Every outer fold runs its own elimination on inner folds drawn from its
//! training rows, picks a minimal, a mid and a maximal feature set whose
//! scores are not significantly worse than the best one, and scores those
//! sets on its held-out rows. The per-fold outcomes are then averaged into
//! one ranking and one selection.
//!
//! ```no_run
//! use omigami_selection::config::SelectionConfig;
//! use omigami_selection::feature_selector::FeatureSelector;
//! use omigami_selection::io::{read_dataset_csv, DatasetReaderConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let data = read_dataset_csv("data.csv", &DatasetReaderConfig::new("target"))?;
//! let selector = FeatureSelector::new(SelectionConfig::default())?;
//! let results = selector.fit(&data)?;
//! println!("{:?}", results.feature_names(&data).min);
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod data_handling;
pub mod error;
pub mod executor;
pub mod feature_evaluator;
pub mod feature_selector;
pub mod io;
pub mod metrics;
pub mod models;
pub mod outer_loop;
pub mod post_processing;
pub mod preprocessing;
pub mod recursive_feature_eliminator;
pub mod report;
pub mod results;
pub mod splitter;
pub mod stats;
pub mod utils;

#[cfg(test)]
mod testing;

pub use error::{Result, RfeError};
