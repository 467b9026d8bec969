use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

use omigami_selection::config::{ExecutionMode, ModelType, SelectionConfig};
use omigami_selection::io::DatasetReaderConfig;

use crate::util::validate_dataset_file;

/// Everything one `omigami` invocation needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub data: PathBuf,
    pub target: String,
    pub group_column: Option<String>,
    pub id_column: Option<String>,
    pub output_file: PathBuf,
    pub report_file: Option<PathBuf>,
    pub selection: SelectionConfig,
}

impl RunConfig {
    /// Build from parsed arguments: the optional JSON config file provides
    /// the selection parameters, flags override single fields.
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let data: &PathBuf = matches
            .get_one("data")
            .context("Missing dataset path")?;
        validate_dataset_file(data)?;

        let mut selection = match matches.get_one::<PathBuf>("config") {
            Some(path) => load_selection_config(path)?,
            None => {
                let defaults = SelectionConfig::default();
                eprintln!("[omigami] No config file provided; using defaults.");
                eprintln!(
                    "{}",
                    serde_json::to_string_pretty(&defaults).unwrap_or_default()
                );
                defaults
            }
        };
        apply_overrides(&mut selection, matches)?;

        let target: &String = matches
            .get_one("target")
            .context("Missing target column")?;

        Ok(RunConfig {
            data: data.clone(),
            target: target.clone(),
            group_column: matches.get_one::<String>("group").cloned(),
            id_column: matches.get_one::<String>("id").cloned(),
            output_file: matches
                .get_one::<PathBuf>("output_file")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("omigami_results.json")),
            report_file: matches.get_one::<PathBuf>("report").cloned(),
            selection,
        })
    }

    pub fn reader_config(&self) -> DatasetReaderConfig {
        DatasetReaderConfig {
            group_column: self.group_column.clone(),
            id_column: self.id_column.clone(),
            ..DatasetReaderConfig::new(self.target.clone())
        }
    }
}

/// Load a `SelectionConfig` from JSON. Missing fields take their defaults.
pub fn load_selection_config<P: AsRef<Path>>(path: P) -> Result<SelectionConfig> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: SelectionConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

fn apply_overrides(config: &mut SelectionConfig, matches: &ArgMatches) -> Result<()> {
    if let Some(model) = matches.get_one::<String>("model") {
        config.model.model_type = model.parse::<ModelType>().map_err(anyhow::Error::msg)?;
    }
    if let Some(metric) = matches.get_one::<String>("metric") {
        config.metric = metric.clone();
    }
    if let Some(&n_outer) = matches.get_one::<usize>("n_outer") {
        config.n_outer = n_outer;
    }
    if let Some(&n_inner) = matches.get_one::<usize>("n_inner") {
        config.n_inner = n_inner;
    }
    if let Some(&repetitions) = matches.get_one::<usize>("repetitions") {
        config.n_repetitions = repetitions;
    }
    if let Some(&dropout_rate) = matches.get_one::<f64>("dropout_rate") {
        config.dropout_rate = dropout_rate;
    }
    if let Some(&robust_minimum) = matches.get_one::<f64>("robust_minimum") {
        config.robust_minimum = robust_minimum;
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config.random_state = seed;
    }
    match matches.get_one::<usize>("threads") {
        Some(&n) if n > 1 => config.execution = ExecutionMode::Parallel { n_threads: n },
        Some(_) => config.execution = ExecutionMode::Sequential,
        None => {}
    }
    Ok(())
}
