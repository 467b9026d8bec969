use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use omigami_selection::config::SelectionConfig;
use omigami_selection::data_handling::InputData;
use omigami_selection::feature_selector::FeatureSelector;
use omigami_selection::io::read_dataset_csv;
use omigami_selection::permutation_test::{PermutationTest, PermutationTestResults};
use omigami_selection::report::html::render_report;
use omigami_selection::results::{FeatureSelectionResults, Selection};

use crate::input::RunConfig;
use crate::util::write_output_file;

/// What `omigami select` writes to its output file.
#[derive(Debug, Serialize)]
pub struct SelectionOutput<'a> {
    pub config: &'a SelectionConfig,
    pub selected_feature_names: Selection<Vec<String>>,
    pub results: &'a FeatureSelectionResults,
}

/// What `omigami permute` writes to its output file.
#[derive(Debug, Serialize)]
pub struct PermutationOutput<'a> {
    pub config: &'a SelectionConfig,
    pub selected_feature_names: Selection<Vec<String>>,
    pub results: &'a PermutationTestResults,
}

pub fn load_data(config: &RunConfig) -> Result<InputData> {
    let data = read_dataset_csv(&config.data, &config.reader_config())?;
    log::info!(
        "Loaded {} samples and {} features from {}",
        data.n_samples(),
        data.n_features(),
        config.data.display()
    );
    Ok(data)
}

/// Run the feature selection and write the JSON result (and the HTML report
/// when one was requested).
pub fn run_selection(config: &RunConfig) -> Result<FeatureSelectionResults> {
    let data = load_data(config)?;
    let selector = FeatureSelector::new(config.selection.clone())?;
    let results = selector.fit(&data)?;

    let output = SelectionOutput {
        config: &config.selection,
        selected_feature_names: results.feature_names(&data),
        results: &results,
    };
    write_json(&output, &config.output_file)?;

    if let Some(report_file) = &config.report_file {
        let html = render_report(&results, &data, &config.selection);
        write_output_file(report_file, html.as_bytes()).context("Failed to write report")?;
        log::info!("Report written to {}", report_file.display());
    }

    Ok(results)
}

/// Run the permutation test and write its JSON result.
pub fn run_permutation(config: &RunConfig, n_permutations: usize) -> Result<PermutationTestResults> {
    let data = load_data(config)?;
    let selector = FeatureSelector::new(config.selection.clone())?;
    let results = PermutationTest::new(&selector).run(&data, n_permutations)?;

    let output = PermutationOutput {
        config: &config.selection,
        selected_feature_names: results.selection.feature_names(&data),
        results: &results,
    };
    write_json(&output, &config.output_file)?;

    if let Some(report_file) = &config.report_file {
        let html = render_report(&results.selection, &data, &config.selection);
        write_output_file(report_file, html.as_bytes()).context("Failed to write report")?;
    }

    Ok(results)
}

pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("Failed to serialize results")?;
    write_output_file(path, &bytes).context("Failed to write results")?;
    log::info!("Results written to {}", path.display());
    Ok(())
}
