//! Delimited text reader for labelled feature tables.
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;
use ndarray::{Array1, Array2};

use crate::data_handling::InputData;

/// Which columns of a table hold the target, the groups and the features.
#[derive(Debug, Clone)]
pub struct DatasetReaderConfig {
    /// Column holding the class labels; any string, encoded in sorted order.
    pub target_column: String,
    /// Optional column of sample groups that must not be split apart.
    pub group_column: Option<String>,
    /// Optional sample identifier column, skipped as a feature.
    pub id_column: Option<String>,
    /// Feature columns to load, in order. `None` loads every remaining column.
    pub feature_columns: Option<Vec<String>>,
    /// Columns to skip when auto-selecting features.
    pub ignore_columns: Vec<String>,
    /// Field delimiter. `None` picks tab for `.tsv`/`.tab` files, comma otherwise.
    pub delimiter: Option<u8>,
}

impl Default for DatasetReaderConfig {
    fn default() -> Self {
        Self {
            target_column: "target".to_string(),
            group_column: None,
            id_column: None,
            feature_columns: None,
            ignore_columns: Vec::new(),
            delimiter: None,
        }
    }
}

impl DatasetReaderConfig {
    pub fn new(target_column: impl Into<String>) -> Self {
        Self {
            target_column: target_column.into(),
            ..Default::default()
        }
    }
}

/// Read a delimited table with a header row into an `InputData`.
pub fn read_dataset_csv<P: AsRef<Path>>(path: P, config: &DatasetReaderConfig) -> Result<InputData> {
    let path = path.as_ref();
    let delimiter = config.delimiter.unwrap_or_else(|| default_delimiter(path));
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

    let headers = reader
        .headers()
        .context("Failed to read dataset header row")?
        .clone();

    let target_idx = find_column(&headers, &config.target_column)
        .ok_or_else(|| anyhow!("Missing target column '{}'", config.target_column))?;
    let group_idx = match &config.group_column {
        Some(name) => Some(
            find_column(&headers, name).ok_or_else(|| anyhow!("Missing group column '{}'", name))?,
        ),
        None => None,
    };
    let id_idx = match &config.id_column {
        Some(name) => {
            Some(find_column(&headers, name).ok_or_else(|| anyhow!("Missing id column '{}'", name))?)
        }
        None => None,
    };

    let feature_indices = resolve_feature_indices(&headers, config, target_idx, group_idx, id_idx)?;
    if feature_indices.is_empty() {
        return Err(anyhow!("No feature columns found in {}", path.display()));
    }

    let mut features = Vec::new();
    let mut labels = Vec::new();
    let mut groups = Vec::new();
    let mut group_map: HashMap<String, usize> = HashMap::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

        let label = record
            .get(target_idx)
            .ok_or_else(|| anyhow!("Missing target value at row {}", row_idx + 1))?;
        labels.push(label.to_string());

        if let Some(idx) = group_idx {
            let value = record
                .get(idx)
                .ok_or_else(|| anyhow!("Missing group value at row {}", row_idx + 1))?;
            groups.push(map_group_id(value, &mut group_map));
        }

        for &idx in &feature_indices {
            let value = record
                .get(idx)
                .ok_or_else(|| anyhow!("Missing feature value at row {}", row_idx + 1))?;
            let parsed = value.parse::<f64>().with_context(|| {
                format!(
                    "Invalid feature '{}' at row {}",
                    headers.get(idx).unwrap_or(""),
                    row_idx + 1
                )
            })?;
            features.push(parsed);
        }
    }

    let class_names: Vec<String> = labels
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let encoded: Vec<usize> = labels
        .iter()
        .map(|l| class_names.binary_search(l).unwrap_or_default())
        .collect();

    let n_samples = encoded.len();
    let n_features = feature_indices.len();
    let x = Array2::from_shape_vec((n_samples, n_features), features)
        .context("Failed to build feature matrix")?;
    let feature_names = feature_indices
        .iter()
        .map(|&idx| headers.get(idx).unwrap_or("").to_string())
        .collect();

    let mut input = InputData::new(x, Array1::from_vec(encoded))?
        .with_feature_names(feature_names)?
        .with_class_names(class_names);
    if group_idx.is_some() {
        input = input.with_groups(groups)?;
    }

    log::debug!(
        "Read {} samples with {} features from {}",
        n_samples,
        n_features,
        path.display()
    );
    Ok(input)
}

fn default_delimiter(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") => b'\t',
        _ => b',',
    }
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
}

fn resolve_feature_indices(
    headers: &StringRecord,
    config: &DatasetReaderConfig,
    target_idx: usize,
    group_idx: Option<usize>,
    id_idx: Option<usize>,
) -> Result<Vec<usize>> {
    if let Some(names) = &config.feature_columns {
        return names
            .iter()
            .map(|name| {
                find_column(headers, name).ok_or_else(|| anyhow!("Missing feature column '{}'", name))
            })
            .collect();
    }

    let ignore: HashSet<String> = config
        .ignore_columns
        .iter()
        .map(|name| name.to_ascii_lowercase())
        .collect();

    Ok(headers
        .iter()
        .enumerate()
        .filter(|&(idx, header)| {
            idx != target_idx
                && Some(idx) != group_idx
                && Some(idx) != id_idx
                && !ignore.contains(&header.to_ascii_lowercase())
        })
        .map(|(idx, _)| idx)
        .collect())
}

fn map_group_id(value: &str, map: &mut HashMap<String, usize>) -> usize {
    let next_id = map.len();
    *map.entry(value.to_string()).or_insert(next_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_labels_groups_and_features() {
        let file = write_file(
            ".csv",
            "id,a,target,b,patient\n\
             s1,1.0,healthy,2.0,p1\n\
             s2,3.5,sick,-1.0,p2\n\
             s3,0.0,healthy,4.0,p1\n",
        );
        let config = DatasetReaderConfig {
            group_column: Some("patient".to_string()),
            id_column: Some("id".to_string()),
            ..DatasetReaderConfig::new("target")
        };
        let data = read_dataset_csv(file.path(), &config).unwrap();

        assert_eq!(data.n_samples(), 3);
        assert_eq!(data.feature_names, vec!["a", "b"]);
        assert_eq!(data.class_names, vec!["healthy", "sick"]);
        assert_eq!(data.y.to_vec(), vec![0, 1, 0]);
        assert_eq!(data.groups, Some(vec![0, 1, 0]));
        assert_eq!(data.x[[1, 0]], 3.5);
        assert_eq!(data.x[[1, 1]], -1.0);
    }

    #[test]
    fn test_tsv_extension_switches_delimiter() {
        let file = write_file(".tsv", "x\ty\tlabel\n1\t2\t0\n3\t4\t1\n");
        let data = read_dataset_csv(file.path(), &DatasetReaderConfig::new("label")).unwrap();
        assert_eq!(data.n_features(), 2);
        assert_eq!(data.y.to_vec(), vec![0, 1]);
    }

    #[test]
    fn test_reports_bad_values() {
        let file = write_file(".csv", "a,target\nabc,0\n");
        let err = read_dataset_csv(file.path(), &DatasetReaderConfig::new("target")).unwrap_err();
        assert!(err.to_string().contains("Invalid feature 'a' at row 1"));

        let err = read_dataset_csv(file.path(), &DatasetReaderConfig::new("class")).unwrap_err();
        assert!(err.to_string().contains("Missing target column"));
    }
}
