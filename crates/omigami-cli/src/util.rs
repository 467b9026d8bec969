use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Extensions `read_dataset_csv` knows a delimiter for.
pub const DATASET_EXTENSIONS: [&str; 3] = ["csv", "tsv", "tab"];

/// Accept only existing regular files with a dataset extension.
pub fn validate_dataset_file(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    if !DATASET_EXTENSIONS.contains(&ext.as_str()) {
        anyhow::bail!(
            "Dataset must have one of the extensions {:?}: {}",
            DATASET_EXTENSIONS,
            path.display()
        );
    }
    if !path.is_file() {
        anyhow::bail!("Dataset does not exist or is not a file: {}", path.display());
    }
    Ok(())
}

/// Write an output file, creating missing parent directories first.
pub fn write_output_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write: {}", path.display()))
}
