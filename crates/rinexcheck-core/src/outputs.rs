use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

use crate::error::Result;

/// `{system}_combined.csv` inside `dir`.
pub fn merged_csv_path(dir: &Path, system: &str) -> PathBuf {
    dir.join(format!("{system}_combined.csv"))
}

/// Writes a merged, differenced table as comma separated text with a header.
pub fn write_merged_csv(df: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    let mut df = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)?;

    info!(path = %path.display(), rows = df.height(), "wrote merged table");
    Ok(())
}
