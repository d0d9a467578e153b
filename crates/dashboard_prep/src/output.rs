use anyhow::{Context, Result};
use polars::prelude::*;
use std::io::Write;
use std::path::Path;

/// Writes the enriched frame as CSV to `path`.
///
/// The CSV goes to a temporary file in the destination directory first
/// and is renamed over the final path on success, so a failed run never
/// leaves a truncated file that looks valid to the dashboard.
pub fn write_dashboard_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("falha ao criar arquivo temporário em '{}'", dir.display()))?;

    CsvWriter::new(tmp.as_file_mut())
        .include_header(true)
        .finish(df)
        .context("falha ao escrever o CSV do dashboard")?;
    tmp.flush()?;

    tmp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("falha ao gravar '{}'", path.display()))?;

    Ok(())
}
