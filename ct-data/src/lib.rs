//! Loading [`TaxComputationInput`](ct_core::TaxComputationInput) records
//! from files.
//!
//! | Format | Records      | Adjustment lists | Module             |
//! |--------|--------------|------------------|--------------------|
//! | TOML   | one per file | yes              | [`toml_loader`]    |
//! | CSV    | one per row  | no               | [`csv_loader`]     |

pub mod csv_loader;
pub mod toml_loader;

use std::path::{Path, PathBuf};

use ct_core::{InputError, TaxComputationInput};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while reading input records.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A record parsed but failed input checks. `row` is 1-based for CSV
    /// (header excluded) and always 1 for TOML.
    #[error("record {row}: {source}")]
    InvalidRecord {
        row: usize,
        #[source]
        source: InputError,
    },

    #[error("unsupported input file '{0}' (expected .toml or .csv)")]
    UnsupportedFormat(PathBuf),
}

/// Reads every record in `path`, choosing the format by file extension.
///
/// # Errors
///
/// [`LoadError::UnsupportedFormat`] for other extensions, otherwise as the
/// format-specific loader.
pub fn load_path(path: &Path) -> Result<Vec<TaxComputationInput>, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let records = match extension.as_deref() {
        Some("toml") => vec![toml_loader::load_from_file(path)?],
        Some("csv") => csv_loader::load_from_file(path)?,
        _ => return Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    };

    debug!(path = %path.display(), records = records.len(), "loaded input records");
    Ok(records)
}

pub(crate) fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn checked(
    record: TaxComputationInput,
    row: usize,
) -> Result<TaxComputationInput, LoadError> {
    record
        .check()
        .map_err(|source| LoadError::InvalidRecord { row, source })?;
    Ok(record)
}
