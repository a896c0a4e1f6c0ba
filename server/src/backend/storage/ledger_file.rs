//! Reading the delimited ledger file that feeds each report run.

use std::path::{Path, PathBuf};

use tracing::debug;

#[derive(Debug, thiserror::Error)]
#[error("unable to parse csv file {}: {source}", .path.display())]
pub struct LedgerError {
    pub path: PathBuf,
    #[source]
    pub source: csv::Error,
}

/// Read every data row of the ledger file as raw text fields.
///
/// The first row is a header and is discarded. Every row must have the same
/// number of fields as the header.
pub fn read_ledger_records(path: &Path) -> Result<Vec<Vec<String>>, LedgerError> {
    let wrap = |source: csv::Error| LedgerError {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(wrap)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(wrap)?;
        records.push(record.iter().map(str::to_string).collect());
    }

    debug!(path = %path.display(), rows = records.len(), "Read ledger file");
    Ok(records)
}
