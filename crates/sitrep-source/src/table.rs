//! Wide-format source tables.

use thiserror::Error;

/// Why a response body could not be read as a wide table.
#[derive(Debug, Error)]
pub enum ParseTableError {
  #[error("body has no header row")]
  Empty,

  #[error(transparent)]
  Csv(#[from] csv::Error),
}

/// A parsed CSV table: a header row plus one data row per subregion.
///
/// Column meaning is not interpreted here — identity and date columns are
/// discovered by [`crate::reshape::reshape`].
#[derive(Debug, Clone)]
pub struct WideTable {
  pub headers: Vec<String>,
  pub rows:    Vec<Vec<String>>,
}

impl WideTable {
  /// Parse CSV text. Ragged rows are tolerated (the reshaper treats short
  /// rows as missing cells); a body with no header row is not tabular data.
  pub fn parse(text: &str) -> Result<Self, ParseTableError> {
    let mut reader = csv::ReaderBuilder::new()
      .flexible(true)
      .from_reader(text.as_bytes());

    let headers: Vec<String> =
      reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
      return Err(ParseTableError::Empty);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
      rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(Self { headers, rows })
  }
}
