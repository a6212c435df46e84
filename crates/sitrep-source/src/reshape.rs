//! Wide → long reshaping.
//!
//! Identity columns are located by header name regardless of position;
//! every remaining column is a candidate date column. Headers that do not
//! parse with the source's `M/D/YY` format are dropped (extra unrecognized
//! columns are tolerated), but a table with zero parseable date columns is
//! a schema error rather than a silently empty series.

use chrono::NaiveDate;
use sitrep_core::{
  Error, Result,
  model::{Category, LongRecord},
};
use tracing::debug;

use crate::table::WideTable;

/// Identity column headers as published by the source.
const SUBREGION: &str = "Province/State";
const COUNTRY: &str = "Country/Region";
const LATITUDE: &str = "Lat";
const LONGITUDE: &str = "Long";

/// Column-header date format, e.g. `3/15/20`.
const DATE_FORMAT: &str = "%m/%d/%y";

fn find_column(table: &WideTable, name: &str) -> Result<usize> {
  table
    .headers
    .iter()
    .position(|h| h.trim() == name)
    .ok_or_else(|| Error::Schema(format!("missing identity column {name:?}")))
}

/// Cell values are cumulative counts but must not be assumed clean: empty
/// or malformed cells count as zero, float-formatted counts are truncated.
fn parse_count(cell: Option<&String>) -> i64 {
  let Some(cell) = cell else { return 0 };
  let cell = cell.trim();
  if cell.is_empty() {
    return 0;
  }
  if let Ok(n) = cell.parse::<i64>() {
    return n;
  }
  cell.parse::<f64>().map(|f| f as i64).unwrap_or(0)
}

fn parse_coordinate(cell: Option<&String>) -> f64 {
  cell
    .and_then(|c| c.trim().parse::<f64>().ok())
    .unwrap_or(0.0)
}

/// Melt a wide table into one [`LongRecord`] per (row, date column).
///
/// Output row count = input row count × number of parseable date columns.
/// Pure function; no I/O.
pub fn reshape(
  table: &WideTable,
  category: Category,
) -> Result<Vec<LongRecord>> {
  let subregion_col = find_column(table, SUBREGION)?;
  let country_col = find_column(table, COUNTRY)?;
  let latitude_col = find_column(table, LATITUDE)?;
  let longitude_col = find_column(table, LONGITUDE)?;
  let identity = [subregion_col, country_col, latitude_col, longitude_col];

  let mut date_columns: Vec<(usize, NaiveDate)> = Vec::new();
  for (i, header) in table.headers.iter().enumerate() {
    if identity.contains(&i) {
      continue;
    }
    match NaiveDate::parse_from_str(header.trim(), DATE_FORMAT) {
      Ok(d) => date_columns.push((i, d)),
      Err(_) => debug!(
        category = category.label(),
        header = %header,
        "dropping unparsable column header"
      ),
    }
  }
  if date_columns.is_empty() {
    return Err(Error::Schema(format!(
      "no parseable date columns in {} table",
      category.label()
    )));
  }

  let mut records =
    Vec::with_capacity(table.rows.len() * date_columns.len());
  for row in &table.rows {
    let subregion = row
      .get(subregion_col)
      .map(|s| s.trim().to_string())
      .unwrap_or_default();
    let country = row
      .get(country_col)
      .map(|s| s.trim().to_string())
      .unwrap_or_default();
    let latitude = parse_coordinate(row.get(latitude_col));
    let longitude = parse_coordinate(row.get(longitude_col));

    for &(col, date) in &date_columns {
      records.push(LongRecord {
        subregion: subregion.clone(),
        country: country.clone(),
        latitude,
        longitude,
        date,
        value: parse_count(row.get(col)),
      });
    }
  }
  Ok(records)
}
