//! Pure query functions over bundle tables.
//!
//! Everything here is generic over the row-access traits in
//! [`crate::model`], so the same filters work on raw per-subregion rows,
//! country aggregates, and global aggregates.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::{
  Result,
  error::Error,
  model::{CountryRow, DatedRow, Metric, MetricRow},
};

// ─── Filters ─────────────────────────────────────────────────────────────────

/// Rows with `date` within `[start, end]` inclusive.
///
/// Fails with [`Error::InvalidRange`] when `start > end`. Bounds outside the
/// data's actual span clip to the nearest available date rather than
/// erroring.
pub fn filter_by_date_range<T: DatedRow + Clone>(
  rows: &[T],
  start: NaiveDate,
  end: NaiveDate,
) -> Result<Vec<T>> {
  if start > end {
    return Err(Error::InvalidRange { start, end });
  }
  let span = rows
    .iter()
    .map(DatedRow::date)
    .fold(None::<(NaiveDate, NaiveDate)>, |span, d| match span {
      None => Some((d, d)),
      Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
    });
  let Some((lo, hi)) = span else {
    return Ok(Vec::new());
  };
  let start = start.clamp(lo, hi);
  let end = end.clamp(lo, hi);
  Ok(
    rows
      .iter()
      .filter(|r| {
        let d = r.date();
        d >= start && d <= end
      })
      .cloned()
      .collect(),
  )
}

/// Membership filter on `country`. Unknown names yield no rows for that
/// name; they are not an error.
pub fn filter_by_countries<T: CountryRow + Clone>(
  rows: &[T],
  countries: &[String],
) -> Vec<T> {
  rows
    .iter()
    .filter(|r| countries.iter().any(|c| c == r.country()))
    .cloned()
    .collect()
}

// ─── Derived series ──────────────────────────────────────────────────────────

/// Simple moving average over `window` days.
///
/// Positions with fewer than `window` preceding points average over what is
/// available (partial window), so the output always has the same length as
/// the input. A window of 0 is treated as 1.
pub fn rolling_average(series: &[i64], window: usize) -> Vec<f64> {
  let window = window.max(1);
  series
    .iter()
    .enumerate()
    .map(|(i, _)| {
      let lo = (i + 1).saturating_sub(window);
      let slice = &series[lo..=i];
      slice.iter().sum::<i64>() as f64 / slice.len() as f64
    })
    .collect()
}

/// Percent change against the value `period` positions earlier.
///
/// Defined as 0 when the reference value is 0 or when there is not yet
/// enough history — never a division error.
pub fn growth_rate(series: &[i64], period: usize) -> Vec<f64> {
  series
    .iter()
    .enumerate()
    .map(|(i, &current)| {
      if i < period {
        return 0.0;
      }
      let reference = series[i - period];
      if reference == 0 {
        0.0
      } else {
        (current - reference) as f64 / reference as f64 * 100.0
      }
    })
    .collect()
}

/// Deaths per hundred cases; 0 when there are no cases.
pub fn case_fatality_rate(total_deaths: i64, total_cases: i64) -> f64 {
  if total_cases == 0 {
    0.0
  } else {
    total_deaths as f64 / total_cases as f64 * 100.0
  }
}

// ─── Rankings ────────────────────────────────────────────────────────────────

/// The `n` countries with the largest summed `metric` as of `as_of`
/// (default: the latest date present), with their summed values.
///
/// Ties keep original encounter order — `sort_by` is stable.
pub fn top_n<T>(
  rows: &[T],
  metric: Metric,
  n: usize,
  as_of: Option<NaiveDate>,
) -> Vec<(String, i64)>
where
  T: CountryRow + DatedRow + MetricRow,
{
  let Some(as_of) = as_of.or_else(|| rows.iter().map(DatedRow::date).max())
  else {
    return Vec::new();
  };

  let mut order: Vec<String> = Vec::new();
  let mut totals: HashMap<String, i64> = HashMap::new();
  for r in rows.iter().filter(|r| r.date() == as_of) {
    if !totals.contains_key(r.country()) {
      order.push(r.country().to_string());
    }
    *totals.entry(r.country().to_string()).or_insert(0) += r.metric(metric);
  }

  let mut ranked: Vec<(String, i64)> = order
    .into_iter()
    .map(|country| {
      let total = totals[&country];
      (country, total)
    })
    .collect();
  ranked.sort_by(|a, b| b.1.cmp(&a.1));
  ranked.truncate(n);
  ranked
}
