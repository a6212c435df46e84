//! Merge and aggregation: three long-format category tables in, one
//! [`DatasetBundle`] out.
//!
//! Confirmed is the anchor table. Deaths and recovered are left-joined onto
//! it by (subregion, country, date); rows they do not cover default to zero.
//! An entirely absent recovered series is a known degraded mode, not an
//! error — every row gets `total_recovered = 0`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::{
  Result,
  error::Error,
  model::{
    CountryAggregate, DatasetBundle, GlobalAggregate, LongRecord,
    MergedRecord,
  },
};

/// Join key for the category tables.
type SeriesKey = (String, String, NaiveDate);

fn series_key(record: &LongRecord) -> SeriesKey {
  (
    record.country.clone(),
    record.subregion.trim().to_string(),
    record.date,
  )
}

fn index_values(records: &[LongRecord]) -> HashMap<SeriesKey, i64> {
  records
    .iter()
    .map(|r| (series_key(r), r.value))
    .collect()
}

/// Merge the three category tables into a [`DatasetBundle`].
///
/// Deterministic: fixed inputs produce an identical bundle regardless of
/// input row order. Fails with [`Error::EmptyDataset`] when the aggregates
/// come out empty, which indicates an upstream schema break rather than a
/// transient condition.
pub fn merge(
  confirmed: &[LongRecord],
  deaths: &[LongRecord],
  recovered: Option<&[LongRecord]>,
) -> Result<DatasetBundle> {
  let deaths_by_key = index_values(deaths);
  let recovered_by_key = recovered.map(index_values).unwrap_or_default();

  let mut raw: Vec<MergedRecord> = confirmed
    .iter()
    .map(|c| {
      // Subregions normalise to a trimmed string so "no subregion" is one
      // consistent grouping key.
      let subregion = c.subregion.trim().to_string();
      let key = (c.country.clone(), subregion.clone(), c.date);
      MergedRecord {
        subregion,
        country:         c.country.clone(),
        latitude:        c.latitude,
        longitude:       c.longitude,
        date:            c.date,
        total_cases:     c.value,
        total_deaths:    deaths_by_key.get(&key).copied().unwrap_or(0),
        total_recovered: recovered_by_key.get(&key).copied().unwrap_or(0),
        new_cases:       0,
        new_deaths:      0,
      }
    })
    .collect();

  // Deltas are order-dependent: sort before differencing.
  raw.sort_by(|a, b| {
    (a.country.as_str(), a.subregion.as_str(), a.date)
      .cmp(&(b.country.as_str(), b.subregion.as_str(), b.date))
  });

  // First difference within each (country, subregion) series. Downward
  // source corrections clip to zero; daily counts never go negative.
  for i in 1..raw.len() {
    let (before, after) = raw.split_at_mut(i);
    let prev = &before[i - 1];
    let cur = &mut after[0];
    if prev.country == cur.country && prev.subregion == cur.subregion {
      cur.new_cases = (cur.total_cases - prev.total_cases).max(0);
      cur.new_deaths = (cur.total_deaths - prev.total_deaths).max(0);
    }
  }

  // BTreeMap keys give the aggregates a deterministic sorted order.
  let mut by_country: BTreeMap<(String, NaiveDate), CountryAggregate> =
    BTreeMap::new();
  let mut global: BTreeMap<NaiveDate, GlobalAggregate> = BTreeMap::new();
  let mut countries: BTreeSet<String> = BTreeSet::new();

  for r in &raw {
    countries.insert(r.country.clone());

    let c = by_country
      .entry((r.country.clone(), r.date))
      .or_insert_with(|| CountryAggregate {
        country:         r.country.clone(),
        date:            r.date,
        total_cases:     0,
        total_deaths:    0,
        total_recovered: 0,
        new_cases:       0,
        new_deaths:      0,
      });
    c.total_cases += r.total_cases;
    c.total_deaths += r.total_deaths;
    c.total_recovered += r.total_recovered;
    c.new_cases += r.new_cases;
    c.new_deaths += r.new_deaths;

    let g = global.entry(r.date).or_insert_with(|| GlobalAggregate {
      date:            r.date,
      total_cases:     0,
      total_deaths:    0,
      total_recovered: 0,
      new_cases:       0,
      new_deaths:      0,
    });
    g.total_cases += r.total_cases;
    g.total_deaths += r.total_deaths;
    g.total_recovered += r.total_recovered;
    g.new_cases += r.new_cases;
    g.new_deaths += r.new_deaths;
  }

  let by_country: Vec<CountryAggregate> = by_country.into_values().collect();
  let global: Vec<GlobalAggregate> = global.into_values().collect();

  // An empty aggregate means the upstream schema broke; stop the pipeline
  // rather than render a silently empty dashboard.
  if global.is_empty() || by_country.is_empty() {
    return Err(Error::EmptyDataset);
  }

  Ok(DatasetBundle {
    raw,
    by_country,
    global,
    countries: countries.into_iter().collect(),
  })
}
