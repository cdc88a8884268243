//! Ingest adapters that turn the mesh's raw storage into flat [`Reading`]s.
//!
//! Two sources are supported:
//! - the realtime database's nested device → timestamp → record JSON tree,
//! - the transformed 24 h CSV export used by the heatmap view.
//!
//! Numeric fields that are missing or unparsable are coerced to `0.0` here,
//! so the analytics core only ever sees finite numbers.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info};

use crate::{Reading, SensorObservation, SENSOR_SITES};

/// Number of fields in a transformed CSV row, including the leading index.
const CSV_FIELDS: usize = 8;

// ---

/// Fetch the raw device tree from the realtime database.
pub async fn fetch_device_tree(client: &reqwest::Client, base_url: &str) -> Result<Value> {
    // ---
    let url = format!("{}/NEW_BOARDS.json", base_url.trim_end_matches('/'));
    debug!("Fetching device tree from: {}", url);

    let tree = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()
        .with_context(|| format!("{url} returned an error status"))?
        .json::<Value>()
        .await
        .with_context(|| format!("{url} returned invalid JSON"))?;

    Ok(tree)
}

/// Count every timestamp entry across all devices, before any filtering.
pub fn count_raw_readings(tree: &Value) -> usize {
    // ---
    tree.as_object()
        .map(|devices| {
            devices
                .values()
                .filter_map(Value::as_object)
                .map(|entries| entries.len())
                .sum()
        })
        .unwrap_or(0)
}

/// Flatten a device → timestamp → record tree into readings.
///
/// Timestamp keys look like `18-11-2025_06-00-37`; the part before `_` is the
/// date and the time is bucketed to the minute (`06-00-00`). Entries whose key
/// or body does not have that shape are skipped. Devices and timestamps are
/// visited in key order.
pub fn normalize_device_tree(tree: &Value) -> Vec<Reading> {
    // ---
    let Some(devices) = tree.as_object() else {
        return Vec::new();
    };

    let mut readings = Vec::new();
    for (device_key, entries) in devices {
        let Some(entries) = entries.as_object() else {
            continue;
        };

        for (timestamp, record) in entries {
            if !record.is_object() {
                continue;
            }
            let Some((date, time)) = split_timestamp(timestamp) else {
                debug!("Skipping {}/{}: unrecognised timestamp", device_key, timestamp);
                continue;
            };

            let device_id = record
                .get("device_id")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .unwrap_or(device_key.as_str());

            readings.push(Reading::new(
                date,
                time,
                device_id,
                coerce_number(record.get("bmp_temp_c")),
                coerce_number(record.get("humidity_pct")),
                coerce_number(record.get("pressure_hpa")),
            ));
        }
    }

    readings
}

/// Split `DD-MM-YYYY_HH-MM-SS` into the date and the minute bucket `HH-MM-00`.
fn split_timestamp(key: &str) -> Option<(&str, String)> {
    // ---
    let (date, time) = key.split_once('_')?;
    let mut parts = time.split('-');
    let (hh, mm) = (parts.next()?, parts.next()?);

    if date.is_empty() || hh.is_empty() || mm.is_empty() {
        return None;
    }
    Some((date, format!("{hh}-{mm}-00")))
}

/// A JSON number or numeric string as a finite `f64`, otherwise `0.0`.
fn coerce_number(value: Option<&Value>) -> f64 {
    // ---
    match value {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Some(Value::String(s)) => coerce_str(s),
        _ => 0.0,
    }
}

/// Longest leading decimal number of `field`, so `"24.5 C"` reads as 24.5.
/// Words such as `NaN` or `Infinity` are not numbers here.
fn coerce_str(field: &str) -> f64 {
    // ---
    let field = field.trim_start();
    let candidate = field
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .map_or(field, |end| &field[..end]);

    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

// ---

/// Keep only readings whose (date, time) slice has all three sensors.
pub fn filter_complete_timestamps(readings: &[Reading]) -> Vec<Reading> {
    // ---
    let mut slices: HashMap<(&str, &str), HashSet<&str>> = HashMap::new();
    for r in readings {
        slices
            .entry((r.date.as_str(), r.time.as_str()))
            .or_default()
            .insert(r.device_id.as_str());
    }

    let complete: HashSet<(&str, &str)> = slices
        .into_iter()
        .filter(|(_, devices)| SENSOR_SITES.iter().all(|s| devices.contains(s.device_id)))
        .map(|(key, _)| key)
        .collect();

    readings
        .iter()
        .filter(|r| complete.contains(&(r.date.as_str(), r.time.as_str())))
        .cloned()
        .collect()
}

/// Evenly strided sample of at most `max_rows` readings.
pub fn sample_readings(readings: &[Reading], max_rows: usize) -> Vec<Reading> {
    // ---
    if readings.len() <= max_rows {
        return readings.to_vec();
    }
    if max_rows == 0 {
        return Vec::new();
    }

    let step = readings.len() / max_rows;
    readings.iter().step_by(step).take(max_rows).cloned().collect()
}

/// Sorted distinct time-buckets present in `readings`.
pub fn unique_times(readings: &[Reading]) -> Vec<String> {
    // ---
    readings
        .iter()
        .map(|r| r.time.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// The three sensor observations for one time-slice.
///
/// Each fixed site takes the temperature of its first reading at `time`
/// (and `date`, when given). Returns `None` if any site has no reading.
pub fn time_slice(
    readings: &[Reading],
    date: Option<&str>,
    time: &str,
) -> Option<[SensorObservation; 3]> {
    // ---
    let mut observations = Vec::with_capacity(SENSOR_SITES.len());
    for site in &SENSOR_SITES {
        let reading = readings.iter().find(|r| {
            r.time == time
                && r.device_id == site.device_id
                && date.map_or(true, |d| r.date == d)
        })?;
        observations.push(SensorObservation::at_site(site, reading.temperature_c));
    }

    observations.try_into().ok()
}

// ---

/// Parse the transformed CSV export.
///
/// Expected header: `,date,time,device_id,bmp_temp_c,humidity_pct,pressure_hpa,heat_index`.
/// Rows with fewer than eight fields are skipped; unparsable numbers become `0.0`.
pub fn parse_csv<R: io::Read>(source: R) -> Result<Vec<Reading>> {
    // ---
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut readings = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.with_context(|| format!("CSV parse error on line {line}"))?;

        if record.len() < CSV_FIELDS {
            debug!("Skipping CSV line {}: {} fields", line, record.len());
            continue;
        }

        readings.push(Reading {
            date: record[1].to_string(),
            time: record[2].to_string(),
            device_id: record[3].to_string(),
            temperature_c: coerce_str(&record[4]),
            humidity_pct: coerce_str(&record[5]),
            pressure_hpa: coerce_str(&record[6]),
            heat_index: coerce_str(&record[7]),
        });
    }

    Ok(readings)
}

/// Load readings from a CSV export on disk.
pub fn load_csv(path: &Path) -> Result<Vec<Reading>> {
    // ---
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV '{}'", path.display()))?;
    let readings = parse_csv(file)?;

    info!("Loaded {} readings from {}", readings.len(), path.display());
    Ok(readings)
}
