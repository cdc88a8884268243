//! Data models shared by the analytics core, the ingest adapters and the
//! HTTP routes.
//!
//! Field names on the wire follow the sensor mesh's JSON/CSV column names
//! (`bmp_temp_c`, `humidity_pct`, ...), so a flattened reading round-trips
//! between the device tree, the CSV export and the API unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---

/// Identity and fixed location of one physical sensor board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSite {
    pub device_id: &'static str,
    pub lat: f64,
    pub lng: f64,
}

/// The three boards of the mesh, in polygon order (1 → 2 → 3 → close).
pub const SENSOR_SITES: [SensorSite; 3] = [
    SensorSite {
        device_id: "DEVICE_001",
        lat: 19.12472788735068,
        lng: 72.83437872855019,
    },
    SensorSite {
        device_id: "DEVICE_002",
        lat: 19.124989833718722,
        lng: 72.8363659669012,
    },
    SensorSite {
        device_id: "DEVICE_003",
        lat: 19.122903829356257,
        lng: 72.83612121915581,
    },
];

/// Round to two decimal places, the precision of every reported figure.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Apparent temperature from air temperature (°C) and relative humidity (%).
///
/// `HI = T + 0.33·e − 5.358` with vapour pressure
/// `e = (H/100)·6.112·exp(17.62·T / (243.12 + T))`, rounded to 2 decimals.
pub fn heat_index(temperature_c: f64, humidity_pct: f64) -> f64 {
    // ---
    let vapour_pressure =
        (humidity_pct / 100.0) * 6.112 * ((17.62 * temperature_c) / (243.12 + temperature_c)).exp();

    round2(temperature_c + 0.33 * vapour_pressure - 5.358)
}

/// Minutes since midnight for a time-bucket such as `"06-30-00"` or `"06:30:00"`.
///
/// Only hour and minute are read; seconds are ignored. Returns `None` when
/// either component is missing, not a number, or out of range.
pub fn minutes_since_midnight(time_bucket: &str) -> Option<u32> {
    // ---
    let mut parts = time_bucket.trim().split(['-', ':']);
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = parts.next()?.parse().ok()?;

    (hour < 24 && minute < 60).then_some(hour * 60 + minute)
}

// ---

/// One flattened environmental reading from a single board.
///
/// Immutable once built; duplicates by (date, time, device) are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    // ---
    pub date: String,
    /// Minute bucket, `HH-MM-00`.
    pub time: String,
    pub device_id: String,
    #[serde(rename = "bmp_temp_c")]
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub pressure_hpa: f64,
    pub heat_index: f64,
}

impl Reading {
    /// Build a reading, deriving `heat_index` from temperature and humidity.
    pub fn new(
        date: impl Into<String>,
        time: impl Into<String>,
        device_id: impl Into<String>,
        temperature_c: f64,
        humidity_pct: f64,
        pressure_hpa: f64,
    ) -> Self {
        // ---
        Reading {
            date: date.into(),
            time: time.into(),
            device_id: device_id.into(),
            temperature_c,
            humidity_pct,
            pressure_hpa,
            heat_index: heat_index(temperature_c, humidity_pct),
        }
    }
}

/// A numeric field of [`Reading`] that can be summarised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "bmp_temp_c")]
    Temperature,
    #[serde(rename = "pressure_hpa")]
    Pressure,
    #[serde(rename = "humidity_pct")]
    Humidity,
    #[serde(rename = "heat_index")]
    HeatIndex,
}

impl Metric {
    /// Every tracked metric, in reporting order.
    pub const ALL: [Metric; 4] = [
        Metric::Temperature,
        Metric::Pressure,
        Metric::Humidity,
        Metric::HeatIndex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Temperature => "bmp_temp_c",
            Metric::Pressure => "pressure_hpa",
            Metric::Humidity => "humidity_pct",
            Metric::HeatIndex => "heat_index",
        }
    }

    /// Read this metric off a single reading.
    pub fn value_of(self, reading: &Reading) -> f64 {
        match self {
            Metric::Temperature => reading.temperature_c,
            Metric::Pressure => reading.pressure_hpa,
            Metric::Humidity => reading.humidity_pct,
            Metric::HeatIndex => reading.heat_index,
        }
    }

    /// The metric's values across `readings`, in record order.
    pub fn series(self, readings: &[Reading]) -> impl Iterator<Item = f64> + '_ {
        readings.iter().map(move |r| self.value_of(r))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary statistics for one metric. Numeric fields are rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricStatistic {
    // ---
    pub metric: Metric,
    pub average: f64,
    pub min_value: f64,
    pub max_value: f64,
    /// Time-bucket of the first reading holding the minimum.
    pub time_at_min: String,
    /// Time-bucket of the first reading holding the maximum.
    pub time_at_max: String,
    pub variance: f64,
    pub std_deviation: f64,
}

/// A sensor's position and temperature for one time-slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorObservation {
    // ---
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    #[serde(rename = "temp")]
    pub temperature: f64,
    pub device_id: String,
}

impl SensorObservation {
    /// Observation at a fixed site.
    pub fn at_site(site: &SensorSite, temperature: f64) -> Self {
        SensorObservation {
            latitude: site.lat,
            longitude: site.lng,
            temperature,
            device_id: site.device_id.to_string(),
        }
    }
}

/// An interpolated value at one interior lattice cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_heat_index_reference_values() {
        // ---
        assert_eq!(heat_index(30.0, 50.0), 31.63);
        assert_eq!(heat_index(25.0, 60.0), 25.9);

        // Same inputs, same output.
        assert_eq!(heat_index(30.0, 50.0), heat_index(30.0, 50.0));
    }

    #[test]
    fn test_reading_derives_heat_index() {
        // ---
        let r = Reading::new("18-11-2025", "12-00-00", "DEVICE_001", 30.0, 50.0, 1012.0);
        assert_eq!(r.heat_index, 31.63);
    }

    #[test]
    fn test_minutes_since_midnight() {
        // ---
        assert_eq!(minutes_since_midnight("00-00-00"), Some(0));
        assert_eq!(minutes_since_midnight("06-30-00"), Some(390));
        assert_eq!(minutes_since_midnight("23:59:00"), Some(1439));
        assert_eq!(minutes_since_midnight("12-00"), Some(720));

        assert_eq!(minutes_since_midnight("12"), None);
        assert_eq!(minutes_since_midnight("ab-cd-00"), None);
        assert_eq!(minutes_since_midnight("24-00-00"), None);
        assert_eq!(minutes_since_midnight(""), None);
    }

    #[test]
    fn test_metric_wire_names() {
        // ---
        let json = serde_json::to_string(&Metric::ALL).unwrap();
        assert_eq!(
            json,
            r#"["bmp_temp_c","pressure_hpa","humidity_pct","heat_index"]"#
        );
        for m in Metric::ALL {
            assert_eq!(m.to_string(), m.as_str());
        }
    }

    #[test]
    fn test_reading_json_shape() {
        // ---
        let r = Reading::new("18-11-2025", "06-00-00", "DEVICE_002", 21.5, 70.0, 1009.3);
        let value = serde_json::to_value(&r).unwrap();

        assert_eq!(value["bmp_temp_c"], 21.5);
        assert_eq!(value["time"], "06-00-00");

        let back: Reading = serde_json::from_value(value).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_metric_series_preserves_order() {
        // ---
        let readings = vec![
            Reading::new("d", "06-00-00", "DEVICE_001", 20.0, 40.0, 1000.0),
            Reading::new("d", "07-00-00", "DEVICE_001", 21.0, 41.0, 1001.0),
        ];
        let pressures: Vec<f64> = Metric::Pressure.series(&readings).collect();
        assert_eq!(pressures, vec![1000.0, 1001.0]);
    }
}
