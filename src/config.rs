//! Configuration loader for the `sensorflow-analytics` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Route handlers receive a [`Config`] snapshot
//! through application state and never read the environment themselves.
//!
use std::{env, path::PathBuf};

use anyhow::{anyhow, ensure, Result};

/// Realtime database holding the mesh's `NEW_BOARDS` tree.
pub const DEFAULT_FIREBASE_URL: &str =
    "https://major-project-d3e48-default-rtdb.asia-southeast1.firebasedatabase.app";

/// Parse an optional numeric environment variable with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Base URL of the realtime database serving raw readings.
    pub firebase_url: String,

    /// Transformed 24 h CSV export backing the heatmap endpoints.
    pub csv_path: PathBuf,

    /// TCP port the HTTP server binds on all interfaces.
    pub bind_port: u16,

    /// Grid resolution used when a heatmap request does not give one.
    pub heatmap_resolution: u32,

    /// Upper bound on any requested grid resolution.
    pub heatmap_max_resolution: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            firebase_url: DEFAULT_FIREBASE_URL.to_string(),
            csv_path: PathBuf::from("data/sensor_data_24h_transformed.csv"),
            bind_port: 8080,
            heatmap_resolution: 100,
            heatmap_max_resolution: 400,
        }
    }
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `FIREBASE_URL` – realtime database base URL
/// - `SENSOR_CSV_PATH` – CSV export path (default: `data/sensor_data_24h_transformed.csv`)
/// - `BIND_PORT` – HTTP port (default: 8080)
/// - `HEATMAP_RESOLUTION` – default grid resolution (default: 100)
/// - `HEATMAP_MAX_RESOLUTION` – resolution cap (default: 400)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let defaults = Config::default();

    let firebase_url = env_or!("FIREBASE_URL", defaults.firebase_url);
    let csv_path = PathBuf::from(env_or!("SENSOR_CSV_PATH", defaults.csv_path.display()));
    let bind_port = parse_env!("BIND_PORT", u16, defaults.bind_port);
    let heatmap_resolution = parse_env!("HEATMAP_RESOLUTION", u32, defaults.heatmap_resolution);
    let heatmap_max_resolution =
        parse_env!("HEATMAP_MAX_RESOLUTION", u32, defaults.heatmap_max_resolution);

    ensure!(heatmap_resolution > 0, "HEATMAP_RESOLUTION must be positive");
    ensure!(
        heatmap_resolution <= heatmap_max_resolution,
        "HEATMAP_RESOLUTION ({}) exceeds HEATMAP_MAX_RESOLUTION ({})",
        heatmap_resolution,
        heatmap_max_resolution
    );

    Ok(Config {
        firebase_url,
        csv_path,
        bind_port,
        heatmap_resolution,
        heatmap_max_resolution,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  FIREBASE_URL           : {}", self.firebase_url);
        tracing::info!("  SENSOR_CSV_PATH        : {}", self.csv_path.display());
        tracing::info!("  BIND_PORT              : {}", self.bind_port);
        tracing::info!("  HEATMAP_RESOLUTION     : {}", self.heatmap_resolution);
        tracing::info!("  HEATMAP_MAX_RESOLUTION : {}", self.heatmap_max_resolution);
    }

    /// Clamp a requested grid resolution to the configured range.
    pub fn resolve_resolution(&self, requested: Option<u32>) -> usize {
        // ---
        requested
            .unwrap_or(self.heatmap_resolution)
            .min(self.heatmap_max_resolution) as usize
    }
}
