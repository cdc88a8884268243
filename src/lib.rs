//! Analytics for a three-sensor environmental mesh.
//!
//! The crate is split along the Explicit Module Boundary Pattern (EMBP):
//! - `models`    – reading, statistic and observation shapes, fixed sensor sites
//! - `analytics` – pure statistics, diurnal prediction and IDW interpolation
//! - `ingest`    – device-tree and CSV adapters producing flat readings
//! - `config`    – environment-driven service configuration
//! - `routes`    – Axum gateway exposing the above over HTTP
//!
//! Only `routes` and `ingest` perform I/O; `analytics` is stateless and
//! safe to call from any number of request handlers at once.

pub mod analytics;
pub mod config;
pub mod ingest;
pub mod models;
pub mod routes;

pub use config::Config;

// Re-exported so sibling modules depend on the crate root, not on `models`.
pub use models::{
    heat_index, GridPoint, Metric, MetricStatistic, Reading, SensorObservation, SensorSite,
    SENSOR_SITES,
};
