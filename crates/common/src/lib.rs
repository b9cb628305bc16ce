//! Common building blocks shared across Ferry crates.
//!
//! - **Properties**: typed access to the adapter's key/value configuration (`properties`).
//! - **Validation**: eager checks run before any SQL is generated (`validation`).
//! - **Errors**: the configuration error family (`error`).
//! - **Telemetry**: `tracing` subscriber setup driven by LOG_LEVEL (`telemetry`).
pub mod error;
pub mod properties;
pub mod telemetry;
pub mod validation;

pub use crate::error::ConfigurationError;
pub use crate::properties::{AdapterProperties, ImportDataTypes};
