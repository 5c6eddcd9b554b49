//! Window Anomaly Detection Facade
//!
//! Unified re-exports for the window anomaly detection module.
//!
//! This facade provides a single entry point to all window anomaly detection functionality:
//! - `Reconstructor` trait, data model and `AnomalyError` from SPI
//! - Configuration types from API
//! - Normalizer, windower, scorer, threshold estimator, aggregator and
//!   `WindowAnomalyDetector` from Core

// Re-export everything from SPI
pub use window_anomaly_spi::*;

// Re-export everything from API
pub use window_anomaly_api::*;

// Re-export everything from Core
pub use window_anomaly_core::*;
