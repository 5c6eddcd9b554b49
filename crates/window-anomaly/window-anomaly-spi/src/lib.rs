//! Window Anomaly Detection Service Provider Interface
//!
//! Defines the reconstructor capability, the data model shared by all
//! pipeline stages, and the error taxonomy.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{Batch, CancellationToken, Reconstructor};
pub use error::{AnomalyError, Result};
pub use model::{
    DetectionReport, NormalizationParams, NormalizedSeries, PointLabel, Series, Threshold,
    TimePoint, Window, WindowScore,
};
