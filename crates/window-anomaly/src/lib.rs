//! # window-anomaly
//!
//! Flags anomalous points in a time series by how badly a sequence
//! reconstructor reproduces sliding windows of it.
//!
//! ```rust,ignore
//! use window_anomaly::{DetectorConfig, IdentityReconstructor, Series, WindowAnomalyDetector};
//!
//! let detector = WindowAnomalyDetector::new(DetectorConfig::new(288), my_model)?;
//! let fitted = detector.fit(&training)?;
//! let report = fitted.detect(&evaluation)?;
//! println!("anomalies at {:?}", report.anomalous_timestamps());
//! ```

pub use window_anomaly_facade::*;
