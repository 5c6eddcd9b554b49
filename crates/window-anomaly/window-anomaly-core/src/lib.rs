//! Window Anomaly Detection Core
//!
//! Normalization, windowing, reconstruction scoring, threshold estimation,
//! point labelling, and the detector that runs them in order.

mod aggregator;
mod detector;
mod normalizer;
mod reconstructors;
mod scorer;
mod threshold;
mod windower;

pub use aggregator::*;
pub use detector::*;
pub use normalizer::*;
pub use reconstructors::*;
pub use scorer::*;
pub use threshold::*;
pub use windower::{make_windows, Windows};
