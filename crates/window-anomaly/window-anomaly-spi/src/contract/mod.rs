//! Contract definitions for window anomaly detection.
//!
//! This module contains the capability the pipeline consumes from an
//! external reconstruction model.

mod reconstructor;

pub use reconstructor::{Batch, Reconstructor};

/// Cooperative cancellation signal passed to reconstructors.
///
/// Works from synchronous code. The scorer hands each call a child token so
/// that a timeout never cancels the caller's own token.
pub use tokio_util::sync::CancellationToken;
