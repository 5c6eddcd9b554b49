//! Window, score and threshold types.

use serde::{Deserialize, Serialize};

use crate::error::{AnomalyError, Result};

/// A contiguous, fixed-length slice of a normalized series.
///
/// Covers indices `start ..= start + len - 1` of the series it was cut from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window<'a> {
    pub start: usize,
    pub values: &'a [f64],
}

impl<'a> Window<'a> {
    pub fn new(start: usize, values: &'a [f64]) -> Self {
        Self { start, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last series index covered by this window.
    pub fn end(&self) -> usize {
        self.start + self.values.len().saturating_sub(1)
    }

    /// Whether series index `index` falls inside this window.
    pub fn contains(&self, index: usize) -> bool {
        !self.is_empty() && index >= self.start && index <= self.end()
    }
}

/// Reconstruction error of one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowScore {
    /// Start index of the scored window.
    pub start: usize,
    /// Mean absolute error between the window and its reconstruction.
    pub score: f64,
}

impl WindowScore {
    pub fn new(start: usize, score: f64) -> Self {
        Self { start, score }
    }
}

/// Decision threshold over window scores.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(AnomalyError::InvalidParameter {
                name: "threshold".to_string(),
                reason: format!("must be finite, got {}", value),
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Strictly greater than the threshold; equality is not anomalous.
    pub fn is_exceeded_by(&self, score: f64) -> bool {
        score > self.0
    }
}

impl TryFrom<f64> for Threshold {
    type Error = AnomalyError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}
