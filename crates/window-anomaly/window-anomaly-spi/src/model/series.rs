//! Series and normalization types.

use serde::{Deserialize, Serialize};

use crate::error::{AnomalyError, Result};

/// A single observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub timestamp: i64,
    pub value: f64,
}

impl TimePoint {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// An ordered, single-channel time series.
///
/// Timestamps are strictly increasing; this is checked on construction.
/// Serialized as a list of [`TimePoint`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    timestamps: Vec<i64>,
    values: Vec<f64>,
}

impl Series {
    /// Build a series from points, rejecting duplicate or out-of-order timestamps.
    pub fn new(points: Vec<TimePoint>) -> Result<Self> {
        if let Some(index) = points
            .windows(2)
            .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(AnomalyError::UnorderedSeries { index: index + 1 });
        }

        let (timestamps, values) = points.into_iter().map(|p| (p.timestamp, p.value)).unzip();
        Ok(Self { timestamps, values })
    }

    /// Build a series with implicit timestamps `0..N`.
    pub fn from_values(values: Vec<f64>) -> Self {
        let timestamps = (0..values.len() as i64).collect();
        Self { timestamps, values }
    }

    /// Build a regularly-sampled series starting at `start`, spaced by `step`.
    pub fn from_regular(start: i64, step: i64, values: Vec<f64>) -> Result<Self> {
        if step <= 0 {
            return Err(AnomalyError::InvalidParameter {
                name: "step".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        let timestamps = (0..values.len() as i64)
            .map(|i| start + i * step)
            .collect();
        Ok(Self { timestamps, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    /// Point at `index`, if any.
    pub fn get(&self, index: usize) -> Option<TimePoint> {
        Some(TimePoint::new(
            *self.timestamps.get(index)?,
            *self.values.get(index)?,
        ))
    }

    /// Iterate over the points in timestamp order.
    pub fn points(&self) -> impl Iterator<Item = TimePoint> + '_ {
        self.timestamps
            .iter()
            .zip(&self.values)
            .map(|(&timestamp, &value)| TimePoint { timestamp, value })
    }
}

impl Serialize for Series {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.points())
    }
}

impl<'de> Deserialize<'de> for Series {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let points = Vec::<TimePoint>::deserialize(deserializer)?;
        Series::new(points).map_err(serde::de::Error::custom)
    }
}

/// Reference statistics used for z-normalization.
///
/// Fitted once from a reference series and passed by reference to every
/// normalization call afterwards. `std` is finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParams")]
pub struct NormalizationParams {
    mean: f64,
    std: f64,
}

#[derive(Deserialize)]
struct RawParams {
    mean: f64,
    std: f64,
}

impl TryFrom<RawParams> for NormalizationParams {
    type Error = AnomalyError;

    fn try_from(raw: RawParams) -> Result<Self> {
        Self::new(raw.mean, raw.std)
    }
}

impl NormalizationParams {
    pub fn new(mean: f64, std: f64) -> Result<Self> {
        if !mean.is_finite() {
            return Err(AnomalyError::DegenerateInput(format!(
                "mean must be finite, got {}",
                mean
            )));
        }
        if !std.is_finite() || std <= 0.0 {
            return Err(AnomalyError::DegenerateInput(format!(
                "standard deviation must be finite and positive, got {}",
                std
            )));
        }
        Ok(Self { mean, std })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std(&self) -> f64 {
        self.std
    }

    /// `(value - mean) / std`
    pub fn apply(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }

    /// Inverse of [`apply`](Self::apply).
    pub fn denormalize(&self, value: f64) -> f64 {
        value * self.std + self.mean
    }

    /// Apply to every value of `series`, keeping its timestamps.
    pub fn normalize(&self, series: &Series) -> NormalizedSeries {
        NormalizedSeries {
            timestamps: series.timestamps.clone(),
            values: series.values.iter().map(|&v| self.apply(v)).collect(),
            params: *self,
        }
    }
}

/// A series z-normalized under fixed [`NormalizationParams`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSeries {
    timestamps: Vec<i64>,
    values: Vec<f64>,
    params: NormalizationParams,
}

impl NormalizedSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn params(&self) -> &NormalizationParams {
        &self.params
    }

    /// Values mapped back to the original scale.
    pub fn denormalized(&self) -> Vec<f64> {
        self.values
            .iter()
            .map(|&z| self.params.denormalize(z))
            .collect()
    }
}
