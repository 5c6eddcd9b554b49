//! Sliding-window construction.

use std::ops::RangeInclusive;

use window_anomaly_spi::{AnomalyError, NormalizedSeries, Result, Window};

/// All contiguous windows of a fixed length over a normalized series.
///
/// Windows borrow from the series and are produced on demand, always in
/// increasing start order.
#[derive(Debug, Clone, Copy)]
pub struct Windows<'a> {
    values: &'a [f64],
    length: usize,
}

/// Cut `series` into overlapping windows of `length` points.
pub fn make_windows(series: &NormalizedSeries, length: usize) -> Result<Windows<'_>> {
    Windows::new(series.values(), length)
}

impl<'a> Windows<'a> {
    pub fn new(values: &'a [f64], length: usize) -> Result<Self> {
        if length < 1 || length > values.len() {
            return Err(AnomalyError::InvalidWindowLength {
                length,
                series_len: values.len(),
            });
        }
        Ok(Self { values, length })
    }

    /// Number of windows, `N - W + 1`.
    pub fn len(&self) -> usize {
        self.values.len() - self.length + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn window_length(&self) -> usize {
        self.length
    }

    pub fn series_len(&self) -> usize {
        self.values.len()
    }

    /// Window starting at `start`, if it exists.
    pub fn get(&self, start: usize) -> Option<Window<'a>> {
        if start >= self.len() {
            return None;
        }
        Some(Window::new(start, &self.values[start..start + self.length]))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Window<'a>> + 'a {
        let values = self.values;
        values
            .windows(self.length)
            .enumerate()
            .map(|(start, values)| Window::new(start, values))
    }

    /// Start indices of every window containing point `index`.
    ///
    /// `max(0, index - W + 1) ..= min(index, N - W)`. Empty when `index` is
    /// outside the series.
    pub fn covering(&self, index: usize) -> RangeInclusive<usize> {
        covering_starts(index, self.values.len(), self.length)
    }

    /// Copy every window into an owned row, for a batched reconstructor call.
    pub fn to_batch(&self) -> Vec<Vec<f64>> {
        self.iter().map(|w| w.values.to_vec()).collect()
    }
}

/// Start indices of the windows of length `window_length` over a series of
/// `series_len` points that contain `index`.
pub(crate) fn covering_starts(
    index: usize,
    series_len: usize,
    window_length: usize,
) -> RangeInclusive<usize> {
    if window_length == 0 || window_length > series_len || index >= series_len {
        return RangeInclusive::new(1, 0);
    }
    let first = (index + 1).saturating_sub(window_length);
    let last = index.min(series_len - window_length);
    first..=last
}
