//! Window flags and point labels.

use tracing::debug;
use window_anomaly_api::BoundaryPolicy;
use window_anomaly_spi::{AnomalyError, PointLabel, Result, Threshold, WindowScore};

use crate::windower::covering_starts;

/// `score > threshold` for every window, in the order given.
pub fn flag_windows(scores: &[WindowScore], threshold: Threshold) -> Vec<bool> {
    scores
        .iter()
        .map(|s| threshold.is_exceeded_by(s.score))
        .collect()
}

/// Label every point of a series of `series_len` points.
///
/// A point is anomalous iff every window covering it is flagged. Under
/// [`BoundaryPolicy::Clamped`] the covering set near the edges is whatever
/// windows exist; under [`BoundaryPolicy::InteriorOnly`] the first and last
/// `window_length - 1` points are left [`PointLabel::Unevaluated`].
///
/// `flags` must hold one entry per window, `series_len - window_length + 1`,
/// in start order.
pub fn label_points(
    flags: &[bool],
    series_len: usize,
    window_length: usize,
    policy: BoundaryPolicy,
) -> Result<Vec<PointLabel>> {
    if window_length < 1 || window_length > series_len {
        return Err(AnomalyError::InvalidWindowLength {
            length: window_length,
            series_len,
        });
    }
    let window_count = series_len - window_length + 1;
    if flags.len() != window_count {
        return Err(AnomalyError::InvalidParameter {
            name: "flags".to_string(),
            reason: format!("expected {} window flags, got {}", window_count, flags.len()),
        });
    }

    // clear_before[i] = number of unflagged windows with start < i
    let mut clear_before = Vec::with_capacity(window_count + 1);
    clear_before.push(0usize);
    for &flag in flags {
        let last = clear_before[clear_before.len() - 1];
        clear_before.push(last + usize::from(!flag));
    }

    let interior = (window_length - 1)..=(series_len - window_length);
    let labels: Vec<PointLabel> = (0..series_len)
        .map(|d| {
            if policy == BoundaryPolicy::InteriorOnly && !interior.contains(&d) {
                return PointLabel::Unevaluated;
            }
            let covering = covering_starts(d, series_len, window_length);
            let (first, last) = (*covering.start(), *covering.end());
            if clear_before[last + 1] - clear_before[first] == 0 {
                PointLabel::Anomalous
            } else {
                PointLabel::Normal
            }
        })
        .collect();

    debug!(
        points = series_len,
        flagged_windows = flags.iter().filter(|&&f| f).count(),
        anomalous_points = labels.iter().filter(|l| l.is_anomalous()).count(),
        ?policy,
        "labelled points"
    );
    Ok(labels)
}

/// Indices of anomalous labels, increasing.
pub fn anomalous_indices(labels: &[PointLabel]) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter_map(|(i, label)| if label.is_anomalous() { Some(i) } else { None })
        .collect()
}
