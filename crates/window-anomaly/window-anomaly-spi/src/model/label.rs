//! Point-level labels.

use serde::{Deserialize, Serialize};

/// Anomaly decision for one series index.
///
/// `Unevaluated` marks indices the boundary policy chose not to judge. It is
/// distinct from `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointLabel {
    Anomalous,
    Normal,
    Unevaluated,
}

impl PointLabel {
    pub fn is_anomalous(&self) -> bool {
        matches!(self, PointLabel::Anomalous)
    }

    pub fn is_evaluated(&self) -> bool {
        !matches!(self, PointLabel::Unevaluated)
    }
}
