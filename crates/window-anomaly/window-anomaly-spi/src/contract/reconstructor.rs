//! Reconstructor trait definition.

use crate::error::{AnomalyError, Result};

use super::CancellationToken;

/// A batch of windows, one row per window, in increasing start order.
pub type Batch = [Vec<f64>];

/// Sequence reconstructor.
///
/// The only point where the pipeline touches an external model. The model is
/// already trained; from the pipeline's side it is stateless. Output must
/// have one row per input row, each with the same length as its input.
pub trait Reconstructor: Send + Sync {
    /// Reconstruct every window of `batch`.
    fn reconstruct(&self, batch: &Batch) -> Result<Vec<Vec<f64>>>;

    /// Reconstruct while honouring `cancel`.
    ///
    /// Long-running implementations should override this and poll the token.
    fn reconstruct_cancellable(
        &self,
        batch: &Batch,
        cancel: &CancellationToken,
    ) -> Result<Vec<Vec<f64>>> {
        if cancel.is_cancelled() {
            return Err(AnomalyError::ReconstructionTimeout(
                "cancelled before reconstruction started".to_string(),
            ));
        }
        self.reconstruct(batch)
    }

    /// Name used in log output.
    fn name(&self) -> &str {
        "reconstructor"
    }
}

impl<R: Reconstructor + ?Sized> Reconstructor for Box<R> {
    fn reconstruct(&self, batch: &Batch) -> Result<Vec<Vec<f64>>> {
        (**self).reconstruct(batch)
    }

    fn reconstruct_cancellable(
        &self,
        batch: &Batch,
        cancel: &CancellationToken,
    ) -> Result<Vec<Vec<f64>>> {
        (**self).reconstruct_cancellable(batch, cancel)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
