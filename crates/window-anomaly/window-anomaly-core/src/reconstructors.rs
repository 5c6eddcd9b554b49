//! Deterministic stand-in reconstructors.
//!
//! Useful for exercising the pipeline without a trained model: an exact
//! reconstructor, a biased one, a noisy one, and an adapter for closures.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use window_anomaly_spi::{Batch, Reconstructor, Result};

// ============================================================================
// Identity
// ============================================================================

/// Returns every window unchanged, so every score is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityReconstructor;

impl Reconstructor for IdentityReconstructor {
    fn reconstruct(&self, batch: &Batch) -> Result<Vec<Vec<f64>>> {
        Ok(batch.to_vec())
    }

    fn name(&self) -> &str {
        "identity"
    }
}

// ============================================================================
// Constant offset
// ============================================================================

/// Adds a constant to every value; every score equals `|offset|`.
#[derive(Debug, Clone, Copy)]
pub struct OffsetReconstructor {
    offset: f64,
}

impl OffsetReconstructor {
    pub fn new(offset: f64) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }
}

impl Reconstructor for OffsetReconstructor {
    fn reconstruct(&self, batch: &Batch) -> Result<Vec<Vec<f64>>> {
        Ok(batch
            .iter()
            .map(|row| row.iter().map(|v| v + self.offset).collect())
            .collect())
    }

    fn name(&self) -> &str {
        "offset"
    }
}

// ============================================================================
// Seeded noise
// ============================================================================

/// Adds uniform noise in `[-amplitude, amplitude]`.
///
/// The generator is reseeded on every call, so identical batches always get
/// identical reconstructions. A non-finite amplitude is treated as zero.
#[derive(Debug, Clone, Copy)]
pub struct NoisyReconstructor {
    amplitude: f64,
    seed: u64,
}

impl NoisyReconstructor {
    pub fn new(amplitude: f64, seed: u64) -> Self {
        Self {
            amplitude: if amplitude.is_finite() {
                amplitude.abs()
            } else {
                0.0
            },
            seed,
        }
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }
}

impl Reconstructor for NoisyReconstructor {
    fn reconstruct(&self, batch: &Batch) -> Result<Vec<Vec<f64>>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        Ok(batch
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| {
                        if self.amplitude == 0.0 {
                            *v
                        } else {
                            v + rng.gen_range(-self.amplitude..=self.amplitude)
                        }
                    })
                    .collect()
            })
            .collect())
    }

    fn name(&self) -> &str {
        "noisy"
    }
}

// ============================================================================
// Closure adapter
// ============================================================================

/// Wraps a per-window function as a [`Reconstructor`].
pub struct FnReconstructor<F> {
    f: F,
}

impl<F> FnReconstructor<F>
where
    F: Fn(&[f64]) -> Vec<f64> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> std::fmt::Debug for FnReconstructor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnReconstructor").finish_non_exhaustive()
    }
}

impl<F> Reconstructor for FnReconstructor<F>
where
    F: Fn(&[f64]) -> Vec<f64> + Send + Sync,
{
    fn reconstruct(&self, batch: &Batch) -> Result<Vec<Vec<f64>>> {
        Ok(batch.iter().map(|row| (self.f)(row)).collect())
    }

    fn name(&self) -> &str {
        "fn"
    }
}
