//! Reconstruction-error scoring.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, warn};
use window_anomaly_api::ScoringConfig;
use window_anomaly_spi::{
    AnomalyError, CancellationToken, Reconstructor, Result, Window, WindowScore,
};

use crate::windower::Windows;

/// How often a waiting scorer re-checks its cancellation token.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Mean absolute error between a window and its reconstruction.
///
/// Fails on a shape mismatch or on any non-finite value in either input, or
/// in the result.
pub fn mean_absolute_error(window: &Window<'_>, reconstruction: &[f64]) -> Result<WindowScore> {
    if reconstruction.len() != window.len() {
        return Err(AnomalyError::Reconstruction(format!(
            "window {} has {} values but its reconstruction has {}",
            window.start,
            window.len(),
            reconstruction.len()
        )));
    }
    if let Some(offset) = window.values.iter().position(|v| !v.is_finite()) {
        return Err(AnomalyError::ScoreComputation {
            start: window.start,
            reason: format!("window value at offset {} is not finite", offset),
        });
    }
    if let Some(offset) = reconstruction.iter().position(|v| !v.is_finite()) {
        return Err(AnomalyError::ScoreComputation {
            start: window.start,
            reason: format!("reconstructed value at offset {} is not finite", offset),
        });
    }

    let total: f64 = window
        .values
        .iter()
        .zip(reconstruction)
        .map(|(a, b)| (a - b).abs())
        .sum();
    let score = total / window.len() as f64;

    if !score.is_finite() {
        return Err(AnomalyError::ScoreComputation {
            start: window.start,
            reason: "error overflowed".to_string(),
        });
    }
    Ok(WindowScore::new(window.start, score))
}

/// Scores windows by asking a [`Reconstructor`] to reproduce them.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    /// Fails on a zero timeout.
    pub fn new(parallel: bool, timeout: Option<Duration>) -> Result<Self> {
        Self::from_config(ScoringConfig::new(parallel, timeout))
    }

    /// Create from configuration.
    pub fn from_config(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Score a single window with one reconstructor call.
    pub fn score_window(
        &self,
        window: &Window<'_>,
        reconstructor: &dyn Reconstructor,
    ) -> Result<WindowScore> {
        let mut output = reconstructor.reconstruct(&[window.values.to_vec()])?;
        if output.len() != 1 {
            return Err(AnomalyError::Reconstruction(format!(
                "expected 1 reconstruction, got {}",
                output.len()
            )));
        }
        mean_absolute_error(window, &output.remove(0))
    }

    /// Score every window, in start order.
    ///
    /// All windows go to the reconstructor in one batched call. Any failure
    /// fails the whole pass; with several bad windows the lowest start is
    /// reported, sequential or parallel.
    pub fn score_windows(
        &self,
        windows: &Windows<'_>,
        reconstructor: &Arc<dyn Reconstructor>,
        cancel: &CancellationToken,
    ) -> Result<Vec<WindowScore>> {
        let batch = windows.to_batch();
        debug!(
            windows = batch.len(),
            window_length = windows.window_length(),
            reconstructor = reconstructor.name(),
            "reconstructing batch"
        );

        let reconstructions = self.reconstruct(batch, reconstructor, cancel)?;
        if reconstructions.len() != windows.len() {
            return Err(AnomalyError::Reconstruction(format!(
                "expected {} reconstructions, got {}",
                windows.len(),
                reconstructions.len()
            )));
        }

        let windows: Vec<Window<'_>> = windows.iter().collect();
        if self.config.parallel {
            // Collect in start order first so the reported error does not
            // depend on scheduling.
            let scored: Vec<Result<WindowScore>> = windows
                .par_iter()
                .zip(reconstructions.par_iter())
                .map(|(window, reconstruction)| mean_absolute_error(window, reconstruction))
                .collect();
            scored.into_iter().collect()
        } else {
            windows
                .iter()
                .zip(&reconstructions)
                .map(|(window, reconstruction)| mean_absolute_error(window, reconstruction))
                .collect()
        }
    }

    fn reconstruct(
        &self,
        batch: Vec<Vec<f64>>,
        reconstructor: &Arc<dyn Reconstructor>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Vec<f64>>> {
        if cancel.is_cancelled() {
            return Err(AnomalyError::ReconstructionTimeout(
                "cancelled before reconstruction started".to_string(),
            ));
        }

        // The call gets its own child so a timeout leaves `cancel` usable.
        let call = cancel.child_token();
        let output = match self.config.timeout() {
            None => reconstructor.reconstruct_cancellable(&batch, &call)?,
            Some(timeout) => reconstruct_with_deadline(
                Arc::new(batch),
                Arc::clone(reconstructor),
                call,
                timeout,
            )?,
        };

        if cancel.is_cancelled() {
            return Err(AnomalyError::ReconstructionTimeout(
                "cancelled during reconstruction".to_string(),
            ));
        }
        Ok(output)
    }
}

/// Run the reconstructor on a worker thread and wait at most `timeout`.
///
/// `call` is a child of the caller's token. On expiry only `call` is
/// cancelled so a cooperative reconstructor can stop; the worker is detached
/// and its late result dropped.
fn reconstruct_with_deadline(
    batch: Arc<Vec<Vec<f64>>>,
    reconstructor: Arc<dyn Reconstructor>,
    call: CancellationToken,
    timeout: Duration,
) -> Result<Vec<Vec<f64>>> {
    let name = reconstructor.name().to_string();
    let (tx, rx) = mpsc::channel();
    let worker_cancel = call.clone();

    thread::Builder::new()
        .name("window-anomaly-reconstruct".to_string())
        .spawn(move || {
            // Receiver is gone if the caller already gave up.
            let _ = tx.send(reconstructor.reconstruct_cancellable(&batch, &worker_cancel));
        })
        .map_err(|e| {
            AnomalyError::Reconstruction(format!("failed to spawn reconstruction worker: {}", e))
        })?;

    let deadline = Instant::now() + timeout;
    loop {
        if call.is_cancelled() {
            warn!(reconstructor = %name, "reconstruction cancelled by caller");
            return Err(AnomalyError::ReconstructionTimeout(
                "cancelled during reconstruction".to_string(),
            ));
        }

        let now = Instant::now();
        if now >= deadline {
            call.cancel();
            warn!(reconstructor = %name, timeout_ms = timeout.as_millis() as u64, "reconstruction timed out");
            return Err(AnomalyError::ReconstructionTimeout(format!(
                "{} did not finish within {:?}",
                name, timeout
            )));
        }

        match rx.recv_timeout((deadline - now).min(POLL_INTERVAL)) {
            Ok(result) => return result,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                return Err(AnomalyError::Reconstruction(format!(
                    "{} worker exited without a result",
                    name
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconstructors::{FnReconstructor, IdentityReconstructor, OffsetReconstructor};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn identity() -> Arc<dyn Reconstructor> {
        Arc::new(IdentityReconstructor)
    }

    #[test]
    fn test_mae_identity_is_zero() {
        let data = [1.0, -2.0, 3.5];
        let window = Window::new(0, &data);
        let score = mean_absolute_error(&window, &data).unwrap();
        assert_eq!(score.score, 0.0);
    }

    #[test]
    fn test_mae_value() {
        let data = [0.0, 0.0, 10.0];
        let window = Window::new(1, &data);
        let score = mean_absolute_error(&window, &[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(score.start, 1);
        assert!((score.score - 10.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_mae_rejects_nan_in_window() {
        let data = [0.0, f64::NAN];
        let window = Window::new(2, &data);
        let err = mean_absolute_error(&window, &[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, AnomalyError::ScoreComputation { start: 2, .. }));
    }

    #[test]
    fn test_mae_rejects_infinite_reconstruction() {
        let data = [0.0, 1.0];
        let window = Window::new(0, &data);
        let err = mean_absolute_error(&window, &[0.0, f64::INFINITY]).unwrap_err();
        assert!(matches!(err, AnomalyError::ScoreComputation { start: 0, .. }));
    }

    #[test]
    fn test_mae_rejects_overflow() {
        let data = [f64::MAX, -f64::MAX];
        let window = Window::new(0, &data);
        let err = mean_absolute_error(&window, &[-f64::MAX, f64::MAX]).unwrap_err();
        assert!(matches!(err, AnomalyError::ScoreComputation { .. }));
    }

    #[test]
    fn test_mae_rejects_shape_mismatch() {
        let data = [0.0, 1.0];
        let window = Window::new(0, &data);
        assert!(matches!(
            mean_absolute_error(&window, &[0.0]),
            Err(AnomalyError::Reconstruction(_))
        ));
    }

    #[test]
    fn test_score_windows_identity_all_zero() {
        let data: Vec<f64> = (0..20).map(|i| (i as f64).sin()).collect();
        let windows = Windows::new(&data, 5).unwrap();
        let scores = Scorer::default()
            .score_windows(&windows, &identity(), &CancellationToken::new())
            .unwrap();
        assert_eq!(scores.len(), 16);
        assert!(scores.iter().all(|s| s.score == 0.0));
        assert!(scores.iter().enumerate().all(|(i, s)| s.start == i));
    }

    #[test]
    fn test_score_windows_offset() {
        let data = vec![0.0; 10];
        let windows = Windows::new(&data, 4).unwrap();
        let reconstructor: Arc<dyn Reconstructor> = Arc::new(OffsetReconstructor::new(0.25));
        let scores = Scorer::default()
            .score_windows(&windows, &reconstructor, &CancellationToken::new())
            .unwrap();
        assert!(scores.iter().all(|s| (s.score - 0.25).abs() < 1e-12));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let data: Vec<f64> = (0..200).map(|i| (i as f64 * 0.37).cos() * 3.0).collect();
        let windows = Windows::new(&data, 16).unwrap();
        let reconstructor: Arc<dyn Reconstructor> = Arc::new(FnReconstructor::new(|row: &[f64]| {
            row.iter().map(|v| v * 0.5).collect()
        }));
        let cancel = CancellationToken::new();

        let sequential = Scorer::new(false, None)
            .unwrap()
            .score_windows(&windows, &reconstructor, &cancel)
            .unwrap();
        let parallel = Scorer::new(true, None)
            .unwrap()
            .score_windows(&windows, &reconstructor, &cancel)
            .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_reconstructor_called_once_per_pass() {
        struct Counting(AtomicUsize);
        impl Reconstructor for Counting {
            fn reconstruct(&self, batch: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(batch.to_vec())
            }
        }

        let counting = Arc::new(Counting(AtomicUsize::new(0)));
        let reconstructor: Arc<dyn Reconstructor> = counting.clone();
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let windows = Windows::new(&data, 2).unwrap();
        Scorer::default()
            .score_windows(&windows, &reconstructor, &CancellationToken::new())
            .unwrap();
        assert_eq!(counting.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_batch_size_mismatch_fails() {
        struct Truncating;
        impl Reconstructor for Truncating {
            fn reconstruct(&self, batch: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
                Ok(batch[1..].to_vec())
            }
        }

        let reconstructor: Arc<dyn Reconstructor> = Arc::new(Truncating);
        let data = vec![1.0, 2.0, 3.0, 4.0];
        let windows = Windows::new(&data, 2).unwrap();
        assert!(matches!(
            Scorer::default().score_windows(&windows, &reconstructor, &CancellationToken::new()),
            Err(AnomalyError::Reconstruction(_))
        ));
    }

    #[test]
    fn test_single_bad_window_fails_whole_pass() {
        let reconstructor: Arc<dyn Reconstructor> = Arc::new(FnReconstructor::new(|row: &[f64]| {
            if row[0] == 3.0 {
                vec![f64::NAN; row.len()]
            } else {
                row.to_vec()
            }
        }));
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let windows = Windows::new(&data, 2).unwrap();
        for parallel in [false, true] {
            let result = Scorer::new(parallel, None).unwrap().score_windows(
                &windows,
                &reconstructor,
                &CancellationToken::new(),
            );
            assert!(matches!(
                result,
                Err(AnomalyError::ScoreComputation { start: 2, .. })
            ));
        }
    }

    #[test]
    fn test_reconstructor_error_propagates() {
        struct Failing;
        impl Reconstructor for Failing {
            fn reconstruct(&self, _batch: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
                Err(AnomalyError::Reconstruction("model unavailable".to_string()))
            }
        }

        let reconstructor: Arc<dyn Reconstructor> = Arc::new(Failing);
        let data = vec![1.0, 2.0, 3.0];
        let windows = Windows::new(&data, 2).unwrap();
        let err = Scorer::default()
            .score_windows(&windows, &reconstructor, &CancellationToken::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "Reconstruction failed: model unavailable");
    }

    struct Slow;
    impl Reconstructor for Slow {
        fn reconstruct(&self, batch: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
            thread::sleep(Duration::from_millis(500));
            Ok(batch.to_vec())
        }
    }

    #[test]
    fn test_timeout_returns_error_and_keeps_caller_token() {
        let reconstructor: Arc<dyn Reconstructor> = Arc::new(Slow);
        let data = vec![1.0, 2.0, 3.0];
        let windows = Windows::new(&data, 2).unwrap();
        let cancel = CancellationToken::new();
        let started = Instant::now();
        let err = Scorer::new(false, Some(Duration::from_millis(20)))
            .unwrap()
            .score_windows(&windows, &reconstructor, &cancel)
            .unwrap_err();
        assert!(matches!(err, AnomalyError::ReconstructionTimeout(_)));
        assert!(err.is_retryable());
        assert!(!cancel.is_cancelled());
        assert!(started.elapsed() < Duration::from_millis(450));
    }

    #[test]
    fn test_retry_after_timeout_with_same_token() {
        let data = vec![1.0, 2.0, 3.0];
        let windows = Windows::new(&data, 2).unwrap();
        let cancel = CancellationToken::new();

        let slow: Arc<dyn Reconstructor> = Arc::new(Slow);
        let err = Scorer::new(false, Some(Duration::from_millis(20)))
            .unwrap()
            .score_windows(&windows, &slow, &cancel)
            .unwrap_err();
        assert!(err.is_retryable());

        let scores = Scorer::new(false, Some(Duration::from_secs(5)))
            .unwrap()
            .score_windows(&windows, &identity(), &cancel)
            .unwrap();
        assert_eq!(scores.len(), 2);
    }

    #[test]
    fn test_cancel_from_another_thread_stops_wait() {
        let reconstructor: Arc<dyn Reconstructor> = Arc::new(Slow);
        let data = vec![1.0, 2.0, 3.0];
        let windows = Windows::new(&data, 2).unwrap();
        let cancel = CancellationToken::new();

        let canceller = {
            let cancel = cancel.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                cancel.cancel();
            })
        };

        let started = Instant::now();
        let err = Scorer::new(false, Some(Duration::from_secs(5)))
            .unwrap()
            .score_windows(&windows, &reconstructor, &cancel)
            .unwrap_err();
        canceller.join().unwrap();

        assert!(matches!(err, AnomalyError::ReconstructionTimeout(_)));
        assert!(started.elapsed() < Duration::from_millis(450));
    }

    #[test]
    fn test_sub_millisecond_timeout_rounds_up() {
        let scorer = Scorer::new(false, Some(Duration::from_micros(900))).unwrap();
        assert_eq!(scorer.config.timeout(), Some(Duration::from_millis(1)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(matches!(
            Scorer::new(false, Some(Duration::ZERO)),
            Err(AnomalyError::InvalidParameter { .. })
        ));
        let mut config = ScoringConfig::default();
        config.timeout_ms = Some(0);
        assert!(Scorer::from_config(config).is_err());
    }

    #[test]
    fn test_parallel_reports_lowest_failing_window() {
        let reconstructor: Arc<dyn Reconstructor> = Arc::new(FnReconstructor::new(|row: &[f64]| {
            if row[0] >= 10.0 {
                vec![f64::NAN; row.len()]
            } else {
                row.to_vec()
            }
        }));
        let data: Vec<f64> = (0..400).map(|i| i as f64).collect();
        let windows = Windows::new(&data, 4).unwrap();
        for _ in 0..5 {
            let result = Scorer::new(true, None).unwrap().score_windows(
                &windows,
                &reconstructor,
                &CancellationToken::new(),
            );
            assert!(matches!(
                result,
                Err(AnomalyError::ScoreComputation { start: 10, .. })
            ));
        }
    }

    #[test]
    fn test_fast_reconstructor_within_timeout() {
        let data = vec![1.0, 2.0, 3.0];
        let windows = Windows::new(&data, 2).unwrap();
        let scores = Scorer::new(false, Some(Duration::from_secs(5)))
            .unwrap()
            .score_windows(&windows, &identity(), &CancellationToken::new())
            .unwrap();
        assert_eq!(scores.len(), 2);
    }

    #[test]
    fn test_pre_cancelled_token() {
        let data = vec![1.0, 2.0, 3.0];
        let windows = Windows::new(&data, 2).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(matches!(
            Scorer::default().score_windows(&windows, &identity(), &cancel),
            Err(AnomalyError::ReconstructionTimeout(_))
        ));
    }

    #[test]
    fn test_worker_panic_is_reconstruction_error() {
        struct Panicking;
        impl Reconstructor for Panicking {
            fn reconstruct(&self, _batch: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
                panic!("model crashed");
            }
        }

        let reconstructor: Arc<dyn Reconstructor> = Arc::new(Panicking);
        let data = vec![1.0, 2.0, 3.0];
        let windows = Windows::new(&data, 2).unwrap();
        assert!(matches!(
            Scorer::new(false, Some(Duration::from_secs(5))).unwrap().score_windows(
                &windows,
                &reconstructor,
                &CancellationToken::new()
            ),
            Err(AnomalyError::Reconstruction(_))
        ));
    }

    #[test]
    fn test_score_window_single_call() {
        let data = [0.0, 0.0, 0.0];
        let window = Window::new(3, &data);
        let score = Scorer::default()
            .score_window(&window, &OffsetReconstructor::new(-1.0))
            .unwrap();
        assert_eq!(score, WindowScore::new(3, 1.0));
    }
}
