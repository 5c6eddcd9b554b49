//! Basic example demonstrating window anomaly detection
//!
//! Run with: cargo run --example basic -p window-anomaly

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use window_anomaly::{
    BoundaryPolicy, DetectorConfig, FnReconstructor, Reconstructor, Series, WindowAnomalyDetector,
};

/// Stand-in for a trained model that only reproduces the normal range.
fn bounded_model() -> impl Reconstructor {
    FnReconstructor::new(|row: &[f64]| row.iter().map(|v| v.clamp(-2.0, 2.0)).collect())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "window_anomaly_core=info".into()),
        )
        .init();

    println!("=== window-anomaly Basic Example ===\n");

    // Four days of five-minute samples, one period per day
    let normal: Vec<f64> = (0..1_152)
        .map(|i| 20.0 + 5.0 * (2.0 * std::f64::consts::PI * i as f64 / 288.0).sin())
        .collect();
    let mut with_anomaly = normal.clone();
    for v in &mut with_anomaly[600..640] {
        *v += 25.0;
    }

    let training = Series::from_regular(1_388_534_400, 300, normal)?;
    let test = Series::from_regular(1_388_534_400, 300, with_anomaly)?;

    for boundary in [BoundaryPolicy::Clamped, BoundaryPolicy::InteriorOnly] {
        let config = DetectorConfig::new(288)
            .with_boundary(boundary)
            .with_parallel(true);
        let fitted = WindowAnomalyDetector::new(config, bounded_model())?.fit(&training)?;
        let report = fitted.detect(&test)?;

        println!("Boundary policy: {:?}", boundary);
        println!("   Threshold: {:.4}", report.threshold.value());
        println!("   Flagged windows: {}", report.flagged_window_count());
        println!("   Anomalous points: {}", report.anomaly_count());
        println!("   Unevaluated points: {}", report.unevaluated_count());

        let points = report.anomalous_points(&test);
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            println!("   First anomaly: t={} value={:.2}", first.timestamp, first.value);
            println!("   Last anomaly:  t={} value={:.2}", last.timestamp, last.value);
        }
        println!();
    }

    println!("=== Example Complete ===");
    Ok(())
}
