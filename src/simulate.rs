//! Simulated position receiver.
//!
//! There is no GPS hardware on the machines this tool runs on, so the
//! `acquire` flow is driven by a simulated receiver: a sample stream that
//! starts with a wide accuracy radius and tightens toward a target
//! coordinate with random jitter, the way a real receiver converges after
//! a cold start. A deterministic fix sequence is also provided for tests
//! that need repeatable input.

use chrono::Utc;
use futures::{Stream, stream};
use rand::Rng;
use std::time::Duration;

use crate::geo::{Coordinate, PositionSample};

/// One degree of latitude is roughly 111 km; used to convert meter-scale
/// jitter into degree offsets
const DEGREES_PER_METER: f64 = 1.0 / 111_000.0;

/// Behavior of the simulated receiver
#[derive(Debug, Clone, Copy)]
pub struct SimulationSettings {
    /// Where the receiver eventually settles
    pub target: Coordinate,
    /// Accuracy radius of the first sample, meters
    pub initial_accuracy_m: f64,
    /// Each sample's accuracy is the previous one multiplied by this
    pub improvement_factor: f64,
    /// Delay between samples
    pub sample_interval: Duration,
    /// Chance in [0, 1] that a sample is flagged invalid
    pub invalid_sample_rate: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            // The Willis Tower, a recognizable spot inside the mock
            // geocoder's Chicago range
            target: Coordinate::new(41.8789, -87.6359),
            initial_accuracy_m: 120.0,
            improvement_factor: 0.7,
            sample_interval: Duration::from_millis(400),
            invalid_sample_rate: 0.1,
        }
    }
}

/// Produces one sample around the target: the coordinate is jittered by
/// up to the accuracy radius, and occasionally the sample comes back
/// flagged invalid.
fn next_sample(settings: &SimulationSettings, accuracy: f64) -> PositionSample {
    let mut rng = rand::thread_rng();

    if rng.r#gen::<f64>() < settings.invalid_sample_rate {
        return PositionSample::new(settings.target, -1.0, Utc::now());
    }

    let spread = accuracy * DEGREES_PER_METER;
    let latitude = settings.target.latitude + rng.gen_range(-spread..spread);
    let longitude = settings.target.longitude + rng.gen_range(-spread..spread);

    // Reported accuracy wobbles around the true radius
    let reported = accuracy * rng.gen_range(0.8..1.2);

    PositionSample::new(Coordinate::new(latitude, longitude), reported, Utc::now())
}

/// An endless stream of samples converging on the configured target.
/// The session's own stop rules decide when to quit listening.
pub fn sample_stream(settings: SimulationSettings) -> impl Stream<Item = PositionSample> {
    stream::unfold(settings.initial_accuracy_m, move |accuracy| async move {
        tokio::time::sleep(settings.sample_interval).await;
        let sample = next_sample(&settings, accuracy);
        let next_accuracy = (accuracy * settings.improvement_factor).max(1.0);
        Some((sample, next_accuracy))
    })
}

/// A short, deterministic convergence: wide fix, better fix, then a fix
/// under the default ten-meter target. Timestamps are "now" so the
/// staleness filter passes.
pub fn fix_sequence(target: Coordinate) -> Vec<PositionSample> {
    let now = Utc::now();
    vec![
        PositionSample::new(
            Coordinate::new(target.latitude + 0.0005, target.longitude),
            80.0,
            now,
        ),
        PositionSample::new(
            Coordinate::new(target.latitude + 0.0002, target.longitude),
            35.0,
            now,
        ),
        PositionSample::new(target, 8.0, now),
    ]
}
