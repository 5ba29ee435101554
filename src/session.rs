//! Acquisition session driver for loctag.
//!
//! This module runs one location-fix session end to end: it feeds position
//! samples from a stream into the acquisition engine, executes the lookup
//! commands the engine emits (one tokio task per reverse-geocode request),
//! delivers lookup completions and the session deadline back into the
//! engine, and publishes an `AcquisitionState` snapshot after every
//! processed input.
//!
//! All engine state is owned by the driver task; samples, completions, and
//! the deadline are serialized through one `select!` loop, so the engine
//! sees the single-threaded event queue it is written for. Aborting a
//! lookup task is best-effort; a completion that slips through is
//! discarded by its stale token.

use futures::{Stream, StreamExt, pin_mut};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::clock::{Clock, SystemClock};
use crate::coordinator::{LookupCommand, LookupToken};
use crate::engine::{AcquisitionEngine, AcquisitionState, AcquisitionTuning, ErrorKind, StartOutcome};
use crate::geo::{AuthorizationStatus, PositionSample};
use crate::geocode::{AddressRecord, Geocoder};

/// Result of one finished lookup task, echoing the sample it was
/// requested for so the engine can reconcile it against the current best
struct LookupCompletion {
    token: LookupToken,
    requested: PositionSample,
    outcome: Result<AddressRecord, ErrorKind>,
}

/// Runs acquisition sessions against a geocoder and a clock
pub struct AcquisitionSession {
    tuning: AcquisitionTuning,
    geocoder: Arc<dyn Geocoder>,
    clock: Arc<dyn Clock>,
}

impl AcquisitionSession {
    pub fn new(tuning: AcquisitionTuning, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            tuning,
            geocoder,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the wall clock, for tests that drive time themselves
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Runs one session to completion: until the search has ended and no
    /// lookup remains in flight. Every processed input publishes a state
    /// snapshot on `updates`. The final state is returned; errors are
    /// carried in it, never raised.
    pub async fn run<S>(
        &self,
        authorization: AuthorizationStatus,
        samples: S,
        updates: &watch::Sender<AcquisitionState>,
    ) -> AcquisitionState
    where
        S: Stream<Item = PositionSample>,
    {
        let mut engine = AcquisitionEngine::new(self.tuning);
        let (outcome, commands) = engine.start(authorization, self.clock.now());

        let (completion_tx, mut completion_rx) = mpsc::channel::<LookupCompletion>(4);
        let mut tasks: HashMap<LookupToken, JoinHandle<()>> = HashMap::new();

        self.execute(commands, &mut tasks, &completion_tx);
        updates.send_replace(engine.state().clone());

        if outcome != StartOutcome::Started {
            debug!("session did not start: {outcome:?}");
            return engine.state().clone();
        }

        // The deadline timer is armed once at session start; the engine
        // also checks it lazily on every submitted sample.
        let deadline = tokio::time::sleep(Duration::from_secs_f64(self.tuning.deadline_seconds));
        tokio::pin!(deadline);
        let mut deadline_fired = false;

        pin_mut!(samples);

        loop {
            tokio::select! {
                _ = &mut deadline, if !deadline_fired => {
                    deadline_fired = true;
                    let commands = engine.deadline_elapsed(self.clock.now());
                    self.execute(commands, &mut tasks, &completion_tx);
                    updates.send_replace(engine.state().clone());
                }
                maybe_sample = samples.next(), if engine.state().is_searching => {
                    let commands = match maybe_sample {
                        Some(sample) => {
                            let (outcome, commands) =
                                engine.submit(&sample, self.clock.now());
                            debug!("sample outcome: {outcome:?}");
                            commands
                        }
                        None => {
                            warn!("position source ended while searching");
                            engine.stop()
                        }
                    };
                    self.execute(commands, &mut tasks, &completion_tx);
                    updates.send_replace(engine.state().clone());
                }
                Some(completion) = completion_rx.recv() => {
                    tasks.remove(&completion.token);
                    let commands = engine.geocode_completed(
                        completion.token,
                        &completion.requested,
                        completion.outcome,
                    );
                    self.execute(commands, &mut tasks, &completion_tx);
                    updates.send_replace(engine.state().clone());
                }
            }

            let state = engine.state();
            if !state.is_searching && !state.geocode_in_flight {
                break;
            }
        }

        for handle in tasks.into_values() {
            handle.abort();
        }

        engine.state().clone()
    }

    fn execute(
        &self,
        commands: Vec<LookupCommand>,
        tasks: &mut HashMap<LookupToken, JoinHandle<()>>,
        completion_tx: &mpsc::Sender<LookupCompletion>,
    ) {
        for command in commands {
            match command {
                LookupCommand::Start { token, sample } => {
                    let geocoder = Arc::clone(&self.geocoder);
                    let tx = completion_tx.clone();
                    let handle = tokio::spawn(async move {
                        let outcome = geocoder
                            .reverse_geocode(sample.coordinate)
                            .await
                            .map_err(|error| {
                                debug!("reverse geocode failed: {error:#}");
                                ErrorKind::GeocodeFailed
                            });
                        let _ = tx
                            .send(LookupCompletion {
                                token,
                                requested: sample,
                                outcome,
                            })
                            .await;
                    });
                    tasks.insert(token, handle);
                }
                LookupCommand::Cancel { token } => {
                    if let Some(handle) = tasks.remove(&token) {
                        handle.abort();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::geocode::MockGeocoder;
    use chrono::Utc;
    use futures::stream;

    #[tokio::test]
    async fn test_session_converges_and_resolves_address() {
        let session = AcquisitionSession::new(
            AcquisitionTuning::default(),
            Arc::new(MockGeocoder),
        );
        let now = Utc::now();
        let samples = stream::iter(vec![
            PositionSample::new(Coordinate::new(41.88, -87.63), 60.0, now),
            PositionSample::new(Coordinate::new(41.8781, -87.6298), 8.0, now),
        ]);

        let (updates, _watcher) = watch::channel(AcquisitionState::default());
        let state = session
            .run(AuthorizationStatus::Authorized, samples, &updates)
            .await;

        assert!(!state.is_searching);
        assert!(!state.geocode_in_flight);
        assert_eq!(
            state.best_sample.as_ref().map(|s| s.horizontal_accuracy),
            Some(8.0)
        );
        assert_eq!(
            state.resolved_address.as_ref().and_then(|a| a.city.clone()),
            Some("Chicago".to_string())
        );
    }

    #[tokio::test]
    async fn test_session_refuses_without_permission() {
        let session = AcquisitionSession::new(
            AcquisitionTuning::default(),
            Arc::new(MockGeocoder),
        );
        let (updates, _watcher) = watch::channel(AcquisitionState::default());

        let state = session
            .run(
                AuthorizationStatus::Denied,
                stream::pending(),
                &updates,
            )
            .await;

        assert!(!state.is_searching);
        assert_eq!(state.last_sample_error, Some(ErrorKind::PermissionDenied));
    }
}
