//! Location-fix acquisition for loctag.
//!
//! This module implements the refinement loop that turns a noisy stream of
//! raw position samples into one good fix. Samples arrive in delivery
//! order; each one is either adopted as the new best fix (strictly smaller
//! accuracy radius wins), tolerated as a near-duplicate, or rejected. The
//! search ends when a sample reaches the configured accuracy target, when
//! a stationary device stops improving, when the caller stops it, or when
//! the session deadline passes.
//!
//! The engine is plain synchronous state: it performs no I/O and spawns
//! nothing. Reverse-geocode work is expressed as `LookupCommand` values
//! (see the coordinator module) that the session driver executes, and
//! lookup completions are pushed back in through `geocode_completed`. Under
//! that model every mutation of `AcquisitionState` happens on one logical
//! event queue and no locking is needed.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::fmt;

use crate::coordinator::{GeocodeCoordinator, LookupCommand, LookupToken};
use crate::geo::{AuthorizationStatus, PositionSample, distance_meters};
use crate::geocode::AddressRecord;

/// Conditions the acquisition session reports to its caller. These are
/// carried as state, never raised as faults; nothing in the engine is
/// unrecoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The receiver flagged the sample as unusable (negative accuracy)
    InvalidSample,
    /// The sample was measured too long before it was delivered
    StaleSample,
    /// The session deadline passed without any usable fix
    TimedOut,
    /// Location permission is denied or restricted
    PermissionDenied,
    /// The reverse-geocode lookup failed
    GeocodeFailed,
    /// The reverse-geocode lookup was abandoned before completion
    GeocodeCancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::InvalidSample => "invalid position sample",
            ErrorKind::StaleSample => "stale position sample",
            ErrorKind::TimedOut => "timed out waiting for a location fix",
            ErrorKind::PermissionDenied => "location services disabled",
            ErrorKind::GeocodeFailed => "address lookup failed",
            ErrorKind::GeocodeCancelled => "address lookup cancelled",
        };
        write!(f, "{text}")
    }
}

/// Why a submitted sample was not adopted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Negative horizontal accuracy
    Invalid,
    /// Measured more than the staleness window before submission
    Stale,
    /// Neither an improvement on the best fix nor a duplicate of it
    NotBetter,
    /// The session deadline had already passed
    TimedOut,
}

/// Result of feeding one sample to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceOutcome {
    /// The engine was not searching; the sample was not examined
    Ignored,
    /// The sample was discarded
    Rejected(RejectReason),
    /// The sample became the new best fix and the search continues
    AcceptedNewBest,
    /// A duplicate of the best fix (same spot, same accuracy); kept the
    /// search alive but did not replace the fix
    AcceptedButNotBest,
    /// The sample ended the search, either by reaching the accuracy
    /// target or by showing no further improvement will come
    ConvergedStop,
}

/// Result of a start attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The session began and samples will now be examined
    Started,
    /// A session was already running; nothing changed
    AlreadySearching,
    /// Permission has not been decided yet; the caller should request it
    /// and try again
    AwaitingAuthorization,
    /// Permission is denied or restricted; sampling cannot begin
    PermissionDenied,
}

/// Tuning constants for the acceptance rules. The defaults reproduce the
/// behavior of a handheld GPS receiver tuned for ten-meter fixes, but every
/// threshold is a configuration input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionTuning {
    /// Accuracy radius (meters) at which the search converges
    pub desired_accuracy_m: f64,
    /// Samples measured more than this many seconds before submission are
    /// discarded as cached fixes
    pub stale_after_seconds: f64,
    /// Two samples closer than this (meters) count as the same spot
    pub same_spot_radius_m: f64,
    /// Give up on further improvement after this long at the same spot
    pub no_improvement_seconds: f64,
    /// Wall-clock budget for the whole session
    pub deadline_seconds: f64,
}

impl Default for AcquisitionTuning {
    fn default() -> Self {
        Self {
            desired_accuracy_m: 10.0,
            stale_after_seconds: 5.0,
            same_spot_radius_m: 1.0,
            no_improvement_seconds: 10.0,
            deadline_seconds: 60.0,
        }
    }
}

fn seconds(value: f64) -> Duration {
    Duration::milliseconds((value * 1000.0) as i64)
}

/// Snapshot of one acquisition session, published to the caller after
/// every processed input.
///
/// `resolved_address` may lag behind `best_sample`: when a better sample
/// arrives while its lookup is still out, the address belongs to the prior
/// fix until the superseding lookup completes. Callers should treat the
/// address as provisional while `geocode_in_flight` is true.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcquisitionState {
    /// The most precise usable sample seen this session
    pub best_sample: Option<PositionSample>,
    /// Whether samples are currently being examined
    pub is_searching: bool,
    /// Last session-level error (timeout, permission)
    pub last_sample_error: Option<ErrorKind>,
    /// Whether a reverse-geocode lookup is outstanding
    pub geocode_in_flight: bool,
    /// Address of the best sample (or of a slightly older fix while a
    /// superseding lookup is in flight)
    pub resolved_address: Option<AddressRecord>,
    /// Last reverse-geocode failure, if any
    pub last_geocode_error: Option<ErrorKind>,
    /// When the current session gives up
    pub session_deadline: Option<DateTime<Utc>>,
}

impl AcquisitionState {
    /// Whether a usable fix is held
    pub fn has_fix(&self) -> bool {
        self.best_sample.is_some()
    }

    /// One-line status for display, mirroring the searching / found /
    /// error distinctions a UI needs
    pub fn status_line(&self) -> String {
        if let Some(sample) = &self.best_sample {
            let address = match &self.resolved_address {
                Some(address) => address.formatted_address.clone(),
                None if self.geocode_in_flight => "Searching for Address...".to_string(),
                None if self.last_geocode_error.is_some() => "Error Finding Address".to_string(),
                None => "No Address Found".to_string(),
            };
            format!(
                "{:.8}, {:.8} ({:.0} m) - {}",
                sample.coordinate.latitude,
                sample.coordinate.longitude,
                sample.horizontal_accuracy,
                address
            )
        } else if let Some(error) = self.last_sample_error {
            match error {
                ErrorKind::PermissionDenied => "Location Services Disabled".to_string(),
                ErrorKind::TimedOut => "Timed Out".to_string(),
                _ => "Error Getting Location".to_string(),
            }
        } else if self.is_searching {
            "Searching...".to_string()
        } else {
            String::new()
        }
    }
}

/// The acquisition engine: one session's acceptance state plus its
/// geocode coordination
#[derive(Debug, Default)]
pub struct AcquisitionEngine {
    tuning: AcquisitionTuning,
    state: AcquisitionState,
    coordinator: GeocodeCoordinator,
}

impl AcquisitionEngine {
    pub fn new(tuning: AcquisitionTuning) -> Self {
        Self {
            tuning,
            state: AcquisitionState::default(),
            coordinator: GeocodeCoordinator::new(),
        }
    }

    /// Current session snapshot
    pub fn state(&self) -> &AcquisitionState {
        &self.state
    }

    pub fn tuning(&self) -> &AcquisitionTuning {
        &self.tuning
    }

    /// Begins a session: resets all session state and arms the deadline.
    /// A no-op while a session is already running. Sampling never begins
    /// without authorization; a denied or restricted status is surfaced
    /// as `PermissionDenied` state.
    pub fn start(
        &mut self,
        authorization: AuthorizationStatus,
        now: DateTime<Utc>,
    ) -> (StartOutcome, Vec<LookupCommand>) {
        if self.state.is_searching {
            return (StartOutcome::AlreadySearching, Vec::new());
        }

        match authorization {
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                warn!("cannot start acquisition: location permission {authorization:?}");
                self.state.last_sample_error = Some(ErrorKind::PermissionDenied);
                (StartOutcome::PermissionDenied, Vec::new())
            }
            AuthorizationStatus::Undetermined => {
                (StartOutcome::AwaitingAuthorization, Vec::new())
            }
            AuthorizationStatus::Authorized => {
                let mut commands = Vec::new();
                self.state = AcquisitionState {
                    is_searching: true,
                    session_deadline: Some(now + seconds(self.tuning.deadline_seconds)),
                    ..Default::default()
                };
                self.coordinator.reset(&mut self.state, &mut commands);
                info!(
                    "acquisition started, deadline in {:.0}s",
                    self.tuning.deadline_seconds
                );
                (StartOutcome::Started, commands)
            }
        }
    }

    /// Ends the session on the caller's request. The last good fix and
    /// resolved address remain visible; an in-flight lookup is abandoned.
    pub fn stop(&mut self) -> Vec<LookupCommand> {
        let mut commands = Vec::new();
        if self.state.is_searching {
            info!("acquisition stopped by caller");
        }
        self.end_search();
        self.coordinator.cancel(&mut self.state, &mut commands);
        commands
    }

    /// Examines one raw sample. Called once per incoming sample while
    /// searching; a no-op otherwise.
    pub fn submit(
        &mut self,
        sample: &PositionSample,
        now: DateTime<Utc>,
    ) -> (AcceptanceOutcome, Vec<LookupCommand>) {
        if !self.state.is_searching {
            return (AcceptanceOutcome::Ignored, Vec::new());
        }

        let mut commands = Vec::new();

        // The deadline is evaluated lazily here as well as by the session
        // timer; whichever fires first ends the session.
        if self.deadline_passed(now) {
            self.finish_timed_out(&mut commands);
            return (
                AcceptanceOutcome::Rejected(RejectReason::TimedOut),
                commands,
            );
        }

        if !sample.is_valid() {
            debug!(
                "rejecting invalid sample (accuracy {})",
                sample.horizontal_accuracy
            );
            return (AcceptanceOutcome::Rejected(RejectReason::Invalid), commands);
        }

        // Cached fixes from before the session are useless
        if now.signed_duration_since(sample.timestamp) > seconds(self.tuning.stale_after_seconds) {
            debug!("rejecting stale sample from {}", sample.timestamp);
            return (AcceptanceOutcome::Rejected(RejectReason::Stale), commands);
        }

        let (distance, best_accuracy, best_timestamp) = match &self.state.best_sample {
            Some(best) => (
                distance_meters(best.coordinate, sample.coordinate),
                best.horizontal_accuracy,
                best.timestamp,
            ),
            None => (f64::INFINITY, f64::INFINITY, sample.timestamp),
        };

        if self.state.best_sample.is_none() || sample.horizontal_accuracy < best_accuracy {
            // Strictly better precision wins; accuracy only ever improves
            // within a session
            self.state.best_sample = Some(sample.clone());
            self.state.last_sample_error = None;

            if sample.horizontal_accuracy <= self.tuning.desired_accuracy_m && distance > 0.0 {
                info!(
                    "converged at {:.1} m accuracy, stopping search",
                    sample.horizontal_accuracy
                );
                self.end_search();
                // The committed address, if any, belongs to a worse fix;
                // force a fresh lookup for the converged sample
                self.coordinator
                    .on_accepted_sample(&mut self.state, sample, &mut commands);
                return (AcceptanceOutcome::ConvergedStop, commands);
            }

            debug!(
                "new best fix at {:.1} m accuracy",
                sample.horizontal_accuracy
            );
            self.coordinator
                .on_accepted_sample(&mut self.state, sample, &mut commands);
            return (AcceptanceOutcome::AcceptedNewBest, commands);
        }

        if distance < self.tuning.same_spot_radius_m {
            // Same physical spot with no gain in precision. A receiver
            // that sits here long enough is not going to do better.
            let elapsed = sample.timestamp.signed_duration_since(best_timestamp);
            if elapsed > seconds(self.tuning.no_improvement_seconds) {
                info!("no improvement for {}s, stopping search", elapsed.num_seconds());
                self.end_search();
                return (AcceptanceOutcome::ConvergedStop, commands);
            }
            if sample.horizontal_accuracy == best_accuracy {
                return (AcceptanceOutcome::AcceptedButNotBest, commands);
            }
            return (
                AcceptanceOutcome::Rejected(RejectReason::NotBetter),
                commands,
            );
        }

        (
            AcceptanceOutcome::Rejected(RejectReason::NotBetter),
            commands,
        )
    }

    /// The session timer's delivery path for the deadline. A no-op unless
    /// a session is running and the deadline has truly passed.
    pub fn deadline_elapsed(&mut self, now: DateTime<Utc>) -> Vec<LookupCommand> {
        let mut commands = Vec::new();
        if self.state.is_searching && self.deadline_passed(now) {
            self.finish_timed_out(&mut commands);
        }
        commands
    }

    /// Delivery path for a finished reverse-geocode lookup.
    pub fn geocode_completed(
        &mut self,
        token: LookupToken,
        requested: &PositionSample,
        outcome: Result<AddressRecord, ErrorKind>,
    ) -> Vec<LookupCommand> {
        let mut commands = Vec::new();
        self.coordinator.on_lookup_complete(
            &mut self.state,
            token,
            requested,
            outcome,
            &mut commands,
        );
        commands
    }

    fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        self.state
            .session_deadline
            .is_some_and(|deadline| now >= deadline)
    }

    fn end_search(&mut self) {
        self.state.is_searching = false;
        self.state.session_deadline = None;
    }

    fn finish_timed_out(&mut self, commands: &mut Vec<LookupCommand>) {
        self.end_search();
        if self.state.best_sample.is_none() {
            // A timeout with a fix in hand is not an error; only a fixless
            // session surfaces one
            warn!("acquisition timed out with no usable fix");
            self.state.last_sample_error = Some(ErrorKind::TimedOut);
            self.coordinator.cancel(&mut self.state, commands);
        } else {
            info!("deadline reached, keeping best fix");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::LookupCommand;
    use crate::geo::Coordinate;
    use chrono::TimeZone;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn sample(lat: f64, lon: f64, accuracy: f64, at: DateTime<Utc>) -> PositionSample {
        PositionSample::new(Coordinate::new(lat, lon), accuracy, at)
    }

    fn started_engine() -> (AcquisitionEngine, DateTime<Utc>) {
        let mut engine = AcquisitionEngine::new(AcquisitionTuning::default());
        let now = base_time();
        let (outcome, _) = engine.start(AuthorizationStatus::Authorized, now);
        assert_eq!(outcome, StartOutcome::Started);
        (engine, now)
    }

    #[test]
    fn test_start_resets_state_and_arms_deadline() {
        let (engine, now) = started_engine();

        let state = engine.state();
        assert!(state.is_searching);
        assert!(state.best_sample.is_none());
        assert_eq!(
            state.session_deadline,
            Some(now + Duration::seconds(60))
        );
    }

    #[test]
    fn test_start_is_idempotent_while_searching() {
        let (mut engine, now) = started_engine();

        let (outcome, _) = engine.submit(&sample(41.9, -87.6, 30.0, now), now);
        assert_eq!(outcome, AcceptanceOutcome::AcceptedNewBest);

        let (again, commands) = engine.start(AuthorizationStatus::Authorized, now);
        assert_eq!(again, StartOutcome::AlreadySearching);
        assert!(commands.is_empty());
        assert!(engine.state().best_sample.is_some());
    }

    #[test]
    fn test_start_denied_surfaces_permission_error() {
        let mut engine = AcquisitionEngine::new(AcquisitionTuning::default());
        let (outcome, _) = engine.start(AuthorizationStatus::Denied, base_time());

        assert_eq!(outcome, StartOutcome::PermissionDenied);
        assert!(!engine.state().is_searching);
        assert_eq!(
            engine.state().last_sample_error,
            Some(ErrorKind::PermissionDenied)
        );
    }

    #[test]
    fn test_start_undetermined_defers_without_error() {
        let mut engine = AcquisitionEngine::new(AcquisitionTuning::default());
        let (outcome, _) = engine.start(AuthorizationStatus::Undetermined, base_time());

        assert_eq!(outcome, StartOutcome::AwaitingAuthorization);
        assert!(!engine.state().is_searching);
        assert!(engine.state().last_sample_error.is_none());
    }

    #[test]
    fn test_submit_ignored_when_not_searching() {
        let mut engine = AcquisitionEngine::new(AcquisitionTuning::default());
        let now = base_time();

        let (outcome, commands) = engine.submit(&sample(41.9, -87.6, 10.0, now), now);
        assert_eq!(outcome, AcceptanceOutcome::Ignored);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_invalid_sample_rejected_without_error_state() {
        let (mut engine, now) = started_engine();

        let (outcome, _) = engine.submit(&sample(41.9, -87.6, -1.0, now), now);
        assert_eq!(
            outcome,
            AcceptanceOutcome::Rejected(RejectReason::Invalid)
        );
        // Routine sensor noise is absorbed silently
        assert!(engine.state().last_sample_error.is_none());
        assert!(engine.state().is_searching);
    }

    #[test]
    fn test_stale_sample_rejected() {
        let (mut engine, now) = started_engine();
        let old = sample(41.9, -87.6, 10.0, now - Duration::seconds(6));

        let (outcome, _) = engine.submit(&old, now);
        assert_eq!(outcome, AcceptanceOutcome::Rejected(RejectReason::Stale));
        assert!(engine.state().best_sample.is_none());
    }

    #[test]
    fn test_first_sample_becomes_best_and_starts_lookup() {
        let (mut engine, now) = started_engine();
        let first = sample(41.9, -87.6, 50.0, now);

        let (outcome, commands) = engine.submit(&first, now);
        assert_eq!(outcome, AcceptanceOutcome::AcceptedNewBest);
        assert_eq!(engine.state().best_sample, Some(first.clone()));
        assert!(engine.state().geocode_in_flight);
        assert!(matches!(
            commands.as_slice(),
            [LookupCommand::Start { sample: s, .. }] if *s == first
        ));
    }

    #[test]
    fn test_worse_sample_rejected_not_better() {
        let (mut engine, now) = started_engine();
        engine.submit(&sample(41.9, -87.6, 30.0, now), now);

        let worse = sample(41.91, -87.61, 80.0, now + Duration::seconds(1));
        let (outcome, commands) = engine.submit(&worse, now + Duration::seconds(1));

        assert_eq!(
            outcome,
            AcceptanceOutcome::Rejected(RejectReason::NotBetter)
        );
        assert!(commands.is_empty());
        assert_eq!(
            engine.state().best_sample.as_ref().unwrap().horizontal_accuracy,
            30.0
        );
    }

    #[test]
    fn test_equal_accuracy_duplicate_is_tolerated() {
        let (mut engine, now) = started_engine();
        engine.submit(&sample(41.9, -87.6, 30.0, now), now);

        let later = now + Duration::seconds(2);
        let duplicate = sample(41.9, -87.6, 30.0, later);
        let (outcome, _) = engine.submit(&duplicate, later);

        assert_eq!(outcome, AcceptanceOutcome::AcceptedButNotBest);
        // The fix itself is unchanged
        assert_eq!(
            engine.state().best_sample.as_ref().unwrap().timestamp,
            now
        );
    }

    #[test]
    fn test_accuracy_never_regresses() {
        let (mut engine, mut now) = started_engine();
        let accuracies = [80.0, 40.0, 55.0, 25.0, 90.0, 25.0, 12.0];
        let mut last_best = f64::INFINITY;

        for accuracy in accuracies {
            now += Duration::seconds(1);
            engine.submit(&sample(41.9, -87.6, accuracy, now), now);
            let best = engine.state().best_sample.as_ref().unwrap().horizontal_accuracy;
            assert!(best <= last_best, "accuracy regressed from {last_best} to {best}");
            last_best = best;
        }
        assert_eq!(last_best, 12.0);
    }

    #[test]
    fn test_convergence_at_accuracy_target() {
        let (mut engine, now) = started_engine();
        engine.submit(&sample(41.9, -87.6, 50.0, now), now);

        let later = now + Duration::seconds(1);
        let (outcome, _) = engine.submit(&sample(41.9002, -87.6, 8.0, later), later);

        assert_eq!(outcome, AcceptanceOutcome::ConvergedStop);
        assert!(!engine.state().is_searching);
        assert!(engine.state().session_deadline.is_none());
        // The converged fix still wants an address
        assert!(engine.state().geocode_in_flight);
    }

    #[test]
    fn test_converged_stop_forces_fresh_lookup() {
        let (mut engine, now) = started_engine();
        let first = sample(41.9, -87.6, 50.0, now);
        let (_, commands) = engine.submit(&first, now);
        let first_token = match commands.as_slice() {
            [LookupCommand::Start { token, .. }] => *token,
            other => panic!("expected one start command, got {other:?}"),
        };

        let later = now + Duration::seconds(1);
        let better = sample(41.9002, -87.6, 8.0, later);
        let (outcome, commands) = engine.submit(&better, later);

        assert_eq!(outcome, AcceptanceOutcome::ConvergedStop);
        assert!(matches!(
            commands.as_slice(),
            [
                LookupCommand::Cancel { token },
                LookupCommand::Start { sample: s, .. },
            ] if *token == first_token && *s == better
        ));
    }

    #[test]
    fn test_stationary_exit_after_no_improvement_window() {
        let (mut engine, now) = started_engine();
        engine.submit(&sample(41.9, -87.6, 30.0, now), now);

        // Within the window: still searching
        let mid = now + Duration::seconds(5);
        let (outcome, _) = engine.submit(&sample(41.900001, -87.6, 40.0, mid), mid);
        assert_eq!(
            outcome,
            AcceptanceOutcome::Rejected(RejectReason::NotBetter)
        );
        assert!(engine.state().is_searching);

        // Past the window: force stop
        let late = now + Duration::seconds(11);
        let (outcome, _) = engine.submit(&sample(41.900001, -87.6, 40.0, late), late);
        assert_eq!(outcome, AcceptanceOutcome::ConvergedStop);
        assert!(!engine.state().is_searching);
    }

    #[test]
    fn test_deadline_rejects_and_records_timeout_without_fix() {
        let (mut engine, now) = started_engine();

        let late = now + Duration::seconds(61);
        let (outcome, _) = engine.submit(&sample(41.9, -87.6, 5.0, late), late);

        assert_eq!(outcome, AcceptanceOutcome::Rejected(RejectReason::TimedOut));
        assert!(!engine.state().is_searching);
        assert_eq!(engine.state().last_sample_error, Some(ErrorKind::TimedOut));
    }

    #[test]
    fn test_deadline_with_fix_held_is_not_an_error() {
        let (mut engine, now) = started_engine();
        engine.submit(&sample(41.9, -87.6, 30.0, now), now);

        let commands = engine.deadline_elapsed(now + Duration::seconds(61));

        assert!(!engine.state().is_searching);
        assert!(engine.state().last_sample_error.is_none());
        assert!(engine.state().has_fix());
        // The pending lookup is left to settle
        assert!(engine.state().geocode_in_flight);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_deadline_timer_before_deadline_is_noop() {
        let (mut engine, now) = started_engine();
        engine.deadline_elapsed(now + Duration::seconds(30));
        assert!(engine.state().is_searching);
    }

    #[test]
    fn test_stop_keeps_fix_and_cancels_lookup() {
        let (mut engine, now) = started_engine();
        engine.submit(&sample(41.9, -87.6, 30.0, now), now);
        assert!(engine.state().geocode_in_flight);

        let commands = engine.stop();

        let state = engine.state();
        assert!(!state.is_searching);
        assert!(!state.geocode_in_flight);
        assert!(state.has_fix());
        assert_eq!(state.last_geocode_error, Some(ErrorKind::GeocodeCancelled));
        assert!(matches!(commands.as_slice(), [LookupCommand::Cancel { .. }]));
    }

    #[test]
    fn test_status_line_transitions() {
        let mut engine = AcquisitionEngine::new(AcquisitionTuning::default());
        assert_eq!(engine.state().status_line(), "");

        let now = base_time();
        engine.start(AuthorizationStatus::Authorized, now);
        assert_eq!(engine.state().status_line(), "Searching...");

        engine.submit(&sample(41.9, -87.6, 30.0, now), now);
        assert!(
            engine
                .state()
                .status_line()
                .contains("Searching for Address...")
        );
    }
}
