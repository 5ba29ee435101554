//! Geocode lookup coordination.
//!
//! The acquisition engine wants the address of whatever fix it currently
//! holds, but lookups are asynchronous and may finish long after the fix
//! they were issued for has been superseded. The `GeocodeCoordinator`
//! keeps at most one lookup in flight, restarts it when a better sample
//! arrives, and reconciles late completions against the best sample held
//! at the moment the completion is processed.
//!
//! Each lookup carries a `LookupToken` from a monotonically increasing
//! generation counter; a completion is honored only if its token matches
//! the coordinator's current one. Cancellation therefore never has to wait
//! for the external geocoder: the token is retired and any late result is
//! discarded on arrival.

use log::{debug, info};

use crate::engine::{AcquisitionState, ErrorKind};
use crate::geo::PositionSample;
use crate::geocode::AddressRecord;

/// Identifies one issued lookup; stale tokens never match again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LookupToken(u64);

/// Outbound request the session driver executes against the external
/// geocoder
#[derive(Debug, Clone, PartialEq)]
pub enum LookupCommand {
    /// Begin a reverse-geocode lookup for `sample`
    Start {
        token: LookupToken,
        sample: PositionSample,
    },
    /// Abandon the lookup identified by `token`; its result, if it still
    /// arrives, will be discarded
    Cancel { token: LookupToken },
}

#[derive(Debug)]
struct PendingLookup {
    token: LookupToken,
    sample: PositionSample,
}

/// Tracks the single outstanding reverse-geocode request for a session
#[derive(Debug, Default)]
pub struct GeocodeCoordinator {
    next_token: u64,
    pending: Option<PendingLookup>,
}

impl GeocodeCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the pending lookup at session start. The token counter is
    /// not reset, so completions from a previous session can never match.
    pub fn reset(&mut self, state: &mut AcquisitionState, commands: &mut Vec<LookupCommand>) {
        if let Some(pending) = self.pending.take() {
            commands.push(LookupCommand::Cancel {
                token: pending.token,
            });
        }
        state.geocode_in_flight = false;
    }

    fn issue(
        &mut self,
        state: &mut AcquisitionState,
        sample: &PositionSample,
        commands: &mut Vec<LookupCommand>,
    ) {
        self.next_token += 1;
        let token = LookupToken(self.next_token);
        self.pending = Some(PendingLookup {
            token,
            sample: sample.clone(),
        });
        state.geocode_in_flight = true;
        debug!(
            "starting reverse geocode for {:.6}, {:.6}",
            sample.coordinate.latitude, sample.coordinate.longitude
        );
        commands.push(LookupCommand::Start {
            token,
            sample: sample.clone(),
        });
    }

    /// Called whenever the engine adopts a new best sample. If a lookup is
    /// in flight for a different sample it is superseded; a lookup already
    /// in flight for this very sample is left alone.
    pub fn on_accepted_sample(
        &mut self,
        state: &mut AcquisitionState,
        sample: &PositionSample,
        commands: &mut Vec<LookupCommand>,
    ) {
        match &self.pending {
            Some(pending) if pending.sample == *sample => {}
            Some(pending) => {
                debug!("superseding in-flight geocode lookup");
                commands.push(LookupCommand::Cancel {
                    token: pending.token,
                });
                self.issue(state, sample, commands);
            }
            None => self.issue(state, sample, commands),
        }
    }

    /// Reconciles a finished lookup with the engine's current best sample.
    /// Stale results (wrong token, or the requested sample is no longer
    /// best) are discarded; while the engine is still searching, a lookup
    /// for the current best sample is re-issued in their place.
    pub fn on_lookup_complete(
        &mut self,
        state: &mut AcquisitionState,
        token: LookupToken,
        requested: &PositionSample,
        outcome: Result<AddressRecord, ErrorKind>,
        commands: &mut Vec<LookupCommand>,
    ) {
        let current = self.pending.as_ref().is_some_and(|p| p.token == token);
        if !current {
            debug!("discarding geocode result for a cancelled or superseded lookup");
            self.reissue_if_needed(state, commands);
            return;
        }

        let still_best = state
            .best_sample
            .as_ref()
            .is_some_and(|best| best == requested);
        if !still_best {
            debug!("geocode result arrived for a superseded sample");
            self.pending = None;
            state.geocode_in_flight = false;
            self.reissue_if_needed(state, commands);
            return;
        }

        self.pending = None;
        state.geocode_in_flight = false;
        match outcome {
            Ok(address) => {
                if state.resolved_address.is_none() {
                    info!("address resolved: {}", address.formatted_address);
                }
                state.resolved_address = Some(address);
                state.last_geocode_error = None;
            }
            Err(kind) => {
                debug!("reverse geocode failed: {kind}");
                state.resolved_address = None;
                state.last_geocode_error = Some(kind);
            }
        }
    }

    /// Abandons the in-flight lookup, if any. `geocode_in_flight` drops
    /// immediately so a later accepted sample can start fresh without
    /// waiting for the stale result.
    pub fn cancel(&mut self, state: &mut AcquisitionState, commands: &mut Vec<LookupCommand>) {
        if let Some(pending) = self.pending.take() {
            state.geocode_in_flight = false;
            state.last_geocode_error = Some(ErrorKind::GeocodeCancelled);
            commands.push(LookupCommand::Cancel {
                token: pending.token,
            });
        }
    }

    fn reissue_if_needed(
        &mut self,
        state: &mut AcquisitionState,
        commands: &mut Vec<LookupCommand>,
    ) {
        if state.is_searching && !state.geocode_in_flight {
            if let Some(best) = state.best_sample.clone() {
                self.issue(state, &best, commands);
            }
        }
    }
}
