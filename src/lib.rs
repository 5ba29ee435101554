//! # loctag
//!
//! A command-line tool that acquires a location fix, reverse-geocodes it,
//! and tags places in a local datastore.
//!
//! The heart of the crate is the acquisition engine: it consumes a noisy
//! stream of position samples, keeps the most precise usable fix, and
//! decides when to stop sampling: on reaching the accuracy target, when a
//! stationary receiver stops improving, or at the session deadline. A
//! geocode coordinator keeps at most one reverse-geocode lookup in flight
//! for the current best fix and reconciles late results.
//!
//! ## Features
//!
//! - Precision-driven sample acceptance with staleness and validity filters
//! - Bounded sessions: no-improvement exit and wall-clock deadline
//! - At-most-one in-flight reverse-geocode lookup, restarted when a better
//!   fix supersedes it
//! - Mock and Nominatim geocoder backends
//! - Tagged locations in a YAML datastore, listed by category
//! - Simulated position receiver for offline use

// Export modules for integration testing
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod geo;
pub mod geocode;
pub mod session;
pub mod simulate;
pub mod store;
