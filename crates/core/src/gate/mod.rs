//! Filesystem gates between independently spawned collaborators.
//!
//! The extraction drivers share no channel with each other or with the
//! orchestrator, so ordering is expressed through files:
//! - a stale render tree is removed before a run so it cannot be mistaken for
//!   fresh output;
//! - a per-run signal file is posted by one driver and polled by the other.

pub mod artifact;
pub mod error;
pub mod signal;

pub use artifact::remove_stale_artifact;
pub use error::{GateError, GateResult};
pub use signal::SignalFile;
