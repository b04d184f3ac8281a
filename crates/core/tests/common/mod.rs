//! Common test utilities for orchestrator integration tests.
//!
//! The npm/node collaborators are replaced by small `sh` scripts that honour
//! the same environment and argument contract.

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
