//! # ba-core
//!
//! Pipeline orchestrator and process supervision for bundle-analyzer.
//!
//! This crate provides:
//! - Configuration loading from `analyzerConfig.json` (JSON with comments)
//! - Supervision of the external npm/node collaborators
//! - Filesystem gates (stale artifact removal, signal file handshake)
//! - The staged run state machine
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading, merging and default creation
//! - [`process`]: Child process spawning, signalling and shutdown
//! - [`gate`]: Render tree and signal file gates
//! - [`collaborators`]: Launch templates for the external processes
//! - [`engine`]: Pipeline orchestration

pub mod collaborators;
pub mod config;
pub mod engine;
pub mod gate;
pub mod process;
