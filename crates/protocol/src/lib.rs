//! # ba-protocol
//!
//! Shared data model for the bundle-analyzer pipeline.
//!
//! This crate defines the structures exchanged between the orchestrator core
//! and the command-line front end:
//! - The resolved run configuration (`analyzerConfig.json`)
//! - Pipeline stages and the run state machine
//! - Child process exit statuses and stdio modes
//! - Events emitted while a run progresses
//!
//! ## Modules
//!
//! - [`config_models`]: Typed run configuration
//! - [`pipeline_models`]: Stages, run states and transition rules
//! - [`process_models`]: Exit statuses and stdio modes for spawned children
//! - [`ipc`]: Events sent from the orchestrator to the front end
//!
//! The crate depends only on serde and uuid so it can be shared freely.

pub mod config_models;
pub mod ipc;
pub mod pipeline_models;
pub mod process_models;

pub use config_models::*;
pub use ipc::*;
pub use pipeline_models::*;
pub use process_models::*;
