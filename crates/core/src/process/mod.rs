//! Supervision of external collaborator processes.
//!
//! Every child is spawned into its own process group with the ambient
//! environment plus a per-stage overlay. A background task owns each child,
//! publishes its exit status through a `watch` channel and forwards kill
//! requests, so waiting on one child never blocks another.

pub mod command;
pub mod error;
pub mod supervisor;

pub use command::CommandSpec;
pub use error::{ProcessError, ProcessResult};
pub use supervisor::{ChildHandle, KillSignal, ProcessSupervisor};
