//! Configuration loading and management.
//!
//! `analyzerConfig.json` is JSON with `//` and `/* */` comments. A missing
//! file is replaced by the embedded default and the run stops so the operator
//! can edit it; a present file is merged key by key over the defaults.

pub mod comments;
pub mod error;
pub mod loader;
pub mod models;
pub mod templates;

pub use comments::strip_comments;
pub use error::{ConfigError, ConfigResult};
pub use loader::{load_defaults, load_override, merge, persist_defaults, resolve};
pub use models::ConfigOutcome;
