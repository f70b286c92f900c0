//! kubesim-core — types shared by the simulated scalers and the presenter.
//!
//! Nothing here talks to a real cluster. The types describe the state a
//! toy autoscaler exposes to whatever renders it, plus the compiled-in
//! defaults (overridable from a TOML file) the demos start from.

pub mod config;
pub mod error;
pub mod input;
pub mod types;

pub use config::{ProfileOverrides, ScalerProfile, SimConfig};
pub use error::{ConfigError, ConfigResult};
pub use types::*;
