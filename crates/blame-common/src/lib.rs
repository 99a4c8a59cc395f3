//! Shared types for the blame contract engine.
//!
//! Every other crate in the workspace depends on this one:
//!
//! - [`label`]: blame labels and the paths they accumulate
//! - [`key`]: property keys shared by value access and label paths
//! - [`error`]: the single error type raised by guarded operations
//! - [`config`]: process-wide engine configuration

pub mod config;
pub mod error;
pub mod key;
pub mod label;

pub use config::EngineConfig;
pub use error::{BlameError, ConfigError};
pub use key::{Key, MAX_LENGTH};
pub use label::{Label, PathStep, Polarity};
