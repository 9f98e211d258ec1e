//! Data models for simulation configurations.
//!
//! This module contains the core data structures used throughout the
//! crate. Models are independent of parsing and UI concerns.

pub mod composition;
pub mod settings;

// Re-export all model types
pub use composition::{BeamComponent, RunParameters, TargetComponent, TargetLayer};
pub use settings::{fmt_num, Occurrence, SettingsModel, Value};
