//! Parsing and serialization of the engine's text formats.
//!
//! This module handles reading and validating `tri.inp` configuration
//! files, reading `layers.inp` target descriptions, and generating both
//! formats from a settings model.

pub mod file_gen;
pub mod input_file;
pub mod layers_file;

// Re-export commonly used functions
pub use file_gen::{save_input_file, save_layers_file, write_input_string, write_layers_string};
pub use input_file::{load_input_file, parse_input_str};
pub use layers_file::{load_layers_file, parse_layers_str};
