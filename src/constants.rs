//! Crate-wide constants for the SDTrimSP input file format.
//!
//! These values are fixed by the engine's `tri.inp` grammar and must not
//! change without a corresponding engine release.

/// Marker opening the variable block, written directly after the title line.
pub const BEGIN_MARKER: &str = "&TRI_INP";

/// Marker closing the input file.
pub const END_MARKER: &str = "/";

/// Fortran boolean literal for `true`.
pub const BOOL_TRUE: &str = ".true.";

/// Fortran boolean literal for `false`.
pub const BOOL_FALSE: &str = ".false.";

/// Prefix distinguishing GUI-only variables from native engine variables.
pub const CUSTOM_SENTINEL: char = '!';

/// Selector value that switches `case_e0` / `case_alpha` into a parametric
/// series of runs instead of a single run.
pub const SWEEP_MODE: f64 = 5.0;

/// Element the decoder substitutes for an unresolvable symbol.
pub const FALLBACK_SYMBOL: &str = "H";

/// Name of the terminal sentinel row in a layers file.
pub const LAYERS_END_MARKER: &str = "end";
