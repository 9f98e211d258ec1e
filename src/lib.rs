//! SDTrimSP Configuration Library
//!
//! This library provides core functionality for working with SDTrimSP
//! simulation input files: encoding structured composition data into the
//! `tri.inp` text format, decoding and validating existing input files,
//! and writing the companion `layers.inp` target description.

// Module declarations
pub mod checker;
pub mod constants;
pub mod element_db;
pub mod encoder;
pub mod models;
pub mod parser;
pub mod registry;
