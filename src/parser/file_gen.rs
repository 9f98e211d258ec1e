//! Input and layers file generation (serialization).
//!
//! Pure text generation from a settings model, with atomic file writes
//! for safety. Both writers are exact inverses of the parsers in this
//! module's siblings, up to the sparse-array omission rule.

use anyhow::{Context, Result};
use std::path::Path;

use crate::constants::{BEGIN_MARKER, CUSTOM_SENTINEL, END_MARKER, LAYERS_END_MARKER, SWEEP_MODE};
use crate::models::{SettingsModel, Value};
use crate::registry::VarRegistry;

/// Generates an input file from a settings model and writes it to disk.
///
/// This performs an atomic write using a temp file + rename pattern so
/// the file is never left in a corrupted state.
///
/// # Errors
///
/// Returns errors for file I/O failures, permission issues, or atomic
/// rename failures.
pub fn save_input_file(model: &SettingsModel, path: &Path) -> Result<()> {
    atomic_write(path, &write_input_string(model))
}

/// Generates a layers file from a settings model and writes it to disk.
pub fn save_layers_file(model: &SettingsModel, path: &Path) -> Result<()> {
    atomic_write(path, &write_layers_string(model))
}

/// Cosmetic section separator line.
fn header(title: &str) -> String {
    format!("text='---{title}---'")
}

/// Generates the input file text for a settings model.
///
/// Variables are written in registry declaration order, preceded by their
/// block separator where one is registered. The three optional
/// per-element arrays are skipped entirely while empty, so the engine
/// falls back to its own element table.
#[must_use]
pub fn write_input_string(model: &SettingsModel) -> String {
    let registry = VarRegistry::new();
    let mut output = String::new();

    output.push_str(&format!("{}\n{BEGIN_MARKER}", model.title));
    output.push_str(&format!("\n{}\n", header("elements")));

    let sweep_active = model.scalar("case_e0") == Some(SWEEP_MODE)
        || model.scalar("case_alpha") == Some(SWEEP_MODE);

    for spec in registry.specs() {
        let Some(value) = model.get(spec.name) else {
            continue;
        };

        // Empty optional arrays mean "use the engine defaults" and are
        // not persisted
        if matches!(value, Value::Numbers(v) if v.is_empty()) {
            continue;
        }
        if spec.name == "number_calc" && !sweep_active {
            continue;
        }

        if let Some(label) = spec.block_label {
            output.push_str(&format!("\n{}\n", header(label)));
        }

        if let Value::Bool(true) = value {
            // Raise the engine's event output limits so every tracked
            // particle actually appears in the output files
            let histories = model.scalar("nh").unwrap_or(0.0);
            let per_history = model.scalar("nr_pproj").unwrap_or(0.0);
            let budget = histories * per_history;
            if spec.name == "lparticle_p" {
                output.push_str(&format!("\tioutput_part(2) = {}\n", budget as i64));
            } else if spec.name == "lparticle_r" {
                output.push_str(&format!("\tioutput_part(5) = {}\n", (100.0 * budget) as i64));
            }
        }

        if spec.is_custom {
            output.push_str(&format!("\t{CUSTOM_SENTINEL}{} = {value}\n", spec.name));
        } else {
            output.push_str(&format!("\t{} = {value}\n", spec.name));
        }
    }

    if !model.extra_lines.is_empty() {
        output.push_str(&format!("\n{}\n", header("extra")));
        for line in &model.extra_lines {
            output.push_str(&format!("\t{line}\n"));
        }
    }
    output.push_str(&format!("\n{END_MARKER}"));

    output
}

/// Generates the layers file text for a settings model.
///
/// One row per layer: segment count, total thickness, then the abundance
/// of every element except the first (whose share is the row remainder),
/// then the layer name. Closed by a sentinel row of zeros.
#[must_use]
pub fn write_layers_string(model: &SettingsModel) -> String {
    let ncp = model.ncp();
    let mut output = String::new();

    output.push_str("number of\tthick-\ttarget composition 2...ncp\tname of layer\n");
    let mut element_titles = String::new();
    for i in 0..ncp.saturating_sub(1) {
        element_titles.push_str(&format!("qu_{}\t", i + 2));
    }
    output.push_str(&format!("layers\t\tness\t{element_titles}\n"));

    for (i, layer) in model.layers.iter().enumerate() {
        let mut abundances = String::new();
        for j in 1..ncp {
            let value = model
                .layer_abundances
                .get(i)
                .and_then(|row| row.get(j))
                .copied()
                .unwrap_or(0.0);
            abundances.push_str(&format!("{value:.2}\t"));
        }
        output.push_str(&format!(
            "{:>6}\t\t{:.2}\t{abundances}\t{}\n",
            layer.segment_count,
            layer.thickness(),
            layer.name
        ));
    }

    let zeros = "0.00\t".repeat(ncp.saturating_sub(1));
    output.push_str(&format!("{:>6}\t\t{:.2}\t{zeros}\t{LAYERS_END_MARKER}", 0, 0.0));

    output
}

/// Performs an atomic file write using temp file + rename pattern.
fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("inp.tmp");

    std::fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write to temporary file: {}", temp_path.display()))?;

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    Ok(())
}
