//! Layers file parsing.
//!
//! The layers file describes the depth structure of a multi-layer target.
//! The abundance of the first element is never stored; it is recovered as
//! the remainder of each row.

use anyhow::{Context, Result};
use std::path::Path;

use crate::constants::LAYERS_END_MARKER;
use crate::models::TargetLayer;

/// Parses a layers file from disk.
///
/// # Errors
///
/// Fails only when the file cannot be read.
pub fn load_layers_file(path: &Path) -> Result<Vec<TargetLayer>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read layers file: {}", path.display()))?;
    Ok(parse_layers_str(&content))
}

/// Parses layers-file text into target layers.
///
/// The element count is derived from the per-element column titles of the
/// second header line; rows that cannot be read are skipped.
#[must_use]
pub fn parse_layers_str(content: &str) -> Vec<TargetLayer> {
    let mut lines = content.lines();
    // First header line carries no structure
    lines.next();
    // Number of stored abundance columns = ncp - 1
    let stored_columns = lines
        .next()
        .map_or(0, |header| header.split_whitespace().skip(2).count());

    let mut layers = Vec::new();
    for line in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        // Terminal sentinel row
        if fields.last().copied() == Some(LAYERS_END_MARKER) {
            break;
        }
        if fields.len() < 2 + stored_columns {
            continue;
        }
        let Ok(segment_count) = fields[0].parse::<u32>() else {
            continue;
        };
        let Ok(thickness) = fields[1].parse::<f64>() else {
            continue;
        };

        let mut abundances = Vec::with_capacity(stored_columns + 1);
        let mut valid = true;
        for field in &fields[2..2 + stored_columns] {
            match field.parse::<f64>() {
                Ok(v) => abundances.push(v),
                Err(_) => {
                    valid = false;
                    break;
                }
            }
        }
        if !valid {
            continue;
        }
        // The first element's abundance is the row remainder
        let remainder = 1.0 - abundances.iter().sum::<f64>();
        abundances.insert(0, remainder);

        let name = fields[2 + stored_columns..].join(" ");
        let segment_thickness = if segment_count > 0 {
            thickness / f64::from(segment_count)
        } else {
            0.0
        };
        layers.push(TargetLayer {
            segment_count,
            segment_thickness,
            abundances,
            name,
        });
    }

    layers
}
