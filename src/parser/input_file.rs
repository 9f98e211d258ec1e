//! Input file parsing and validation.
//!
//! The decoder turns `tri.inp` text into a [`SettingsModel`] and a flat
//! list of human-readable alerts. Malformed content never aborts a load:
//! every anomaly is repaired deterministically and reported. Only an
//! unreadable file is a hard error.
//!
//! Alert ordering is fixed: anomalies in file scan order, then
//! defaulting-pass alerts in registry declaration order, then cross-field
//! repair alerts in their rule order.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;

use crate::constants::{CUSTOM_SENTINEL, FALLBACK_SYMBOL, SWEEP_MODE};
use crate::element_db::ElementDb;
use crate::models::{fmt_num, Occurrence, SettingsModel, Value};
use crate::registry::{VarDefault, VarKind, VarRegistry};

/// Partially resolved value of one variable during the line scan.
///
/// List slots addressed by indexed assignment stay `None` until the
/// defaulting pass backfills them, so "not yet known" never needs a
/// sentinel value.
#[derive(Debug, Clone)]
enum Slot {
    Unset,
    Scalar(f64),
    Bool(bool),
    Numbers(Vec<Option<f64>>),
    Symbols(Vec<Option<String>>),
    Occurrences(Vec<Occurrence>),
    Toggle(bool, f64),
}

/// Parses an input file from disk.
///
/// # Errors
///
/// Fails only when the file cannot be read; malformed content is repaired
/// and reported through the returned alerts instead.
pub fn load_input_file(
    path: &Path,
    elements: &ElementDb,
    universe: Option<&[String]>,
) -> Result<(SettingsModel, Vec<String>)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    Ok(parse_input_str(&content, elements, universe))
}

/// Parses input-file text into a settings model plus alerts.
///
/// `universe` is the optional known-variable list (see
/// [`crate::registry::parse_variable_docs`]); when absent, unknown-name
/// checks are skipped without error.
#[must_use]
pub fn parse_input_str(
    content: &str,
    elements: &ElementDb,
    universe: Option<&[String]>,
) -> (SettingsModel, Vec<String>) {
    let registry = VarRegistry::new();
    let mut alerts: Vec<String> = Vec::new();
    let mut extra_lines: Vec<String> = Vec::new();
    let mut slots: Vec<Slot> = vec![Slot::Unset; registry.specs().len()];

    let index_re = Regex::new(r"\((\d+)\)").unwrap();

    let mut lines = content.lines();
    let title = lines.next().unwrap_or("").trim().to_string();

    'lines: for (line_idx, raw_line) in lines.enumerate() {
        // 1-based file line number; the title line is line 1
        let line_no = line_idx + 2;
        let line = raw_line.trim();

        let Some((lhs, rhs)) = line.split_once('=') else {
            continue;
        };
        let mut name = lhs.trim();
        if name == "text" {
            // Cosmetic section separator
            continue;
        }
        if let Some(stripped) = name.strip_prefix(CUSTOM_SENTINEL) {
            // Sentinel-prefixed names are GUI-only variables; anything
            // else starting with the sentinel is a plain comment line.
            if !registry.is_custom(stripped) {
                continue;
            }
            name = stripped;
        }
        if VarRegistry::is_ignored(name) {
            continue;
        }

        // Indexed single-slot assignment: name(k) = value
        let element_index = index_re
            .captures(name)
            .and_then(|c| c[1].parse::<usize>().ok());
        let bare = name.split('(').next().unwrap_or(name).trim();

        let mut unknown = false;
        if let Some(universe) = universe {
            unknown = !universe.iter().any(|n| n == bare) && !registry.is_custom(bare);
        }
        if unknown {
            alerts.push(format!("Unknown variable \"{bare}\" (line {line_no})"));
        }
        let var_idx = match registry.index_of(bare) {
            Some(idx) if !unknown => idx,
            _ => {
                // Preserved verbatim; the line is not dropped
                extra_lines.push(line.to_string());
                continue;
            }
        };

        // Strip a trailing comment, then split into comma-separated values
        let value_text = rhs.split(CUSTOM_SENTINEL).next().unwrap_or("");
        let data: Vec<&str> = value_text.split(',').map(str::trim).collect();

        match bare {
            "occurrence" => {
                let mut pairs = Vec::new();
                for tok in &data {
                    let mut chars = tok.chars();
                    let (Some(b), Some(t)) = (chars.next(), chars.next()) else {
                        alerts.push(read_failure(bare, line_no));
                        slots[var_idx] = Slot::Unset;
                        continue 'lines;
                    };
                    let (Some(b), Some(t)) = (b.to_digit(10), t.to_digit(10)) else {
                        alerts.push(read_failure(bare, line_no));
                        slots[var_idx] = Slot::Unset;
                        continue 'lines;
                    };
                    pairs.push(Occurrence {
                        in_beam: b == 1,
                        in_target: t == 1,
                    });
                }
                slots[var_idx] = Slot::Occurrences(pairs);
            }
            "globaldensity" => {
                let enabled = data.first().copied() == Some("True");
                let Some(Ok(value)) = data.get(1).map(|tok| tok.parse::<f64>()) else {
                    alerts.push(read_failure(bare, line_no));
                    slots[var_idx] = Slot::Unset;
                    continue 'lines;
                };
                slots[var_idx] = Slot::Toggle(enabled, value);
            }
            "symbol" => {
                if let Some(index) = element_index {
                    if index == 0 {
                        alerts.push(read_failure(bare, line_no));
                        slots[var_idx] = Slot::Unset;
                        continue 'lines;
                    }
                    let symbol =
                        resolve_symbol(data[0], index, elements, line_no, &mut alerts);
                    if !matches!(slots[var_idx], Slot::Symbols(_)) {
                        slots[var_idx] = Slot::Symbols(Vec::new());
                    }
                    let Slot::Symbols(list) = &mut slots[var_idx] else {
                        continue 'lines;
                    };
                    grow(list, index);
                    list[index - 1] = Some(symbol);
                } else {
                    let mut list = Vec::new();
                    for (i, tok) in data.iter().enumerate() {
                        list.push(Some(resolve_symbol(
                            tok,
                            i + 1,
                            elements,
                            line_no,
                            &mut alerts,
                        )));
                    }
                    slots[var_idx] = Slot::Symbols(list);
                }
            }
            _ => match registry.specs()[var_idx].kind {
                VarKind::List => {
                    if let Some(index) = element_index {
                        if index == 0 {
                            alerts.push(read_failure(bare, line_no));
                            slots[var_idx] = Slot::Unset;
                            continue 'lines;
                        }
                        let Ok(value) = data[0].parse::<f64>() else {
                            alerts.push(read_failure(bare, line_no));
                            slots[var_idx] = Slot::Unset;
                            continue 'lines;
                        };
                        let value = clamp_value(&registry, bare, value, line_no, &mut alerts);
                        if !matches!(slots[var_idx], Slot::Numbers(_)) {
                            slots[var_idx] = Slot::Numbers(Vec::new());
                        }
                        let Slot::Numbers(list) = &mut slots[var_idx] else {
                            continue 'lines;
                        };
                        grow(list, index);
                        list[index - 1] = Some(value);
                    } else {
                        let mut list = Vec::new();
                        for tok in &data {
                            let Ok(value) = tok.parse::<f64>() else {
                                alerts.push(read_failure(bare, line_no));
                                slots[var_idx] = Slot::Unset;
                                continue 'lines;
                            };
                            list.push(Some(clamp_value(
                                &registry, bare, value, line_no, &mut alerts,
                            )));
                        }
                        slots[var_idx] = Slot::Numbers(list);
                    }
                }
                VarKind::Boolean => {
                    slots[var_idx] = Slot::Bool(data[0].eq_ignore_ascii_case(".true."));
                }
                VarKind::Scalar => {
                    let Ok(mut value) = data[0].parse::<f64>() else {
                        alerts.push(read_failure(bare, line_no));
                        slots[var_idx] = Slot::Unset;
                        continue 'lines;
                    };
                    if bare == "idrel" && value != 0.0 {
                        // Only the sign carries meaning; the magnitude is
                        // free per the engine documentation
                        value = value.signum();
                    } else if bare == "case_e0" && (value - 4.0).abs() < f64::EPSILON {
                        alerts.push(format!(
                            "case_e0=4 is not a valid choice - changed to 0 (line {line_no})"
                        ));
                        value = 0.0;
                    }
                    let value = clamp_value(&registry, bare, value, line_no, &mut alerts);
                    slots[var_idx] = Slot::Scalar(value);
                }
            },
        }
    }

    let resolved = apply_defaults(&registry, slots, elements, &mut alerts);
    let mut model = SettingsModel::new(title);
    model.extra_lines = extra_lines;
    for (spec, value) in registry.specs().iter().zip(resolved) {
        if let Some(value) = value {
            model.set(spec.name, value);
        }
    }
    apply_cross_field_repairs(&registry, &mut model, &mut alerts);

    (model, alerts)
}

fn read_failure(name: &str, line_no: usize) -> String {
    format!("Failed to read data for variable \"{name}\" (line {line_no})")
}

/// Strips quotes from a symbol token and resolves it against the element
/// database, substituting the fallback element for unknown symbols.
fn resolve_symbol(
    token: &str,
    position: usize,
    elements: &ElementDb,
    line_no: usize,
    alerts: &mut Vec<String>,
) -> String {
    let symbol = token.replace('"', "").trim().to_string();
    if elements.is_valid(&symbol) {
        symbol
    } else {
        alerts.push(format!(
            "Element symbol \"{symbol}\" (#{position}) unknown, replaced with \"{FALLBACK_SYMBOL}\" (line {line_no})"
        ));
        FALLBACK_SYMBOL.to_string()
    }
}

/// Grows a partial list with unresolved slots up to `len` entries.
fn grow<T>(list: &mut Vec<Option<T>>, len: usize) {
    while list.len() < len {
        list.push(None);
    }
}

/// Clamps a value into its registered range, recording an alert naming
/// the variable, resulting value and source line. In-range values pass
/// through untouched with no alert.
fn clamp_value(
    registry: &VarRegistry,
    name: &str,
    value: f64,
    line_no: usize,
    alerts: &mut Vec<String>,
) -> f64 {
    let Some(range) = registry.range_of(name) else {
        return value;
    };
    let below = range.low.is_some_and(|low| value < low);
    let above = range.high.is_some_and(|high| value > high);
    if !below && !above {
        return value;
    }
    let mut clamped = value;
    if let Some(high) = range.high {
        clamped = clamped.min(high);
    }
    if let Some(low) = range.low {
        clamped = clamped.max(low);
    }
    let low = range.low.map_or_else(|| "-inf".to_string(), fmt_num);
    let high = range.high.map_or_else(|| "inf".to_string(), fmt_num);
    alerts.push(format!(
        "Value {} for variable \"{name}\" was clamped to allowed range [{low},{high}] (line {line_no})",
        fmt_num(clamped)
    ));
    clamped
}

/// Post-parse defaulting pass, applied once in registry declaration
/// order after all lines are consumed.
fn apply_defaults(
    registry: &VarRegistry,
    slots: Vec<Slot>,
    elements: &ElementDb,
    alerts: &mut Vec<String>,
) -> Vec<Option<Value>> {
    let mut resolved: Vec<Option<Value>> = Vec::with_capacity(slots.len());
    let mut ncp = 2usize;
    let mut symbols: Vec<String> = Vec::new();

    for (spec, slot) in registry.specs().iter().zip(slots) {
        let value = match spec.kind {
            VarKind::List => resolve_list(spec.name, slot, spec.default, ncp, &symbols, elements, alerts),
            VarKind::Boolean => match slot {
                Slot::Bool(v) => Some(Value::Bool(v)),
                // Missing output booleans default silently
                _ => Some(Value::Bool(false)),
            },
            VarKind::Scalar => {
                resolve_scalar(spec.name, slot, spec.default, spec.is_custom, &resolved, registry, alerts)
            }
        };

        // ncp and the symbol list feed the defaulting of everything after
        // them in declaration order
        if spec.name == "ncp" {
            if let Some(Value::Scalar(v)) = value {
                ncp = if v > 0.0 { v as usize } else { 0 };
            }
        } else if spec.name == "symbol" {
            if let Some(Value::Symbols(list)) = &value {
                symbols.clone_from(list);
            }
        }

        resolved.push(value);
    }

    resolved
}

/// True for the three per-element arrays whose absence means "use the
/// element-database defaults" and is never alerted.
fn is_optional_array(name: &str) -> bool {
    matches!(name, "dns0" | "e_surfb" | "e_displ")
}

/// Element-database default for one slot of an optional array.
fn element_default(name: &str, symbol: &str, elements: &ElementDb) -> f64 {
    let element = elements
        .by_symbol(symbol)
        .or_else(|| elements.by_symbol(FALLBACK_SYMBOL));
    element.map_or(0.0, |e| match name {
        "dns0" => e.atomic_density,
        "e_surfb" => e.surface_binding_energy,
        _ => e.displacement_energy,
    })
}

fn resolve_list(
    name: &str,
    slot: Slot,
    default: Option<VarDefault>,
    ncp: usize,
    symbols: &[String],
    elements: &ElementDb,
    alerts: &mut Vec<String>,
) -> Option<Value> {
    if name == "occurrence" {
        // No default: a missing occurrence list stays absent for the
        // caller to derive from its own composition state
        return match slot {
            Slot::Occurrences(pairs) => Some(Value::Occurrences(pairs)),
            _ => None,
        };
    }

    if name == "symbol" {
        let default = match default {
            Some(VarDefault::Symbol(s)) => s,
            _ => FALLBACK_SYMBOL,
        };
        return match slot {
            Slot::Symbols(mut list) => {
                grow(&mut list, ncp);
                let filled: Vec<String> = list
                    .into_iter()
                    .map(|s| s.unwrap_or_else(|| default.to_string()))
                    .collect();
                Some(Value::Symbols(filled))
            }
            _ => {
                alerts.push(format!(
                    "Variable \"{name}\" missing! Filled with default values \"{default}\""
                ));
                Some(Value::Symbols(vec![default.to_string(); ncp]))
            }
        };
    }

    if is_optional_array(name) {
        return match slot {
            Slot::Numbers(mut list) if !list.is_empty() => {
                // Sparse per-element overrides: backfill unset slots from
                // the element database, silently
                grow(&mut list, ncp);
                let filled: Vec<f64> = list
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| {
                        v.unwrap_or_else(|| {
                            let symbol = symbols.get(i).map_or(FALLBACK_SYMBOL, String::as_str);
                            element_default(name, symbol, elements)
                        })
                    })
                    .collect();
                Some(Value::Numbers(filled))
            }
            // Entirely absent: expected, the engine uses its own defaults
            _ => Some(Value::Numbers(Vec::new())),
        };
    }

    let default = match default {
        Some(VarDefault::Number(d)) => d,
        _ => 0.0,
    };
    match slot {
        Slot::Numbers(mut list) => {
            grow(&mut list, ncp);
            let filled: Vec<f64> = list.into_iter().map(|v| v.unwrap_or(default)).collect();
            Some(Value::Numbers(filled))
        }
        _ => {
            alerts.push(format!(
                "Variable \"{name}\" missing! Filled with default values \"{}\"",
                fmt_num(default)
            ));
            Some(Value::Numbers(vec![default; ncp]))
        }
    }
}

fn resolve_scalar(
    name: &str,
    slot: Slot,
    default: Option<VarDefault>,
    is_custom: bool,
    resolved_so_far: &[Option<Value>],
    registry: &VarRegistry,
    alerts: &mut Vec<String>,
) -> Option<Value> {
    // The globaldensity toggle is the one scalar with a pair shape
    if let Slot::Toggle(enabled, value) = slot {
        return Some(Value::Toggle(enabled, value));
    }
    if let Slot::Scalar(v) = slot {
        return Some(Value::Scalar(v));
    }

    match default? {
        VarDefault::Toggle(enabled, value) => Some(Value::Toggle(enabled, value)),
        VarDefault::Number(d) => {
            let scalar_at = |var: &str| -> Option<f64> {
                match resolved_so_far.get(registry.index_of(var)?)? {
                    Some(Value::Scalar(v)) => Some(*v),
                    _ => None,
                }
            };
            // number_calc only matters when a sweep mode is active on
            // either selector; otherwise its absence is expected
            let sweep_active = scalar_at("case_e0") == Some(SWEEP_MODE)
                || scalar_at("case_alpha") == Some(SWEEP_MODE);
            if !is_custom && (name != "number_calc" || sweep_active) {
                alerts.push(format!(
                    "Variable \"{name}\" missing! Set to default value \"{}\"",
                    fmt_num(d)
                ));
            }
            Some(Value::Scalar(d))
        }
        VarDefault::Bool(v) => Some(Value::Bool(v)),
        VarDefault::Symbol(_) => None,
    }
}

/// Cross-field consistency repairs, each applied at most once, in fixed
/// rule order.
fn apply_cross_field_repairs(
    registry: &VarRegistry,
    model: &mut SettingsModel,
    alerts: &mut Vec<String>,
) {
    let sweep_on_energy = model.scalar("case_e0") == Some(SWEEP_MODE);
    let sweep_on_angle = model.scalar("case_alpha") == Some(SWEEP_MODE);

    // 1. A sweep run produces no single-particle output, so the tracking
    //    switches must be off
    if sweep_on_energy || sweep_on_angle {
        for name in ["lparticle_p", "lparticle_r"] {
            if model.boolean(name) == Some(true) {
                let selector = if sweep_on_energy { "case_e0" } else { "case_alpha" };
                alerts.push(format!(
                    "{name}=.true. not allowed for {selector}=5 - changed to .false."
                ));
                model.set(name, Value::Bool(false));
            }
        }
    }

    // 2. Static calculation without recoils produces no matrices
    if model.boolean("lmatrices") == Some(true) && model.scalar("idrel") == Some(0.0) {
        alerts.push("lmatrices=.true. not allowed for idrel=0 - changed to .false.".to_string());
        model.set("lmatrices", Value::Bool(false));
    }

    // 3. The MAGIC integration method only supports the low-order
    //    potentials
    if model.scalar("iintegral") == Some(0.0) && model.scalar("ipot").is_some_and(|v| v > 3.0) {
        let default = match registry.default_of("iintegral") {
            Some(VarDefault::Number(d)) => d,
            _ => 2.0,
        };
        alerts.push(format!(
            "iintegral=0 not allowed for ipot>3 - changed to {}",
            fmt_num(default)
        ));
        model.set("iintegral", Value::Scalar(default));
    }
}
