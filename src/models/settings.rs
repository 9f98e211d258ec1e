//! Settings model and typed variable values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::constants::{BOOL_FALSE, BOOL_TRUE};
use crate::models::TargetLayer;

/// Per-element presence pair: in which side of the simulation an element
/// takes part. Text form is two digits, e.g. `10` (beam only), `01`
/// (target only), `11` (both).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Element appears in the beam composition
    pub in_beam: bool,
    /// Element appears in the target composition
    pub in_target: bool,
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", u8::from(self.in_beam), u8::from(self.in_target))
    }
}

/// Resolved value of one configuration variable.
///
/// The variant in use is fixed by the variable's registry kind; consumers
/// match exhaustively so an unhandled shape is a compile error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Single numeric value
    Scalar(f64),
    /// Fortran boolean
    Bool(bool),
    /// One number per element, in element order
    Numbers(Vec<f64>),
    /// One element symbol per element
    Symbols(Vec<String>),
    /// One presence pair per element
    Occurrences(Vec<Occurrence>),
    /// Enabled flag plus value (the `globaldensity` GUI variable)
    Toggle(bool, f64),
}

impl fmt::Display for Value {
    /// Renders the value exactly as it appears on the right-hand side of
    /// an input-file assignment.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{}", fmt_num(*v)),
            Self::Bool(v) => write!(f, "{}", if *v { BOOL_TRUE } else { BOOL_FALSE }),
            Self::Numbers(values) => {
                let parts: Vec<_> = values.iter().map(|v| fmt_num(*v)).collect();
                write!(f, "{}", parts.join(", "))
            }
            Self::Symbols(symbols) => {
                let parts: Vec<_> = symbols.iter().map(|s| format!("\"{s}\"")).collect();
                write!(f, "{}", parts.join(", "))
            }
            Self::Occurrences(pairs) => {
                let parts: Vec<_> = pairs.iter().map(Occurrence::to_string).collect();
                write!(f, "{}", parts.join(", "))
            }
            Self::Toggle(enabled, value) => {
                let flag = if *enabled { "True" } else { "False" };
                write!(f, "{flag}, {}", fmt_num(*value))
            }
        }
    }
}

/// Formats a number the way the engine expects it: whole values without a
/// fractional part, everything else with the shortest exact form.
#[must_use]
pub fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// In-memory instance of one loaded or edited configuration.
///
/// Created fresh by the encoder before a save or by the decoder when a
/// file is opened; immutable input to the writer; discarded after use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsModel {
    /// Free-text title line
    pub title: String,
    /// Resolved value for every registry variable that is present
    pub values: HashMap<String, Value>,
    /// Unrecognized `name=value` lines, preserved verbatim in order
    pub extra_lines: Vec<String>,
    /// Target layers, used only by the layer writer
    pub layers: Vec<TargetLayer>,
    /// Per-layer per-element abundance rows, used only by the layer writer
    pub layer_abundances: Vec<Vec<f64>>,
}

impl SettingsModel {
    /// Creates an empty model with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            values: HashMap::new(),
            extra_lines: Vec::new(),
            layers: Vec::new(),
            layer_abundances: Vec::new(),
        }
    }

    /// Sets a variable value.
    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Gets a variable value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Numeric value of a scalar variable.
    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<f64> {
        match self.values.get(name)? {
            Value::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Value of a boolean variable.
    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Slots of a numeric list variable.
    #[must_use]
    pub fn numbers(&self, name: &str) -> Option<&[f64]> {
        match self.values.get(name)? {
            Value::Numbers(v) => Some(v),
            _ => None,
        }
    }

    /// Slots of the element-symbol list.
    #[must_use]
    pub fn symbols(&self, name: &str) -> Option<&[String]> {
        match self.values.get(name)? {
            Value::Symbols(v) => Some(v),
            _ => None,
        }
    }

    /// Per-element presence pairs.
    #[must_use]
    pub fn occurrences(&self, name: &str) -> Option<&[Occurrence]> {
        match self.values.get(name)? {
            Value::Occurrences(v) => Some(v),
            _ => None,
        }
    }

    /// Enabled flag and value of a toggle variable.
    #[must_use]
    pub fn toggle(&self, name: &str) -> Option<(bool, f64)> {
        match self.values.get(name)? {
            Value::Toggle(enabled, value) => Some((*enabled, *value)),
            _ => None,
        }
    }

    /// Element count, the canonical length of every list variable.
    #[must_use]
    pub fn ncp(&self) -> usize {
        self.scalar("ncp").map_or(0, |v| v as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occurrence_display() {
        let both = Occurrence {
            in_beam: true,
            in_target: true,
        };
        let beam_only = Occurrence {
            in_beam: true,
            in_target: false,
        };
        assert_eq!(both.to_string(), "11");
        assert_eq!(beam_only.to_string(), "10");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Scalar(2.0).to_string(), "2");
        assert_eq!(Value::Scalar(0.5).to_string(), "0.5");
        assert_eq!(Value::Bool(true).to_string(), ".true.");
        assert_eq!(Value::Bool(false).to_string(), ".false.");
        assert_eq!(Value::Numbers(vec![1.0, 0.25]).to_string(), "1, 0.25");
        assert_eq!(
            Value::Symbols(vec!["H".to_string(), "Fe".to_string()]).to_string(),
            "\"H\", \"Fe\""
        );
        assert_eq!(Value::Toggle(false, 0.0).to_string(), "False, 0");
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(1000.0), "1000");
        assert_eq!(fmt_num(-1.0), "-1");
        assert_eq!(fmt_num(0.3), "0.3");
    }

    #[test]
    fn test_accessors() {
        let mut model = SettingsModel::new("test run");
        model.set("ncp", Value::Scalar(3.0));
        model.set("lmatrices", Value::Bool(true));
        model.set("qu", Value::Numbers(vec![1.0, 0.0, 0.0]));

        assert_eq!(model.ncp(), 3);
        assert_eq!(model.boolean("lmatrices"), Some(true));
        assert_eq!(model.numbers("qu"), Some(&[1.0, 0.0, 0.0][..]));
        // Wrong shape resolves to None rather than panicking
        assert_eq!(model.scalar("qu"), None);
        assert_eq!(model.scalar("missing"), None);
    }
}
