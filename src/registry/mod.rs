//! Canonical metadata for every recognized input variable.
//!
//! The registry is read-only and its declaration order is the order in
//! which variables are written to an input file. The optional
//! "known-variable universe" (all names the engine documents, see
//! [`parse_variable_docs`]) is deliberately not part of the registry; it is
//! passed explicitly to the decoder and checker when available.

use std::collections::HashMap;

/// Storage shape of a variable, dispatched exhaustively wherever the
/// registry is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// A single numeric value
    Scalar,
    /// One value per element, indexed by element position
    List,
    /// A Fortran boolean (`.true.` / `.false.`)
    Boolean,
}

/// Inclusive numeric bounds for a variable; either end may be open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarRange {
    /// Lower bound, `None` if unbounded below
    pub low: Option<f64>,
    /// Upper bound, `None` if unbounded above
    pub high: Option<f64>,
}

/// Default applied when a variable is missing from a loaded file.
///
/// For list variables the default is per slot, not per list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarDefault {
    /// Numeric default (scalars and numeric list slots)
    Number(f64),
    /// Element-symbol default (symbol list slots)
    Symbol(&'static str),
    /// Boolean default
    Bool(bool),
    /// Enabled-flag plus value pair (the `globaldensity` GUI variable)
    Toggle(bool, f64),
}

/// Metadata for one canonical variable.
#[derive(Debug, Clone)]
pub struct VarSpec {
    /// Variable name as written in input files
    pub name: &'static str,
    /// Storage shape
    pub kind: VarKind,
    /// GUI-only variable, written with the sentinel prefix
    pub is_custom: bool,
    /// Default value, absent for caller-must-supply variables
    pub default: Option<VarDefault>,
    /// Allowed numeric range, values outside are clamped on load
    pub range: Option<VarRange>,
    /// Section title emitted before this variable when writing
    pub block_label: Option<&'static str>,
}

impl VarSpec {
    const fn new(name: &'static str, kind: VarKind) -> Self {
        Self {
            name,
            kind,
            is_custom: false,
            default: None,
            range: None,
            block_label: None,
        }
    }

    const fn scalar(name: &'static str, default: f64) -> Self {
        let mut spec = Self::new(name, VarKind::Scalar);
        spec.default = Some(VarDefault::Number(default));
        spec
    }

    const fn list(name: &'static str, default: f64) -> Self {
        let mut spec = Self::new(name, VarKind::List);
        spec.default = Some(VarDefault::Number(default));
        spec
    }

    const fn boolean(name: &'static str) -> Self {
        let mut spec = Self::new(name, VarKind::Boolean);
        spec.default = Some(VarDefault::Bool(false));
        spec
    }

    const fn with_range(mut self, low: f64, high: f64) -> Self {
        self.range = Some(VarRange {
            low: Some(low),
            high: Some(high),
        });
        self
    }

    const fn with_block(mut self, label: &'static str) -> Self {
        self.block_label = Some(label);
        self
    }

    const fn custom(mut self) -> Self {
        self.is_custom = true;
        self
    }
}

/// Variable names starting with any of these prefixes are engine
/// write-only knobs and are dropped when loading an input file.
pub const IGNORED_PREFIXES: [&str; 2] = ["ioutput_part", "tableinp"];

/// All recognized variables in declaration (= write) order.
fn declaration_table() -> Vec<VarSpec> {
    vec![
        VarSpec::scalar("ncp", 2.0),
        {
            let mut spec = VarSpec::new("symbol", VarKind::List);
            spec.default = Some(VarDefault::Symbol("H"));
            spec
        },
        // The three optional per-element arrays: no registry default, the
        // engine falls back to the element database when they are absent.
        VarSpec::new("dns0", VarKind::List),
        VarSpec::new("e_surfb", VarKind::List),
        VarSpec::new("e_displ", VarKind::List),
        VarSpec::new("occurrence", VarKind::List).custom(),
        {
            let mut spec = VarSpec::new("globaldensity", VarKind::Scalar).custom();
            spec.default = Some(VarDefault::Toggle(false, 0.0));
            spec
        },
        VarSpec::list("inel0", 3.0).with_range(1.0, 6.0),
        VarSpec::scalar("nh", 1000.0).with_block("general"),
        VarSpec::scalar("idout", -1.0),
        VarSpec::scalar("nr_pproj", 10.0),
        VarSpec::scalar("flc", 1.0),
        VarSpec::scalar("idrel", 1.0),
        VarSpec::scalar("ipot", 0.0).with_range(1.0, 6.0),
        VarSpec::scalar("iintegral", 2.0).with_range(0.0, 2.0),
        VarSpec::scalar("isbv", 0.0).with_range(1.0, 7.0),
        VarSpec::list("qubeam", 1.0).with_block("beam"),
        VarSpec::scalar("case_e0", 0.0).with_range(0.0, 6.0),
        VarSpec::list("e0", 0.0),
        VarSpec::scalar("case_alpha", 0.0).with_range(0.0, 6.0),
        VarSpec::list("alpha0", 0.0),
        VarSpec::scalar("number_calc", 19.0),
        VarSpec::list("qu", 1.0).with_block("target"),
        VarSpec::list("qumax", 1.0),
        VarSpec::scalar("ttarget", 2000.0),
        VarSpec::scalar("nqx", 0.0),
        VarSpec::scalar("iq0", 0.0),
        VarSpec::boolean("lparticle_p").with_block("output options"),
        VarSpec::boolean("lparticle_r"),
        VarSpec::boolean("lmatrices"),
    ]
}

/// Read-only registry of all recognized variables.
///
/// Built once at startup; `kind` and `is_custom` never change after
/// registration and every name is unique.
#[derive(Debug, Clone)]
pub struct VarRegistry {
    specs: Vec<VarSpec>,
    lookup: HashMap<&'static str, usize>,
}

impl VarRegistry {
    /// Builds the registry from the canonical declaration table.
    #[must_use]
    pub fn new() -> Self {
        let specs = declaration_table();
        let mut lookup = HashMap::new();
        for (idx, spec) in specs.iter().enumerate() {
            lookup.insert(spec.name, idx);
        }
        Self { specs, lookup }
    }

    /// Position of a variable in declaration order.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// Full metadata for a variable.
    #[must_use]
    pub fn spec(&self, name: &str) -> Option<&VarSpec> {
        self.specs.get(self.index_of(name)?)
    }

    /// All variable metadata in declaration order.
    #[must_use]
    pub fn specs(&self) -> &[VarSpec] {
        &self.specs
    }

    /// All variable names in declaration order (the write order).
    pub fn all_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().map(|s| s.name)
    }

    /// Storage shape of a variable.
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<VarKind> {
        self.spec(name).map(|s| s.kind)
    }

    /// Default for a variable, `None` for caller-must-supply ones.
    #[must_use]
    pub fn default_of(&self, name: &str) -> Option<VarDefault> {
        self.spec(name).and_then(|s| s.default)
    }

    /// Allowed range for a variable, if one is registered.
    #[must_use]
    pub fn range_of(&self, name: &str) -> Option<VarRange> {
        self.spec(name).and_then(|s| s.range)
    }

    /// Whether the variable is GUI-only (sentinel-prefixed in text form).
    #[must_use]
    pub fn is_custom(&self, name: &str) -> bool {
        self.spec(name).is_some_and(|s| s.is_custom)
    }

    /// Section title emitted before this variable when writing, if any.
    #[must_use]
    pub fn block_label_of(&self, name: &str) -> Option<&'static str> {
        self.spec(name).and_then(|s| s.block_label)
    }

    /// Whether a variable name is an engine write-only knob that is
    /// dropped on load.
    #[must_use]
    pub fn is_ignored(name: &str) -> bool {
        IGNORED_PREFIXES.iter().any(|p| name.starts_with(p))
    }
}

impl Default for VarRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses the engine's `tri.inp.txt` documentation file into the
/// known-variable universe used for best-effort unknown-name detection.
///
/// Returns `None` when the variable listing marker is missing, in which
/// case unknown-name checks are skipped without error.
#[must_use]
pub fn parse_variable_docs(text: &str) -> Option<Vec<String>> {
    let mut lines = text.lines();
    lines.find(|line| line.trim() == "variable in tri.inp:")?;
    // Skip the column header line
    lines.next()?;

    let mut names = Vec::new();
    for line in lines {
        let content = line.trim();
        // After the last variable there is an empty line
        if content.is_empty() {
            break;
        }
        let token = content.split_whitespace().next().unwrap_or("");
        let name = token
            .split(|c| matches!(c, '(' | '=' | '.'))
            .next()
            .unwrap_or("");
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }

    // Recognized by the engine but absent from the documentation file
    names.push("qu_int".to_string());
    Some(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order() {
        let registry = VarRegistry::new();
        let names: Vec<_> = registry.all_names().collect();
        assert_eq!(names.first(), Some(&"ncp"));
        assert_eq!(names.get(1), Some(&"symbol"));
        assert_eq!(names.last(), Some(&"lmatrices"));
        assert_eq!(names.len(), 30);
    }

    #[test]
    fn test_unique_names() {
        let registry = VarRegistry::new();
        let names: Vec<_> = registry.all_names().collect();
        let mut dedup = names.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), names.len());
    }

    #[test]
    fn test_kinds() {
        let registry = VarRegistry::new();
        assert_eq!(registry.kind_of("ncp"), Some(VarKind::Scalar));
        assert_eq!(registry.kind_of("symbol"), Some(VarKind::List));
        assert_eq!(registry.kind_of("lmatrices"), Some(VarKind::Boolean));
        assert_eq!(registry.kind_of("does_not_exist"), None);
    }

    #[test]
    fn test_custom_flags() {
        let registry = VarRegistry::new();
        assert!(registry.is_custom("occurrence"));
        assert!(registry.is_custom("globaldensity"));
        assert!(!registry.is_custom("symbol"));
    }

    #[test]
    fn test_ranges() {
        let registry = VarRegistry::new();
        let range = registry.range_of("inel0").unwrap();
        assert_eq!(range.low, Some(1.0));
        assert_eq!(range.high, Some(6.0));
        assert!(registry.range_of("nh").is_none());
    }

    #[test]
    fn test_optional_arrays_have_no_default() {
        let registry = VarRegistry::new();
        for name in ["dns0", "e_surfb", "e_displ", "occurrence"] {
            assert!(registry.default_of(name).is_none(), "{name}");
        }
    }

    #[test]
    fn test_block_labels() {
        let registry = VarRegistry::new();
        assert_eq!(registry.block_label_of("nh"), Some("general"));
        assert_eq!(registry.block_label_of("qubeam"), Some("beam"));
        assert_eq!(registry.block_label_of("qu"), Some("target"));
        assert_eq!(registry.block_label_of("lparticle_p"), Some("output options"));
        assert_eq!(registry.block_label_of("ncp"), None);
    }

    #[test]
    fn test_is_ignored() {
        assert!(VarRegistry::is_ignored("ioutput_part"));
        assert!(VarRegistry::is_ignored("ioutput_part(2)"));
        assert!(VarRegistry::is_ignored("tableinp"));
        assert!(!VarRegistry::is_ignored("ncp"));
    }

    #[test]
    fn test_parse_variable_docs() {
        let doc = "\
some preamble
variable in tri.inp:
name          type      meaning
ncp           integer   number of components
symbol(i)     character element symbols
e0=value      real      beam energy
flc.          real      fluence

trailing text that is not part of the listing
";
        let names = parse_variable_docs(doc).unwrap();
        assert!(names.contains(&"ncp".to_string()));
        assert!(names.contains(&"symbol".to_string()));
        assert!(names.contains(&"e0".to_string()));
        assert!(names.contains(&"flc".to_string()));
        assert!(names.contains(&"qu_int".to_string()));
        assert!(!names.iter().any(|n| n == "trailing"));
    }

    #[test]
    fn test_parse_variable_docs_missing_marker() {
        assert!(parse_variable_docs("no listing here").is_none());
    }
}
