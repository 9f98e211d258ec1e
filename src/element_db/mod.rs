//! Element property database.
//!
//! This module provides access to the embedded element table with the
//! per-element defaults the engine falls back to when an input file does
//! not customize them (atomic density, surface binding energy,
//! displacement energy).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Properties of a single element, matching the engine's `table1` columns
/// that are relevant for input-file handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Element symbol as written in input files (e.g. "H", "Fe")
    pub symbol: String,
    /// Full element name (e.g. "Hydrogen")
    pub name: String,
    /// Atomic number
    pub atomic_nr: u32,
    /// Atomic mass in u
    pub atomic_mass: f64,
    /// Mass density in g/cm^3
    pub mass_density: f64,
    /// Atomic density in atoms/A^3 (the engine default for `dns0`)
    pub atomic_density: f64,
    /// Surface binding energy in eV (the engine default for `e_surfb`)
    pub surface_binding_energy: f64,
    /// Displacement energy in eV (the engine default for `e_displ`)
    pub displacement_energy: f64,
}

/// Database schema from elements.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ElementTable {
    version: String,
    elements: Vec<Element>,
}

/// Element database with fast symbol lookup.
///
/// The database is embedded in the binary at compile time and provides
/// O(1) symbol validation for the decoder and the per-element defaults
/// the encoder compares against.
#[derive(Debug, Clone)]
pub struct ElementDb {
    /// All element definitions
    elements: Vec<Element>,
    /// Fast lookup by element symbol
    lookup: HashMap<String, usize>,
}

impl ElementDb {
    /// Loads the element database from the embedded JSON file.
    pub fn load() -> Result<Self> {
        let json_data = include_str!("elements.json");
        let table: ElementTable =
            serde_json::from_str(json_data).context("Failed to parse embedded elements.json")?;

        let mut lookup = HashMap::new();
        for (idx, element) in table.elements.iter().enumerate() {
            lookup.insert(element.symbol.clone(), idx);
        }

        Ok(Self {
            elements: table.elements,
            lookup,
        })
    }

    /// Gets an element definition by symbol.
    #[must_use]
    pub fn by_symbol(&self, symbol: &str) -> Option<&Element> {
        let idx = self.lookup.get(symbol)?;
        self.elements.get(*idx)
    }

    /// Gets an element definition by atomic number.
    #[must_use]
    pub fn by_atomic_nr(&self, atomic_nr: u32) -> Option<&Element> {
        self.elements.iter().find(|e| e.atomic_nr == atomic_nr)
    }

    /// Checks whether a symbol resolves to a known element.
    #[must_use]
    pub fn is_valid(&self, symbol: &str) -> bool {
        self.lookup.contains_key(symbol)
    }

    /// Gets the total number of elements.
    #[must_use]
    pub const fn element_count(&self) -> usize {
        self.elements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FALLBACK_SYMBOL;

    fn get_test_db() -> ElementDb {
        ElementDb::load().expect("Failed to load element database")
    }

    #[test]
    fn test_load_database() {
        let db = get_test_db();
        assert!(db.element_count() > 20);
    }

    #[test]
    fn test_by_symbol() {
        let db = get_test_db();
        let iron = db.by_symbol("Fe").unwrap();
        assert_eq!(iron.name, "Iron");
        assert_eq!(iron.atomic_nr, 26);
        assert!(iron.surface_binding_energy > 0.0);
    }

    #[test]
    fn test_by_atomic_nr() {
        let db = get_test_db();
        let tungsten = db.by_atomic_nr(74).unwrap();
        assert_eq!(tungsten.symbol, "W");
    }

    #[test]
    fn test_is_valid() {
        let db = get_test_db();
        assert!(db.is_valid("He"));
        assert!(!db.is_valid("XX"));
        assert!(!db.is_valid(""));
    }

    #[test]
    fn test_fallback_element_exists() {
        // The decoder substitutes this symbol for unresolvable ones, so it
        // must always be present.
        let db = get_test_db();
        assert!(db.is_valid(FALLBACK_SYMBOL));
    }
}
