//! In-memory parameter catalogue.
//!
//! Retrieval trees identify parameters by numeric id (`167`) or short name
//! (`2t`). The catalogue resolves either form to the short name used as the
//! range key and to the `Parameter` definition placed in the document.
//! Identifiers the catalogue does not know are passed through verbatim.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::parameters::Parameter;

/// Catalogue entry for one parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterInfo {
    /// Numeric parameter id.
    pub id: u32,
    /// Short name (range key).
    pub shortname: String,
    /// Long name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Unit symbol.
    pub units: String,
}

impl ParameterInfo {
    fn new(id: u32, shortname: &str, name: &str, units: &str) -> Self {
        Self {
            id,
            shortname: shortname.to_string(),
            name: name.to_string(),
            description: name.to_string(),
            units: units.to_string(),
        }
    }

    /// Document parameter definition for this entry.
    pub fn to_parameter(&self) -> Parameter {
        Parameter::new(&self.shortname, &self.name)
            .with_description(&self.description)
            .with_unit_symbol(&self.units)
    }
}

/// Lookup table from parameter id or short name to metadata.
#[derive(Debug, Clone, Default)]
pub struct ParameterCatalogue {
    entries: Vec<ParameterInfo>,
    by_id: HashMap<u32, usize>,
    by_shortname: HashMap<String, usize>,
}

impl ParameterCatalogue {
    /// Build a catalogue from entries. Later duplicates win.
    pub fn from_entries(entries: Vec<ParameterInfo>) -> Self {
        let mut catalogue = Self {
            entries,
            by_id: HashMap::new(),
            by_shortname: HashMap::new(),
        };
        catalogue.reindex();
        catalogue
    }

    /// Parse a catalogue from a JSON array of entries.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<ParameterInfo> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    /// The common surface and pressure-level parameters.
    pub fn ecmwf() -> Self {
        Self::from_entries(vec![
            ParameterInfo::new(129, "z", "Geopotential", "m**2 s**-2"),
            ParameterInfo::new(130, "t", "Temperature", "K"),
            ParameterInfo::new(131, "u", "U component of wind", "m s**-1"),
            ParameterInfo::new(132, "v", "V component of wind", "m s**-1"),
            ParameterInfo::new(133, "q", "Specific humidity", "kg kg**-1"),
            ParameterInfo::new(151, "msl", "Mean sea level pressure", "Pa"),
            ParameterInfo::new(157, "r", "Relative humidity", "%"),
            ParameterInfo::new(164, "tcc", "Total cloud cover", "(0 - 1)"),
            ParameterInfo::new(165, "10u", "10 metre U wind component", "m s**-1"),
            ParameterInfo::new(166, "10v", "10 metre V wind component", "m s**-1"),
            ParameterInfo::new(167, "2t", "2 metre temperature", "K"),
            ParameterInfo::new(168, "2d", "2 metre dewpoint temperature", "K"),
            ParameterInfo::new(228, "tp", "Total precipitation", "m"),
        ])
    }

    fn reindex(&mut self) {
        self.by_id.clear();
        self.by_shortname.clear();
        for (idx, entry) in self.entries.iter().enumerate() {
            self.by_id.insert(entry.id, idx);
            self.by_shortname.insert(entry.shortname.clone(), idx);
        }
    }

    /// Resolve a numeric id or short name.
    pub fn lookup(&self, key: &str) -> Option<&ParameterInfo> {
        let key = key.trim();
        let idx = match key.parse::<u32>() {
            Ok(id) => self.by_id.get(&id),
            Err(_) => self.by_shortname.get(key),
        };
        idx.map(|&i| &self.entries[i])
    }

    /// Short name for a key, or the key itself when unknown.
    pub fn short_name(&self, key: &str) -> String {
        self.lookup(key)
            .map(|info| info.shortname.clone())
            .unwrap_or_else(|| key.to_string())
    }

    /// Numeric id for a key, if known.
    pub fn param_id(&self, key: &str) -> Option<u32> {
        self.lookup(key).map(|info| info.id)
    }

    /// Document parameter definition for a key.
    pub fn parameter(&self, key: &str) -> Parameter {
        match self.lookup(key) {
            Some(info) => info.to_parameter(),
            None => Parameter::new(key, key),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalogue has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
