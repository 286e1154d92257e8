//! Region code to remote-naming prefix lookup
//!
//! Every warning product published upstream starts with a prefix naming the
//! issuing state office (`IDV` for Victoria, `IDQ` for Queensland, ...).
//! Lookups are case-insensitive; an unknown region resolves to
//! [`UNKNOWN_PREFIX`], which matches no remote file.

use std::collections::HashMap;

/// Prefix returned for regions missing from the table
pub const UNKNOWN_PREFIX: &str = "UNK";

const DEFAULT_REGIONS: [(&str, &str); 8] = [
    ("NT", "IDD"),
    ("NSW", "IDN"),
    ("QLD", "IDQ"),
    ("SA", "IDS"),
    ("TAS", "IDT"),
    ("VIC", "IDV"),
    ("WA", "IDW"),
    // ACT warnings are issued by the NSW office
    ("ACT", "IDN"),
];

/// Fixed region → prefix table
#[derive(Clone, Debug)]
pub struct RegionTable {
    prefixes: HashMap<String, String>,
}

impl Default for RegionTable {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_REGIONS
                .iter()
                .map(|(region, prefix)| (region.to_string(), prefix.to_string()))
                .collect(),
        }
    }
}

impl RegionTable {
    /// The built-in table with `overrides` layered on top
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut table = Self::default();
        for (region, prefix) in overrides {
            table
                .prefixes
                .insert(normalize_region(region), prefix.trim().to_string());
        }
        table
    }

    /// Prefix for `region`, or [`UNKNOWN_PREFIX`]
    pub fn resolve(&self, region: &str) -> &str {
        self.prefixes
            .get(&normalize_region(region))
            .map(String::as_str)
            .unwrap_or(UNKNOWN_PREFIX)
    }

    /// Known region codes in alphabetical order
    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = self.prefixes.keys().map(String::as_str).collect();
        regions.sort_unstable();
        regions
    }

    /// Whether `region` has a real prefix
    pub fn is_known(&self, region: &str) -> bool {
        self.resolve(region) != UNKNOWN_PREFIX
    }
}

/// Canonical form of a region code used for lookups
pub fn normalize_region(region: &str) -> String {
    region.trim().to_uppercase()
}
