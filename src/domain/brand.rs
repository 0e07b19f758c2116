//! Per-brand rule data: flag names, the footnote reference table and the
//! flag rule table.

use std::collections::BTreeMap;

use crate::domain::{
    catalog::PartCatalog,
    footnote::{FootnoteCollection, FootnoteDefinition},
    rules::{CapabilityFlags, RuleTable, RuleTableError},
};

mod standard;

/// Everything the compiler knows about one brand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandRules {
    name: String,
    flag_names: BTreeMap<String, u64>,
    footnotes: FootnoteCollection,
    table: RuleTable,
}

impl BrandRules {
    /// A brand with no flags, footnotes or rules.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Register a flag name for a bit.
    #[must_use]
    pub fn with_flag(mut self, name: impl Into<String>, bit: u64) -> Self {
        self.flag_names.insert(name.into(), bit);
        self
    }

    /// Add a footnote to the reference table used for documentation entries.
    #[must_use]
    pub fn with_footnote(mut self, id: impl Into<String>, definition: FootnoteDefinition) -> Self {
        self.footnotes.insert(id, definition);
        self
    }

    /// Set the flag rule table.
    #[must_use]
    pub fn with_table(mut self, table: RuleTable) -> Self {
        self.table = table;
        self
    }

    /// The brand name, lowercase.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Footnotes documentation entries may reference by id.
    #[must_use]
    pub const fn footnotes(&self) -> &FootnoteCollection {
        &self.footnotes
    }

    /// The flag rule table.
    #[must_use]
    pub const fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Look up the bit for a flag name.
    #[must_use]
    pub fn flag(&self, name: &str) -> Option<u64> {
        self.flag_names.get(name).copied()
    }

    /// Registered flag names and bits, by name.
    pub fn flags(&self) -> impl Iterator<Item = (&str, u64)> {
        self.flag_names.iter().map(|(name, &bit)| (name.as_str(), bit))
    }

    /// Combine named flags into a bitset.
    ///
    /// Returns the bitset together with any names this brand does not define.
    #[must_use]
    pub fn flags_from_names<S: AsRef<str>>(&self, names: &[S]) -> (CapabilityFlags, Vec<String>) {
        let mut bits = 0;
        let mut unknown = Vec::new();
        for name in names {
            match self.flag(name.as_ref()) {
                Some(bit) => bits |= bit,
                None => unknown.push(name.as_ref().to_string()),
            }
        }
        (CapabilityFlags::from_bits(bits), unknown)
    }
}

/// Rule data for all known brands.
///
/// Lookup is case-insensitive. Brands without an entry get an empty rule set.
#[derive(Debug, Clone, Default)]
pub struct BrandRegistry {
    brands: BTreeMap<String, BrandRules>,
    fallback: BrandRules,
}

impl BrandRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in brands.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTableError::InvalidPart`] if a built-in rule names a
    /// malformed part id.
    pub fn standard() -> Result<Self, RuleTableError> {
        Ok(standard::brands()?.into_iter().collect())
    }

    /// Add or replace a brand.
    pub fn insert(&mut self, rules: BrandRules) {
        self.brands.insert(rules.name.to_lowercase(), rules);
    }

    /// Rules for a brand, or the empty fallback.
    #[must_use]
    pub fn get(&self, brand: &str) -> &BrandRules {
        self.brands
            .get(&brand.to_lowercase())
            .unwrap_or(&self.fallback)
    }

    /// Whether the brand has its own entry.
    #[must_use]
    pub fn contains(&self, brand: &str) -> bool {
        self.brands.contains_key(&brand.to_lowercase())
    }

    /// Iterate over registered brands by name.
    pub fn iter(&self) -> impl Iterator<Item = &BrandRules> {
        self.brands.values()
    }

    /// Validate every brand's rule table against the catalog.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleTableError`] found.
    pub fn validate(&self, catalog: &PartCatalog) -> Result<(), RuleTableError> {
        for rules in self.iter() {
            rules.table.validate(&rules.name, catalog)?;
        }
        Ok(())
    }
}

impl FromIterator<BrandRules> for BrandRegistry {
    fn from_iter<T: IntoIterator<Item = BrandRules>>(iter: T) -> Self {
        let mut registry = Self::new();
        for rules in iter {
            registry.insert(rules);
        }
        registry
    }
}
