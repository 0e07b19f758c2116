//! Domain models for vehicle compatibility documentation.
//!
//! This module contains the part catalog and its resolver, the flag rule
//! engine, the attribute normalizer, and the record assembler and validator.

/// Part identifiers and descriptors.
pub mod part;
pub use part::{InvalidPartIdError, PartCategory, PartDescriptor, PartId};

/// The part catalog and its composition graph.
pub mod catalog;
pub use catalog::{CatalogError, PartCatalog};

/// Bill-of-materials resolution.
pub mod resolve;
pub use resolve::{BillOfMaterials, CountStrategy, ResolvedPart};

pub mod footnote;
pub use footnote::{Column, FootnoteCollection, FootnoteDefinition};

/// Capability flags and the rules derived from them.
pub mod rules;
pub use rules::{CapabilityFlags, Derivation, FlagCondition, FlagRule, RuleTable, RuleTableError};

/// Per-brand flag names, footnotes and rule tables.
pub mod brand;
pub use brand::{BrandRegistry, BrandRules};

pub mod units;

/// Vehicle name parsing.
pub mod name;
pub use name::{ModelName, ModelYears};

/// Platform descriptors as read from the source directory.
pub mod platform;
pub use platform::{
    DocEntry, FlagSpec, PlatformDescriptor, PlatformParams, PlatformSpecs, SupportType,
};

mod config;
pub use config::{Config, PlausibleRange};

pub mod normalize;
pub use normalize::Normalizer;

/// The compiled vehicle record.
pub mod record;
pub use record::{Assembler, NormalizedFields, VehicleRecord};

pub mod validate;
pub use validate::{Severity, ValidationIssue};
