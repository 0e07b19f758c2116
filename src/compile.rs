//! Compiles platform descriptors into sorted vehicle records.
//!
//! Each documentation entry of each descriptor runs through the normalizer,
//! the brand's rule table, the composition resolver, the assembler and the
//! validator. Platforms are processed in parallel; the output order only
//! depends on the records themselves.

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::instrument;

use crate::domain::{
    Assembler, BrandRegistry, CatalogError, Config, DocEntry, Normalizer, PartCatalog,
    PlatformDescriptor, RuleTableError, VehicleRecord, record::sort_records, validate::validate,
};

/// A failure that aborts a compilation run.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The part catalog is malformed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A rule table is inconsistent with the catalog.
    #[error(transparent)]
    Rules(#[from] RuleTableError),

    /// Every entry was filtered out or rejected.
    #[error("no records compiled from {0} documentation entries")]
    NothingCompiled(usize),
}

/// Which support tiers are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    /// Leave out the tiers the configuration excludes.
    #[default]
    Supported,
    /// Emit every tier.
    Everything,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Documentation entries seen.
    pub total: usize,
    /// Records emitted.
    pub processed: usize,
    /// Entries left out because of their support tier.
    pub skipped: usize,
    /// Entries rejected by validation errors.
    pub excluded: usize,
    /// Emitted records that carry validation warnings.
    pub warned: usize,
}

impl Summary {
    fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Skipped => self.skipped += 1,
            Outcome::Rejected => self.excluded += 1,
            Outcome::Emitted { warned, .. } => {
                self.processed += 1;
                if *warned {
                    self.warned += 1;
                }
            }
        }
    }
}

/// The result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    /// Records sorted by make then model.
    pub records: Vec<VehicleRecord>,
    /// Run counts.
    pub summary: Summary,
}

enum Outcome {
    Skipped,
    Rejected,
    Emitted {
        record: Box<VehicleRecord>,
        warned: bool,
    },
}

/// Compiles descriptors against a catalog, brand tables and configuration.
#[derive(Debug)]
pub struct Compiler<'c> {
    catalog: &'c PartCatalog,
    brands: BrandRegistry,
    config: Config,
}

impl<'c> Compiler<'c> {
    /// Create a compiler.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Rules`] if a rule table requires a part the
    /// catalog does not define.
    pub fn new(
        catalog: &'c PartCatalog,
        brands: BrandRegistry,
        config: Config,
    ) -> Result<Self, CompileError> {
        brands.validate(catalog)?;
        Ok(Self {
            catalog,
            brands,
            config,
        })
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Compile every documentation entry of the given descriptors.
    ///
    /// # Errors
    ///
    /// Fails if the catalog is inconsistent, or if no record survives
    /// filtering and validation.
    #[instrument(level = "debug", skip_all, fields(platforms = descriptors.len()))]
    pub fn compile(
        &self,
        descriptors: &[PlatformDescriptor],
        scope: Scope,
    ) -> Result<Compilation, CompileError> {
        let outcomes = descriptors
            .par_iter()
            .map(|descriptor| self.compile_platform(descriptor, scope))
            .collect::<Result<Vec<_>, CompileError>>()?;

        let mut summary = Summary::default();
        let mut records = Vec::new();
        for outcome in outcomes.into_iter().flatten() {
            summary.record(&outcome);
            if let Outcome::Emitted { record, .. } = outcome {
                records.push(*record);
            }
        }

        if records.is_empty() {
            return Err(CompileError::NothingCompiled(summary.total));
        }

        sort_records(&mut records);
        tracing::info!(
            "compiled {} records ({} skipped, {} excluded, {} with warnings)",
            summary.processed,
            summary.skipped,
            summary.excluded,
            summary.warned
        );

        Ok(Compilation { records, summary })
    }

    fn compile_platform(
        &self,
        descriptor: &PlatformDescriptor,
        scope: Scope,
    ) -> Result<Vec<Outcome>, CompileError> {
        let platform = descriptor.platform.as_str();
        if !self.brands.contains(&descriptor.brand) {
            tracing::debug!(
                "{platform}: no rules for brand '{}', using an empty table",
                descriptor.brand
            );
        }
        let rules = self.brands.get(&descriptor.brand);

        let (flags, unknown) = descriptor.flags.resolve(rules);
        for name in unknown {
            tracing::warn!("{platform}: unknown flag '{name}' ignored");
        }
        if descriptor.params.is_none() {
            tracing::debug!("{platform}: no control parameters");
        }

        let normalizer = Normalizer::new(platform, &descriptor.brand, rules, flags)
            .with_params(descriptor.params.as_ref())
            .with_specs(descriptor.specs.as_ref());
        let experimental_longitudinal = descriptor
            .params
            .as_ref()
            .and_then(|p| p.experimental_longitudinal_available)
            .unwrap_or(false);
        let derivation = rules.table().derive_for(flags, experimental_longitudinal);
        let assembler = Assembler::new(self.catalog, &self.config);

        descriptor
            .docs
            .iter()
            .map(|doc| -> Result<Outcome, CompileError> {
                if scope == Scope::Supported && self.config.is_excluded(doc.support_type) {
                    tracing::debug!("{}: skipped ({})", doc.name, doc.support_type);
                    return Ok(Outcome::Skipped);
                }
                let record = assembler.assemble(normalizer.normalize(doc), &derivation)?;
                Ok(self.check(doc, record))
            })
            .collect()
    }

    fn check(&self, doc: &DocEntry, record: VehicleRecord) -> Outcome {
        let issues = validate(&record, &self.config);
        let mut warned = false;
        let mut rejected = false;
        for issue in &issues {
            if issue.is_error() {
                tracing::error!("{}: {issue}", display_name(doc));
                rejected = true;
            } else {
                tracing::warn!("{}: {issue}", display_name(doc));
                warned = true;
            }
        }

        if rejected {
            Outcome::Rejected
        } else {
            Outcome::Emitted {
                record: Box::new(record),
                warned,
            }
        }
    }
}

impl Compiler<'static> {
    /// A compiler over the built-in catalog and brand tables.
    ///
    /// # Errors
    ///
    /// Fails if the built-in data is inconsistent.
    pub fn standard(config: Config) -> Result<Self, CompileError> {
        Self::new(PartCatalog::standard()?, BrandRegistry::standard()?, config)
    }
}

fn display_name(doc: &DocEntry) -> &str {
    if doc.name.is_empty() {
        "<unnamed>"
    } else {
        &doc.name
    }
}
