//! Vehicle compatibility documentation compiler
//!
//! Platform descriptors are read from a directory, merged with a built-in part
//! catalog and per-brand rule tables, and compiled into one normalized record
//! per documented vehicle.

pub mod domain;
pub use domain::{
    BillOfMaterials, BrandRegistry, Config, PartCatalog, PartId, PlatformDescriptor,
    VehicleRecord,
};

/// Orchestration of a compilation run.
pub mod compile;
pub use compile::{Compilation, CompileError, Compiler, Scope, Summary};

/// Filesystem input and output.
pub mod storage;
pub use storage::{SourceDirectory, SourceError, write_records};
