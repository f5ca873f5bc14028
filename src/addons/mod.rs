//! Composition of addon configuration functions.
//!
//! Addon specs are turned into a generated loader module
//! ([`generate`]), which can be written out for an external module loader
//! ([`write_loader`]) or linked in process against an [`AddonCatalog`].

mod catalog;
mod codegen;
mod error;
mod identifier;
mod output;
mod pipeline;
mod spec;

pub use catalog::{AddonCatalog, ModuleLoader};
pub use codegen::{generate, generate_with, AddonImport, ExportBinding, GeneratedModule};
pub use error::AddonError;
pub use identifier::{
    export_identifier, is_reserved_word, is_valid_identifier, synthesize, synthesize_with,
    FALLBACK_ALPHABET, FALLBACK_LEN,
};
pub use output::write_loader;
pub use pipeline::{AddonExport, CompositionPipeline, PipelineError, TransformFn};
pub use spec::AddonSpec;
