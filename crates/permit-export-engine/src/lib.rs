//! Permit export engine
//!
//! Renders live authorization-model state as a Terraform document:
//! - HCL writer (quoting, label sanitization, inline JSON)
//! - Document preamble (scope header and provider block)
//! - One generator per state category
//! - Export orchestrator running the generators in dependency order

pub mod error;
pub mod generator;
pub mod hcl;
pub mod orchestrator;
pub mod preamble;

pub use error::ExportError;
pub use generator::{
    default_generators, render_resource, render_resources, ExportStage, Generator,
    GeneratorContext,
};
pub use orchestrator::{
    ExportObserver, ExportOrchestrator, ExportOutcome, ExportProgress, ExportStatus,
};
pub use preamble::{render_preamble, ExportOptions, HEADER_TITLE};
