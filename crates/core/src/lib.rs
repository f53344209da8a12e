//! # Smelter Core
//!
//! The Smelter error taxonomy: categories, descriptors, the error catalog and
//! the [`Failure`] values callers raise and report. It does no I/O and needs no
//! async runtime; analytics and configuration build on top of it.
//!
//! ## Layout
//!
//! - [`catalog`]: the immutable id → entry mapping, built and validated once
//! - [`template`]: `%name%` message templates
//! - [`failure`]: the closed set of failure variants

pub mod catalog;
pub mod error;
pub mod failure;
pub mod template;

// Re-export key types at crate root for ergonomics
pub use catalog::{CatalogBuilder, CatalogEntry, ErrorCatalog, ErrorCategory, ErrorDescriptor};
pub use error::{Error, Result};
pub use failure::{CatalogError, Failure, PluginError};
pub use template::{TemplateArgs, render_template};
