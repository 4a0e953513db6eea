//! # portico-catalog
//!
//! Catalog side of Portico: turns normalized API versions into a
//! replace-all [`MutationBatch`](portico_core::MutationBatch) and hands it
//! to a [`CatalogConnection`].
//!
//! - [`sanitize`] enforces the catalog's naming grammar
//! - [`EntityMutationBuilder`] emits the group, service account and system
//!   entities plus one API entity per record
//! - [`HttpCatalogConnection`] and [`FileCatalogConnection`] are the sinks

pub mod builder;
pub mod connection;
mod error;
pub mod sanitize;

pub use builder::{EntityMutationBuilder, OwnershipNames};
pub use connection::{CatalogConnection, FileCatalogConnection, HttpCatalogConnection, connection_for};
pub use error::CatalogError;
pub use sanitize::{SanitizeTarget, sanitize};
