//! # portico-core
//!
//! Core types and error types for Portico.
//!
//! This crate provides the types shared across all Portico crates:
//! - The sticky [`PortalDialect`] classification
//! - The normalized [`ApiVersionRecord`] produced by every dialect
//! - Catalog entity envelopes and the replace-all [`MutationBatch`]
//! - Cross-cutting error types

pub mod dialect;
pub mod entity;
pub mod errors;
pub mod record;

pub use dialect::PortalDialect;
pub use entity::{CatalogEntity, EntityKind, EntityMetadata, LocatedEntity, MutationBatch, MutationType};
pub use errors::CoreError;
pub use record::{ApiVersionRecord, SchemaDocument};
