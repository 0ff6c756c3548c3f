//! HAL Metadata Code Generator
//!
//! Crawls the self-describing metadata of a hypermedia (HAL + ALPS) REST API
//! and emits typed client sources for every entity it exposes.
//!
//! ## Features
//!
//! - **Entity Discovery**: Every link of the profile document except `self` is an entity
//! - **Schema Collection**: One JSON-Schema per entity, fetched sequentially
//! - **Normalization**: Config-driven, idempotent schema cleanup
//! - **Reference Resolution**: `uri` string fields become typed references via ALPS `rt`
//! - **Emission**: TypeScript data classes and fetch-based service stubs
//!
//! ## Architecture
//!
//! ```text
//! profile ──▶ discovery ──▶ collector ──▶ normalize ──▶ resolve ──▶ codegen
//!                 │             │                          │
//!                 └─────────────┴──── MetadataSource ──────┘
//!                                (MetadataClient / InMemorySource)
//! ```

pub mod catalog;
pub mod client;
pub mod codegen;
pub mod collector;
pub mod config;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod href;
pub mod normalize;
pub mod pipeline;
pub mod resolve;
pub mod schema;
pub mod source;

pub use catalog::{CatalogEntry, EntityCatalog, ReferencedSchema};
pub use client::MetadataClient;
pub use codegen::{EmissionUnit, GeneratedFile};
pub use config::CodegenConfig;
pub use error::{CodegenError, Result};
pub use href::{HrefMatcher, HrefPolicy};
pub use pipeline::{Pipeline, PipelineOutput};
pub use schema::{EntityDescriptor, PropertySchema, SchemaDocument};
pub use source::{InMemorySource, MetadataSource};
