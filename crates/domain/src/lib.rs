//! note-tagger domain crate
//!
//! This crate contains the core tagging logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `normalize` / `analysis`: Content cleanup before generation
//! - `filter` / `hierarchy`: Post-processing of generated suggestions
//! - `format`: On-document tag syntaxes
//! - `usecases`: Generation, merge and batch orchestration
//! - `history`: Caller-owned record of applied and rejected tags

pub mod analysis;
pub mod filter;
pub mod format;
pub mod frontmatter;
pub mod hierarchy;
pub mod history;
pub mod model;
pub mod normalize;
pub mod ports;
pub mod registry;
pub mod usecases;

pub use model::*;
pub use ports::*;
pub use registry::ProviderRegistry;
