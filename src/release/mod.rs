//! Release resolution engine
//!
//! Turns the releases of a source-control repository into an ordered,
//! filtered catalogue and selects the next installable release for a client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│  Catalogue  │────▶│  Selector   │
//! │  (list)     │     │  (build)    │     │  (next)     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │                   │
//!        ▼                   ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Sources   │     │  Checksum   │     │  Exclusion  │
//! │  (github)   │     │   (cache)   │     │   (rules)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`catalogue`]: Paginates a source and assembles the sorted catalogue
//! - [`checksum`]: Memoized remote checksum lookup
//! - [`error`]: Error types for sources, checksums and resolution
//! - [`exclusion`]: Quarantined upgrade sources and targets
//! - [`resolver`]: Engine instance combining all of the above
//! - [`selector`]: Next-release selection
//! - [`source`]: Release source trait for listing releases
//! - [`sources`]: Concrete release sources (GitHub)
//! - [`types`]: Asset, Release and ReleaseSet
//! - [`version`]: Semantic version with precedence ordering

pub mod catalogue;
pub mod checksum;
pub mod error;
pub mod exclusion;
pub mod resolver;
pub mod selector;
pub mod source;
pub mod sources;
pub mod types;
pub mod version;
