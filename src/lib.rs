//! # symfref-base
//!
//! Core library for indexing Symfony-style service containers and resolving
//! the class, method, service, alias and file references written inside
//! XML and YAML configuration documents.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide        → IDE features (completion, diagnostics, AnalysisHost)
//!   ↓
//! reference  → References, resolution, ranked variants, insert handlers
//!   ↓
//! schema     → Declarative document schemas, captures, visitors
//! query      → Typed lookups over an index snapshot
//!   ↓
//! index      → Per-document contributions, generations, snapshots
//!   ↓
//! document   → XML/YAML document trees, known files
//! model      → Services, tags, taxonomies
//! symbols    → Host-language classes and members
//!   ↓
//! base       → Primitives (FileId, path helpers)
//! ```
//!
//! `settings` is read by every layer above `base`.

// ============================================================================
// FOUNDATION
// ============================================================================

/// Foundation types: FileId, path helpers
pub mod base;

/// Enablement gate and resolver tunables
pub mod settings;

/// Service container model
pub mod model;

/// Document trees for XML and YAML
pub mod document;

/// Host-language symbol table
pub mod symbols;

// ============================================================================
// INDEXING AND RESOLUTION
// ============================================================================

/// Service index: generations and snapshots
pub mod index;

/// Queries over index snapshots
pub mod query;

/// Declarative schemas for configuration documents
pub mod schema;

/// Reference resolution and completion variants
pub mod reference;

/// IDE features: completion, diagnostics, analysis host
pub mod ide;

// Re-export commonly needed items
pub use base::FileId;
pub use ide::{Analysis, AnalysisHost};
pub use settings::Settings;
