//! IDE features: high-level APIs for editor integrations.
//!
//! This module sits between the resolution engine and whatever editor
//! protocol the host speaks. Each function corresponds to one editor
//! request.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: Take data in, return data out
//! 2. **No protocol types**: Uses our own types, converted at the boundary
//! 3. **Composable**: Built on top of reference queries
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```ignore
//! use symfref::ide::AnalysisHost;
//! use symfref::settings::Settings;
//!
//! let mut host = AnalysisHost::new(Settings::default());
//! let file = host.set_file_content("/p/config/services.yml", "services: {}");
//!
//! let analysis = host.analysis();
//! let diagnostics = analysis.diagnostics(file);
//! ```

mod analysis;
mod completion;
mod diagnostics;

pub use analysis::{Analysis, AnalysisHost};
pub use completion::{CompletionItem, CompletionKind, completions, key_completions};
pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, check_references, codes};
