//! Diagnostics: unresolved references in configuration documents.
//!
//! A dangling reference is a normal state of a document being edited, so
//! resolution itself never fails. This module is where such references are
//! reported.

use std::sync::Arc;

use crate::base::FileId;
use crate::document::{DocumentTree, NodeId};
use crate::reference::{ReferenceRegistry, ResolveCtx, VariantKind};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic attached to a document node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: FileId,
    pub node: NodeId,
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(file: FileId, node: NodeId, message: impl Into<Arc<str>>) -> Self {
        Self { file, node, severity: Severity::Error, code: None, message: message.into() }
    }

    /// Create a warning diagnostic.
    pub fn warning(file: FileId, node: NodeId, message: impl Into<Arc<str>>) -> Self {
        Self { severity: Severity::Warning, ..Self::error(file, node, message) }
    }

    /// Set the diagnostic code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

pub mod codes {
    /// Service id not declared in any indexed document.
    pub const UNKNOWN_SERVICE: &str = "E0001";
    /// Class name that resolves to no class.
    pub const UNKNOWN_CLASS: &str = "W0001";
    /// Condition, action or form type alias nobody registers.
    pub const UNKNOWN_TAG_ALIAS: &str = "W0002";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Report a reference to a service that is not declared.
    pub fn unknown_service(&mut self, file: FileId, node: NodeId, id: &str) {
        self.add(
            Diagnostic::error(file, node, format!("unknown service: '{id}'")).with_code(codes::UNKNOWN_SERVICE),
        );
    }

    /// Report a reference to a class that does not exist.
    pub fn unknown_class(&mut self, file: FileId, node: NodeId, name: &str) {
        self.add(Diagnostic::warning(file, node, format!("unknown class: '{name}'")).with_code(codes::UNKNOWN_CLASS));
    }

    /// Report an alias no tagged service declares.
    pub fn unknown_tag_alias(&mut self, file: FileId, node: NodeId, alias: &str) {
        self.add(
            Diagnostic::warning(file, node, format!("unknown alias: '{alias}'")).with_code(codes::UNKNOWN_TAG_ALIAS),
        );
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get the count of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    /// Get the count of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Clear all diagnostics.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

// ============================================================================
// REFERENCE CHECKER
// ============================================================================

/// Report every service, class and alias reference of `tree` that resolves
/// to nothing. Empty values are still being typed and are skipped.
pub fn check_references(
    ctx: &ResolveCtx<'_>,
    file: FileId,
    registry: &ReferenceRegistry,
    tree: &dyn DocumentTree,
    collector: &mut DiagnosticCollector,
) {
    for (node, reference) in registry.all_references(tree) {
        let text = reference.text().trim();
        if text.is_empty() {
            continue;
        }
        let report: fn(&mut DiagnosticCollector, FileId, NodeId, &str) = match reference.kind() {
            VariantKind::Service => DiagnosticCollector::unknown_service,
            VariantKind::Class | VariantKind::DoctrineEntity => DiagnosticCollector::unknown_class,
            VariantKind::TagAlias => DiagnosticCollector::unknown_tag_alias,
            _ => continue,
        };
        if reference.resolve(ctx).is_not_found() {
            report(collector, file, node, text);
        }
    }
}
