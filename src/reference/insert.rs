//! Insertion side effects run after a completion variant is accepted.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use super::Variant;

/// The document text right after a variant's lookup string was inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertionContext {
    pub text: String,
    /// Byte range of the inserted text.
    pub range: Range<usize>,
}

impl InsertionContext {
    /// Replace `range` of `text` with `lookup`, as accepting a variant does.
    pub fn insert(text: &str, range: Range<usize>, lookup: &str) -> Self {
        let mut new_text = String::with_capacity(text.len() + lookup.len());
        new_text.push_str(&text[..range.start]);
        new_text.push_str(lookup);
        new_text.push_str(&text[range.end..]);
        Self { text: new_text, range: range.start..range.start + lookup.len() }
    }

    /// The text inserted so far.
    pub fn inserted(&self) -> &str {
        &self.text[self.range.clone()]
    }

    /// Replace the inserted text, keeping `range` on the replacement.
    pub fn replace_inserted(&mut self, replacement: &str) {
        self.text.replace_range(self.range.clone(), replacement);
        self.range = self.range.start..self.range.start + replacement.len();
    }

    /// Insert `suffix` right after the inserted text, extending `range`.
    pub fn append(&mut self, suffix: &str) {
        self.text.insert_str(self.range.end, suffix);
        self.range.end += suffix.len();
    }
}

pub trait InsertHandler: fmt::Debug + Send + Sync {
    fn handle_insert(&self, ctx: &mut InsertionContext, variant: &Variant);
}

/// Writes the fully-qualified class name in place of the simple name.
#[derive(Clone, Copy, Debug, Default)]
pub struct FqnInsertHandler;

impl InsertHandler for FqnInsertHandler {
    fn handle_insert(&self, ctx: &mut InsertionContext, variant: &Variant) {
        if let Some(fqn) = &variant.fqn {
            ctx.replace_inserted(fqn);
        }
    }
}

/// Runs several handlers in registration order.
#[derive(Clone, Debug, Default)]
pub struct ComposedInsertHandler {
    handlers: Vec<Arc<dyn InsertHandler>>,
}

impl ComposedInsertHandler {
    /// Run `handlers` in order.
    pub fn new(handlers: Vec<Arc<dyn InsertHandler>>) -> Self {
        Self { handlers }
    }

    /// The structural default first, then the caller's handler if any.
    pub fn with_default(default: Arc<dyn InsertHandler>, custom: Option<Arc<dyn InsertHandler>>) -> Arc<dyn InsertHandler> {
        match custom {
            Some(custom) => Arc::new(Self::new(vec![default, custom])),
            None => default,
        }
    }
}

impl InsertHandler for ComposedInsertHandler {
    fn handle_insert(&self, ctx: &mut InsertionContext, variant: &Variant) {
        for handler in &self.handlers {
            handler.handle_insert(ctx, variant);
        }
    }
}
