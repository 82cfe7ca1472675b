//! Service model: services, tags and class-name indirection.

mod service;
mod taxonomy;

pub use service::{ALIAS_SEPARATOR, Service, ServiceClassName, Tag};
pub use taxonomy::TagTaxonomy;
