//! Foundation types.
//!
//! - [`FileId`] - handle of an indexed document
//! - [`path`] - module-root, vendor and literal helpers
//!
//! This module has NO dependencies on other symfref modules.

mod file_id;
pub mod path;

pub use file_id::FileId;
