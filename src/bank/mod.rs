//! Question banks: model, parsing, and catalog
//!
//! A bank root holds one subdirectory per section, each with one bank file
//! per test; parsing turns bank files (structured JSON or free text) into
//! question records.

pub mod catalog;
pub mod model;
pub mod parser;

// Re-export commonly used types
pub use catalog::{Catalog, DEFAULT_SECTION};
pub use model::{Letter, Question};
