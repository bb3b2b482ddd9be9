//! Module path scanning and rewriting.
//!
//! This module handles:
//! - Classifying source text into code, string and comment contexts
//! - Recognizing `import`/`export` declarations and `import(...)` calls
//! - Splicing transformed module paths into an otherwise untouched copy

pub mod kind;
pub mod rewriter;

pub use kind::{DependencyKind, ModulePath};
pub use rewriter::{collect_module_paths, rewrite_module_paths, try_rewrite_module_paths};
