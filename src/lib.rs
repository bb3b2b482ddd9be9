//! Modpath - rewrite module paths in JavaScript and TypeScript sources.
//!
//! This library provides the core functionality for modpath, including:
//! - A single-pass scanner that finds `import`/`export` paths and `import()` calls
//!   while leaving strings, comments and every other byte untouched
//! - Configuration file parsing and cascade discovery
//! - Rule matching and sed-like path rewriting
//!
//! # Example
//!
//! ```
//! use modpath_cli::scan::{DependencyKind, rewrite_module_paths};
//!
//! let source = "import a from './a.ts';\nimport './styles.css';\nconst b = import('./b.ts');";
//! let rewritten = rewrite_module_paths(source, |path, kind| {
//!     if kind == DependencyKind::Import && path.ends_with(".css") {
//!         return None;
//!     }
//!     Some(path.replace(".ts", ".js"))
//! });
//!
//! assert_eq!(
//!     rewritten,
//!     "import a from './a.js';\n;\nconst b = import('./b.js');"
//! );
//! ```

pub mod config;
pub mod error;
pub mod files;
pub mod logging;
pub mod rules;
pub mod scan;

pub use error::{ModpathError, Result};
pub use scan::{DependencyKind, ModulePath, rewrite_module_paths, try_rewrite_module_paths};
