//! Source file handling for modpath.
//!
//! This module handles:
//! - Reading source files and stdin
//! - Applying compiled rules to a file
//! - Writing rewritten sources back in place

use crate::error::{ModpathError, Result};
use crate::rules::{CompiledRule, rewrite_with_rules};
use crate::scan::{ModulePath, collect_module_paths};
use std::borrow::Cow;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of running the rules over one file.
#[derive(Debug)]
pub struct FileRewrite {
	/// The file that was read.
	pub path: PathBuf,

	/// Contents as read from disk.
	pub original: String,

	/// Rewritten contents, `None` when no module path was found.
	pub rewritten: Option<String>,
}

impl FileRewrite {
	/// Whether writing this rewrite back would change the file.
	pub fn changed(&self) -> bool {
		self.rewritten
			.as_ref()
			.is_some_and(|rewritten| *rewritten != self.original)
	}

	/// The contents to emit: rewritten if anything was found, else the original.
	pub fn contents(&self) -> &str {
		self.rewritten.as_deref().unwrap_or(&self.original)
	}
}

/// Read a source file as UTF-8.
pub fn read_source(path: &Path) -> Result<String> {
	std::fs::read_to_string(path).map_err(|source| ModpathError::SourceReadError {
		path: path.to_path_buf(),
		source,
	})
}

/// Read all of stdin as UTF-8.
pub fn read_stdin() -> Result<String> {
	let mut buffer = String::new();
	std::io::stdin()
		.read_to_string(&mut buffer)
		.map_err(|source| ModpathError::SourceReadError {
			path: PathBuf::from("<stdin>"),
			source,
		})?;
	Ok(buffer)
}

/// Apply `rules` to already-loaded source text.
pub fn rewrite_source(path: &Path, original: String, rules: &[CompiledRule]) -> FileRewrite {
	let rewritten = match rewrite_with_rules(&original, rules) {
		Cow::Borrowed(_) => None,
		Cow::Owned(rewritten) => Some(rewritten),
	};

	let rewrite = FileRewrite {
		path: path.to_path_buf(),
		original,
		rewritten,
	};
	debug!(path = %path.display(), changed = rewrite.changed(), "processed source");
	rewrite
}

/// Read `path` and apply `rules` to it. Nothing is written.
pub fn rewrite_file(path: &Path, rules: &[CompiledRule]) -> Result<FileRewrite> {
	let original = read_source(path)?;
	Ok(rewrite_source(path, original, rules))
}

/// Write the rewrite back to its file if it changes anything.
///
/// Returns whether the file was written.
pub fn write_back(rewrite: &FileRewrite) -> Result<bool> {
	if !rewrite.changed() {
		return Ok(false);
	}

	std::fs::write(&rewrite.path, rewrite.contents()).map_err(|source| {
		ModpathError::SourceWriteError {
			path: rewrite.path.clone(),
			source,
		}
	})?;
	info!(path = %rewrite.path.display(), "rewrote module paths");
	Ok(true)
}

/// List the module paths in a file.
pub fn list_file(path: &Path) -> Result<Vec<ModulePath>> {
	let source = read_source(path)?;
	Ok(collect_module_paths(&source))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{Rule, RuleWithSource};
	use crate::scan::DependencyKind;
	use std::fs;

	fn extension_rule() -> Vec<CompiledRule> {
		let rws = RuleWithSource {
			rule: Rule {
				path_rewrite: Some(r"s/\.ts$/.js/".to_string()),
				..Default::default()
			},
			source: PathBuf::from("test.toml"),
		};
		vec![CompiledRule::from_rule_with_source(&rws).unwrap()]
	}

	#[test]
	fn test_rewrite_and_write_back() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("index.ts");
		fs::write(&file, "export * from './a.ts';\n").unwrap();

		let rewrite = rewrite_file(&file, &extension_rule()).unwrap();
		assert!(rewrite.changed());
		assert_eq!(rewrite.contents(), "export * from './a.js';\n");

		assert!(write_back(&rewrite).unwrap());
		assert_eq!(
			fs::read_to_string(&file).unwrap(),
			"export * from './a.js';\n"
		);
	}

	#[test]
	fn test_unchanged_file_is_not_written() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("index.ts");
		fs::write(&file, "import React from 'react';\n").unwrap();

		let rewrite = rewrite_file(&file, &extension_rule()).unwrap();
		assert!(rewrite.rewritten.is_some());
		assert!(!rewrite.changed());
		assert!(!write_back(&rewrite).unwrap());
	}

	#[test]
	fn test_file_without_imports() {
		let rewrite = rewrite_source(Path::new("a.js"), "const a = 1;".to_string(), &[]);
		assert!(rewrite.rewritten.is_none());
		assert_eq!(rewrite.contents(), "const a = 1;");
	}

	#[test]
	fn test_missing_file() {
		let result = rewrite_file(Path::new("/nonexistent/index.ts"), &[]);
		assert!(matches!(result, Err(ModpathError::SourceReadError { .. })));
	}

	#[test]
	fn test_list_file() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("index.ts");
		fs::write(&file, "import a from 'a';\nconst b = import('b');\n").unwrap();

		let found = list_file(&file).unwrap();
		assert_eq!(found.len(), 2);
		assert_eq!(found[1].kind, DependencyKind::DynamicImport);
	}
}
