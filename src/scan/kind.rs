use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// The declaration form a module path was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
	/// `import ... from "path"` or a bare `import "path"`.
	Import,
	/// `export ... from "path"`.
	Export,
	/// `import("path")`.
	DynamicImport,
}

impl DependencyKind {
	pub const ALL: [DependencyKind; 3] = [
		DependencyKind::Import,
		DependencyKind::Export,
		DependencyKind::DynamicImport,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			DependencyKind::Import => "import",
			DependencyKind::Export => "export",
			DependencyKind::DynamicImport => "dynamic-import",
		}
	}
}

impl fmt::Display for DependencyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for DependencyKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		DependencyKind::ALL
			.into_iter()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| format!("unknown dependency kind: {s}"))
	}
}

/// A module path found in a source file, as written between its quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePath {
	pub path: String,
	pub kind: DependencyKind,
}

impl fmt::Display for ModulePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}\t{}", self.kind, self.path)
	}
}
