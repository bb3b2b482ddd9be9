use crate::error::ModpathError;
use crate::scan::DependencyKind;
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level configuration from a `.modpath.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
	/// If true, stop directory cascade and jump directly to ~/.modpath.toml.
	#[serde(default)]
	pub root: bool,

	/// If true, ignore every config further up the tree and the user config.
	#[serde(default)]
	pub no_external_lookup: bool,

	/// Environment variable name that, if truthy, skips ~/.modpath.toml lookup.
	/// Useful for CI environments.
	#[serde(default)]
	pub root_config_lookup_disable_env_var: Option<String>,

	/// Rules applied to each module path.
	/// First matching rule wins.
	#[serde(default)]
	pub rules: Vec<Rule>,
}

/// A rule deciding what happens to a module path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Rule {
	/// Declaration kinds this rule applies to. Applies to all kinds when unset.
	pub kinds: Option<Vec<DependencyKind>>,

	/// Regex pattern the module path must match.
	pub path_pattern: Option<String>,

	/// Regex substitution for the path (mutually exclusive with remove).
	/// Format: "s/pattern/replacement/" or "s/pattern/replacement/g" for global.
	pub path_rewrite: Option<String>,

	/// Remove the whole declaration instead of rewriting its path.
	#[serde(default)]
	pub remove: bool,
}

/// A loaded configuration with its source path for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The path this config was loaded from.
	pub path: PathBuf,
}

/// Merged configuration from multiple config files in the cascade.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
	/// All rules from all configs, in cascade order (first match wins).
	pub rules: Vec<RuleWithSource>,

	/// Whether external lookup is disabled (from any config in cascade).
	pub no_external_lookup: bool,
}

/// A rule with its source config path for debugging/display.
#[derive(Debug, Clone)]
pub struct RuleWithSource {
	/// The rule itself.
	pub rule: Rule,

	/// The config file this rule came from.
	pub source: PathBuf,
}

impl Rule {
	/// Validate that the rule can match something and asks for one action.
	pub fn validate(&self) -> Result<(), ModpathError> {
		if self.path_rewrite.is_some() && self.remove {
			return Err(ModpathError::MutuallyExclusive {
				option1: "path_rewrite".to_string(),
				option2: "remove".to_string(),
			});
		}

		if self.kinds.as_ref().is_some_and(Vec::is_empty) {
			return Err(ModpathError::EmptyKindFilter);
		}

		Ok(())
	}

	/// Whether this rule applies to paths of the given kind.
	pub fn applies_to(&self, kind: DependencyKind) -> bool {
		self.kinds
			.as_ref()
			.is_none_or(|kinds| kinds.contains(&kind))
	}
}

impl Config {
	/// Validate all rules in this config.
	pub fn validate(&self) -> Result<(), ModpathError> {
		for rule in &self.rules {
			rule.validate()?;
		}
		Ok(())
	}
}
