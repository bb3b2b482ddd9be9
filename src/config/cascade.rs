use crate::config::parser::parse_config_file;
use crate::config::types::{LoadedConfig, MergedConfig, RuleWithSource};
use crate::error::{ModpathError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in every directory of the cascade and in the home directory.
pub const CONFIG_FILE_NAME: &str = ".modpath.toml";

/// Discover and load all config files in the cascade.
///
/// The cascade order is:
/// 1. Start from `start_dir` and look for `.modpath.toml`
/// 2. If found and `no-external-lookup = true`, use that config alone
/// 3. If found and `root = true`, skip to user config only
/// 4. Otherwise, continue up the directory tree
/// 5. Finally, check ~/.modpath.toml (unless disabled)
///
/// Returns configs in cascade order (most specific first).
pub fn discover_configs(start_dir: &Path) -> Result<Vec<LoadedConfig>> {
	let home_dir = dirs::home_dir().ok_or(ModpathError::HomeDirectoryNotFound)?;
	discover_configs_from(start_dir, &home_dir)
}

fn discover_configs_from(start_dir: &Path, home_dir: &Path) -> Result<Vec<LoadedConfig>> {
	let mut configs = Vec::new();
	let mut current_dir = Some(start_dir);
	let user_config_path = home_dir.join(CONFIG_FILE_NAME);

	while let Some(dir) = current_dir {
		let config_path = dir.join(CONFIG_FILE_NAME);

		// The user config is always loaded last, never as part of the walk.
		if config_path != user_config_path && config_path.is_file() {
			let config = parse_config_file(&config_path)?;
			debug!(path = %config_path.display(), rules = config.rules.len(), "loaded config");

			let no_external_lookup = config.no_external_lookup;
			let root = config.root;
			configs.push(LoadedConfig {
				config,
				path: config_path,
			});

			if no_external_lookup {
				return Ok(configs);
			}
			if root {
				break;
			}
		}

		current_dir = dir.parent();
	}

	if let Some(user_config) = load_user_config(&configs, &user_config_path)? {
		configs.push(user_config);
	}

	Ok(configs)
}

/// Load the user's ~/.modpath.toml if it exists and isn't disabled.
fn load_user_config(
	existing_configs: &[LoadedConfig],
	user_config_path: &Path,
) -> Result<Option<LoadedConfig>> {
	for loaded in existing_configs {
		if let Some(ref env_var) = loaded.config.root_config_lookup_disable_env_var
			&& is_env_truthy(env_var)
		{
			debug!(env_var = %env_var, "user config lookup disabled");
			return Ok(None);
		}
	}

	if !user_config_path.is_file() {
		return Ok(None);
	}

	let config = parse_config_file(user_config_path)?;
	debug!(path = %user_config_path.display(), rules = config.rules.len(), "loaded user config");
	Ok(Some(LoadedConfig {
		config,
		path: user_config_path.to_path_buf(),
	}))
}

/// Check if an environment variable is set to a truthy value.
fn is_env_truthy(var_name: &str) -> bool {
	match std::env::var(var_name) {
		Ok(value) => {
			let lower = value.to_lowercase();
			!value.is_empty() && lower != "0" && lower != "false" && lower != "no"
		}
		Err(_) => false,
	}
}

/// Merge multiple configs into a single effective config.
///
/// Rules are collected in cascade order (first match wins).
/// The `no_external_lookup` flag is set if any config has it.
pub fn merge_configs(configs: &[LoadedConfig]) -> MergedConfig {
	let mut merged = MergedConfig::default();

	for loaded in configs {
		merged
			.rules
			.extend(loaded.config.rules.iter().map(|rule| RuleWithSource {
				rule: rule.clone(),
				source: loaded.path.clone(),
			}));

		merged.no_external_lookup |= loaded.config.no_external_lookup;
	}

	merged
}

/// Convenience function to discover, load, and merge configs from a directory.
pub fn load_merged_config(start_dir: &Path) -> Result<MergedConfig> {
	let configs = discover_configs(start_dir)?;
	Ok(merge_configs(&configs))
}

/// Get the path to the user's config file.
pub fn user_config_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(ModpathError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	fn write_config(dir: &Path, content: &str) {
		fs::write(dir.join(CONFIG_FILE_NAME), content).unwrap();
	}

	#[test]
	fn test_is_env_truthy() {
		// SAFETY: These env var operations are safe in single-threaded test context
		unsafe {
			std::env::remove_var("TEST_MODPATH_ENV_1");
			assert!(!is_env_truthy("TEST_MODPATH_ENV_1"));

			std::env::set_var("TEST_MODPATH_ENV_2", "");
			assert!(!is_env_truthy("TEST_MODPATH_ENV_2"));

			std::env::set_var("TEST_MODPATH_ENV_3", "0");
			assert!(!is_env_truthy("TEST_MODPATH_ENV_3"));

			std::env::set_var("TEST_MODPATH_ENV_4", "FALSE");
			assert!(!is_env_truthy("TEST_MODPATH_ENV_4"));

			std::env::set_var("TEST_MODPATH_ENV_5", "no");
			assert!(!is_env_truthy("TEST_MODPATH_ENV_5"));

			std::env::set_var("TEST_MODPATH_ENV_6", "1");
			assert!(is_env_truthy("TEST_MODPATH_ENV_6"));

			std::env::set_var("TEST_MODPATH_ENV_7", "yes");
			assert!(is_env_truthy("TEST_MODPATH_ENV_7"));

			for i in 1..=7 {
				std::env::remove_var(format!("TEST_MODPATH_ENV_{}", i));
			}
		}
	}

	#[test]
	fn test_cascade_walks_up_until_root() {
		let home = tempfile::tempdir().unwrap();
		let workspace = tempfile::tempdir().unwrap();
		let nested = workspace.path().join("packages/app");
		fs::create_dir_all(&nested).unwrap();

		write_config(
			workspace.path(),
			"root = true\n[[rules]]\npath_pattern = \"^b$\"\n",
		);
		write_config(&nested, "[[rules]]\npath_pattern = \"^a$\"\n");

		let configs = discover_configs_from(&nested, home.path()).unwrap();
		assert_eq!(configs.len(), 2);
		assert_eq!(configs[0].path, nested.join(CONFIG_FILE_NAME));
		assert_eq!(configs[1].path, workspace.path().join(CONFIG_FILE_NAME));

		let merged = merge_configs(&configs);
		let patterns: Vec<_> = merged
			.rules
			.iter()
			.map(|r| r.rule.path_pattern.clone().unwrap())
			.collect();
		assert_eq!(patterns, vec!["^a$", "^b$"]);
	}

	#[test]
	fn test_root_config_still_reads_user_config() {
		let home = tempfile::tempdir().unwrap();
		let workspace = tempfile::tempdir().unwrap();

		write_config(workspace.path(), "root = true\n");
		write_config(home.path(), "[[rules]]\nremove = true\n");

		let configs = discover_configs_from(workspace.path(), home.path()).unwrap();
		assert_eq!(configs.len(), 2);
		assert_eq!(configs[1].path, home.path().join(CONFIG_FILE_NAME));
	}

	#[test]
	fn test_no_external_lookup_stops_everything() {
		let home = tempfile::tempdir().unwrap();
		let workspace = tempfile::tempdir().unwrap();
		let nested = workspace.path().join("app");
		fs::create_dir_all(&nested).unwrap();

		write_config(workspace.path(), "[[rules]]\nremove = true\n");
		write_config(&nested, "no-external-lookup = true\n");
		write_config(home.path(), "[[rules]]\nremove = true\n");

		let configs = discover_configs_from(&nested, home.path()).unwrap();
		assert_eq!(configs.len(), 1);
		assert!(merge_configs(&configs).no_external_lookup);
	}

	#[test]
	fn test_disable_env_var_skips_user_config() {
		let home = tempfile::tempdir().unwrap();
		let workspace = tempfile::tempdir().unwrap();

		write_config(
			workspace.path(),
			"root = true\nroot-config-lookup-disable-env-var = \"TEST_MODPATH_SKIP_USER\"\n",
		);
		write_config(home.path(), "[[rules]]\nremove = true\n");

		// SAFETY: this variable is only touched by this test
		unsafe {
			std::env::set_var("TEST_MODPATH_SKIP_USER", "1");
		}
		let configs = discover_configs_from(workspace.path(), home.path()).unwrap();
		unsafe {
			std::env::remove_var("TEST_MODPATH_SKIP_USER");
		}

		assert_eq!(configs.len(), 1);
	}

	#[test]
	fn test_invalid_config_in_cascade_is_an_error() {
		let home = tempfile::tempdir().unwrap();
		let workspace = tempfile::tempdir().unwrap();
		write_config(workspace.path(), "invalid toml [[[");

		let result = discover_configs_from(workspace.path(), home.path());
		assert!(matches!(
			result,
			Err(ModpathError::ConfigParseError { .. })
		));
	}

	#[test]
	fn test_user_config_path() {
		let path = user_config_path().unwrap();
		assert!(path.ends_with(CONFIG_FILE_NAME));
	}
}
