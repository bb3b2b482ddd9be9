/// Starter `.modpath.toml` written by `modpath --init`.
pub fn init_template() -> &'static str {
	r#"# modpath configuration
#
# Rules are checked in order for every module path found in a source file.
# The first rule whose `kinds` and `path_pattern` both match decides what
# happens to the path. Paths no rule matches are left as they are.

# Stop looking for .modpath.toml files in parent directories.
root = true

# Skip ~/.modpath.toml when this environment variable is truthy.
# root-config-lookup-disable-env-var = "CI"

# Add a .js extension to relative TypeScript imports.
[[rules]]
kinds = ["import", "export", "dynamic-import"]
path_pattern = '^\.\.?/'
path_rewrite = 's/\.ts$/.js/'

# Drop side-effect style imports of stylesheets.
# [[rules]]
# kinds = ["import"]
# path_pattern = '\.css$'
# remove = true
"#
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::parse_config_str;
	use std::path::Path;

	#[test]
	fn test_template_is_a_valid_config() {
		let config = parse_config_str(init_template(), Path::new(".modpath.toml")).unwrap();
		assert!(config.root);
		assert_eq!(config.rules.len(), 1);
		assert_eq!(config.rules[0].path_rewrite.as_deref(), Some(r"s/\.ts$/.js/"));
	}
}
