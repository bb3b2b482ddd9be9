use crate::error::{ModpathError, Result};
use regex::Regex;

/// Parsed sed-like substitution, e.g. `s/\.ts$/.js/` or `s#^~/#./src/#g`.
#[derive(Debug)]
pub struct Substitution {
	/// The pattern to match.
	pub pattern: Regex,

	/// The replacement string. `$1`-style capture references are expanded.
	pub replacement: String,

	/// Whether to replace all occurrences (global flag).
	pub global: bool,
}

impl Substitution {
	/// Parse `s<d>pattern<d>replacement<d>[flags]` where `<d>` is any delimiter
	/// character. A backslash before the delimiter escapes it.
	pub fn parse(expression: &str) -> Result<Self> {
		let invalid = |reason: &str| ModpathError::InvalidSubstitution {
			expression: expression.to_string(),
			reason: reason.to_string(),
		};

		let body = expression
			.strip_prefix('s')
			.ok_or_else(|| invalid("must start with 's'"))?;
		let mut chars = body.chars();
		let delimiter = chars.next().ok_or_else(|| invalid("missing delimiter"))?;
		if delimiter.is_alphanumeric() || delimiter == '\\' {
			return Err(invalid("delimiter must be punctuation"));
		}

		let parts = split_unescaped(chars.as_str(), delimiter);
		let [pattern, replacement, flags] = match <[String; 3]>::try_from(parts) {
			Ok(parts) => parts,
			Err(_) => return Err(invalid("expected pattern, replacement and flags")),
		};

		let global = match flags.as_str() {
			"" => false,
			"g" => true,
			_ => return Err(invalid("only the 'g' flag is supported")),
		};

		let pattern = Regex::new(&pattern).map_err(|source| ModpathError::InvalidRegex {
			pattern: pattern.clone(),
			source,
		})?;

		Ok(Substitution {
			pattern,
			replacement,
			global,
		})
	}

	/// Apply this substitution to a module path.
	pub fn apply(&self, path: &str) -> String {
		if self.global {
			self.pattern.replace_all(path, &self.replacement).into_owned()
		} else {
			self.pattern.replace(path, &self.replacement).into_owned()
		}
	}
}

/// Split on `delimiter`, dropping the backslash from escaped delimiters.
fn split_unescaped(input: &str, delimiter: char) -> Vec<String> {
	let mut parts = Vec::new();
	let mut current = String::new();
	let mut chars = input.chars().peekable();

	while let Some(c) = chars.next() {
		if c == '\\' && chars.peek() == Some(&delimiter) {
			current.push(delimiter);
			chars.next();
		} else if c == delimiter {
			parts.push(std::mem::take(&mut current));
		} else {
			current.push(c);
		}
	}
	parts.push(current);

	parts
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_simple_substitution() {
		let sub = Substitution::parse(r"s/\.ts$/.js/").unwrap();
		assert_eq!(sub.replacement, ".js");
		assert!(!sub.global);
		assert_eq!(sub.apply("./mod.ts"), "./mod.js");
		assert_eq!(sub.apply("./mod.tsx"), "./mod.tsx");
	}

	#[test]
	fn test_parse_global_substitution() {
		let sub = Substitution::parse("s/-/_/g").unwrap();
		assert!(sub.global);
		assert_eq!(sub.apply("a-b-c"), "a_b_c");
	}

	#[test]
	fn test_non_global_replaces_first_match() {
		let sub = Substitution::parse("s/-/_/").unwrap();
		assert_eq!(sub.apply("a-b-c"), "a_b-c");
	}

	#[test]
	fn test_parse_different_delimiter() {
		let sub = Substitution::parse("s#^~/#./src/#").unwrap();
		assert_eq!(sub.apply("~/util"), "./src/util");
	}

	#[test]
	fn test_parse_escaped_delimiter() {
		let sub = Substitution::parse(r"s/^@app\//.\/app\//").unwrap();
		assert_eq!(sub.replacement, "./app/");
		assert_eq!(sub.apply("@app/button"), "./app/button");
	}

	#[test]
	fn test_capture_groups() {
		let sub = Substitution::parse(r"s/^npm:(.+)@[^@]+$/$1/").unwrap();
		assert_eq!(sub.apply("npm:express@4.18.0"), "express");
	}

	#[test]
	fn test_invalid_substitution_no_s() {
		assert!(matches!(
			Substitution::parse("foo/bar/"),
			Err(ModpathError::InvalidSubstitution { .. })
		));
	}

	#[test]
	fn test_invalid_substitution_too_short() {
		assert!(Substitution::parse("s").is_err());
		assert!(Substitution::parse("s/foo/").is_err());
	}

	#[test]
	fn test_unknown_flag() {
		assert!(Substitution::parse("s/a/b/i").is_err());
	}

	#[test]
	fn test_invalid_regex() {
		match Substitution::parse("s/[a/b/") {
			Err(ModpathError::InvalidRegex { pattern, .. }) => assert_eq!(pattern, "[a"),
			other => panic!("Expected InvalidRegex error, got {other:?}"),
		}
	}
}
