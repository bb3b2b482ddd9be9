//! Rule matching and path rewriting for modpath.
//!
//! This module handles:
//! - Matching module paths by declaration kind and regex
//! - Rewriting paths using sed-like substitutions
//! - Turning a rule list into the transform the scanner calls

pub mod matcher;
pub mod substitution;

pub use matcher::{CompiledRule, MatchContext, RuleAction, compile_rules, find_matching_rule};
pub use substitution::Substitution;

use crate::scan::{DependencyKind, rewrite_module_paths};
use std::borrow::Cow;
use tracing::debug;

/// Decide what happens to one module path. Paths no rule matches are kept.
pub fn apply_rules(rules: &[CompiledRule], path: &str, kind: DependencyKind) -> Option<String> {
	let ctx = MatchContext { path, kind };
	let Some(rule) = find_matching_rule(rules, &ctx) else {
		return Some(path.to_string());
	};

	let result = rule.apply(path);
	debug!(
		path,
		%kind,
		rule_source = %rule.source.display(),
		result = result.as_deref().unwrap_or("<removed>"),
		"rule matched"
	);
	result
}

/// Rewrite every module path in `source` with the first matching rule.
pub fn rewrite_with_rules<'s>(source: &'s str, rules: &[CompiledRule]) -> Cow<'s, str> {
	rewrite_module_paths(source, |path, kind| apply_rules(rules, path, kind))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{Rule, RuleWithSource};
	use std::path::PathBuf;

	fn compile_all(rules: Vec<Rule>) -> Vec<CompiledRule> {
		rules
			.into_iter()
			.map(|rule| {
				CompiledRule::from_rule_with_source(&RuleWithSource {
					rule,
					source: PathBuf::from("test.toml"),
				})
				.unwrap()
			})
			.collect()
	}

	#[test]
	fn test_rewrite_with_rules() {
		let rules = compile_all(vec![
			Rule {
				path_pattern: Some(r"\.css$".to_string()),
				kinds: Some(vec![DependencyKind::Import]),
				remove: true,
				..Default::default()
			},
			Rule {
				path_pattern: Some(r"^\.\.?/".to_string()),
				path_rewrite: Some(r"s/\.ts$/.js/".to_string()),
				..Default::default()
			},
		]);

		let source = "import './styles.css';
import { a } from './a.ts';
import React from 'react';
export * from '../b.ts';
const c = import('./c.ts');
";
		let expected = ";
import { a } from './a.js';
import React from 'react';
export * from '../b.js';
const c = import('./c.js');
";
		assert_eq!(rewrite_with_rules(source, &rules), expected);
	}

	#[test]
	fn test_no_rules_leaves_source_alone() {
		let source = "import a from './a.ts';";
		assert_eq!(rewrite_with_rules(source, &[]), source);
	}
}
