use crate::config::types::{MergedConfig, Rule, RuleWithSource};
use crate::error::{ModpathError, Result};
use crate::rules::substitution::Substitution;
use crate::scan::DependencyKind;
use regex::Regex;
use std::path::PathBuf;

/// A module path as seen by the rules.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
	/// The path as written between its quotes.
	pub path: &'a str,

	/// The declaration the path belongs to.
	pub kind: DependencyKind,
}

/// What a matching rule does with a path.
#[derive(Debug)]
pub enum RuleAction {
	/// Leave the path alone and stop looking at later rules.
	Keep,
	/// Rewrite the path.
	Rewrite(Substitution),
	/// Remove the whole declaration.
	Remove,
}

/// A compiled rule ready for matching.
#[derive(Debug)]
pub struct CompiledRule {
	/// The original rule.
	pub rule: Rule,

	/// Compiled path pattern regex.
	pub path_regex: Option<Regex>,

	/// Action taken when the rule matches.
	pub action: RuleAction,

	/// Source config path (for debugging).
	pub source: PathBuf,
}

impl CompiledRule {
	/// Compile a rule from a RuleWithSource.
	pub fn from_rule_with_source(rws: &RuleWithSource) -> Result<Self> {
		let path_regex = rws
			.rule
			.path_pattern
			.as_deref()
			.map(compile_regex)
			.transpose()?;

		let action = match (&rws.rule.path_rewrite, rws.rule.remove) {
			(Some(_), true) => {
				return Err(ModpathError::MutuallyExclusive {
					option1: "path_rewrite".to_string(),
					option2: "remove".to_string(),
				});
			}
			(Some(expression), false) => RuleAction::Rewrite(Substitution::parse(expression)?),
			(None, true) => RuleAction::Remove,
			(None, false) => RuleAction::Keep,
		};

		Ok(CompiledRule {
			rule: rws.rule.clone(),
			path_regex,
			action,
			source: rws.source.clone(),
		})
	}

	/// Check if this rule matches the given context.
	pub fn matches(&self, ctx: &MatchContext) -> bool {
		if !self.rule.applies_to(ctx.kind) {
			return false;
		}

		self.path_regex
			.as_ref()
			.is_none_or(|regex| regex.is_match(ctx.path))
	}

	/// Transform result for a path this rule matched.
	pub fn apply(&self, path: &str) -> Option<String> {
		match &self.action {
			RuleAction::Keep => Some(path.to_string()),
			RuleAction::Rewrite(substitution) => Some(substitution.apply(path)),
			RuleAction::Remove => None,
		}
	}
}

/// Compile a regex pattern string.
fn compile_regex(pattern: &str) -> Result<Regex> {
	Regex::new(pattern).map_err(|source| ModpathError::InvalidRegex {
		pattern: pattern.to_string(),
		source,
	})
}

/// Compile all rules in a merged config.
pub fn compile_rules(config: &MergedConfig) -> Result<Vec<CompiledRule>> {
	config
		.rules
		.iter()
		.map(CompiledRule::from_rule_with_source)
		.collect()
}

/// Find the first matching rule for a given context.
pub fn find_matching_rule<'a>(
	rules: &'a [CompiledRule],
	ctx: &MatchContext,
) -> Option<&'a CompiledRule> {
	rules.iter().find(|rule| rule.matches(ctx))
}
