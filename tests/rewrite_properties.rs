use modpath_cli::scan::{DependencyKind, rewrite_module_paths};
use proptest::prelude::*;

/// Tokens that exercise every scanner context and declaration form.
const TOKENS: &[&str] = &[
	"import",
	"export",
	" from ",
	"'./a'",
	"\"b\"",
	"`c${d}`",
	"(",
	")",
	";",
	"\n",
	"/*",
	"*/",
	"//",
	"\\",
	" const ",
	" type ",
	"{ x }",
];

fn fragment() -> impl Strategy<Value = String> {
	prop_oneof![
		3 => prop::sample::select(TOKENS).prop_map(str::to_string),
		1 => "[a-zA-Z_$ .*]{0,6}",
		1 => "\\PC{0,4}",
	]
}

fn source() -> impl Strategy<Value = String> {
	prop::collection::vec(fragment(), 0..24).prop_map(|parts| parts.concat())
}

fn identity(path: &str, _kind: DependencyKind) -> Option<String> {
	Some(path.to_string())
}

proptest! {
	#[test]
	fn identity_transform_preserves_source(src in source()) {
		prop_assert_eq!(rewrite_module_paths(&src, identity), src.as_str());
	}

	#[test]
	fn rewrite_is_idempotent_under_identity(src in source()) {
		let once = rewrite_module_paths(&src, identity).into_owned();
		let twice = rewrite_module_paths(&once, identity).into_owned();
		prop_assert_eq!(once, twice);
	}

	#[test]
	fn comments_are_never_scanned(body in "[^*]{0,40}") {
		let src = format!("/* {body} import a from 'a'; import('b') */\n");
		let mut calls = 0;
		let out = rewrite_module_paths(&src, |_, _| {
			calls += 1;
			None
		});
		prop_assert_eq!(calls, 0);
		prop_assert_eq!(out, src.as_str());
	}

	#[test]
	fn prefix_only_touches_path_text(path in "[a-z./@-]{0,12}") {
		let src = format!("import x from '{path}';\nexport * from \"{path}\";\nimport('{path}');");
		let out = rewrite_module_paths(&src, |p, _| Some(format!("___{p}")));
		let expected = format!(
			"import x from '___{path}';\nexport * from \"___{path}\";\nimport('___{path}');"
		);
		prop_assert_eq!(out, expected.as_str());
	}

	#[test]
	fn removal_only_leaves_trailing_text(path in "[a-z./@-]{0,12}") {
		let src = format!("import x from '{path}';\nimport('{path}');");
		let out = rewrite_module_paths(&src, |_, _| None);
		prop_assert_eq!(out, ";\n;");
	}
}
