//! Single-pass module path rewriter.
//!
//! The scanner walks the source once, left to right, tracking whether the
//! current byte is plain code, part of a string literal, or part of a comment.
//! Only plain code can introduce a declaration. Everything the scanner does not
//! rewrite is copied through byte for byte.
//!
//! All positions are byte offsets. Every offset the scanner slices at sits on
//! an ASCII byte (a quote, a parenthesis, or the first letter of a keyword),
//! so slices always land on `char` boundaries.

use super::kind::{DependencyKind, ModulePath};
use std::borrow::Cow;
use std::convert::Infallible;
use tracing::warn;

/// Export modifiers that introduce a value or type declaration rather than a
/// re-export with a module path.
const NON_MODULE_EXPORT_KEYWORDS: &[&str] = &[
	"class",
	"var",
	"const",
	"let",
	"declare",
	"function",
	"namespace",
	"interface",
	"default",
	"enum",
];

/// `export type Alias = ...` declares a type, `export type { A } from "m"`
/// re-exports one. Only the token after `type` tells them apart.
const TYPE_KEYWORD: &str = "type";

const KEYWORD_LEN: usize = 6;

/// Rewrite every module path in `source` with `transform`.
///
/// `transform` receives the path exactly as written between its quotes and the
/// kind of declaration it belongs to:
/// - `Some(path)` replaces the text between the quotes.
/// - `None` removes the whole declaration, from the first letter of its
///   keyword through the closing quote (or the closing parenthesis of a
///   dynamic import).
///
/// Returns the source unchanged and unallocated when no path was found.
///
/// # Example
///
/// ```
/// use modpath_cli::scan::rewrite_module_paths;
///
/// let out = rewrite_module_paths("import a from './a';", |path, _| Some(format!("{path}.js")));
/// assert_eq!(out, "import a from './a.js';");
/// ```
pub fn rewrite_module_paths<F>(source: &str, mut transform: F) -> Cow<'_, str>
where
	F: FnMut(&str, DependencyKind) -> Option<String>,
{
	match try_rewrite_module_paths(source, |path, kind| {
		Ok::<_, Infallible>(transform(path, kind))
	}) {
		Ok(rewritten) => rewritten,
		Err(never) => match never {},
	}
}

/// Fallible variant of [`rewrite_module_paths`].
///
/// The first error returned by `transform` stops the scan and is returned
/// as-is.
pub fn try_rewrite_module_paths<F, E>(source: &str, transform: F) -> Result<Cow<'_, str>, E>
where
	F: FnMut(&str, DependencyKind) -> Result<Option<String>, E>,
{
	Scanner::new(source, transform).run()
}

/// List every module path in `source`, in source order.
pub fn collect_module_paths(source: &str) -> Vec<ModulePath> {
	let mut found = Vec::new();
	rewrite_module_paths(source, |path, kind| {
		found.push(ModulePath {
			path: path.to_string(),
			kind,
		});
		Some(path.to_string())
	});
	found
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
	Single,
	Double,
	Backtick,
}

impl Quote {
	fn from_byte(byte: u8) -> Option<Self> {
		match byte {
			b'\'' => Some(Quote::Single),
			b'"' => Some(Quote::Double),
			b'`' => Some(Quote::Backtick),
			_ => None,
		}
	}

	fn as_byte(self) -> u8 {
		match self {
			Quote::Single => b'\'',
			Quote::Double => b'"',
			Quote::Backtick => b'`',
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
	Code,
	String(Quote),
	BlockComment,
	LineComment,
}

/// How far a pending static declaration has read its binding clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
	/// Nothing read yet that constrains the next token.
	Open,
	/// Inside `{ ... }` at this depth.
	Braces(usize),
	/// After `*`, only `as` or `from` may follow.
	Star,
	/// After `* as`, the namespace name follows.
	Alias,
	/// After a named list or namespace, only `from` may follow.
	Complete,
}

/// Byte range of a quoted literal, quotes included at `start` and `end`.
#[derive(Debug, Clone, Copy)]
struct Literal {
	start: usize,
	end: usize,
}

struct Scanner<'s, F> {
	source: &'s str,
	bytes: &'s [u8],
	transform: F,

	output: String,
	edited: bool,
	/// Everything before this offset is already in `output`.
	write_index: usize,

	context: Context,
	string_start: usize,

	kind: Option<DependencyKind>,
	module_start: usize,
	/// `import` was just read and nothing significant followed yet.
	awaiting_call: bool,
	/// Still inside the modifier run right after `export`.
	export_modifiers: bool,
	word_start: Option<usize>,
	type_pending: bool,
	clause: Clause,
	/// The last significant code byte was a member-access `.`.
	after_dot: bool,

	/// Quoted literals seen inside the current `import(...)` argument.
	candidates: Vec<Literal>,
	interpolated: bool,
	paren_depth: usize,
	/// Past the first top-level comma, reading import options.
	in_options: bool,
}

impl<'s, F, E> Scanner<'s, F>
where
	F: FnMut(&str, DependencyKind) -> Result<Option<String>, E>,
{
	fn new(source: &'s str, transform: F) -> Self {
		Scanner {
			source,
			bytes: source.as_bytes(),
			transform,
			output: String::new(),
			edited: false,
			write_index: 0,
			context: Context::Code,
			string_start: 0,
			kind: None,
			module_start: 0,
			awaiting_call: false,
			export_modifiers: false,
			word_start: None,
			type_pending: false,
			clause: Clause::Open,
			after_dot: false,
			candidates: Vec::new(),
			interpolated: false,
			paren_depth: 0,
			in_options: false,
		}
	}

	fn run(mut self) -> Result<Cow<'s, str>, E> {
		let mut index = 0;
		while index < self.bytes.len() {
			index = match self.context {
				Context::Code => self.step_code(index)?,
				Context::String(quote) => self.step_string(index, quote)?,
				Context::BlockComment => self.step_block_comment(index),
				Context::LineComment => self.step_line_comment(index),
			};
		}

		// Unterminated strings and comments fall through here untouched.
		if !self.edited {
			return Ok(Cow::Borrowed(self.source));
		}
		self.output.push_str(&self.source[self.write_index..]);
		Ok(Cow::Owned(self.output))
	}

	fn step_code(&mut self, index: usize) -> Result<usize, E> {
		let byte = self.bytes[index];
		let next = self.bytes.get(index + 1).copied();

		if byte == b'/' && matches!(next, Some(b'*' | b'/')) {
			self.end_word(index);
			self.context = if next == Some(b'*') {
				Context::BlockComment
			} else {
				Context::LineComment
			};
			return Ok(index + 2);
		}

		let after_dot = self.after_dot;
		if !byte.is_ascii_whitespace() {
			// `...import(...)` spreads, `obj.import(...)` is a method call.
			self.after_dot = byte == b'.' && !self.bytes[..index].ends_with(b"..");
		}

		if let Some(quote) = Quote::from_byte(byte) {
			self.end_word(index);
			self.export_modifiers = false;
			self.type_pending = false;
			self.awaiting_call = false;
			self.context = Context::String(quote);
			self.string_start = index;
			return Ok(index + 1);
		}

		if self.kind == Some(DependencyKind::Export) && self.export_modifiers {
			if is_identifier_byte(byte) {
				if self.type_pending {
					// `export type Alias = ...`
					self.cancel_declaration();
				} else if self.word_start.is_none() {
					self.word_start = Some(index);
				}
				return Ok(index + 1);
			}
			self.end_word(index);
			if !byte.is_ascii_whitespace() {
				self.export_modifiers = false;
				self.type_pending = false;
			}
			if self.kind.is_none() {
				return Ok(index + 1);
			}
		}

		if byte.is_ascii_whitespace() {
			return Ok(index + 1);
		}

		match self.kind {
			Some(DependencyKind::DynamicImport) => {
				self.step_dynamic_argument(index, byte)?;
				return Ok(index + 1);
			}
			Some(DependencyKind::Import) if self.awaiting_call && byte == b'(' => {
				self.kind = Some(DependencyKind::DynamicImport);
				self.candidates.clear();
				self.interpolated = false;
				self.paren_depth = 1;
				self.in_options = false;
				self.awaiting_call = false;
				return Ok(index + 1);
			}
			_ => {}
		}
		self.awaiting_call = false;

		if self.kind.is_some()
			&& let Some(next) = self.step_clause(index, byte)
		{
			return Ok(next);
		}

		if !after_dot && let Some(kind) = self.keyword_at(index) {
			self.kind = Some(kind);
			self.module_start = index;
			self.awaiting_call = kind == DependencyKind::Import;
			self.export_modifiers = kind == DependencyKind::Export;
			self.word_start = None;
			self.type_pending = false;
			self.clause = Clause::Open;
			return Ok(index + KEYWORD_LEN);
		}

		Ok(index + 1)
	}

	/// Follow the binding clause of a pending static declaration. Returns the
	/// next offset when `byte` was consumed here.
	fn step_clause(&mut self, index: usize, byte: u8) -> Option<usize> {
		match (self.clause, byte) {
			// `import.meta`, `export { a };`, `import x = require("y")`
			(_, b';' | b'.' | b'=') => self.cancel_declaration(),
			(Clause::Braces(depth), b'{') => self.clause = Clause::Braces(depth + 1),
			(Clause::Braces(1), b'}') => self.clause = Clause::Complete,
			(Clause::Braces(depth), b'}') => self.clause = Clause::Braces(depth - 1),
			(Clause::Braces(_), _) => {}
			(Clause::Open, b'{') => self.clause = Clause::Braces(1),
			(Clause::Open, b'*') => self.clause = Clause::Star,
			(Clause::Open, _) => return None,
			_ if is_identifier_byte(byte) => return Some(self.step_clause_word(index)),
			_ => self.cancel_declaration(),
		}
		Some(index + 1)
	}

	/// Read the word starting at `index` after a list or `*`. Anything but the
	/// expected word abandons the declaration and is scanned again as code.
	fn step_clause_word(&mut self, index: usize) -> usize {
		let end = self.bytes[index..]
			.iter()
			.position(|&byte| !is_identifier_byte(byte))
			.map_or(self.bytes.len(), |len| index + len);

		let source = self.source;
		match (self.clause, &source[index..end]) {
			(Clause::Alias, _) => self.clause = Clause::Complete,
			(_, "from") => self.clause = Clause::Open,
			(Clause::Star, "as") => self.clause = Clause::Alias,
			_ => {
				self.cancel_declaration();
				return index;
			}
		}
		end
	}

	fn step_string(&mut self, index: usize, quote: Quote) -> Result<usize, E> {
		let byte = self.bytes[index];
		if byte == b'\\' {
			return Ok(index + 2);
		}
		if byte != quote.as_byte() {
			return Ok(index + 1);
		}

		self.context = Context::Code;
		self.close_string(index, quote)?;
		Ok(index + 1)
	}

	fn step_block_comment(&mut self, index: usize) -> usize {
		if self.bytes[index] == b'*' && self.bytes.get(index + 1) == Some(&b'/') {
			self.context = Context::Code;
			return index + 2;
		}
		index + 1
	}

	fn step_line_comment(&mut self, index: usize) -> usize {
		if self.bytes[index] == b'\n' {
			self.context = Context::Code;
		}
		index + 1
	}

	fn step_dynamic_argument(&mut self, index: usize, byte: u8) -> Result<(), E> {
		match byte {
			b',' if self.paren_depth == 1 => self.in_options = true,
			b'(' => self.paren_depth += 1,
			b')' => {
				self.paren_depth -= 1;
				if self.paren_depth == 0 {
					self.close_dynamic_import(index)?;
				}
			}
			_ => {}
		}
		Ok(())
	}

	/// `end` is the offset of the closing quote.
	fn close_string(&mut self, end: usize, quote: Quote) -> Result<(), E> {
		let start = self.string_start;
		let source = self.source;

		match self.kind {
			None => {}
			Some(DependencyKind::DynamicImport) if self.in_options => {}
			Some(DependencyKind::DynamicImport) => {
				if quote == Quote::Backtick && source[start + 1..end].contains("${") {
					self.interpolated = true;
				}
				self.candidates.push(Literal { start, end });
			}
			Some(kind) => match self.clause {
				// `{ "string name" as x }`
				Clause::Braces(_) => {}
				// `* as "string name"`
				Clause::Alias => self.clause = Clause::Complete,
				Clause::Star | Clause::Complete => self.cancel_declaration(),
				Clause::Open => {
					self.kind = None;
					let literal = Literal { start, end };
					match (self.transform)(&source[start + 1..end], kind)? {
						Some(path) => self.splice(literal, &path),
						None => self.remove_declaration(end + 1),
					}
				}
			},
		}
		Ok(())
	}

	/// `close` is the offset of the `)` ending the call.
	fn close_dynamic_import(&mut self, close: usize) -> Result<(), E> {
		self.kind = None;
		let source = self.source;

		let literal = match self.candidates.as_slice() {
			[literal] if !self.interpolated => *literal,
			_ => {
				warn!(
					import = &source[self.module_start..=close],
					candidates = self.candidates.len(),
					"dynamic import is not statically analyzable, only import('path') can be rewritten"
				);
				return Ok(());
			}
		};

		let path = &source[literal.start + 1..literal.end];
		match (self.transform)(path, DependencyKind::DynamicImport)? {
			Some(path) => self.splice(literal, &path),
			None => self.remove_declaration(close + 1),
		}
		Ok(())
	}

	/// Replace the contents of `literal`, keeping both quotes.
	fn splice(&mut self, literal: Literal, path: &str) {
		self.output
			.push_str(&self.source[self.write_index..=literal.start]);
		self.output.push_str(path);
		self.write_index = literal.end;
		self.edited = true;
	}

	/// Drop everything from the declaration keyword up to `end`.
	fn remove_declaration(&mut self, end: usize) {
		debug_assert!(self.write_index <= self.module_start);
		self.output
			.push_str(&self.source[self.write_index..self.module_start]);
		self.write_index = end;
		self.edited = true;
	}

	fn cancel_declaration(&mut self) {
		self.kind = None;
		self.awaiting_call = false;
		self.export_modifiers = false;
		self.word_start = None;
		self.type_pending = false;
		self.clause = Clause::Open;
	}

	/// Check the modifier word ending at `end` against the non-module keywords.
	fn end_word(&mut self, end: usize) {
		let Some(start) = self.word_start.take() else {
			return;
		};
		if self.kind != Some(DependencyKind::Export) {
			return;
		}

		let word = &self.source[start..end];
		if word == TYPE_KEYWORD {
			self.type_pending = true;
		} else if NON_MODULE_EXPORT_KEYWORDS.contains(&word) {
			self.cancel_declaration();
		}
	}

	/// `import` or `export` as a whole word starting at `index`.
	fn keyword_at(&self, index: usize) -> Option<DependencyKind> {
		if index > 0 && is_identifier_byte(self.bytes[index - 1]) {
			return None;
		}

		let rest = &self.bytes[index..];
		let kind = if rest.starts_with(b"import") {
			DependencyKind::Import
		} else if rest.starts_with(b"export") {
			DependencyKind::Export
		} else {
			return None;
		};

		match self.bytes.get(index + KEYWORD_LEN) {
			Some(&after) if is_identifier_byte(after) => None,
			_ => Some(kind),
		}
	}
}

/// Bytes that can continue a JavaScript identifier. Non-ASCII bytes count so a
/// keyword glued to a Unicode identifier is never matched.
fn is_identifier_byte(byte: u8) -> bool {
	byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$' || byte >= 0x80
}
