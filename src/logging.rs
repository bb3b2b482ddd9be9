//! Tracing setup for the `modpath` binary.
//!
//! The filter comes from `MODPATH_LOG`, falling back to `RUST_LOG`, and
//! defaults to `warn` so diagnostics about dynamic imports that cannot be
//! rewritten are always visible. `MODPATH_LOG_FORMAT=json` switches to one
//! JSON object per event.
//!
//! ```bash
//! MODPATH_LOG=debug modpath --write src/index.ts
//! MODPATH_LOG=modpath_cli::rules=debug MODPATH_LOG_FORMAT=json modpath src/index.ts
//! ```
//!
//! All output goes to stderr so it never mixes with rewritten sources on stdout.

use std::io::IsTerminal;
use tracing_subscriber::{EnvFilter, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
	Text,
	Json,
}

impl LogFormat {
	fn parse(value: &str) -> Self {
		match value.to_lowercase().as_str() {
			"json" => LogFormat::Json,
			_ => LogFormat::Text,
		}
	}

	fn from_env() -> Self {
		Self::parse(&std::env::var("MODPATH_LOG_FORMAT").unwrap_or_default())
	}
}

fn build_filter() -> EnvFilter {
	let directives = std::env::var("MODPATH_LOG")
		.or_else(|_| std::env::var("RUST_LOG"))
		.unwrap_or_else(|_| "warn".to_string());
	EnvFilter::builder().parse_lossy(directives)
}

/// Install the global subscriber.
pub fn init_logging() {
	let filter = build_filter();

	let result = match LogFormat::from_env() {
		LogFormat::Json => fmt()
			.json()
			.with_env_filter(filter)
			.with_writer(std::io::stderr)
			.try_init(),
		LogFormat::Text => fmt()
			.with_env_filter(filter)
			.with_writer(std::io::stderr)
			.with_ansi(std::io::stderr().is_terminal())
			.with_target(false)
			.try_init(),
	};

	if let Err(e) = result {
		eprintln!("warning: failed to initialize logging: {e}");
	}
}
