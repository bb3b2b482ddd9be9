use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use modpath_cli::config::{
	CONFIG_FILE_NAME, LoadedConfig, discover_configs, init_template,
	load_merged_config, merge_configs, parse_config_file, user_config_path,
};
use modpath_cli::files::{
	FileRewrite, list_file, read_stdin, rewrite_file, rewrite_source, write_back,
};
use modpath_cli::logging::init_logging;
use modpath_cli::rules::{CompiledRule, compile_rules};
use modpath_cli::scan::collect_module_paths;

#[derive(Parser)]
#[command(name = "modpath")]
#[command(
	author,
	version,
	about = "Rewrite import and export module paths in JavaScript and TypeScript sources"
)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Create a template .modpath.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .modpath.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,

	/// Load rules from this file instead of the .modpath.toml cascade
	#[arg(long = "config", value_name = "FILE")]
	config_file: Option<PathBuf>,

	/// Rewrite files in place instead of printing them to stdout
	#[arg(short, long, conflicts_with_all = ["check", "list"])]
	write: bool,

	/// Exit with status 1 if any file would be rewritten
	#[arg(long, conflicts_with = "list")]
	check: bool,

	/// Print every module path found instead of rewriting
	#[arg(long)]
	list: bool,

	/// Source files to process; reads stdin when none are given
	#[arg(value_name = "FILE")]
	files: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display every config file in the cascade with its rules
	Show,
	/// Check all config files for errors without touching any source
	Validate,
}

/// What to do with each source once the rules are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
	Print,
	Write,
	Check,
	List,
}

fn main() -> ExitCode {
	init_logging();

	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();

	if cli.init {
		return handle_init(cli.force);
	}

	if let Some(command) = cli.command {
		return match command {
			Commands::Config { action } => match action {
				ConfigAction::Show => handle_config_show(),
				ConfigAction::Validate => handle_config_validate(),
			},
		};
	}

	let mode = if cli.write {
		Mode::Write
	} else if cli.check {
		Mode::Check
	} else if cli.list {
		Mode::List
	} else {
		Mode::Print
	};

	if cli.files.is_empty() {
		if mode == Mode::Write {
			anyhow::bail!("--write needs at least one FILE");
		}
		return handle_stdin(mode, cli.config_file.as_deref());
	}

	handle_files(&cli.files, mode, cli.config_file.as_deref())
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAME);

	if config_path.exists() && !force {
		anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
	}

	std::fs::write(&config_path, init_template())
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {CONFIG_FILE_NAME}");
	Ok(ExitCode::SUCCESS)
}

fn handle_config_show() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let configs = discover_configs(&cwd).context("Failed to discover config files")?;

	if configs.is_empty() {
		println!("No configuration files found.");
		return Ok(ExitCode::SUCCESS);
	}

	println!("Configuration files (in cascade order):\n");

	for loaded in &configs {
		println!("# Source: {}", loaded.path.display());
		println!("# root: {}", loaded.config.root);
		println!("# no-external-lookup: {}", loaded.config.no_external_lookup);
		if let Some(ref env_var) = loaded.config.root_config_lookup_disable_env_var {
			println!("# root-config-lookup-disable-env-var: {}", env_var);
		}
		println!("# rules: {}", loaded.config.rules.len());
		println!();

		for (i, rule) in loaded.config.rules.iter().enumerate() {
			println!("  Rule {}:", i + 1);
			if let Some(ref kinds) = rule.kinds {
				let kinds: Vec<_> = kinds.iter().map(|kind| kind.as_str()).collect();
				println!("    kinds: {}", kinds.join(", "));
			}
			if let Some(ref pattern) = rule.path_pattern {
				println!("    path_pattern: {}", pattern);
			}
			if let Some(ref rewrite) = rule.path_rewrite {
				println!("    path_rewrite: {}", rewrite);
			}
			if rule.remove {
				println!("    remove: true");
			}
			println!();
		}
	}

	if let Ok(user_path) = user_config_path() {
		println!("User config path: {}", user_path.display());
		if user_path.exists() {
			println!("  (exists)");
		} else {
			println!("  (not found)");
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;

	let configs = match discover_configs(&cwd) {
		Ok(configs) => configs,
		Err(e) => {
			eprintln!("Configuration error: {:?}", anyhow::Error::from(e));
			return Ok(ExitCode::FAILURE);
		}
	};

	// Regexes and substitutions only fail once compiled.
	if let Err(e) = compile_rules(&merge_configs(&configs)) {
		eprintln!("Configuration error: {:?}", anyhow::Error::from(e));
		return Ok(ExitCode::FAILURE);
	}

	if configs.is_empty() {
		println!("No configuration files found.");
	} else {
		println!("All configuration files are valid:");
		for loaded in &configs {
			println!(
				"  {} ({} rules)",
				loaded.path.display(),
				loaded.config.rules.len()
			);
		}
	}
	Ok(ExitCode::SUCCESS)
}

fn load_rules(config_file: Option<&Path>) -> Result<Vec<CompiledRule>> {
	let merged = match config_file {
		Some(path) => {
			let config = parse_config_file(path)
				.with_context(|| format!("Failed to load {}", path.display()))?;
			merge_configs(&[LoadedConfig {
				config,
				path: path.to_path_buf(),
			}])
		}
		None => {
			let cwd = std::env::current_dir().context("Failed to get current directory")?;
			load_merged_config(&cwd).context("Failed to load configuration")?
		}
	};

	compile_rules(&merged).context("Failed to compile rules")
}

fn handle_stdin(mode: Mode, config_file: Option<&Path>) -> Result<ExitCode> {
	let source = read_stdin().context("Failed to read stdin")?;

	if mode == Mode::List {
		for found in collect_module_paths(&source) {
			println!("{found}");
		}
		return Ok(ExitCode::SUCCESS);
	}

	let rules = load_rules(config_file)?;
	let rewrite = rewrite_source(Path::new("<stdin>"), source, &rules);

	if mode == Mode::Check {
		return Ok(check_exit_code(&[rewrite]));
	}

	print_contents(&rewrite)?;
	Ok(ExitCode::SUCCESS)
}

fn handle_files(files: &[PathBuf], mode: Mode, config_file: Option<&Path>) -> Result<ExitCode> {
	if mode == Mode::List {
		for file in files {
			let found = list_file(file)?;
			for module_path in found {
				println!("{}\t{module_path}", file.display());
			}
		}
		return Ok(ExitCode::SUCCESS);
	}

	let rules = load_rules(config_file)?;
	let mut rewrites = Vec::with_capacity(files.len());
	for file in files {
		let rewrite = rewrite_file(file, &rules)?;
		match mode {
			Mode::Write => {
				if write_back(&rewrite)? {
					println!("Rewrote {}", file.display());
				}
			}
			Mode::Print => print_contents(&rewrite)?,
			Mode::Check | Mode::List => {}
		}
		rewrites.push(rewrite);
	}

	if mode == Mode::Check {
		return Ok(check_exit_code(&rewrites));
	}
	Ok(ExitCode::SUCCESS)
}

fn check_exit_code(rewrites: &[FileRewrite]) -> ExitCode {
	let changed: Vec<_> = rewrites.iter().filter(|r| r.changed()).collect();
	for rewrite in &changed {
		println!("Would rewrite {}", rewrite.path.display());
	}

	if changed.is_empty() {
		ExitCode::SUCCESS
	} else {
		ExitCode::from(1)
	}
}

fn print_contents(rewrite: &FileRewrite) -> Result<()> {
	let mut stdout = std::io::stdout().lock();
	stdout
		.write_all(rewrite.contents().as_bytes())
		.context("Failed to write to stdout")?;
	stdout.flush().context("Failed to write to stdout")
}
