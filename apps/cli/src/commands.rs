//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use mdjson_core::driver::{collect_documents, write_outputs};
use mdjson_core::{BatchOutcome, Pipeline, ProgressReporter};
use mdjson_shared::{
    AppConfig, CONFIG_FILE_NAME, CollisionPolicy, OutputMode, TransformConfig, init_config,
    load_config, resolve_config_path,
};
use tracing::{error, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// mdjson — Markdown with front matter in, JSON out.
#[derive(Parser)]
#[command(
    name = "mdjson",
    version,
    about = "Convert Markdown documents with YAML front matter into JSON records.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./mdjson.toml, then ~/.mdjson/mdjson.toml).
    #[arg(long, global = true, env = "MDJSON_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Convert every Markdown file under a directory.
    Convert(ConvertArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `mdjson convert`. Flags override the config file.
#[derive(clap::Args, Debug)]
pub(crate) struct ConvertArgs {
    /// Directory containing Markdown sources.
    pub src: PathBuf,

    /// Output directory.
    #[arg(short, long, default_value = "dist")]
    pub out: PathBuf,

    /// Fold every document into a single nested JSON file.
    #[arg(long)]
    pub consolidate: bool,

    /// Name of the consolidated file (implies --consolidate).
    #[arg(long)]
    pub output_name: Option<String>,

    /// Typographic quotes and dashes.
    #[arg(long)]
    pub smartypants: bool,

    /// Render single newlines as <br />.
    #[arg(long)]
    pub breaks: bool,

    /// Disable GitHub-flavoured extensions.
    #[arg(long)]
    pub no_gfm: bool,

    /// Fail on documents that map to the same tree key instead of overwriting.
    #[arg(long)]
    pub strict_paths: bool,

    /// Pretty-print JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Stop at the first failed document and write nothing.
    #[arg(long)]
    pub fail_fast: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a config file with defaults.
    Init {
        /// Where to write it.
        #[arg(default_value = CONFIG_FILE_NAME)]
        path: PathBuf,
    },
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "mdjson=info",
        1 => "mdjson=debug",
        _ => "mdjson=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Convert(args) => cmd_convert(config_path, args).await,
        Command::Config { action } => match action {
            ConfigAction::Init { path } => cmd_config_init(&path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

/// Merge CLI flags over the loaded config.
fn transform_config(config: &AppConfig, args: &ConvertArgs) -> TransformConfig {
    let mut transform = TransformConfig::from(config);

    if args.consolidate || args.output_name.is_some() {
        transform.mode = OutputMode::Consolidated;
    }
    if let Some(name) = &args.output_name {
        transform.output_name = name.clone();
    }
    if args.strict_paths {
        transform.collisions = CollisionPolicy::Reject;
    }
    if args.pretty {
        transform.pretty = true;
    }
    if args.smartypants {
        transform.renderer.smartypants = true;
    }
    if args.breaks {
        transform.renderer.breaks = true;
    }
    if args.no_gfm {
        transform.renderer.gfm = false;
    }
    if args.fail_fast {
        transform.fail_fast = true;
    }

    transform
}

async fn cmd_convert(config_path: Option<&Path>, args: ConvertArgs) -> Result<()> {
    let config = load_config(config_path)?;
    let transform = transform_config(&config, &args);

    info!(
        src = %args.src.display(),
        out = %args.out.display(),
        mode = ?transform.mode,
        "converting markdown"
    );

    let fail_fast = transform.fail_fast;
    let pipeline = Pipeline::new(transform);
    let reporter = CliProgress::new();
    let src = args.src.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        let docs = collect_documents(&src)?;
        pipeline.process_batch(&docs, &reporter)
    })
    .await??;

    for failure in &outcome.failures {
        error!(path = %failure.path, error = %failure.error, "conversion failed");
    }

    if fail_fast && !outcome.is_success() {
        return Err(eyre!(
            "{} document(s) failed; nothing written",
            outcome.failures.len()
        ));
    }

    let out = args.out.clone();
    let outputs = outcome.outputs;
    let written = tokio::task::spawn_blocking(move || write_outputs(&out, &outputs)).await??;

    println!();
    println!("  Converted: {}", written.len());
    println!("  Failed:    {}", outcome.failures.len());
    println!("  Output:    {}", args.out.display());
    println!();

    if outcome.failures.is_empty() {
        Ok(())
    } else {
        Err(eyre!("{} document(s) failed", outcome.failures.len()))
    }
}

fn cmd_config_init(path: &Path) -> Result<()> {
    init_config(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    match resolve_config_path(config_path) {
        Some(path) => println!("# {}", path.display()),
        None => println!("# defaults (no config file found)"),
    }
    let config = load_config(config_path)?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn document_converted(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Converting [{current}/{total}] {path}"));
    }

    fn done(&self, _outcome: &BatchOutcome) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ConvertArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Convert(args) => args,
            Command::Config { .. } => panic!("expected convert"),
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let args = parse(&[
            "mdjson",
            "convert",
            "docs",
            "--output-name",
            "blog.json",
            "--smartypants",
            "--strict-paths",
            "--fail-fast",
        ]);
        let transform = transform_config(&AppConfig::default(), &args);

        assert_eq!(transform.mode, OutputMode::Consolidated);
        assert_eq!(transform.output_name, "blog.json");
        assert_eq!(transform.collisions, CollisionPolicy::Reject);
        assert!(transform.renderer.smartypants);
        assert!(transform.renderer.gfm);
        assert!(transform.fail_fast);
    }

    #[test]
    fn config_values_survive_without_flags() {
        let mut config = AppConfig::default();
        config.output.mode = OutputMode::Consolidated;
        config.output.filename = "site.json".into();
        config.renderer.breaks = true;

        let args = parse(&["mdjson", "convert", "docs"]);
        let transform = transform_config(&config, &args);

        assert_eq!(transform.mode, OutputMode::Consolidated);
        assert_eq!(transform.output_name, "site.json");
        assert!(transform.renderer.breaks);
        assert!(!transform.fail_fast);
        assert_eq!(args.out, PathBuf::from("dist"));
    }
}
