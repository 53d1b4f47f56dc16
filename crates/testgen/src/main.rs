use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

use testgen_core::config::{Config, CONFIG_FILE};
use testgen_core::{
    GenError, GenerationReport, MockSynthesizer, Outcome, Project, TemplateRenderer,
    UnitTestSynthesizer,
};
use testgen_cpp::CppExtractor;
use testgen_report::{json, text};

#[derive(Parser)]
#[command(name = "testgen")]
#[command(about = "Generate GoogleTest skeletons, GoogleMock doubles and CMake test lists")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (defaults to testgen.toml in the nearest ancestor)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format for the generation report
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Log every generation decision
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate unit tests or mocks from headers
    Gen(GenArgs),
    /// Create a default testgen.toml in the current directory
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).args(["unit_test", "mock"])))]
struct GenArgs {
    /// Header or directory to generate unit tests for (directories are walked recursively)
    #[arg(long, value_name = "PATH")]
    unit_test: Option<PathBuf>,

    /// Header to generate a mock for
    #[arg(long, value_name = "HEADER")]
    mock: Option<PathBuf>,

    /// Overwrite existing unit tests
    #[arg(long)]
    force: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Mistakes in the invocation itself.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct UsageError(String);

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }

    let result = match &cli.command {
        Commands::Gen(args) => cmd_gen(&cli, args),
        Commands::Init { force } => cmd_init(&cli, *force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(exit_code(&e));
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("TESTGEN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// 1 for user-input errors, 2 for everything else.
fn exit_code(error: &anyhow::Error) -> i32 {
    let user_error = error.downcast_ref::<UsageError>().is_some()
        || error
            .downcast_ref::<GenError>()
            .is_some_and(GenError::is_user_error);
    if user_error {
        1
    } else {
        2
    }
}

fn cmd_gen(cli: &Cli, args: &GenArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let project = load_project(&cwd, cli.config.as_deref())?;
    let extractor = CppExtractor::new();
    let renderer = TemplateRenderer::new();
    let mut report = GenerationReport::new();

    let outcome = match (&args.unit_test, &args.mock) {
        (Some(path), _) => UnitTestSynthesizer::new(&project, &extractor, &renderer)
            .synthesize_tree(&cwd.join(path), args.force, &mut report),
        (None, Some(header)) => MockSynthesizer::new(&project, &extractor, &renderer)
            .synthesize_mock(&cwd.join(header), &mut report)
            .map(|_| ()),
        (None, None) => Err(GenError::Config(
            "one of --unit-test or --mock is required".to_string(),
        )),
    };

    let error = outcome.as_ref().err().map(ToString::to_string);
    print_report("gen", &report, error.as_deref(), cli.format)?;
    outcome.map_err(anyhow::Error::from)
}

fn cmd_init(cli: &Cli, force: bool) -> Result<()> {
    let target = PathBuf::from(CONFIG_FILE);
    if target.exists() && !force {
        return Err(UsageError(format!(
            "{CONFIG_FILE} already exists. Use --force to overwrite."
        ))
        .into());
    }
    std::fs::write(&target, Config::default_toml())
        .with_context(|| format!("failed to write {CONFIG_FILE}"))?;

    let mut report = GenerationReport::new();
    report.record(target, Outcome::Written);
    print_report("init", &report, None, cli.format)
}

/// Resolve the project from an explicit config file, or from the nearest
/// `testgen.toml` above `cwd`.
fn load_project(cwd: &Path, config_path: Option<&Path>) -> Result<Project> {
    let (config, root) = match config_path {
        Some(p) => {
            let path = cwd.join(p);
            let config = Config::load(&path)?;
            let root = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.to_path_buf());
            (config, root.canonicalize().unwrap_or(root))
        }
        None => Config::load_or_default(cwd),
    };
    tracing::debug!(root = %root.display(), "resolved project root");
    Ok(Project::new(root, config)?)
}

fn print_report(
    command: &str,
    report: &GenerationReport,
    error: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text if error.is_some() && report.is_empty() => {}
        OutputFormat::Text => print!("{}", text::format_report(report)),
        OutputFormat::Json => {
            let out = json::format_report(command, report, error, false)
                .context("failed to serialize report")?;
            println!("{out}");
        }
    }
    Ok(())
}
