use std::io::{Read, Write};
use std::process::{Command, ExitCode};

use anyhow::{Context, Result, anyhow};
use buildgen_pipeline::{
    CommandStream, Config, generate, read_parser_output,
};
use buildgen_schemas::ParserOutput;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

// mimalloc noticeably speeds up the allocation-heavy graph stages.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Generates granular build rules for a project by condensing its
/// class-level dependency graph into the smallest cycle-free units and
/// emitting buildozer commands that create and wire them.
///
/// Reads the parser output (MessagePack) on stdin; writes the command
/// stream to stdout under --dry-run, otherwise hands it to buildozer.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    /// Regular expression selecting the classes to generate rules for.
    /// Substring match: `bfg` matches `com.bfg.Foo`.
    #[arg(long)]
    include: String,

    /// Regular expression of classes to ignore entirely.
    #[arg(long, default_value = buildgen_pipeline::DEFAULT_EXCLUDE_PATTERN)]
    exclude: String,

    /// Comma-separated directories where source files reside, relative
    /// to the workspace root.
    #[arg(
        long = "roots",
        value_delimiter = ',',
        default_value = "src/main/java,src/test/java"
    )]
    content_roots: Vec<Utf8PathBuf>,

    /// Extension probed when mapping classes to files on disk.
    #[arg(long, default_value = buildgen_pipeline::DEFAULT_SOURCE_EXT)]
    source_ext: String,

    /// Path to the project's workspace root.
    #[arg(long, default_value = ".")]
    workspace: Utf8PathBuf,

    /// File mapping class names to rule labels, one `class,label` per
    /// line.
    #[arg(long)]
    user_mapping: Option<Utf8PathBuf>,

    /// Comma-separated executables consulted for classes nothing else
    /// resolves, e.g. a lookup against an external index.
    #[arg(long, value_delimiter = ',')]
    external_resolvers: Vec<String>,

    /// Maximum fraction of include-matched classes allowed to stay
    /// unresolved before the run aborts.
    #[arg(
        long,
        default_value_t = buildgen_pipeline::DEFAULT_UNRESOLVED_THRESHOLD
    )]
    unresolved_threshold: f64,

    /// Path to the buildozer binary.
    #[arg(long, default_value = "/usr/bin/buildozer")]
    buildozer: String,

    /// Print the command stream instead of executing it.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // Help and version requests are not configuration errors.
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logging(&cli.verbose);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err:#}");
            return ExitCode::from(1);
        }
    };

    let parser_output = match load_parser_output() {
        Ok(parser_output) => parser_output,
        Err(err) => {
            tracing::error!("{err:#}");
            return ExitCode::from(2);
        }
    };
    if parser_output.class_to_class.is_empty() {
        eprintln!("expected a nonempty class graph on stdin");
        return ExitCode::from(1);
    }

    match execute(&cli, &config, &parser_output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(2)
        }
    }
}

/// Structured logging to stderr so stdout stays clean for the command
/// stream. Default to warn, allowlist our crates at the requested
/// verbosity.
fn init_logging(verbose: &Verbosity<InfoLevel>) {
    const CRATES: &[&str] = &[
        "buildgen",
        "buildgen_graph",
        "buildgen_pipeline",
        "buildgen_rules",
        "buildgen_schemas",
    ];
    let level = verbose.tracing_level_filter();
    let allowlist: Vec<String> =
        CRATES.iter().map(|name| format!("{name}={level}")).collect();
    let filter =
        EnvFilter::new(format!("warn,{}", allowlist.join(",")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Turns CLI flags into a pipeline configuration. Failures here are
/// configuration errors (exit code 1).
fn build_config(cli: &Cli) -> Result<Config> {
    let include = regex::Regex::new(&cli.include)
        .with_context(|| format!("invalid --include regex `{}`", cli.include))?;
    let exclude = regex::Regex::new(&cli.exclude)
        .with_context(|| format!("invalid --exclude regex `{}`", cli.exclude))?;

    let workspace = absolutize(&cli.workspace)?;
    let mut config = Config::new(include, workspace.clone());
    config.exclude = exclude;
    config.content_roots = cli
        .content_roots
        .iter()
        .map(|root| {
            if root.is_absolute() {
                root.clone()
            } else {
                workspace.join(root)
            }
        })
        .collect();
    config.source_ext = cli.source_ext.clone();
    config.unresolved_threshold = cli.unresolved_threshold;
    config.external_resolvers = cli.external_resolvers.clone();

    if let Some(path) = &cli.user_mapping {
        let content = std::fs::read_to_string(path).with_context(|| {
            format!("failed to read user mapping file `{path}`")
        })?;
        config.user_mapping =
            content.lines().map(str::to_owned).collect();
    }
    Ok(config)
}

/// Makes a path absolute against the current directory and drops `.`
/// components, so downstream prefix arithmetic sees canonical shapes.
fn absolutize(path: &Utf8Path) -> Result<Utf8PathBuf> {
    let joined = if path.is_absolute() {
        path.to_owned()
    } else {
        let cwd = std::env::current_dir()
            .context("failed to determine the current directory")?;
        Utf8PathBuf::from_path_buf(cwd)
            .map_err(|p| {
                anyhow!("current directory is not UTF-8: {}", p.display())
            })?
            .join(path)
    };
    let mut normalized = Utf8PathBuf::new();
    for component in joined.components() {
        if component != Utf8Component::CurDir {
            normalized.push(component.as_str());
        }
    }
    Ok(normalized)
}

fn load_parser_output() -> Result<ParserOutput> {
    let mut input = Vec::new();
    std::io::stdin()
        .lock()
        .read_to_end(&mut input)
        .context("failed to read parser output from stdin")?;
    Ok(read_parser_output(input.as_slice())?)
}

fn execute(
    cli: &Cli,
    config: &Config,
    parser_output: &ParserOutput,
) -> Result<()> {
    let stream = generate(parser_output, config)?;

    if cli.dry_run {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for command in &stream.commands {
            writeln!(out, "{command}")?;
        }
        return Ok(());
    }
    apply_with_buildozer(&stream, &cli.buildozer)
}

/// Hands the command stream to buildozer: make sure every package has
/// a BUILD file, write the commands to a temp file, and run
/// `buildozer -f <file> -k`. A buildozer that reports errors under -k
/// is surfaced but does not fail the run; a buildozer that cannot be
/// launched does.
fn apply_with_buildozer(
    stream: &CommandStream,
    buildozer: &str,
) -> Result<()> {
    for dir in &stream.build_file_dirs {
        create_build_file_if_missing(dir)?;
    }

    let mut command_file = tempfile::NamedTempFile::new()
        .context("failed to create the buildozer command file")?;
    for command in &stream.commands {
        writeln!(command_file, "{command}")?;
    }
    command_file.flush()?;

    let output = Command::new(buildozer)
        .arg("-f")
        .arg(command_file.path())
        .arg("-k")
        .env_clear()
        .output()
        .with_context(|| {
            format!("failed to launch buildozer at `{buildozer}`")
        })?;
    if !output.status.success() {
        tracing::error!(
            status = %output.status,
            stderr = %String::from_utf8_lossy(&output.stderr),
            "buildozer reported errors"
        );
    }
    Ok(())
}

/// Creates `<dir>/BUILD` (and intermediate directories) when absent;
/// buildozer refuses to create rules in packages without one.
fn create_build_file_if_missing(dir: &Utf8Path) -> Result<()> {
    let build_file = dir.join("BUILD");
    if build_file.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).with_context(|| {
        format!("failed to create package directory `{dir}`")
    })?;
    std::fs::File::create(&build_file).with_context(|| {
        format!("failed to create `{build_file}`")
    })?;
    Ok(())
}
