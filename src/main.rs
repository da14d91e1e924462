//! Command line entry point: checks, looks up, summarizes and formats
//! translation catalogues.

use std::io::{
    self,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{
    Parser,
    Subcommand,
};
use morphal_i18n::catalog::language::catalog_language;
use morphal_i18n::catalog::{
    CatalogError,
    Resolution,
    load_catalog,
    parse_catalog,
    save_catalog,
    write_catalog,
};
use morphal_i18n::config::{
    ConfigError,
    ConfigManager,
    LookupConfig,
    Severity,
};
use morphal_i18n::diagnostics::{
    Diagnostic,
    generate_diagnostics_with_language,
};
use morphal_i18n::indexer::{
    CatalogIndex,
    IndexerError,
};
use morphal_i18n::translator::Translator;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{
    InitError,
    RollingFileAppender,
    Rotation,
};
use tracing_subscriber::EnvFilter;

/// Translation catalogue tool.
#[derive(Debug, Parser)]
#[command(name = "morphal-i18n", version, about = "Check and query MorphAL translation catalogues.")]
struct Cli {
    /// Write logs to this file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Supported subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Report problems in the catalogues under each path.
    Check {
        /// Catalogue files or directories to search.
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
        /// Fail on warnings as well as errors.
        #[arg(long)]
        deny_warnings: bool,
    },
    /// Print the display text of one message.
    Lookup {
        /// Catalogue file to read.
        catalog: PathBuf,
        /// Context (class or algorithm) name.
        #[arg(long)]
        context: String,
        /// Disambiguation comment.
        #[arg(long)]
        comment: Option<String>,
        /// Count for plural messages; substitutes `%n`.
        #[arg(long)]
        count: Option<u64>,
        /// Show unfinished translations instead of the source text.
        #[arg(long)]
        use_unfinished: bool,
        /// Source string to look up.
        source: String,
    },
    /// Print message counts per catalogue.
    Stats {
        /// Catalogue files or directories to search.
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
    },
    /// Rewrite catalogues in canonical layout.
    Fmt {
        /// Catalogue files to format.
        #[arg(required = true)]
        catalogs: Vec<PathBuf>,
        /// Only report the files that would change.
        #[arg(long)]
        check: bool,
    },
    /// List discovered catalogue files with their language.
    List {
        /// Directories to search.
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
    },
}

/// Errors that abort a command.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Indexer(#[from] IndexerError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid log file path: {}", .0.display())]
    LogFilePath(PathBuf),

    #[error("Failed to open log file {}: {source}", path.display())]
    LogFile { path: PathBuf, source: InitError },
}

/// Result of a command that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    /// Problems were found (exit code 1).
    Failure,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = match init_logging(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => return report_error(&err),
    };

    match run(cli.command).await {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::Failure) => ExitCode::from(1),
        Err(err) => report_error(&err),
    }
}

/// Installs the tracing subscriber; `RUST_LOG` overrides the `warn` default.
fn init_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>, CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let Some(path) = log_file else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
        return Ok(None);
    };

    let (writer, guard) = tracing_appender::non_blocking(open_log_file(path)?);
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
    Ok(Some(guard))
}

/// Opens `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<RollingFileAppender, CliError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CliError::LogFilePath(path.to_path_buf()))?;
    let directory = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(|source| CliError::LogFile { path: path.to_path_buf(), source })
}

/// Executes a subcommand.
async fn run(command: Command) -> Result<Outcome, CliError> {
    match command {
        Command::Check { paths, deny_warnings } => check(&paths, deny_warnings).await,
        Command::Lookup { catalog, context, comment, count, use_unfinished, source } => {
            let request = LookupRequest {
                context: &context,
                comment: comment.as_deref(),
                count,
                use_unfinished,
                source: &source,
            };
            lookup(&catalog, &request)
        }
        Command::Stats { paths } => stats(&paths).await,
        Command::Fmt { catalogs, check } => format_catalogs(&catalogs, check),
        Command::List { paths } => list(&paths).await,
    }
}

/// Loads the configuration governing `path` and indexes its catalogues.
async fn index_path(path: &Path) -> Result<(ConfigManager, CatalogIndex), CliError> {
    let root = if path.is_file() {
        path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."))
    } else {
        path
    };
    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(root.to_path_buf()))?;

    let index = CatalogIndex::new();
    index.index_workspace(path, &config_manager).await?;
    Ok((config_manager, index))
}

async fn check(paths: &[PathBuf], deny_warnings: bool) -> Result<Outcome, CliError> {
    let (mut checked, mut errors, mut warnings) = (0_usize, 0_usize, 0_usize);

    for path in paths {
        let (config_manager, index) = index_path(path).await?;
        let config = config_manager.get_settings().diagnostics;
        let catalogs = index.catalogs().await;
        let failures = index.failures().await;

        let mut stdout = io::stdout().lock();
        for failure in &failures {
            writeln!(stdout, "{}: error[load]: {}", failure.path.display(), failure.error)?;
            errors += 1;
        }
        for indexed in &catalogs {
            let diagnostics = generate_diagnostics_with_language(
                &indexed.catalog,
                indexed.language.as_deref(),
                &config,
            );
            for diagnostic in &diagnostics {
                write_diagnostic(&mut stdout, &indexed.path, diagnostic)?;
                match diagnostic.severity {
                    Severity::Error => errors += 1,
                    Severity::Warning => warnings += 1,
                    Severity::Off | Severity::Hint | Severity::Information => {}
                }
            }
        }
        checked += catalogs.len() + failures.len();
    }

    writeln!(
        io::stdout().lock(),
        "{checked} catalogue(s) checked: {errors} error(s), {warnings} warning(s)"
    )?;
    if errors > 0 || (deny_warnings && warnings > 0) {
        Ok(Outcome::Failure)
    } else {
        Ok(Outcome::Success)
    }
}

fn write_diagnostic(out: &mut impl Write, path: &Path, diagnostic: &Diagnostic) -> io::Result<()> {
    let Diagnostic { severity, code, message, .. } = diagnostic;
    match diagnostic.position {
        Some(position) => {
            writeln!(out, "{}:{position}: {severity}[{code}]: {message}", path.display())
        }
        None => writeln!(out, "{}: {severity}[{code}]: {message}", path.display()),
    }
}

/// Arguments of the `lookup` command.
#[derive(Debug)]
struct LookupRequest<'a> {
    context: &'a str,
    comment: Option<&'a str>,
    count: Option<u64>,
    use_unfinished: bool,
    source: &'a str,
}

fn lookup(path: &Path, request: &LookupRequest<'_>) -> Result<Outcome, CliError> {
    let catalog = load_catalog(path)?;
    let language = catalog_language(&catalog, Some(path));
    let config = LookupConfig { use_unfinished: request.use_unfinished, default_context: None };
    let translator = Translator::new(language, [Arc::new(catalog)], config);

    let resolution = translator.resolve(request.context, request.source, request.comment);
    let text = match request.count {
        Some(n) => translator.translate_n(request.context, request.source, n),
        None => resolution.text().to_string(),
    };
    writeln!(io::stdout().lock(), "{text}")?;

    let mut stderr = io::stderr().lock();
    match resolution {
        Resolution::Translated(_) => {}
        Resolution::Provisional(_) => writeln!(stderr, "note: translation is unfinished")?,
        Resolution::Fallback { reason, .. } => {
            writeln!(stderr, "note: showing source text ({reason})")?;
        }
    }
    Ok(Outcome::Success)
}

async fn stats(paths: &[PathBuf]) -> Result<Outcome, CliError> {
    let mut outcome = Outcome::Success;
    for path in paths {
        let (_, index) = index_path(path).await?;
        let catalogs = index.catalogs().await;
        let failures = index.failures().await;

        let mut stdout = io::stdout().lock();
        for indexed in &catalogs {
            let stats = indexed.catalog.stats();
            writeln!(
                stdout,
                "{}: language={} contexts={} messages={} finished={} empty={} unfinished={} obsolete={}",
                indexed.path.display(),
                indexed.language.as_deref().unwrap_or("-"),
                stats.contexts,
                stats.messages,
                stats.finished,
                stats.empty,
                stats.unfinished,
                stats.retired,
            )?;
        }
        for failure in &failures {
            writeln!(stdout, "{}: error: {}", failure.path.display(), failure.error)?;
            outcome = Outcome::Failure;
        }
    }
    Ok(outcome)
}

fn format_catalogs(paths: &[PathBuf], check: bool) -> Result<Outcome, CliError> {
    let mut outcome = Outcome::Success;
    let mut stdout = io::stdout().lock();

    for path in paths {
        let original = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::Io { path: path.clone(), source })?;
        let catalog = parse_catalog(&original)?;
        if write_catalog(&catalog) == original {
            tracing::debug!(path = %path.display(), "Already formatted");
            continue;
        }

        if check {
            writeln!(stdout, "would reformat {}", path.display())?;
            outcome = Outcome::Failure;
        } else {
            save_catalog(&catalog, path)?;
            writeln!(stdout, "reformatted {}", path.display())?;
        }
    }
    Ok(outcome)
}

async fn list(paths: &[PathBuf]) -> Result<Outcome, CliError> {
    for path in paths {
        let (_, index) = index_path(path).await?;
        let catalogs = index.catalogs().await;
        let failures = index.failures().await;

        let mut stdout = io::stdout().lock();
        for indexed in &catalogs {
            writeln!(
                stdout,
                "{}\t{}",
                indexed.path.display(),
                indexed.language.as_deref().unwrap_or("-")
            )?;
        }
        for failure in &failures {
            tracing::warn!(path = %failure.path.display(), error = %failure.error, "Unreadable catalogue");
            writeln!(stdout, "{}\t(unreadable)", failure.path.display())?;
        }
    }
    Ok(Outcome::Success)
}

/// Reports an error to stderr and returns exit code 2.
fn report_error(error: &CliError) -> ExitCode {
    let mut stderr = io::stderr();
    let _ = writeln!(&mut stderr, "error: {error}");
    ExitCode::from(2)
}
