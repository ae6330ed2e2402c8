use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cxx_analyzer::config::{AnalyzerSettings, DialectConfig, LogLevel, generate_configuration_markdown};
use cxx_analyzer::ide::{QueryInput, complete_with, select_with};
use cxx_analyzer::pp::Preprocessor;
use cxx_analyzer::{BatchParser, Parse, source_files};

#[derive(Parser, Debug)]
#[command(name = "cxx-analyzer", version, about)]
struct Args {
    #[arg(long, short, global = true)]
    verbose: bool,

    #[arg(long, global = true)]
    log_file: Option<String>,

    /// Settings file; defaults to the nearest `cxx-analyzer.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, global = true)]
    dialect: Option<DialectArg>,

    /// Stop at the first error instead of recovering.
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse files or directories and report diagnostics.
    Parse {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print the syntax tree of each file.
        #[arg(long)]
        tree: bool,
    },
    /// Print the preprocessed token stream of a file.
    Expand { path: PathBuf },
    /// Print the smallest node covering a byte span.
    Select {
        path: PathBuf,
        start: usize,
        end: usize,

        #[arg(long)]
        bindings: bool,
    },
    /// List completions at a byte offset.
    Complete { path: PathBuf, offset: usize },
    /// Print the settings reference as markdown.
    ConfigDocs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DialectArg {
    C,
    GnuC,
    Cpp,
    GnuCpp,
}

impl DialectArg {
    fn preset(self) -> DialectConfig {
        match self {
            DialectArg::C => DialectConfig::c(),
            DialectArg::GnuC => DialectConfig::gnu_c(),
            DialectArg::Cpp => DialectConfig::cpp(),
            DialectArg::GnuCpp => DialectConfig::gnu_cpp(),
        }
    }
}

fn default_log_path() -> PathBuf {
    let dir = dirs_or_tmp();
    dir.join("cxx-analyzer.log")
}

fn dirs_or_tmp() -> PathBuf {
    if let Some(cache) = std::env::var_os("HOME") {
        let dir = PathBuf::from(cache).join(".cxx-analyzer");
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir;
        }
    }
    std::env::temp_dir()
}

fn init_logging(
    args: &Args,
    settings: &AnalyzerSettings,
) {
    let level = if args.verbose { LogLevel::Debug } else { settings.logging.level };
    let stderr_level = if args.verbose { LogLevel::Debug } else { LogLevel::Warn };
    let stderr_filter = EnvFilter::new(stderr_level.filter_directive());
    let file_filter = EnvFilter::new(level.filter_directive());

    let log_path = args
        .log_file
        .clone()
        .or_else(|| settings.logging.file.clone())
        .map(PathBuf::from)
        .unwrap_or_else(default_log_path);

    let file_appender = tracing_appender::rolling::never(
        log_path.parent().unwrap_or(Path::new(".")),
        log_path.file_name().unwrap_or(std::ffi::OsStr::new("cxx-analyzer.log")),
    );

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(false)
        .with_filter(file_filter);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_filter(stderr_filter);

    tracing_subscriber::registry().with(file_layer).with(stderr_layer).init();
    info!("Log file: {}", log_path.display());
}

fn load_settings(args: &Args) -> Result<AnalyzerSettings, String> {
    let mut settings = match &args.config {
        Some(path) => AnalyzerSettings::load(path),
        None => {
            let cwd = std::env::current_dir().map_err(|err| format!("failed to read the working directory: {err}"))?;
            AnalyzerSettings::discover(&cwd)
        },
    }
    .map_err(|err| err.to_string())?;
    if let Some(dialect) = args.dialect {
        settings.dialect = DialectConfig {
            strict_recovery: settings.dialect.strict_recovery,
            ..dialect.preset()
        };
    }
    if args.strict {
        settings.dialect = settings.dialect.strict();
    }
    Ok(settings)
}

fn main() -> ExitCode {
    let args = Args::parse();
    let settings = match load_settings(&args) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        },
    };
    init_logging(&args, &settings);
    info!("Starting cxx-analyzer v{}", env!("CARGO_PKG_VERSION"));

    let result = match &args.command {
        Command::Parse {
            paths,
            tree,
        } => run_parse(settings, paths, *tree),
        Command::Expand {
            path,
        } => run_expand(&settings, path),
        Command::Select {
            path,
            start,
            end,
            bindings,
        } => run_select(&settings, path, *start, *end, *bindings),
        Command::Complete {
            path,
            offset,
        } => run_complete(&settings, path, *offset),
        Command::ConfigDocs => {
            print!("{}", generate_configuration_markdown());
            Ok(true)
        },
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        },
    }
}

fn read(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|err| format!("failed to read {}: {err}", path.display()))
}

fn print_diagnostics(
    path: &Path,
    parse: &Parse,
) {
    for diagnostic in parse.diagnostics() {
        let at = diagnostic.location.map(|location| parse.sources().describe(location));
        match at {
            Some(at) => println!("{at}: {diagnostic}"),
            None => println!("{}: {diagnostic}", path.display()),
        }
    }
}

fn run_parse(
    settings: AnalyzerSettings,
    paths: &[PathBuf],
    tree: bool,
) -> Result<bool, String> {
    let files: Vec<PathBuf> = paths.iter().flat_map(|path| source_files(path)).collect();
    if files.is_empty() {
        return Err("no C or C++ sources found".to_string());
    }
    let batch = BatchParser::new(settings);
    let mut clean = true;
    for outcome in batch.parse_files(&files) {
        match outcome.result {
            Ok(parse) => {
                print_diagnostics(&outcome.path, &parse);
                clean &= !parse.has_errors();
                if tree {
                    print!("{}", parse.debug_tree());
                }
            },
            Err(err) => {
                println!("{err}");
                clean = false;
            },
        }
    }
    info!(files = files.len(), clean, "parse finished");
    Ok(clean)
}

fn run_expand(
    settings: &AnalyzerSettings,
    path: &Path,
) -> Result<bool, String> {
    let text = read(path)?;
    let name = path.to_string_lossy();
    let macros = settings.preprocessor.macro_table(&settings.dialect);
    let resolver = settings.preprocessor.include_resolver();
    let preprocessed = Preprocessor::new(&name, &text, &settings.dialect, &resolver)
        .with_macros(&macros)
        .with_limits(settings.limits)
        .run();
    for diagnostic in &preprocessed.diagnostics {
        eprintln!("{diagnostic}");
    }
    println!("{}", preprocessed.text());
    Ok(!preprocessed.has_errors())
}

fn run_select(
    settings: &AnalyzerSettings,
    path: &Path,
    start: usize,
    end: usize,
    bindings: bool,
) -> Result<bool, String> {
    let text = read(path)?;
    let name = path.to_string_lossy();
    let resolver = settings.preprocessor.include_resolver();
    let input = QueryInput::from_settings(&name, settings, &resolver);
    let Some(selection) = select_with(&input, &text, start, end, bindings) else {
        println!("no node covers {start}..{end}");
        return Ok(false);
    };
    println!("{:?} {:?}", selection.kind, selection.text);
    if let Some(binding) = selection.binding {
        match &binding.detail {
            Some(detail) => println!("{:?} {}: {detail}", binding.kind, binding.qualified_name),
            None => println!("{:?} {}", binding.kind, binding.qualified_name),
        }
    }
    Ok(true)
}

fn run_complete(
    settings: &AnalyzerSettings,
    path: &Path,
    offset: usize,
) -> Result<bool, String> {
    let text = read(path)?;
    let name = path.to_string_lossy();
    let resolver = settings.preprocessor.include_resolver();
    let input = QueryInput::from_settings(&name, settings, &resolver);
    let node = complete_with(&input, &text, offset);
    for candidate in &node.candidates {
        match &candidate.detail {
            Some(detail) => println!("{}\t{:?}\t{detail}", candidate.name, candidate.kind),
            None => println!("{}\t{:?}", candidate.name, candidate.kind),
        }
    }
    for name in &node.macros {
        println!("{name}\tmacro");
    }
    Ok(true)
}
