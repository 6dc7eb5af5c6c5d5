// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, error, info, warn};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use textai::app_config::{self, Config, ProviderKind};
use textai::dispatcher::{Dispatcher, OperationFlags};
use textai::errors::AppError;
use textai::file_utils::FileManager;
use textai::providers::create_provider;
use textai::transport::{CallContext, HttpTransport, Transport};

/// CLI Wrapper for ProviderKind to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliProvider {
    Gemini,
    #[value(name = "openai")]
    OpenAI,
    Claude,
    Ollama,
}

impl From<CliProvider> for ProviderKind {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Gemini => ProviderKind::Gemini,
            CliProvider::OpenAI => ProviderKind::OpenAI,
            CliProvider::Claude => ProviderKind::Claude,
            CliProvider::Ollama => ProviderKind::Ollama,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for textai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// textai - rewrite, translate, summarize or ask with any AI backend
///
/// Sends text to Gemini, OpenAI, Claude or a local Ollama server and prints
/// the answer.
#[derive(Parser, Debug)]
#[command(name = "textai")]
#[command(version)]
#[command(about = "Rewrite, translate, summarize or query text with an AI backend")]
#[command(long_about = "textai sends a block of text to an AI backend and prints the result.

EXAMPLES:
    textai -i \"what is a monad?\"                 # General query with local Ollama
    textai -r -i \"me and him goes to the shop\"   # Rewrite
    textai -t -l fr -f notes.txt -p openai       # Translate a file to French
    cat report.md | textai -s -p claude -c       # Summarize stdin, copy to clipboard
    textai -s -f report.md -o summary.txt        # Write the result to a file
    textai completions bash > textai.bash        # Generate bash completions

CONFIGURATION:
    config.yaml is looked up next to the executable, then in the working
    directory, then in the user config directory. Use --config to point at a
    specific file. Built-in defaults apply when none is found.

CREDENTIALS:
    gemini - GEMINI_API_KEY
    openai - OPENAI_API_KEY
    claude - CLAUDE_API_KEY
    ollama - none
    A .env file in the working directory is loaded first.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Rewrite the input
    #[arg(short, long)]
    rewrite: bool,

    /// Translate the input (see --language)
    #[arg(short, long)]
    translate: bool,

    /// Summarize the input
    #[arg(short, long)]
    summarize: bool,

    /// Copy the result to the clipboard
    #[arg(short, long)]
    clipboard: bool,

    /// AI provider to use [default: ollama]
    #[arg(short, long, value_enum)]
    provider: Option<CliProvider>,

    /// Input text
    #[arg(short, long)]
    input: Option<String>,

    /// Translation target language, as a name or ISO code [default: English]
    #[arg(short, long)]
    language: Option<String>,

    /// Read input from a file
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Request timeout in seconds, overrides httpTimeoutSeconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger accepts everything; log::max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌",
            Level::Warn => "🚧",
            Level::Info => "  ",
            Level::Debug => "🔍",
            Level::Trace => "📋",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            // stdout carries the result, logs go to stderr
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Warn by default until the configuration says otherwise
    if let Err(e) = CustomLogger::init(LevelFilter::Warn) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "textai", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(options: CommandLineOptions) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = options.log_level {
        let level: app_config::LogLevel = cmd_log_level.into();
        log::set_max_level(level.to_level_filter());
    }

    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {:?}", path),
        Err(e) => debug!("No .env file loaded, using system environment: {}", e),
    }

    let (mut config, source) =
        Config::discover(options.config.as_deref()).context("Error loading config")?;
    if let Some(path) = &source {
        debug!("Using configuration {:?}", path);
    }

    if let Some(timeout) = options.timeout {
        config.http_timeout_seconds = timeout;
        config.validate().context("Invalid --timeout")?;
    }

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let kind: ProviderKind = options.provider.map(Into::into).unwrap_or_default();
    let api_key = kind
        .api_key_env()
        .and_then(|var| std::env::var(var).ok())
        .unwrap_or_default();

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new());
    let provider =
        create_provider(kind, &config, &api_key, transport).context("Error creating model")?;

    let input = FileManager::collect_input(
        options.input.as_deref(),
        options.file.as_deref(),
        config.input_file_limit_kb,
        FileManager::read_stdin,
    )?;

    let flags = OperationFlags {
        rewrite: options.rewrite,
        translate: options.translate,
        summarize: options.summarize,
        language: options.language.clone(),
    };

    let interrupt = CancellationToken::new();
    let ctx = CallContext::with_timeout(config.timeout()).with_token(interrupt.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling request");
            interrupt.cancel();
        }
    });

    let dispatcher = Dispatcher::new(provider);
    let result = dispatcher
        .run(&ctx, &flags, &input)
        .await
        .context("Error running model")?;

    if options.clipboard {
        match copy_to_clipboard(&result) {
            Ok(()) => info!("Copied result to clipboard"),
            Err(e) => warn!("Error copying to clipboard: {}", e),
        }
    }

    match &options.output {
        Some(path) => {
            FileManager::write_to_file(path, &result).context("Error writing file")?;
            info!("Wrote result to {:?}", path);
        }
        None => print_result(&result),
    }

    Ok(())
}

fn copy_to_clipboard(text: &str) -> Result<(), AppError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| AppError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| AppError::Clipboard(e.to_string()))
}

fn print_result(result: &str) {
    const CYBER_CYAN: &str = "\x1B[96m";
    const RESET: &str = "\x1B[0m";

    let stdout = std::io::stdout();
    if stdout.is_terminal() {
        println!("\n{}{}{}\n", CYBER_CYAN, result, RESET);
    } else {
        println!("{}", result);
    }
}
