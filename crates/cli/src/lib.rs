use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use wordscan_analyzer::{
    validate_request, AnalysisConfig, AnalysisError, AnalysisRequest, Analyzer, MemorySource,
};
use wordscan_protocol::{serialize_json, serialize_json_pretty, API_HEALTH_PATH, API_MATCH_PATH};

mod http_api;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "wordscan")]
#[command(about = "Find word occurrences in large text documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML configuration file (overrides WORDSCAN_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the text analysis API over HTTP
    ServeHttp(ServeArgs),

    /// Analyze one document and print the JSON result
    Analyze(AnalyzeArgs),

    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

/// Per-invocation overrides, applied on top of file and environment settings
#[derive(Args, Debug, Clone, Default)]
struct OverrideArgs {
    /// Lines per chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Lines shared between consecutive chunks
    #[arg(long)]
    chunk_overlap: Option<usize>,

    /// Matcher tasks running at once
    #[arg(long)]
    thread_pool_size: Option<usize>,

    /// Matcher tasks allowed to wait for a worker
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Maximum document size, e.g. 512KB, 100MB
    #[arg(long)]
    max_file_size: Option<String>,

    /// Whole-request timeout, e.g. 30s, 5m
    #[arg(long)]
    request_timeout: Option<String>,
}

impl OverrideArgs {
    fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(v) = self.chunk_size {
            config.chunk_size = v;
        }
        if let Some(v) = self.chunk_overlap {
            config.chunk_overlap = v;
        }
        if let Some(v) = self.thread_pool_size {
            config.thread_pool_size = v;
        }
        if let Some(v) = self.queue_capacity {
            config.queue_capacity = v;
        }
        if let Some(v) = &self.max_file_size {
            config.max_file_size = v.clone();
        }
        if let Some(v) = &self.request_timeout {
            config.request_timeout = v.clone();
        }
    }
}

#[derive(Args)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    #[command(flatten)]
    overrides: OverrideArgs,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// http(s) URL of the document
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    url: Option<String>,

    /// Local file to analyze instead of a URL
    #[arg(long)]
    file: Option<PathBuf>,

    /// Word to look for (repeatable)
    #[arg(short, long = "word", required = true)]
    words: Vec<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    #[command(flatten)]
    overrides: OverrideArgs,
}

#[derive(Args)]
struct ConfigArgs {
    #[command(flatten)]
    overrides: OverrideArgs,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // stdout carries the JSON result for `analyze`
    if matches!(cli.command, Commands::Analyze(_)) && !cli.verbose {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::ServeHttp(args) => {
            let config = load_config(cli.config, &args.overrides)?;
            serve_http(args, config).await?
        }
        Commands::Analyze(args) => {
            let config = load_config(cli.config, &args.overrides)?;
            run_analyze(args, config).await?
        }
        Commands::Config(args) => {
            let config = load_config(cli.config, &args.overrides)?;
            print_stdout(config.to_toml()?.trim_end())?
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>, overrides: &OverrideArgs) -> Result<AnalysisConfig> {
    let mut config = AnalysisConfig::load(path.as_deref())?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

async fn serve_http(args: ServeArgs, config: AnalysisConfig) -> Result<()> {
    let analyzer = Analyzer::new(config).context("Failed to initialise analyzer")?;
    let state = Arc::new(http_api::HttpState { analyzer });
    let app = http_api::router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    let local_addr = listener.local_addr()?;
    let base_url = format!("http://{local_addr}");

    log::info!("Listening on {local_addr}");
    print_stdout(&format!("Serving text analysis API: {base_url}{API_MATCH_PATH}"))?;
    print_stdout(&format!("Health endpoint: {base_url}{API_HEALTH_PATH}"))?;
    print_stdout(&format!("Try: curl {base_url}{API_HEALTH_PATH}"))?;
    print_stdout(&format!(
        "Try: curl -X POST {base_url}{API_MATCH_PATH} -H 'Content-Type: application/json' -d '{{\"textUrl\":\"https://...\",\"words\":[\"...\"]}}'"
    ))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_analyze(args: AnalyzeArgs, config: AnalysisConfig) -> Result<()> {
    let outcome = match (&args.url, &args.file) {
        (Some(url), _) => {
            let request = AnalysisRequest::new(url.clone(), args.words.clone());
            let (url, words) = match validate_request(&request) {
                Ok(valid) => valid,
                Err(field_errors) => {
                    let envelope = http_api::validation_error(field_errors);
                    print_stdout(&render(&envelope, args.pretty)?)?;
                    anyhow::bail!("Invalid analysis request");
                }
            };
            let analyzer = Analyzer::new(config)?;
            analyzer.analyze_url(url.as_str(), &words).await
        }
        (None, Some(path)) => analyze_file(path, &args.words, config).await,
        (None, None) => anyhow::bail!("Either --url or --file is required"),
    };

    match outcome {
        Ok(response) => print_stdout(&render(&response, args.pretty)?),
        Err(err) => {
            let (_, envelope) = http_api::analysis_error(&err);
            print_stdout(&render(&envelope, args.pretty)?)?;
            Err(anyhow::Error::new(err).context("Analysis failed"))
        }
    }
}

async fn analyze_file(
    path: &std::path::Path,
    words: &[String],
    config: AnalysisConfig,
) -> wordscan_analyzer::Result<wordscan_analyzer::AnalysisResponse> {
    let location = path.display().to_string();
    let limit = config.limits()?.max_file_size;
    let data = tokio::fs::read(path).await.map_err(|err| {
        AnalysisError::invalid_source(&location, format!("Cannot read {location}: {err}"))
    })?;
    if data.len() as u64 > limit {
        return Err(AnalysisError::SizeExceeded {
            location,
            limit,
            observed: data.len() as u64,
        });
    }

    let analyzer = Analyzer::new(config)?;
    let mut source = MemorySource::new(location, data);
    analyzer.analyze(&mut source, words).await
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serialize_json_pretty(value)
    } else {
        serialize_json(value)
    }
}
