use crate::cache::{CacheStore, FileCache, MemoryCache};
use crate::oracle::{GeminiClient, GeminiConfig, DEFAULT_API_BASE_URL, DEFAULT_MODEL};
use crate::pipeline::{Pipeline, PipelineState};
use crate::scanner::{FileScanner, DEFAULT_EXTENSIONS};
use crate::serializer::{serialize_json, serialize_yaml, write_to_file, RunReport};
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Swagger From Source - Generate Swagger JSDoc blocks for Express routes and write them next to the route registrations
#[derive(Parser, Debug)]
#[command(name = "swagger-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Module directories containing routes/, controllers/ and middlewares/
    #[arg(value_name = "MODULE_DIR", required = true)]
    pub module_dirs: Vec<PathBuf>,

    /// Router aggregation file that mounts sub-routers (repeatable)
    #[arg(long = "router-context", value_name = "FILE")]
    pub router_context: Vec<PathBuf>,

    /// File extensions to scan
    #[arg(short = 'e', long = "extensions", value_delimiter = ',',
          default_values_t = DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect::<Vec<_>>())]
    pub extensions: Vec<String>,

    /// Gemini API key
    #[arg(long = "api-key", env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Gemini model name
    #[arg(long = "model", env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the Gemini REST API
    #[arg(long = "api-base-url", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Sampling temperature
    #[arg(long = "temperature", default_value_t = 0.1)]
    pub temperature: f32,

    /// Request timeout in seconds
    #[arg(long = "timeout", default_value_t = 300)]
    pub timeout_secs: u64,

    /// Directory holding cached oracle responses
    #[arg(long = "cache-dir", env = "SWAGGER_CACHE_DIR", default_value = ".swagger-cache")]
    pub cache_dir: PathBuf,

    /// Keep oracle responses in memory for this run only
    #[arg(long = "no-cache")]
    pub no_cache: bool,

    /// Write a run report to this file
    #[arg(short = 'r', long = "report", value_name = "FILE")]
    pub report_path: Option<PathBuf>,

    /// Run report format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub report_format: OutputFormat,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

impl CliArgs {
    /// Oracle connection settings taken from the arguments.
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            model: self.model.clone(),
            base_url: self.api_base_url.clone(),
            temperature: self.temperature,
            timeout_secs: self.timeout_secs,
            ..GeminiConfig::new(self.api_key.clone())
        }
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Module directories: {:?}", args.module_dirs);

    for dir in &args.module_dirs {
        if !dir.is_dir() {
            warn!("Module directory does not exist: {}", dir.display());
        }
    }
    for file in &args.router_context {
        if !file.is_file() {
            warn!("Router context file does not exist: {}", file.display());
        }
    }

    if !(0.0..=2.0).contains(&args.temperature) {
        bail!("Temperature must be between 0 and 2, got {}", args.temperature);
    }

    info!("Module directories: {}", args.module_dirs.len());
    info!("Extensions: {}", args.extensions.join(","));
    info!("Model: {}", args.model);
    if args.no_cache {
        info!("Cache: disabled");
    } else {
        info!("Cache: {}", args.cache_dir.display());
    }
    if let Some(ref report) = args.report_path {
        info!("Report file: {} ({:?})", report.display(), args.report_format);
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    let oracle = GeminiClient::new(args.gemini_config()).context("Failed to create Gemini client")?;

    let cache: Box<dyn CacheStore> = if args.no_cache {
        Box::new(MemoryCache::new())
    } else {
        Box::new(
            FileCache::open(&args.cache_dir)
                .with_context(|| format!("Failed to open cache at {}", args.cache_dir.display()))?,
        )
    };

    let scanner = FileScanner::new(args.extensions.clone());
    let pipeline = Pipeline::new(&oracle, cache.as_ref(), scanner);
    let state = pipeline.run(PipelineState::new(
        args.module_dirs.clone(),
        args.router_context.clone(),
    ));

    finish_run(&args, &state)
}

/// Writes the optional report and logs the summary of a finished run.
///
/// Fails only when the run itself stopped; a report that cannot be written is logged.
fn finish_run(args: &CliArgs, state: &PipelineState) -> Result<()> {
    let report = RunReport::from_state(state);
    if let Some(report_path) = &args.report_path {
        match write_report(&report, report_path, args.report_format) {
            Ok(()) => info!("Wrote run report to {}", report_path.display()),
            Err(e) => warn!("Could not write run report: {:#}", e),
        }
    }

    if state.is_failed() {
        bail!("Run stopped: {}", state.errors.join("; "));
    }

    info!("Summary:");
    info!("  - Route files: {}", report.summary.route_files);
    info!("  - Endpoints found: {}", report.summary.endpoints);
    info!("  - Documentation generated: {}", report.summary.synthesized);
    info!("  - Passed validation: {}", report.summary.validated);
    info!("  - Endpoints patched: {}", report.summary.patched);
    for key in &report.rejected {
        warn!("Rejected documentation for {}", key);
    }
    for key in &report.unpatched {
        warn!("Not patched: {}", key);
    }

    Ok(())
}

fn write_report(report: &RunReport, path: &Path, format: OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Yaml => serialize_yaml(report)?,
        OutputFormat::Json => serialize_json(report)?,
    };
    write_to_file(&content, path)
}
