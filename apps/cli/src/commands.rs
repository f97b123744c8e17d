//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use toolscout_core::catalogue::{self, AnalyzeRequest, ApiResponse, ToolField};
use toolscout_core::{EnrichOptions, Enricher, EnrichmentProgress, GeminiClient};
use toolscout_fetcher::HttpFetcher;
use toolscout_shared::{
    AppConfig, DEFAULT_PER_PAGE, Tool, ToolQuery, ToolScoutError, database_path, init_config,
    load_config,
};
use toolscout_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ToolScout: enrich an AI tool directory from the tools' own websites.
#[derive(Parser)]
#[command(
    name = "toolscout",
    version,
    about = "Scrape AI tool websites, analyze them, and keep a tool catalogue up to date.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Catalogue database path (defaults to the configured location).
    #[arg(long, env = "TOOLSCOUT_DB", global = true)]
    pub db: Option<PathBuf>,

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
    /// Analyze a tool website without touching the catalogue.
    Analyze {
        /// Website URL to analyze.
        url: String,

        /// Skip the translation step.
        #[arg(long)]
        no_translate: bool,

        /// Translate into this language (ISO 639-1) instead of the configured one.
        #[arg(long)]
        lang: Option<String>,
    },

    /// Catalogue management.
    Tool {
        #[command(subcommand)]
        action: ToolAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Catalogue subcommands.
#[derive(Subcommand)]
pub(crate) enum ToolAction {
    /// Analyze a URL and add it to the catalogue.
    Add {
        /// Website URL of the tool.
        url: String,
    },
    /// List catalogue entries, newest first.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,

        /// Only tools in this category.
        #[arg(long)]
        category: Option<String>,

        /// Only featured tools.
        #[arg(long)]
        featured: bool,

        /// Include inactive tools.
        #[arg(long)]
        all: bool,
    },
    /// Show one catalogue entry and its analysis runs.
    Show { id: i64 },
    /// Re-analyze a catalogue entry and update changed fields.
    Analyze {
        id: i64,

        /// Fields to refresh (comma-separated). Defaults to all.
        #[arg(long, value_delimiter = ',')]
        fields: Vec<ToolField>,

        /// Also stamp the entry as optimized.
        #[arg(long)]
        mark_optimized: bool,
    },
    /// Deactivate a catalogue entry (or remove it with --hard).
    Delete {
        id: i64,

        /// Delete the row and its analysis runs instead of deactivating it.
        #[arg(long)]
        hard: bool,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout stays JSON.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "toolscout=info",
        1 => "toolscout=debug",
        _ => "toolscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let db = cli.db;
    match cli.command {
        Command::Analyze {
            url,
            no_translate,
            lang,
        } => cmd_analyze(&url, no_translate, lang).await,
        Command::Tool { action } => match action {
            ToolAction::Add { url } => cmd_tool_add(db.as_deref(), &url).await,
            ToolAction::List {
                page,
                per_page,
                category,
                featured,
                all,
            } => {
                let query = ToolQuery {
                    page,
                    per_page,
                    category,
                    active_only: !all,
                    featured_only: featured,
                };
                cmd_tool_list(db.as_deref(), &query).await
            }
            ToolAction::Show { id } => cmd_tool_show(db.as_deref(), id).await,
            ToolAction::Analyze {
                id,
                fields,
                mark_optimized,
            } => {
                let request = AnalyzeRequest {
                    fields: (!fields.is_empty()).then_some(fields),
                    mark_optimized,
                };
                cmd_tool_analyze(db.as_deref(), id, &request).await
            }
            ToolAction::Delete { id, hard } => cmd_tool_delete(db.as_deref(), id, hard).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type CliEnricher = Enricher<HttpFetcher, GeminiClient>;

fn build_enricher(config: &AppConfig) -> Result<CliEnricher> {
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let generator = GeminiClient::from_config(config)?;
    Ok(Enricher::new(
        fetcher,
        generator,
        EnrichOptions::from_config(config),
    ))
}

async fn open_storage(db: Option<&Path>, config: &AppConfig) -> Result<Storage> {
    let path = match db {
        Some(p) => p.to_path_buf(),
        None => database_path(config)?,
    };
    info!(path = %path.display(), "opening catalogue");
    Ok(Storage::open(&path).await?)
}

/// Print the envelope as pretty JSON; a failed envelope becomes an error exit.
fn emit<T: Serialize>(response: &ApiResponse<T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    if response.success {
        Ok(())
    } else {
        Err(eyre!(
            "request failed with status {}: {}",
            response.status,
            response.error.as_deref().unwrap_or("unknown error")
        ))
    }
}

fn failure<T>(error: &ToolScoutError) -> ApiResponse<T> {
    ApiResponse::failure(catalogue::status_for(error), error.to_string(), None)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_analyze(url: &str, no_translate: bool, lang: Option<String>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(lang) = lang {
        config.translation.enabled = true;
        config.translation.target_language = lang;
    }
    if no_translate {
        config.translation.enabled = false;
    }

    let enricher = build_enricher(&config)?;
    info!(url, "analyzing website");

    let progress = CliProgress::new();
    let response = catalogue::scrape_url(&enricher, url, &progress).await;
    progress.finish();

    emit(&response)
}

async fn cmd_tool_add(db: Option<&Path>, url: &str) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(db, &config).await?;
    let enricher = build_enricher(&config)?;

    let progress = CliProgress::new();
    let response = catalogue::import_tool(&storage, &enricher, url, &progress).await;
    progress.finish();

    emit(&response)
}

async fn cmd_tool_list(db: Option<&Path>, query: &ToolQuery) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(db, &config).await?;

    let response = match storage.list_tools(query).await {
        Ok(page) => ApiResponse::ok(200, page, None),
        Err(e) => failure(&e),
    };
    emit(&response)
}

/// A recorded analysis run, without the stored analysis body.
#[derive(Serialize)]
struct RunSummary {
    id: String,
    url: String,
    source: String,
    content_hash: String,
    created_at: String,
}

#[derive(Serialize)]
struct ToolDetail {
    tool: Tool,
    runs: Vec<RunSummary>,
}

async fn cmd_tool_show(db: Option<&Path>, id: i64) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(db, &config).await?;

    let response = match storage.get_tool_by_id(id).await {
        Ok(Some(tool)) => match storage.list_analysis_runs(id).await {
            Ok(runs) => {
                let runs = runs
                    .into_iter()
                    .map(|r| RunSummary {
                        id: r.id,
                        url: r.url,
                        source: r.source,
                        content_hash: r.content_hash,
                        created_at: r.created_at.to_rfc3339(),
                    })
                    .collect();
                ApiResponse::ok(200, ToolDetail { tool, runs }, None)
            }
            Err(e) => failure(&e),
        },
        Ok(None) => ApiResponse::failure(404, "Tool not found", None),
        Err(e) => failure(&e),
    };
    emit(&response)
}

async fn cmd_tool_analyze(db: Option<&Path>, id: i64, request: &AnalyzeRequest) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(db, &config).await?;
    let enricher = build_enricher(&config)?;

    let progress = CliProgress::new();
    let response = catalogue::analyze_tool(&storage, &enricher, id, request, &progress).await;
    progress.finish();

    emit(&response)
}

async fn cmd_tool_delete(db: Option<&Path>, id: i64, hard: bool) -> Result<()> {
    let config = load_config()?;
    let storage = open_storage(db, &config).await?;

    let result = if hard {
        storage.delete_tool(id).await
    } else {
        storage.set_active(id, false).await
    };
    let response = match result {
        Ok(()) => ApiResponse::ok(
            200,
            serde_json::json!({ "id": id, "hard": hard }),
            Some(if hard {
                "Tool deleted successfully".to_string()
            } else {
                "Tool deactivated successfully".to_string()
            }),
        ),
        Err(e) => failure(&e),
    };
    emit(&response)
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl EnrichmentProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }
}
