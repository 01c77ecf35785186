use std::io::Write;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use artgrid_core::config_file::{self, ApiConfig, ConfigFile, TableConfig};
use artgrid_core::{ArticClient, CatalogSource, Config, PageCache, SelectionSet};

mod output;

use output::ColorMode;

/// artgrid - browse the Art Institute of Chicago catalog and bulk-select rows
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// API root (overrides the config file)
    #[arg(long, global = true, env = "ARTGRID_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of the catalog
    Page {
        /// 1-based page number
        page: u32,

        /// Rows per page
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Select the first COUNT rows across pages and print the selection
    Select {
        /// Number of rows to select (integer >= 1)
        count: String,

        /// Rows per page used to fetch the selection
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Show the resolved configuration
    Config {
        /// Write a config file with the current values to the platform config directory
        #[arg(long)]
        init: bool,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("ARTGRID_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("artgrid_core={default_level},artgrid={default_level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Resolve configuration: CLI flags > config file > defaults
    let mut config = Config::from_file(&config_file::load_config());
    if let Some(url) = &cli.base_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout_secs = secs.max(1);
    }
    tracing::debug!(base_url = %config.base_url, timeout_secs = config.timeout_secs, "resolved configuration");
    let color = ColorMode(!cli.no_color && !cli.json);

    match cli.command {
        Command::Page { page, page_size } => {
            let page_size = page_size.unwrap_or(config.page_size);
            print_page(&config, page, page_size, cli.json, color).await
        }
        Command::Select { count, page_size } => {
            let count = artgrid_core::parse_bulk_count(&count)
                .with_context(|| format!("invalid row count {count:?}"))?;
            let page_size = page_size.unwrap_or(config.page_size);
            select(&config, count, page_size, cli.json, color).await
        }
        Command::Config { init } => show_config(&config, init),
    }
}

async fn print_page(
    config: &Config,
    page: u32,
    page_size: usize,
    json: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    let client = ArticClient::from_config(config)?;
    let fetched = client
        .fetch_page(page, page_size)
        .await
        .with_context(|| format!("failed to fetch page {page} from {}", client.base_url()))?;

    let stdout = std::io::stdout();
    let mut w = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut w, &fetched.records)?;
        writeln!(w)?;
        return Ok(());
    }
    output::print_page_header(&mut w, page, page_size, fetched.total, color)?;
    output::print_records(&mut w, &fetched.records, None, color)?;
    Ok(())
}

async fn select(
    config: &Config,
    count: usize,
    page_size: usize,
    json: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    if page_size == 0 {
        anyhow::bail!("page size must be at least 1");
    }
    let client = ArticClient::from_config(config)?;
    let mut cache = PageCache::new(page_size);
    let mut selection = SelectionSet::new();

    let report = artgrid_core::select_first(
        &client,
        count,
        &mut cache,
        &mut selection,
        config.max_concurrent_fetches,
    )
    .await
    .with_context(|| format!("bulk select of {count} rows failed"))?;

    let stdout = std::io::stdout();
    let mut w = stdout.lock();
    if json {
        let records: Vec<_> = selection.iter().collect();
        serde_json::to_writer_pretty(&mut w, &records)?;
        writeln!(w)?;
        return Ok(());
    }
    let records: Vec<_> = selection.iter().cloned().collect();
    output::print_records(&mut w, &records, Some(&selection), color)?;
    output::print_selection_summary(&mut w, &report, color)?;
    Ok(())
}

fn show_config(config: &Config, init: bool) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut w = stdout.lock();
    match config_file::config_path() {
        Some(path) => writeln!(w, "config file: {}", path.display())?,
        None => writeln!(w, "config file: (no platform config directory)")?,
    }
    writeln!(w, "base_url: {}", config.base_url)?;
    writeln!(w, "timeout_secs: {}", config.timeout_secs)?;
    writeln!(w, "page_size: {}", config.page_size)?;
    writeln!(w, "page_size_options: {:?}", config.page_size_options)?;
    writeln!(w, "max_concurrent_fetches: {}", config.max_concurrent_fetches)?;
    writeln!(w, "theme: {}", config.theme)?;

    if init {
        let file = ConfigFile {
            api: Some(ApiConfig {
                base_url: Some(config.base_url.clone()),
                timeout_secs: Some(config.timeout_secs),
                max_concurrent_fetches: Some(config.max_concurrent_fetches),
            }),
            table: Some(TableConfig {
                page_size: Some(config.page_size),
                page_size_options: Some(config.page_size_options.clone()),
            }),
            display: Some(config_file::DisplayConfig {
                theme: Some(config.theme.clone()),
                tick_ms: Some(config.tick_ms),
            }),
        };
        let path = config_file::save_config(&file)?;
        writeln!(w, "wrote {}", path.display())?;
    }
    Ok(())
}
