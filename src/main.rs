use anyhow::{Context, Result};
use category_tree::app::{App, AppEvent, BREADCRUMB_SEPARATOR};
use category_tree::catalog::{
    CategoryBrowser, CategoryId, Query, SortDirection, SortField, StatusFilter, ViewMode,
};
use category_tree::config::Config;
use category_tree::source::{CategoryClient, RecordSource};
use category_tree::ui;
use category_tree::util::ImageResolver;
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Default config path (~/.config/category-tree/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("category-tree")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(
    name = "category-tree",
    about = "Browse a storefront category hierarchy in the terminal"
)]
struct Args {
    /// Config file (default: ~/.config/category-tree/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// API base URL, overrides api_base_url from the config
    #[arg(long, value_name = "URL", conflicts_with = "file")]
    source: Option<String>,

    /// Load categories from a saved JSON snapshot instead of the API
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Keep categories whose title, description or parent contains this text
    #[arg(long)]
    keyword: Option<String>,

    /// Status filter: all, active or inactive
    #[arg(long)]
    status: Option<String>,

    /// Sort field: title, status or createdAt
    #[arg(long)]
    sort: Option<String>,

    /// Sort descending
    #[arg(long)]
    desc: bool,

    /// List every match at one level instead of nesting
    #[arg(long)]
    flat: bool,

    /// Expand every category with children
    #[arg(long)]
    expand_all: bool,

    /// Print rows to stdout and exit
    #[arg(long)]
    print: bool,

    /// Print the breadcrumb of the category with this id and exit
    #[arg(long, value_name = "ID")]
    path: Option<String>,
}

fn record_source(args: &Args, config: &Config) -> Result<RecordSource> {
    if let Some(path) = &args.file {
        return Ok(RecordSource::File(path.clone()));
    }

    let base_url = args
        .source
        .as_deref()
        .or(config.api_base_url.as_deref())
        .context("No category source: pass --source URL or --file FILE, or set api_base_url in the config")?;

    let client = CategoryClient::new(
        base_url,
        &config.categories_path,
        config.api_token(),
        config.source_options(),
    )
    .with_context(|| format!("Invalid category API base URL '{}'", base_url))?;
    Ok(RecordSource::Api(client))
}

fn initial_query(args: &Args, config: &Config) -> Result<Query> {
    let status: StatusFilter = match &args.status {
        Some(raw) => raw.parse().context("Invalid --status")?,
        None => StatusFilter::default(),
    };
    let sort_field: SortField = match &args.sort {
        Some(raw) => raw.parse().context("Invalid --sort")?,
        None => config.sort_field()?,
    };
    let direction = if args.desc {
        SortDirection::Desc
    } else {
        config.sort_direction()?
    };

    Ok(Query {
        keyword: args.keyword.clone().unwrap_or_default(),
        status,
        sort_field,
        direction,
        mode: if args.flat { ViewMode::Flat } else { ViewMode::Tree },
    })
}

fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(w, _)| usize::from(w))
        .unwrap_or(80)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with printed rows or the TUI
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    tracing::debug!(?config, "Effective configuration");

    let source = record_source(&args, &config)?;
    let records = source
        .load()
        .await
        .with_context(|| format!("Failed to load categories from {}", source))?;

    let mut browser =
        CategoryBrowser::with_options(records, config.build_options(), config.max_path_depth);
    browser.set_query(initial_query(&args, &config)?);

    if args.expand_all {
        browser.expand_all().context("Failed to build category tree")?;
    }

    if let Some(id) = &args.path {
        let titles = browser
            .breadcrumb(&CategoryId::new(id.as_str()))
            .with_context(|| format!("Failed to resolve path of category '{}'", id))?;
        println!("{}", titles.join(BREADCRUMB_SEPARATOR));
        return Ok(());
    }

    if args.print {
        let rows = browser.rows().context("Failed to build category tree")?;
        let stdout = std::io::stdout();
        ui::write_rows(&mut stdout.lock(), rows, terminal_width())
            .context("Failed to write rows")?;
        return Ok(());
    }

    let images = ImageResolver::new(config.image_cdn_base.as_deref())
        .context("Invalid image_cdn_base in config")?;
    let mut app = App::new(browser)
        .with_source(source)
        .with_images(images, config.thumbnail_size);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(8);
    ui::run(&mut app, event_tx, event_rx).await?;

    Ok(())
}
