use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

use paperstream::app::{App, AppEvent};
use paperstream::config::Config;
use paperstream::feed::ArxivClient;
use paperstream::theme::ThemeVariant;
use paperstream::ui;

/// Get the config directory path (~/.config/paperstream/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("paperstream"))
}

#[derive(Parser, Debug)]
#[command(name = "paperstream", about = "Browse arXiv abstracts one card at a time")]
struct Args {
    /// Config file (default: ~/.config/paperstream/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// arXiv search query, e.g. "cat:cs.LG"
    #[arg(long, short)]
    query: Option<String>,

    /// Papers requested per page
    #[arg(long, value_name = "N")]
    page_size: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Command line wins over the file
    if let Some(query) = args.query {
        config.search_query = query;
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    config.validate().context("Invalid configuration")?;

    let query = config.feed_query().context("Invalid feed configuration")?;
    let client = ArxivClient::new(query, config.request_timeout())
        .context("Failed to create HTTP client")?;

    let mut app = App::new(client, config.input_debounce());

    match ThemeVariant::from_str_name(&config.theme) {
        Some(variant) => app.set_theme(variant),
        None => tracing::warn!(theme = %config.theme, "Unknown theme, using dark"),
    }

    for warning in app.keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
    }

    tracing::info!(
        query = %config.search_query,
        page_size = config.page_size,
        "Starting"
    );

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    Ok(())
}
