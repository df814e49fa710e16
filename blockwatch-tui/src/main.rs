use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use blockwatch_core::{init_logging, BlockwatchConfig, ThemeId, ThemeStore};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use blockwatch_tui::app::App;

#[derive(Parser, Debug)]
#[command(name = "blockwatch")]
#[command(author, version, about = "Live terminal dashboard for a DNS filtering server")]
struct Args {
    /// Base URL of the DNS server's HTTP API
    #[arg(long, env = "BLOCKWATCH_API_URL")]
    api_url: Option<String>,

    /// Theme to start with (tva or cockpit); saved as the new preference
    #[arg(long)]
    theme: Option<ThemeId>,

    /// Initial route, e.g. /blocklists
    #[arg(long)]
    route: Option<String>,

    /// Read configuration from this file only
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Refresh interval in milliseconds
    #[arg(long)]
    refresh_ms: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    init_logging(&config.logging, &config.log_file())
        .context("Failed to initialize logging")?;
    info!("Starting blockwatch against {}", config.base_url());

    if let Some(theme) = args.theme {
        if let Err(e) = ThemeStore::new(config.theme_file()).save(theme) {
            warn!("Could not save theme from command line: {}", e);
        }
    }

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, config);
    restore_terminal(&mut terminal)?;

    if let Err(e) = result {
        eprintln!("Application error: {e}");
        return Err(e);
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<BlockwatchConfig> {
    let mut config = match &args.config {
        Some(path) => BlockwatchConfig::load_from_paths(vec![path.clone()]),
        None => BlockwatchConfig::load(),
    }
    .context("Failed to load configuration")?;

    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(route) = &args.route {
        config.tui.start_route = route.clone();
    }
    if let Some(ms) = args.refresh_ms {
        config.polling.refresh_interval_ms = ms;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, config: BlockwatchConfig) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut app = App::new(config)?;
        app.run(terminal).await
    })
}
