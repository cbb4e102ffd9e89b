use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

mod app;
mod handler;
mod logging;
mod markdown;
mod tui;
mod ui;

use app::App;
use mindmentor_core::{ApiClient, Config};

#[derive(Parser)]
#[command(name = "mindmentor", version)]
#[command(about = "Chat with the MindMentor AI tutor from your terminal")]
struct Cli {
    /// Tutor backend base URL (overrides MINDMENTOR_API_URL and the config file)
    #[arg(long)]
    api_url: Option<String>,
    /// Model to ask first
    #[arg(short, long)]
    model: Option<String>,
    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.verbose)?;

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not read config, using defaults");
        Config::new()
    });
    let api_url = config.resolve_api_url(cli.api_url.as_deref());
    let model = config.resolve_model(cli.model.as_deref());
    info!(%api_url, %model, "starting MindMentor");

    let mut app = App::new(ApiClient::new(&api_url), &model);
    app.start_background_checks();

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    app.shutdown();
    tui::restore()?;
    info!("exiting");
    result
}

async fn run(
    terminal: &mut tui::Tui,
    app: &mut App,
    events: &mut tui::EventHandler,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event)?;
        app.poll_tasks().await;
    }
    Ok(())
}
