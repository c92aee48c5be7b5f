mod app;
mod config;
mod gemini;
mod input;
mod logging;
mod parse;
mod prompts;
mod report;
mod session;
mod ui;

use std::env;
use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::{DefaultTerminal, Terminal};
use tracing::{debug, info, warn};

use crate::app::App;
use crate::config::ConfigLoadStatus;
use crate::gemini::GeminiClient;
use crate::input::Action;
use crate::report::ReportSection;
use crate::session::{ConfirmOutcome, TopicStage};

/// AI co-author that walks a research topic from pick to packet.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Gemini model to use, overriding the config file
    #[arg(long)]
    model: Option<String>,

    /// Log level filter, overriding the config file
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    use std::time::Instant;

    let start_time = Instant::now();
    let args = Args::parse();

    // Pull GEMINI_API_KEY and friends from a local .env when present
    dotenv::dotenv().ok();

    // Load configuration first so it can set the log level
    let loaded_config = config::load_config();
    let mut config = loaded_config.config.clone();
    if let Some(model) = args.model {
        config.gemini.model = model;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    let (session_id, log_directory, _guard) = match logging::init(&config.logging.level) {
        Ok(ctx) => {
            logging::cleanup_old_logs(&ctx.log_directory);
            (ctx.session_id, Some(ctx.log_directory), Some(ctx._guard))
        }
        Err(e) => {
            eprintln!("Warning: failed to initialize logging: {:#}", e);
            ("------".to_string(), None, None)
        }
    };

    debug!(
        config_path = %loaded_config.config_path.display(),
        status = ?loaded_config.status,
        "config_loaded"
    );
    if let ConfigLoadStatus::Error(message) = &loaded_config.status {
        warn!(%message, "config_load_degraded");
    }

    let api_key = env::var("GEMINI_API_KEY")
        .context("GEMINI_API_KEY is not set; export it or put it in a .env file")?;
    let client =
        GeminiClient::new(api_key, config.gemini.model.clone(), config.gemini.timeout_secs)?;
    info!(model = client.model(), "generator_ready");

    let mut app = App::new(session_id.clone(), log_directory, config);

    // Fetch the opening trending pool before touching the terminal, so a
    // bad key or a network failure prints a plain error instead of
    // tearing up the screen
    println!("Fetching trending topics...");
    app.bootstrap_trending(&client).await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let terminal = Terminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

    let result = run_app(terminal, &mut app, &client).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    let duration = start_time.elapsed();
    info!(
        session_id = %session_id,
        duration_secs = duration.as_secs_f64(),
        "session_end"
    );

    result
}

async fn run_app(
    mut terminal: DefaultTerminal,
    app: &mut App,
    client: &GeminiClient,
) -> Result<()> {
    let mut events = EventStream::new();

    loop {
        terminal.draw(|f| ui::draw_ui(f, app))?;

        // The report starts on its own the moment the stage flips
        if app.session.stage == TopicStage::Generate && !app.report_started {
            generate_report(&mut terminal, app, client).await?;
            continue;
        }

        let Some(event) = events.next().await else {
            return Ok(());
        };

        match event? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if let Some(action) = input::handle_key(app, key) {
                    if action == Action::Quit {
                        return Ok(());
                    }
                    run_action(&mut terminal, app, client, action).await?;
                }
            }
            Event::Mouse(mouse) => {
                input::handle_mouse(app, mouse);
            }
            Event::Resize(_, _) => {
                // Terminal resized, will be handled in next draw
            }
            _ => {}
        }
    }
}

/// Runs a dispatched action, painting a busy frame before each model call
/// since the loop blocks on the await.
async fn run_action(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    client: &GeminiClient,
    action: Action,
) -> Result<()> {
    match action {
        Action::Quit => {}
        Action::ConfirmTopic => {
            if app.start_confirm_topic() == ConfirmOutcome::NeedsRefresh {
                show_busy(terminal, app, "Refreshing trending topics...")?;
                app.finish_confirm_refresh(client).await;
                app.busy = None;
            }
        }
        Action::ApplyChoice => {
            if app.apply_choice_at_cursor() {
                show_busy(terminal, app, "Generating subtopics...")?;
                app.fetch_first_subtopics(client).await;
                app.busy = None;
            }
        }
        Action::MoreSubtopics => {
            show_busy(terminal, app, "Generating subtopics...")?;
            app.fetch_more_subtopics(client).await;
            app.busy = None;
        }
        Action::ConfirmSubtopic => {
            app.confirm_selected_subtopic();
        }
    }
    Ok(())
}

/// Generates the six report sections in order, one model call each,
/// stopping at the first failure.
async fn generate_report(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    client: &GeminiClient,
) -> Result<()> {
    app.begin_report();
    for section in ReportSection::ALL {
        show_busy(terminal, app, &format!("Generating {}...", section.title()))?;
        let ok = app.generate_section(client, section).await;
        app.busy = None;
        terminal.draw(|f| ui::draw_ui(f, app))?;
        if !ok {
            break;
        }
    }
    Ok(())
}

/// Paint one frame with the busy label showing before an await blocks.
fn show_busy(terminal: &mut DefaultTerminal, app: &mut App, label: &str) -> Result<()> {
    app.busy = Some(label.to_string());
    terminal.draw(|f| ui::draw_ui(f, app))?;
    Ok(())
}
