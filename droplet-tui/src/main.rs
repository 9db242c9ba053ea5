//! Terminal UI for droplet that shows per-source water quality, the user's
//! own readings, proximity lookups, and photo submissions.

mod app;
mod cli;
mod input;
mod logging;
mod ui;

use std::{fs, io, path::Path, sync::Arc, time::Duration as StdDuration, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use droplet_core::{config::DropletConfig, model::Photo, service::DropletService};
use droplet_provider_appwrite as appwrite;
use droplet_provider_predict as predict;
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::{info, warn};

use crate::app::{App, Screen};
use crate::cli::Args;
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_file_logger(&args.log_file, args.verbose)?;

    let config = DropletConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let catalog = Arc::new(config.catalog()?);
    info!(sources = catalog.len(), "loaded water-source catalog");

    // HTTP + service setup
    let client = Client::builder().user_agent("droplet/0.1").build()?;

    let readings = appwrite::reading_port(client.clone(), config.backend.clone());
    let classifier = config
        .classifier
        .clone()
        .map(|classifier| predict::classifier_port(client.clone(), classifier));
    if classifier.is_none() {
        warn!("no classifier configured, submissions are disabled");
    }
    let service = Arc::new(DropletService::new(catalog, readings, classifier));

    // App state
    let app = App::new(
        service,
        config.app.user_id.clone(),
        config.app.refresh_interval(),
    );

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        let action = if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            input::handle_key_event(key, &mut app)
        } else if app.refresh_due(Instant::now()) {
            Action::Refresh
        } else {
            Action::None
        };

        match action {
            Action::Quit => break,
            Action::None => {}
            Action::Refresh => {
                app.is_loading = true;
                terminal.draw(|frame| ui::draw(frame, &app))?;
                refresh(&mut app).await;
                app.is_loading = false;
            }
            Action::SubmitPhoto => {
                app.is_loading = true;
                app.error_message = None;
                terminal.draw(|frame| ui::draw(frame, &app))?;
                submit(&mut app).await;
                app.is_loading = false;
            }
        }
    }

    Ok(())
}

// Re-fetch whatever the current screen shows; errors land in the status line.
async fn refresh(app: &mut App) {
    app.last_refresh = Some(Instant::now());

    match app.screen {
        Screen::Overview => {
            let result = app.service.overview().await;
            match result {
                Ok(summaries) => {
                    app.summaries = summaries;
                    app.error_message = None;
                }
                Err(err) => {
                    warn!(error = %err, "overview refresh failed");
                    app.error_message = Some(format!("Refresh failed: {err}"));
                }
            }
        }
        Screen::Readings => {
            let result = app.service.all_readings().await;
            match result {
                Ok(readings) => {
                    app.readings = readings;
                    app.error_message = None;
                }
                Err(err) => {
                    warn!(error = %err, "readings refresh failed");
                    app.error_message = Some(format!("Refresh failed: {err}"));
                }
            }
        }
        Screen::Log => {
            let Some(user_id) = app.user_id.clone() else {
                return;
            };
            let result = app.service.user_log(&user_id).await;
            match result {
                Ok(log) => {
                    app.log = log;
                    app.error_message = None;
                }
                Err(err) => {
                    warn!(error = %err, "log refresh failed");
                    app.error_message = Some(format!("Refresh failed: {err}"));
                }
            }
        }
        Screen::Locate | Screen::Submit => {}
    }

    app.clamp_indices();
}

async fn submit(app: &mut App) {
    let Some(user_id) = app.user_id.clone() else {
        app.error_message = Some("Set app.user_id in the configuration first".into());
        return;
    };

    let Some((point, path)) = app::parse_submission(&app.submit_input) else {
        app.error_message = Some("Enter: latitude longitude path/to/photo.jpg".into());
        return;
    };

    let photo = match read_photo(Path::new(&path)) {
        Ok(photo) => photo,
        Err(err) => {
            app.error_message = Some(format!("{err:#}"));
            return;
        }
    };

    let result = app.service.submit_photo(&user_id, point, &photo).await;
    match result {
        Ok(reading) => {
            info!(droplet = %reading.id, "submitted reading");
            app.last_submission = Some(reading);
            app.submit_input.clear();
            // next visit to the data screens picks up the new reading
            app.last_refresh = None;
        }
        Err(err) => {
            app.error_message = Some(format!("Submission failed: {err}"));
        }
    }
}

fn read_photo(path: &Path) -> Result<Photo> {
    let bytes = fs::read(path).with_context(|| format!("cannot read photo {}", path.display()))?;
    let file_name = path
        .file_name()
        .map_or_else(|| "photo.jpg".to_owned(), |name| name.to_string_lossy().into_owned());
    Ok(Photo { file_name, bytes })
}
