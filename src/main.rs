mod config;
mod format;
mod models;
mod submit;
mod ui;
mod validate;

use std::fs::OpenOptions;
use std::io;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing_subscriber::EnvFilter;
use tui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};

use crate::submit::{HttpDelivery, SheetRow, Submitter, TransportStrategy};
use crate::ui::{
    client_form::{
        ClientFormAction, ClientFormState, handle_input as handle_client_form_input,
        render_client_form,
    },
    home::{HomeAction, HomeState, handle_input as handle_home_input, render_home},
    lead_form::{
        LeadFormAction, LeadFormState, handle_input as handle_lead_form_input, render_lead_form,
    },
};

// Represents the current screen in the app
enum AppScreen {
    Home,
    ClientForm,
    LeadForm,
}

// Main application state
struct AppState {
    config: config::Config,
    submitter: Submitter,
    screen: AppScreen,
    home_state: Option<HomeState>,
    client_form_state: Option<ClientFormState>,
    lead_form_state: Option<LeadFormState>,
}

impl AppState {
    fn new(config: config::Config, submitter: Submitter) -> Self {
        Self {
            config,
            submitter,
            screen: AppScreen::Home,
            home_state: Some(HomeState::new()),
            client_form_state: None,
            lead_form_state: None,
        }
    }
}

/// Route tracing output to a file; the terminal belongs to the UI
fn init_logging(config: &config::Config) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("failed to open log file '{}'", config.log_file))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::init()?;
    init_logging(&config)?;
    println!("Initializing intake manager...");

    // Build the submission service
    let endpoint = config
        .sheets_endpoint_url
        .parse()
        .context("SHEETS_ENDPOINT_URL is not a valid URL")?;
    let strategy: TransportStrategy = config
        .submit_transport
        .parse()
        .map_err(anyhow::Error::msg)
        .context("SUBMIT_TRANSPORT is not a valid strategy")?;
    let submitter = Submitter::new(
        HttpDelivery::new(endpoint),
        strategy,
        config.submit_max_attempts,
        config.retry_delay(),
    );
    tracing::info!(
        transport = %config.submit_transport,
        max_attempts = config.submit_max_attempts,
        "submission service ready"
    );

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app_state = AppState::new(config, submitter);

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        println!("Error: {}", err);
    }

    println!("Thanks for using Intake Manager!");

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| match app_state.screen {
            AppScreen::Home => {
                if let Some(state) = &mut app_state.home_state {
                    render_home(f, state);
                }
            }
            AppScreen::ClientForm => {
                if let Some(state) = &mut app_state.client_form_state {
                    render_client_form(f, state);
                }
            }
            AppScreen::LeadForm => {
                if let Some(state) = &mut app_state.lead_form_state {
                    render_lead_form(f, state);
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Home => handle_home_screen(app_state)?,
            AppScreen::ClientForm => handle_client_form_screen(app_state).await?,
            AppScreen::LeadForm => handle_lead_form_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_home_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.home_state {
        match handle_home_input(state)? {
            Some(HomeAction::Exit) => {
                return Ok(true);
            }
            Some(HomeAction::OpenClientForm) => {
                app_state.client_form_state = Some(ClientFormState::new());
                app_state.screen = AppScreen::ClientForm;
            }
            Some(HomeAction::OpenLeadForm) => {
                app_state.lead_form_state = Some(LeadFormState::new());
                app_state.screen = AppScreen::LeadForm;
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_client_form_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.client_form_state {
        // A pending submission runs before any input is read, so the form
        // cannot be re-submitted while a request is in flight
        if let Some(record) = state.take_pending() {
            let row = SheetRow::new(app_state.config.client_sheet_tab.clone(), record.columns());
            match app_state.submitter.submit(&row).await {
                Ok(message) => state.mark_submitted(message),
                Err(err) => state.fail(err.to_string()),
            }
            return Ok(false);
        }

        match handle_client_form_input(state)? {
            Some(ClientFormAction::Back) => {
                app_state.home_state = Some(HomeState::new());
                app_state.screen = AppScreen::Home;
            }
            Some(ClientFormAction::Submit(record)) => {
                // The submitting frame renders on the next loop pass,
                // then the request is performed
                state.begin_submit(record);
            }
            None => {}
        }
    }

    Ok(false)
}

async fn handle_lead_form_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.lead_form_state {
        if let Some(record) = state.take_pending() {
            let row = SheetRow::new(app_state.config.lead_sheet_tab.clone(), record.columns());
            match app_state.submitter.submit(&row).await {
                Ok(message) => state.mark_submitted(message),
                Err(err) => state.fail(err.to_string()),
            }
            return Ok(false);
        }

        match handle_lead_form_input(state)? {
            Some(LeadFormAction::Back) => {
                app_state.home_state = Some(HomeState::new());
                app_state.screen = AppScreen::Home;
            }
            Some(LeadFormAction::Submit(record)) => {
                state.begin_submit(record);
            }
            None => {}
        }
    }

    Ok(false)
}
