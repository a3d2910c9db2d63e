use color_eyre::Result;
use locate_tui::{
    api::NominatimProvider,
    app::App,
    config::Config,
    events::EventHandler,
    location::{self, IpGeolocation},
    logging,
    map::{MapViewportController, TerminalMap},
    quicklinks::{self, QuickLinksSource},
    store::SelectionStore,
    sync::SearchSynchronizer,
    ui,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let _log_guard = logging::initialize_logging();
    color_eyre::install()?;
    install_panic_hook(); // After color_eyre so its hook runs once the terminal is restored

    let config = Config::load();
    let provider = Arc::new(NominatimProvider::new(&config.geocoder)?);
    let store = match &config.store.persist_path {
        Some(path) => SelectionStore::with_persistence(path),
        None => SelectionStore::new(),
    };

    // Ready terminal and state
    let mut terminal = setup_terminal()?;
    let mut events = EventHandler::new(100); // Fast enough for smooth flyTo animation

    let map = MapViewportController::new(TerminalMap::new(&config.map), store.clone(), &config.map);
    let mut search = SearchSynchronizer::new(provider, store, map, events.tx.clone(), &config);
    search.start();
    let mut app = App::new(search);

    // One-shot background loads
    quicklinks::spawn_load(QuickLinksSource::parse(&config.quick_links.source), events.tx.clone());
    if config.location.auto_locate {
        location::spawn_locate(IpGeolocation::new(config.location.ip.clone()), events.tx.clone());
    } else {
        app.search.map_mut().on_location_error("disabled in config");
    }

    // Main loop
    while !app.should_quit {
        terminal.draw(|f| ui::render(f, &app))?;

        match events.next().await {
            Some(event) => app.handle_event(event),
            None => break,
        }
    }

    info!("Shutting down");
    restore_terminal(terminal)?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen, crossterm::cursor::Hide)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show)?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Force terminal cleanup!
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show).ok();
        original_hook(panic_info);
    }));
}
