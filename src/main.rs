use anyhow::{Context, Result};
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use pokedex_card::error::FetchError;
use pokedex_card::logging::init_logging;
use pokedex_card::state::{Cycle, Transition};
use pokedex_card::ui::{draw_ui, Action, App, SpriteThumb};
use pokedex_card::utils::{card_text, decode_thumbnail};
use pokedex_card::{validate, DisplayModel, Identifier, PokeApiClient, Settings};

const USAGE: &str = "usage: pokedex_card [--once [ID]]

  (no args)    interactive card, starts on a random Pokémon
  --once [ID]  print one card to stdout and exit (random when ID is omitted)";

/// Results coming back from background tasks.
enum AppEvent {
    Fetched {
        cycle: Cycle,
        result: Result<DisplayModel, FetchError>,
    },
    Sprite {
        id: u32,
        thumb: SpriteThumb,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let settings = Settings::from_env().context("failed to load settings")?;
    init_logging(&settings)?;
    let client = PokeApiClient::new(&settings).context("failed to build HTTP client")?;

    // Non-interactive mode, handy for scripting and smoke tests.
    if let Some(pos) = args.iter().position(|a| a == "--once") {
        let id = args.get(pos + 1).map(|raw| validate(raw)).transpose()?;
        let model = client.fetch(id).await?;
        println!("{}", card_text(&model));
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, client).await;

    // Restore terminal
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(LeaveAlternateScreen)?;
    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    client: PokeApiClient,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    let mut app = App::new();
    let mut inflight: Option<JoinHandle<()>> = None;

    start_fetch(&mut app, &client, &tx, &mut inflight, None);

    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        draw_ui(terminal, &app)?;
        drain_events(&mut app, &client, &tx, &mut rx);

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        if event::poll(timeout)? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.handle_key(key.code) {
                    Action::Quit => break,
                    Action::Search(id) => {
                        start_fetch(&mut app, &client, &tx, &mut inflight, Some(id));
                    }
                    Action::Random => {
                        start_fetch(&mut app, &client, &tx, &mut inflight, None);
                    }
                    Action::None => {}
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    if let Some(handle) = inflight {
        handle.abort();
    }
    Ok(())
}

/// Begins a new fetch cycle, aborting the one in flight.
fn start_fetch(
    app: &mut App,
    client: &PokeApiClient,
    tx: &UnboundedSender<AppEvent>,
    inflight: &mut Option<JoinHandle<()>>,
    id: Option<Identifier>,
) {
    if let Some(handle) = inflight.take() {
        handle.abort();
    }
    let cycle = app.controller.begin();
    info!(cycle = cycle.id(), id = ?id.map(Identifier::get), "fetch cycle started");

    let client = client.clone();
    let tx = tx.clone();
    *inflight = Some(tokio::spawn(async move {
        let result = client.fetch(id).await;
        let _ = tx.send(AppEvent::Fetched { cycle, result });
    }));
}

fn drain_events(
    app: &mut App,
    client: &PokeApiClient,
    tx: &UnboundedSender<AppEvent>,
    rx: &mut UnboundedReceiver<AppEvent>,
) {
    while let Ok(ev) = rx.try_recv() {
        match ev {
            AppEvent::Fetched { cycle, result } => {
                if app.controller.complete(cycle, result) != Transition::Displayed {
                    continue;
                }
                let sprite = app
                    .controller
                    .current()
                    .and_then(|m| m.image.clone().map(|url| (m.id, url)));
                if let Some((id, url)) = sprite {
                    spawn_sprite_load(client, tx, id, url);
                }
            }
            AppEvent::Sprite { id, thumb } => app.set_sprite(id, thumb),
        }
    }
}

fn spawn_sprite_load(client: &PokeApiClient, tx: &UnboundedSender<AppEvent>, id: u32, url: String) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let bytes = match client.fetch_sprite(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(id, %url, error = %e, "sprite download failed");
                return;
            }
        };
        match tokio::task::spawn_blocking(move || decode_thumbnail(&bytes)).await {
            Ok(Ok(thumb)) => {
                let _ = tx.send(AppEvent::Sprite { id, thumb });
            }
            Ok(Err(e)) => warn!(id, error = %e, "sprite decode failed"),
            Err(e) => warn!(id, error = %e, "sprite decode task failed"),
        }
    });
}
