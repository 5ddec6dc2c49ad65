// ============================================================================
// StockDash - Tableau de bord des cours boursiers
// ============================================================================
// Programme TUI : champ tickers + période → graphique ligne des clôtures
// et graphique en chandeliers, alimentés par Yahoo Finance
//
// Deux modes :
// - TUI (par défaut) : event loop + worker thread pour les appels API
// - --headless : une seule mise à jour, datasets imprimés en JSON
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Async dans sync : tokio::runtime::Runtime pour appels API
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{mpsc, Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use stockdash::api::yahoo::DEFAULT_BASE_URL;
use stockdash::api::{PriceProvider, YahooClient, YahooConfig};
use stockdash::app::{App, RefreshRequest};
use stockdash::dashboard::{update_charts, DEFAULT_TICKERS};
use stockdash::models::{CandlestickDataset, LineDataset, Period};
use stockdash::ui::{events::EventHandler, render};

// ============================================================================
// Ligne de commande
// ============================================================================

/// Tableau de bord des cours boursiers (graphique ligne + chandeliers)
#[derive(Parser, Debug)]
#[command(name = "stockdash", version, about)]
struct Cli {
    /// Tickers séparés par des virgules (ex: "AAPL, MSFT")
    #[arg(short, long, default_value = DEFAULT_TICKERS)]
    tickers: String,

    /// Période : 1mo, 3mo, 6mo, 1y, 5y ou max
    #[arg(short, long, default_value = "1mo")]
    period: Period,

    /// Une seule mise à jour, datasets imprimés en JSON sur stdout
    #[arg(long)]
    headless: bool,

    /// URL de base de l'API chart
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Prix bruts (pas d'ajustement dividendes / splits)
    #[arg(long)]
    no_adjust: bool,
}

impl Cli {
    fn yahoo_config(&self) -> YahooConfig {
        YahooConfig {
            base_url: self.base_url.clone(),
            auto_adjust: !self.no_adjust,
            ..YahooConfig::default()
        }
    }
}

// ============================================================================
// AppCommand / AppResult : échanges avec le worker thread
// ============================================================================
// - L'event loop envoie des commandes au worker thread
// - Le worker exécute update_charts de manière async
// - Communication via mpsc channels
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Recalculer les deux graphiques pour une saisie et une période
    Refresh(RefreshRequest),
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Les deux datasets sont prêts
    ChartsReady {
        generation: u64,
        line: LineDataset,
        candlestick: CandlestickDataset,
    },

    /// La mise à jour a échoué (aucun graphique partiel)
    UpdateFailed { generation: u64, error: String },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier, avec rotation quotidienne.
// ============================================================================

/// Répertoire des logs
///
/// - Linux : ~/.local/share/stockdash/logs
/// - macOS : ~/Library/Application Support/stockdash/logs
/// - Windows : C:\Users\<user>\AppData\Local\stockdash\logs
/// - Sinon : ./logs
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("stockdash").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// ```bash
/// tail -f ~/.local/share/stockdash/logs/stockdash.log.*
/// RUST_LOG=stockdash=trace stockdash
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "stockdash.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockdash=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(tickers = %cli.tickers, period = %cli.period, headless = cli.headless, "StockDash starting up");

    let client = YahooClient::new(cli.yahoo_config())?;

    if cli.headless {
        return run_headless(&client, &cli.tickers, cli.period);
    }

    run_tui(Arc::new(client), App::new(cli.tickers, cli.period))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Mode headless
// ============================================================================

/// Une mise à jour, puis les deux datasets en JSON sur stdout
///
/// En cas d'échec, l'erreur (avec sa chaîne de contexte) part sur stderr
/// et le code de sortie est non nul.
fn run_headless(provider: &dyn PriceProvider, tickers: &str, period: Period) -> Result<ExitCode> {
    let runtime = tokio::runtime::Runtime::new()?;

    match runtime.block_on(headless_output(provider, tickers, period)) {
        Ok(json) => {
            println!("{}", json);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(error = ?e, "Headless update failed");
            eprintln!("Erreur : {:#}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// `{"line": ..., "candlestick": ...}` en JSON indenté
async fn headless_output(provider: &dyn PriceProvider, tickers: &str, period: Period) -> Result<String> {
    let (line, candlestick) = update_charts(provider, tickers, period).await?;
    info!(series = line.len(), "Headless update succeeded");

    let output = serde_json::json!({
        "line": line,
        "candlestick": candlestick,
    });
    serde_json::to_string_pretty(&output).context("Échec de la sérialisation JSON")
}

// ============================================================================
// Mode TUI
// ============================================================================

fn run_tui(provider: Arc<dyn PriceProvider>, app: App) -> Result<()> {
    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // Arc<Mutex<>> : l'event loop et le rendu partagent l'état
    let app = Arc::new(Mutex::new(app));

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx, provider);

    // Premier affichage : les graphiques de la saisie initiale
    {
        let mut app_lock = lock(&app)?;
        let request = app_lock.begin_refresh();
        send_refresh(&command_tx, request);
    }

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, app, &events, command_tx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

/// Verrouille l'état partagé
///
/// Un Mutex empoisonné (panic dans un autre thread) devient une erreur.
fn lock(app: &Mutex<App>) -> Result<std::sync::MutexGuard<'_, App>> {
    app.lock().map_err(|_| anyhow!("État de l'application corrompu (mutex empoisonné)"))
}

fn send_refresh(command_tx: &mpsc::Sender<AppCommand>, request: RefreshRequest) {
    debug!(generation = request.generation, tickers = %request.tickers, period = %request.period, "Sending refresh");
    if command_tx.send(AppCommand::Refresh(request)).is_err() {
        error!("Worker thread unavailable, refresh dropped");
    }
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// - Thread séparé avec son propre runtime tokio
// - Reçoit des AppCommand, renvoie des AppResult
// - Les appels API ne bloquent jamais l'UI
// ============================================================================

fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    provider: Arc<dyn PriceProvider>,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = ?e, "Failed to create tokio runtime");
                // Chaque demande reçoit l'erreur plutôt que de rester en chargement
                for AppCommand::Refresh(request) in command_rx.iter() {
                    let _ = result_tx.send(AppResult::UpdateFailed {
                        generation: request.generation,
                        error: format!("Runtime indisponible : {}", e),
                    });
                }
                return;
            }
        };

        process_commands(&runtime, &command_rx, &result_tx, provider.as_ref());

        info!("Worker thread exiting (channel closed)");
    });
}

/// Traite les commandes jusqu'à la fermeture d'un des channels
///
/// Les demandes accumulées pendant un fetch sont obsolètes : seule la plus
/// récente est exécutée.
fn process_commands(
    runtime: &tokio::runtime::Runtime,
    command_rx: &mpsc::Receiver<AppCommand>,
    result_tx: &mpsc::Sender<AppResult>,
    provider: &dyn PriceProvider,
) {
    while let Ok(command) = command_rx.recv() {
        let mut latest = command;
        let mut skipped = 0;
        for newer in command_rx.try_iter() {
            latest = newer;
            skipped += 1;
        }
        if skipped > 0 {
            debug!(skipped, "Skipping superseded refresh requests");
        }

        info!(command = ?latest, "Worker received command");

        let AppCommand::Refresh(request) = latest;
        let outcome = runtime.block_on(update_charts(provider, &request.tickers, request.period));

        let result = match outcome {
            Ok((line, candlestick)) => {
                info!(generation = request.generation, series = line.len(), "Charts updated");
                AppResult::ChartsReady {
                    generation: request.generation,
                    line,
                    candlestick,
                }
            }
            Err(e) => {
                error!(generation = request.generation, error = ?e, "Chart update failed");
                AppResult::UpdateFailed {
                    generation: request.generation,
                    error: format!("{:#}", e),
                }
            }
        };

        if result_tx.send(result).is_err() {
            break;
        }
    }
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Résultats du worker
//   1. Render
//   2. Input
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    let mut worker_alive = true;

    loop {
        if !lock(&app)?.is_running() {
            break;
        }

        // 0. RÉSULTATS (non bloquant)
        poll_results(&mut *lock(&app)?, &result_rx, &mut worker_alive);

        // 1. RENDER
        {
            let app_lock = lock(&app)?;
            terminal.draw(|frame| render(frame, &app_lock))?;
        }

        // 2. INPUT
        if let Ok(event) = events.next() {
            let mut app_lock = lock(&app)?;
            handle_event(&mut app_lock, event, &command_tx);
        }
    }

    Ok(())
}

/// Applique au plus un résultat du worker
///
/// Worker mort : signalé une seule fois dans les logs, et toute demande
/// en attente se termine en erreur au lieu de rester en chargement.
fn poll_results(app: &mut App, result_rx: &mpsc::Receiver<AppResult>, worker_alive: &mut bool) {
    match result_rx.try_recv() {
        Ok(AppResult::ChartsReady {
            generation,
            line,
            candlestick,
        }) => {
            if app.apply_charts(generation, line, candlestick) {
                info!(generation, "Charts replaced");
            }
        }
        Ok(AppResult::UpdateFailed { generation, error }) => {
            if app.apply_error(generation, error) {
                warn!(generation, "Charts cleared after failed update");
            }
        }
        Err(mpsc::TryRecvError::Empty) => {}
        Err(mpsc::TryRecvError::Disconnected) => {
            if *worker_alive {
                error!("Worker thread disconnected!");
                *worker_alive = false;
            }
            if app.is_loading_data() {
                let generation = app.generation;
                app.apply_error(generation, "Worker arrêté : mise à jour impossible".to_string());
            }
        }
    }
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// Le mode saisie capture toutes les touches (y compris 'q', 'h', 'l').
fn handle_event(app: &mut App, event: stockdash::ui::events::Event, command_tx: &mpsc::Sender<AppCommand>) {
    use stockdash::ui::events::{
        get_char_from_event, is_backspace_event, is_edit_event, is_enter_event, is_escape_event,
        is_next_period_event, is_next_series_event, is_previous_period_event, is_quit_event,
        is_refresh_event, is_ticker_char_event, Event,
    };

    // ========================================
    // Input Mode : Gestion de la saisie
    // ========================================
    if app.is_in_input_mode() {
        if is_escape_event(&event) {
            info!("User cancelled input");
            app.cancel_input();
        } else if is_enter_event(&event) {
            app.submit_input();
            info!(tickers = %app.ticker_input, "User submitted tickers");
            send_refresh(command_tx, app.begin_refresh());
        } else if is_backspace_event(&event) {
            app.backspace();
        } else if is_ticker_char_event(&event) {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }
        return;
    }

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_edit_event(&event) => {
            app.cancel_quit();
            info!("User started editing tickers");
            app.start_input();
        }

        Event::Key(_) if is_next_period_event(&event) => {
            app.cancel_quit();
            app.next_period();
            info!(period = %app.period, "User changed to next period");
            send_refresh(command_tx, app.begin_refresh());
        }

        Event::Key(_) if is_previous_period_event(&event) => {
            app.cancel_quit();
            app.previous_period();
            info!(period = %app.period, "User changed to previous period");
            send_refresh(command_tx, app.begin_refresh());
        }

        Event::Key(_) if is_next_series_event(&event) => {
            app.cancel_quit();
            app.next_series();
            debug!(selected = app.selected_series, "User selected next series");
        }

        Event::Key(_) if is_refresh_event(&event) => {
            app.cancel_quit();
            info!("User requested refresh");
            send_refresh(command_tx, app.begin_refresh());
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation si active
            app.cancel_quit();
        }

        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use stockdash::models::PricePoint;

    /// Fournisseur en mémoire : une chandelle par symbole, appels enregistrés
    struct CountingProvider {
        calls: Mutex<Vec<(String, Period)>>,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PriceProvider for CountingProvider {
        async fn fetch_history(&self, symbol: &str, period: Period) -> Result<Vec<PricePoint>> {
            self.calls.lock().unwrap().push((symbol.to_string(), period));
            if symbol == "NOPE" {
                anyhow::bail!("symbole inconnu");
            }
            let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
            Ok(vec![PricePoint::new(date, 10.0, 12.0, 9.0, 11.0)])
        }
    }

    fn refresh(generation: u64, period: Period) -> AppCommand {
        AppCommand::Refresh(RefreshRequest {
            generation,
            tickers: "AAPL, MSFT".to_string(),
            period,
        })
    }

    #[test]
    fn test_worker_only_fetches_latest_queued_refresh() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let provider = CountingProvider::new();
        let (command_tx, command_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();

        let mut period = Period::OneMonth;
        for generation in 1..=5 {
            command_tx.send(refresh(generation, period)).unwrap();
            period = period.next();
        }
        drop(command_tx);

        process_commands(&runtime, &command_rx, &result_tx, &provider);

        let calls = provider.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                ("AAPL".to_string(), Period::FiveYears),
                ("MSFT".to_string(), Period::FiveYears),
            ]
        );

        let generations: Vec<u64> = result_rx
            .try_iter()
            .map(|result| match result {
                AppResult::ChartsReady { generation, .. } => generation,
                AppResult::UpdateFailed { generation, .. } => generation,
            })
            .collect();
        assert_eq!(generations, vec![5]);
    }

    #[test]
    fn test_dead_worker_ends_loading_once() {
        let (result_tx, result_rx) = mpsc::channel::<AppResult>();
        drop(result_tx);

        let mut app = App::default();
        app.begin_refresh();
        let mut worker_alive = true;

        poll_results(&mut app, &result_rx, &mut worker_alive);
        assert!(!worker_alive);
        assert!(!app.is_loading_data());
        assert!(app.last_error.is_some());

        // Demande envoyée après la mort du worker : terminée au tour suivant
        app.begin_refresh();
        poll_results(&mut app, &result_rx, &mut worker_alive);
        assert!(!app.is_loading_data());
    }

    #[tokio::test]
    async fn test_headless_output_is_json_with_both_datasets() {
        let provider = CountingProvider::new();

        let json = headless_output(&provider, "aapl", Period::OneMonth).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["line"]["series"][0]["label"], "AAPL");
        assert_eq!(value["candlestick"]["series"][0]["label"], "AAPL");
    }

    #[tokio::test]
    async fn test_headless_output_reports_failing_symbol() {
        let provider = CountingProvider::new();

        let err = headless_output(&provider, "AAPL, NOPE", Period::OneMonth)
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("NOPE"));
    }
}
