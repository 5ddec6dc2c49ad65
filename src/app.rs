// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
//
// Mises à jour des graphiques :
// - chaque demande de rafraîchissement reçoit un numéro de génération
// - seul le résultat de la dernière génération demandée est accepté
// - un résultat arrivé en retard (saisie modifiée entre-temps) est ignoré
// ============================================================================

use tracing::debug;

use crate::models::{CandlestickDataset, CandlestickSeries, LineDataset, Period};

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : graphiques
    Dashboard,

    /// Mode saisie du champ tickers
    /// - Enter valide (et déclenche le rafraîchissement), ESC annule
    InputMode,
}

/// Demande de rafraîchissement envoyée au worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    /// Numéro de génération (croissant)
    pub generation: u64,

    /// Saisie brute du champ tickers
    pub tickers: String,

    pub period: Period,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Contenu validé du champ tickers (ex: "AAPL, MSFT")
    pub ticker_input: String,

    /// Période sélectionnée
    pub period: Period,

    /// Dataset du graphique ligne (None tant qu'aucune mise à jour n'a réussi)
    pub line: Option<LineDataset>,

    /// Dataset du graphique en chandeliers
    pub candlestick: Option<CandlestickDataset>,

    /// Index de la série affichée dans le graphique en chandeliers
    pub selected_series: usize,

    /// Dernière génération demandée
    pub generation: u64,

    /// Message d'erreur de la dernière mise à jour
    pub last_error: Option<String>,

    /// Two-step quit : première pression de 'q' → confirm_quit = true
    pub confirm_quit: bool,

    /// Indique si une mise à jour est en cours
    pub is_loading: bool,

    /// Message de chargement optionnel
    pub loading_message: Option<String>,

    /// Buffer de saisie pour le mode Input
    pub input_buffer: String,
}

impl App {
    /// Crée l'application avec une saisie et une période initiales
    pub fn new(ticker_input: impl Into<String>, period: Period) -> Self {
        Self {
            running: true,
            current_screen: Screen::Dashboard,
            ticker_input: ticker_input.into(),
            period,
            line: None,
            candlestick: None,
            selected_series: 0,
            generation: 0,
            last_error: None,
            confirm_quit: false,
            is_loading: false,
            loading_message: None,
            input_buffer: String::new(),
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Rafraîchissement des graphiques
    // ========================================================================

    /// Prépare une nouvelle demande de mise à jour
    ///
    /// CONCEPT : Génération
    /// - Incrémente le compteur : toute demande antérieure devient obsolète
    /// - Active l'indicateur de chargement
    pub fn begin_refresh(&mut self) -> RefreshRequest {
        self.generation += 1;
        self.is_loading = true;
        self.loading_message = Some(format!(
            "Chargement de {} ({})...",
            self.ticker_input.trim(),
            self.period.label()
        ));

        RefreshRequest {
            generation: self.generation,
            tickers: self.ticker_input.clone(),
            period: self.period,
        }
    }

    /// Vérifie qu'un résultat correspond à la dernière demande
    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "Discarding result from superseded refresh"
            );
            return false;
        }
        true
    }

    /// Remplace les deux graphiques par le résultat d'une mise à jour
    ///
    /// Retourne false si le résultat est obsolète (ignoré).
    pub fn apply_charts(
        &mut self,
        generation: u64,
        line: LineDataset,
        candlestick: CandlestickDataset,
    ) -> bool {
        if !self.is_current(generation) {
            return false;
        }

        if self.selected_series >= candlestick.len() {
            self.selected_series = 0;
        }

        self.line = Some(line);
        self.candlestick = Some(candlestick);
        self.last_error = None;
        self.stop_loading();
        true
    }

    /// Enregistre l'échec d'une mise à jour
    ///
    /// Mise à jour tout-ou-rien : les graphiques précédents sont retirés
    /// pour ne pas afficher des données qui ne correspondent plus à la saisie.
    pub fn apply_error(&mut self, generation: u64, error: String) -> bool {
        if !self.is_current(generation) {
            return false;
        }

        self.line = None;
        self.candlestick = None;
        self.selected_series = 0;
        self.last_error = Some(error);
        self.stop_loading();
        true
    }

    /// Termine le chargement
    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    /// Vérifie si des données sont en cours de chargement
    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }

    // ========================================================================
    // Période et série sélectionnées
    // ========================================================================

    /// Passe à la période suivante (1mo → 3mo → ... → max → 1mo)
    pub fn next_period(&mut self) {
        self.period = self.period.next();
    }

    /// Passe à la période précédente
    pub fn previous_period(&mut self) {
        self.period = self.period.previous();
    }

    /// Affiche la série suivante dans le graphique en chandeliers (cycle)
    pub fn next_series(&mut self) {
        let count = self.candlestick.as_ref().map(|d| d.len()).unwrap_or(0);
        if count > 0 {
            self.selected_series = (self.selected_series + 1) % count;
        }
    }

    /// Série actuellement affichée dans le graphique en chandeliers
    pub fn selected_candlestick(&self) -> Option<&CandlestickSeries> {
        self.candlestick.as_ref()?.series.get(self.selected_series)
    }

    // ========================================================================
    // Quit Confirmation Management
    // ========================================================================

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Input Mode Management
    // ========================================================================

    /// Entre en mode saisie, pré-rempli avec la saisie actuelle
    pub fn start_input(&mut self) {
        self.current_screen = Screen::InputMode;
        self.input_buffer = self.ticker_input.clone();
    }

    /// Annule le mode input : la saisie validée reste inchangée
    pub fn cancel_input(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.input_buffer.clear();
    }

    /// Valide la saisie : elle devient le nouveau champ tickers
    pub fn submit_input(&mut self) {
        self.ticker_input = std::mem::take(&mut self.input_buffer);
        self.current_screen = Screen::Dashboard;
    }

    /// Ajoute un caractère au buffer d'input
    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    /// Supprime le dernier caractère du buffer
    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    /// Vérifie si on est en mode input
    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::InputMode
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(crate::dashboard::DEFAULT_TICKERS, Period::default())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandlestickSeries, LineSeries};

    fn datasets(labels: &[&str]) -> (LineDataset, CandlestickDataset) {
        let mut line = LineDataset::line();
        let mut candles = CandlestickDataset::candlestick();
        for label in labels {
            line.push(LineSeries::from_history(label, &[]));
            candles.push(CandlestickSeries::from_history(label, &[]));
        }
        (line, candles)
    }

    #[test]
    fn test_app_default() {
        let app = App::default();
        assert!(app.is_running());
        assert_eq!(app.ticker_input, "AAPL, MSFT");
        assert_eq!(app.period, Period::OneMonth);
        assert!(app.line.is_none());
    }

    #[test]
    fn test_begin_refresh_increments_generation() {
        let mut app = App::default();
        let first = app.begin_refresh();
        let second = app.begin_refresh();
        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert_eq!(second.tickers, "AAPL, MSFT");
        assert!(app.is_loading_data());
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut app = App::default();
        let old = app.begin_refresh();
        let new = app.begin_refresh();

        let (line, candles) = datasets(&["AAPL"]);
        assert!(!app.apply_charts(old.generation, line, candles));
        assert!(app.line.is_none());
        assert!(app.is_loading_data());

        let (line, candles) = datasets(&["AAPL", "MSFT"]);
        assert!(app.apply_charts(new.generation, line, candles));
        assert_eq!(app.line.as_ref().unwrap().len(), 2);
        assert!(!app.is_loading_data());
    }

    #[test]
    fn test_error_clears_previous_charts() {
        let mut app = App::default();
        let req = app.begin_refresh();
        let (line, candles) = datasets(&["AAPL"]);
        app.apply_charts(req.generation, line, candles);

        let req = app.begin_refresh();
        assert!(app.apply_error(req.generation, "symbole inconnu".to_string()));
        assert!(app.line.is_none());
        assert!(app.candlestick.is_none());
        assert_eq!(app.last_error.as_deref(), Some("symbole inconnu"));
    }

    #[test]
    fn test_series_cycle() {
        let mut app = App::default();
        let req = app.begin_refresh();
        let (line, candles) = datasets(&["AAPL", "MSFT", "TSLA"]);
        app.apply_charts(req.generation, line, candles);

        assert_eq!(app.selected_candlestick().unwrap().label, "AAPL");
        app.next_series();
        app.next_series();
        assert_eq!(app.selected_candlestick().unwrap().label, "TSLA");
        app.next_series();
        assert_eq!(app.selected_series, 0);
    }

    #[test]
    fn test_input_submit_and_cancel() {
        let mut app = App::default();
        app.start_input();
        assert!(app.is_in_input_mode());
        assert_eq!(app.input_buffer, "AAPL, MSFT");

        app.append_char(',');
        app.append_char('x');
        app.backspace();
        app.append_char('t');
        app.submit_input();
        assert!(!app.is_in_input_mode());
        assert_eq!(app.ticker_input, "AAPL, MSFT,t");

        app.start_input();
        app.append_char('z');
        app.cancel_input();
        assert_eq!(app.ticker_input, "AAPL, MSFT,t");
    }

    #[test]
    fn test_period_cycle() {
        let mut app = App::default();
        app.next_period();
        assert_eq!(app.period, Period::ThreeMonths);
        app.previous_period();
        app.previous_period();
        assert_eq!(app.period, Period::Max);
    }
}
