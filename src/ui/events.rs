// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier et les ticks de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (pas d'entrée pendant le timeout)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    /// Durée max d'attente d'une touche avant de retourner Tick
    tick_rate: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec un tick de 250ms
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    /// - Le timeout permet à la boucle de récupérer les résultats du worker
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release : on ne garde que Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),

                // Autres événements (release, resize, mouse, ...) : simple redraw
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================

/// Extrait le KeyCode d'un événement clavier
fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// 'q' : quitter (two-step)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

/// Échap
pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

/// Entrée
pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

/// 'i' ou Entrée : éditer le champ tickers
pub fn is_edit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('i') | KeyCode::Enter))
}

/// 'l' ou ']' : période suivante
pub fn is_next_period_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('l') | KeyCode::Char(']') | KeyCode::Right))
}

/// 'h' ou '[' : période précédente
pub fn is_previous_period_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('h') | KeyCode::Char('[') | KeyCode::Left))
}

/// Tab : série suivante dans le graphique en chandeliers
pub fn is_next_series_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Tab))
}

/// 'r' : relancer la mise à jour avec la saisie actuelle
pub fn is_refresh_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('r') | KeyCode::Char('R')))
}

/// Backspace
pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// Caractère accepté dans le champ tickers
///
/// Alphanumériques + séparateurs (',' et espace) + caractères des symboles
/// Yahoo ("BTC-USD", "BRK.B", "^GSPC", "EURUSD=X")
pub fn is_ticker_char_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Char(c)) if c.is_alphanumeric() || matches!(c, ',' | ' ' | '-' | '.' | '^' | '=')
    )
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match key_code(event) {
        Some(KeyCode::Char(c)) => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_ticker_chars() {
        for c in ['A', 'z', '1', ',', ' ', '-', '.', '^', '='] {
            assert!(is_ticker_char_event(&key(KeyCode::Char(c))), "{c}");
        }
        assert!(!is_ticker_char_event(&key(KeyCode::Char('/'))));
        assert!(!is_ticker_char_event(&key(KeyCode::Enter)));
        assert_eq!(get_char_from_event(&key(KeyCode::Char(','))), Some(','));
    }

    #[test]
    fn test_period_keys() {
        assert!(is_next_period_event(&key(KeyCode::Char(']'))));
        assert!(is_previous_period_event(&key(KeyCode::Char('h'))));
        assert!(is_next_series_event(&key(KeyCode::Tab)));
    }
}
