// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Une seule vue, de haut en bas :
//   header → champ tickers + sélecteur de période → graphique ligne
//   → graphique en chandeliers → footer (raccourcis / état)
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::Period;
use crate::ui::{candlestick_text, line_chart};

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, chunks[0]);
    render_controls(frame, app, chunks[1]);
    line_chart::render_line_chart(frame, app, chunks[2]);
    candlestick_text::render_candlestick_chart(frame, app, chunks[3]);
    render_footer(frame, app, chunks[4]);
}

// ============================================================================
// Layout : Découpage de l'écran
// ============================================================================

/// Crée le layout principal
///
/// Les deux graphiques se partagent l'espace restant à parts égales.
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Header
            Constraint::Length(3),      // Tickers + période
            Constraint::Percentage(50), // Graphique ligne
            Constraint::Percentage(50), // Chandeliers
            Constraint::Length(3),      // Footer
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" StockDash ")
        .title_alignment(Alignment::Center);

    let text = vec![Line::from(Span::styled(
        "Financial Data Visualization Dashboard",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ))];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Contrôles : champ tickers + sélecteur de période
// ============================================================================

/// Dessine la barre de contrôles
///
/// En mode saisie, le champ affiche le buffer avec un curseur et passe en vert.
fn render_controls(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_ticker_field(frame, app, chunks[0]);
    render_period_selector(frame, app.period, chunks[1]);
}

fn render_ticker_field(frame: &mut Frame, app: &App, area: Rect) {
    let (border_color, line) = if app.is_in_input_mode() {
        (
            Color::Green,
            Line::from(vec![
                Span::styled(app.input_buffer.clone(), Style::default().fg(Color::White)),
                Span::styled(
                    "█",
                    Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
                ),
            ]),
        )
    } else {
        (
            Color::Cyan,
            Line::from(Span::styled(
                app.ticker_input.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
        )
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Tickers (séparés par des virgules) ");

    frame.render_widget(Paragraph::new(vec![line]).block(block), area);
}

/// Liste toutes les périodes, la période courante en surbrillance
fn render_period_selector(frame: &mut Frame, current: Period, area: Rect) {
    let mut spans = Vec::new();
    for period in Period::all() {
        let style = if period == current {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", period.label()), style));
        spans.push(Span::raw(" "));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Période [h/l] ");

    frame.render_widget(
        Paragraph::new(vec![Line::from(spans)])
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
}

// ============================================================================
// Footer : Instructions / état
// ============================================================================

fn key_style(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Dessine le footer
///
/// Priorité : confirmation de quit > mode saisie > chargement > erreur > raccourcis
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Appuyez sur ", key_style(Color::Yellow)),
            Span::styled(
                "[q]",
                key_style(Color::Red).add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                key_style(Color::Yellow),
            ),
        ])
    } else if app.is_in_input_mode() {
        Line::from(vec![
            Span::styled("[Enter]", key_style(Color::Green)),
            Span::raw(" Valider et mettre à jour  "),
            Span::styled("[ESC]", key_style(Color::Red)),
            Span::raw(" Annuler"),
        ])
    } else if let Some(message) = app.loading_message.as_ref().filter(|_| app.is_loading_data()) {
        Line::from(Span::styled(format!("⏳ {}", message), Style::default().fg(Color::Cyan)))
    } else if let Some(error) = &app.last_error {
        Line::from(vec![
            Span::styled(format!("⚠ {}  ", error), Style::default().fg(Color::Red)),
            Span::styled("[r]", key_style(Color::Yellow)),
            Span::raw(" Réessayer"),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", key_style(Color::Yellow)),
            Span::raw(" Quit  "),
            Span::styled("[i/Enter]", key_style(Color::Green)),
            Span::raw(" Tickers  "),
            Span::styled("[h/l]", key_style(Color::Yellow)),
            Span::raw(" Période  "),
            Span::styled("[Tab]", key_style(Color::Yellow)),
            Span::raw(" Série  "),
            Span::styled("[r]", key_style(Color::Yellow)),
            Span::raw(" Rafraîchir"),
        ])
    };

    let paragraph = Paragraph::new(vec![line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(120, 50);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_shows_ticker_input_and_periods() {
        let app = App::default();
        let screen = draw(&app);
        assert!(screen.contains("AAPL, MSFT"));
        assert!(screen.contains("1 Month"));
        assert!(screen.contains("Max"));
    }

    #[test]
    fn test_render_shows_error() {
        let mut app = App::default();
        let req = app.begin_refresh();
        app.apply_error(req.generation, "symbole inconnu".to_string());
        assert!(draw(&app).contains("symbole inconnu"));
    }
}
