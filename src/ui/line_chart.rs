// ============================================================================
// Line Chart - Comparaison des clôtures
// ============================================================================
// Affiche toutes les LineSeries superposées (une couleur par symbole)
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : une série par symbole (nom = légende)
// 3. Axis : axe X en jours (dates), axe Y en prix
// ============================================================================

use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::LineDataset;

/// Couleurs attribuées aux séries, dans l'ordre de saisie
const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Magenta,
    Color::LightGreen,
    Color::LightBlue,
    Color::LightRed,
];

/// Couleur de la i-ème série (cycle sur la palette)
pub fn series_color(index: usize) -> Color {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

/// Convertit une date en abscisse (jours depuis l'an 1)
fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Convertit une abscisse en date (pour les labels de l'axe X)
fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Bornes (x_min, x_max, y_min, y_max) sur l'ensemble des séries
///
/// CONCEPT RUST : fold
/// - Un seul passage pour les 4 bornes
/// - None si aucun point
fn bounds(points: &[Vec<(f64, f64)>]) -> Option<[f64; 4]> {
    let all = points.iter().flatten();
    let init = [f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY];
    let b = all.fold(init, |[x0, x1, y0, y1], &(x, y)| {
        [x0.min(x), x1.max(x), y0.min(y), y1.max(y)]
    });
    if b[0].is_finite() {
        Some(b)
    } else {
        None
    }
}

/// Dessine le graphique ligne
pub fn render_line_chart(frame: &mut Frame, app: &App, area: Rect) {
    let dataset = match &app.line {
        Some(dataset) => dataset,
        None => {
            render_placeholder(frame, app, area, " Line Chart ");
            return;
        }
    };

    if dataset.is_empty() {
        render_message(frame, area, &dataset.title, "Aucun ticker saisi", Color::Gray);
        return;
    }

    render_dataset(frame, dataset, area);
}

/// Dessine un LineDataset non vide
fn render_dataset(frame: &mut Frame, dataset: &LineDataset, area: Rect) {
    // Convertit chaque série en points (x, y)
    // Les Vec doivent vivre aussi longtemps que les Dataset qui les empruntent
    let points: Vec<Vec<(f64, f64)>> = dataset
        .series
        .iter()
        .map(|s| s.points.iter().map(|p| (date_to_x(p.date), p.close)).collect())
        .collect();

    let [x_min, x_max, min_price, max_price] = match bounds(&points) {
        Some(b) => b,
        None => {
            render_message(frame, area, &dataset.title, "Pas de données à afficher", Color::Red);
            return;
        }
    };

    // Marge de 5% pour que le graphique respire
    let margin = ((max_price - min_price) * 0.05).max(0.01);
    let y_min = (min_price - margin).max(0.0);
    let y_max = max_price + margin;

    let datasets: Vec<Dataset> = dataset
        .series
        .iter()
        .zip(points.iter())
        .enumerate()
        .map(|(i, (series, pts))| {
            Dataset::default()
                .name(series.label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series_color(i)))
                .data(pts)
        })
        .collect();

    let date_label = |x: f64| {
        x_to_date(x)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };

    let x_axis = Axis::default()
        .title(dataset.x_axis_label.clone())
        .style(Style::default().fg(Color::Gray))
        .bounds([x_min, x_max.max(x_min + 1.0)])
        .labels(vec![
            Span::raw(date_label(x_min)),
            Span::raw(date_label((x_min + x_max) / 2.0)),
            Span::raw(date_label(x_max)),
        ]);

    let y_axis = Axis::default()
        .title(dataset.y_axis_label.clone())
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("${:.2}", y_min)),
            Span::raw(format!("${:.2}", (y_min + y_max) / 2.0)),
            Span::raw(format!("${:.2}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" 📈 {} ", dataset.title)),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

// ============================================================================
// Helpers : états sans graphique
// ============================================================================

/// Affiche l'état courant quand aucun dataset n'est disponible
///
/// Partagé avec le graphique en chandeliers : chargement, erreur ou attente.
pub fn render_placeholder(frame: &mut Frame, app: &App, area: Rect, title: &str) {
    if app.is_loading_data() {
        let message = app
            .loading_message
            .clone()
            .unwrap_or_else(|| "Chargement en cours...".to_string());
        render_message(frame, area, title, &format!("⏳ {}", message), Color::Cyan);
    } else if let Some(error) = &app.last_error {
        render_message(frame, area, title, &format!("⚠ {}", error), Color::Red);
    } else {
        render_message(frame, area, title, "Pas encore de données", Color::Gray);
    }
}

/// Affiche un message centré dans un bloc
pub fn render_message(frame: &mut Frame, area: Rect, title: &str, message: &str, color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {} ", title.trim()));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(color))),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_axis_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(x_to_date(date_to_x(date)), Some(date));
    }

    #[test]
    fn test_bounds_across_series() {
        let points = vec![vec![(1.0, 10.0), (2.0, 12.0)], vec![(5.0, 3.0)]];
        assert_eq!(bounds(&points), Some([1.0, 5.0, 3.0, 12.0]));
        assert_eq!(bounds(&[vec![]]), None);
    }

    #[test]
    fn test_series_color_cycles() {
        assert_eq!(series_color(0), series_color(SERIES_COLORS.len()));
    }
}
