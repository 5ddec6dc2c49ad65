// ============================================================================
// Candlestick Chart - Rendu texte ligne par ligne
// ============================================================================
// Utilise des caractères Unicode pour dessiner les chandeliers japonais.
// Le dataset contient une série par symbole ; une seule est dessinée à la
// fois (Tab pour passer à la suivante), la légende liste toutes les séries.
//
// ALGORITHME :
// - Rendu vertical : ligne par ligne de haut en bas
// - Pour chaque ligne, on détermine quel caractère Unicode afficher
// - Logique des 3 zones : mèche supérieure, corps, mèche inférieure
// - Seuils fractionnaires (0.25, 0.75) pour précision sub-caractère
//
// CARACTÈRES UNICODE :
// ┃ Corps plein          │ Mèche pleine
// ╻ Demi-corps (bas)     ╹ Demi-corps (haut)
// ╽ Transition top       ╿ Transition bottom
// ╷ Demi-mèche sup       ╵ Demi-mèche inf
// ============================================================================

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::{CandlestickDataset, PricePoint};
use crate::ui::line_chart::{render_message, render_placeholder, series_color};

// ============================================================================
// Constantes
// ============================================================================

const UNICODE_VOID: char = ' ';
const UNICODE_BODY: char = '┃';
const UNICODE_HALF_BODY_BOTTOM: char = '╻';
const UNICODE_HALF_BODY_TOP: char = '╹';
const UNICODE_WICK: char = '│';
const UNICODE_TOP: char = '╽';
const UNICODE_BOTTOM: char = '╿';
const UNICODE_UPPER_WICK: char = '╷';
const UNICODE_LOWER_WICK: char = '╵';

/// Couleurs pour chandeliers haussiers et baissiers
const BULLISH_COLOR: Color = Color::Rgb(52, 208, 88);
const BEARISH_COLOR: Color = Color::Rgb(234, 74, 90);

/// Largeur de l'axe Y : "{:>9.2} │ " = 12 caractères
const Y_AXIS_WIDTH: u16 = 12;

/// Lignes réservées : bordures (2) + légende (1) + axe X (2)
const RESERVED_ROWS: u16 = 5;

/// Largeur minimale pour dessiner quelque chose de lisible
const MIN_CHART_WIDTH: u16 = 40;

// ============================================================================
// Structure principale
// ============================================================================

/// Renderer de chandeliers japonais en mode texte
pub struct CandlestickRenderer<'a> {
    candles: &'a [PricePoint],
    min_price: f64,
    max_price: f64,
    /// Hauteur de la zone chandeliers (en lignes)
    height: u16,
    /// Largeur de la zone chandeliers (hors axe Y)
    width: u16,
}

impl<'a> CandlestickRenderer<'a> {
    /// Crée un renderer pour une zone intérieure (sans bordures) donnée
    pub fn new(candles: &'a [PricePoint], height: u16, width: u16) -> Self {
        let (min_price, max_price) = Self::compute_price_bounds(Self::tail(candles, width));

        Self {
            candles,
            min_price,
            max_price,
            height,
            width,
        }
    }

    /// Les N dernières chandelles qui tiennent dans la largeur
    fn tail(candles: &[PricePoint], width: u16) -> &[PricePoint] {
        let max_visible = width as usize;
        if candles.len() <= max_visible {
            candles
        } else {
            &candles[candles.len() - max_visible..]
        }
    }

    /// Nombre de chandelles effectivement dessinées
    pub fn visible_count(&self) -> usize {
        Self::tail(self.candles, self.width).len()
    }

    /// Calcule les prix min et max sur les chandeliers visibles (+ marge de 2%)
    fn compute_price_bounds(candles: &[PricePoint]) -> (f64, f64) {
        let max_price = candles.iter().fold(f64::NEG_INFINITY, |max, c| max.max(c.high));
        let min_price = candles.iter().fold(f64::INFINITY, |min, c| min.min(c.low));

        let margin = (max_price - min_price) * 0.02;
        ((min_price - margin).max(0.0), max_price + margin)
    }

    /// Convertit un prix en coordonnée de hauteur
    fn price_to_height(&self, price: f64) -> f64 {
        if self.max_price == self.min_price {
            return self.height as f64 / 2.0;
        }

        (price - self.min_price) / (self.max_price - self.min_price) * self.height as f64
    }

    fn candle_color(candle: &PricePoint) -> Color {
        if candle.is_bullish() {
            BULLISH_COLOR
        } else {
            BEARISH_COLOR
        }
    }

    /// Rend un chandelier à une hauteur donnée
    ///
    /// Cœur de l'algorithme : quel caractère afficher selon la position verticale.
    fn render_candle(&self, candle: &PricePoint, y: u16) -> char {
        let height_unit = y as f64;

        let high_y = self.price_to_height(candle.high);
        let low_y = self.price_to_height(candle.low);
        let max_y = self.price_to_height(candle.open.max(candle.close));
        let min_y = self.price_to_height(candle.close.min(candle.open));

        // ZONE 1 : Mèche supérieure (high → max)
        if high_y.ceil() >= height_unit && height_unit >= max_y.floor() {
            if max_y - height_unit > 0.75 {
                UNICODE_BODY
            } else if max_y - height_unit > 0.25 {
                if high_y - height_unit > 0.75 {
                    UNICODE_TOP
                } else {
                    UNICODE_HALF_BODY_BOTTOM
                }
            } else if high_y - height_unit > 0.75 {
                UNICODE_WICK
            } else if high_y - height_unit > 0.25 {
                UNICODE_UPPER_WICK
            } else {
                UNICODE_VOID
            }
        }
        // ZONE 2 : Corps (min → max)
        else if max_y.floor() >= height_unit && height_unit >= min_y.ceil() {
            UNICODE_BODY
        }
        // ZONE 3 : Mèche inférieure (min → low)
        else if min_y.ceil() >= height_unit && height_unit >= low_y.floor() {
            if min_y - height_unit < 0.25 {
                UNICODE_BODY
            } else if min_y - height_unit < 0.75 {
                if low_y - height_unit < 0.25 {
                    UNICODE_BOTTOM
                } else {
                    UNICODE_HALF_BODY_TOP
                }
            } else if low_y - height_unit < 0.25 {
                UNICODE_WICK
            } else if low_y - height_unit < 0.75 {
                UNICODE_LOWER_WICK
            } else {
                UNICODE_VOID
            }
        } else {
            UNICODE_VOID
        }
    }

    /// Rend une ligne de l'axe Y (un prix toutes les 4 lignes)
    fn render_y_axis(&self, y: u16) -> String {
        if y % 4 == 0 {
            let price = self.min_price
                + (y as f64 * (self.max_price - self.min_price) / self.height as f64);
            format!("{:>9.2} │ ", price)
        } else {
            format!("{:>9} │ ", "")
        }
    }

    /// Format des dates de l'axe X selon la durée couverte
    fn date_format(visible: &[PricePoint]) -> &'static str {
        let span_days = match (visible.first(), visible.last()) {
            (Some(first), Some(last)) => (last.date - first.date).num_days(),
            _ => 0,
        };
        match span_days {
            d if d <= 120 => "%d/%m",
            d if d <= 800 => "%b %y",
            _ => "%Y",
        }
    }

    /// Génère toutes les lignes du graphique (chandeliers + axe X)
    pub fn render_lines(&self) -> Vec<Line<'static>> {
        let visible = Self::tail(self.candles, self.width);
        let mut lines = Vec::new();

        if visible.is_empty() || self.height == 0 {
            return lines;
        }

        // Espacement entre chandeliers pour remplir toute la largeur
        let spacing = self.width as f64 / visible.len() as f64;
        let gap = " ".repeat((spacing - 1.0).round().max(0.0) as usize);

        // Parcourt de haut en bas
        for y in (1..=self.height).rev() {
            let mut spans = vec![Span::styled(self.render_y_axis(y), Style::default().fg(Color::Gray))];

            for (i, candle) in visible.iter().enumerate() {
                spans.push(Span::styled(
                    self.render_candle(candle, y).to_string(),
                    Style::default().fg(Self::candle_color(candle)),
                ));
                if i < visible.len() - 1 && !gap.is_empty() {
                    spans.push(Span::raw(gap.clone()));
                }
            }

            lines.push(Line::from(spans));
        }

        lines.extend(self.render_x_axis(visible, spacing));
        lines
    }

    /// Axe X : ligne de ticks + ligne de dates
    fn render_x_axis(&self, visible: &[PricePoint], spacing: f64) -> Vec<Line<'static>> {
        let format_str = Self::date_format(visible);
        let label_width = visible
            .first()
            .map(|c| c.date.format(format_str).to_string().chars().count())
            .unwrap_or(5);

        // +2 pour garantir au moins 2 caractères entre deux labels
        let max_labels = (self.width as usize / (label_width + 2)).clamp(2, 10);
        let label_interval = (visible.len() / max_labels).max(1);
        let padding = " ".repeat(Y_AXIS_WIDTH as usize);

        // Ligne 1 : ticks, positionnés comme les chandeliers
        let mut ticks = String::new();
        // Ligne 2 : labels
        let mut labels = String::new();

        for (i, candle) in visible.iter().enumerate() {
            if i % label_interval != 0 {
                continue;
            }
            // Position calculée depuis l'index (pas d'accumulation d'arrondis)
            let column = (i as f64 * spacing).round() as usize;

            let tick_pad = column.saturating_sub(ticks.chars().count());
            ticks.push_str(&" ".repeat(tick_pad));
            ticks.push('│');

            let current = labels.chars().count();
            if column >= current {
                labels.push_str(&" ".repeat(column - current));
                labels.push_str(&candle.date.format(format_str).to_string());
                labels.push(' ');
            }
        }

        let gray = Style::default().fg(Color::Gray);
        vec![
            Line::from(vec![Span::raw(padding.clone()), Span::styled(ticks, gray)]),
            Line::from(vec![Span::raw(padding), Span::styled(labels, gray)]),
        ]
    }
}

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine le graphique en chandeliers de la série sélectionnée
pub fn render_candlestick_chart(frame: &mut Frame, app: &App, area: Rect) {
    let dataset = match &app.candlestick {
        Some(dataset) => dataset,
        None => {
            render_placeholder(frame, app, area, " Candlestick Chart ");
            return;
        }
    };

    let series = match app.selected_candlestick() {
        Some(series) => series,
        None => {
            render_message(frame, area, &dataset.title, "Aucun ticker saisi", Color::Gray);
            return;
        }
    };

    if series.points.is_empty() {
        let msg = format!("Pas de données pour {}", series.label);
        render_message(frame, area, &dataset.title, &msg, Color::Red);
        return;
    }

    if area.width < MIN_CHART_WIDTH + Y_AXIS_WIDTH + 2 {
        render_message(frame, area, &dataset.title, "Terminal trop étroit", Color::Yellow);
        return;
    }

    let inner_height = area.height.saturating_sub(RESERVED_ROWS);
    let inner_width = area.width.saturating_sub(Y_AXIS_WIDTH + 2);

    let renderer = CandlestickRenderer::new(&series.points, inner_height, inner_width);

    let mut lines = vec![legend_line(dataset, app.selected_series)];
    lines.extend(renderer.render_lines());

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(
                " 🕯️ {} - {} ({}) [Tab: série suivante] ",
                dataset.title,
                series.label,
                candle_count_label(renderer.visible_count(), series.points.len())
            )),
    );

    frame.render_widget(paragraph, area);
}

/// "N chandeliers", ou "N/M chandeliers" quand seules les N dernières tiennent
fn candle_count_label(visible: usize, total: usize) -> String {
    if visible == total {
        format!("{} chandeliers", total)
    } else {
        format!("{}/{} chandeliers", visible, total)
    }
}

/// Légende : toutes les séries, la sélectionnée en gras + inversée
fn legend_line(dataset: &CandlestickDataset, selected: usize) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{}  ", dataset.y_axis_label),
        Style::default().fg(Color::Gray),
    )];

    for (i, series) in dataset.series.iter().enumerate() {
        let mut style = Style::default().fg(series_color(i));
        if i == selected {
            style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        spans.push(Span::styled(format!(" {} ", series.label), style));
        spans.push(Span::raw(" "));
    }

    Line::from(spans)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn candle(day: u32, open: f64, high: f64, low: f64, close: f64) -> PricePoint {
        PricePoint::new(NaiveDate::from_ymd_opt(2024, 1, day).unwrap(), open, high, low, close)
    }

    #[test]
    fn test_visible_candles_are_the_most_recent() {
        let candles: Vec<PricePoint> = (1..=20).map(|d| candle(d, 10.0, 11.0, 9.0, 10.5)).collect();
        let tail = CandlestickRenderer::tail(&candles, 5);
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[0].date, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
    }

    #[test]
    fn test_title_counts_only_drawn_candles() {
        let candles: Vec<PricePoint> = (1..=30).map(|d| candle(d, 10.0, 11.0, 9.0, 10.5)).collect();

        let narrow = CandlestickRenderer::new(&candles, 10, 12);
        assert_eq!(narrow.visible_count(), 12);
        assert_eq!(candle_count_label(narrow.visible_count(), candles.len()), "12/30 chandeliers");

        let wide = CandlestickRenderer::new(&candles, 10, 80);
        assert_eq!(candle_count_label(wide.visible_count(), candles.len()), "30 chandeliers");
    }

    #[test]
    fn test_render_lines_height() {
        let candles = vec![candle(2, 10.0, 12.0, 9.0, 11.0), candle(3, 11.0, 13.0, 10.0, 10.5)];
        let renderer = CandlestickRenderer::new(&candles, 10, 40);
        // 10 lignes de chandeliers + 2 lignes d'axe X
        assert_eq!(renderer.render_lines().len(), 12);
    }

    #[test]
    fn test_body_is_drawn_between_open_and_close() {
        let candles = vec![candle(2, 10.0, 20.0, 0.0, 20.0)];
        let renderer = CandlestickRenderer {
            candles: &candles,
            min_price: 0.0,
            max_price: 20.0,
            height: 20,
            width: 10,
        };
        assert_eq!(renderer.render_candle(&candles[0], 15), UNICODE_BODY);
        assert_eq!(renderer.render_candle(&candles[0], 5), UNICODE_WICK);
    }

    #[test]
    fn test_date_format_depends_on_span() {
        let short = vec![candle(1, 1.0, 1.0, 1.0, 1.0), candle(31, 1.0, 1.0, 1.0, 1.0)];
        assert_eq!(CandlestickRenderer::date_format(&short), "%d/%m");

        let long = vec![
            PricePoint::new(NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(), 1.0, 1.0, 1.0, 1.0),
            PricePoint::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 1.0, 1.0, 1.0, 1.0),
        ];
        assert_eq!(CandlestickRenderer::date_format(&long), "%Y");
    }
}
