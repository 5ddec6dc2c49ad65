// ============================================================================
// Structures : séries et datasets prêts pour l'affichage
// ============================================================================
// - LineSeries : (date, close) pour un symbole
// - CandlestickSeries : (date, open, high, low, close) pour un symbole
// - ChartDataset<S> : titre + libellés d'axes + séries ordonnées
//
// CONCEPTS RUST :
// 1. Générique ChartDataset<S> : un seul type pour les deux graphiques
// 2. Type alias : LineDataset / CandlestickDataset pour la lisibilité
// ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::PricePoint;

/// Titre du graphique ligne
pub const LINE_CHART_TITLE: &str = "Stock Price Comparison (Line Chart)";
/// Titre du graphique en chandeliers
pub const CANDLESTICK_CHART_TITLE: &str = "Stock Price Comparison (Candlestick Chart)";
/// Libellé de l'axe X (commun)
pub const DATE_AXIS_LABEL: &str = "Date";
/// Libellé de l'axe Y du graphique ligne
pub const CLOSE_AXIS_LABEL: &str = "Close Price (USD)";
/// Libellé de l'axe Y du graphique en chandeliers
pub const PRICE_AXIS_LABEL: &str = "Price (USD)";

/// Un point du graphique ligne
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Série de clôtures pour un symbole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    /// Nom de la série (= symbole)
    pub label: String,

    /// Points dans l'ordre chronologique du fournisseur
    pub points: Vec<LinePoint>,
}

impl LineSeries {
    /// Construit la série à partir de l'historique d'un symbole
    ///
    /// CONCEPT RUST : Iterator chaining
    /// - .iter().map().collect() : transforme chaque PricePoint en LinePoint
    pub fn from_history(label: &str, history: &[PricePoint]) -> Self {
        Self {
            label: label.to_string(),
            points: history
                .iter()
                .map(|p| LinePoint {
                    date: p.date,
                    close: p.close,
                })
                .collect(),
        }
    }
}

/// Série OHLC pour un symbole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandlestickSeries {
    /// Nom de la série (= symbole)
    pub label: String,

    /// Chandelles dans l'ordre chronologique du fournisseur
    pub points: Vec<PricePoint>,
}

impl CandlestickSeries {
    pub fn from_history(label: &str, history: &[PricePoint]) -> Self {
        Self {
            label: label.to_string(),
            points: history.to_vec(),
        }
    }
}

/// Dataset d'un graphique : titre, axes et séries ordonnées
///
/// CONCEPT RUST : Générique
/// - S = LineSeries ou CandlestickSeries
/// - Même structure, même sérialisation JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset<S> {
    pub title: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    /// Une série par requête valide, dans l'ordre saisi par l'utilisateur
    pub series: Vec<S>,
}

impl<S> ChartDataset<S> {
    pub fn new(title: &str, x_axis_label: &str, y_axis_label: &str) -> Self {
        Self {
            title: title.to_string(),
            x_axis_label: x_axis_label.to_string(),
            y_axis_label: y_axis_label.to_string(),
            series: Vec::new(),
        }
    }

    pub fn push(&mut self, series: S) {
        self.series.push(series);
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Dataset du graphique ligne
pub type LineDataset = ChartDataset<LineSeries>;

/// Dataset du graphique en chandeliers
pub type CandlestickDataset = ChartDataset<CandlestickSeries>;

impl LineDataset {
    /// Dataset vide avec les titres fixes du graphique ligne
    pub fn line() -> Self {
        Self::new(LINE_CHART_TITLE, DATE_AXIS_LABEL, CLOSE_AXIS_LABEL)
    }
}

impl CandlestickDataset {
    /// Dataset vide avec les titres fixes du graphique en chandeliers
    pub fn candlestick() -> Self {
        Self::new(CANDLESTICK_CHART_TITLE, DATE_AXIS_LABEL, PRICE_AXIS_LABEL)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<PricePoint> {
        vec![
            PricePoint::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 10.0, 12.0, 9.0, 11.0),
            PricePoint::new(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), 11.0, 15.0, 10.5, 14.0),
        ]
    }

    #[test]
    fn test_line_series_keeps_order_and_closes() {
        let series = LineSeries::from_history("AAPL", &history());
        assert_eq!(series.label, "AAPL");
        let closes: Vec<f64> = series.points.iter().map(|p| p.close).collect();
        assert_eq!(closes, vec![11.0, 14.0]);
    }

    #[test]
    fn test_candlestick_series_keeps_full_bars() {
        let series = CandlestickSeries::from_history("AAPL", &history());
        assert_eq!(series.label, "AAPL");
        assert_eq!(series.points, history());
    }

    #[test]
    fn test_dataset_titles() {
        let line = LineDataset::line();
        assert_eq!(line.title, "Stock Price Comparison (Line Chart)");
        assert_eq!(line.x_axis_label, "Date");
        assert_eq!(line.y_axis_label, "Close Price (USD)");
        assert!(line.is_empty());

        let candles = CandlestickDataset::candlestick();
        assert_eq!(candles.title, "Stock Price Comparison (Candlestick Chart)");
        assert_eq!(candles.y_axis_label, "Price (USD)");
    }
}
