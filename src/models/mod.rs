// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
// ============================================================================

pub mod period; // Fenêtre historique (1mo, 3mo, ..., max)
pub mod price;  // Chandelle journalière (PricePoint)
pub mod ticker; // Requête symbole + période
pub mod chart;  // Séries et datasets prêts pour l'affichage

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use stockdash::models::period::Period;
// On peut faire : use stockdash::models::Period;
pub use chart::{
    CandlestickDataset, CandlestickSeries, ChartDataset, LineDataset, LinePoint, LineSeries,
};
pub use period::Period;
pub use price::PricePoint;
pub use ticker::TickerRequest;
