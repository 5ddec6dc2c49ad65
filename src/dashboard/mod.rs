// ============================================================================
// Module : dashboard
// ============================================================================
// Logique de mise à jour des graphiques, indépendante de l'interface :
//
//   (saisie, période) → normalize → build_datasets → (ligne, chandeliers)
//
// Le handler est sans état : chaque appel refait tout depuis zéro.
// Il est appelé par le worker du TUI et par le mode headless.
// ============================================================================

pub mod builder;    // Fetch + construction des séries
pub mod normalizer; // Saisie brute → TickerRequest

use anyhow::Result;
use tracing::instrument;

use crate::api::PriceProvider;
use crate::models::{CandlestickDataset, LineDataset, Period};

pub use builder::build_datasets;
pub use normalizer::normalize;

/// Saisie par défaut du champ tickers
pub const DEFAULT_TICKERS: &str = "AAPL, MSFT";

/// Handler complet d'une mise à jour : saisie brute → deux datasets
///
/// Erreur dès qu'un symbole échoue (aucun graphique partiel).
#[instrument(skip(provider, period), fields(period = %period))]
pub async fn update_charts(
    provider: &dyn PriceProvider,
    raw_text: &str,
    period: Period,
) -> Result<(LineDataset, CandlestickDataset)> {
    let requests = normalize(raw_text, period);
    build_datasets(provider, &requests).await
}
