// ============================================================================
// Construction des datasets (graphique ligne + chandeliers)
// ============================================================================
// Pour chaque requête, dans l'ordre :
// 1. fetch de l'historique auprès du fournisseur
// 2. ajout d'une LineSeries et d'une CandlestickSeries (label = symbole)
//
// Politique d'erreur : fail-fast
// - le premier fetch en échec interrompt toute la mise à jour
// - aucun dataset partiel n'est retourné
// ============================================================================

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::api::PriceProvider;
use crate::models::{CandlestickDataset, CandlestickSeries, LineDataset, LineSeries, TickerRequest};

/// Construit les deux datasets à partir des requêtes normalisées
///
/// CONCEPT RUST : &dyn Trait
/// - Le builder ne connaît que PriceProvider (Yahoo ou fournisseur de test)
/// - Les fetchs sont séquentiels : un .await après l'autre
#[instrument(skip_all, fields(requests = requests.len()))]
pub async fn build_datasets(
    provider: &dyn PriceProvider,
    requests: &[TickerRequest],
) -> Result<(LineDataset, CandlestickDataset)> {
    let mut line = LineDataset::line();
    let mut candlestick = CandlestickDataset::candlestick();

    for (i, request) in requests.iter().enumerate() {
        debug!(
            ticker = %request.symbol,
            progress = i + 1,
            total = requests.len(),
            "Fetching price history"
        );

        // CONCEPT : with_context
        // - L'erreur du fournisseur est enrichie avec le symbole en échec
        // - Le `?` abandonne la construction : line/candlestick sont droppés
        let history = provider
            .fetch_history(&request.symbol, request.period)
            .await
            .with_context(|| format!("Échec du chargement de {}", request.symbol))?;

        line.push(LineSeries::from_history(&request.symbol, &history));
        candlestick.push(CandlestickSeries::from_history(&request.symbol, &history));
    }

    info!(series = line.len(), "Datasets built");
    Ok((line, candlestick))
}

// ============================================================================
// Tests unitaires
// ============================================================================
