// ============================================================================
// Normalisation de la saisie utilisateur
// ============================================================================
// "AAPL, msft," + 1mo  →  [AAPL/1mo, MSFT/1mo]
//
// Règles :
// - découpe sur les virgules
// - trim + majuscules
// - les morceaux vides (virgule finale, espaces seuls) sont ignorés
// - l'ordre de saisie est conservé, les doublons aussi
// - aucune validation : un symbole inconnu échouera au moment du fetch
// ============================================================================

use tracing::debug;

use crate::models::{Period, TickerRequest};

/// Transforme la saisie brute en liste ordonnée de requêtes
///
/// CONCEPT RUST : Iterator chaining
/// - split(',') : itérateur de &str (pas d'allocation)
/// - map(str::trim) / filter : toujours des &str empruntés
/// - to_uppercase() : seule allocation, une String par symbole retenu
pub fn normalize(raw_text: &str, period: Period) -> Vec<TickerRequest> {
    let requests: Vec<TickerRequest> = raw_text
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| TickerRequest::new(piece.to_uppercase(), period))
        .collect();

    debug!(
        raw = %raw_text,
        period = %period,
        count = requests.len(),
        "Normalized ticker input"
    );

    requests
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(requests: &[TickerRequest]) -> Vec<&str> {
        requests.iter().map(|r| r.symbol.as_str()).collect()
    }

    #[test]
    fn test_normalize_trims_and_uppercases_in_order() {
        let requests = normalize("AAPL, msft", Period::OneMonth);
        assert_eq!(
            requests,
            vec![
                TickerRequest::new("AAPL", Period::OneMonth),
                TickerRequest::new("MSFT", Period::OneMonth),
            ]
        );
    }

    #[test]
    fn test_normalize_drops_trailing_comma() {
        let requests = normalize("AAPL,", Period::OneYear);
        assert_eq!(requests, vec![TickerRequest::new("AAPL", Period::OneYear)]);
    }

    #[test]
    fn test_normalize_drops_blank_pieces() {
        assert_eq!(symbols(&normalize(" , tsla ,,  ,btc-usd ", Period::Max)), vec!["TSLA", "BTC-USD"]);
        assert!(normalize("", Period::Max).is_empty());
        assert!(normalize("  ,  , ", Period::Max).is_empty());
    }

    #[test]
    fn test_normalize_keeps_duplicates_and_order() {
        assert_eq!(
            symbols(&normalize("msft, AAPL, aapl", Period::SixMonths)),
            vec!["MSFT", "AAPL", "AAPL"]
        );
    }

    #[test]
    fn test_normalize_applies_period_to_every_request() {
        let requests = normalize("a,b,c", Period::FiveYears);
        assert!(requests.iter().all(|r| r.period == Period::FiveYears));
    }
}
