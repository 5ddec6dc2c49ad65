// ============================================================================
// Structure : TickerRequest
// ============================================================================
// Une demande d'historique : un symbole boursier + une période
//
// CONCEPTS RUST :
// 1. String vs &str :
//    - String : owned, la requête possède son symbole
//    - &str : emprunt, utilisé pour passer le symbole au fournisseur
// 2. Pas d'identité propre : deux requêtes égales champ à champ sont égales
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::Period;

/// Requête d'historique pour un ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRequest {
    /// Symbole normalisé (sans espaces, en majuscules), ex: "AAPL"
    pub symbol: String,

    /// Fenêtre historique demandée
    pub period: Period,
}

impl TickerRequest {
    /// Crée une requête à partir d'un symbole déjà normalisé
    pub fn new(symbol: impl Into<String>, period: Period) -> Self {
        Self {
            symbol: symbol.into(),
            period,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_request_equality() {
        let a = TickerRequest::new("AAPL", Period::OneMonth);
        let b = TickerRequest::new("AAPL".to_string(), Period::OneMonth);
        assert_eq!(a, b);
        assert_ne!(a, TickerRequest::new("AAPL", Period::Max));
    }
}
