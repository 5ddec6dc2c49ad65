// ============================================================================
// Module : api
// ============================================================================
// Ce module contient les fournisseurs de données historiques.
// Le reste de l'application ne dépend que du trait PriceProvider, ce qui
// permet de remplacer Yahoo Finance par un fournisseur en mémoire (tests).
// ============================================================================

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Period, PricePoint};

pub mod yahoo; // Client API Yahoo Finance

// Re-export des éléments principaux
pub use yahoo::{YahooClient, YahooConfig};

/// Source d'historiques de prix journaliers
///
/// CONCEPT RUST : async_trait
/// - Les méthodes async dans un trait utilisé en `dyn` passent par async-trait
/// - Send + Sync : le fournisseur est partagé avec le worker thread
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Récupère l'historique d'un symbole sur une période, trié par date croissante
    ///
    /// Erreur si le symbole est inconnu, si le réseau échoue ou si aucune
    /// donnée n'est retournée.
    async fn fetch_history(&self, symbol: &str, period: Period) -> Result<Vec<PricePoint>>;
}
