// ============================================================================
// Structure : PricePoint (Open, High, Low, Close)
// ============================================================================
// Une séance de cotation journalière telle que retournée par le fournisseur
//
// CONCEPTS RUST :
// 1. NaiveDate : date calendaire sans fuseau (une bougie = un jour de bourse)
// 2. f64 : prix en flottant 64 bits (précision suffisante pour l'affichage)
// 3. Copy : la structure est petite, on la copie plutôt que de la référencer
// ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Une chandelle journalière (OHLC)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Jour de cotation (calendrier de la place de cotation)
    pub date: NaiveDate,

    /// Prix d'ouverture (Open)
    pub open: f64,

    /// Prix le plus haut (High)
    pub high: f64,

    /// Prix le plus bas (Low)
    pub low: f64,

    /// Prix de clôture (Close)
    pub close: f64,
}

impl PricePoint {
    /// Constructeur : crée une nouvelle chandelle
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
        }
    }

    /// Vérifie si la chandelle est haussière (ou neutre)
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// Applique un facteur d'ajustement (dividendes, splits) aux 4 prix
    ///
    /// CONCEPT RUST : self par valeur
    /// - PricePoint est Copy, on retourne une nouvelle valeur
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            date: self.date,
            open: self.open * factor,
            high: self.high * factor,
            low: self.low * factor,
            close: self.close * factor,
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_price_point_bullish() {
        assert!(PricePoint::new(day(1), 100.0, 110.0, 95.0, 105.0).is_bullish());
        assert!(!PricePoint::new(day(1), 100.0, 105.0, 90.0, 95.0).is_bullish());
    }

    #[test]
    fn test_price_point_scaled() {
        let p = PricePoint::new(day(4), 100.0, 110.0, 90.0, 104.0).scaled(0.5);
        assert_eq!(p.date, day(4));
        assert_eq!((p.open, p.high, p.low, p.close), (50.0, 55.0, 45.0, 52.0));
    }
}
