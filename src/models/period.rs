// ============================================================================
// Enum : Period
// ============================================================================
// Fenêtre historique relative demandée au fournisseur de données
// ("1 mois", "5 ans", ...), par opposition à des dates de début/fin absolues
//
// CONCEPTS RUST :
// 1. Enum simple (Copy) : aucune allocation, comparaison gratuite
// 2. FromStr : parsing idiomatique avec "1mo".parse::<Period>()
// 3. Display : affichage avec {} (code fournisseur)
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Période historique sélectionnable dans le dashboard
///
/// La représentation serde est le code fournisseur ("1mo", "max", ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// 1 mois
    #[serde(rename = "1mo")]
    OneMonth,
    /// 3 mois
    #[serde(rename = "3mo")]
    ThreeMonths,
    /// 6 mois
    #[serde(rename = "6mo")]
    SixMonths,
    /// 1 an
    #[serde(rename = "1y")]
    OneYear,
    /// 5 ans
    #[serde(rename = "5y")]
    FiveYears,
    /// Tout l'historique disponible
    #[serde(rename = "max")]
    Max,
}

impl Period {
    /// Code transmis au fournisseur (paramètre `range` de Yahoo Finance)
    ///
    /// CONCEPT RUST : &'static str
    /// - String littérale stockée dans le binaire, pas d'allocation
    pub fn code(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::FiveYears => "5y",
            Period::Max => "max",
        }
    }

    /// Libellé affiché dans le sélecteur
    pub fn label(&self) -> &'static str {
        match self {
            Period::OneMonth => "1 Month",
            Period::ThreeMonths => "3 Month",
            Period::SixMonths => "6 Month",
            Period::OneYear => "1 Year",
            Period::FiveYears => "5 Years",
            Period::Max => "Max",
        }
    }

    /// Toutes les périodes, dans l'ordre du sélecteur
    pub fn all() -> [Period; 6] {
        [
            Period::OneMonth,
            Period::ThreeMonths,
            Period::SixMonths,
            Period::OneYear,
            Period::FiveYears,
            Period::Max,
        ]
    }

    /// Période suivante (cycle)
    pub fn next(&self) -> Period {
        match self {
            Period::OneMonth => Period::ThreeMonths,
            Period::ThreeMonths => Period::SixMonths,
            Period::SixMonths => Period::OneYear,
            Period::OneYear => Period::FiveYears,
            Period::FiveYears => Period::Max,
            Period::Max => Period::OneMonth, // Boucle
        }
    }

    /// Période précédente (cycle)
    pub fn previous(&self) -> Period {
        match self {
            Period::OneMonth => Period::Max, // Boucle
            Period::ThreeMonths => Period::OneMonth,
            Period::SixMonths => Period::ThreeMonths,
            Period::OneYear => Period::SixMonths,
            Period::FiveYears => Period::OneYear,
            Period::Max => Period::FiveYears,
        }
    }
}

impl Default for Period {
    /// Période par défaut du dashboard : 1 mois
    fn default() -> Self {
        Period::OneMonth
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Parsing depuis le code fournisseur
///
/// CONCEPT RUST : FromStr
/// - Permet `let p: Period = "3mo".parse()?;`
/// - Utilisé par clap pour l'argument --period
impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Period::all()
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "période inconnue '{}' (valeurs possibles : 1mo, 3mo, 6mo, 1y, 5y, max)",
                    s
                )
            })
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_codes_parse_back() {
        for period in Period::all() {
            assert_eq!(period.code().parse::<Period>().unwrap(), period);
        }
    }

    #[test]
    fn test_period_parse_is_lenient_on_case_and_spaces() {
        assert_eq!(" MAX ".parse::<Period>().unwrap(), Period::Max);
        assert_eq!("1Y".parse::<Period>().unwrap(), Period::OneYear);
    }

    #[test]
    fn test_period_parse_rejects_unknown() {
        assert!("2y".parse::<Period>().is_err());
        assert!("".parse::<Period>().is_err());
    }

    #[test]
    fn test_period_cycle() {
        assert_eq!(Period::OneMonth.next(), Period::ThreeMonths);
        assert_eq!(Period::Max.next(), Period::OneMonth);
        assert_eq!(Period::OneMonth.previous(), Period::Max);
        for period in Period::all() {
            assert_eq!(period.next().previous(), period);
        }
    }

    #[test]
    fn test_period_default_and_serde() {
        assert_eq!(Period::default(), Period::OneMonth);
        assert_eq!(serde_json::to_string(&Period::FiveYears).unwrap(), "\"5y\"");
        let parsed: Period = serde_json::from_str("\"6mo\"").unwrap();
        assert_eq!(parsed, Period::SixMonths);
    }
}
