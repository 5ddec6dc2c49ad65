// ============================================================================
// API Client : Yahoo Finance
// ============================================================================
// Récupère les historiques journaliers depuis l'endpoint v8 "chart"
//
// CONCEPTS RUST :
// 1. async/await : requêtes HTTP non-bloquantes
// 2. Result<T, E> + Context : erreurs annotées à chaque étape
// 3. Serde : désérialisation JSON automatique
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::api::PriceProvider;
use crate::models::{Period, PricePoint};

/// URL de base de l'API publique
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// User-Agent navigateur (Yahoo bloque les clients sans User-Agent)
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// Structures pour parser la réponse JSON de Yahoo Finance
// ============================================================================
// Yahoo retourne un JSON imbriqué, on définit des structures qui matchent
// exactement la structure JSON pour que serde puisse désérialiser
// ============================================================================

/// Réponse complète de l'API Yahoo Finance
#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    /// null quand Yahoo retourne une erreur (symbole inconnu, ...)
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

/// Erreur renvoyée dans le corps de la réponse
#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

/// Métadonnées du ticker
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    symbol: String,
    /// Décalage (secondes) entre UTC et le fuseau de la place de cotation
    gmtoffset: Option<i64>,
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
    /// Présent quand includeAdjustedClose=true et interval >= 1d
    adjclose: Option<Vec<AdjClose>>,
}

/// Colonnes OHLC (valeurs null possibles pour les séances incomplètes)
#[derive(Debug, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

// ============================================================================
// Configuration du client
// ============================================================================

/// Paramètres du client Yahoo Finance
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// URL de base (surchargée avec --base-url, ex: proxy local)
    pub base_url: String,

    pub user_agent: String,

    /// Timeout global d'une requête
    pub timeout: Duration,

    /// Ajuste OHLC avec le ratio adjclose/close (dividendes et splits)
    pub auto_adjust: bool,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
            auto_adjust: true,
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client HTTP Yahoo Finance
///
/// CONCEPT RUST : réutilisation du client
/// - reqwest::Client garde un pool de connexions
/// - On le crée une seule fois, puis on le réutilise pour chaque symbole
pub struct YahooClient {
    http: reqwest::Client,
    config: YahooConfig,
}

impl YahooClient {
    /// Crée un client à partir d'une configuration
    pub fn new(config: YahooConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self { http, config })
    }

    /// Récupère l'historique journalier d'un ticker
    ///
    /// # Arguments
    /// * `symbol` - Symbole du ticker (ex: "AAPL", "BTC-USD")
    /// * `period` - Fenêtre historique
    ///
    /// # Exemple
    /// let history = client.fetch_daily_history("AAPL", Period::OneMonth).await?;
    #[instrument(skip(self, period), fields(period = %period))]
    pub async fn fetch_daily_history(&self, symbol: &str, period: Period) -> Result<Vec<PricePoint>> {
        if symbol.is_empty() {
            anyhow::bail!("Symbole vide");
        }

        let url = build_chart_url(&self.config.base_url, symbol, period)?;
        debug!(url = %url, "Built Yahoo Finance API URL");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Échec de la requête HTTP vers Yahoo Finance")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        let body = response
            .text()
            .await
            .context("Échec de la lecture de la réponse Yahoo")?;

        // Yahoo répond 404 + chart.error pour un symbole inconnu
        if !status.is_success() {
            error!(status = %status, "Yahoo Finance returned error status");
            if let Ok(YahooResponse {
                chart: Chart { error: Some(err), .. },
            }) = serde_json::from_str::<YahooResponse>(&body)
            {
                anyhow::bail!("Yahoo Finance : {} ({})", err.description, err.code);
            }
            anyhow::bail!("Yahoo Finance a retourné une erreur : HTTP {}", status);
        }

        debug!("Parsing JSON response");
        let yahoo_response: YahooResponse =
            serde_json::from_str(&body).context("Échec du parsing JSON de la réponse Yahoo")?;

        let history = parse_yahoo_response(yahoo_response, symbol, self.config.auto_adjust)?;

        info!(rows = history.len(), "Successfully fetched price history");
        Ok(history)
    }
}

#[async_trait]
impl PriceProvider for YahooClient {
    async fn fetch_history(&self, symbol: &str, period: Period) -> Result<Vec<PricePoint>> {
        self.fetch_daily_history(symbol, period).await
    }
}

/// Construit l'URL de l'endpoint chart
///
/// CONCEPT : path_segments_mut()
/// - Le symbole est ajouté comme segment de chemin encodé
/// - Un symbole contenant '/' ou '?' ne peut pas casser l'URL
fn build_chart_url(base_url: &str, symbol: &str, period: Period) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .with_context(|| format!("URL de base invalide : {}", base_url))?;

    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("URL de base non hiérarchique : {}", base_url))?
        .pop_if_empty()
        .extend(["v8", "finance", "chart", symbol]);

    url.query_pairs_mut()
        .append_pair("range", period.code())
        .append_pair("interval", "1d")
        .append_pair("includeAdjustedClose", "true");

    Ok(url)
}

/// Parse la réponse JSON de Yahoo et la convertit en Vec<PricePoint>
///
/// - Lignes incomplètes (open/high/low/close null) : ignorées
/// - Date : timestamp décalé du gmtoffset de la place de cotation
/// - auto_adjust : OHLC multipliés par adjclose / close
fn parse_yahoo_response(
    yahoo_response: YahooResponse,
    symbol: &str,
    auto_adjust: bool,
) -> Result<Vec<PricePoint>> {
    if let Some(err) = yahoo_response.chart.error {
        error!(code = %err.code, "Yahoo Finance returned chart error");
        anyhow::bail!("Yahoo Finance : {} ({})", err.description, err.code);
    }

    let result = yahoo_response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .with_context(|| format!("Aucune donnée retournée par Yahoo Finance pour {}", symbol))?;

    debug!(
        symbol = %result.meta.symbol,
        timezone = ?result.meta.exchange_timezone_name,
        "Parsing chart result"
    );

    let gmtoffset = result.meta.gmtoffset.unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();

    let indicators = result.indicators;
    let quote = indicators
        .quote
        .into_iter()
        .next()
        .context("Pas de données OHLC dans la réponse")?;

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let adjcloses = if auto_adjust {
        indicators
            .adjclose
            .and_then(|columns| columns.into_iter().next())
            .and_then(|column| column.adjclose)
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    let mut history = Vec::with_capacity(timestamps.len());
    let mut skipped_count = 0;

    for (i, &timestamp) in timestamps.iter().enumerate() {
        // CONCEPT RUST : Option chaining
        // - get(i) : None si la colonne est trop courte
        // - and_then(|&v| v) : None si la valeur est null
        let row = (
            opens.get(i).and_then(|&v| v),
            highs.get(i).and_then(|&v| v),
            lows.get(i).and_then(|&v| v),
            closes.get(i).and_then(|&v| v),
        );

        let (open, high, low, close) = match row {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => {
                skipped_count += 1;
                continue;
            }
        };

        let date = DateTime::from_timestamp(timestamp + gmtoffset, 0)
            .context("Timestamp invalide")?
            .date_naive();

        let mut point = PricePoint::new(date, open, high, low, close);

        if let Some(adj) = adjcloses.get(i).and_then(|&v| v) {
            if close != 0.0 {
                point = point.scaled(adj / close);
            }
        }

        history.push(point);
    }

    if skipped_count > 0 {
        warn!(
            skipped = skipped_count,
            total = timestamps.len(),
            "Skipped rows with missing data"
        );
    }

    if history.is_empty() {
        error!("No valid price data found");
        anyhow::bail!("Aucune donnée de prix valide trouvée pour {}", symbol);
    }

    Ok(history)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parse(json: &str, auto_adjust: bool) -> Result<Vec<PricePoint>> {
        let response: YahooResponse = serde_json::from_str(json).unwrap();
        parse_yahoo_response(response, "AAPL", auto_adjust)
    }

    // 2024-03-01 14:30 UTC et 2024-03-04 14:30 UTC (ouverture NYSE)
    const TWO_DAYS: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "symbol": "AAPL", "gmtoffset": -18000, "exchangeTimezoneName": "America/New_York" },
                "timestamp": [1709303400, 1709562600, 1709649000],
                "indicators": {
                    "quote": [{
                        "open":  [100.0, 102.0, null],
                        "high":  [105.0, 106.0, 107.0],
                        "low":   [99.0, 101.0, 100.0],
                        "close": [104.0, 103.0, 101.0],
                        "volume": [1000, 2000, 3000]
                    }],
                    "adjclose": [{ "adjclose": [52.0, 103.0, 101.0] }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_build_chart_url() {
        let url = build_chart_url(DEFAULT_BASE_URL, "AAPL", Period::ThreeMonths).unwrap();
        let url = url.as_str();
        assert!(url.starts_with("https://query1.finance.yahoo.com/v8/finance/chart/AAPL?"));
        assert!(url.contains("range=3mo"));
        assert!(url.contains("interval=1d"));
    }

    #[test]
    fn test_build_chart_url_encodes_symbol() {
        let url = build_chart_url("http://localhost:8080/", "A/B", Period::Max).unwrap();
        assert!(url.as_str().starts_with("http://localhost:8080/v8/finance/chart/A%2FB?"));
        assert!(url.as_str().contains("range=max"));
    }

    #[test]
    fn test_parse_skips_null_rows_and_uses_exchange_date() {
        let history = parse(TWO_DAYS, false).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(history[1].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(history[0].close, 104.0);
    }

    #[test]
    fn test_parse_auto_adjust_scales_ohlc() {
        let history = parse(TWO_DAYS, true).unwrap();
        // adjclose / close = 52 / 104 = 0.5
        assert_eq!(history[0].open, 50.0);
        assert_eq!(history[0].high, 52.5);
        assert_eq!(history[0].close, 52.0);
        // ratio 1.0 : inchangé
        assert_eq!(history[1].close, 103.0);
    }

    #[test]
    fn test_parse_chart_error() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse(json, true).unwrap_err();
        assert!(err.to_string().contains("symbol may be delisted"));
    }

    #[test]
    fn test_parse_empty_result_is_error() {
        let json = r#"{
            "chart": {
                "result": [{
                    "meta": { "symbol": "AAPL" },
                    "indicators": { "quote": [{}] }
                }],
                "error": null
            }
        }"#;
        let err = parse(json, true).unwrap_err();
        assert!(err.to_string().contains("AAPL"));
    }

    // Test avec un vrai appel API (peut échouer si pas de connexion)
    #[tokio::test]
    async fn test_fetch_daily_history() {
        let client = YahooClient::new(YahooConfig::default()).unwrap();
        match client.fetch_daily_history("AAPL", Period::OneMonth).await {
            Ok(history) => {
                assert!(!history.is_empty());
                assert!(history.windows(2).all(|w| w[0].date <= w[1].date));
            }
            Err(e) => {
                println!("⚠ Test skippé (pas de connexion?) : {}", e);
            }
        }
    }
}
