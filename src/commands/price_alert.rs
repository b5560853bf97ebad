// ============================================================================
// Commande : price-alert
// ============================================================================
// Alerte quand un prix dépasse son dernier seuil, puis relève le seuil de
// `increasePercent` %.
//
// Historique persisté dans <cache>/coin_prices_cache.json :
//   {"bitcoin-aud": 110000.0, ...}
// Réécrit seulement si au moins une alerte a été déclenchée.
// ============================================================================

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::api::JsonSource;
use crate::app::{symbol_or_placeholder, App};
use crate::cache::{CacheStore, Clock, FileStore, PriceHistory, PRICE_HISTORY_FILE};
use crate::commands::{distinct, price_of, Notification, Outcome, WatchedCoin};
use crate::config::{load_config, require_at_least, AlertDelivery, Validate};
use crate::error::ConfigError;
use crate::models::{Catalog, PriceMap};
use crate::ui::{currency_symbol, format_currency};

const SUBJECT: &str = "Coin Price Increase Alert";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAlertConfig {
    pub coins: Vec<WatchedCoin>,

    /// Hausse (en %, 1 = 1%) appliquée au seuil après une alerte
    pub increase_percent: f64,

    #[serde(flatten)]
    pub delivery: AlertDelivery,
}

/// Au moins un coin, increasePercent >= 1
impl Validate for PriceAlertConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (i, coin) in self.coins.iter().enumerate() {
            coin.validate_at(i)?;
        }
        require_at_least("increasePercent", self.increase_percent, 1.0)?;
        self.delivery.validate()?;
        if self.coins.is_empty() {
            return Err(ConfigError::Empty(
                "Error: No coins specified in the configuration.".to_string(),
            ));
        }
        Ok(())
    }
}

#[instrument(skip(app))]
pub async fn run<S, T, C>(app: &App<S, T, C>, config_path: &Path) -> Result<Outcome>
where
    S: JsonSource,
    T: CacheStore,
    C: Clock,
{
    let config: PriceAlertConfig = load_config(config_path)?;
    execute(app, &config).await
}

pub async fn execute<S, T, C>(app: &App<S, T, C>, config: &PriceAlertConfig) -> Result<Outcome>
where
    S: JsonSource,
    T: CacheStore,
    C: Clock,
{
    let store = FileStore::in_dir(app.cache_dir(), PRICE_HISTORY_FILE);
    let mut history = PriceHistory::load(&store)?;

    let ids = distinct(config.coins.iter().map(|c| c.coin_id.as_str()));
    let currencies = distinct(config.coins.iter().map(|c| c.currency.as_str()));

    let prices = app
        .prices
        .fetch_validated_prices(&ids, &currencies)
        .await
        .context("Failed to fetch prices")?;
    let catalog = app.catalog.get_catalog().await?;

    let lines = evaluate(config, &prices, catalog, &mut history)?;
    if lines.is_empty() {
        info!("No price alert triggered");
        return Ok(Outcome::default());
    }

    history
        .save(&store)
        .context("Failed to write price history")?;
    info!(alerts = lines.len(), "Price alerts triggered");

    let output = lines.join("\n");
    Ok(Outcome {
        notification: Notification::when(true, &config.delivery, SUBJECT, &output),
        output,
    })
}

/// Compare chaque prix à son seuil ; retourne une ligne par alerte et met à
/// jour les seuils déclenchés. Les clés non configurées sont purgées.
pub fn evaluate(
    config: &PriceAlertConfig,
    prices: &PriceMap,
    catalog: &Catalog,
    history: &mut PriceHistory,
) -> Result<Vec<String>> {
    let active: HashSet<String> = config
        .coins
        .iter()
        .map(|coin| PriceHistory::key(&coin.coin_id, &coin.currency))
        .collect();
    history.retain_keys(&active);

    let mut lines = Vec::new();
    for coin in &config.coins {
        let currency = &coin.currency;
        let current_price = price_of(prices, &coin.coin_id, currency).unwrap_or(0.0);
        if current_price == 0.0 {
            bail!("Error: No price data for {} in {}.", coin.coin_id, currency.display());
        }

        let key = PriceHistory::key(&coin.coin_id, currency);
        if current_price > history.threshold(&key) {
            lines.push(format!(
                "{} is now {} {}{}",
                symbol_or_placeholder(catalog, &coin.coin_id),
                currency.display(),
                currency_symbol(currency.as_str()),
                format_currency(current_price)
            ));
            history.set_threshold(key, current_price * (1.0 + config.increase_percent / 100.0));
        }
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{temp_dir, test_app};
    use crate::config::parse_config;

    const VALID: &str = r#"{
        "coins": [
            {"coinId": "bitcoin", "currency": "AUD"},
            {"coinId": "ripple", "currency": "aud"}
        ],
        "increasePercent": 10,
        "sendEmail": false
    }"#;

    #[tokio::test]
    async fn test_first_run_alerts_and_writes_history() {
        let dir = temp_dir("price-alert-first");
        let app = test_app(dir.clone());
        let config: PriceAlertConfig = parse_config(VALID).unwrap();

        let outcome = execute(&app, &config).await.unwrap();
        assert!(outcome.output.contains("BTC is now AUD $100,000.00"));
        assert!(outcome.output.contains("XRP is now AUD $0.7500"));

        let store = FileStore::in_dir(&dir, PRICE_HISTORY_FILE);
        assert!(store.path().exists(), "Cache file was not created");
        let history = PriceHistory::load(&store).unwrap();
        assert!((history.threshold("bitcoin-aud") - 110000.0).abs() < 1e-6);

        // Deuxième exécution : prix inchangés, seuils relevés -> pas d'alerte
        let outcome = execute(&app, &config).await.unwrap();
        assert!(outcome.output.is_empty());

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_stale_keys_are_dropped() {
        let config: PriceAlertConfig = parse_config(VALID).unwrap();
        let prices: PriceMap = serde_json::from_value(serde_json::json!({
            "bitcoin": {"aud": 100000},
            "ripple": {"aud": 0.75}
        }))
        .unwrap();
        let mut history = PriceHistory::default();
        history.set_threshold("dogecoin-aud".to_string(), 1.0);
        history.set_threshold("bitcoin-aud".to_string(), 200000.0);

        let lines = evaluate(&config, &prices, &Catalog::default(), &mut history).unwrap();
        assert_eq!(lines, vec!["? is now AUD $0.7500".to_string()]);
        assert_eq!(history.len(), 2);
        assert_eq!(history.threshold("dogecoin-aud"), 0.0);
        assert_eq!(history.threshold("bitcoin-aud"), 200000.0);
    }

    #[test]
    fn test_missing_price_is_an_error() {
        let config: PriceAlertConfig = parse_config(VALID).unwrap();
        let prices: PriceMap =
            serde_json::from_value(serde_json::json!({"bitcoin": {"aud": 100000}})).unwrap();

        let err = evaluate(&config, &prices, &Catalog::default(), &mut PriceHistory::default())
            .unwrap_err();
        assert!(err.to_string().contains("No price data for ripple in AUD"));
    }

    #[test]
    fn test_invalid_configs() {
        let err = parse_config::<PriceAlertConfig>(r#"{"coins": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = parse_config::<PriceAlertConfig>(
            r#"{"coins": [{"coinId": "bitcoin", "currency": "aud"}], "increasePercent": 0.5}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Configuration file validation failed"));

        let err = parse_config::<PriceAlertConfig>(r#"{"coins": [], "increasePercent": 5}"#)
            .unwrap_err();
        assert!(err.to_string().contains("No coins specified"));
    }
}
