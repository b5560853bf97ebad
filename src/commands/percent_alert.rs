// ============================================================================
// Commande : percent-alert
// ============================================================================
// Alerte quand la variation 24h (en valeur absolue) atteint `alertPercent`.
// ============================================================================

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::instrument;

use crate::api::JsonSource;
use crate::app::{symbol_or_placeholder, App};
use crate::cache::{CacheStore, Clock};
use crate::commands::{distinct, record_of, Notification, Outcome, WatchedCoin};
use crate::config::{load_config, require_at_least, AlertDelivery, Validate};
use crate::error::ConfigError;
use crate::models::{Catalog, PriceMap};
use crate::ui::{currency_symbol, format_currency};

const SUBJECT: &str = "Coin Percent Change Alert";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentAlertConfig {
    pub coins: Vec<WatchedCoin>,

    /// Seuil en % (1 = 1%) sur la variation 24h absolue
    pub alert_percent: f64,

    #[serde(flatten)]
    pub delivery: AlertDelivery,
}

/// Même contraintes que price-alert, sur alertPercent
impl Validate for PercentAlertConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (i, coin) in self.coins.iter().enumerate() {
            coin.validate_at(i)?;
        }
        require_at_least("alertPercent", self.alert_percent, 1.0)?;
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
    let config: PercentAlertConfig = load_config(config_path)?;
    execute(app, &config).await
}

pub async fn execute<S, T, C>(app: &App<S, T, C>, config: &PercentAlertConfig) -> Result<Outcome>
where
    S: JsonSource,
    T: CacheStore,
    C: Clock,
{
    let ids = distinct(config.coins.iter().map(|c| c.coin_id.as_str()));
    let currencies = distinct(config.coins.iter().map(|c| c.currency.as_str()));

    let prices = app
        .prices
        .fetch_validated_prices(&ids, &currencies)
        .await
        .context("Failed to fetch prices")?;
    let catalog = app.catalog.get_catalog().await?;

    let lines = evaluate(config, &prices, catalog)?;
    if lines.is_empty() {
        return Ok(Outcome::default());
    }

    let output = lines.join("\n");
    Ok(Outcome {
        notification: Notification::when(true, &config.delivery, SUBJECT, &output),
        output,
    })
}

/// Une ligne par crypto dont |variation 24h| >= alertPercent.
/// Un prix ou une variation absente fait échouer la commande.
pub fn evaluate(
    config: &PercentAlertConfig,
    prices: &PriceMap,
    catalog: &Catalog,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for coin in &config.coins {
        let currency = &coin.currency;
        let missing = |what: &str| {
            anyhow!("Error: No {} for {} in {}.", what, coin.coin_id, currency.display())
        };

        let record = record_of(prices, &coin.coin_id).ok_or_else(|| missing("price data"))?;
        let price = record.price(currency).ok_or_else(|| missing("price data"))?;
        let change = record
            .change_24h(currency)
            .ok_or_else(|| missing("24h change data"))?;

        if change.abs() >= config.alert_percent {
            lines.push(format!(
                "{} ({:.2}%) is now {} {}{}",
                symbol_or_placeholder(catalog, &coin.coin_id),
                change,
                currency.display(),
                currency_symbol(currency.as_str()),
                format_currency(price)
            ));
        }
    }
    Ok(lines)
}
