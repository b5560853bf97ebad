// ============================================================================
// Commande : fiat-purchase
// ============================================================================
// Combien de crypto pour un montant en devise (ou l'inverse) :
// - unitAmount > 0     -> montant = unités × prix
// - sinon              -> unités = currencyAmount / prix
// ============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::api::JsonSource;
use crate::app::{symbol_or_placeholder, App};
use crate::cache::{CacheStore, Clock};
use crate::commands::{distinct, price_of, Outcome};
use crate::config::{load_config, require_min_len, Validate};
use crate::error::ConfigError;
use crate::models::{Catalog, CurrencyCode, PriceMap};
use crate::ui::{currency_symbol, format_currency, TextTable};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiatPurchaseConfig {
    #[serde(default)]
    pub purchases: Vec<FiatPurchase>,
}

/// Un achat : soit un montant en devise, soit un nombre d'unités
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiatPurchase {
    pub coin_id: String,
    pub currency: CurrencyCode,
    #[serde(default)]
    pub currency_amount: f64,
    #[serde(default)]
    pub unit_amount: f64,
}

/// Liste non vide, ids et devises renseignés
///
/// CONCEPT RUST : impl Trait for Type
/// - Chaque config implémente Validate à sa façon
/// - load_config n'accepte que des types qui implémentent Validate
impl Validate for FiatPurchaseConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.purchases.is_empty() {
            return Err(ConfigError::Empty(
                "No purchases found in the configuration.".to_string(),
            ));
        }
        for (i, purchase) in self.purchases.iter().enumerate() {
            require_min_len(format!("purchases -> {} -> coinId", i), &purchase.coin_id, 1)?;
            require_min_len(
                format!("purchases -> {} -> currency", i),
                purchase.currency.as_str(),
                3,
            )?;
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
    let config: FiatPurchaseConfig = load_config(config_path)?;
    execute(app, &config).await
}

pub async fn execute<S, T, C>(app: &App<S, T, C>, config: &FiatPurchaseConfig) -> Result<Outcome>
where
    S: JsonSource,
    T: CacheStore,
    C: Clock,
{
    let ids = distinct(config.purchases.iter().map(|p| p.coin_id.as_str()));
    let currencies = distinct(config.purchases.iter().map(|p| p.currency.as_str()));

    let prices = app
        .prices
        .fetch_prices(&ids, &currencies)
        .await
        .context("Failed to fetch prices")?;
    let catalog = app.catalog.get_catalog().await?;

    Ok(Outcome::print(build_table(config, &prices, catalog).to_string()))
}

/// Une ligne par achat dont le prix est connu et non nul
pub fn build_table(config: &FiatPurchaseConfig, prices: &PriceMap, catalog: &Catalog) -> TextTable {
    let mut table = TextTable::new(["Currency", "Currency Amount", "Symbol", "Units", "Unit Price"]);

    for purchase in &config.purchases {
        let coin_price = price_of(prices, &purchase.coin_id, &purchase.currency).unwrap_or(0.0);
        if coin_price == 0.0 {
            debug!(coin = %purchase.coin_id, "No price, purchase skipped");
            continue;
        }

        // Montants tronqués à l'entier
        let mut units = purchase.unit_amount.trunc();
        let mut currency_amount = purchase.currency_amount.trunc();
        if units > 0.0 {
            currency_amount = units * coin_price;
        } else {
            units = currency_amount / coin_price;
        }

        let symbol = currency_symbol(purchase.currency.as_str());
        table.add_row([
            purchase.currency.display(),
            format!("{}{}", symbol, format_currency(currency_amount)),
            symbol_or_placeholder(catalog, &purchase.coin_id),
            format!("{:.4}", units),
            format!("{}{}", symbol, format_currency(coin_price)),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{temp_dir, test_app};
    use crate::config::parse_config;

    const VALID: &str = r#"{
        "purchases": [
            {"coinId": "bitcoin", "currency": "AUD", "unitAmount": 1},
            {"coinId": "ripple", "currency": "aud", "currencyAmount": 10000}
        ]
    }"#;

    #[tokio::test]
    async fn test_rows() {
        let app = test_app(temp_dir("fiat-rows"));
        let config: FiatPurchaseConfig = parse_config(VALID).unwrap();

        let outcome = execute(&app, &config).await.unwrap();
        let lines: Vec<&str> = outcome.output.lines().collect();

        assert!(lines[3].contains("AUD"));
        assert!(lines[3].contains("$100,000.00"));
        assert!(lines[3].contains("BTC"));
        assert!(lines[3].contains("1.0000"));
        assert!(lines[4].contains("$10,000.00"));
        assert!(lines[4].contains("XRP"));
        assert!(lines[4].contains("13333.3333"));
        assert!(lines[4].contains("$0.7500"));
        assert!(outcome.notification.is_none());
    }

    #[test]
    fn test_empty_config() {
        let err = parse_config::<FiatPurchaseConfig>(r#"{"purchases": []}"#).unwrap_err();
        assert!(err.to_string().contains("No purchases found"));

        let err = parse_config::<FiatPurchaseConfig>("{}").unwrap_err();
        assert!(matches!(err, ConfigError::Empty(_)));
    }

    #[test]
    fn test_unpriced_purchase_is_skipped() {
        let config: FiatPurchaseConfig = parse_config(
            r#"{"purchases": [{"coinId": "bitcoin", "currency": "usd", "unitAmount": 1}]}"#,
        )
        .unwrap();
        let prices = PriceMap::new();

        let table = build_table(&config, &prices, &Catalog::default());
        assert!(table.is_empty());
    }
}
