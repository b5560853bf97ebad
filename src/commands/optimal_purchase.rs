// ============================================================================
// Commande : optimal-purchase
// ============================================================================
// Alerte quand le coût actuel d'un achat passe sous le prix cible.
//
// Pour chaque achat :
// - coût actuel = prix unitaire × unités
// - alerte si prix cible > coût actuel
// - écart = (prix unitaire - prix unitaire cible) / prix unitaire cible
// ============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::api::JsonSource;
use crate::app::{symbol_or_placeholder, App};
use crate::cache::{CacheStore, Clock};
use crate::commands::{distinct, price_of, Notification, Outcome};
use crate::config::{load_config, require_min_len, require_positive, AlertDelivery, Validate};
use crate::error::ConfigError;
use crate::models::{Catalog, CurrencyCode, PriceMap};
use crate::ui::{currency_symbol, format_currency, TextTable};

const SUBJECT: &str = "Optimal Purchase Alert";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimalPurchaseConfig {
    /// N'afficher que les achats sous leur prix cible
    pub show_optimal_only: bool,

    pub purchases: Vec<TargetPurchase>,

    #[serde(flatten)]
    pub delivery: AlertDelivery,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPurchase {
    pub coin_id: String,
    pub buy_units: f64,
    /// Prix cible total pour `buy_units`
    pub price: f64,
    pub currency: CurrencyCode,
}

/// Chemins d'erreur du type "purchases -> 1 -> buyUnits"
impl Validate for OptimalPurchaseConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.purchases.is_empty() {
            return Err(ConfigError::Empty(
                "No purchases found in the configuration.".to_string(),
            ));
        }
        for (i, purchase) in self.purchases.iter().enumerate() {
            require_min_len(format!("purchases -> {} -> coinId", i), &purchase.coin_id, 1)?;
            require_positive(format!("purchases -> {} -> buyUnits", i), purchase.buy_units)?;
            require_positive(format!("purchases -> {} -> price", i), purchase.price)?;
            require_min_len(
                format!("purchases -> {} -> currency", i),
                purchase.currency.as_str(),
                3,
            )?;
        }
        self.delivery.validate()
    }
}

/// Tableau + indicateur d'alerte
#[derive(Debug)]
pub struct PurchaseReport {
    pub table: TextTable,
    pub alert: bool,
}

#[instrument(skip(app))]
pub async fn run<S, T, C>(app: &App<S, T, C>, config_path: &Path) -> Result<Outcome>
where
    S: JsonSource,
    T: CacheStore,
    C: Clock,
{
    let config: OptimalPurchaseConfig = load_config(config_path)?;
    execute(app, &config).await
}

pub async fn execute<S, T, C>(app: &App<S, T, C>, config: &OptimalPurchaseConfig) -> Result<Outcome>
where
    S: JsonSource,
    T: CacheStore,
    C: Clock,
{
    let ids = distinct(config.purchases.iter().map(|p| p.coin_id.as_str()));
    let currencies = distinct(config.purchases.iter().map(|p| p.currency.as_str()));

    let prices = app
        .prices
        .fetch_validated_prices(&ids, &currencies)
        .await
        .context("Failed to fetch prices")?;
    let catalog = app.catalog.get_catalog().await?;

    let report = build_report(config, &prices, catalog)?;
    if report.table.is_empty() {
        info!("No purchase to show");
        return Ok(Outcome::default());
    }

    let output = report.table.to_string();
    Ok(Outcome {
        notification: Notification::when(report.alert, &config.delivery, SUBJECT, &output),
        output,
    })
}

/// Construit le tableau ; `alert` passe à true dès qu'un achat est sous
/// son prix cible.
///
/// Erreur si le prix d'un id manque dans la devise demandée.
pub fn build_report(
    config: &OptimalPurchaseConfig,
    prices: &PriceMap,
    catalog: &Catalog,
) -> Result<PurchaseReport> {
    let mut table = TextTable::new([
        "Buy",
        "Current Price",
        "Target Price",
        "Unit Price",
        "Target Unit Price",
        "Price Diff",
    ]);
    let mut alert = false;

    for purchase in &config.purchases {
        let currency = &purchase.currency;
        let unit_price = price_of(prices, &purchase.coin_id, currency).with_context(|| {
            format!("No price data for {} in {}.", purchase.coin_id, currency.display())
        })?;

        let units = purchase.buy_units;
        let current_total = unit_price * units;
        let target_price = purchase.price;

        if target_price > current_total {
            alert = true;
        } else if config.show_optimal_only {
            continue;
        }

        let target_unit_price = target_price / units;
        let price_diff = (unit_price - target_unit_price) / target_unit_price * 100.0;
        let symbol = currency_symbol(currency.as_str());
        let with_currency = |value: f64| format!("{}{} {}", symbol, format_currency(value), currency);

        table.add_row([
            format!("{} {}", units, symbol_or_placeholder(catalog, &purchase.coin_id)),
            with_currency(current_total),
            with_currency(target_price),
            with_currency(unit_price),
            with_currency(target_unit_price),
            format!("{:.2}%", price_diff),
        ]);
    }

    Ok(PurchaseReport { table, alert })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{temp_dir, test_app};
    use crate::config::parse_config;

    fn config(show_optimal_only: bool, send_email: bool) -> OptimalPurchaseConfig {
        let raw = format!(
            r#"{{
                "showOptimalOnly": {},
                "purchases": [
                    {{"coinId": "bitcoin", "buyUnits": 1, "price": 90000, "currency": "AUD"}},
                    {{"coinId": "ethereum", "buyUnits": 3, "price": 18000, "currency": "AUD"}}
                ],
                "sendEmail": {},
                "email": "me@example.com",
                "smtp": {{"host": "smtp.example.com", "port": 587, "username": "me", "password": "pw"}}
            }}"#,
            show_optimal_only, send_email
        );
        parse_config(&raw).unwrap()
    }

    fn row_with(output: &str, needle: &str) -> Option<String> {
        output.lines().find(|l| l.contains(needle)).map(str::to_string)
    }

    #[tokio::test]
    async fn test_all_purchases_show() {
        let app = test_app(temp_dir("optimal-purchase-all"));
        let outcome = execute(&app, &config(false, false)).await.unwrap();

        let btc = row_with(&outcome.output, "1 BTC").unwrap();
        assert!(btc.contains("$100,000.00 AUD"));
        assert!(btc.contains("$90,000.00 AUD"));
        assert!(btc.contains("11.11%"));

        let eth = row_with(&outcome.output, "3 ETH").unwrap();
        assert!(eth.contains("$15,000.00 AUD"));
        assert!(eth.contains("$18,000.00 AUD"));
        assert!(eth.contains("$5,000.00 AUD"));
        assert!(eth.contains("$6,000.00 AUD"));
        assert!(eth.contains("-16.67%"));
        assert!(outcome.notification.is_none());
    }

    #[tokio::test]
    async fn test_only_optimal_purchases_show() {
        let app = test_app(temp_dir("optimal-purchase-optimal"));
        let outcome = execute(&app, &config(true, true)).await.unwrap();

        assert!(row_with(&outcome.output, "1 BTC").is_none());
        assert!(row_with(&outcome.output, "3 ETH").is_some());

        let notification = outcome.notification.unwrap();
        assert_eq!(notification.subject, SUBJECT);
        assert_eq!(notification.body, outcome.output);
    }

    #[test]
    fn test_non_positive_units_rejected() {
        let err = parse_config::<OptimalPurchaseConfig>(
            r#"{"showOptimalOnly": false, "sendEmail": false,
                "purchases": [{"coinId": "bitcoin", "buyUnits": 0, "price": 1, "currency": "aud"}]}"#,
        )
        .unwrap_err();
        match err {
            ConfigError::Invalid { path, .. } => assert_eq!(path, "purchases -> 0 -> buyUnits"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_show_optimal_only_is_parse_error() {
        let err = parse_config::<OptimalPurchaseConfig>(r#"{"purchases": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
