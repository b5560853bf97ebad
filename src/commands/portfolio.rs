// ============================================================================
// Commande : portfolio
// ============================================================================
// Valorisation d'un portefeuille dans une devise principale, plus le total
// dans des devises additionnelles.
//
// Deux tableaux :
// - résumé : rendement, total, variation 24h, totaux additionnels
// - détail : une ligne par avoir (allocation, valeur, prix, variation 24h)
// ============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::instrument;

use crate::api::JsonSource;
use crate::app::{symbol_or_placeholder, App};
use crate::cache::{CacheStore, Clock};
use crate::commands::{distinct, price_of, record_of, Outcome};
use crate::config::{
    load_config, require_at_least, require_min_len, require_positive, Validate,
};
use crate::error::ConfigError;
use crate::models::{Catalog, CurrencyCode, PriceMap};
use crate::ui::{currency_symbol, format_currency, format_grouped, TextTable};

fn default_currency() -> CurrencyCode {
    CurrencyCode::new("AUD")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioConfig {
    /// Montant investi, base du calcul de rendement
    #[serde(default)]
    pub investment_amount: f64,

    #[serde(default = "default_currency")]
    pub default_currency: CurrencyCode,

    /// Devises additionnelles pour le résumé
    #[serde(default)]
    pub currencies: Vec<CurrencyCode>,

    #[serde(default)]
    pub holdings: Vec<Holding>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Quantité détenue d'une crypto
pub struct Holding {
    pub coin_id: String,
    pub units: f64,
}

/// Avoirs non vides, unités > 0, codes de devise d'au moins 3 lettres
impl Validate for PortfolioConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        require_at_least("investmentAmount", self.investment_amount, 0.0)?;
        require_min_len("defaultCurrency", self.default_currency.as_str(), 3)?;
        for (i, currency) in self.currencies.iter().enumerate() {
            require_min_len(format!("currencies -> {}", i), currency.as_str(), 3)?;
        }
        for (i, holding) in self.holdings.iter().enumerate() {
            require_min_len(format!("holdings -> {} -> coinId", i), &holding.coin_id, 1)?;
            require_positive(format!("holdings -> {} -> units", i), holding.units)?;
        }
        if self.holdings.is_empty() {
            return Err(ConfigError::Empty(
                "Error: The portfolio holdings are empty in the supplied config.".to_string(),
            ));
        }
        Ok(())
    }
}

impl PortfolioConfig {
    /// Devises additionnelles, sans doublon ni devise principale
    pub fn additional_currencies(&self) -> Vec<CurrencyCode> {
        let mut additional: Vec<CurrencyCode> = Vec::new();
        for currency in &self.currencies {
            if *currency != self.default_currency && !additional.contains(currency) {
                additional.push(currency.clone());
            }
        }
        additional
    }
}

#[derive(Debug)]
pub struct PortfolioReport {
    pub summary: TextTable,
    pub detail: TextTable,
}

#[instrument(skip(app))]
pub async fn run<S, T, C>(app: &App<S, T, C>, config_path: &Path) -> Result<Outcome>
where
    S: JsonSource,
    T: CacheStore,
    C: Clock,
{
    let config: PortfolioConfig = load_config(config_path)?;
    execute(app, &config).await
}

pub async fn execute<S, T, C>(app: &App<S, T, C>, config: &PortfolioConfig) -> Result<Outcome>
where
    S: JsonSource,
    T: CacheStore,
    C: Clock,
{
    let ids = distinct(config.holdings.iter().map(|h| h.coin_id.as_str()));
    let supported: Vec<CurrencyCode> = std::iter::once(config.default_currency.clone())
        .chain(config.additional_currencies())
        .collect();

    let prices = app
        .prices
        .fetch_validated_prices(&ids, &supported)
        .await
        .context("Failed to fetch prices")?;
    let catalog = app.catalog.get_catalog().await?;

    let report = build_report(config, &prices, catalog)?;
    Ok(Outcome::print(format!("{}\n{}", report.summary, report.detail)))
}

/// Résumé + détail dans la devise principale.
///
/// CONCEPT : pas de résultat partiel
/// - un prix ou une variation 24h manquante fait échouer tout le rapport
pub fn build_report(config: &PortfolioConfig, prices: &PriceMap, catalog: &Catalog) -> Result<PortfolioReport> {
    let currency = &config.default_currency;
    let code = currency.display();
    let symbol = currency_symbol(currency.as_str());

    // Valeur et variation 24h de chaque avoir dans la devise principale
    let mut positions = Vec::with_capacity(config.holdings.len());
    for holding in &config.holdings {
        let price = price_of(prices, &holding.coin_id, currency).with_context(|| {
            format!("No price data for {} in {}.", holding.coin_id, code)
        })?;
        let change_24h = record_of(prices, &holding.coin_id)
            .and_then(|record| record.change_24h(currency))
            .with_context(|| {
                format!("No 24h change data for {} in {}.", holding.coin_id, code)
            })?;
        positions.push((holding, price, price * holding.units, change_24h));
    }

    let total_value: f64 = positions.iter().map(|(_, _, value, _)| value).sum();
    let total_24h_change: f64 = positions
        .iter()
        .map(|(_, _, value, change)| value * (change / 100.0))
        .sum();

    let mut detail = TextTable::new([
        "Name".to_string(),
        "Units".to_string(),
        "Alloc".to_string(),
        format!("Total ({})", code),
        format!("Price ({})", code),
        format!("24H % ({})", code),
    ]);
    for (holding, price, value, change) in &positions {
        let alloc = if total_value != 0.0 { value / total_value * 100.0 } else { 0.0 };
        detail.add_row([
            symbol_or_placeholder(catalog, &holding.coin_id),
            holding.units.to_string(),
            format!("{:.2}%", alloc),
            format!("{}{}", symbol, format_currency(*value)),
            format!("{}{}", symbol, format_currency(*price)),
            format!("{:.2}%", change),
        ]);
    }

    let investment_return = total_value - config.investment_amount;
    let return_percent = if config.investment_amount != 0.0 {
        investment_return / config.investment_amount * 100.0
    } else {
        0.0
    };
    let change_24h_percent = if total_value != 0.0 {
        total_24h_change / total_value * 100.0
    } else {
        0.0
    };

    let additional = config.additional_currencies();
    let mut summary = TextTable::new(
        [
            format!("Return % ({})", code),
            format!("Total ({})", code),
            format!("Return ({})", code),
            format!("24H Diff ({})", code),
            format!("24H % ({})", code),
        ]
        .into_iter()
        .chain(additional.iter().map(|c| format!("Total ({})", c))),
    );

    let mut row = vec![
        format!("{:.2}%", return_percent),
        format!("{}{}", symbol, format_currency(total_value)),
        format!("{}{}", symbol, format_currency(investment_return)),
        format!("{}{}", symbol, format_grouped(total_24h_change, 2)),
        format!("{:.2}%", change_24h_percent),
    ];
    for other in &additional {
        let total: f64 = config
            .holdings
            .iter()
            .map(|h| price_of(prices, &h.coin_id, other).unwrap_or(0.0) * h.units)
            .sum();
        row.push(format!("{}{}", currency_symbol(other.as_str()), format_currency(total)));
    }
    summary.add_row(row);

    Ok(PortfolioReport { summary, detail })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{temp_dir, test_app};
    use crate::config::parse_config;

    const VALID: &str = r#"{
        "investmentAmount": 50000,
        "defaultCurrency": "AUD",
        "currencies": ["AUD", "BTC"],
        "holdings": [
            {"coinId": "bitcoin", "units": 3},
            {"coinId": "ethereum", "units": 5}
        ]
    }"#;

    #[tokio::test]
    async fn test_summary_and_detail() {
        let app = test_app(temp_dir("portfolio"));
        let config: PortfolioConfig = parse_config(VALID).unwrap();
        let outcome = execute(&app, &config).await.unwrap();
        let output = outcome.output;

        let summary_row = output.lines().find(|l| l.contains("550.00%")).unwrap();
        assert!(summary_row.contains("$325,000.00"));
        assert!(summary_row.contains("$275,000.00"));
        assert!(summary_row.contains("$32,208.13"));
        assert!(summary_row.contains("9.91%"));
        // 3 × 1 + 5 × 0.04779493 BTC
        assert!(summary_row.contains("3.24"));
        assert!(output.contains("Total (BTC)"));

        let btc = output.lines().find(|l| l.contains("92.31%")).unwrap();
        assert!(btc.contains("BTC"));
        assert!(btc.contains("$300,000.00"));
        assert!(btc.contains("$100,000.00"));
        assert!(btc.contains("10.78%"));

        let eth = output.lines().find(|l| l.contains("7.69%")).unwrap();
        assert!(eth.contains("ETH"));
        assert!(eth.contains("$25,000.00"));
        assert!(eth.contains("-0.53%"));
    }

    #[test]
    fn test_empty_holdings() {
        let err = parse_config::<PortfolioConfig>(r#"{"holdings": []}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error: The portfolio holdings are empty in the supplied config."
        );

        let err = parse_config::<PortfolioConfig>("{}").unwrap_err();
        assert!(matches!(err, ConfigError::Empty(_)));
    }

    #[test]
    fn test_malformed_units() {
        let err = parse_config::<PortfolioConfig>(
            r#"{"holdings": [{"coinId": "bitcoin", "units": "three"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_additional_currencies_exclude_default() {
        let config: PortfolioConfig = parse_config(
            r#"{"defaultCurrency": "aud", "currencies": ["AUD", "usd", "USD", "btc"],
                "holdings": [{"coinId": "bitcoin", "units": 1}]}"#,
        )
        .unwrap();
        let additional = config.additional_currencies();
        let codes: Vec<&str> = additional.iter().map(CurrencyCode::as_str).collect();
        assert_eq!(codes, vec!["usd", "btc"]);
    }

    #[test]
    fn test_missing_24h_change_is_an_error() {
        let config: PortfolioConfig =
            parse_config(r#"{"holdings": [{"coinId": "bitcoin", "units": 1}]}"#).unwrap();
        let prices: PriceMap = serde_json::from_value(serde_json::json!({
            "bitcoin": {"aud": 100000, "aud_24h_change": null}
        }))
        .unwrap();

        let err = build_report(&config, &prices, &Catalog::default()).unwrap_err();
        assert!(err.to_string().contains("No 24h change data for bitcoin in AUD"));
    }

    #[test]
    fn test_zero_investment_has_zero_return_percent() {
        let config: PortfolioConfig =
            parse_config(r#"{"holdings": [{"coinId": "ripple", "units": 10}]}"#).unwrap();
        let prices: PriceMap =
            serde_json::from_value(serde_json::json!({"ripple": {"aud": 0.75, "aud_24h_change": 1.0}}))
                .unwrap();

        let report = build_report(&config, &prices, &Catalog::default()).unwrap();
        assert_eq!(report.summary.rows()[0][0], "0.00%");
        assert_eq!(report.detail.rows()[0][0], "?");
        assert_eq!(report.detail.rows()[0][3], "$7.50");
    }
}
