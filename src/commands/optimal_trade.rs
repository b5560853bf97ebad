// ============================================================================
// Commande : optimal-trade
// ============================================================================
// Compare un échange crypto -> crypto avec un objectif.
//
// Le ratio passe par le BTC :
//   ratio        = prix_btc(vendu) / prix_btc(acheté)
//   achat actuel = unités vendues × ratio
//   écart        = (achat actuel - unités visées) / unités visées
// Les prix cibles sont aussi exprimés dans la devise de référence.
// ============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::api::JsonSource;
use crate::app::{symbol_or_placeholder, App};
use crate::cache::{CacheStore, Clock};
use crate::commands::{distinct, record_of, Notification, Outcome};
use crate::config::{load_config, require_min_len, require_positive, AlertDelivery, Validate};
use crate::error::ConfigError;
use crate::models::{Catalog, CurrencyCode, PriceMap};
use crate::ui::{format_currency, TextTable};

const SUBJECT: &str = "Optimal Trade Alert";

fn default_currency() -> CurrencyCode {
    CurrencyCode::new("aud")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimalTradeConfig {
    /// Devise de référence pour les prix affichés
    #[serde(default = "default_currency")]
    pub currency: CurrencyCode,

    pub trades: Vec<Trade>,

    /// Masque les échanges dont l'achat actuel est sous l'objectif
    #[serde(default)]
    pub show_optimal_only: bool,

    #[serde(flatten)]
    pub delivery: AlertDelivery,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Échange visé : `sell_units` de `sell_coin_id` contre `buy_units` de `buy_coin_id`
pub struct Trade {
    pub sell_coin_id: String,
    pub sell_units: f64,
    pub buy_coin_id: String,
    pub buy_units: f64,
}

/// Au moins un échange, unités achetées > 0
impl Validate for OptimalTradeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.trades.is_empty() {
            return Err(ConfigError::Empty(
                "No trades found in the configuration.".to_string(),
            ));
        }
        require_min_len("currency", self.currency.as_str(), 3)?;
        for (i, trade) in self.trades.iter().enumerate() {
            require_min_len(format!("trades -> {} -> sellCoinId", i), &trade.sell_coin_id, 1)?;
            require_min_len(format!("trades -> {} -> buyCoinId", i), &trade.buy_coin_id, 1)?;
            require_positive(format!("trades -> {} -> buyUnits", i), trade.buy_units)?;
        }
        self.delivery.validate()
    }
}

#[derive(Debug)]
/// Tableau + indicateur d'alerte (au moins un écart >= 0)
pub struct TradeReport {
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
    let config: OptimalTradeConfig = load_config(config_path)?;
    execute(app, &config).await
}

pub async fn execute<S, T, C>(app: &App<S, T, C>, config: &OptimalTradeConfig) -> Result<Outcome>
where
    S: JsonSource,
    T: CacheStore,
    C: Clock,
{
    let ids = distinct(
        config
            .trades
            .iter()
            .flat_map(|t| [t.sell_coin_id.as_str(), t.buy_coin_id.as_str()]),
    );
    let currencies = distinct([config.currency.as_str(), "btc"]);

    let prices = app
        .prices
        .fetch_prices(&ids, &currencies)
        .await
        .context("Failed to fetch prices")?;
    let catalog = app.catalog.get_catalog().await?;

    let report = build_report(config, &prices, catalog);
    if report.table.is_empty() {
        return Ok(Outcome::default());
    }

    let output = report.table.to_string();
    Ok(Outcome {
        notification: Notification::when(report.alert, &config.delivery, SUBJECT, &output),
        output,
    })
}

pub fn build_report(config: &OptimalTradeConfig, prices: &PriceMap, catalog: &Catalog) -> TradeReport {
    let btc = CurrencyCode::new("btc");
    let currency = &config.currency;

    let mut table = TextTable::new([
        "Sell",
        "Target Buy",
        "Current Buy",
        "Diff",
        "Current Sell Price",
        "Target Sell Price",
        "Current Buy Price",
        "Target Buy Price",
    ]);
    let mut alert = false;

    for trade in &config.trades {
        let sell = record_of(prices, &trade.sell_coin_id);
        let buy = record_of(prices, &trade.buy_coin_id);

        let (Some(sell), Some(buy)) = (sell, buy) else {
            debug!(sell = %trade.sell_coin_id, buy = %trade.buy_coin_id, "Missing price data, trade skipped");
            continue;
        };
        if trade.sell_units <= 0.0 {
            continue;
        }
        let (Some(sell_btc), Some(buy_btc), Some(sell_price), Some(buy_price)) = (
            sell.price(&btc),
            buy.price(&btc),
            sell.price(currency),
            buy.price(currency),
        ) else {
            debug!(sell = %trade.sell_coin_id, buy = %trade.buy_coin_id, "Incomplete prices, trade skipped");
            continue;
        };

        let price_ratio = sell_btc / buy_btc;
        let current_buy = trade.sell_units * price_ratio;

        let target_sell_price = trade.buy_units / trade.sell_units;
        let target_buy_price = 1.0 / target_sell_price;
        let target_sell_price_currency = buy_price * target_sell_price;
        let target_buy_price_currency = sell_price * target_buy_price;

        let diff = (current_buy - trade.buy_units) / trade.buy_units * 100.0;
        if diff < 0.0 && config.show_optimal_only {
            continue;
        }
        if diff >= 0.0 {
            alert = true;
        }

        let sell_symbol = symbol_or_placeholder(catalog, &trade.sell_coin_id);
        let buy_symbol = symbol_or_placeholder(catalog, &trade.buy_coin_id);

        table.add_row([
            format!("{:.2} {}", trade.sell_units, sell_symbol),
            format!("{:.2} {}", trade.buy_units, buy_symbol),
            format!("{:.8} {}", current_buy, buy_symbol),
            format!("{:.2}%", diff),
            format!("{}: {}", sell_symbol, format_currency(sell_price)),
            format!("{}: {}", sell_symbol, format_currency(target_sell_price_currency)),
            format!("{}: {}", buy_symbol, format_currency(buy_price)),
            format!("{}: {}", buy_symbol, format_currency(target_buy_price_currency)),
        ]);
    }

    TradeReport { table, alert }
}
