// ============================================================================
// Module : commands
// ============================================================================
// Une sous-commande par outil. Chaque commande :
// 1. charge et valide sa config JSON
// 2. récupère les prix (une requête) puis le catalogue (symboles)
// 3. construit sa sortie texte (tableaux, lignes d'alerte)
//
// La sortie est retournée (Outcome) plutôt qu'imprimée : main affiche,
// les tests vérifient le texte.
// ============================================================================

pub mod fiat_purchase;
pub mod optimal_purchase;
pub mod optimal_trade;
pub mod percent_alert;
pub mod portfolio;
pub mod price_alert;
pub mod search;

use serde::Deserialize;

use crate::config::{require_min_len, AlertDelivery};
use crate::error::ConfigError;
use crate::models::{CurrencyCode, PriceMap, PriceRecord};

/// Résultat d'une commande
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Texte à afficher sur stdout (vide = rien à afficher)
    pub output: String,

    /// Alerte à transmettre par email (sendEmail actif et alerte déclenchée)
    pub notification: Option<Notification>,
}

impl Outcome {
    pub fn print(output: String) -> Self {
        Self {
            output,
            notification: None,
        }
    }
}

/// Message d'alerte destiné à l'envoi par email
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subject: &'static str,
    pub body: String,
}

impl Notification {
    /// Notification seulement si l'alerte est déclenchée et l'email demandé
    pub fn when(
        triggered: bool,
        delivery: &AlertDelivery,
        subject: &'static str,
        body: &str,
    ) -> Option<Self> {
        (triggered && delivery.send_email).then(|| Self {
            subject,
            body: body.to_string(),
        })
    }
}

/// Couple (crypto, devise) surveillé par les commandes d'alerte
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedCoin {
    pub coin_id: String,
    pub currency: CurrencyCode,
}

impl WatchedCoin {
    pub(crate) fn validate_at(&self, index: usize) -> Result<(), ConfigError> {
        require_min_len(format!("coins -> {} -> coinId", index), &self.coin_id, 1)?;
        require_min_len(format!("coins -> {} -> currency", index), self.currency.as_str(), 3)
    }
}

/// Enregistrement de prix d'un id tel qu'écrit dans la config
pub(crate) fn record_of<'a>(prices: &'a PriceMap, coin_id: &str) -> Option<&'a PriceRecord> {
    prices.get(&coin_id.trim().to_lowercase())
}

/// Prix d'un id dans une devise
pub(crate) fn price_of(prices: &PriceMap, coin_id: &str, currency: &CurrencyCode) -> Option<f64> {
    record_of(prices, coin_id).and_then(|record| record.price(currency))
}

/// Ids et devises distincts, dans l'ordre de première apparition
pub(crate) fn distinct<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.iter().any(|s: &String| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

// ============================================================================
// Fixtures de test partagées
// ============================================================================
