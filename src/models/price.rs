// ============================================================================
// Structure : PriceRecord
// ============================================================================
// Prix d'une crypto dans chaque devise demandée, plus la variation 24h
// ("<devise>_24h_change") pour chaque devise.
//
// Produit à chaque appel de PriceFetcher, jamais écrit sur disque.
// ============================================================================

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::models::CurrencyCode;

/// Prix par id de crypto. BTreeMap : ordre stable des ids (le "premier"
/// enregistrement est le plus petit id dans l'ordre lexicographique).
pub type PriceMap = BTreeMap<String, PriceRecord>;

/// Valeurs numériques retournées par l'API pour une crypto
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "HashMap<String, Option<f64>>")]
pub struct PriceRecord {
    values: HashMap<String, f64>,
}

impl From<HashMap<String, Option<f64>>> for PriceRecord {
    // L'API renvoie parfois null (ex: variation 24h inconnue) : on ignore
    fn from(raw: HashMap<String, Option<f64>>) -> Self {
        Self {
            values: raw
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key.to_lowercase(), v)))
                .collect(),
        }
    }
}

impl PriceRecord {
    /// Construit un enregistrement à partir de paires (clé, valeur)
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.to_lowercase(), value))
                .collect(),
        }
    }

    /// Prix dans la devise donnée
    pub fn price(&self, currency: &CurrencyCode) -> Option<f64> {
        self.values.get(currency.as_str()).copied()
    }

    /// Variation 24h en pourcentage (signée)
    pub fn change_24h(&self, currency: &CurrencyCode) -> Option<f64> {
        self.values.get(&currency.change_key()).copied()
    }

    pub fn has_currency(&self, currency: &CurrencyCode) -> bool {
        self.values.contains_key(currency.as_str())
    }
}
