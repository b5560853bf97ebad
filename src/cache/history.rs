// ============================================================================
// Cache : historique des seuils de price-alert
// ============================================================================
// Format : {"<coinId>-<devise>": <prix seuil>, ...}
// Un seuil absent vaut 0 : la première exécution alerte toujours.
// ============================================================================

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::cache::CacheStore;
use crate::error::{PriceError, PriceResult};
use crate::models::CurrencyCode;

/// Nom du fichier dans le répertoire de cache
pub const PRICE_HISTORY_FILE: &str = "coin_prices_cache.json";

/// Seuils de déclenchement par (crypto, devise)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    thresholds: BTreeMap<String, f64>,
}

impl PriceHistory {
    /// Clé persistée, ex: "bitcoin-aud"
    pub fn key(coin_id: &str, currency: &CurrencyCode) -> String {
        format!("{}-{}", coin_id, currency.as_str())
    }

    /// Charge l'historique ; vide si le fichier n'existe pas encore
    pub fn load(store: &impl CacheStore) -> PriceResult<Self> {
        let Some(raw) = store.load()? else {
            return Ok(Self::default());
        };

        let thresholds = serde_json::from_str(&raw).map_err(|e| PriceError::CacheRead {
            path: store.location(),
            reason: e.to_string(),
        })?;
        Ok(Self { thresholds })
    }

    /// Écrit l'historique complet (JSON indenté)
    pub fn save(&self, store: &impl CacheStore) -> PriceResult<()> {
        let json = serde_json::to_string_pretty(&self.thresholds).map_err(|e| {
            PriceError::CacheWrite {
                path: store.location(),
                reason: e.to_string(),
            }
        })?;
        store.save(&json)
    }

    /// Supprime les clés qui ne sont plus surveillées
    pub fn retain_keys(&mut self, active: &HashSet<String>) {
        let before = self.thresholds.len();
        self.thresholds.retain(|key, _| active.contains(key));
        let dropped = before - self.thresholds.len();
        if dropped > 0 {
            debug!(dropped, "Dropped stale price alert entries");
        }
    }

    /// Seuil de déclenchement ; 0 si la clé n'a jamais alerté
    pub fn threshold(&self, key: &str) -> f64 {
        self.thresholds.get(key).copied().unwrap_or(0.0)
    }

    /// Remplace le seuil d'une clé (prix × (1 + hausse))
    pub fn set_threshold(&mut self, key: String, price: f64) {
        self.thresholds.insert(key, price);
    }

    /// Nombre de clés suivies
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}
