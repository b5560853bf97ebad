// ============================================================================
// Cache : catalogue des cryptos
// ============================================================================
// Le catalogue complet (plusieurs milliers d'entrées) change rarement :
// on le garde sur disque une semaine.
//
// Format du fichier :
//   {"data": {"<id>": {"id": ..., "symbol": ..., "name": ...}}, "timestamp": <secondes>}
//
// Cycle de vie :
// 1. Premier accès : lecture du fichier si âge < CACHE_EXPIRY_SECS
// 2. Sinon : appel /coins/list, réécriture du fichier
// 3. Ensuite : lecture seule en mémoire jusqu'à la fin du processus
// ============================================================================

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::api::coingecko::coin_list_url;
use crate::api::JsonSource;
use crate::cache::{CacheStore, Clock, FileStore, SystemClock};
use crate::error::{ApiError, PriceError, PriceResult};
use crate::models::{Catalog, CoinCatalogEntry, CoinField, CoinInfo};

/// Durée de validité du cache : 1 semaine
pub const CACHE_EXPIRY_SECS: f64 = 604_800.0;

/// Nom du fichier dans le répertoire de cache
pub const CATALOG_CACHE_FILE: &str = "coin_list_cache.json";

/// Contenu persisté
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    data: Catalog,
    timestamp: f64,
}

/// Catalogue id -> (symbole, nom) avec cache disque et expiration
pub struct CoinCatalogCache<S, T = FileStore, C = SystemClock> {
    source: S,
    base_url: String,
    store: T,
    clock: C,
    catalog: OnceCell<Catalog>,
}

impl<S, T, C> CoinCatalogCache<S, T, C>
where
    S: JsonSource,
    T: CacheStore,
    C: Clock,
{
    pub fn new(source: S, base_url: impl Into<String>, store: T, clock: C) -> Self {
        Self {
            source,
            base_url: base_url.into(),
            store,
            clock,
            catalog: OnceCell::new(),
        }
    }

    /// Catalogue complet. Chargé au plus une fois par processus.
    pub async fn get_catalog(&self) -> PriceResult<&Catalog> {
        self.catalog.get_or_try_init(|| self.load_or_refresh()).await
    }

    /// Symbole en majuscules, None si l'id est absent du catalogue
    pub async fn get_symbol(&self, id: &str) -> PriceResult<Option<String>> {
        Ok(self.get_catalog().await?.symbol(id))
    }

    /// Accès générique : symbole, nom ou entrée complète
    pub async fn get_info(&self, id: &str, field: CoinField) -> PriceResult<Option<CoinInfo>> {
        Ok(self.get_catalog().await?.info(id, field))
    }

    async fn load_or_refresh(&self) -> PriceResult<Catalog> {
        match self.read_cached()? {
            Some(catalog) => Ok(catalog),
            None => self.refresh().await,
        }
    }

    /// Lit le fichier de cache. Un fichier illisible ou corrompu est une
    /// erreur (pas de re-fetch silencieux).
    fn read_cached(&self) -> PriceResult<Option<Catalog>> {
        let Some(raw) = self.store.load()? else {
            return Ok(None);
        };

        let file: CacheFile = serde_json::from_str(&raw).map_err(|e| PriceError::CacheRead {
            path: self.store.location(),
            reason: e.to_string(),
        })?;

        let age = self.clock.now() - file.timestamp;
        if age < CACHE_EXPIRY_SECS {
            debug!(entries = file.data.len(), age_secs = age, "Using cached coin catalog");
            Ok(Some(file.data))
        } else {
            info!(age_secs = age, "Coin catalog cache expired");
            Ok(None)
        }
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn refresh(&self) -> PriceResult<Catalog> {
        let raw = self.source.get_json(&coin_list_url(&self.base_url)).await?;

        let entries: Vec<CoinCatalogEntry> =
            serde_json::from_value(raw).map_err(|e| ApiError::Unexpected(e.to_string()))?;
        let file = CacheFile {
            data: Catalog::from_entries(entries),
            timestamp: self.clock.now(),
        };

        let json = serde_json::to_string(&file).map_err(|e| PriceError::CacheWrite {
            path: self.store.location(),
            reason: e.to_string(),
        })?;
        self.store.save(&json)?;

        info!(entries = file.data.len(), "Coin catalog refreshed");
        Ok(file.data)
    }
}
