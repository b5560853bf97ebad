// ============================================================================
// Structure : App
// ============================================================================
// Contexte partagé par toutes les commandes :
// - PriceFetcher : prix courants
// - CoinCatalogCache : id -> symbole / nom
// - répertoire de cache (catalogue + historique des alertes)
//
// PATTERN : les services sont génériques sur leurs sources (HTTP, stockage,
// horloge) ; la production utilise HttpClient / FileStore / SystemClock,
// les tests des faux en mémoire.
// ============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::api::{HttpClient, JsonSource, DEFAULT_API_URL, DEFAULT_TIMEOUT};
use crate::cache::{
    CacheStore, Clock, CoinCatalogCache, FileStore, SystemClock, CATALOG_CACHE_FILE,
};
use crate::error::ApiError;
use crate::models::Catalog;
use crate::prices::PriceFetcher;
use crate::ui::MISSING_SYMBOL;

/// Paramètres du processus (issus de la ligne de commande / l'environnement)
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub cache_dir: PathBuf,
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cache_dir: default_cache_dir(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Répertoire de cache par défaut : <cache utilisateur>/coinwatch, sinon ./cache
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("coinwatch"))
        .unwrap_or_else(|| PathBuf::from("./cache"))
}

/// Services utilisés par les commandes
pub struct App<S, T = FileStore, C = SystemClock> {
    pub prices: PriceFetcher<S>,
    pub catalog: CoinCatalogCache<S, T, C>,
    cache_dir: PathBuf,
}

impl App<HttpClient> {
    /// Services de production : HTTP réel, cache fichier, horloge système
    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        let client = HttpClient::new(settings.timeout)?;
        let store = FileStore::in_dir(&settings.cache_dir, CATALOG_CACHE_FILE);

        info!(
            api_url = %settings.api_url,
            cache_dir = ?settings.cache_dir,
            timeout_secs = settings.timeout.as_secs(),
            "Services initialised"
        );

        Ok(Self::new(
            client.clone(),
            client,
            &settings.api_url,
            store,
            SystemClock,
            settings.cache_dir.clone(),
        ))
    }
}

impl<S, T, C> App<S, T, C>
where
    S: JsonSource,
    T: CacheStore,
    C: Clock,
{
    pub fn new(
        price_source: S,
        catalog_source: S,
        api_url: &str,
        catalog_store: T,
        clock: C,
        cache_dir: PathBuf,
    ) -> Self {
        Self {
            prices: PriceFetcher::new(price_source, api_url),
            catalog: CoinCatalogCache::new(catalog_source, api_url, catalog_store, clock),
            cache_dir,
        }
    }

    /// Répertoire des fichiers de cache (catalogue, historique)
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

/// Symbole en majuscules ou placeholder si l'id est absent du catalogue
pub fn symbol_or_placeholder(catalog: &Catalog, id: &str) -> String {
    catalog
        .symbol(id)
        .unwrap_or_else(|| MISSING_SYMBOL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CoinCatalogEntry;

    #[test]
    fn test_symbol_placeholder() {
        let catalog = Catalog::from_entries(vec![CoinCatalogEntry::new("bitcoin", "btc", "Bitcoin")]);
        assert_eq!(symbol_or_placeholder(&catalog, "bitcoin"), "BTC");
        assert_eq!(symbol_or_placeholder(&catalog, "nope"), "?");
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.timeout, DEFAULT_TIMEOUT);
        assert!(settings.cache_dir.ends_with("coinwatch") || settings.cache_dir.ends_with("cache"));
    }
}
