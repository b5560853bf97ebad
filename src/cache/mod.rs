// ============================================================================
// Module : cache
// ============================================================================
// Persistance JSON simple (catalogue des cryptos, historique des alertes)
//
// CONCEPT : injection de dépendances par traits
// - Clock : horloge (système ou figée en test, pour l'expiration sans sleep)
// - CacheStore : stockage (fichier ou mémoire, pour simuler un cache corrompu)
//
// Pas de verrou : un seul processus utilisateur à la fois est attendu.
// ============================================================================

pub mod catalog; // Cache du catalogue avec expiration
pub mod history; // Historique des seuils de price-alert

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{PriceError, PriceResult};

pub use catalog::{CoinCatalogCache, CACHE_EXPIRY_SECS, CATALOG_CACHE_FILE};
pub use history::{PriceHistory, PRICE_HISTORY_FILE};

// ============================================================================
// Horloge
// ============================================================================

/// Source du temps courant, en secondes (float) depuis l'epoch Unix
pub trait Clock {
    fn now(&self) -> f64;
}

/// Horloge système (chrono)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        chrono::Utc::now().timestamp_millis() as f64 / 1000.0
    }
}

/// Horloge figée
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}

// ============================================================================
// Stockage
// ============================================================================

/// Emplacement de stockage d'un document de cache
pub trait CacheStore {
    /// Contenu brut, None si rien n'a encore été écrit
    fn load(&self) -> PriceResult<Option<String>>;

    fn save(&self, contents: &str) -> PriceResult<()>;

    /// Chemin utilisé dans les messages d'erreur
    fn location(&self) -> PathBuf;
}

/// Fichier JSON sur disque. Le répertoire parent est créé si absent.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Fichier `file_name` dans le répertoire de cache `dir`
    pub fn in_dir(dir: &Path, file_name: &str) -> Self {
        Self::new(dir.join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for FileStore {
    fn load(&self) -> PriceResult<Option<String>> {
        if !self.path.exists() {
            debug!(path = ?self.path, "No cache file yet");
            return Ok(None);
        }

        std::fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|e| PriceError::CacheRead {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    fn save(&self, contents: &str) -> PriceResult<()> {
        let write_error = |e: std::io::Error| PriceError::CacheWrite {
            path: self.path.clone(),
            reason: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(&self.path, contents).map_err(write_error)?;

        debug!(path = ?self.path, bytes = contents.len(), "Cache file written");
        Ok(())
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}

/// Stockage en mémoire ; les clones partagent le même contenu
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// Contenu actuel (copie)
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|guard| guard.clone())
    }
}

impl CacheStore for MemoryStore {
    fn load(&self) -> PriceResult<Option<String>> {
        self.contents
            .lock()
            .map(|guard| guard.clone())
            .map_err(|e| PriceError::CacheRead {
                path: self.location(),
                reason: e.to_string(),
            })
    }

    fn save(&self, contents: &str) -> PriceResult<()> {
        let mut guard = self.contents.lock().map_err(|e| PriceError::CacheWrite {
            path: self.location(),
            reason: e.to_string(),
        })?;
        *guard = Some(contents.to_string());
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("<memory>")
    }
}
