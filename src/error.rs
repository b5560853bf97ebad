// ============================================================================
// Module : error
// ============================================================================
// Taxonomie des erreurs de la couche prix :
// - ApiError : transport / réponse HTTP
// - PriceError : validation des prix + persistance du cache
// - ConfigError : lecture et validation des fichiers de configuration
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère Display + std::error::Error
// - #[from] permet la conversion automatique avec l'opérateur ?
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Échec d'un appel à l'API de prix
#[derive(Debug, Error)]
pub enum ApiError {
    /// Hôte injoignable (DNS, connexion refusée, timeout)
    #[error("Failed to connect to API: {0}")]
    Connection(String),

    /// Le serveur a répondu avec un statut non-succès
    #[error("HTTP Error getting data from API: {status} - {reason}")]
    Http { status: u16, reason: String },

    /// Corps de réponse vide ou null
    #[error("No data returned from API")]
    EmptyResponse,

    /// Toute autre erreur, message d'origine conservé
    #[error("An unexpected error occurred getting data from API: {0}")]
    Unexpected(String),
}

/// Erreurs de la couche prix et du cache catalogue
#[derive(Debug, Error)]
pub enum PriceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// L'API a omis au moins un des identifiants demandés
    #[error(
        "Not all coin IDs were found in the API response ({returned} of {requested}). \
         Check that all coin IDs are valid. Run `coinwatch search` to find valid IDs."
    )]
    IncompleteCoverage { requested: usize, returned: usize },

    /// Une devise demandée est absente des données retournées
    #[error("Currency '{currency}' not found in price data")]
    MissingCurrency { currency: String },

    #[error("Failed to read cache file {}: {reason}", path.display())]
    CacheRead { path: PathBuf, reason: String },

    #[error("Failed to write cache file {}: {reason}", path.display())]
    CacheWrite { path: PathBuf, reason: String },
}

/// Erreurs de chargement d'un fichier de configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("The file '{}' does not exist.", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("Failed to decode JSON from the provided file: {0}")]
    Parse(String),

    /// Validation échouée sur un champ précis (ex: "purchases -> 1 -> buyUnits")
    #[error(
        "Configuration file validation failed at '{path}': {message}. \
         Look at the sample configs to see how to structure the configuration."
    )]
    Invalid { path: String, message: String },

    /// Liste principale vide (achats, avoirs, coins...)
    #[error("{0}")]
    Empty(String),
}

/// Alias pour les opérations de la couche prix
pub type PriceResult<T> = Result<T, PriceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message_keeps_status_and_reason() {
        let err = ApiError::Http {
            status: 429,
            reason: "Too Many Requests".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP Error getting data from API: 429 - Too Many Requests"
        );
    }

    #[test]
    fn test_api_error_converts_into_price_error() {
        let err: PriceError = ApiError::EmptyResponse.into();
        assert!(matches!(err, PriceError::Api(ApiError::EmptyResponse)));
        assert_eq!(err.to_string(), "No data returned from API");
    }

    #[test]
    fn test_config_invalid_names_path() {
        let err = ConfigError::Invalid {
            path: "holdings -> 0 -> units".to_string(),
            message: "must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("'holdings -> 0 -> units'"));
    }
}
