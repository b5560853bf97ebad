// ============================================================================
// API Client : requêtes GET JSON
// ============================================================================
// Un seul appel, pas de retry : l'échec remonte immédiatement à l'appelant.
//
// CONCEPTS RUST :
// 1. Trait JsonSource : point d'injection, les tests fournissent un faux
// 2. async fn dans un trait : utilisé en générique (pas de dyn)
// 3. map_err : classe les erreurs reqwest dans la taxonomie ApiError
// ============================================================================

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::error::ApiError;

/// Timeout par défaut des requêtes HTTP
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("coinwatch/", env!("CARGO_PKG_VERSION"));

/// Source de documents JSON (HTTP en production, faux en test)
#[allow(async_fn_in_trait)]
pub trait JsonSource {
    async fn get_json(&self, url: &str) -> Result<Value, ApiError>;
}

/// Client HTTP basé sur reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Unexpected(e.to_string()))?;
        Ok(Self { client })
    }
}

impl JsonSource for HttpClient {
    #[instrument(skip(self))]
    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        debug!("Sending HTTP request");
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, "API returned error status");
            return Err(ApiError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        // Corps lu en entier : un corps vide n'est pas une erreur de décodage
        let body = response.bytes().await.map_err(classify)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ApiError::EmptyResponse);
        }

        let data: Value =
            serde_json::from_slice(&body).map_err(|e| ApiError::Unexpected(e.to_string()))?;
        if is_empty_payload(&data) {
            return Err(ApiError::EmptyResponse);
        }
        Ok(data)
    }
}

/// Transport (DNS, connexion, timeout) -> Connection, le reste -> Unexpected
fn classify(err: reqwest::Error) -> ApiError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        ApiError::Connection(err.to_string())
    } else {
        ApiError::Unexpected(err.to_string())
    }
}

/// Corps considéré comme vide : null, tableau / objet / chaîne vide
pub fn is_empty_payload(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
