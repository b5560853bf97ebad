// ============================================================================
// Module : api
// ============================================================================
// Accès HTTP à l'API de prix (client générique + endpoints CoinGecko)
// ============================================================================

pub mod client;    // Requête GET -> JSON, taxonomie d'erreurs
pub mod coingecko; // Construction des URLs

// Re-export des éléments principaux
pub use client::{HttpClient, JsonSource, DEFAULT_TIMEOUT};
pub use coingecko::DEFAULT_API_URL;
