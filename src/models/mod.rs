// ============================================================================
// Module : models
// ============================================================================
// Structures de données partagées par le cache, le fetcher et les commandes
// ============================================================================

pub mod coin;     // Catalogue CoinGecko (id -> symbole / nom)
pub mod currency; // Codes de devise normalisés
pub mod price;    // Prix + variation 24h par devise

// Re-export des structures principales pour simplifier les imports
pub use coin::{Catalog, CoinCatalogEntry, CoinField, CoinInfo};
pub use currency::CurrencyCode;
pub use price::{PriceMap, PriceRecord};
