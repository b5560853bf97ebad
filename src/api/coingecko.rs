// ============================================================================
// API : endpoints CoinGecko
// ============================================================================
// - /coins/list : catalogue complet [{id, symbol, name}, ...]
// - /simple/price : prix groupés pour plusieurs ids et devises
// ============================================================================

use std::collections::BTreeSet;

use crate::models::CurrencyCode;

/// URL de base de l'API publique
pub const DEFAULT_API_URL: &str = "https://api.coingecko.com/api/v3";

/// URL du catalogue complet
pub fn coin_list_url(base_url: &str) -> String {
    format!("{}/coins/list", base_url.trim_end_matches('/'))
}

/// URL de la requête de prix groupée : une seule requête pour tous les ids,
/// variation 24h incluse, market cap et volume exclus.
pub fn simple_price_url(
    base_url: &str,
    ids: &BTreeSet<String>,
    currencies: &BTreeSet<CurrencyCode>,
) -> String {
    let ids_str = ids.iter().map(String::as_str).collect::<Vec<_>>().join(",");
    let currencies_str = currencies
        .iter()
        .map(CurrencyCode::as_str)
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "{}/simple/price?ids={}&vs_currencies={}&include_market_cap=false&include_24hr_vol=false&include_24hr_change=true",
        base_url.trim_end_matches('/'),
        ids_str,
        currencies_str
    )
}
