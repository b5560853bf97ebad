// ============================================================================
// PriceFetcher : prix courants pour un ensemble d'ids et de devises
// ============================================================================
// Une seule requête groupée pour tous les ids et toutes les devises.
//
// Vérifications (grossières) :
// 1. Couverture : nombre d'entrées retournées == nombre d'ids demandés.
//    L'API omet silencieusement les ids inconnus, ce test les attrape.
// 2. Devises : seul le premier enregistrement est inspecté
//    (validate_currency_prices, appelée séparément par les commandes).
// ============================================================================

use std::collections::BTreeSet;

use tracing::{debug, info, instrument, warn};

use crate::api::coingecko::simple_price_url;
use crate::api::JsonSource;
use crate::error::{ApiError, PriceError, PriceResult};
use crate::models::{CurrencyCode, PriceMap};

/// Récupère les prix via l'endpoint /simple/price
pub struct PriceFetcher<S> {
    source: S,
    base_url: String,
}

impl<S: JsonSource> PriceFetcher<S> {
    pub fn new(source: S, base_url: impl Into<String>) -> Self {
        Self {
            source,
            base_url: base_url.into(),
        }
    }

    /// Prix de chaque id dans chaque devise, variation 24h incluse.
    ///
    /// Les entrées sont normalisées en minuscules et dédupliquées.
    /// Échoue avec `IncompleteCoverage` si un id manque dans la réponse :
    /// aucun résultat partiel n'est retourné.
    #[instrument(skip_all, fields(ids = ids.len(), currencies = currencies.len()))]
    pub async fn fetch_prices<I, C>(&self, ids: &[I], currencies: &[C]) -> PriceResult<PriceMap>
    where
        I: AsRef<str>,
        C: AsRef<str>,
    {
        let id_set: BTreeSet<String> = ids
            .iter()
            .map(|id| id.as_ref().trim().to_lowercase())
            .collect();
        let currency_set: BTreeSet<CurrencyCode> = currencies
            .iter()
            .map(|code| CurrencyCode::new(code.as_ref()))
            .collect();

        let url = simple_price_url(&self.base_url, &id_set, &currency_set);
        debug!(url = %url, "Built price request");

        let raw = self.source.get_json(&url).await?;
        let prices: PriceMap =
            serde_json::from_value(raw).map_err(|e| ApiError::Unexpected(e.to_string()))?;

        if prices.len() != id_set.len() {
            let missing: Vec<&String> = id_set.iter().filter(|id| !prices.contains_key(*id)).collect();
            warn!(?missing, "Price response does not cover every requested id");
            return Err(PriceError::IncompleteCoverage {
                requested: id_set.len(),
                returned: prices.len(),
            });
        }

        info!(coins = prices.len(), "Fetched prices");
        Ok(prices)
    }

    /// `fetch_prices` suivi de `validate_currency_prices`
    pub async fn fetch_validated_prices<I, C>(
        &self,
        ids: &[I],
        currencies: &[C],
    ) -> PriceResult<PriceMap>
    where
        I: AsRef<str>,
        C: AsRef<str>,
    {
        let prices = self.fetch_prices(ids, currencies).await?;
        validate_currency_prices(&prices, currencies)?;
        Ok(prices)
    }
}

/// Vérifie que chaque devise figure dans le premier enregistrement retourné.
///
/// Seul le premier enregistrement (plus petit id) sert d'échantillon : une
/// devise manquante sur une autre crypto n'est pas détectée ici.
pub fn validate_currency_prices<C: AsRef<str>>(prices: &PriceMap, currencies: &[C]) -> PriceResult<()> {
    let Some((first_id, first)) = prices.iter().next() else {
        return Ok(());
    };

    for code in currencies {
        let currency = CurrencyCode::new(code.as_ref());
        if !first.has_currency(&currency) {
            warn!(coin = %first_id, currency = %currency, "Currency missing from price data");
            return Err(PriceError::MissingCurrency {
                currency: currency.display(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Faux /simple/price : réponse fixe, mémorise les URLs demandées
    #[derive(Clone)]
    struct FakePriceApi {
        response: Result<Value, u16>,
        urls: Arc<Mutex<Vec<String>>>,
    }

    impl FakePriceApi {
        fn returning(response: Value) -> Self {
            Self {
                response: Ok(response),
                urls: Arc::default(),
            }
        }

        fn status(code: u16) -> Self {
            Self {
                response: Err(code),
                urls: Arc::default(),
            }
        }

        fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    impl JsonSource for FakePriceApi {
        async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
            self.urls.lock().unwrap().push(url.to_string());
            match &self.response {
                Ok(value) => Ok(value.clone()),
                Err(status) => Err(ApiError::Http {
                    status: *status,
                    reason: "Too Many Requests".to_string(),
                }),
            }
        }
    }

    fn market() -> Value {
        json!({
            "bitcoin": {"aud": 100000, "aud_24h_change": 10.78, "btc": 1, "btc_24h_change": 0.0},
            "ethereum": {"aud": 5000, "aud_24h_change": -0.53, "btc": 0.04779493, "btc_24h_change": -1.2},
            "ripple": {"aud": 0.75, "aud_24h_change": -1.23, "btc": 0.00000814, "btc_24h_change": 2.0}
        })
    }

    #[tokio::test]
    async fn test_returns_every_requested_id() {
        let api = FakePriceApi::returning(market());
        let fetcher = PriceFetcher::new(api, "https://api.test/v3");

        let prices = fetcher
            .fetch_prices(&["bitcoin", "ethereum", "ripple"], &["aud", "btc"])
            .await
            .unwrap();

        let keys: Vec<&str> = prices.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["bitcoin", "ethereum", "ripple"]);
        let aud = CurrencyCode::new("aud");
        assert_eq!(prices["ripple"].price(&aud), Some(0.75));
        assert_eq!(prices["ethereum"].change_24h(&aud), Some(-0.53));
    }

    #[tokio::test]
    async fn test_single_batched_request_with_normalized_inputs() {
        let api = FakePriceApi::returning(market());
        let fetcher = PriceFetcher::new(api.clone(), "https://api.test/v3");

        fetcher
            .fetch_prices(
                &["Ripple", "bitcoin", "BITCOIN", "ethereum"],
                &["AUD", "aud", "BTC"],
            )
            .await
            .unwrap();

        let urls = api.urls();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].contains("ids=bitcoin,ethereum,ripple&"));
        assert!(urls[0].contains("vs_currencies=aud,btc&"));
    }

    #[tokio::test]
    async fn test_unknown_id_is_incomplete_coverage() {
        let api = FakePriceApi::returning(market());
        let fetcher = PriceFetcher::new(api, "https://api.test/v3");

        let err = fetcher
            .fetch_prices(&["bitcoin", "ethereum", "ripple", "not-a-coin"], &["aud"])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PriceError::IncompleteCoverage { requested: 4, returned: 3 }
        ));
    }

    #[tokio::test]
    async fn test_http_failure_propagates() {
        let fetcher = PriceFetcher::new(FakePriceApi::status(429), "https://api.test/v3");

        let err = fetcher.fetch_prices(&["bitcoin"], &["aud"]).await.unwrap_err();
        assert!(matches!(err, PriceError::Api(ApiError::Http { status: 429, .. })));
    }

    #[tokio::test]
    async fn test_malformed_body_is_unexpected_failure() {
        let api = FakePriceApi::returning(json!({"bitcoin": "not an object"}));
        let fetcher = PriceFetcher::new(api, "https://api.test/v3");

        let err = fetcher.fetch_prices(&["bitcoin"], &["aud"]).await.unwrap_err();
        assert!(matches!(err, PriceError::Api(ApiError::Unexpected(_))));
    }

    #[tokio::test]
    async fn test_missing_currency_detected_on_first_record() {
        let api = FakePriceApi::returning(market());
        let fetcher = PriceFetcher::new(api, "https://api.test/v3");

        let err = fetcher
            .fetch_validated_prices(&["bitcoin", "ethereum", "ripple"], &["aud", "usd"])
            .await
            .unwrap_err();

        match err {
            PriceError::MissingCurrency { currency } => assert_eq!(currency, "USD"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_currency_check_only_samples_first_record() {
        let prices: PriceMap = serde_json::from_value(json!({
            "bitcoin": {"aud": 1.0, "usd": 1.0},
            "ethereum": {"aud": 1.0}
        }))
        .unwrap();

        assert!(validate_currency_prices(&prices, &["aud", "usd"]).is_ok());
        assert!(validate_currency_prices(&PriceMap::new(), &["aud"]).is_ok());
    }
}
