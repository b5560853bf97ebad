// ============================================================================
// Commande : search
// ============================================================================
// Retrouve les ids CoinGecko correspondant à un symbole (ex: "btc").
// Plusieurs cryptos partagent souvent un symbole : la liste est numérotée
// et précédée d'un avertissement.
// ============================================================================

use anyhow::Result;
use crossterm::style::Stylize;
use tracing::{debug, instrument};

use crate::api::JsonSource;
use crate::app::App;
use crate::cache::{CacheStore, Clock};
use crate::commands::Outcome;
use crate::models::{Catalog, CoinCatalogEntry};

/// Entrées dont le symbole correspond (insensible à la casse), triées par id
pub fn search_coins(symbol: &str, catalog: &Catalog) -> Vec<CoinCatalogEntry> {
    let symbol = symbol.trim().to_lowercase();
    let mut matches: Vec<CoinCatalogEntry> = catalog
        .iter()
        .filter(|entry| entry.symbol.to_lowercase() == symbol)
        .cloned()
        .collect();
    matches.sort_by(|a, b| a.id.cmp(&b.id));
    matches
}

#[instrument(skip(app))]
pub async fn run<S, T, C>(app: &App<S, T, C>, symbol: &str) -> Result<Outcome>
where
    S: JsonSource,
    T: CacheStore,
    C: Clock,
{
    let catalog = app.catalog.get_catalog().await?;
    let matches = search_coins(symbol, catalog);
    debug!(count = matches.len(), "Search finished");
    Ok(Outcome::print(render(&matches)))
}

/// Texte affiché pour les résultats de recherche
pub fn render(matches: &[CoinCatalogEntry]) -> String {
    match matches {
        [] => "No matching cryptocurrencies found.".to_string(),
        [coin] => format!(
            "Only one cryptocurrency found: {}\nPlease record this ID for use in your config files.",
            coin_line(coin)
        ),
        _ => {
            let mut lines = vec![
                "Multiple cryptocurrencies found. Please refer to the following list to identify \
                 the correct one and record the ID for use in your config files."
                    .to_string(),
                format!(
                    "{} Be cautious of meme or scam coins that might use the same symbol as \
                     legitimate coins. Click on the provided link to verify the correct coin.",
                    "Warning:".red()
                ),
            ];
            lines.extend(
                matches
                    .iter()
                    .enumerate()
                    .map(|(i, coin)| format!("{}. {}", i + 1, coin_line(coin))),
            );
            lines.join("\n")
        }
    }
}

fn coin_line(coin: &CoinCatalogEntry) -> String {
    format!(
        "{} (Symbol: {}, ID: {}, Link: {})",
        coin.name,
        coin.symbol.to_uppercase(),
        coin.id.as_str().green(),
        coin.link()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{temp_dir, test_app};

    fn catalog() -> Catalog {
        Catalog::from_entries(vec![
            CoinCatalogEntry::new("bitcoin", "btc", "Bitcoin"),
            CoinCatalogEntry::new("bitcoin-on-base", "BTC", "Bitcoin on Base"),
            CoinCatalogEntry::new("ethereum", "eth", "Ethereum"),
        ])
    }

    #[test]
    fn test_search_is_case_insensitive_and_sorted() {
        let ids: Vec<String> = search_coins("Btc", &catalog())
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        assert_eq!(ids, vec!["bitcoin", "bitcoin-on-base"]);
        assert!(search_coins("doge", &catalog()).is_empty());
    }

    #[test]
    fn test_render_single_match() {
        let output = render(&search_coins("eth", &catalog()));
        assert!(output.starts_with("Only one cryptocurrency found: Ethereum (Symbol: ETH, ID: "));
        assert!(output.contains("ethereum"));
        assert!(output.contains("Link: https://www.coingecko.com/en/coins/ethereum)"));
        assert!(output.ends_with("Please record this ID for use in your config files."));
    }

    #[test]
    fn test_render_no_match() {
        assert_eq!(render(&[]), "No matching cryptocurrencies found.");
    }

    #[tokio::test]
    async fn test_multiple_matches_are_numbered() {
        let app = test_app(temp_dir("search"));
        let outcome = run(&app, "btc").await.unwrap();
        let lines: Vec<&str> = outcome.output.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Multiple cryptocurrencies found."));
        assert!(lines[1].contains("Be cautious of meme or scam coins"));
        assert!(lines[2].starts_with("1. Bitcoin (Symbol: BTC"));
        assert!(lines[3].starts_with("2. Bitcoin on Base (Symbol: BTC"));
    }
}
