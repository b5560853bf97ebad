// ============================================================================
// Ligne de commande
// ============================================================================
// clap (derive) : options globales + une sous-commande par outil.
// Les options globales peuvent venir de l'environnement (COINWATCH_*).
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueHint};

use coinwatch::api::DEFAULT_API_URL;
use coinwatch::app::{default_cache_dir, Settings};

/// Outils de suivi de prix crypto (CoinGecko)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Répertoire des fichiers de cache (catalogue, historique des alertes)
    #[arg(long, global = true, env = "COINWATCH_CACHE_DIR", value_hint = ValueHint::DirPath)]
    pub cache_dir: Option<PathBuf>,

    /// URL de base de l'API CoinGecko
    #[arg(long, global = true, env = "COINWATCH_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Timeout des requêtes HTTP, en secondes
    #[arg(long, global = true, env = "COINWATCH_TIMEOUT", default_value = "30")]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Cherche les ids correspondant à un symbole
    Search {
        /// Symbole (demandé sur stdin si absent)
        symbol: Option<String>,
    },

    /// Conversion montant fiat <-> unités
    FiatPurchase {
        #[arg(value_hint = ValueHint::FilePath)]
        config_file: PathBuf,
    },

    /// Achats dont le coût actuel passe sous le prix cible
    OptimalPurchase {
        #[arg(value_hint = ValueHint::FilePath)]
        config_file: PathBuf,
    },

    /// Échanges crypto -> crypto comparés à un objectif
    OptimalTrade {
        #[arg(value_hint = ValueHint::FilePath)]
        config_file: PathBuf,
    },

    /// Valorisation d'un portefeuille
    Portfolio {
        #[arg(value_hint = ValueHint::FilePath)]
        config_file: PathBuf,
    },

    /// Alerte de hausse de prix avec seuil glissant
    PriceAlert {
        #[arg(value_hint = ValueHint::FilePath)]
        config_file: PathBuf,
    },

    /// Alerte sur la variation 24h
    PercentAlert {
        #[arg(value_hint = ValueHint::FilePath)]
        config_file: PathBuf,
    },
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            api_url: self.api_url.trim_end_matches('/').to_string(),
            cache_dir: self.cache_dir.clone().unwrap_or_else(default_cache_dir),
            timeout: Duration::from_secs(self.timeout),
        }
    }
}
