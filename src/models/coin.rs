// ============================================================================
// Structure : CoinCatalogEntry / Catalog
// ============================================================================
// Une entrée du catalogue CoinGecko (id, symbole, nom) et le catalogue complet
// indexé par id.
//
// CONCEPTS RUST :
// 1. HashMap<String, T> : lookup O(1) par identifiant
// 2. Option<T> : "absent" explicite au lieu d'une exception
// 3. #[serde(transparent)] : le catalogue se sérialise comme sa map interne
// ============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Une crypto telle que publiée par l'API (ex: id "bitcoin", symbole "btc")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinCatalogEntry {
    /// Identifiant canonique, en minuscules
    pub id: String,

    /// Symbole du ticker tel que retourné par l'API (souvent en minuscules)
    pub symbol: String,

    /// Nom complet (ex: "Bitcoin")
    pub name: String,
}

impl CoinCatalogEntry {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
        }
    }

    /// Lien vers la page CoinGecko de la crypto
    pub fn link(&self) -> String {
        format!("https://www.coingecko.com/en/coins/{}", self.id)
    }
}

/// Champ demandé à `CoinCatalogCache::get_info`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinField {
    Symbol,
    Name,
    All,
}

/// Valeur retournée par `CoinCatalogCache::get_info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoinInfo {
    Symbol(String),
    Name(String),
    All(CoinCatalogEntry),
}

/// Catalogue complet : id -> entrée
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: HashMap<String, CoinCatalogEntry>,
}

impl Catalog {
    /// Construit le catalogue depuis la liste brute retournée par l'API.
    /// Un id dupliqué garde la dernière entrée.
    pub fn from_entries(entries: impl IntoIterator<Item = CoinCatalogEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.id.clone(), entry))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&CoinCatalogEntry> {
        self.entries.get(id)
    }

    /// Symbole en majuscules, None si l'id est inconnu
    pub fn symbol(&self, id: &str) -> Option<String> {
        self.get(id).map(|entry| entry.symbol.to_uppercase())
    }

    pub fn info(&self, id: &str, field: CoinField) -> Option<CoinInfo> {
        let entry = self.get(id)?;
        Some(match field {
            CoinField::Symbol => CoinInfo::Symbol(entry.symbol.clone()),
            CoinField::Name => CoinInfo::Name(entry.name.clone()),
            CoinField::All => CoinInfo::All(entry.clone()),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoinCatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
