// ============================================================================
// Structure : CurrencyCode
// ============================================================================
// Code de devise (fiat ou crypto) insensible à la casse :
// minuscules en interne, majuscules à l'affichage.
// ============================================================================

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Code de devise normalisé (ex: "aud", "btc")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_lowercase())
    }

    /// Forme utilisée par l'API et les clés de PriceRecord
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Forme affichée (ex: "AUD")
    pub fn display(&self) -> String {
        self.0.to_uppercase()
    }

    /// Clé de la variation 24h dans la réponse de l'API (ex: "aud_24h_change")
    pub fn change_key(&self) -> String {
        format!("{}_24h_change", self.0)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for CurrencyCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CurrencyCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(&raw))
    }
}
