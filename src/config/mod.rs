// ============================================================================
// Module : config
// ============================================================================
// Chargement des fichiers de configuration JSON des commandes.
//
// CONCEPT : valider une seule fois, à la frontière
// - serde transforme le JSON en structures typées (champs en camelCase)
// - Validate::validate vérifie les contraintes (montants > 0, listes non vides...)
// - Le reste du code ne manipule que des configs valides
// ============================================================================

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::ConfigError;

/// Contraintes vérifiées après désérialisation
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Lit, désérialise et valide un fichier de configuration
#[instrument]
pub fn load_config<T>(path: &Path) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Validate,
{
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let config = parse_config::<T>(&raw)?;
    debug!("Config loaded and validated");
    Ok(config)
}

/// Désérialise et valide un document JSON déjà lu
pub fn parse_config<T>(raw: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Validate,
{
    let config: T = serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

// ============================================================================
// Livraison des alertes
// ============================================================================

/// Champs d'envoi par email communs aux commandes d'alerte.
/// L'envoi SMTP n'est pas implémenté : seuls les champs sont acceptés.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDelivery {
    #[serde(default)]
    pub send_email: bool,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub smtp: Option<SmtpSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for AlertDelivery {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.send_email {
            return Ok(());
        }

        match self.email.as_deref() {
            Some(email) if email.contains('@') => {}
            _ => return Err(invalid("email", "must be a valid email address when sendEmail is true")),
        }

        match &self.smtp {
            Some(smtp) if smtp.host.is_empty() => Err(invalid("smtp -> host", "should be non-empty")),
            Some(smtp) if smtp.port == 0 => Err(invalid("smtp -> port", "must be between 1 and 65535")),
            Some(_) => Ok(()),
            None => Err(invalid("smtp", "is required when sendEmail is true")),
        }
    }
}

// ============================================================================
// Helpers de validation
// ============================================================================

pub(crate) fn invalid(path: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        path: path.into(),
        message: message.into(),
    }
}

/// Valeur strictement positive
pub(crate) fn require_positive(path: impl Into<String>, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(path, format!("{} is less than or equal to the minimum of 0", value)))
    }
}

/// Valeur >= minimum
pub(crate) fn require_at_least(
    path: impl Into<String>,
    value: f64,
    minimum: f64,
) -> Result<(), ConfigError> {
    if value >= minimum {
        Ok(())
    } else {
        Err(invalid(path, format!("{} is less than the minimum of {}", value, minimum)))
    }
}

/// Chaîne d'au moins `min_len` caractères
pub(crate) fn require_min_len(
    path: impl Into<String>,
    value: &str,
    min_len: usize,
) -> Result<(), ConfigError> {
    if value.trim().chars().count() >= min_len {
        Ok(())
    } else {
        Err(invalid(path, format!("'{}' is too short (minimum {} characters)", value, min_len)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        coin_id: String,
        units: f64,
    }

    impl Validate for Sample {
        fn validate(&self) -> Result<(), ConfigError> {
            require_min_len("coinId", &self.coin_id, 1)?;
            require_positive("units", self.units)
        }
    }

    #[test]
    fn test_parse_and_validate() {
        let sample: Sample = parse_config(r#"{"coinId": "bitcoin", "units": 2}"#).unwrap();
        assert_eq!(sample.coin_id, "bitcoin");
        assert_eq!(sample.units, 2.0);
    }

    #[test]
    fn test_type_mismatch_is_parse_error() {
        let err = parse_config::<Sample>(r#"{"coinId": "bitcoin", "units": "two"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_constraint_violation_is_invalid() {
        let err = parse_config::<Sample>(r#"{"coinId": "bitcoin", "units": 0}"#).unwrap_err();
        match err {
            ConfigError::Invalid { path, .. } => assert_eq!(path, "units"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_config::<Sample>(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_delivery_requires_smtp_when_sending() {
        let delivery: AlertDelivery =
            serde_json::from_str(r#"{"sendEmail": true, "email": "me@example.com"}"#).unwrap();
        assert!(delivery.validate().is_err());

        let delivery: AlertDelivery = serde_json::from_str(
            r#"{"sendEmail": true, "email": "me@example.com",
                "smtp": {"host": "smtp.example.com", "port": 587, "username": "me", "password": "pw"}}"#,
        )
        .unwrap();
        assert!(delivery.validate().is_ok());
    }

    #[test]
    fn test_delivery_disabled_skips_checks() {
        assert!(AlertDelivery::default().validate().is_ok());
    }

    #[test]
    fn test_require_at_least() {
        assert!(require_at_least("increasePercent", 1.0, 1.0).is_ok());
        assert!(require_at_least("increasePercent", 0.5, 1.0).is_err());
    }
}
