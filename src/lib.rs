// ============================================================================
// coinwatch - Library
// ============================================================================
// Couche prix CoinGecko + commandes, exposées pour le binaire et les tests
// ============================================================================

pub mod api;       // Client HTTP + URLs CoinGecko
pub mod app;       // Services partagés par les commandes
pub mod cache;     // Cache catalogue + historique des alertes
pub mod commands;  // Une sous-commande par outil
pub mod config;    // Fichiers de configuration JSON
pub mod error;     // Erreurs typées (thiserror)
pub mod models;    // Structures de données
pub mod prices;    // Récupération et validation des prix
pub mod ui;        // Formatage texte (nombres, tableaux)
