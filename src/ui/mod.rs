// ============================================================================
// Module : ui
// ============================================================================
// Présentation terminal : formatage des montants et tableaux texte
// ============================================================================

pub mod format; // Montants, symboles de devise
pub mod table;  // Grille ASCII

pub use format::{currency_symbol, format_currency, format_grouped};
pub use table::TextTable;

/// Placeholder affiché quand un id n'a pas de symbole dans le catalogue
pub const MISSING_SYMBOL: &str = "?";
