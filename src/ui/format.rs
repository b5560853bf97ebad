// ============================================================================
// Formatage des montants
// ============================================================================
// Précision selon la magnitude :
// - |v| < 0.01      -> 8 décimales   (0.00500000)
// - 0.01 <= |v| < 1 -> 4 décimales   (0.5000)
// - |v| >= 1        -> 2 décimales + séparateur de milliers (123,456.00)
//
// Aucun symbole de devise n'est inclus : voir currency_symbol.
// ============================================================================

/// Formate un montant selon sa magnitude
pub fn format_currency(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude < 0.01 {
        format!("{:.8}", value)
    } else if magnitude < 1.0 {
        format!("{:.4}", value)
    } else {
        format_grouped(value, 2)
    }
}

/// Montant avec `decimals` décimales et séparateur de milliers
pub fn format_grouped(value: f64, decimals: usize) -> String {
    with_thousands_separator(&format!("{:.1$}", value, decimals))
}

/// Symbole d'une devise (insensible à la casse), chaîne vide si inconnue
pub fn currency_symbol(code: &str) -> &'static str {
    match code.to_uppercase().as_str() {
        "AUD" | "USD" | "CAD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        _ => "",
    }
}

/// Insère des virgules dans la partie entière d'un nombre déjà formaté
fn with_thousands_separator(formatted: &str) -> String {
    let (sign, digits) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (integer_part, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits, None),
    };

    let len = integer_part.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in integer_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}
