// ============================================================================
// TextTable : tableau texte pour la sortie terminal / les alertes
// ============================================================================
// Rendu en grille ASCII :
//
// +----------+-----------------+
// | Currency | Currency Amount |
// +----------+-----------------+
// |   AUD    |   $100,000.00   |
// +----------+-----------------+
//
// Les cellules sont centrées ; la largeur se compte en caractères
// (pas en octets) pour les symboles € £ ¥.
// ============================================================================

use std::fmt;

/// Tableau avec une ligne d'en-tête et des lignes de cellules texte
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<H: Into<String>>(headers: impl IntoIterator<Item = H>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Ajoute une ligne ; complétée par des cellules vides si trop courte
    pub fn add_row<C: Into<String>>(&mut self, cells: impl IntoIterator<Item = C>) {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len().max(row.len()), String::new());
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        (0..columns)
            .map(|col| {
                std::iter::once(&self.headers)
                    .chain(self.rows.iter())
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

fn separator(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (col, width) in widths.iter().enumerate() {
        let cell = cells.get(col).map(String::as_str).unwrap_or("");
        let excess = width - cell.chars().count();
        let left = excess / 2;
        let right = excess - left;
        line.push_str(&format!(" {}{}{} |", " ".repeat(left), cell, " ".repeat(right)));
    }
    line
}

impl fmt::Display for TextTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();
        let border = separator(&widths);

        writeln!(f, "{}", border)?;
        writeln!(f, "{}", render_row(&self.headers, &widths))?;
        writeln!(f, "{}", border)?;
        for row in &self.rows {
            writeln!(f, "{}", render_row(row, &widths))?;
        }
        write!(f, "{}", border)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_grid() {
        let mut table = TextTable::new(["Currency", "Symbol"]);
        table.add_row(["AUD", "BTC"]);

        let expected = "\
+----------+--------+
| Currency | Symbol |
+----------+--------+
|   AUD    |  BTC   |
+----------+--------+";
        assert_eq!(table.to_string(), expected);
    }

    #[test]
    fn test_width_counts_characters() {
        let mut table = TextTable::new(["Price"]);
        table.add_row(["€1.00"]);
        let rendered = table.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0].chars().count(), lines[3].chars().count());
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut table = TextTable::new(["A", "B"]);
        table.add_row(["x"]);
        assert_eq!(table.rows()[0], vec!["x".to_string(), String::new()]);
        assert!(!table.is_empty());
    }
}
