//! Presentation of expense breakdowns: share labels, a text table and CSV.

use serde::Serialize;

use crate::advisor::ExpenseMap;

/// One category of a breakdown with its share of the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub category: String,
    pub amount: f64,
    /// Fraction of the total, in `0.0..=1.0`
    pub share: f64,
}

impl BreakdownRow {
    /// Chart legend label, e.g. `Food: 66.7%`.
    pub fn label(&self) -> String {
        format!("{}: {:.1}%", self.category, self.share * 100.0)
    }
}

/// Rows and total of an expense breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub rows: Vec<BreakdownRow>,
    pub total: f64,
}

impl Breakdown {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Human-readable table with a total line.
    pub fn format_table(&self) -> String {
        if self.rows.is_empty() {
            return "No expenses found.\n".to_string();
        }

        let width = self
            .rows
            .iter()
            .map(|r| r.category.chars().count())
            .max()
            .unwrap_or(0)
            .max("Category".len());

        let mut out = format!("{:<width$}  {:>12}  {:>6}\n", "Category", "Amount", "Share");
        for row in &self.rows {
            out.push_str(&format!(
                "{:<width$}  {:>12.2}  {:>5.1}%\n",
                row.category,
                row.amount,
                row.share * 100.0
            ));
        }
        out.push_str(&format!("\nTotal Expenses: ${:.2}\n", self.total));
        out
    }

    /// CSV with a `Category,Amount` header.
    pub fn to_csv(&self) -> String {
        let mut out = String::from("Category,Amount\n");
        for row in &self.rows {
            out.push_str(&csv_field(&row.category));
            out.push(',');
            out.push_str(&format!("{:?}", row.amount));
            out.push('\n');
        }
        out
    }
}

/// Build breakdown rows in category order.
///
/// # Example
/// ```
/// use finsight::advisor::ExpenseMap;
/// use finsight::report::breakdown;
///
/// let mut map = ExpenseMap::new();
/// map.insert("Food", 200.0);
/// map.insert("Rent", 100.0);
/// let b = breakdown(&map);
/// assert_eq!(b.rows[0].label(), "Food: 66.7%");
/// assert_eq!(b.total, 300.0);
/// ```
pub fn breakdown(expenses: &ExpenseMap) -> Breakdown {
    let total = expenses.total();
    let rows = expenses
        .iter()
        .map(|(category, amount)| BreakdownRow {
            category: category.to_string(),
            amount,
            share: if total > 0.0 { amount / total } else { 0.0 },
        })
        .collect();
    Breakdown { rows, total }
}

/// Quote a CSV field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExpenseMap {
        let mut map = ExpenseMap::new();
        map.insert("Rent", 1000.0);
        map.insert("Food", 200.0);
        map.insert("Fun", 50.5);
        map
    }

    #[test]
    fn test_breakdown_rows_and_total() {
        let b = breakdown(&sample());
        assert_eq!(b.total, 1250.5);
        assert_eq!(b.rows.len(), 3);
        assert_eq!(b.rows[0].category, "Food");
        let shares: f64 = b.rows.iter().map(|r| r.share).sum();
        assert!((shares - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_label() {
        let row = BreakdownRow {
            category: "Transport".into(),
            amount: 12.5,
            share: 0.125,
        };
        assert_eq!(row.label(), "Transport: 12.5%");
    }

    #[test]
    fn test_csv() {
        let csv = breakdown(&sample()).to_csv();
        assert_eq!(csv, "Category,Amount\nFood,200.0\nFun,50.5\nRent,1000.0\n");
    }

    #[test]
    fn test_csv_quoting() {
        let mut map = ExpenseMap::new();
        map.insert("Food, Drink", 10.0);
        map.insert("The \"Big\" One", 20.0);
        let csv = breakdown(&map).to_csv();
        assert!(csv.contains("\"Food, Drink\",10.0\n"));
        assert!(csv.contains("\"The \"\"Big\"\" One\",20.0\n"));
    }

    #[test]
    fn test_table() {
        let table = breakdown(&sample()).format_table();
        assert!(table.starts_with("Category"));
        assert!(table.contains("1000.00"));
        assert!(table.contains("Total Expenses: $1250.50"));
    }

    #[test]
    fn test_empty_breakdown() {
        let b = breakdown(&ExpenseMap::new());
        assert!(b.is_empty());
        assert_eq!(b.total, 0.0);
        assert_eq!(b.to_csv(), "Category,Amount\n");
        assert_eq!(b.format_table(), "No expenses found.\n");
    }
}
