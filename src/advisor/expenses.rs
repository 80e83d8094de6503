//! Expense map type.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Category name to positive spend amount.
///
/// Keys are case-sensitive; inserting an existing category overwrites it.
/// Iteration is in category order. Empty categories and amounts that are not
/// finite and positive never enter the map, whether inserted, collected or
/// deserialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExpenseMap {
    entries: BTreeMap<String, f64>,
}

impl ExpenseMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a category amount.
    ///
    /// Returns `false` and leaves the map untouched when the category is
    /// empty or the amount is not a finite positive number.
    pub fn insert(&mut self, category: impl Into<String>, amount: f64) -> bool {
        let category = category.into();
        if category.is_empty() || !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        self.entries.insert(category, amount);
        true
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.entries.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of all amounts.
    ///
    /// # Example
    /// ```
    /// use finsight::advisor::ExpenseMap;
    ///
    /// let mut map = ExpenseMap::new();
    /// map.insert("Food", 200.0);
    /// map.insert("Rent", 1000.0);
    /// assert_eq!(map.total(), 1200.0);
    /// ```
    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }
}

impl FromIterator<(String, f64)> for ExpenseMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (category, amount) in iter {
            map.insert(category, amount);
        }
        map
    }
}

impl<'de> Deserialize<'de> for ExpenseMap {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = BTreeMap::<String, f64>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_overwrites() {
        let mut map = ExpenseMap::new();
        map.insert("Food", 10.0);
        map.insert("Food", 25.0);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Food"), Some(25.0));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let mut map = ExpenseMap::new();
        map.insert("food", 1.0);
        map.insert("Food", 2.0);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("FOOD"), None);
    }

    #[test]
    fn test_empty_total() {
        let map = ExpenseMap::new();
        assert!(map.is_empty());
        assert_eq!(map.total(), 0.0);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let map: ExpenseMap = vec![("Rent".to_string(), 1000.0), ("Food".to_string(), 200.5)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Food":200.5,"Rent":1000.0}"#);
    }

    #[test]
    fn test_insert_rejects_non_positive_amounts() {
        let mut map = ExpenseMap::new();
        assert!(!map.insert("Refund", -5.0));
        assert!(!map.insert("Zero", 0.0));
        assert!(!map.insert("Broken", f64::NAN));
        assert!(!map.insert("Huge", f64::INFINITY));
        assert!(!map.insert("", 5.0));
        assert!(map.is_empty());

        assert!(map.insert("Food", 10.0));
        assert!(!map.insert("Food", -5.0));
        assert_eq!(map.get("Food"), Some(10.0));
    }

    #[test]
    fn test_collect_drops_invalid_amounts() {
        let map: ExpenseMap = vec![
            ("Rent".to_string(), 1000.0),
            ("Refund".to_string(), -5.0),
            ("Zero".to_string(), 0.0),
            ("Broken".to_string(), f64::NAN),
        ]
        .into_iter()
        .collect();
        assert_eq!(map.len(), 1);
        assert_eq!(map.total(), 1000.0);
    }

    #[test]
    fn test_deserialize_drops_invalid_amounts() {
        let map: ExpenseMap =
            serde_json::from_str(r#"{"Rent": 1000, "Refund": -5, "Zero": 0, "": 3}"#).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Rent"), Some(1000.0));
    }
}
