//! Cell values and declared column types

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Declared type of a column. Fixed for the lifetime of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Boolean,
    /// Absolute magnitude rendered as 0..=100 against a per-column scale.
    Progress,
    /// Passed through untouched.
    Opaque,
}

impl ColumnType {
    /// Value reported for a pull that cannot be resolved.
    pub fn zero_value(self) -> CellValue {
        match self {
            ColumnType::Text => CellValue::Text(String::new()),
            ColumnType::Integer | ColumnType::Progress => CellValue::Integer(0),
            ColumnType::Boolean => CellValue::Boolean(false),
            ColumnType::Opaque => CellValue::Opaque(serde_json::Value::Null),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Boolean => "boolean",
            ColumnType::Progress => "progress",
            ColumnType::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

/// A single stored or reported cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Opaque(serde_json::Value),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Canonical string form used by filtering and lexicographic sorting.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Empty => Cow::Borrowed(""),
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
            CellValue::Integer(i) => Cow::Owned(i.to_string()),
            CellValue::Number(n) => Cow::Owned(n.to_string()),
            CellValue::Boolean(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            CellValue::Opaque(serde_json::Value::String(s)) => Cow::Borrowed(s.as_str()),
            CellValue::Opaque(serde_json::Value::Null) => Cow::Borrowed(""),
            CellValue::Opaque(other) => Cow::Owned(other.to_string()),
        }
    }

    /// Finite numeric interpretation, if the value has one.
    ///
    /// Booleans are not numeric; a boolean column sorts as text.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Integer(i) => *i as f64,
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Opaque(serde_json::Value::Number(n)) => n.as_f64()?,
            CellValue::Opaque(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok()?,
            CellValue::Empty | CellValue::Boolean(_) | CellValue::Opaque(_) => return None,
        };
        n.is_finite().then_some(n)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Boolean(b) => *b,
            CellValue::Integer(i) => *i != 0,
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::Text(s) => text_is_truthy(s),
            CellValue::Opaque(value) => match value {
                serde_json::Value::Null => false,
                serde_json::Value::Bool(b) => *b,
                serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
                serde_json::Value::String(s) => text_is_truthy(s),
                serde_json::Value::Array(items) => !items.is_empty(),
                serde_json::Value::Object(map) => !map.is_empty(),
            },
        }
    }

    /// Integer coercion used by `Integer` columns. Non-numeric values become 0.
    pub fn to_integer(&self) -> i64 {
        match self {
            CellValue::Integer(i) => *i,
            CellValue::Boolean(b) => i64::from(*b),
            other => other.as_number().map(|n| n.round() as i64).unwrap_or(0),
        }
    }

    /// Present this stored value the way a column of `column_type` reports it.
    ///
    /// `progress_max` is only consulted for `Progress` columns.
    pub fn format_as(&self, column_type: ColumnType, progress_max: f64) -> CellValue {
        match column_type {
            ColumnType::Text => CellValue::Text(self.as_text().into_owned()),
            ColumnType::Integer => CellValue::Integer(self.to_integer()),
            ColumnType::Boolean => CellValue::Boolean(self.is_truthy()),
            ColumnType::Progress => CellValue::Integer(progress_percent(self, progress_max)),
            ColumnType::Opaque => self.clone(),
        }
    }

    /// Convert a value written through the grid into its stored form.
    ///
    /// Progress writes are percentages and are scaled back to the column's
    /// absolute magnitude.
    pub fn coerce_for_write(self, column_type: ColumnType, progress_max: f64) -> CellValue {
        match column_type {
            ColumnType::Text => CellValue::Text(self.as_text().into_owned()),
            ColumnType::Integer => CellValue::Integer(self.to_integer()),
            ColumnType::Boolean => CellValue::Boolean(self.is_truthy()),
            ColumnType::Progress => {
                let percent = self.as_number().unwrap_or(0.0).clamp(0.0, 100.0);
                CellValue::Number(percent * progress_max / 100.0)
            }
            ColumnType::Opaque => self,
        }
    }
}

fn text_is_truthy(s: &str) -> bool {
    let trimmed = s.trim();
    !(trimmed.is_empty() || trimmed == "0" || trimmed.eq_ignore_ascii_case("false"))
}

/// `min(100, max(0, round(value / max * 100)))`; non-numeric values read as 0.
pub fn progress_percent(value: &CellValue, progress_max: f64) -> i64 {
    if !(progress_max.is_finite() && progress_max > 0.0) {
        return 0;
    }
    match value.as_number() {
        Some(n) => (n * 100.0 / progress_max).round().clamp(0.0, 100.0) as i64,
        None => 0,
    }
}

/// Ordering used by the sort stage.
///
/// Both sides numeric: numeric comparison. Otherwise case-insensitive
/// comparison of the canonical strings.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => {
            let left = a.as_text().to_lowercase();
            let right = b.as_text().to_lowercase();
            left.cmp(&right)
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        CellValue::Opaque(value)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_finite_cell() -> impl Strategy<Value = CellValue> {
        prop_oneof![
            Just(CellValue::Empty),
            "[a-zA-Z0-9 .-]{0,8}".prop_map(CellValue::Text),
            any::<i64>().prop_map(CellValue::Integer),
            (-1.0e9f64..1.0e9).prop_map(CellValue::Number),
            any::<bool>().prop_map(CellValue::Boolean),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Integers compare the same in both directions.
        #[test]
        fn prop_compare_integers_antisymmetric(a in any::<i64>(), b in any::<i64>()) {
            let (x, y) = (CellValue::Integer(a), CellValue::Integer(b));
            prop_assert_eq!(compare_cells(&x, &y), compare_cells(&y, &x).reverse());
            prop_assert_eq!(compare_cells(&x, &y), (a as f64).total_cmp(&(b as f64)));
        }

        /// Text compares the same in both directions, numeric or not.
        #[test]
        fn prop_compare_text_antisymmetric(a in "[a-zA-Z0-9]{0,6}", b in "[a-zA-Z0-9]{0,6}") {
            let (x, y) = (CellValue::text(a), CellValue::text(b));
            prop_assert_eq!(compare_cells(&x, &y), compare_cells(&y, &x).reverse());
            prop_assert_eq!(compare_cells(&x, &x), Ordering::Equal);
        }

        /// The rendered percentage never leaves 0..=100.
        #[test]
        fn prop_progress_percent_in_range(value in arb_finite_cell(), max in 0.001f64..1.0e7) {
            let percent = progress_percent(&value, max);
            prop_assert!((0..=100).contains(&percent), "{} out of range", percent);
        }

        /// A percentage written through a progress column reads back unchanged.
        #[test]
        fn prop_progress_write_round_trips(percent in 0i64..=100, max in 1.0f64..1.0e7) {
            let stored = CellValue::Integer(percent).coerce_for_write(ColumnType::Progress, max);
            prop_assert_eq!(
                stored.format_as(ColumnType::Progress, max),
                CellValue::Integer(percent)
            );
        }
    }
}
