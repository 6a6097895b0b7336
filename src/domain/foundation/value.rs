//! Field values and the form data they live in.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A value held by one field of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Bool(bool),
    Text(String),
    Integer(i64),
    Double(f64),
    DateTime(NaiveDateTime),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Numeric view used for limit checks.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(value) => Some(*value as f64),
            FieldValue::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Flattens a list into its elements; any other value yields itself.
    pub fn into_items(self) -> Vec<FieldValue> {
        match self {
            FieldValue::List(items) => items,
            other => vec![other],
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(value) => write!(f, "{}", value),
            FieldValue::Text(value) => write!(f, "{}", value),
            FieldValue::Integer(value) => write!(f, "{}", value),
            FieldValue::Double(value) => write!(f, "{}", value),
            FieldValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M")),
            FieldValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|item| item.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Double(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::DateTime(value)
    }
}

/// The values gathered so far, keyed by field name.
///
/// A field without an entry is unknown. The host owns this record and
/// persists it alongside the form state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<String, FieldValue>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(field.into(), value.into());
    }

    /// Marks the field unknown, returning any previous value.
    pub fn unset(&mut self, field: &str) -> Option<FieldValue> {
        self.0.remove(field)
    }

    pub fn is_unknown(&self, field: &str) -> bool {
        !self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builder-style setter for seeding data.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    mod field_value {
        use super::*;

        #[test]
        fn numeric_values_expose_f64() {
            assert_eq!(FieldValue::Integer(3).as_f64(), Some(3.0));
            assert_eq!(FieldValue::Double(2.5).as_f64(), Some(2.5));
            assert_eq!(FieldValue::from("x").as_f64(), None);
        }

        #[test]
        fn list_displays_comma_separated() {
            let value = FieldValue::List(vec!["Ham".into(), "Olives".into()]);
            assert_eq!(value.to_string(), "Ham, Olives");
        }

        #[test]
        fn date_time_displays_without_seconds() {
            let when = NaiveDate::from_ymd_opt(2026, 7, 3)
                .unwrap()
                .and_hms_opt(18, 30, 0)
                .unwrap();
            assert_eq!(FieldValue::DateTime(when).to_string(), "2026-07-03 18:30");
        }

        #[test]
        fn into_items_flattens_lists_only() {
            let list = FieldValue::List(vec![1i64.into(), 2i64.into()]);
            assert_eq!(list.into_items().len(), 2);
            assert_eq!(FieldValue::Bool(true).into_items(), vec![FieldValue::Bool(true)]);
        }

        #[test]
        fn serializes_with_type_tag() {
            let json = serde_json::to_string(&FieldValue::Integer(4)).unwrap();
            assert_eq!(json, r#"{"type":"integer","value":4}"#);
        }
    }

    mod form_data {
        use super::*;

        #[test]
        fn missing_field_is_unknown() {
            let data = FormData::new();
            assert!(data.is_unknown("size"));
        }

        #[test]
        fn set_then_unset_restores_unknown() {
            let mut data = FormData::new().with("size", "Large");
            assert_eq!(data.get("size"), Some(&FieldValue::from("Large")));
            assert_eq!(data.unset("size"), Some(FieldValue::from("Large")));
            assert!(data.is_unknown("size"));
        }

        #[test]
        fn serializes_as_plain_map() {
            let data = FormData::new().with("name", "John");
            let json = serde_json::to_string(&data).unwrap();
            assert_eq!(json, r#"{"name":{"type":"text","value":"John"}}"#);
        }
    }
}
