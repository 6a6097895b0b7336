//! Candidate interpretations of a span of input.

use serde::{Deserialize, Serialize};

use crate::domain::form::FormCommand;
use crate::domain::foundation::FieldValue;

/// What a matched span stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MatchValue {
    /// The null value: no preference, or an unset optional field.
    NoValue,
    Value(FieldValue),
    /// The span names the field itself rather than one of its values.
    FieldReference,
    Command(FormCommand),
    /// Navigation to the named step.
    Step(String),
}

impl MatchValue {
    pub fn is_null(&self) -> bool {
        matches!(self, MatchValue::NoValue)
    }

    pub fn is_field_reference(&self) -> bool {
        matches!(self, MatchValue::FieldReference)
    }

    pub fn field_value(&self) -> Option<&FieldValue> {
        match self {
            MatchValue::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_field_value(self) -> Option<FieldValue> {
        match self {
            MatchValue::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl From<FieldValue> for MatchValue {
    fn from(value: FieldValue) -> Self {
        MatchValue::Value(value)
    }
}

impl From<Option<FieldValue>> for MatchValue {
    fn from(value: Option<FieldValue>) -> Self {
        value.map_or(MatchValue::NoValue, MatchValue::Value)
    }
}

/// A scored interpretation of the half-open byte range `start..start + length`.
#[derive(Debug, Clone, PartialEq)]
pub struct TermMatch {
    pub start: usize,
    pub length: usize,
    pub confidence: f64,
    pub value: MatchValue,
}

impl TermMatch {
    pub fn new(start: usize, length: usize, confidence: f64, value: MatchValue) -> Self {
        Self {
            start,
            length,
            confidence,
            value,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn is_field_reference(&self) -> bool {
        self.value.is_field_reference()
    }

    /// True if this span contains all of `other`.
    pub fn covers(&self, other: &TermMatch) -> bool {
        self.start <= other.start && self.end() >= other.end()
    }

    /// True if the spans share at least one byte, or both start at the same offset.
    pub fn overlaps(&self, other: &TermMatch) -> bool {
        self.start == other.start || (self.start < other.end() && other.start < self.end())
    }

    pub fn same_span(&self, other: &TermMatch) -> bool {
        self.start == other.start && self.length == other.length
    }

    /// The matched text within `input`.
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start..self.end()).unwrap_or("")
    }
}
