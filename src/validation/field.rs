use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use uuid::Uuid;

pub const MISSING_FIELD: &str = "Missing field";
pub const NULL_FIELD: &str = "Field must not be null";
pub const OUT_OF_RANGE: &str = "Number out of range";

/// One rejected field: its name, what the client sent (`None` when the field
/// was absent) and a human readable reason.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub value: Option<Value>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, value: Option<&Value>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.cloned(),
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "Value": self.value.clone().unwrap_or(Value::Null),
            "Error": self.message,
        })
    }
}

/// Ordered set of field errors, at most one per field (the first one wins)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    /// Returns false when the field already has an error recorded
    pub fn push(&mut self, error: FieldError) -> bool {
        if self.get(&error.field).is_some() {
            return false;
        }
        self.errors.push(error);
        true
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// `{"<Field>": {"Value": ..., "Error": ...}, ...}`
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .errors
            .iter()
            .map(|e| (e.field.clone(), e.to_json()))
            .collect();
        Value::Object(map)
    }
}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        let mut errors = FieldErrors::default();
        for error in iter {
            errors.push(error);
        }
        errors
    }
}

pub type Outcome<T> = Result<T, FieldError>;

/// Expected shape of a present, non-null JSON value. `accept` reports the
/// reason for rejection; the caller attaches field name and value.
pub trait Shape {
    type Output;

    fn accept(&self, value: &Value) -> Result<Self::Output, String>;
}

#[derive(Debug, Clone, Copy)]
pub struct Text {
    pub allow_blank: bool,
}

impl Text {
    pub const NON_BLANK: Text = Text { allow_blank: false };
    pub const ANY: Text = Text { allow_blank: true };
}

impl Shape for Text {
    type Output = String;

    fn accept(&self, value: &Value) -> Result<String, String> {
        let text = value.as_str().ok_or_else(|| "Expected a string".to_string())?;
        if !self.allow_blank && text.trim().is_empty() {
            return Err("Expected a non-empty string".to_string());
        }
        Ok(text.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Number {
    pub allow_negative: bool,
}

impl Number {
    pub const NON_NEGATIVE: Number = Number { allow_negative: false };
    pub const ANY: Number = Number { allow_negative: true };
}

impl Shape for Number {
    type Output = Decimal;

    fn accept(&self, value: &Value) -> Result<Decimal, String> {
        let Value::Number(number) = value else {
            return Err("Expected a number".to_string());
        };

        // Well-formed, but too large or too precise for a Decimal
        let literal = number.to_string();
        let decimal = Decimal::from_str(&literal)
            .or_else(|_| Decimal::from_scientific(&literal))
            .map_err(|_| OUT_OF_RANGE.to_string())?;

        if !self.allow_negative && decimal.is_sign_negative() && !decimal.is_zero() {
            return Err("Expected a non-negative number".to_string());
        }
        Ok(decimal)
    }
}

/// Calendar date written as `YYYY-MM-DD`
#[derive(Debug, Clone, Copy)]
pub struct IsoDate;

impl Shape for IsoDate {
    type Output = NaiveDate;

    fn accept(&self, value: &Value) -> Result<NaiveDate, String> {
        value
            .as_str()
            .and_then(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
            .ok_or_else(|| "Expected an ISO-8601 date".to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UuidText;

impl Shape for UuidText {
    type Output = Uuid;

    fn accept(&self, value: &Value) -> Result<Uuid, String> {
        value
            .as_str()
            .and_then(|text| Uuid::parse_str(text).ok())
            .ok_or_else(|| "Expected a valid UUID".to_string())
    }
}

/// Member of a closed set of names
#[derive(Debug, Clone, Copy)]
pub struct OneOf(pub &'static [&'static str]);

impl Shape for OneOf {
    type Output = String;

    fn accept(&self, value: &Value) -> Result<String, String> {
        match value.as_str() {
            Some(text) if self.0.contains(&text) => Ok(text.to_string()),
            _ => Err(format!("Expected one of: {}", self.0.join(", "))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Email;

impl Shape for Email {
    type Output = String;

    fn accept(&self, value: &Value) -> Result<String, String> {
        let text = Text::NON_BLANK.accept(value)?;
        if !text.contains('@') {
            return Err("Expected an email address".to_string());
        }
        Ok(text)
    }
}

/// Result of reading a field that may be cleared with an explicit `null`
#[derive(Debug, Clone, PartialEq)]
pub enum Nullable<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Nullable<T> {
    /// `None` leaves the stored value alone, `Some(None)` clears it
    pub fn into_patch(self) -> Option<Option<T>> {
        match self {
            Nullable::Absent => None,
            Nullable::Null => Some(None),
            Nullable::Value(value) => Some(Some(value)),
        }
    }
}

pub fn required<S: Shape>(body: &Map<String, Value>, field: &str, shape: S) -> Outcome<S::Output> {
    match body.get(field) {
        None => Err(FieldError::new(field, None, MISSING_FIELD)),
        Some(Value::Null) => Err(FieldError::new(field, Some(&Value::Null), NULL_FIELD)),
        Some(value) => shape
            .accept(value)
            .map_err(|message| FieldError::new(field, Some(value), message)),
    }
}

pub fn optional<S: Shape>(body: &Map<String, Value>, field: &str, shape: S) -> Outcome<Option<S::Output>> {
    if !body.contains_key(field) {
        return Ok(None);
    }
    required(body, field, shape).map(Some)
}

pub fn nullable<S: Shape>(body: &Map<String, Value>, field: &str, shape: S) -> Outcome<Nullable<S::Output>> {
    match body.get(field) {
        None => Ok(Nullable::Absent),
        Some(Value::Null) => Ok(Nullable::Null),
        Some(_) => required(body, field, shape).map(Nullable::Value),
    }
}
