use serde_json::{Map, Value};

use super::field::{self, FieldError, FieldErrors, Nullable, Outcome, Shape};
use crate::error::ApiError;

/// Per-request accumulator over a JSON object body.
///
/// Accessors never short-circuit: each one records its failure and hands back
/// `None`, so a handler can probe every field before deciding. The input
/// record is then assembled with `?` over the probed options and passed to
/// [`ValidationContext::finish`].
#[derive(Debug)]
pub struct ValidationContext {
    body: Map<String, Value>,
    failures: FieldErrors,
}

impl ValidationContext {
    pub fn new(body: Map<String, Value>) -> Self {
        Self {
            body,
            failures: FieldErrors::default(),
        }
    }

    /// Parse a raw request body. Anything but a JSON object is malformed.
    pub fn from_slice(raw: &[u8]) -> Result<Self, ApiError> {
        match serde_json::from_slice::<Value>(raw) {
            Ok(Value::Object(body)) => Ok(Self::new(body)),
            _ => Err(ApiError::malformed_request(String::from_utf8_lossy(raw))),
        }
    }

    /// Parse `raw`, let `probe` read every field, and turn the outcome into
    /// either the finished record or the aggregated field errors.
    pub fn run<T>(raw: &[u8], probe: impl FnOnce(&mut Self) -> Option<T>) -> Result<T, ApiError> {
        let mut ctx = Self::from_slice(raw)?;
        let record = probe(&mut ctx);
        ctx.finish(record)
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn require<S: Shape>(&mut self, name: &str, shape: S) -> Option<S::Output> {
        let outcome = field::required(&self.body, name, shape);
        self.record(outcome)
    }

    /// `Some(None)` when the field is absent, `None` when it failed
    pub fn optional<S: Shape>(&mut self, name: &str, shape: S) -> Option<Option<S::Output>> {
        let outcome = field::optional(&self.body, name, shape);
        self.record(outcome)
    }

    pub fn nullable<S: Shape>(&mut self, name: &str, shape: S) -> Option<Nullable<S::Output>> {
        let outcome = field::nullable(&self.body, name, shape);
        self.record(outcome)
    }

    /// Record a business rule against a field that already parsed.
    /// Returns `condition` so callers can chain on it.
    pub fn check(&mut self, name: &str, condition: bool, message: &str) -> bool {
        if !condition {
            let error = FieldError::new(name, self.body.get(name), message);
            self.failures.push(error);
        }
        condition
    }

    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn collect_errors(&self) -> FieldErrors {
        self.failures.clone()
    }

    pub fn finish<T>(self, record: Option<T>) -> Result<T, ApiError> {
        if self.has_errors() {
            return Err(ApiError::FieldValidation(self.failures));
        }
        record.ok_or_else(|| {
            tracing::error!("validation produced no record and no errors");
            ApiError::internal_server_error("Internal server error")
        })
    }

    fn record<T>(&mut self, outcome: Outcome<T>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(error) => {
                self.failures.push(error);
                None
            }
        }
    }
}
