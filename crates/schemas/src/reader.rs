//! Accumulating reader over a JSON object.
//!
//! Every accessor records a violation instead of returning early, so a single
//! pass reports all failing fields. `null` is treated the same as an absent
//! key.

use std::ops::RangeInclusive;

use serde_json::{Map, Value};

use crate::{FieldViolation, SchemaError, ViolationCode};

/// Field name used when the input itself is not a JSON object.
const ROOT_FIELD: &str = "$";

pub(crate) struct ObjectReader<'a> {
    object: &'a Map<String, Value>,
    violations: Vec<FieldViolation>,
}

impl<'a> ObjectReader<'a> {
    pub(crate) fn new(input: &'a Value) -> Result<Self, SchemaError> {
        match input.as_object() {
            Some(object) => Ok(Self {
                object,
                violations: Vec::new(),
            }),
            None => Err(SchemaError::new(vec![FieldViolation::new(
                ROOT_FIELD,
                ViolationCode::InvalidType,
            )])),
        }
    }

    fn value(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field).filter(|value| !value.is_null())
    }

    fn record(&mut self, field: &str, code: ViolationCode) {
        self.violations.push(FieldViolation::new(field, code));
    }

    fn string(&mut self, field: &str, value: &'a Value) -> Option<&'a str> {
        let text = value.as_str();
        if text.is_none() {
            self.record(field, ViolationCode::InvalidType);
        }
        text
    }

    /// Read a required string and run it through `parse`.
    pub(crate) fn required_with<T>(
        &mut self,
        field: &str,
        parse: impl FnOnce(&str) -> Result<T, ViolationCode>,
    ) -> Option<T> {
        let Some(value) = self.value(field) else {
            self.record(field, ViolationCode::Required);
            return None;
        };
        let text = self.string(field, value)?;
        match parse(text) {
            Ok(parsed) => Some(parsed),
            Err(code) => {
                self.record(field, code);
                None
            }
        }
    }

    /// Read an optional string and run it through `parse` when present.
    pub(crate) fn optional_with<T>(
        &mut self,
        field: &str,
        parse: impl FnOnce(&str) -> Result<Option<T>, ViolationCode>,
    ) -> Option<T> {
        let value = self.value(field)?;
        let text = self.string(field, value)?;
        match parse(text) {
            Ok(parsed) => parsed,
            Err(code) => {
                self.record(field, code);
                None
            }
        }
    }

    /// Read an optional boolean.
    pub(crate) fn optional_bool(&mut self, field: &str) -> Option<bool> {
        let value = self.value(field)?;
        let flag = value.as_bool();
        if flag.is_none() {
            self.record(field, ViolationCode::InvalidType);
        }
        flag
    }

    /// Read a required integer lying within `range`.
    pub(crate) fn required_integer(
        &mut self,
        field: &str,
        range: RangeInclusive<i64>,
    ) -> Option<i64> {
        let Some(value) = self.value(field) else {
            self.record(field, ViolationCode::Required);
            return None;
        };
        let Some(number) = value.as_i64() else {
            self.record(field, ViolationCode::InvalidType);
            return None;
        };
        if !range.contains(&number) {
            self.record(field, ViolationCode::OutOfRange);
            return None;
        }
        Some(number)
    }

    /// Resolve the read: the assembled record when nothing failed, otherwise
    /// every violation recorded so far.
    pub(crate) fn finish<T>(self, record: Option<T>) -> Result<T, SchemaError> {
        match (record, self.violations.is_empty()) {
            (Some(record), true) => Ok(record),
            (_, false) => Err(SchemaError::new(self.violations)),
            (None, true) => Err(SchemaError::new(vec![FieldViolation::new(
                ROOT_FIELD,
                ViolationCode::InvalidType,
            )])),
        }
    }
}
