//! Field-rule collection.
//!
//! Rules are checked in full and reported together instead of stopping at the
//! first violation.

use crate::errors::{Error, Result, ValidationError};
use rust_decimal::Decimal;

/// Fractional digits every money column stores.
pub const MONEY_SCALE: u32 = 2;

/// Accumulates violated rules for one input.
#[derive(Debug, Default)]
pub struct Violations(Vec<ValidationError>);

impl Violations {
    /// An empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` against `field` unless `holds` is true.
    pub fn check(&mut self, holds: bool, field: &'static str, message: &str) {
        if !holds {
            self.0.push(ValidationError {
                field,
                message: message.to_string(),
            });
        }
    }

    /// Records a violation if `value` is blank.
    pub fn require_text(&mut self, field: &'static str, value: &str) {
        self.check(!value.trim().is_empty(), field, "must not be empty");
    }

    /// Rejects money values that would lose digits in a `Decimal(12, 2)` column.
    pub fn require_cents(&mut self, field: &'static str, value: Decimal) {
        self.check(
            value.normalize().scale() <= MONEY_SCALE,
            field,
            "must have at most 2 decimal places",
        );
    }

    pub(crate) fn into_errors(self) -> Vec<ValidationError> {
        self.0
    }

    /// `Ok(())` if nothing was recorded, otherwise every violation at once.
    pub fn finish(self) -> Result<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Error::ValidationFailed { errors: self.0 })
        }
    }
}

/// Trims `value` and maps blank text to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
