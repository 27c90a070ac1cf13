// File: src/constraint/date.rs
// Purpose: Date format constraint

use chrono::{NaiveDate, NaiveDateTime};

use super::{marker, Constraint, ConstraintBase, ConstraintKind, ValidationContext, Verdict};
use crate::error::ValidatorError;
use crate::form::FormAdapter;
use crate::messages::Translator;
use crate::submission::FieldValue;

/// chrono specifiers and their client-side (moment style) tokens
const FORMAT_TOKENS: &[(&str, &str)] = &[
    ("%Y", "YYYY"),
    ("%y", "YY"),
    ("%m", "MM"),
    ("%d", "DD"),
    ("%e", "D"),
    ("%H", "HH"),
    ("%M", "mm"),
    ("%S", "ss"),
];

/// Value must be a date in the given chrono format
#[derive(Debug, Clone)]
pub struct Date {
    base: ConstraintBase,
    format: String,
}

impl Default for Date {
    fn default() -> Self {
        Self::new()
    }
}

impl Date {
    /// ISO dates, `%Y-%m-%d`
    pub fn new() -> Self {
        Self::with_format("%Y-%m-%d")
    }

    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            base: ConstraintBase::default(),
            format: format.into(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// The format as the client engine spells it
    pub fn client_format(&self) -> String {
        FORMAT_TOKENS
            .iter()
            .fold(self.format.clone(), |acc, (from, to)| acc.replace(from, to))
    }

    fn parses(&self, value: &str) -> bool {
        NaiveDate::parse_from_str(value, &self.format).is_ok()
            || NaiveDateTime::parse_from_str(value, &self.format).is_ok()
    }
}

impl Constraint for Date {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Date
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn client_name(&self) -> &'static str {
        "date"
    }

    fn default_message(&self, translator: &dyn Translator) -> String {
        translator.translate(
            "validator.date",
            "This value should be a valid date (%s).",
            &[self.client_format()],
        )
    }

    fn client_markers(&self, _form: &dyn FormAdapter) -> Vec<(String, String)> {
        vec![marker("date", self.client_format())]
    }

    fn check(&self, value: &FieldValue, _ctx: &ValidationContext<'_>) -> Result<Verdict, ValidatorError> {
        Ok(Verdict::from_bool(self.parses(value.as_text().trim())))
    }
}
