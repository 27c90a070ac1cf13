// File: src/constraint/types.rs
// Purpose: Data type constraint (email, url, number, integer, digits, alphanum)

use once_cell::sync::Lazy;
use regex::Regex;

use super::{marker, Constraint, ConstraintBase, ConstraintKind, ValidationContext, Verdict};
use crate::error::{ConfigError, ValidatorError};
use crate::form::FormAdapter;
use crate::messages::Translator;
use crate::submission::FieldValue;

// Email validation regex
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

// URL validation regex
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?|ftp)://[^\s/$.?#].[^\s]*$").unwrap()
});

static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^-?(?:\d*\.)?\d+(?:e[-+]?\d+)?$").unwrap()
});

static INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").unwrap());

static DIGITS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

static ALPHANUM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

/// Data types understood by both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Email,
    Url,
    Number,
    Integer,
    Digits,
    Alphanum,
}

impl DataType {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "email" => Ok(DataType::Email),
            "url" | "urlstrict" => Ok(DataType::Url),
            "number" => Ok(DataType::Number),
            "integer" => Ok(DataType::Integer),
            "digits" => Ok(DataType::Digits),
            "alphanum" => Ok(DataType::Alphanum),
            other => Err(ConfigError::UnknownMode {
                constraint: "type",
                mode: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Email => "email",
            DataType::Url => "url",
            DataType::Number => "number",
            DataType::Integer => "integer",
            DataType::Digits => "digits",
            DataType::Alphanum => "alphanum",
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            DataType::Email => EMAIL_REGEX.is_match(value),
            DataType::Url => URL_REGEX.is_match(value),
            DataType::Number => NUMBER_REGEX.is_match(value),
            DataType::Integer => INTEGER_REGEX.is_match(value),
            DataType::Digits => DIGITS_REGEX.is_match(value),
            DataType::Alphanum => ALPHANUM_REGEX.is_match(value),
        }
    }

    fn message(&self) -> (&'static str, &'static str) {
        match self {
            DataType::Email => ("validator.type.email", "This value should be a valid email."),
            DataType::Url => ("validator.type.url", "This value should be a valid url."),
            DataType::Number => ("validator.type.number", "This value should be a valid number."),
            DataType::Integer => ("validator.type.integer", "This value should be a valid integer."),
            DataType::Digits => ("validator.type.digits", "This value should be digits."),
            DataType::Alphanum => ("validator.type.alphanum", "This value should be alphanumeric."),
        }
    }
}

/// Value must be of a given data type
#[derive(Debug, Clone)]
pub struct Type {
    base: ConstraintBase,
    data_type: DataType,
}

impl Type {
    /// `name` is one of email, url, number, integer, digits or alphanum
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        Ok(Self::of(DataType::parse(name)?))
    }

    pub fn of(data_type: DataType) -> Self {
        Self {
            base: ConstraintBase::default(),
            data_type,
        }
    }

    pub fn email() -> Self {
        Self::of(DataType::Email)
    }

    pub fn url() -> Self {
        Self::of(DataType::Url)
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

impl Constraint for Type {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Type
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn client_name(&self) -> &'static str {
        "type"
    }

    fn default_message(&self, translator: &dyn Translator) -> String {
        let (key, default) = self.data_type.message();
        translator.translate(key, default, &[])
    }

    fn client_markers(&self, _form: &dyn FormAdapter) -> Vec<(String, String)> {
        vec![marker("type", self.data_type.as_str())]
    }

    fn check(&self, value: &FieldValue, _ctx: &ValidationContext<'_>) -> Result<Verdict, ValidatorError> {
        Ok(Verdict::from_bool(self.data_type.matches(value.as_text().trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::MemoryForm;
    use rstest::rstest;

    #[rstest]
    #[case("url", "http://www.things.com", true)]
    #[case("url", "www.things.com", false)]
    #[case("email", "person@things.com", true)]
    #[case("email", "person@things", false)]
    #[case("number", "500", true)]
    #[case("number", "-2.5", true)]
    #[case("number", "$500", false)]
    #[case("integer", "-12", true)]
    #[case("integer", "1.5", false)]
    #[case("digits", "0042", true)]
    #[case("digits", "-42", false)]
    #[case("alphanum", "500tests", true)]
    #[case("alphanum", "500 tests + other things", false)]
    fn test_types(#[case] name: &str, #[case] input: &str, #[case] expected: bool) {
        let constraint = Type::new(name).unwrap();
        assert_eq!(constraint.validate(input), expected, "{} / {}", name, input);
    }

    #[test]
    fn test_unknown_type() {
        assert!(matches!(Type::new("colour"), Err(ConfigError::UnknownMode { .. })));
    }

    #[test]
    fn test_marker() {
        let form = MemoryForm::new("Form", &["Title"]);
        assert_eq!(
            Type::url().client_markers(&form),
            vec![("data-parsley-type".to_string(), "url".to_string())]
        );
    }

    #[test]
    fn test_empty_passes() {
        assert!(Type::email().validate(""));
    }
}
