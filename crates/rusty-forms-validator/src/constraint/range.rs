// File: src/constraint/range.rs
// Purpose: min/max/range constraints over length, numeric value, word count and checked options

use super::{marker, Constraint, ConstraintBase, ConstraintKind, ValidationContext, Verdict};
use crate::error::{ConfigError, ValidatorError};
use crate::form::FormAdapter;
use crate::messages::Translator;
use crate::submission::FieldValue;

/// Inclusive bounds of a range-family constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounds {
    Min(i64),
    Max(i64),
    Range(i64, i64),
}

impl Bounds {
    /// Build from a mode tag (`min`, `max` or `range`) and one or two bounds
    pub fn parse(
        constraint: &'static str,
        mode: &str,
        first: i64,
        second: Option<i64>,
    ) -> Result<Self, ConfigError> {
        match mode {
            "min" => Ok(Bounds::Min(first)),
            "max" => Ok(Bounds::Max(first)),
            "range" => {
                let max = second.ok_or(ConfigError::MissingBound { constraint })?;
                if first > max {
                    return Err(ConfigError::InvertedBounds {
                        constraint,
                        min: first,
                        max,
                    });
                }
                Ok(Bounds::Range(first, max))
            }
            other => Err(ConfigError::UnknownMode {
                constraint,
                mode: other.to_string(),
            }),
        }
    }

    pub fn contains(&self, n: f64) -> bool {
        match *self {
            Bounds::Min(min) => n >= min as f64,
            Bounds::Max(max) => n <= max as f64,
            Bounds::Range(min, max) => n >= min as f64 && n <= max as f64,
        }
    }

    /// `5` for single bounds, `[5,10]` for ranges
    pub fn client_value(&self) -> String {
        match *self {
            Bounds::Min(n) | Bounds::Max(n) => n.to_string(),
            Bounds::Range(min, max) => format!("[{},{}]", min, max),
        }
    }

    fn args(&self) -> Vec<String> {
        match *self {
            Bounds::Min(n) | Bounds::Max(n) => vec![n.to_string()],
            Bounds::Range(min, max) => vec![min.to_string(), max.to_string()],
        }
    }
}

fn text_length(value: &FieldValue) -> Option<f64> {
    Some(value.as_text().trim().chars().count() as f64)
}

fn numeric_value(value: &FieldValue) -> Option<f64> {
    value
        .as_text()
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

fn word_count(value: &FieldValue) -> Option<f64> {
    Some(value.as_text().split_whitespace().count() as f64)
}

fn checked_count(value: &FieldValue) -> Option<f64> {
    Some(value.values().len() as f64)
}

macro_rules! range_constraint {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:expr, $label:literal, $measure:ident,
        min: ($min_client:literal, $min_key:literal, $min_default:literal),
        max: ($max_client:literal, $max_key:literal, $max_default:literal),
        range: ($range_client:literal, $range_key:literal, $range_default:literal) $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            base: ConstraintBase,
            bounds: Bounds,
        }

        impl $name {
            /// `mode` is one of `min`, `max` or `range`; ranges need `second`
            pub fn new(mode: &str, first: i64, second: Option<i64>) -> Result<Self, ConfigError> {
                Ok(Self {
                    base: ConstraintBase::default(),
                    bounds: Bounds::parse($label, mode, first, second)?,
                })
            }

            pub fn min(min: i64) -> Self {
                Self {
                    base: ConstraintBase::default(),
                    bounds: Bounds::Min(min),
                }
            }

            pub fn max(max: i64) -> Self {
                Self {
                    base: ConstraintBase::default(),
                    bounds: Bounds::Max(max),
                }
            }

            pub fn range(min: i64, max: i64) -> Result<Self, ConfigError> {
                Self::new("range", min, Some(max))
            }

            pub fn bounds(&self) -> Bounds {
                self.bounds
            }
        }

        impl Constraint for $name {
            fn kind(&self) -> ConstraintKind {
                $kind
            }

            fn base(&self) -> &ConstraintBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut ConstraintBase {
                &mut self.base
            }

            fn client_name(&self) -> &'static str {
                match self.bounds {
                    Bounds::Min(_) => $min_client,
                    Bounds::Max(_) => $max_client,
                    Bounds::Range(..) => $range_client,
                }
            }

            fn default_message(&self, translator: &dyn Translator) -> String {
                let (key, default) = match self.bounds {
                    Bounds::Min(_) => ($min_key, $min_default),
                    Bounds::Max(_) => ($max_key, $max_default),
                    Bounds::Range(..) => ($range_key, $range_default),
                };
                translator.translate(key, default, &self.bounds.args())
            }

            fn client_markers(&self, _form: &dyn FormAdapter) -> Vec<(String, String)> {
                vec![marker(self.client_name(), self.bounds.client_value())]
            }

            fn check(
                &self,
                value: &FieldValue,
                _ctx: &ValidationContext<'_>,
            ) -> Result<Verdict, ValidatorError> {
                let ok = $measure(value).map_or(false, |n| self.bounds.contains(n));
                Ok(Verdict::from_bool(ok))
            }
        }
    };
}

range_constraint!(
    /// Character count of the trimmed value
    Length, ConstraintKind::Length, "length", text_length,
    min: ("minlength", "validator.minlength",
        "This value is too short. It should have %s characters or more."),
    max: ("maxlength", "validator.maxlength",
        "This value is too long. It should have %s characters or fewer."),
    range: ("length", "validator.length",
        "This value length is invalid. It should be between %s and %s characters long."),
);

range_constraint!(
    /// Numeric value; non-numeric input fails
    Value, ConstraintKind::Value, "value", numeric_value,
    min: ("min", "validator.min", "This value should be greater than or equal to %s."),
    max: ("max", "validator.max", "This value should be lower than or equal to %s."),
    range: ("range", "validator.range", "This value should be between %s and %s."),
);

range_constraint!(
    /// Whitespace separated word count
    Words, ConstraintKind::Words, "words", word_count,
    min: ("minwords", "validator.minwords",
        "This value is too short. It should have %s words or more."),
    max: ("maxwords", "validator.maxwords",
        "This value is too long. It should have %s words or fewer."),
    range: ("words", "validator.words",
        "This value length is invalid. It should be between %s and %s words long."),
);

range_constraint!(
    /// Number of checked options in a checkbox set
    Check, ConstraintKind::Check, "check", checked_count,
    min: ("mincheck", "validator.mincheck", "You must select at least %s choices."),
    max: ("maxcheck", "validator.maxcheck", "You must select %s choices or fewer."),
    range: ("check", "validator.check", "You must select between %s and %s choices."),
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::MemoryForm;
    use crate::messages::DefaultTranslator;
    use crate::submission::SubmittedData;
    use rstest::rstest;

    #[rstest]
    #[case(Length::min(5), "abcd", false)]
    #[case(Length::min(5), "abcde", true)]
    #[case(Length::max(5), "abcdef", false)]
    #[case(Length::max(5), "abcde", true)]
    #[case(Length::range(5, 10).unwrap(), "abcd", false)]
    #[case(Length::range(5, 10).unwrap(), "abcdefghij", true)]
    #[case(Length::range(5, 10).unwrap(), "abcdefghijk", false)]
    #[case(Length::min(5), "  abcd  ", false)]
    fn test_length(#[case] constraint: Length, #[case] input: &str, #[case] expected: bool) {
        assert_eq!(constraint.validate(input), expected);
    }

    #[rstest]
    #[case("3", false)]
    #[case("5", true)]
    #[case("6", true)]
    #[case("10", true)]
    #[case("11", false)]
    #[case("abc", false)]
    fn test_value_range(#[case] input: &str, #[case] expected: bool) {
        let constraint = Value::range(5, 10).unwrap();
        assert_eq!(constraint.validate(input), expected);
    }

    #[test]
    fn test_zero_is_checked_against_min() {
        assert!(!Value::min(5).validate("0"));
    }

    #[test]
    fn test_words() {
        let constraint = Words::range(2, 3).unwrap();
        assert!(!constraint.validate("one"));
        assert!(constraint.validate("one two"));
        assert!(constraint.validate("one   two three"));
        assert!(!constraint.validate("one two three four"));
    }

    #[test]
    fn test_check_counts_selected_options() {
        let constraint = Check::min(2);
        let data = SubmittedData::new();
        let ctx = ValidationContext::new(&data);

        let one = FieldValue::from(vec!["a"]);
        let two = FieldValue::from(vec!["a", "b"]);
        assert!(!constraint.evaluate(&one, &ctx).unwrap().is_pass());
        assert!(constraint.evaluate(&two, &ctx).unwrap().is_pass());
        assert!(constraint.evaluate(&FieldValue::Many(vec![]), &ctx).unwrap().is_pass());
    }

    #[test]
    fn test_empty_passes() {
        assert!(Length::min(5).validate(""));
        assert!(Value::min(5).validate(""));
        assert!(Words::min(5).validate(""));
        assert!(Check::min(5).validate(""));
    }

    #[test]
    fn test_client_markers() {
        let form = MemoryForm::new("Form", &["Title"]);
        assert_eq!(
            Length::min(5).client_markers(&form),
            vec![("data-parsley-minlength".to_string(), "5".to_string())]
        );
        assert_eq!(
            Length::range(5, 10).unwrap().client_markers(&form),
            vec![("data-parsley-length".to_string(), "[5,10]".to_string())]
        );
        assert_eq!(
            Value::range(5, 10).unwrap().client_markers(&form),
            vec![("data-parsley-range".to_string(), "[5,10]".to_string())]
        );
        assert_eq!(Check::max(3).client_name(), "maxcheck");
        assert_eq!(Words::min(3).client_name(), "minwords");
    }

    #[test]
    fn test_messages_are_parameterized() {
        assert_eq!(
            Length::min(5).message(&DefaultTranslator),
            "This value is too short. It should have 5 characters or more."
        );
        assert_eq!(
            Value::range(5, 10).unwrap().message(&DefaultTranslator),
            "This value should be between 5 and 10."
        );
    }

    #[test]
    fn test_configuration_errors() {
        assert!(matches!(
            Length::new("between", 1, None),
            Err(ConfigError::UnknownMode { .. })
        ));
        assert!(matches!(
            Value::new("range", 1, None),
            Err(ConfigError::MissingBound { .. })
        ));
        assert!(matches!(
            Words::range(10, 5),
            Err(ConfigError::InvertedBounds { min: 10, max: 5, .. })
        ));
    }
}
