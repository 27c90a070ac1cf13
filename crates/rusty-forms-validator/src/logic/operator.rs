// File: src/logic/operator.rs
// Purpose: Closed set of conditional-logic predicates

use std::fmt;

use crate::error::ConfigError;
use crate::submission::FieldValue;

/// How the children of a criteria node combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    /// Client expression symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
        }
    }

    /// Builder call that declares this operator
    pub fn call_name(&self) -> &'static str {
        match self {
            LogicalOperator::And => "and_if",
            LogicalOperator::Or => "or_if",
        }
    }
}

/// Predicate applied to a master field's current value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    EqualTo,
    NotEqualTo,
    GreaterThan,
    LessThan,
    Contains,
    Empty,
    NotEmpty,
    Checked,
    NotChecked,
    HasCheckedOption,
    HasCheckedAtLeast,
    HasCheckedLessThan,
    Between,
}

const OPERATORS: &[Operator] = &[
    Operator::EqualTo,
    Operator::NotEqualTo,
    Operator::GreaterThan,
    Operator::LessThan,
    Operator::Contains,
    Operator::Empty,
    Operator::NotEmpty,
    Operator::Checked,
    Operator::NotChecked,
    Operator::HasCheckedOption,
    Operator::HasCheckedAtLeast,
    Operator::HasCheckedLessThan,
    Operator::Between,
];

impl Operator {
    pub fn name(&self) -> &'static str {
        match self {
            Operator::EqualTo => "EqualTo",
            Operator::NotEqualTo => "NotEqualTo",
            Operator::GreaterThan => "GreaterThan",
            Operator::LessThan => "LessThan",
            Operator::Contains => "Contains",
            Operator::Empty => "Empty",
            Operator::NotEmpty => "NotEmpty",
            Operator::Checked => "Checked",
            Operator::NotChecked => "NotChecked",
            Operator::HasCheckedOption => "HasCheckedOption",
            Operator::HasCheckedAtLeast => "HasCheckedAtLeast",
            Operator::HasCheckedLessThan => "HasCheckedLessThan",
            Operator::Between => "Between",
        }
    }

    /// Look up an operator by name.
    ///
    /// Accepts `isEqualTo`, `EqualTo` and `equalTo` spellings.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        let bare = match name.strip_prefix("is") {
            Some(rest) if rest.starts_with(|c: char| c.is_ascii_uppercase()) => rest,
            _ => name,
        };

        OPERATORS
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(bare))
            .ok_or_else(|| ConfigError::UnknownOperator(name.to_string()))
    }

    /// Number of arguments the predicate takes
    pub fn arity(&self) -> usize {
        match self {
            Operator::Empty | Operator::NotEmpty | Operator::Checked | Operator::NotChecked => 0,
            Operator::Between => 2,
            _ => 1,
        }
    }

    fn numeric(&self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::LessThan
                | Operator::HasCheckedAtLeast
                | Operator::HasCheckedLessThan
                | Operator::Between
        )
    }

    /// Client predicate method, e.g. `evaluateEqualTo`
    pub fn client_name(&self) -> String {
        format!("evaluate{}", self.name())
    }

    /// Reject wrong argument counts and non-numeric operands
    pub fn check_args(&self, args: &[String]) -> Result<(), ConfigError> {
        if args.len() != self.arity() {
            return Err(ConfigError::OperatorArity {
                operator: self.name(),
                expected: self.arity(),
                actual: args.len(),
            });
        }
        if self.numeric() {
            if let Some(bad) = args.iter().find(|arg| parse_number(arg).is_none()) {
                return Err(ConfigError::InvalidOperand {
                    operator: self.name(),
                    value: bad.clone(),
                });
            }
        }
        Ok(())
    }

    /// Apply to a master value. `args` must have passed [`Operator::check_args`].
    pub fn evaluate(&self, value: &FieldValue, args: &[String]) -> bool {
        let arg = |i: usize| args.get(i).map(String::as_str).unwrap_or_default();
        let number = |i: usize| parse_number(arg(i));
        let current = || parse_number(&value.as_text());
        let checked = || value.values().len() as f64;

        match self {
            Operator::EqualTo => value.as_text() == arg(0),
            Operator::NotEqualTo => value.as_text() != arg(0),
            Operator::GreaterThan => matches!((current(), number(0)), (Some(v), Some(n)) if v > n),
            Operator::LessThan => matches!((current(), number(0)), (Some(v), Some(n)) if v < n),
            Operator::Contains => value.as_text().contains(arg(0)),
            Operator::Empty => value.is_empty(),
            Operator::NotEmpty => !value.is_empty(),
            Operator::Checked => value.is_checked(),
            Operator::NotChecked => !value.is_checked(),
            Operator::HasCheckedOption => value.values().contains(&arg(0)),
            Operator::HasCheckedAtLeast => number(0).map_or(false, |n| checked() >= n),
            // inclusive, as the client predicate counts
            Operator::HasCheckedLessThan => number(0).map_or(false, |n| checked() <= n),
            Operator::Between => match (current(), number(0), number(1)) {
                (Some(v), Some(min), Some(max)) => min <= v && v <= max,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[rstest]
    #[case("isEqualTo", Operator::EqualTo)]
    #[case("EqualTo", Operator::EqualTo)]
    #[case("isNotEmpty", Operator::NotEmpty)]
    #[case("contains", Operator::Contains)]
    #[case("hasCheckedAtLeast", Operator::HasCheckedAtLeast)]
    #[case("isBetween", Operator::Between)]
    fn test_from_name(#[case] name: &str, #[case] expected: Operator) {
        assert_eq!(Operator::from_name(name).unwrap(), expected);
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(
            Operator::from_name("isPurple"),
            Err(ConfigError::UnknownOperator("isPurple".to_string()))
        );
        assert!(Operator::from_name("issue").is_err());
    }

    #[test]
    fn test_arity() {
        assert!(Operator::Empty.check_args(&[]).is_ok());
        assert_eq!(
            Operator::Between.check_args(&args(&["1"])),
            Err(ConfigError::OperatorArity {
                operator: "Between",
                expected: 2,
                actual: 1
            })
        );
        assert!(matches!(
            Operator::GreaterThan.check_args(&args(&["many"])),
            Err(ConfigError::InvalidOperand { .. })
        ));
    }

    #[rstest]
    #[case(Operator::EqualTo, "yes", &["yes"], true)]
    #[case(Operator::NotEqualTo, "yes", &["yes"], false)]
    #[case(Operator::GreaterThan, "10", &["5"], true)]
    #[case(Operator::GreaterThan, "abc", &["5"], false)]
    #[case(Operator::LessThan, "4.5", &["5"], true)]
    #[case(Operator::Contains, "hello world", &["lo w"], true)]
    #[case(Operator::Empty, "  ", &[], true)]
    #[case(Operator::NotEmpty, "x", &[], true)]
    #[case(Operator::Checked, "1", &[], true)]
    #[case(Operator::NotChecked, "0", &[], true)]
    #[case(Operator::Between, "7", &["5", "10"], true)]
    #[case(Operator::Between, "10", &["5", "10"], true)]
    #[case(Operator::Between, "11", &["5", "10"], false)]
    fn test_scalar_predicates(
        #[case] op: Operator,
        #[case] value: &str,
        #[case] operands: &[&str],
        #[case] expected: bool,
    ) {
        assert_eq!(op.evaluate(&FieldValue::from(value), &args(operands)), expected);
    }

    #[test]
    fn test_checkbox_predicates() {
        let value = FieldValue::from(vec!["red", "green"]);
        assert!(Operator::HasCheckedOption.evaluate(&value, &args(&["green"])));
        assert!(!Operator::HasCheckedOption.evaluate(&value, &args(&["blue"])));
        assert!(Operator::HasCheckedAtLeast.evaluate(&value, &args(&["2"])));
        assert!(!Operator::HasCheckedAtLeast.evaluate(&value, &args(&["3"])));
        assert!(Operator::HasCheckedLessThan.evaluate(&value, &args(&["2"])));
        assert!(!Operator::HasCheckedLessThan.evaluate(&value, &args(&["1"])));
    }
}
