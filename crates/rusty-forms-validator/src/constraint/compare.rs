// File: src/constraint/compare.rs
// Purpose: Cross-field constraints reading another field's current value

use super::{
    field_reference, marker, Constraint, ConstraintBase, ConstraintKind, ValidationContext, Verdict,
};
use crate::error::{ConfigError, ValidatorError};
use crate::form::FormAdapter;
use crate::messages::Translator;
use crate::submission::FieldValue;

/// Current value of `target`, or an error naming the field that asked for it
fn target_value(
    base: &ConstraintBase,
    target: &str,
    ctx: &ValidationContext<'_>,
) -> Result<FieldValue, ValidatorError> {
    ctx.value_of(target)
        .ok_or_else(|| ValidatorError::UnknownTargetField {
            field: base.field().unwrap_or_default().to_string(),
            target: target.to_string(),
        })
}

/// Value must equal another field's value
#[derive(Debug, Clone)]
pub struct EqualTo {
    base: ConstraintBase,
    target: String,
}

impl EqualTo {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            base: ConstraintBase::default(),
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Constraint for EqualTo {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::EqualTo
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn client_name(&self) -> &'static str {
        "equalto"
    }

    fn default_message(&self, translator: &dyn Translator) -> String {
        translator.translate("validator.equalto", "This value should be the same.", &[])
    }

    fn client_markers(&self, form: &dyn FormAdapter) -> Vec<(String, String)> {
        vec![marker("equalto", field_reference(form, &self.target))]
    }

    fn check(&self, value: &FieldValue, ctx: &ValidationContext<'_>) -> Result<Verdict, ValidatorError> {
        let other = target_value(&self.base, &self.target, ctx)?;
        Ok(Verdict::from_bool(value.as_text() == other.as_text()))
    }
}

/// Value must differ from another field's value
#[derive(Debug, Clone)]
pub struct NotEqualTo {
    base: ConstraintBase,
    target: String,
}

impl NotEqualTo {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            base: ConstraintBase::default(),
            target: target.into(),
        }
    }
}

impl Constraint for NotEqualTo {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::NotEqualTo
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn client_name(&self) -> &'static str {
        "notequalto"
    }

    fn default_message(&self, translator: &dyn Translator) -> String {
        translator.translate("validator.notequalto", "This value should be different.", &[])
    }

    fn client_markers(&self, form: &dyn FormAdapter) -> Vec<(String, String)> {
        vec![marker("notequalto", field_reference(form, &self.target))]
    }

    fn check(&self, value: &FieldValue, ctx: &ValidationContext<'_>) -> Result<Verdict, ValidatorError> {
        let other = target_value(&self.base, &self.target, ctx)?;
        Ok(Verdict::from_bool(value.as_text() != other.as_text()))
    }
}

/// Numeric comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl ComparisonOp {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "gt" => Ok(ComparisonOp::Gt),
            "gte" => Ok(ComparisonOp::Gte),
            "lt" => Ok(ComparisonOp::Lt),
            "lte" => Ok(ComparisonOp::Lte),
            other => Err(ConfigError::UnknownComparison(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Gt => "gt",
            ComparisonOp::Gte => "gte",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Lte => "lte",
        }
    }

    pub fn holds(&self, left: f64, right: f64) -> bool {
        match self {
            ComparisonOp::Gt => left > right,
            ComparisonOp::Gte => left >= right,
            ComparisonOp::Lt => left < right,
            ComparisonOp::Lte => left <= right,
        }
    }

    fn message(&self) -> (&'static str, &'static str) {
        match self {
            ComparisonOp::Gt => ("validator.gt", "This value should be greater."),
            ComparisonOp::Gte => ("validator.gte", "This value should be greater or equal."),
            ComparisonOp::Lt => ("validator.lt", "This value should be less."),
            ComparisonOp::Lte => ("validator.lte", "This value should be less or equal."),
        }
    }
}

/// Numeric comparison against another field's value
#[derive(Debug, Clone)]
pub struct Comparison {
    base: ConstraintBase,
    op: ComparisonOp,
    target: String,
}

impl Comparison {
    /// `op` is one of gt, gte, lt or lte
    pub fn new(op: &str, target: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self::with_op(ComparisonOp::parse(op)?, target))
    }

    pub fn with_op(op: ComparisonOp, target: impl Into<String>) -> Self {
        Self {
            base: ConstraintBase::default(),
            op,
            target: target.into(),
        }
    }

    pub fn op(&self) -> ComparisonOp {
        self.op
    }
}

fn parse_number(value: &FieldValue) -> Option<f64> {
    value.as_text().trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

impl Constraint for Comparison {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Comparison
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn client_name(&self) -> &'static str {
        self.op.as_str()
    }

    fn default_message(&self, translator: &dyn Translator) -> String {
        let (key, default) = self.op.message();
        translator.translate(key, default, &[])
    }

    fn client_markers(&self, form: &dyn FormAdapter) -> Vec<(String, String)> {
        vec![marker(self.op.as_str(), field_reference(form, &self.target))]
    }

    fn check(&self, value: &FieldValue, ctx: &ValidationContext<'_>) -> Result<Verdict, ValidatorError> {
        let other = target_value(&self.base, &self.target, ctx)?;
        let ok = match (parse_number(value), parse_number(&other)) {
            (Some(left), Some(right)) => self.op.holds(left, right),
            _ => false,
        };
        Ok(Verdict::from_bool(ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::MemoryForm;
    use crate::submission::SubmittedData;

    fn run(constraint: &dyn Constraint, data: &SubmittedData, field: &str) -> Result<bool, ValidatorError> {
        let ctx = ValidationContext::new(data);
        let value = data.get(field).cloned().unwrap_or_default();
        constraint.evaluate(&value, &ctx).map(|v| v.is_pass())
    }

    #[test]
    fn test_equal_to() {
        let mut constraint = EqualTo::new("Subtitle");
        constraint.bind_field("Title").unwrap();

        let same = SubmittedData::new()
            .with("Title", "500tests")
            .with("Subtitle", "500tests");
        assert!(run(&constraint, &same, "Title").unwrap());

        let different = SubmittedData::new()
            .with("Title", "500tests")
            .with("Subtitle", "600tests");
        assert!(!run(&constraint, &different, "Title").unwrap());
    }

    #[test]
    fn test_not_equal_to() {
        let constraint = NotEqualTo::new("Old");
        let data = SubmittedData::new().with("New", "secret").with("Old", "secret");
        assert!(!run(&constraint, &data, "New").unwrap());
    }

    #[test]
    fn test_missing_target_is_error_at_validation_time() {
        let mut constraint = EqualTo::new("Nope");
        constraint.bind_field("Title").unwrap();
        let form = MemoryForm::new("Form", &["Title"]);
        let data = SubmittedData::new().with("Title", "x");
        let ctx = ValidationContext::new(&data).with_form(&form);

        let result = constraint.evaluate(&FieldValue::from("x"), &ctx);
        assert!(matches!(
            result,
            Err(ValidatorError::UnknownTargetField { ref field, ref target })
                if field == "Title" && target == "Nope"
        ));
    }

    #[test]
    fn test_comparison() {
        let constraint = Comparison::new("gt", "Min").unwrap();
        let data = SubmittedData::new().with("Max", "10").with("Min", "5");
        assert!(run(&constraint, &data, "Max").unwrap());

        let data = SubmittedData::new().with("Max", "5").with("Min", "5");
        assert!(!run(&constraint, &data, "Max").unwrap());

        let gte = Comparison::new("gte", "Min").unwrap();
        assert!(run(&gte, &data, "Max").unwrap());

        let data = SubmittedData::new().with("Max", "ten").with("Min", "5");
        assert!(!run(&constraint, &data, "Max").unwrap());
    }

    #[test]
    fn test_unknown_comparison() {
        assert!(matches!(
            Comparison::new("between", "Min"),
            Err(ConfigError::UnknownComparison(op)) if op == "between"
        ));
    }

    #[test]
    fn test_markers_reference_field_id() {
        let form = MemoryForm::new("Form", &["Title", "Subtitle"]);
        assert_eq!(
            EqualTo::new("Subtitle").client_markers(&form),
            vec![("data-parsley-equalto".to_string(), "#Form_Form_Subtitle".to_string())]
        );
        assert_eq!(
            Comparison::new("lte", "Subtitle").unwrap().client_markers(&form),
            vec![("data-parsley-lte".to_string(), "#Form_Form_Subtitle".to_string())]
        );
    }
}
