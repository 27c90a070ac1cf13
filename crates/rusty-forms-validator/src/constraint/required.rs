// File: src/constraint/required.rs
// Purpose: Required field constraint

use super::{marker, Constraint, ConstraintBase, ConstraintKind, ValidationContext, Verdict};
use crate::error::ValidatorError;
use crate::form::FormAdapter;
use crate::messages::Translator;
use crate::submission::FieldValue;

/// The only constraint whose outcome depends on emptiness
#[derive(Debug, Clone, Default)]
pub struct Required {
    base: ConstraintBase,
}

impl Required {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Constraint for Required {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Required
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn client_name(&self) -> &'static str {
        "required"
    }

    fn default_message(&self, translator: &dyn Translator) -> String {
        translator.translate("validator.required", "This field is required", &[])
    }

    fn client_markers(&self, _form: &dyn FormAdapter) -> Vec<(String, String)> {
        vec![marker("required", "true")]
    }

    fn check(&self, value: &FieldValue, _ctx: &ValidationContext<'_>) -> Result<Verdict, ValidatorError> {
        Ok(Verdict::from_bool(!value.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::DefaultTranslator;

    #[test]
    fn test_required() {
        let required = Required::new();
        assert!(!required.validate(""));
        assert!(!required.validate("   "));
        assert!(required.validate("Some Text"));
        assert!(required.validate("0"));
    }

    #[test]
    fn test_default_message() {
        assert_eq!(Required::new().message(&DefaultTranslator), "This field is required");
    }
}
