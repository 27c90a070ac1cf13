// File: src/field_logic.rs
// Purpose: Conditional logic attached to a dependent field and its markup

use crate::constraint::ValidationContext;
use crate::error::ValidatorError;
use crate::form::FormAdapter;
use crate::logic::Criteria;

/// Classes marking a field whose validation depends on other fields
pub const LOGIC_CLASSES: &str = "validation-logic validation-logic-exclude validation-logic-validate";

/// Comma-joined master field names
pub const MASTERS_ATTRIBUTE: &str = "data-validation-logic-masters";

/// Client expression deciding whether the field validates
pub const EVAL_ATTRIBUTE: &str = "data-validation-logic-eval";

/// Criteria deciding whether a field's constraints apply
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLogic {
    field: String,
    criteria: Criteria,
}

impl FieldLogic {
    pub fn new(field: impl Into<String>, criteria: Criteria) -> Self {
        Self {
            field: field.into(),
            criteria,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn masters(&self) -> Vec<String> {
        self.criteria.master_list()
    }

    pub fn eval_script(&self) -> String {
        self.criteria.to_script()
    }

    /// Whether the field's constraints apply to the current values
    pub fn validation_applies(&self, ctx: &ValidationContext<'_>) -> Result<bool, ValidatorError> {
        self.criteria.evaluate(ctx)
    }

    /// Tag the field and expose masters and expression to the client.
    ///
    /// Attributes are only written once the criteria name a master.
    pub fn render(&self, form: &mut dyn FormAdapter) -> Result<(), ValidatorError> {
        if !form.has_field(&self.field) {
            return Err(ValidatorError::FieldNotInForm(self.field.clone()));
        }

        form.add_field_class(&self.field, LOGIC_CLASSES);
        let masters = self.masters();
        if !masters.is_empty() {
            form.set_field_attribute(&self.field, MASTERS_ATTRIBUTE, &masters.join(","));
            form.set_field_attribute(&self.field, EVAL_ATTRIBUTE, &self.eval_script());
        }
        Ok(())
    }

    pub fn clear(&self, form: &mut dyn FormAdapter) {
        form.remove_field_class(&self.field, LOGIC_CLASSES);
        form.remove_field_attribute(&self.field, MASTERS_ATTRIBUTE);
        form.remove_field_attribute(&self.field, EVAL_ATTRIBUTE);
    }
}
