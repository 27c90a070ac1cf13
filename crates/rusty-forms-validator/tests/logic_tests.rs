/// Integration tests for conditional validation logic
///
/// Covers criteria building, master lists, client rendering and how logic
/// gates constraints during server validation.

use pretty_assertions::assert_eq;
use rusty_forms_validator::{
    ConfigError, Criteria, FieldValue, FormAdapter, FormValidator, Length, LogicalOperator,
    MemoryForm, SubmittedData, ValidatorError,
};

fn signup() -> FormValidator {
    let mut validator = FormValidator::new();
    validator
        .attach_to_form(MemoryForm::new(
            "Signup",
            &["Newsletter", "Email", "Frequency", "Topics", "Age"],
        ))
        .unwrap();
    validator
}

// ============================================================================
// Building criteria
// ============================================================================

#[test]
fn test_master_list_from_nested_group() {
    let criteria = Criteria::when("X")
        .and_if("X")
        .is_equal_to("1")
        .group()
        .or_if("Y")
        .is_checked()
        .end()
        .end()
        .unwrap();

    assert_eq!(criteria.master_list(), vec!["X", "Y"]);
    assert_eq!(criteria.logical_operator(), Some(LogicalOperator::And));
}

#[test]
fn test_and_then_or_on_same_node_fails() {
    let result = Criteria::when("A").and_if("A").is_checked().or_if("B").end();

    let err = result.unwrap_err();
    assert_eq!(
        err,
        ConfigError::ConflictingLogicalOperator {
            first: "and_if",
            attempted: "or_if"
        }
    );
    assert!(err.to_string().contains("Specified or_if() after calling and_if()"));
}

#[test]
fn test_or_then_and_on_same_node_fails() {
    let result = Criteria::when("A").or_if("A").is_checked().and_if("B").end();
    assert_eq!(
        result.unwrap_err(),
        ConfigError::ConflictingLogicalOperator {
            first: "or_if",
            attempted: "and_if"
        }
    );
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_dependent_field_markup() {
    let mut validator = signup();
    validator
        .validate_if("Frequency", "Newsletter")
        .is_checked()
        .and_if("Email")
        .is_not_empty()
        .end()
        .unwrap();

    let form = validator.form().unwrap();
    let frequency = form.field("Frequency").unwrap();
    assert_eq!(
        frequency.classes,
        vec!["validation-logic", "validation-logic-exclude", "validation-logic-validate"]
    );
    assert_eq!(
        form.field_attribute("Frequency", "data-validation-logic-masters").as_deref(),
        Some("Newsletter,Email")
    );
    assert_eq!(
        form.field_attribute("Frequency", "data-validation-logic-eval").as_deref(),
        Some(r##"($("#Newsletter").evaluateChecked("") && $("#Email").evaluateNotEmpty(""))"##)
    );
}

#[test]
fn test_logic_declared_before_attach_is_rendered() {
    let mut validator: FormValidator = FormValidator::new();
    validator
        .validate_if("Topics", "Age")
        .is_greater_than(15)
        .end()
        .unwrap();
    validator
        .attach_to_form(MemoryForm::new("Signup", &["Topics", "Age"]))
        .unwrap();

    let form = validator.form().unwrap();
    assert_eq!(
        form.field_attribute("Topics", "data-validation-logic-eval").as_deref(),
        Some(r##"($("#Age").evaluateGreaterThan("15"))"##)
    );
}

// ============================================================================
// Gating server validation
// ============================================================================

#[test]
fn test_constraints_only_apply_when_logic_holds() {
    let mut validator = signup();
    validator.add_required_fields(["Frequency"]).unwrap();
    validator
        .validate_if("Frequency", "Newsletter")
        .is_checked()
        .end()
        .unwrap();

    let unticked = SubmittedData::new().with("Newsletter", "0");
    assert!(validator.run_server_validation(&unticked).unwrap());

    // Browsers leave unticked checkboxes out of the submission
    let omitted = SubmittedData::new().with("Frequency", "");
    assert!(validator.run_server_validation(&omitted).unwrap());

    let ticked = SubmittedData::new().with("Newsletter", "1");
    assert!(!validator.run_server_validation(&ticked).unwrap());
    assert_eq!(validator.errors()[0].field_name, "Frequency");

    let complete = SubmittedData::new()
        .with("Newsletter", "1")
        .with("Frequency", "weekly");
    assert!(validator.run_server_validation(&complete).unwrap());
}

#[test]
fn test_omitted_master_ignores_form_default() {
    let mut validator = signup();
    validator
        .form_mut()
        .unwrap()
        .field_mut("Newsletter")
        .unwrap()
        .value = FieldValue::from("1");
    validator.add_required_fields(["Frequency"]).unwrap();
    validator
        .validate_if("Frequency", "Newsletter")
        .is_checked()
        .end()
        .unwrap();

    let data = SubmittedData::new().with("Frequency", "");
    assert!(validator.run_server_validation(&data).unwrap());
    assert!(validator.errors().is_empty());
}

#[test]
fn test_checkbox_group_and_range_predicates() {
    let mut validator = signup();
    validator
        .set_constraint("Email", Length::min(6))
        .unwrap();
    validator
        .validate_if("Email", "Topics")
        .has_checked_at_least(2)
        .or_if("Age")
        .is_between(18, 30)
        .end()
        .unwrap();

    let data = SubmittedData::new()
        .with("Topics", vec!["rust"])
        .with("Age", "40")
        .with("Email", "a@b");
    assert!(validator.run_server_validation(&data).unwrap());

    let data = SubmittedData::new()
        .with("Topics", vec!["rust", "go"])
        .with("Age", "40")
        .with("Email", "a@b");
    assert!(!validator.run_server_validation(&data).unwrap());

    let data = SubmittedData::new()
        .with("Topics", vec!["rust"])
        .with("Age", "25")
        .with("Email", "a@b");
    assert!(!validator.run_server_validation(&data).unwrap());
}

#[test]
fn test_unknown_master_is_fatal() {
    let mut validator = signup();
    validator.add_required_fields(["Email"]).unwrap();
    validator
        .validate_if("Email", "Nonexistent")
        .is_checked()
        .end()
        .unwrap();

    let result = validator.run_server_validation(&SubmittedData::new());
    assert!(matches!(
        result,
        Err(ValidatorError::UnknownMasterField(name)) if name == "Nonexistent"
    ));
}

#[test]
fn test_operator_by_name() {
    let mut validator = signup();
    validator.add_required_fields(["Email"]).unwrap();
    validator
        .validate_if("Email", "Newsletter")
        .criterion("isEqualTo", &["yes"])
        .end()
        .unwrap();

    assert!(validator
        .run_server_validation(&SubmittedData::new().with("Newsletter", "no"))
        .unwrap());
    assert!(!validator
        .run_server_validation(&SubmittedData::new().with("Newsletter", "yes"))
        .unwrap());

    let unknown = validator
        .validate_if("Email", "Newsletter")
        .criterion("isPurple", &[])
        .end();
    assert!(matches!(
        unknown,
        Err(ValidatorError::Config(ConfigError::UnknownOperator(name))) if name == "isPurple"
    ));
}
