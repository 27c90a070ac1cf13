// File: src/form.rs
// Purpose: The form framework boundary and an in-memory form implementing it

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ValidationError;
use crate::submission::{FieldValue, SubmittedData};

/// Scripts the validator asks the host page to load
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScriptRequirement {
    Jquery,
    /// The client-side validation engine, localized
    ClientEngine { language: String },
    /// Conditional-logic glue that re-evaluates slaves when masters change
    ValidatorGlue,
    /// Tear down client validation when this action is clicked
    NoValidationAction { action_id: String },
}

/// Capabilities a form framework exposes to the validator.
///
/// Field order returned by [`FormAdapter::field_names`] drives the order in
/// which validation errors are reported.
pub trait FormAdapter {
    fn name(&self) -> &str;

    /// Data field names in form order
    fn field_names(&self) -> Vec<String>;

    fn has_field(&self, name: &str) -> bool {
        self.field_names().iter().any(|n| n == name)
    }

    /// HTML id of a field, used by cross-field client markers
    fn field_id(&self, name: &str) -> Option<String>;

    fn field_attribute(&self, name: &str, key: &str) -> Option<String>;

    /// Returns false when the field does not exist
    fn set_field_attribute(&mut self, name: &str, key: &str, value: &str) -> bool;

    fn remove_field_attribute(&mut self, name: &str, key: &str);

    fn add_field_class(&mut self, name: &str, class: &str);

    fn remove_field_class(&mut self, name: &str, class: &str);

    fn field_has_class(&self, name: &str, class: &str) -> bool;

    fn attribute(&self, key: &str) -> Option<String>;

    fn set_attribute(&mut self, key: &str, value: &str);

    fn remove_attribute(&mut self, key: &str);

    fn add_class(&mut self, class: &str);

    fn remove_class(&mut self, class: &str);

    fn has_class(&self, class: &str) -> bool;

    /// Whether the owning controller belongs to an administrative surface
    fn is_admin_context(&self) -> bool {
        false
    }

    fn has_security_token_field(&self) -> bool {
        false
    }

    fn disable_security_token(&mut self) {}

    /// Submit actions that bypass validation entirely
    fn no_validation_actions(&self) -> Vec<String> {
        Vec::new()
    }

    fn require_script(&mut self, _script: ScriptRequirement) {}

    /// Validators the framework attaches to fields itself
    fn run_field_validators(&self, _data: &SubmittedData, _errors: &mut Vec<ValidationError>) -> bool {
        true
    }

    /// Requiredness declared outside the validator
    fn field_is_required(&self, _name: &str) -> bool {
        false
    }
}

type IntrinsicCheck = Box<dyn Fn(&FieldValue) -> Option<String>>;

/// A field of a [`MemoryForm`]
#[derive(Debug, Clone, Default)]
pub struct MemoryField {
    pub name: String,
    pub id: String,
    pub value: FieldValue,
    pub attributes: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub required: bool,
}

impl MemoryField {
    /// Render attributes as an HTML attribute string
    pub fn render_attrs(&self) -> String {
        let mut attrs = vec![format!(r#"id="{}""#, self.id), format!(r#"name="{}""#, self.name)];

        if let FieldValue::Text(value) = &self.value {
            attrs.push(format!(r#"value="{}""#, value.replace('"', "&quot;")));
        }

        if !self.classes.is_empty() {
            attrs.push(format!(r#"class="{}""#, self.classes.join(" ")));
        }

        for (key, value) in &self.attributes {
            if value.is_empty() {
                attrs.push(key.clone());
            } else {
                attrs.push(format!(r#"{}="{}""#, key, value.replace('"', "&quot;")));
            }
        }

        attrs.join(" ")
    }
}

/// In-memory form implementing [`FormAdapter`]
pub struct MemoryForm {
    name: String,
    fields: Vec<MemoryField>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    admin: bool,
    security_token: bool,
    security_token_field: bool,
    actions: Vec<(String, bool)>,
    scripts: Vec<ScriptRequirement>,
    intrinsic: Vec<(String, IntrinsicCheck)>,
}

impl fmt::Debug for MemoryForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryForm")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("classes", &self.classes)
            .field("admin", &self.admin)
            .finish()
    }
}

impl MemoryForm {
    /// Create a form with text fields named `fields`
    pub fn new(name: impl Into<String>, fields: &[&str]) -> Self {
        let mut form = Self {
            name: name.into(),
            fields: Vec::new(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            admin: false,
            security_token: true,
            security_token_field: false,
            actions: Vec::new(),
            scripts: Vec::new(),
            intrinsic: Vec::new(),
        };
        for field in fields {
            form.add_field(field);
        }
        form
    }

    /// HTML id of the form element
    pub fn html_id(&self) -> String {
        format!("Form_{}", self.name)
    }

    pub fn add_field(&mut self, name: &str) -> &mut MemoryField {
        let id = format!("{}_{}", self.html_id(), name);
        self.fields.push(MemoryField {
            name: name.to_string(),
            id,
            ..MemoryField::default()
        });
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }

    pub fn field(&self, name: &str) -> Option<&MemoryField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut MemoryField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Mark the form as owned by an administrative controller
    pub fn admin(mut self) -> Self {
        self.admin = true;
        self
    }

    pub fn with_security_token_field(mut self) -> Self {
        self.security_token_field = true;
        self
    }

    /// Register a submit action. `validates = false` makes it a bypass action.
    pub fn with_action(mut self, name: impl Into<String>, validates: bool) -> Self {
        self.actions.push((name.into(), validates));
        self
    }

    /// Attach a framework-level check to a field
    pub fn with_field_validator<F>(mut self, field: impl Into<String>, check: F) -> Self
    where
        F: Fn(&FieldValue) -> Option<String> + 'static,
    {
        self.intrinsic.push((field.into(), Box::new(check)));
        self
    }

    /// Copy submitted values into the fields for re-rendering
    pub fn load_data_from(&mut self, data: &SubmittedData) {
        for field in &mut self.fields {
            if let Some(value) = data.get(&field.name) {
                field.value = value.clone();
            }
        }
    }

    pub fn security_token_enabled(&self) -> bool {
        self.security_token
    }

    pub fn scripts(&self) -> &[ScriptRequirement] {
        &self.scripts
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

fn push_class(classes: &mut Vec<String>, class: &str) {
    for c in class.split_whitespace() {
        if !classes.iter().any(|existing| existing == c) {
            classes.push(c.to_string());
        }
    }
}

fn drop_class(classes: &mut Vec<String>, class: &str) {
    let remove: Vec<&str> = class.split_whitespace().collect();
    classes.retain(|c| !remove.contains(&c.as_str()));
}

impl FormAdapter for MemoryForm {
    fn name(&self) -> &str {
        &self.name
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    fn field_id(&self, name: &str) -> Option<String> {
        self.field(name).map(|f| f.id.clone())
    }

    fn field_attribute(&self, name: &str, key: &str) -> Option<String> {
        self.field(name)?.attributes.get(key).cloned()
    }

    fn set_field_attribute(&mut self, name: &str, key: &str, value: &str) -> bool {
        match self.field_mut(name) {
            Some(field) => {
                field.attributes.insert(key.to_string(), value.to_string());
                true
            }
            None => false,
        }
    }

    fn remove_field_attribute(&mut self, name: &str, key: &str) {
        if let Some(field) = self.field_mut(name) {
            field.attributes.remove(key);
        }
    }

    fn add_field_class(&mut self, name: &str, class: &str) {
        if let Some(field) = self.field_mut(name) {
            push_class(&mut field.classes, class);
        }
    }

    fn remove_field_class(&mut self, name: &str, class: &str) {
        if let Some(field) = self.field_mut(name) {
            drop_class(&mut field.classes, class);
        }
    }

    fn field_has_class(&self, name: &str, class: &str) -> bool {
        self.field(name)
            .map(|f| f.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    fn attribute(&self, key: &str) -> Option<String> {
        self.attributes.get(key).cloned()
    }

    fn set_attribute(&mut self, key: &str, value: &str) {
        self.attributes.insert(key.to_string(), value.to_string());
    }

    fn remove_attribute(&mut self, key: &str) {
        self.attributes.remove(key);
    }

    fn add_class(&mut self, class: &str) {
        push_class(&mut self.classes, class);
    }

    fn remove_class(&mut self, class: &str) {
        drop_class(&mut self.classes, class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn is_admin_context(&self) -> bool {
        self.admin
    }

    fn has_security_token_field(&self) -> bool {
        self.security_token_field
    }

    fn disable_security_token(&mut self) {
        self.security_token = false;
    }

    fn no_validation_actions(&self) -> Vec<String> {
        self.actions
            .iter()
            .filter(|(_, validates)| !validates)
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn require_script(&mut self, script: ScriptRequirement) {
        if !self.scripts.contains(&script) {
            self.scripts.push(script);
        }
    }

    fn run_field_validators(&self, data: &SubmittedData, errors: &mut Vec<ValidationError>) -> bool {
        let mut valid = true;
        for (field, check) in &self.intrinsic {
            let value = data.get(field).cloned().unwrap_or_default();
            if let Some(message) = check(&value) {
                errors.push(ValidationError::new(field.clone(), message, "validation"));
                valid = false;
            }
        }
        valid
    }

    fn field_is_required(&self, name: &str) -> bool {
        self.field(name).map(|f| f.required).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_ids_follow_form_name() {
        let form = MemoryForm::new("Form", &["Title", "Subtitle"]);
        assert_eq!(form.field_id("Subtitle").as_deref(), Some("Form_Form_Subtitle"));
        assert_eq!(form.field_names(), vec!["Title", "Subtitle"]);
    }

    #[test]
    fn test_set_attribute_on_missing_field() {
        let mut form = MemoryForm::new("Form", &["Title"]);
        assert!(form.set_field_attribute("Title", "data-x", "1"));
        assert!(!form.set_field_attribute("Nope", "data-x", "1"));
        assert_eq!(form.field_attribute("Title", "data-x").as_deref(), Some("1"));
    }

    #[test]
    fn test_classes_are_deduplicated() {
        let mut form = MemoryForm::new("Form", &["Title"]);
        form.add_field_class("Title", "a b");
        form.add_field_class("Title", "b c");
        assert_eq!(form.field("Title").map(|f| f.classes.clone()), Some(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string()
        ]));
        form.remove_field_class("Title", "a c");
        assert!(form.field_has_class("Title", "b"));
        assert!(!form.field_has_class("Title", "a"));
    }

    #[test]
    fn test_render_attrs() {
        let mut form = MemoryForm::new("Form", &["Title"]);
        form.set_field_attribute("Title", "data-parsley-required", "true");
        form.set_field_attribute("Title", "autofocus", "");
        let rendered = form.field("Title").map(MemoryField::render_attrs).unwrap_or_default();
        assert_eq!(
            rendered,
            r#"id="Form_Form_Title" name="Title" autofocus data-parsley-required="true""#
        );
    }

    #[test]
    fn test_loaded_values_render() {
        let mut form = MemoryForm::new("Form", &["Title", "Subtitle"]);
        form.load_data_from(&SubmittedData::new().with("Title", "say \"hi\""));

        let title = form.field("Title").map(MemoryField::render_attrs).unwrap_or_default();
        assert_eq!(title, r#"id="Form_Form_Title" name="Title" value="say &quot;hi&quot;""#);
        let subtitle = form.field("Subtitle").map(MemoryField::render_attrs).unwrap_or_default();
        assert_eq!(subtitle, r#"id="Form_Form_Subtitle" name="Subtitle""#);
    }

    #[test]
    fn test_no_validation_actions() {
        let form = MemoryForm::new("Form", &[])
            .with_action("submit", true)
            .with_action("cancel", false);
        assert_eq!(form.no_validation_actions(), vec!["cancel"]);
    }
}
