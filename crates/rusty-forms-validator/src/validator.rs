// File: src/validator.rs
// Purpose: Constraint registry for one form, client marker sync and server-side validation

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::{debug, info, trace, warn};

use crate::config::ValidatorConfig;
use crate::constraint::{
    Constraint, ConstraintKind, ConstraintSet, ImageInspector, Required, ValidationContext, Verdict,
};
use crate::error::{ConfigError, ValidationError, ValidationResult, ValidatorError};
use crate::field_logic::FieldLogic;
use crate::form::{FormAdapter, MemoryForm, ScriptRequirement};
use crate::logic::{Criteria, CriteriaBuilder, CriteriaParent};
use crate::messages::{DefaultTranslator, Translator};
use crate::remote::RemoteTransport;
use crate::submission::SubmittedData;

/// Form attribute switching the client engine on
pub const VALIDATE_ATTRIBUTE: &str = "data-parsley-validate";

/// Form class tagging client-side validation as active
pub const FORM_CLASS: &str = "parsley";

/// Whether constraints are mirrored as client markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientSync {
    Enabled,
    Disabled,
    /// Forced off because the form belongs to an administrative interface
    AdminDisabled,
}

/// A field to make required, optionally with a custom message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredField {
    pub name: String,
    pub message: Option<String>,
}

impl From<&str> for RequiredField {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
            message: None,
        }
    }
}

impl From<String> for RequiredField {
    fn from(name: String) -> Self {
        Self { name, message: None }
    }
}

impl From<(&str, &str)> for RequiredField {
    fn from((name, message): (&str, &str)) -> Self {
        Self {
            name: name.to_string(),
            message: Some(message.to_string()),
        }
    }
}

type FieldConstraints = BTreeMap<ConstraintKind, Box<dyn Constraint>>;

/// Owns every constraint declared for one form.
///
/// Constraints are keyed by field name and [`ConstraintKind`], so a field
/// holds at most one constraint of each kind. While client sync is enabled
/// and a form is attached, markers on the form follow registrations.
pub struct FormValidator<F: FormAdapter = MemoryForm> {
    constraints: HashMap<String, FieldConstraints>,
    order: Vec<String>,
    logic: HashMap<String, FieldLogic>,
    form: Option<F>,
    client_sync: ClientSync,
    config: ValidatorConfig,
    translator: Box<dyn Translator>,
    transport: Option<Box<dyn RemoteTransport>>,
    images: Option<Box<dyn ImageInspector>>,
    errors: Vec<ValidationError>,
}

impl<F: FormAdapter> fmt::Debug for FormValidator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constraints: BTreeMap<&str, Vec<ConstraintKind>> = self
            .constraints
            .iter()
            .map(|(field, set)| (field.as_str(), set.keys().copied().collect()))
            .collect();

        f.debug_struct("FormValidator")
            .field("constraints", &constraints)
            .field("logic", &self.logic.keys().collect::<Vec<_>>())
            .field("form", &self.form.as_ref().map(|form| form.name().to_string()))
            .field("client_sync", &self.client_sync)
            .field("errors", &self.errors)
            .finish()
    }
}

impl<F: FormAdapter> Default for FormValidator<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FormAdapter> FormValidator<F> {
    /// Validator with default configuration and client sync enabled
    pub fn new() -> Self {
        Self {
            constraints: HashMap::new(),
            order: Vec::new(),
            logic: HashMap::new(),
            form: None,
            client_sync: ClientSync::Enabled,
            config: ValidatorConfig::default(),
            translator: Box::new(DefaultTranslator),
            transport: None,
            images: None,
            errors: Vec::new(),
        }
    }

    /// Validator using the config's client settings and message overrides
    pub fn with_config(config: ValidatorConfig) -> Self {
        let client_sync = if config.client.enabled {
            ClientSync::Enabled
        } else {
            ClientSync::Disabled
        };
        Self {
            client_sync,
            translator: Box::new(config.message_catalog()),
            config,
            ..Self::new()
        }
    }

    pub fn with_translator<T: Translator + 'static>(mut self, translator: T) -> Self {
        self.translator = Box::new(translator);
        self
    }

    pub fn with_transport<T: RemoteTransport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn with_image_inspector<I: ImageInspector + 'static>(mut self, images: I) -> Self {
        self.images = Some(Box::new(images));
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn translator(&self) -> &dyn Translator {
        self.translator.as_ref()
    }

    fn sync_active(&self) -> bool {
        self.client_sync == ClientSync::Enabled && self.form.is_some()
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    /// Install a constraint on a field, replacing one of the same kind
    pub fn set_constraint<C: Constraint + 'static>(
        &mut self,
        field: &str,
        constraint: C,
    ) -> Result<&mut Self, ValidatorError> {
        self.set_boxed_constraint(field, Box::new(constraint))
    }

    pub fn set_boxed_constraint(
        &mut self,
        field: &str,
        mut constraint: Box<dyn Constraint>,
    ) -> Result<&mut Self, ValidatorError> {
        constraint.bind_field(field)?;
        let kind = constraint.kind();

        if self.sync_active() && !self.form.as_ref().is_some_and(|form| form.has_field(field)) {
            return Err(ValidatorError::FieldNotInForm(field.to_string()));
        }

        if let Some(mut previous) = self.constraints.get_mut(field).and_then(|set| set.remove(&kind)) {
            debug!("Replacing {} constraint on {}", kind, field);
            if let Some(form) = self.form.as_mut() {
                previous.clear_client_markers(form);
            }
        }

        if self.client_sync == ClientSync::Enabled {
            if let Some(form) = self.form.as_mut() {
                constraint.apply_client_markers(form)?;
            }
        }

        debug!("Installed {} constraint on {}", kind, field);
        if !self.order.iter().any(|name| name == field) {
            self.order.push(field.to_string());
        }
        self.constraints
            .entry(field.to_string())
            .or_default()
            .insert(kind, constraint);
        Ok(self)
    }

    /// Bulk form of [`FormValidator::set_constraint`]
    pub fn set_constraints<I, K, S>(&mut self, constraints: I) -> Result<&mut Self, ValidatorError>
    where
        I: IntoIterator<Item = (K, S)>,
        K: AsRef<str>,
        S: Into<ConstraintSet>,
    {
        for (field, set) in constraints {
            for constraint in set.into().into_vec() {
                self.set_boxed_constraint(field.as_ref(), constraint)?;
            }
        }
        Ok(self)
    }

    pub fn get_constraint(&self, field: &str, kind: ConstraintKind) -> Option<&dyn Constraint> {
        self.constraints.get(field)?.get(&kind).map(|c| c.as_ref())
    }

    /// Constraints of a field, ordered by kind
    pub fn get_constraints(&self, field: &str) -> Vec<&dyn Constraint> {
        self.constraints
            .get(field)
            .map(|set| set.values().map(|c| c.as_ref()).collect())
            .unwrap_or_default()
    }

    /// Detach and drop one constraint; absent constraints are ignored
    pub fn remove_constraint(&mut self, field: &str, kind: ConstraintKind) -> &mut Self {
        if let Some(mut constraint) = self.constraints.get_mut(field).and_then(|set| set.remove(&kind)) {
            if let Some(form) = self.form.as_mut() {
                constraint.clear_client_markers(form);
            }
            debug!("Removed {} constraint from {}", kind, field);
        }
        self.forget_if_empty(field);
        self
    }

    /// Detach and drop every constraint of a field
    pub fn remove_constraints(&mut self, field: &str) -> &mut Self {
        if let Some(set) = self.constraints.remove(field) {
            for (_, mut constraint) in set {
                if let Some(form) = self.form.as_mut() {
                    constraint.clear_client_markers(form);
                }
            }
            debug!("Removed all constraints from {}", field);
        }
        self.forget_if_empty(field);
        self
    }

    fn forget_if_empty(&mut self, field: &str) {
        if self.constraints.get(field).map_or(true, BTreeMap::is_empty) {
            self.constraints.remove(field);
            self.order.retain(|name| name != field);
        }
    }

    /// Install [`Required`] on each field, e.g. `["Title"]` or
    /// `[("Title", "Please add a title")]`
    pub fn add_required_fields<I, R>(&mut self, fields: I) -> Result<&mut Self, ValidatorError>
    where
        I: IntoIterator<Item = R>,
        R: Into<RequiredField>,
    {
        for field in fields {
            let field = field.into();
            let mut required = Required::new();
            if let Some(message) = &field.message {
                required.set_message(message);
            }
            self.set_constraint(&field.name, required)?;
        }
        Ok(self)
    }

    /// Registered field names in registration order
    pub fn fields(&self) -> &[String] {
        &self.order
    }

    /// Detach and drop every constraint and every piece of field logic
    pub fn clear_all_validation(&mut self) -> &mut Self {
        let fields = self.order.clone();
        for field in &fields {
            self.remove_constraints(field);
        }
        if let Some(form) = self.form.as_mut() {
            for logic in self.logic.values() {
                logic.clear(form);
            }
        }
        self.logic.clear();
        self.errors.clear();
        debug!("Cleared all validation");
        self
    }

    /// Required constraint registered, or the form marks the field required
    pub fn field_is_required(&self, field: &str) -> bool {
        self.get_constraint(field, ConstraintKind::Required).is_some()
            || self
                .form
                .as_ref()
                .is_some_and(|form| form.field_is_required(field))
    }

    // ---------------------------------------------------------------------
    // Form attachment and client sync
    // ---------------------------------------------------------------------

    /// Bind the registry to a form and sync markers onto it.
    ///
    /// A previously attached form is detached first. Fields the form lacks are
    /// left alone until validation skips them.
    pub fn attach_to_form(&mut self, mut form: F) -> Result<&mut Self, ValidatorError> {
        self.detach_form();

        if !form.has_security_token_field() {
            form.disable_security_token();
        }

        if form.is_admin_context() && self.client_sync == ClientSync::Enabled {
            info!("Client-side validation disabled for administrative form {}", form.name());
            self.client_sync = ClientSync::AdminDisabled;
        }

        self.form = Some(form);
        self.render_logic()?;
        if self.client_sync == ClientSync::Enabled {
            self.apply_client_sync()?;
        }
        Ok(self)
    }

    /// Remove every marker this registry put on the form and hand it back
    pub fn detach_form(&mut self) -> Option<F> {
        self.remove_client_sync();
        let mut form = self.form.take()?;
        for logic in self.logic.values() {
            logic.clear(&mut form);
        }
        if self.client_sync == ClientSync::AdminDisabled {
            self.client_sync = ClientSync::Enabled;
        }
        Some(form)
    }

    pub fn form(&self) -> Option<&F> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut F> {
        self.form.as_mut()
    }

    pub fn client_sync(&self) -> ClientSync {
        self.client_sync
    }

    pub fn client_sync_enabled(&self) -> bool {
        self.client_sync == ClientSync::Enabled
    }

    /// Mirror constraints as client markers. Administrative forms stay off.
    pub fn enable_client_sync(&mut self) -> Result<&mut Self, ValidatorError> {
        if self.form.as_ref().is_some_and(|form| form.is_admin_context()) {
            info!("Client-side validation stays disabled on administrative forms");
            self.client_sync = ClientSync::AdminDisabled;
            return Ok(self);
        }

        self.client_sync = ClientSync::Enabled;
        self.apply_client_sync()?;
        Ok(self)
    }

    /// Remove all client markers and the form-level activation tag
    pub fn disable_client_sync(&mut self) -> &mut Self {
        self.remove_client_sync();
        self.client_sync = ClientSync::Disabled;
        self
    }

    fn apply_client_sync(&mut self) -> Result<(), ValidatorError> {
        let form = match self.form.as_mut() {
            Some(form) => form,
            None => return Ok(()),
        };

        form.set_attribute(VALIDATE_ATTRIBUTE, "true");
        form.add_class(FORM_CLASS);

        if self.config.client.include_jquery {
            form.require_script(ScriptRequirement::Jquery);
        }
        form.require_script(ScriptRequirement::ClientEngine {
            language: self.config.client.language.clone(),
        });
        form.require_script(ScriptRequirement::ValidatorGlue);
        for action_id in form.no_validation_actions() {
            form.require_script(ScriptRequirement::NoValidationAction { action_id });
        }

        for field in &self.order {
            if !form.has_field(field) {
                debug!("Field {} is not in form {}, markers deferred", field, form.name());
                continue;
            }
            if let Some(set) = self.constraints.get_mut(field) {
                for constraint in set.values_mut() {
                    constraint.apply_client_markers(form)?;
                }
            }
        }
        debug!("Client markers applied to form {}", form.name());
        Ok(())
    }

    fn remove_client_sync(&mut self) {
        let form = match self.form.as_mut() {
            Some(form) => form,
            None => return,
        };

        for set in self.constraints.values_mut() {
            for constraint in set.values_mut() {
                constraint.clear_client_markers(form);
            }
        }
        form.remove_attribute(VALIDATE_ATTRIBUTE);
        form.remove_class(FORM_CLASS);
        debug!("Client markers removed from form {}", form.name());
    }

    // ---------------------------------------------------------------------
    // Conditional logic
    // ---------------------------------------------------------------------

    /// Validate `field` only when the chained criteria hold, starting on `master`.
    ///
    /// ```ignore
    /// validator
    ///     .validate_if("Frequency", "Newsletter")
    ///     .is_checked()
    ///     .end()?;
    /// ```
    pub fn validate_if(&mut self, field: &str, master: &str) -> CriteriaBuilder<LogicSlot<'_, F>> {
        CriteriaBuilder::new(
            LogicSlot {
                validator: self,
                field: field.to_string(),
            },
            master.to_string(),
        )
    }

    /// Attach already built criteria to a field
    pub fn set_logic(&mut self, field: &str, criteria: Criteria) -> Result<&mut Self, ValidatorError> {
        let logic = FieldLogic::new(field, criteria);
        if let Some(form) = self.form.as_mut() {
            if let Some(previous) = self.logic.get(field) {
                previous.clear(form);
            }
            if form.has_field(field) {
                logic.render(form)?;
            }
        }
        debug!("Conditional logic on {} depends on {:?}", field, logic.masters());
        self.logic.insert(field.to_string(), logic);
        Ok(self)
    }

    pub fn logic(&self, field: &str) -> Option<&FieldLogic> {
        self.logic.get(field)
    }

    /// Write logic classes and attributes for every dependent field in the form
    pub fn render_logic(&mut self) -> Result<(), ValidatorError> {
        let form = match self.form.as_mut() {
            Some(form) => form,
            None => return Ok(()),
        };
        for logic in self.logic.values() {
            if form.has_field(logic.field()) {
                logic.render(form)?;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Server-side validation
    // ---------------------------------------------------------------------

    /// Check a submission against every applicable constraint.
    ///
    /// All fields are checked; failures are recorded and available from
    /// [`FormValidator::errors`]. Only configuration mistakes abort the pass.
    pub fn run_server_validation(&mut self, data: &SubmittedData) -> Result<bool, ValidatorError> {
        self.errors.clear();

        if let (Some(action), Some(form)) = (data.action(), self.form.as_ref()) {
            if form.no_validation_actions().iter().any(|name| name == action) {
                warn!("Validation bypassed by action {}", action);
                return Ok(true);
            }
        }

        let mut errors = Vec::new();
        let mut valid = match self.form.as_ref() {
            Some(form) => form.run_field_validators(data, &mut errors),
            None => true,
        };

        let mut ctx = ValidationContext::new(data).with_translator(self.translator.as_ref());
        if let Some(form) = self.form.as_ref() {
            ctx = ctx.with_form(form);
        }
        if let Some(transport) = self.transport.as_deref() {
            ctx = ctx.with_transport(transport);
        }
        if let Some(images) = self.images.as_deref() {
            ctx = ctx.with_images(images);
        }

        let fields: Vec<&String> = match self.form.as_ref() {
            Some(form) => {
                let names = form.field_names();
                let mut ordered: Vec<&String> = self
                    .order
                    .iter()
                    .filter(|field| names.contains(*field))
                    .collect();
                ordered.sort_by_key(|field| names.iter().position(|name| name == *field));
                ordered
            }
            None => self.order.iter().collect(),
        };

        for field in fields {
            if let Some(logic) = self.logic.get(field.as_str()) {
                if !logic.validation_applies(&ctx)? {
                    trace!("Skipping {}: conditional logic does not hold", field);
                    continue;
                }
            }

            let value = data.get(field).cloned().unwrap_or_default();
            let set = match self.constraints.get(field.as_str()) {
                Some(set) => set,
                None => continue,
            };

            for constraint in set.values() {
                if let Verdict::Fail { message } = constraint.evaluate(&value, &ctx)? {
                    let message = message.unwrap_or_else(|| constraint.message(ctx.translator()));
                    errors.push(ValidationError::new(
                        field.as_str(),
                        message,
                        constraint.kind().as_str(),
                    ));
                    valid = false;
                }
            }
        }

        debug!("Server validation finished: {} error(s)", errors.len());
        self.errors = errors;
        Ok(valid)
    }

    /// Failures recorded by the last validation pass, in field order
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn errors_by_field(&self) -> HashMap<String, Vec<String>> {
        self.result().errors
    }

    pub fn result(&self) -> ValidationResult {
        ValidationResult::from_errors(&self.errors)
    }
}

/// Stores finished criteria as a field's logic when the builder ends
pub struct LogicSlot<'a, F: FormAdapter> {
    validator: &'a mut FormValidator<F>,
    field: String,
}

impl<'a, F: FormAdapter> CriteriaParent for LogicSlot<'a, F> {
    type Output = Result<&'a mut FormValidator<F>, ValidatorError>;

    fn close(self, node: Criteria, error: Option<ConfigError>) -> Self::Output {
        if let Some(e) = error {
            return Err(e.into());
        }
        let LogicSlot { validator, field } = self;
        validator.set_logic(&field, node)
    }
}
