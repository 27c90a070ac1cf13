// File: src/constraint/mod.rs
// Purpose: Constraint trait, type tags, shared state and the validation context

use std::fmt;

use crate::error::{ConfigError, ValidatorError};
use crate::form::FormAdapter;
use crate::messages::{DefaultTranslator, Translator};
use crate::remote::RemoteTransport;
use crate::submission::{FieldValue, SubmittedData};

pub mod compare;
pub mod date;
pub mod dimension;
pub mod pattern;
pub mod range;
pub mod remote;
pub mod required;
pub mod types;

pub use compare::{Comparison, ComparisonOp, EqualTo, NotEqualTo};
pub use date::Date;
pub use dimension::{Dimension, DimensionRule, ImageInspector};
pub use pattern::Regex;
pub use range::{Bounds, Check, Length, Value, Words};
pub use remote::Remote;
pub use required::Required;
pub use types::{DataType, Type};

/// Prefix of every client marker attribute
pub const CLIENT_PREFIX: &str = "data-parsley-";

/// Stable identity of a constraint variant.
///
/// A field holds at most one constraint per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKind {
    Required,
    Length,
    Value,
    Regex,
    Remote,
    Type,
    EqualTo,
    NotEqualTo,
    Comparison,
    Words,
    Date,
    Dimension,
    Check,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::Required => "required",
            ConstraintKind::Length => "length",
            ConstraintKind::Value => "value",
            ConstraintKind::Regex => "regex",
            ConstraintKind::Remote => "remote",
            ConstraintKind::Type => "type",
            ConstraintKind::EqualTo => "equalto",
            ConstraintKind::NotEqualTo => "notequalto",
            ConstraintKind::Comparison => "comparison",
            ConstraintKind::Words => "words",
            ConstraintKind::Date => "date",
            ConstraintKind::Dimension => "dimension",
            ConstraintKind::Check => "check",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State shared by every constraint: bound field, custom message and the
/// marker keys currently applied to the field.
#[derive(Debug, Clone, Default)]
pub struct ConstraintBase {
    field: Option<String>,
    message: Option<String>,
    applied: Vec<String>,
}

impl ConstraintBase {
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn custom_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn applied_markers(&self) -> &[String] {
        &self.applied
    }
}

/// Outcome of a server-side check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// `message` replaces the constraint's message for this failure
    Fail { message: Option<String> },
}

impl Verdict {
    pub fn fail() -> Self {
        Verdict::Fail { message: None }
    }

    pub fn from_bool(ok: bool) -> Self {
        if ok {
            Verdict::Pass
        } else {
            Verdict::fail()
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Read-only view of everything a constraint may consult while validating
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    data: &'a SubmittedData,
    form: Option<&'a dyn FormAdapter>,
    translator: &'a dyn Translator,
    transport: Option<&'a dyn RemoteTransport>,
    images: Option<&'a dyn ImageInspector>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(data: &'a SubmittedData) -> Self {
        Self {
            data,
            form: None,
            translator: &DefaultTranslator,
            transport: None,
            images: None,
        }
    }

    pub fn with_form(mut self, form: &'a dyn FormAdapter) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_translator(mut self, translator: &'a dyn Translator) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_transport(mut self, transport: &'a dyn RemoteTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_images(mut self, images: &'a dyn ImageInspector) -> Self {
        self.images = Some(images);
        self
    }

    /// Submitted value of another field.
    ///
    /// A field left out of the submission reads as empty, the same as the
    /// field under validation. Returns `None` only when a form is attached
    /// and has no such field.
    pub fn value_of(&self, name: &str) -> Option<FieldValue> {
        if self.form.is_some_and(|form| !form.has_field(name)) {
            return None;
        }
        Some(self.data.get(name).cloned().unwrap_or_default())
    }

    pub fn data(&self) -> &'a SubmittedData {
        self.data
    }

    pub fn form(&self) -> Option<&'a dyn FormAdapter> {
        self.form
    }

    pub fn translator(&self) -> &'a dyn Translator {
        self.translator
    }

    pub fn transport(&self) -> Option<&'a dyn RemoteTransport> {
        self.transport
    }

    pub fn images(&self) -> Option<&'a dyn ImageInspector> {
        self.images
    }
}

/// A typed predicate bound to one field.
///
/// Implementors supply the variant-specific parts; binding, messages, the
/// empty-value rule and client marker bookkeeping are provided.
pub trait Constraint: fmt::Debug {
    fn kind(&self) -> ConstraintKind;

    fn base(&self) -> &ConstraintBase;

    fn base_mut(&mut self) -> &mut ConstraintBase;

    /// Client predicate name, also used for the `-message` marker
    fn client_name(&self) -> &'static str;

    fn default_message(&self, translator: &dyn Translator) -> String;

    /// Markers describing this check to the client engine
    fn client_markers(&self, form: &dyn FormAdapter) -> Vec<(String, String)>;

    /// Variant check. Only called for non-empty values, except for Required.
    fn check(&self, value: &FieldValue, ctx: &ValidationContext<'_>) -> Result<Verdict, ValidatorError>;

    fn field(&self) -> Option<&str> {
        self.base().field()
    }

    /// Associate with a field. Rebinding to another field is an error.
    fn bind_field(&mut self, name: &str) -> Result<(), ConfigError> {
        let kind = self.kind().as_str();
        let base = self.base_mut();
        match &base.field {
            Some(bound) if bound != name => Err(ConfigError::AlreadyBound {
                kind,
                bound: bound.clone(),
                requested: name.to_string(),
            }),
            _ => {
                base.field = Some(name.to_string());
                Ok(())
            }
        }
    }

    fn set_message(&mut self, message: &str) {
        self.base_mut().message = Some(message.to_string());
    }

    /// Custom message if set, otherwise the localized default
    fn message(&self, translator: &dyn Translator) -> String {
        match self.base().custom_message() {
            Some(message) => message.to_string(),
            None => self.default_message(translator),
        }
    }

    /// Server-side check. Empty values pass every constraint except Required.
    fn evaluate(&self, value: &FieldValue, ctx: &ValidationContext<'_>) -> Result<Verdict, ValidatorError> {
        if value.is_empty() && self.kind() != ConstraintKind::Required {
            return Ok(Verdict::Pass);
        }
        self.check(value, ctx)
    }

    /// Check a lone text value with no other fields or capabilities around
    fn validate(&self, value: &str) -> bool {
        let data = SubmittedData::new();
        let ctx = ValidationContext::new(&data);
        self.evaluate(&FieldValue::from(value), &ctx)
            .map(|verdict| verdict.is_pass())
            .unwrap_or(false)
    }

    /// Variant markers plus the custom message marker
    fn describe_for_client(&self, form: &dyn FormAdapter) -> Vec<(String, String)> {
        let mut markers = self.client_markers(form);
        if let Some(message) = self.base().custom_message() {
            markers.push((
                format!("{}{}-message", CLIENT_PREFIX, self.client_name()),
                message.to_string(),
            ));
        }
        markers
    }

    /// Write markers onto the bound field, replacing any applied earlier
    fn apply_client_markers(&mut self, form: &mut dyn FormAdapter) -> Result<(), ValidatorError> {
        let field = match self.field() {
            Some(field) => field.to_string(),
            None => return Ok(()),
        };
        if !form.has_field(&field) {
            return Err(ValidatorError::FieldNotInForm(field));
        }

        self.clear_client_markers(form);
        let markers = self.describe_for_client(&*form);
        let mut applied = Vec::with_capacity(markers.len());
        for (key, value) in markers {
            form.set_field_attribute(&field, &key, &value);
            applied.push(key);
        }
        self.base_mut().applied = applied;
        Ok(())
    }

    /// Remove exactly the markers applied by [`Constraint::apply_client_markers`]
    fn clear_client_markers(&mut self, form: &mut dyn FormAdapter) {
        let applied = std::mem::take(&mut self.base_mut().applied);
        if let Some(field) = self.field() {
            for key in &applied {
                form.remove_field_attribute(field, key);
            }
        }
    }

    fn markers_applied(&self) -> bool {
        !self.base().applied.is_empty()
    }
}

/// Builder-style helpers for concrete constraints
pub trait ConstraintExt: Constraint + Sized {
    fn with_message(mut self, message: &str) -> Self {
        self.set_message(message);
        self
    }
}

impl<T: Constraint> ConstraintExt for T {}

/// Build a `data-parsley-<name>` marker
pub(crate) fn marker(name: &str, value: impl Into<String>) -> (String, String) {
    (format!("{}{}", CLIENT_PREFIX, name), value.into())
}

/// `#<id>` reference to another field for cross-field markers
pub(crate) fn field_reference(form: &dyn FormAdapter, name: &str) -> String {
    format!("#{}", form.field_id(name).unwrap_or_else(|| name.to_string()))
}

/// One constraint or several, for bulk registration
pub enum ConstraintSet {
    One(Box<dyn Constraint>),
    Many(Vec<Box<dyn Constraint>>),
}

impl ConstraintSet {
    pub fn into_vec(self) -> Vec<Box<dyn Constraint>> {
        match self {
            ConstraintSet::One(c) => vec![c],
            ConstraintSet::Many(cs) => cs,
        }
    }
}

impl<C: Constraint + 'static> From<C> for ConstraintSet {
    fn from(constraint: C) -> Self {
        ConstraintSet::One(Box::new(constraint))
    }
}

impl From<Box<dyn Constraint>> for ConstraintSet {
    fn from(constraint: Box<dyn Constraint>) -> Self {
        ConstraintSet::One(constraint)
    }
}

impl From<Vec<Box<dyn Constraint>>> for ConstraintSet {
    fn from(constraints: Vec<Box<dyn Constraint>>) -> Self {
        ConstraintSet::Many(constraints)
    }
}
