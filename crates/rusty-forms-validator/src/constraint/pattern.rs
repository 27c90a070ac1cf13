// File: src/constraint/pattern.rs
// Purpose: Regular expression constraint

use super::{marker, Constraint, ConstraintBase, ConstraintKind, ValidationContext, Verdict};
use crate::error::{ConfigError, ValidatorError};
use crate::form::FormAdapter;
use crate::messages::Translator;
use crate::submission::FieldValue;

/// Value must match a pattern.
///
/// Accepts delimited patterns such as `/^#[0-9a-f]{6}$/i` as well as bare
/// ones. The client marker carries the pattern without delimiters.
#[derive(Debug, Clone)]
pub struct Regex {
    base: ConstraintBase,
    source: String,
    body: String,
    flags: String,
    compiled: regex::Regex,
}

/// Letters accepted after the closing delimiter
const FLAG_LETTERS: &str = "dgimsuxy";

/// Split `/body/flags` into its parts; bare patterns have no flags.
///
/// A leading `/` only counts as a delimiter when everything after the last
/// `/` is a flag letter, so `/docs/index` stays a bare pattern.
fn split_delimiters(pattern: &str) -> (&str, &str) {
    if !pattern.starts_with('/') {
        return (pattern, "");
    }
    match pattern.rfind('/') {
        Some(end) if end > 0 => {
            let flags = &pattern[end + 1..];
            if flags.chars().all(|c| FLAG_LETTERS.contains(c)) {
                (&pattern[1..end], flags)
            } else {
                (pattern, "")
            }
        }
        _ => (pattern, ""),
    }
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let (body, flags) = split_delimiters(pattern);

        let inline: String = flags.chars().filter(|c| matches!(c, 'i' | 'm' | 's' | 'x')).collect();
        let compiled_source = if inline.is_empty() {
            body.to_string()
        } else {
            format!("(?{}){}", inline, body)
        };

        let compiled = regex::Regex::new(&compiled_source).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            base: ConstraintBase::default(),
            source: pattern.to_string(),
            body: body.to_string(),
            flags: flags.chars().filter(|c| matches!(c, 'i' | 'm')).collect(),
            compiled,
        })
    }

    /// The pattern as declared
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Constraint for Regex {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Regex
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn client_name(&self) -> &'static str {
        "pattern"
    }

    fn default_message(&self, translator: &dyn Translator) -> String {
        translator.translate("validator.pattern", "This value seems to be invalid.", &[])
    }

    fn client_markers(&self, _form: &dyn FormAdapter) -> Vec<(String, String)> {
        let value = if self.flags.is_empty() {
            self.body.clone()
        } else {
            format!("/{}/{}", self.body, self.flags)
        };
        vec![marker("pattern", value)]
    }

    fn check(&self, value: &FieldValue, _ctx: &ValidationContext<'_>) -> Result<Verdict, ValidatorError> {
        Ok(Verdict::from_bool(self.compiled.is_match(&value.as_text())))
    }
}
