// File: src/messages.rs
// Purpose: Localized message lookup with %s interpolation

use std::collections::HashMap;

/// Localized message lookup.
///
/// `default` is used when the key has no translation. `%s` placeholders are
/// replaced by `args` in order.
pub trait Translator {
    fn translate(&self, key: &str, default: &str, args: &[String]) -> String;
}

/// Replace `%s` placeholders left to right. Extra placeholders stay as-is.
pub fn interpolate(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(pos) = rest.find("%s") {
        out.push_str(&rest[..pos]);
        match args.next() {
            Some(arg) => out.push_str(arg),
            None => out.push_str("%s"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

/// Uses the built-in English defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTranslator;

impl Translator for DefaultTranslator {
    fn translate(&self, _key: &str, default: &str, args: &[String]) -> String {
        interpolate(default, args)
    }
}

/// Key to template table, falling back to the default text
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    templates: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    pub fn with(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(key, template);
        self
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Translator for MessageCatalog {
    fn translate(&self, key: &str, default: &str, args: &[String]) -> String {
        let template = self.templates.get(key).map(String::as_str).unwrap_or(default);
        interpolate(template, args)
    }
}
