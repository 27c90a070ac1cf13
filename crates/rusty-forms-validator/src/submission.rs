// File: src/submission.rs
// Purpose: Submitted field values and the data of one form submission

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// An uploaded file as reported by the form framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Original client-side file name
    pub name: String,
    /// Where the framework stored the upload
    pub path: String,
    /// Reported MIME type, if any
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub size: u64,
}

/// The value of a single field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    /// Multi-valued fields such as checkbox sets
    Many(Vec<String>),
    File(UploadedFile),
}

impl FieldValue {
    /// Blank text, no selected options and no file all count as empty
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Many(values) => values.iter().all(|v| v.trim().is_empty()),
            FieldValue::File(file) => file.name.is_empty() && file.path.is_empty(),
        }
    }

    /// Scalar view of the value. Multi values are comma joined.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Many(values) => values.join(","),
            FieldValue::File(file) => file.name.clone(),
        }
    }

    /// Every selected value
    pub fn values(&self) -> Vec<&str> {
        match self {
            FieldValue::Empty => Vec::new(),
            FieldValue::Text(s) if s.is_empty() => Vec::new(),
            FieldValue::Text(s) => vec![s.as_str()],
            FieldValue::Many(values) => values
                .iter()
                .filter(|v| !v.is_empty())
                .map(String::as_str)
                .collect(),
            FieldValue::File(file) => vec![file.name.as_str()],
        }
    }

    /// Checkbox semantics: anything submitted except "0", "false" and "off"
    pub fn is_checked(&self) -> bool {
        match self {
            FieldValue::Text(s) => {
                let s = s.trim();
                !s.is_empty() && !matches!(s, "0" | "false" | "off")
            }
            FieldValue::Many(_) => !self.values().is_empty(),
            FieldValue::File(_) => !self.is_empty(),
            FieldValue::Empty => false,
        }
    }

    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            FieldValue::File(file) => Some(file),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::Many(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl From<UploadedFile> for FieldValue {
    fn from(file: UploadedFile) -> Self {
        FieldValue::File(file)
    }
}

/// Data of one form submission
#[derive(Debug, Clone, Default)]
pub struct SubmittedData {
    fields: HashMap<String, FieldValue>,
    action: Option<String>,
}

impl SubmittedData {
    /// Create empty submission data
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from plain string fields with automatic trimming
    pub fn from_fields(fields: HashMap<String, String>) -> Self {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k, FieldValue::Text(v.trim().to_string())))
            .collect();

        Self {
            fields,
            action: None,
        }
    }

    /// Create from a JSON object. Arrays become multi values.
    pub fn from_json(json: &JsonValue) -> Self {
        let mut fields = HashMap::new();

        if let JsonValue::Object(map) = json {
            for (key, value) in map {
                let value = match value {
                    JsonValue::Null => FieldValue::Empty,
                    JsonValue::String(s) => FieldValue::Text(s.trim().to_string()),
                    JsonValue::Array(items) => FieldValue::Many(
                        items
                            .iter()
                            .map(|item| match item {
                                JsonValue::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .collect(),
                    ),
                    other => FieldValue::Text(other.to_string()),
                };
                fields.insert(key.clone(), value);
            }
        }

        Self {
            fields,
            action: None,
        }
    }

    /// Builder-style setter for one field
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Record which submit action was used
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a submitted value
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Check if a field was submitted
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
