// File: src/constraint/dimension.rs
// Purpose: Image dimension constraint for uploaded files

use serde_json::{Map, Value as JsonValue};

use super::{marker, Constraint, ConstraintBase, ConstraintKind, ValidationContext, Verdict};
use crate::error::{ConfigError, ValidatorError};
use crate::form::FormAdapter;
use crate::messages::Translator;
use crate::submission::{FieldValue, UploadedFile};

const RATIO_TOLERANCE: f64 = 0.01;

/// Reads image metadata of an uploaded file
pub trait ImageInspector {
    /// `(width, height)` in pixels, `None` when the file is not an image
    fn dimensions(&self, file: &UploadedFile) -> Option<(u32, u32)>;
}

impl<F> ImageInspector for F
where
    F: Fn(&UploadedFile) -> Option<(u32, u32)>,
{
    fn dimensions(&self, file: &UploadedFile) -> Option<(u32, u32)> {
        self(file)
    }
}

/// One requirement on the image size
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionRule {
    Width(u32),
    Height(u32),
    MinWidth(u32),
    MaxWidth(u32),
    MinHeight(u32),
    MaxHeight(u32),
    /// Width over height, declared as `w/h` or a decimal
    Ratio { declared: String, value: f64 },
}

impl DimensionRule {
    pub fn parse(mode: &str, value: &str) -> Result<Self, ConfigError> {
        let pixels = || {
            value.trim().parse::<u32>().map_err(|_| ConfigError::UnknownMode {
                constraint: "dimension",
                mode: format!("{}={}", mode, value),
            })
        };

        match mode {
            "width" => Ok(DimensionRule::Width(pixels()?)),
            "height" => Ok(DimensionRule::Height(pixels()?)),
            "min_width" => Ok(DimensionRule::MinWidth(pixels()?)),
            "max_width" => Ok(DimensionRule::MaxWidth(pixels()?)),
            "min_height" => Ok(DimensionRule::MinHeight(pixels()?)),
            "max_height" => Ok(DimensionRule::MaxHeight(pixels()?)),
            "ratio" => Ok(DimensionRule::Ratio {
                declared: value.trim().to_string(),
                value: parse_ratio(value)?,
            }),
            other => Err(ConfigError::UnknownMode {
                constraint: "dimension",
                mode: other.to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            DimensionRule::Width(_) => "width",
            DimensionRule::Height(_) => "height",
            DimensionRule::MinWidth(_) => "min_width",
            DimensionRule::MaxWidth(_) => "max_width",
            DimensionRule::MinHeight(_) => "min_height",
            DimensionRule::MaxHeight(_) => "max_height",
            DimensionRule::Ratio { .. } => "ratio",
        }
    }

    fn client_value(&self) -> JsonValue {
        match self {
            DimensionRule::Width(n)
            | DimensionRule::Height(n)
            | DimensionRule::MinWidth(n)
            | DimensionRule::MaxWidth(n)
            | DimensionRule::MinHeight(n)
            | DimensionRule::MaxHeight(n) => JsonValue::from(*n),
            DimensionRule::Ratio { declared, .. } => JsonValue::from(declared.clone()),
        }
    }

    pub fn holds(&self, width: u32, height: u32) -> bool {
        match self {
            DimensionRule::Width(n) => width == *n,
            DimensionRule::Height(n) => height == *n,
            DimensionRule::MinWidth(n) => width >= *n,
            DimensionRule::MaxWidth(n) => width <= *n,
            DimensionRule::MinHeight(n) => height >= *n,
            DimensionRule::MaxHeight(n) => height <= *n,
            DimensionRule::Ratio { value, .. } => {
                height > 0 && (width as f64 / height as f64 - value).abs() <= RATIO_TOLERANCE
            }
        }
    }
}

fn parse_ratio(value: &str) -> Result<f64, ConfigError> {
    let invalid = || ConfigError::InvalidRatio(value.to_string());
    let ratio = match value.trim().split_once('/') {
        Some((w, h)) => {
            let w: f64 = w.trim().parse().map_err(|_| invalid())?;
            let h: f64 = h.trim().parse().map_err(|_| invalid())?;
            if h == 0.0 {
                return Err(invalid());
            }
            w / h
        }
        None => value.trim().parse().map_err(|_| invalid())?,
    };
    if ratio.is_finite() && ratio > 0.0 {
        Ok(ratio)
    } else {
        Err(invalid())
    }
}

/// Uploaded image must satisfy every rule.
///
/// A missing file passes; pair with [`super::Required`] to demand one.
#[derive(Debug, Clone, Default)]
pub struct Dimension {
    base: ConstraintBase,
    rules: Vec<DimensionRule>,
}

impl Dimension {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single rule from a mode name such as `min_width` or `ratio`
    pub fn rule(mode: &str, value: &str) -> Result<Self, ConfigError> {
        Ok(Self::new().with_rule(DimensionRule::parse(mode, value)?))
    }

    pub fn with_rule(mut self, rule: DimensionRule) -> Self {
        self.rules.retain(|existing| existing.name() != rule.name());
        self.rules.push(rule);
        self
    }

    pub fn width(self, px: u32) -> Self {
        self.with_rule(DimensionRule::Width(px))
    }

    pub fn height(self, px: u32) -> Self {
        self.with_rule(DimensionRule::Height(px))
    }

    pub fn min_width(self, px: u32) -> Self {
        self.with_rule(DimensionRule::MinWidth(px))
    }

    pub fn max_width(self, px: u32) -> Self {
        self.with_rule(DimensionRule::MaxWidth(px))
    }

    pub fn min_height(self, px: u32) -> Self {
        self.with_rule(DimensionRule::MinHeight(px))
    }

    pub fn max_height(self, px: u32) -> Self {
        self.with_rule(DimensionRule::MaxHeight(px))
    }

    pub fn ratio(self, ratio: &str) -> Result<Self, ConfigError> {
        Ok(self.with_rule(DimensionRule::parse("ratio", ratio)?))
    }

    pub fn rules(&self) -> &[DimensionRule] {
        &self.rules
    }
}

impl Constraint for Dimension {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Dimension
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn client_name(&self) -> &'static str {
        "dimensions"
    }

    fn default_message(&self, translator: &dyn Translator) -> String {
        translator.translate("validator.dimensions", "The image dimensions are invalid.", &[])
    }

    fn client_markers(&self, _form: &dyn FormAdapter) -> Vec<(String, String)> {
        let options: Map<String, JsonValue> = self
            .rules
            .iter()
            .map(|rule| (rule.name().to_string(), rule.client_value()))
            .collect();

        vec![
            marker("dimensions", "true"),
            marker("dimensions-options", JsonValue::Object(options).to_string()),
        ]
    }

    fn check(&self, value: &FieldValue, ctx: &ValidationContext<'_>) -> Result<Verdict, ValidatorError> {
        let file = match value.as_file() {
            Some(file) => file,
            None => return Ok(Verdict::Pass),
        };

        let images = ctx.images().ok_or_else(|| ValidatorError::MissingCapability {
            kind: "dimension",
            field: self.base.field().unwrap_or_default().to_string(),
            capability: "image inspector",
        })?;

        let ok = match images.dimensions(file) {
            Some((width, height)) => self.rules.iter().all(|rule| rule.holds(width, height)),
            None => false,
        };
        Ok(Verdict::from_bool(ok))
    }
}
