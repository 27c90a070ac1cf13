// File: src/constraint/remote.rs
// Purpose: Constraint delegating the check to an endpoint

use serde_json::Value as JsonValue;

use super::{marker, Constraint, ConstraintBase, ConstraintKind, ValidationContext, Verdict};
use crate::error::ValidatorError;
use crate::form::FormAdapter;
use crate::messages::Translator;
use crate::remote::{encode_params, HttpMethod, RemoteRequest, RemoteResponse};
use crate::submission::FieldValue;

/// Plain-text bodies up to this length are shown as the failure message
const MAX_PLAIN_MESSAGE: usize = 255;

/// Client-side validator name registered by the glue script
const CLIENT_VALIDATOR: &str = "zenRemote";

/// Value is sent to an endpoint; a 2xx status passes.
///
/// The field value travels under the field name, next to any extra params.
#[derive(Debug, Clone)]
pub struct Remote {
    base: ConstraintBase,
    url: String,
    method: HttpMethod,
    params: Vec<(String, String)>,
}

impl Remote {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            base: ConstraintBase::default(),
            url: url.into(),
            method: HttpMethod::Get,
            params: Vec::new(),
        }
    }

    pub fn with_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn post(self) -> Self {
        self.method(HttpMethod::Post)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Endpoint with the extra params appended as a query string
    fn client_url(&self) -> String {
        if self.params.is_empty() {
            return self.url.clone();
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, encode_params(&self.params))
    }

    fn request_for(&self, value: &FieldValue) -> RemoteRequest {
        let mut params = Vec::with_capacity(self.params.len() + 1);
        if let Some(field) = self.base.field() {
            params.push((field.to_string(), value.as_text()));
        }
        params.extend(self.params.iter().cloned());

        RemoteRequest {
            url: self.url.clone(),
            method: self.method,
            params,
        }
    }
}

/// Message carried by a failed response, if it has a usable one
fn response_message(response: &RemoteResponse) -> Option<String> {
    let body = response.body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(JsonValue::Object(map)) = serde_json::from_str::<JsonValue>(body) {
        return ["message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(JsonValue::as_str))
            .map(str::to_string);
    }

    if body.len() < MAX_PLAIN_MESSAGE {
        Some(body.to_string())
    } else {
        None
    }
}

impl Constraint for Remote {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Remote
    }

    fn base(&self) -> &ConstraintBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ConstraintBase {
        &mut self.base
    }

    fn client_name(&self) -> &'static str {
        "remote"
    }

    fn default_message(&self, translator: &dyn Translator) -> String {
        translator.translate("validator.remote", "This value seems to be invalid.", &[])
    }

    fn client_markers(&self, _form: &dyn FormAdapter) -> Vec<(String, String)> {
        let mut markers = vec![marker("remote", self.client_url())];
        if self.method == HttpMethod::Post {
            markers.push(marker("remote-options", r#"{"type":"POST"}"#));
        }
        markers.push(marker("remote-validator", CLIENT_VALIDATOR));
        markers
    }

    fn check(&self, value: &FieldValue, ctx: &ValidationContext<'_>) -> Result<Verdict, ValidatorError> {
        let field = self.base.field().unwrap_or_default();
        let transport = ctx.transport().ok_or_else(|| ValidatorError::MissingCapability {
            kind: "remote",
            field: field.to_string(),
            capability: "remote transport",
        })?;

        let request = self.request_for(value);
        tracing::debug!("Remote check {} {} for field {}", request.method, request.url, field);

        match transport.call(&request) {
            Ok(response) if response.is_success() => Ok(Verdict::Pass),
            Ok(response) => {
                tracing::debug!("Remote check for {} rejected with status {}", field, response.status);
                Ok(Verdict::Fail {
                    message: response_message(&response),
                })
            }
            Err(e) => {
                tracing::warn!("Remote check for {} failed: {}", field, e);
                Ok(Verdict::fail())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::MemoryForm;
    use crate::remote::TransportError;
    use crate::submission::SubmittedData;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn bound(remote: Remote) -> Remote {
        let mut remote = remote;
        remote.bind_field("Title").unwrap();
        remote
    }

    #[test]
    fn test_markers_get() {
        let form = MemoryForm::new("Form", &["Title"]);
        let remote = Remote::new("/check/title").with_params([("lang", "en")]);
        assert_eq!(
            remote.client_markers(&form),
            vec![
                ("data-parsley-remote".to_string(), "/check/title?lang=en".to_string()),
                ("data-parsley-remote-validator".to_string(), "zenRemote".to_string()),
            ]
        );
    }

    #[test]
    fn test_markers_post() {
        let form = MemoryForm::new("Form", &["Title"]);
        let markers = Remote::new("/check").post().client_markers(&form);
        assert_eq!(markers[1].0, "data-parsley-remote-options");
        assert_eq!(markers[1].1, r#"{"type":"POST"}"#);
    }

    #[test]
    fn test_sends_field_value_under_field_name() {
        let seen = RefCell::new(None);
        let transport = |request: &RemoteRequest| -> Result<RemoteResponse, TransportError> {
            *seen.borrow_mut() = Some(request.clone());
            Ok(RemoteResponse::new(200, "OK"))
        };

        let data = SubmittedData::new();
        let ctx = ValidationContext::new(&data).with_transport(&transport);
        let remote = bound(Remote::new("/check").post().with_params([("id", "7")]));

        let verdict = remote.evaluate(&FieldValue::from("valid title"), &ctx).unwrap();
        assert!(verdict.is_pass());

        let request = seen.into_inner().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            request.params,
            vec![
                ("Title".to_string(), "valid title".to_string()),
                ("id".to_string(), "7".to_string()),
            ]
        );
    }

    #[test]
    fn test_failure_adopts_json_message() {
        let transport = |_: &RemoteRequest| -> Result<RemoteResponse, TransportError> {
            Ok(RemoteResponse::new(400, r#"{"message":"Title already taken"}"#))
        };
        let data = SubmittedData::new();
        let ctx = ValidationContext::new(&data).with_transport(&transport);

        let verdict = bound(Remote::new("/check")).evaluate(&FieldValue::from("x"), &ctx).unwrap();
        assert_eq!(
            verdict,
            Verdict::Fail {
                message: Some("Title already taken".to_string())
            }
        );
    }

    #[test]
    fn test_response_messages() {
        assert_eq!(
            response_message(&RemoteResponse::new(422, r#"{"error":"nope"}"#)),
            Some("nope".to_string())
        );
        assert_eq!(
            response_message(&RemoteResponse::new(400, "Bad title")),
            Some("Bad title".to_string())
        );
        assert_eq!(response_message(&RemoteResponse::new(400, "x".repeat(300))), None);
        assert_eq!(response_message(&RemoteResponse::new(400, r#"{"ok":false}"#)), None);
        assert_eq!(response_message(&RemoteResponse::new(500, "")), None);
    }

    #[test]
    fn test_transport_error_fails() {
        let transport = |_: &RemoteRequest| -> Result<RemoteResponse, TransportError> {
            Err(TransportError::Request("connection refused".to_string()))
        };
        let data = SubmittedData::new();
        let ctx = ValidationContext::new(&data).with_transport(&transport);

        let verdict = bound(Remote::new("/check")).evaluate(&FieldValue::from("x"), &ctx).unwrap();
        assert_eq!(verdict, Verdict::fail());
    }

    #[test]
    fn test_missing_transport() {
        let data = SubmittedData::new();
        let ctx = ValidationContext::new(&data);
        assert!(matches!(
            bound(Remote::new("/check")).evaluate(&FieldValue::from("x"), &ctx),
            Err(ValidatorError::MissingCapability { .. })
        ));
    }
}
