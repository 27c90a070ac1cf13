// File: src/remote.rs
// Purpose: Out-of-process check capability used by the remote constraint

use std::fmt;

use thiserror::Error;

/// HTTP method of a remote check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// A single remote check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRequest {
    /// Absolute or application-relative endpoint
    pub url: String,
    pub method: HttpMethod,
    /// Query (GET) or form body (POST) parameters
    pub params: Vec<(String, String)>,
}

impl RemoteRequest {
    pub fn is_relative(&self) -> bool {
        !(self.url.starts_with("http://") || self.url.starts_with("https://"))
    }

    /// URL-encoded `key=value&...` of the params
    pub fn query_string(&self) -> String {
        encode_params(&self.params)
    }
}

/// Status and body returned by the endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: String,
}

impl RemoteResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Cannot resolve relative endpoint {0} without a base URL")]
    RelativeUrl(String),

    #[error("Remote check failed: {0}")]
    Request(String),
}

/// Performs remote checks. Implementations must bound the connect time.
pub trait RemoteTransport {
    fn call(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError>;
}

impl<F> RemoteTransport for F
where
    F: Fn(&RemoteRequest) -> Result<RemoteResponse, TransportError>,
{
    fn call(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
        self(request)
    }
}

pub(crate) fn encode_params(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Join a relative endpoint onto a base URL
pub fn absolute_url(base: &str, url: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/'))
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use super::*;
    use crate::config::RemoteConfig;

    /// Blocking reqwest transport honouring the configured timeouts
    pub struct HttpTransport {
        client: reqwest::blocking::Client,
        base_url: Option<String>,
    }

    impl HttpTransport {
        pub fn new(config: &RemoteConfig) -> Result<Self, TransportError> {
            let client = reqwest::blocking::Client::builder()
                .connect_timeout(config.connect_timeout())
                .timeout(config.timeout())
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e| TransportError::Request(e.to_string()))?;

            Ok(Self {
                client,
                base_url: config.base_url.clone(),
            })
        }

        fn resolve(&self, request: &RemoteRequest) -> Result<String, TransportError> {
            if !request.is_relative() {
                return Ok(request.url.clone());
            }
            match &self.base_url {
                Some(base) => Ok(absolute_url(base, &request.url)),
                None => Err(TransportError::RelativeUrl(request.url.clone())),
            }
        }
    }

    impl RemoteTransport for HttpTransport {
        fn call(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
            let url = self.resolve(request)?;
            let builder = match request.method {
                HttpMethod::Get => self.client.get(&url).query(&request.params),
                HttpMethod::Post => self.client.post(&url).form(&request.params),
            };

            let response = builder
                .send()
                .map_err(|e| TransportError::Request(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .map_err(|e| TransportError::Request(e.to_string()))?;

            Ok(RemoteResponse { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_is_encoded() {
        let request = RemoteRequest {
            url: "/check".to_string(),
            method: HttpMethod::Get,
            params: vec![
                ("Title".to_string(), "valid title".to_string()),
                ("a&b".to_string(), "c=d".to_string()),
            ],
        };
        assert_eq!(request.query_string(), "Title=valid%20title&a%26b=c%3Dd");
        assert!(request.is_relative());
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("https://example.com/", "/check/title"),
            "https://example.com/check/title"
        );
    }

    #[test]
    fn test_success_statuses() {
        assert!(RemoteResponse::new(200, "OK").is_success());
        assert!(RemoteResponse::new(204, "").is_success());
        assert!(!RemoteResponse::new(400, "nope").is_success());
        assert!(!RemoteResponse::new(500, "").is_success());
    }

    #[test]
    fn test_closure_transport() {
        let transport = |_: &RemoteRequest| -> Result<RemoteResponse, TransportError> {
            Ok(RemoteResponse::new(200, "OK"))
        };
        let request = RemoteRequest {
            url: "https://example.com".to_string(),
            method: HttpMethod::Post,
            params: Vec::new(),
        };
        assert_eq!(transport.call(&request).map(|r| r.status).ok(), Some(200));
    }
}
