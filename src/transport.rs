//! # HTTP Transport
//!
//! The API client talks to the backend through the [`Transport`] trait so the
//! network layer can be swapped (the bundled [`ReqwestTransport`], or the
//! scripted transport the tests use).
//!
//! ## Session Handling
//!
//! The backend authenticates with a session cookie and protects mutating
//! requests with a CSRF token. `ReqwestTransport` keeps both cookies in a
//! jar and echoes the token from the `csrftoken` cookie in the configured
//! header on every POST, PATCH and DELETE.
//!
//! A transport reports every response it receives, whatever its status. Only
//! failures to reach the backend at all are errors at this level.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::{Method, StatusCode};
use reqwest::cookie::{CookieStore, Jar};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::errors::{ApiError, AppResult};

/// One call to the REST API, with `path` relative to the API root.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn with_multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    /// Whether the request must carry the CSRF token.
    pub fn is_mutating(&self) -> bool {
        matches!(self.method, Method::POST | Method::PATCH | Method::DELETE)
    }
}

/// A response as received, before status classification.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> AppResult<T> {
        serde_json::from_slice(&self.body).map_err(ApiError::from)
    }

    /// Body parsed as loose JSON, if it is JSON at all.
    pub fn json_value(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse>;
}

/// `reqwest`-backed transport with a persistent cookie jar.
pub struct ReqwestTransport {
    client: reqwest::Client,
    jar: Arc<Jar>,
    origin: reqwest::Url,
    config: ClientConfig,
}

impl ReqwestTransport {
    pub fn new(config: ClientConfig) -> AppResult<Self> {
        let origin = reqwest::Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("invalid base_url '{}': {}", config.base_url, e)))?;
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            jar,
            origin,
            config,
        })
    }

    fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        csrf_from_cookie_header(header.to_str().ok()?, &self.config.csrf_cookie_name)
    }

    /// Builds the outgoing request; mutating requests carry the CSRF token when the jar has one.
    fn build(&self, request: ApiRequest) -> AppResult<reqwest::Request> {
        let url = self.config.api_url(&request.path);
        let mutating = request.is_mutating();
        let mut builder = self.client.request(request.method, &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if mutating {
            match self.csrf_token() {
                Some(token) => builder = builder.header(self.config.csrf_header_name.as_str(), token),
                None => tracing::debug!(url = %url, "no CSRF cookie yet, sending without token"),
            }
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        Ok(builder.build()?)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let request = self.build(request)?;
        let url = request.url().clone();

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        tracing::debug!(url = %url, status = %status, bytes = body.len(), "response received");

        Ok(ApiResponse { status, body })
    }
}

fn build_form(parts: Vec<FormPart>) -> AppResult<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let mut file_part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
                if let Some(content_type) = content_type {
                    file_part = file_part.mime_str(&content_type)?;
                }
                form.part(name, file_part)
            }
        };
    }
    Ok(form)
}

/// Extracts the value of cookie `name` from a `Cookie` header value.
pub(crate) fn csrf_from_cookie_header(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
