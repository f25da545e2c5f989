//! # Remote API Client
//!
//! Typed wrappers over the backend's REST endpoints. Every method performs
//! exactly one request and either returns the mapped DTO or propagates the
//! failure; classification into user-facing messages happens in the state
//! stores. Nothing here retries or touches shared state.
//!
//! Endpoints are grouped by concern:
//! - [`auth`]: session, CSRF and registration
//! - [`files`]: file listing, upload, download and metadata updates
//! - [`admin`]: user roster and privilege management

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::errors::{ApiError, AppResult};
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

pub mod admin;
pub mod auth;
pub mod files;

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl ApiClient {
    /// Builds a client backed by [`ReqwestTransport`].
    pub fn new(config: ClientConfig) -> AppResult<Self> {
        let transport = ReqwestTransport::new(config.clone())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends `request` and turns non-2xx responses into `ApiError::Status`.
    async fn execute(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let response = self.transport.send(request).await?;

        if !response.status.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: response.json_value(),
            });
        }

        Ok(response)
    }

    async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> AppResult<T> {
        self.execute(request).await?.json()
    }
}
