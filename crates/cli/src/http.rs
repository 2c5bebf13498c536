// HTTP transport for the engine contract
// Decision: Every error body is decoded back into EngineError, so callers see the
// same taxonomy whether they hold this transport or an in-process executor.

use std::time::Duration;

use async_trait::async_trait;
use hello_core::wire::{
    ErrorResponse, ListSchedulesQuery, NoteRequest, ReasonRequest, ResultResponse, SignalRequest,
    NAMESPACE_HEADER,
};
use hello_core::{
    ConfigError, CreateScheduleRequest, EngineConfig, EngineError, ScheduleDescription,
    SchedulePage, StartWorkflowRequest, WorkflowDescription, WorkflowEngine, WorkflowRun,
    DEFAULT_CONTEXT_TIMEOUT,
};
use hello_core::config::ENV_ADDRESS;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

/// `WorkflowEngine` over the worker's `/v1` HTTP API
#[derive(Clone)]
pub struct HttpEngine {
    base_url: Url,
    api_key: String,
    namespace: String,
    http: reqwest::Client,
    request_timeout: Duration,
}

impl HttpEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            var: ENV_ADDRESS.to_string(),
            reason,
        };

        let base_url = Url::parse(&config.base_url()).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid(format!("'{}' cannot be a base URL", base_url)));
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            namespace: config.namespace.clone(),
            http,
            request_timeout: DEFAULT_CONTEXT_TIMEOUT,
        })
    }

    /// Override the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> Result<Url, EngineError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| EngineError::Internal(format!("'{}' cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Authenticated request with the default timeout
    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, EngineError> {
        Ok(self
            .long_poll(method, segments)?
            .timeout(self.request_timeout))
    }

    /// Authenticated request with no timeout of its own
    fn long_poll(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, EngineError> {
        let url = self.url(segments)?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header(NAMESPACE_HEADER, &self.namespace))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, EngineError> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!(error = %e, "request to engine failed");
            EngineError::Connection(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) => error.into_error(),
            Err(_) => EngineError::Internal(format!("HTTP {}: {}", status.as_u16(), body)),
        })
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, EngineError> {
        self.execute(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| EngineError::Internal(format!("malformed response: {}", e)))
    }

    async fn empty(&self, request: RequestBuilder) -> Result<(), EngineError> {
        self.execute(request).await.map(|_| ())
    }

    /// Request cancellation of the latest run
    pub async fn cancel_workflow(&self, workflow_id: &str, reason: Option<String>) -> Result<(), EngineError> {
        let request = self
            .request(Method::POST, &["v1", "workflows", workflow_id, "cancel"])?
            .json(&ReasonRequest { reason });
        self.empty(request).await
    }

    /// Terminate the latest run
    pub async fn terminate_workflow(
        &self,
        workflow_id: &str,
        reason: Option<String>,
    ) -> Result<(), EngineError> {
        let request = self
            .request(Method::POST, &["v1", "workflows", workflow_id, "terminate"])?
            .json(&ReasonRequest { reason });
        self.empty(request).await
    }
}

#[async_trait]
impl WorkflowEngine for HttpEngine {
    async fn start_workflow(&self, request: StartWorkflowRequest) -> Result<WorkflowRun, EngineError> {
        let request = self
            .request(Method::POST, &["v1", "workflows"])?
            .json(&request);
        self.json(request).await
    }

    async fn signal_workflow(
        &self,
        workflow_id: &str,
        signal_name: &str,
        payload: serde_json::Value,
    ) -> Result<(), EngineError> {
        let request = self
            .request(
                Method::POST,
                &["v1", "workflows", workflow_id, "signals", signal_name],
            )?
            .json(&SignalRequest { payload });
        self.empty(request).await
    }

    async fn await_result(&self, workflow_id: &str) -> Result<serde_json::Value, EngineError> {
        let request = self.long_poll(Method::GET, &["v1", "workflows", workflow_id, "result"])?;
        let response: ResultResponse = self.json(request).await?;
        Ok(response.result)
    }

    async fn describe_workflow(&self, workflow_id: &str) -> Result<WorkflowDescription, EngineError> {
        let request = self.request(Method::GET, &["v1", "workflows", workflow_id])?;
        self.json(request).await
    }

    async fn create_schedule(
        &self,
        request: CreateScheduleRequest,
    ) -> Result<ScheduleDescription, EngineError> {
        let request = self
            .request(Method::POST, &["v1", "schedules"])?
            .json(&request);
        self.json(request).await
    }

    async fn list_schedules(
        &self,
        page_token: Option<String>,
        page_size: usize,
    ) -> Result<SchedulePage, EngineError> {
        let request = self
            .request(Method::GET, &["v1", "schedules"])?
            .query(&ListSchedulesQuery {
                page_token,
                page_size,
            });
        self.json(request).await
    }

    async fn pause_schedule(&self, schedule_id: &str, note: Option<String>) -> Result<(), EngineError> {
        let request = self
            .request(Method::POST, &["v1", "schedules", schedule_id, "pause"])?
            .json(&NoteRequest { note });
        self.empty(request).await
    }

    async fn unpause_schedule(
        &self,
        schedule_id: &str,
        note: Option<String>,
    ) -> Result<(), EngineError> {
        let request = self
            .request(Method::POST, &["v1", "schedules", schedule_id, "unpause"])?
            .json(&NoteRequest { note });
        self.empty(request).await
    }

    async fn delete_schedule(&self, schedule_id: &str) -> Result<(), EngineError> {
        let request = self.request(Method::DELETE, &["v1", "schedules", schedule_id])?;
        self.empty(request).await
    }

    async fn describe_schedule(&self, schedule_id: &str) -> Result<ScheduleDescription, EngineError> {
        let request = self.request(Method::GET, &["v1", "schedules", schedule_id])?;
        self.json(request).await
    }
}
