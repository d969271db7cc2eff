//! # Remote Automation Driver
//!
//! [`ResourceFactory`] backed by an automation sidecar reachable over HTTP.
//! Each resource is one sidecar session (a browser, in practice); workflows
//! run inside it by name.
//!
//! Sidecar protocol:
//!
//! - `POST /sessions` returns `{"session_id": "..."}`
//! - `POST /sessions/{id}/workflows/{name}` with the job parameters returns the
//!   workflow output
//! - `DELETE /sessions/{id}` releases the session

use crate::infrastructure::automation::traits::{
    AutomationResource, ResourceError, ResourceFactory, WorkflowError,
};
use crate::infrastructure::providers::error::ProviderError;
use crate::infrastructure::providers::http_client::HttpClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Options sent when opening a sidecar session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOptions {
    /// Run without a visible window.
    pub headless: bool,
    /// Randomize input timing.
    pub humanize: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            headless: true,
            humanize: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionCreated {
    session_id: String,
}

/// Creates sidecar sessions.
#[derive(Debug, Clone)]
pub struct RemoteDriverFactory {
    client: HttpClient,
    base_url: String,
    options: SessionOptions,
}

impl RemoteDriverFactory {
    /// Creates a factory for the sidecar at `base_url`.
    #[must_use]
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            options: SessionOptions::default(),
        }
    }

    /// Sets the session options.
    #[must_use]
    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the sidecar base URL.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ResourceFactory for RemoteDriverFactory {
    async fn create(&self) -> Result<Box<dyn AutomationResource>, ResourceError> {
        let url = format!("{}/sessions", self.base_url);
        let created: SessionCreated = self
            .client
            .post(&url, &self.options)
            .await
            .map_err(creation_error)?;
        debug!(session_id = %created.session_id, "automation session opened");
        Ok(Box::new(RemoteSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            session_id: created.session_id,
        }))
    }
}

/// One open sidecar session.
#[derive(Debug)]
pub struct RemoteSession {
    client: HttpClient,
    base_url: String,
    session_id: String,
}

impl RemoteSession {
    /// Returns the sidecar session id.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

fn creation_error(error: ProviderError) -> ResourceError {
    match error {
        ProviderError::Connection { .. } | ProviderError::Timeout { .. } => {
            ResourceError::unreachable(error.to_string())
        }
        other => ResourceError::refused(other.to_string()),
    }
}

/// Session-level failures make the session unusable; request-level ones do not.
fn classify(workflow: &str, error: ProviderError) -> WorkflowError {
    match error {
        ProviderError::InvalidRequest { message }
        | ProviderError::Rejected { message }
        | ProviderError::Protocol { message } => WorkflowError::step(workflow, message),
        other => WorkflowError::crashed(other.to_string()),
    }
}

#[async_trait]
impl AutomationResource for RemoteSession {
    async fn run(&mut self, workflow: &str, params: &Value) -> Result<Value, WorkflowError> {
        let url = format!(
            "{}/sessions/{}/workflows/{}",
            self.base_url, self.session_id, workflow
        );
        self.client
            .post(&url, params)
            .await
            .map_err(|e| classify(workflow, e))
    }

    async fn close(&mut self) {
        let url = format!("{}/sessions/{}", self.base_url, self.session_id);
        if let Err(error) = self.client.delete(&url).await {
            debug!(
                session_id = %self.session_id,
                error = %error,
                "failed to close automation session"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn sidecar() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions"))
            .and(body_json(json!({"headless": true, "humanize": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session_id": "s1"})))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn opens_session_and_runs_workflow() {
        let server = sidecar().await;
        Mock::given(method("POST"))
            .and(path("/sessions/s1/workflows/rma_offers"))
            .and(body_json(json!({"nom": "Alami"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"annual": []})))
            .mount(&server)
            .await;

        let factory = RemoteDriverFactory::new(HttpClient::new(5000).unwrap(), server.uri());
        let mut session = factory.create().await.unwrap();
        let output = session
            .run("rma_offers", &json!({"nom": "Alami"}))
            .await
            .unwrap();
        assert_eq!(output, json!({"annual": []}));
    }

    #[tokio::test]
    async fn server_failure_is_a_crash() {
        let server = sidecar().await;
        Mock::given(method("POST"))
            .and(path("/sessions/s1/workflows/rma_offers"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let factory = RemoteDriverFactory::new(HttpClient::new(5000).unwrap(), server.uri());
        let mut session = factory.create().await.unwrap();
        let error = session.run("rma_offers", &json!({})).await.unwrap_err();
        assert!(error.is_fatal());
    }

    #[tokio::test]
    async fn bad_request_is_a_step_failure() {
        let server = sidecar().await;
        Mock::given(method("POST"))
            .and(path("/sessions/s1/workflows/rma_offers"))
            .respond_with(ResponseTemplate::new(422).set_body_string("field missing"))
            .mount(&server)
            .await;

        let factory = RemoteDriverFactory::new(HttpClient::new(5000).unwrap(), server.uri());
        let mut session = factory.create().await.unwrap();
        let error = session.run("rma_offers", &json!({})).await.unwrap_err();
        assert!(!error.is_fatal());
    }

    #[tokio::test]
    async fn close_deletes_the_session() {
        let server = sidecar().await;
        Mock::given(method("DELETE"))
            .and(path("/sessions/s1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let factory = RemoteDriverFactory::new(HttpClient::new(5000).unwrap(), server.uri());
        let mut session = factory.create().await.unwrap();
        session.close().await;
    }

    #[tokio::test]
    async fn unreachable_sidecar_fails_creation() {
        let factory =
            RemoteDriverFactory::new(HttpClient::new(500).unwrap(), "http://127.0.0.1:9");
        let error = factory.create().await.unwrap_err();
        assert!(matches!(error, ResourceError::Unreachable { .. }));
    }

    #[tokio::test]
    async fn refused_session_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sessions"))
            .respond_with(ResponseTemplate::new(422).set_body_string("no browser slots"))
            .mount(&server)
            .await;

        let factory = RemoteDriverFactory::new(HttpClient::new(5000).unwrap(), server.uri());
        let error = factory.create().await.unwrap_err();
        assert!(matches!(error, ResourceError::Refused { .. }));
    }
}
