//! REST client for the control panel backend.
//!
//! Every authenticated call carries the `X-API-Key` header. Responses use the
//! `{success, data, error}` envelope; an HTTP 401 anywhere maps to
//! [`Error::Unauthorized`] so callers can drop the stored key.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pandash_core::api::ApiClient;
//!
//! let client = ApiClient::new("http://127.0.0.1:5000").with_api_key(Some(key));
//! let snapshot = client.queues().await?;
//! ```

pub mod types;

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::knowledge::{self, EntryPage, EntryQuery, Filters};
use crate::settings::Settings;

pub use types::{
    AccountQueues, AccountSummary, Envelope, FileEntry, HealthStatus, Overview, OverviewHealth,
    QueueAction, QueueKind, QueueSnapshot, QueueState, QueueStatus, QueueTask, QueuesSummary,
    ServerInfo, TaskFileInfo,
};

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// HTTP client bound to one backend and (optionally) one API key.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

/// Entries response: the status summary sits next to `data`, not inside it.
#[derive(Debug, Deserialize)]
struct EntriesEnvelope {
    #[serde(default)]
    success: bool,
    data: Option<EntryPage>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    summary: Option<BTreeMap<String, u64>>,
}

impl ApiClient {
    /// Create a client for `base_url` with no API key.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create a client from the `[server]` config section.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.base_url.clone()).with_timeout(config.timeout)
    }

    /// Set the API key sent with every request.
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL the client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The API key in use, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .timeout(self.timeout);

        match &self.api_key {
            Some(key) => builder.header(crate::API_KEY_HEADER, key),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!("{} answered 401", response.url().path());
            return Err(Error::Unauthorized);
        }

        Ok(response)
    }

    async fn body(response: Response) -> Result<(StatusCode, String)> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {e}")))?;
        Ok((status, text))
    }

    fn failure(status: StatusCode, text: &str) -> Error {
        let message = serde_json::from_str::<Envelope<serde_json::Value>>(text)
            .ok()
            .and_then(|env| env.error.or(env.message))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        Error::Http {
            status: status.as_u16(),
            message,
        }
    }

    fn unwrap_envelope<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T> {
        if !status.is_success() {
            return Err(Self::failure(status, text));
        }

        let envelope: Envelope<T> =
            serde_json::from_str(text).map_err(|e| Error::Decode(e.to_string()))?;

        if !envelope.success {
            return Err(Error::Api(
                envelope
                    .error
                    .or(envelope.message)
                    .unwrap_or_else(|| "request failed".to_string()),
            ));
        }

        envelope
            .data
            .ok_or_else(|| Error::Decode("response has no data".to_string()))
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.send(self.request(Method::GET, path).query(query)).await?;
        let (status, text) = Self::body(response).await?;
        Self::unwrap_envelope(status, &text)
    }

    async fn get_bytes(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>> {
        let response = self.send(self.request(Method::GET, path).query(query)).await?;
        let status = response.status();
        if !status.is_success() {
            let (status, text) = Self::body(response).await?;
            return Err(Self::failure(status, &text));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| Error::Network(format!("failed to read export: {e}")))
    }

    /// `GET /api/health`, sent without the API key.
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .send(
                self.client
                    .get(format!("{}/api/health", self.base_url))
                    .timeout(self.timeout),
            )
            .await?;
        let (status, text) = Self::body(response).await?;
        if !status.is_success() {
            return Err(Self::failure(status, &text));
        }
        serde_json::from_str(&text).map_err(|e| Error::Decode(e.to_string()))
    }

    /// `GET /api/info`.
    pub async fn info(&self) -> Result<ServerInfo> {
        self.get_data("/api/info", &[]).await
    }

    /// Check the server is up and then that it accepts the API key.
    pub async fn validate_key(&self) -> Result<ServerInfo> {
        let health = self.health().await?;
        if !health.is_ok() {
            return Err(Error::Api(format!(
                "server reports status '{}'",
                health.status
            )));
        }
        self.info().await
    }

    /// `GET /api/files/list`.
    pub async fn list_files(&self, path: &str, account: &str) -> Result<Vec<FileEntry>> {
        self.get_data(
            "/api/files/list",
            &[("path", path.to_string()), ("account", account.to_string())],
        )
        .await
    }

    /// `GET /api/files/search`, scoped to `path`.
    pub async fn search_files(
        &self,
        keyword: &str,
        path: &str,
        account: &str,
    ) -> Result<Vec<FileEntry>> {
        self.get_data(
            "/api/files/search",
            &[
                ("keyword", keyword.to_string()),
                ("path", path.to_string()),
                ("account", account.to_string()),
            ],
        )
        .await
    }

    /// `GET /api/control/overview`.
    pub async fn overview(&self) -> Result<Overview> {
        self.get_data("/api/control/overview", &[]).await
    }

    /// `GET /api/control/queues`.
    pub async fn queues(&self) -> Result<QueueSnapshot> {
        self.get_data("/api/control/queues", &[]).await
    }

    /// `POST /api/{kind}/{action}?account=` with body `{account}`.
    ///
    /// Returns the server's confirmation message.
    pub async fn queue_action(
        &self,
        kind: QueueKind,
        action: QueueAction,
        account: &str,
    ) -> Result<String> {
        let path = format!("/api/{}/{}", kind.as_str(), action.as_str());
        let builder = self
            .request(Method::POST, &path)
            .query(&[("account", account)])
            .json(&serde_json::json!({ "account": account }));

        let response = self.send(builder).await?;
        let (status, text) = Self::body(response).await?;

        let envelope: Envelope<serde_json::Value> = serde_json::from_str(&text)
            .map_err(|_| Self::failure(status, &text))?;

        if status.is_success() && envelope.success {
            Ok(envelope
                .message
                .unwrap_or_else(|| format!("{kind} {action} succeeded")))
        } else {
            Err(Error::Api(
                envelope
                    .error
                    .or(envelope.message)
                    .unwrap_or_else(|| format!("{kind} {action} failed")),
            ))
        }
    }

    /// `GET /api/{kind}/export?account&format=csv`.
    pub async fn export_queue(&self, kind: QueueKind, account: &str) -> Result<Vec<u8>> {
        self.get_bytes(
            &format!("/api/{}/export", kind.as_str()),
            &[("account", account.to_string()), ("format", "csv".to_string())],
        )
        .await
    }

    /// `GET /api/control/settings`.
    pub async fn settings(&self) -> Result<Settings> {
        self.get_data("/api/control/settings", &[]).await
    }

    /// `PUT /api/control/settings` with the whole object; returns the canonical copy.
    pub async fn update_settings(&self, settings: &Settings) -> Result<Settings> {
        let response = self
            .send(self.request(Method::PUT, "/api/control/settings").json(settings))
            .await?;
        let (status, text) = Self::body(response).await?;
        Self::unwrap_envelope(status, &text)
    }

    /// `GET /api/knowledge/entries`.
    pub async fn knowledge_entries(&self, query: &EntryQuery) -> Result<EntryPage> {
        let response = self
            .send(
                self.request(Method::GET, "/api/knowledge/entries")
                    .query(&query.params()),
            )
            .await?;
        let (status, text) = Self::body(response).await?;
        if !status.is_success() {
            return Err(Self::failure(status, &text));
        }

        let envelope: EntriesEnvelope =
            serde_json::from_str(&text).map_err(|e| Error::Decode(e.to_string()))?;
        if !envelope.success {
            return Err(Error::Api(
                envelope.error.unwrap_or_else(|| "request failed".to_string()),
            ));
        }

        let mut page = envelope
            .data
            .ok_or_else(|| Error::Decode("response has no data".to_string()))?;
        if page.summary.is_none() {
            page.summary = envelope.summary;
        }
        Ok(page)
    }

    /// `GET /api/knowledge/tags`.
    pub async fn knowledge_tags(&self) -> Result<Vec<String>> {
        #[derive(Deserialize)]
        struct Tags {
            tags: Vec<String>,
        }
        let tags: Tags = self.get_data("/api/knowledge/tags", &[]).await?;
        Ok(tags.tags)
    }

    /// `GET /api/knowledge/statuses`.
    pub async fn knowledge_statuses(&self) -> Result<BTreeMap<String, u64>> {
        #[derive(Deserialize)]
        struct Statuses {
            statuses: BTreeMap<String, u64>,
        }
        let statuses: Statuses = self.get_data("/api/knowledge/statuses", &[]).await?;
        Ok(statuses.statuses)
    }

    /// `GET /api/knowledge/export` for the given columns and filters.
    pub async fn knowledge_export(&self, fields: &[&str], filters: &Filters) -> Result<Vec<u8>> {
        self.get_bytes(
            "/api/knowledge/export",
            &knowledge::export_params(fields, filters),
        )
        .await
    }
}
