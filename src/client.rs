//! GraphQL request/response over HTTP
//!
//! [`TimingClient`] issues the session and schedule queries. The actual POST
//! is behind the [`Transport`] trait so views and providers can be driven
//! without a network in tests.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, trace, warn};

use crate::config::ClientConfig;
use crate::schema::documents::{SCHEDULE_QUERY, SESSION_QUERY, leaderboard_query};
use crate::schema::{Race, Session};
use crate::{Result, TimingError};

/// Body of a GraphQL request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlRequest {
    pub query: String,
    pub variables: Value,
}

impl GraphQlRequest {
    pub fn new(query: impl Into<String>, variables: Value) -> Self {
        Self { query: query.into(), variables }
    }

    /// The compact session query for one session id.
    pub fn session(session_id: &str) -> Self {
        Self::new(SESSION_QUERY, json!({ "sessionId": session_id }))
    }

    /// The full leaderboard document as a query, for polling.
    pub fn leaderboard(session_id: &str) -> Self {
        Self::new(leaderboard_query(), leaderboard_variables(session_id))
    }

    pub fn schedule(championship_id: &str) -> Self {
        Self::new(SCHEDULE_QUERY, json!({ "championshipId": championship_id }))
    }
}

/// Variables for the leaderboard document.
pub fn leaderboard_variables(session_id: &str) -> Value {
    json!({ "sessionId": session_id, "filters": {}, "realTime": true })
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlErrorEntry {
    #[serde(default)]
    pub message: String,
}

/// Standard GraphQL response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlErrorEntry>>,
}

impl<T> GraphQlResponse<T> {
    /// Data when the server sent any, otherwise the first reported error.
    ///
    /// Field errors that arrive alongside data are logged and dropped; the
    /// affected fields are already null in the payload.
    pub fn into_result(self) -> Result<T> {
        let error = self.error();
        match self.data {
            Some(data) => {
                if let Some(error) = error {
                    warn!("Partial GraphQL response: {}", error);
                }
                Ok(data)
            }
            None => Err(error.unwrap_or_else(|| TimingError::missing("data"))),
        }
    }

    /// Fails on any reported error, even when data is present.
    pub fn into_strict_result(self) -> Result<T> {
        if let Some(error) = self.error() {
            return Err(error);
        }
        self.data.ok_or_else(|| TimingError::missing("data"))
    }

    /// The reported errors as one [`TimingError::GraphQl`], if any.
    pub fn error(&self) -> Option<TimingError> {
        match self.errors.as_deref() {
            Some(errors) if !errors.is_empty() => {
                Some(TimingError::graphql(errors.iter().map(|e| e.message.clone())))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionData {
    session: Option<Session>,
}

#[derive(Debug, Deserialize)]
struct ScheduleData {
    #[serde(default)]
    races: Option<Vec<Race>>,
}

/// Something that can execute a GraphQL request and return the raw envelope.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn execute(&self, request: &GraphQlRequest) -> Result<GraphQlResponse<Value>>;
}

/// [`Transport`] that POSTs JSON with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TimingError::transport_with_source("building HTTP client", Box::new(e)))?;
        Ok(Self { http, endpoint: config.http_endpoint.clone() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &GraphQlRequest) -> Result<GraphQlResponse<Value>> {
        trace!(endpoint = %self.endpoint, variables = %request.variables, "POST GraphQL");
        let response = self.http.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        // GraphQL servers often report errors with a 4xx and a valid envelope,
        // so try the envelope before giving up on the status.
        let envelope = serde_json::from_str::<GraphQlResponse<Value>>(&body);
        if status.is_success() {
            return envelope.map_err(|e| TimingError::parse("GraphQL response", e.to_string()));
        }
        match envelope {
            Ok(envelope) if envelope.errors.is_some() => Ok(envelope),
            _ => Err(TimingError::Http { status: status.as_u16(), body: truncate(&body, 200) }),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Typed queries against the timing service.
#[derive(Clone)]
pub struct TimingClient {
    transport: Arc<dyn Transport>,
}

impl TimingClient {
    /// Client over HTTP using `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }

    pub fn with_transport<T: Transport>(transport: T) -> Self {
        Self { transport: Arc::new(transport) }
    }

    /// Run an arbitrary request and decode its `data`, tolerating field
    /// errors that come with it.
    pub async fn request<T: DeserializeOwned>(&self, request: &GraphQlRequest) -> Result<T> {
        let data = self.transport.execute(request).await?.into_result()?;
        decode_data(data)
    }

    /// Like [`request`](Self::request), but any reported error fails it.
    pub async fn request_strict<T: DeserializeOwned>(
        &self,
        request: &GraphQlRequest,
    ) -> Result<T> {
        let data = self.transport.execute(request).await?.into_strict_result()?;
        decode_data(data)
    }

    /// Fetch one session with the compact query.
    pub async fn fetch_session(&self, session_id: &str) -> Result<Session> {
        debug!(session_id, "Fetching session");
        self.query_session(&GraphQlRequest::session(session_id), session_id).await
    }

    /// Fetch one session with the full leaderboard selection.
    pub async fn fetch_leaderboard(&self, session_id: &str) -> Result<Session> {
        self.query_session(&GraphQlRequest::leaderboard(session_id), session_id).await
    }

    async fn query_session(&self, request: &GraphQlRequest, session_id: &str) -> Result<Session> {
        let response = self.transport.execute(request).await?;
        decode_session(response)?
            .ok_or_else(|| TimingError::missing(format!("session {}", session_id)))
    }

    /// Fetch every race of a championship. A missing list is an empty schedule.
    pub async fn fetch_schedule(&self, championship_id: &str) -> Result<Vec<Race>> {
        debug!(championship_id, "Fetching schedule");
        self.execute_schedule(&GraphQlRequest::schedule(championship_id)).await
    }

    /// Run a prepared schedule request, so a retry can resend the exact body.
    ///
    /// Any reported error fails the schedule, even alongside data.
    pub async fn execute_schedule(&self, request: &GraphQlRequest) -> Result<Vec<Race>> {
        let data = self.request_strict::<ScheduleData>(request).await?;
        Ok(data.races.unwrap_or_default())
    }
}

fn decode_data<T: DeserializeOwned>(data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|e| TimingError::parse("GraphQL data", e.to_string()))
}

/// Decode a session envelope, keeping partial data.
///
/// A null `session` next to errors is the usual shape of a failed lookup, so
/// the first error is returned then.
pub(crate) fn decode_session(response: GraphQlResponse<Value>) -> Result<Option<Session>> {
    let error = response.error();
    let data: SessionData = decode_data(response.into_result()?)?;
    match (data.session, error) {
        (Some(session), _) => Ok(Some(session)),
        (None, Some(error)) => Err(error),
        (None, None) => Ok(None),
    }
}
