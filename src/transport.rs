use crate::errors::TrackError;
use crate::models::{TrackingReply, TrackingRequest};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Outbound delivery of tracking events.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Request/response delivery. `Ok` only for a well-formed, successful reply.
    async fn send(&self, request: &TrackingRequest) -> Result<TrackingReply, TrackError>;

    /// Fire-and-forget delivery that must not depend on the caller staying alive.
    fn send_best_effort(&self, request: TrackingRequest);
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Endpoint for `request`, with each path segment percent-encoded.
    pub fn url(&self, request: &TrackingRequest) -> Result<Url, TrackError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|err| TrackError::InvalidUrl(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| TrackError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(request.path_segments())
            .push("");
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &TrackingRequest) -> Result<TrackingReply, TrackError> {
        let response = self
            .client
            .post(self.url(request)?)
            .query(&request.query())
            .header(CONTENT_TYPE, "application/json")
            .header(TrackingRequest::TOKEN_HEADER, request.auth_token.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let reply: TrackingReply = serde_json::from_slice(&body)?;
        reply.into_result()
    }

    fn send_best_effort(&self, request: TrackingRequest) {
        let Ok(handle) = Handle::try_current() else {
            warn!(
                event = request.event.kind(),
                "no runtime available, dropping best-effort event"
            );
            return;
        };

        let url = match self.url(&request) {
            Ok(url) => url,
            Err(err) => {
                warn!(event = request.event.kind(), "dropping best-effort event: {err}");
                return;
            }
        };
        let builder = self
            .client
            .post(url)
            .query(&request.query())
            .form(&request.form_fields());
        let kind = request.event.kind();

        handle.spawn(async move {
            match builder.send().await {
                Ok(response) => debug!(event = kind, status = %response.status(), "best-effort event delivered"),
                Err(err) => debug!(event = kind, "best-effort event lost: {err}"),
            }
        });
    }
}
