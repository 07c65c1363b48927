//! Event delivery to the collector.
//!
//! The runtime only ever talks to the collector through [`EventTransport`],
//! so tests swap in a capturing mock and exercise the full delivery
//! fallback chain without a network.

use async_trait::async_trait;
use tracing::debug;

use analytics_core::{Error, NewEvent, NewSession, Result, SessionPatch};

/// Delivery seam between the tracking runtime and the collector.
#[async_trait]
pub trait EventTransport: Send + Sync {
    async fn create_session(&self, session: &NewSession) -> Result<()>;

    async fn submit_event(&self, event: &NewEvent) -> Result<()>;

    async fn update_session(&self, id: &str, patch: &SessionPatch) -> Result<()>;

    /// Unload-safe, non-blocking delivery primitive. `Ok(false)` means the
    /// primitive is unavailable on this platform and the caller should fall
    /// back to a keepalive request.
    async fn send_beacon(&self, event: &NewEvent) -> Result<bool>;

    /// Delivery that asks the network layer to complete the request even as
    /// the page goes away.
    async fn submit_event_keepalive(&self, event: &NewEvent) -> Result<()>;
}

/// HTTP transport against the collector's JSON API.
///
/// No explicit request timeouts: delivery is best-effort and the network
/// layer's own defaults apply.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T: serde::Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<()> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::internal(format!("collector unreachable: {e}")))?;
        check_status(response)
    }
}

fn check_status(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::internal(format!("collector returned {status}")))
    }
}

#[async_trait]
impl EventTransport for HttpTransport {
    async fn create_session(&self, session: &NewSession) -> Result<()> {
        self.post_json("/api/analytics/session", session).await
    }

    async fn submit_event(&self, event: &NewEvent) -> Result<()> {
        self.post_json("/api/analytics/event", event).await
    }

    async fn update_session(&self, id: &str, patch: &SessionPatch) -> Result<()> {
        let response = self
            .client
            .patch(self.url(&format!("/api/analytics/session/{id}")))
            .json(patch)
            .send()
            .await
            .map_err(|e| Error::internal(format!("collector unreachable: {e}")))?;
        check_status(response)
    }

    async fn send_beacon(&self, _event: &NewEvent) -> Result<bool> {
        // No OS-level beacon primitive here; report unavailable so the
        // runtime takes the keepalive path.
        debug!("beacon delivery unavailable, deferring to keepalive");
        Ok(false)
    }

    async fn submit_event_keepalive(&self, event: &NewEvent) -> Result<()> {
        // Run the request on a detached task so cancellation of the caller
        // cannot abort an in-flight conversion event.
        let request = self
            .client
            .post(self.url("/api/analytics/event"))
            .json(event);
        let handle = tokio::spawn(async move { request.send().await });
        let response = handle
            .await
            .map_err(|e| Error::internal(format!("keepalive task failed: {e}")))?
            .map_err(|e| Error::internal(format!("collector unreachable: {e}")))?;
        check_status(response)
    }
}
