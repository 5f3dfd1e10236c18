//! HTTP control plane for the streaming backend
//!
//! Starting a stream is a blocking HTTP call made from a helper thread; the
//! audio itself arrives over the WebSocket transport.

use crate::net::message::{BackendStatus, StartStreamResponse};
use crate::session::SessionConfig;
use crate::{Result, StreamviewError};
use tracing::{debug, info};
use url::Url;

/// Control-plane operations against the backend.
///
/// Trait object so the session can run against a test double.
pub trait StreamApi: Send + Sync {
    /// Ask the backend to generate content for `topic` and begin streaming.
    ///
    /// The backend also reports failures inside an HTTP 200 body with
    /// `status: "error"`; implementations surface those as `Err` too.
    fn start_stream(&self, topic: &str) -> Result<StartStreamResponse>;

    /// Fetch the backend's current streaming state
    fn fetch_status(&self) -> Result<BackendStatus>;
}

/// `StreamApi` over reqwest's blocking client
pub struct HttpStreamApi {
    client: reqwest::blocking::Client,
    base: Url,
}

impl HttpStreamApi {
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let base = config.base_url()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(config.start_timeout)
            .build()
            .map_err(|e| StreamviewError::ApiError(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| StreamviewError::ApiError(format!("invalid endpoint {}: {}", path, e)))
    }
}

impl StreamApi for HttpStreamApi {
    fn start_stream(&self, topic: &str) -> Result<StartStreamResponse> {
        let mut url = self.endpoint("/api/start_stream")?;
        url.query_pairs_mut().append_pair("topic", topic);

        info!("Requesting stream start for topic: {}", topic);
        let response = self
            .client
            .post(url)
            .send()
            .map_err(|e| StreamviewError::ApiError(format!("start_stream request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamviewError::ApiError(format!(
                "start_stream returned HTTP {}",
                status
            )));
        }

        let body: StartStreamResponse = response
            .json()
            .map_err(|e| StreamviewError::ApiError(format!("invalid start_stream body: {}", e)))?;

        if body.is_error() {
            return Err(StreamviewError::ApiError(body.error_message()));
        }

        debug!(
            "Stream started: {} items queued",
            body.playlist_size.unwrap_or(0)
        );
        Ok(body)
    }

    fn fetch_status(&self) -> Result<BackendStatus> {
        let url = self.endpoint("/api/status")?;
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| StreamviewError::ApiError(format!("status request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamviewError::ApiError(format!(
                "status returned HTTP {}",
                status
            )));
        }

        response
            .json()
            .map_err(|e| StreamviewError::ApiError(format!("invalid status body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_default_config() {
        let api = HttpStreamApi::new(&SessionConfig::default()).unwrap();
        let url = api.endpoint("/api/start_stream").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/start_stream");
    }

    #[test]
    fn rejects_invalid_base() {
        let config = SessionConfig::default().with_api_base("not a url");
        assert!(HttpStreamApi::new(&config).is_err());
    }

    #[test]
    fn topic_is_query_encoded() {
        let api = HttpStreamApi::new(&SessionConfig::default()).unwrap();
        let mut url = api.endpoint("/api/start_stream").unwrap();
        url.query_pairs_mut().append_pair("topic", "coffee & tea");
        assert_eq!(url.query(), Some("topic=coffee+%26+tea"));
    }
}
