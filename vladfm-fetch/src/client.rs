//! HTTP client with tracing and JSON helpers.
//!
//! Wraps a `reqwest::Client` bound to one base URL. Paths are built from
//! segments, each percent-encoded, so slugs and usernames never change the
//! shape of the URL.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::error::GatewayError;
use crate::settings::GatewaySettings;

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper bound to the backend base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a client from settings.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidUrl` for an unusable base URL, or a
    /// network error if the TLS backend cannot be initialized.
    pub fn new(settings: &GatewaySettings) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {e}", settings.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(settings.base_url.clone()));
        }

        let inner = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| GatewayError::from_reqwest(&e, settings.timeout))?;

        Ok(Self {
            inner,
            base_url,
            timeout: settings.timeout,
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `<base>/<seg>/<seg>...`, encoding each segment.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidUrl` if the base URL cannot take path
    /// segments.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Performs a GET request and decodes the JSON body.
    #[instrument(skip(self, query), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        debug!(params = ?query, "GET request");

        let response = self
            .inner
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(&e, self.timeout))?;
        self.read(response).await
    }

    /// Performs a POST request with a JSON body and decodes the JSON reply.
    #[instrument(skip(self, body), fields(url = %url))]
    pub async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!("POST request with JSON");

        let response = self
            .inner
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::from_reqwest(&e, self.timeout))?;
        self.read(response).await
    }

    async fn read<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, GatewayError> {
        let status = response.status();
        debug!(status = %status, "Response received");

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::from_reqwest(&e, self.timeout))?;
        decode_body(status, &body)
    }
}

/// Maps a status and body to a decoded payload or a gateway error.
pub(crate) fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, GatewayError> {
    if !status.is_success() {
        return Err(GatewayError::api(status.as_u16(), body));
    }
    serde_json::from_str(body).map_err(|e| GatewayError::Decode(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use vladfm_core::Tag;

    fn client(base: &str) -> HttpClient {
        HttpClient::new(&GatewaySettings::new(base)).unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let client = client("http://localhost:8000/api");
        let url = client.endpoint(&["posts", "12", "vote"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/posts/12/vote");
    }

    #[test]
    fn test_endpoint_with_trailing_slash_base() {
        let client = client("https://vlad.fm/api/");
        let url = client.endpoint(&["tags"]).unwrap();
        assert_eq!(url.as_str(), "https://vlad.fm/api/tags");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client("http://localhost/api");
        let url = client.endpoint(&["users", "sass the spurs fan"]).unwrap();
        assert_eq!(url.path(), "/api/users/sass%20the%20spurs%20fan");

        let url = client.endpoint(&["users", "a/b?c"]).unwrap();
        assert_eq!(url.path(), "/api/users/a%2Fb%3Fc");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpClient::new(&GatewaySettings::new("not a url")),
            Err(GatewayError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpClient::new(&GatewaySettings::new("mailto:someone@example.com")),
            Err(GatewayError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_decode_success() {
        let tags: Vec<Tag> = decode_body(
            StatusCode::OK,
            r##"[{"id":1,"name":"EPL","slug":"epl","color":"#3d195b"}]"##,
        )
        .unwrap();
        assert_eq!(tags[0].slug, "epl");
    }

    #[test]
    fn test_decode_error_status_keeps_body() {
        let err = decode_body::<Vec<Tag>>(StatusCode::NOT_FOUND, r#"{"detail":"user not found"}"#)
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.detail(), "user not found");
    }

    #[test]
    fn test_decode_malformed_body() {
        let err = decode_body::<Vec<Tag>>(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn test_decode_null_as_option() {
        let vote: Option<vladfm_core::VoteTally> = decode_body(StatusCode::OK, "null").unwrap();
        assert!(vote.is_none());
    }
}
