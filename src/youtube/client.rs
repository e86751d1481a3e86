use std::time::Duration;

use color_eyre::eyre::{OptionExt, Result, WrapErr};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::config::YoutubeConfig;
use crate::ports::youtube::{AddOutcome, YoutubeApi};
use crate::youtube::types::{
    AddVideoAction, ClientContext, EditPlaylistRequest, EditPlaylistResponse, SearchRequest,
    first_video_id,
};

const SEARCH_URL: &str = "https://www.youtube.com/youtubei/v1/search";
const EDIT_PLAYLIST_URL: &str = "https://www.youtube.com/youtubei/v1/browse/edit_playlist";

/// Marker substrings that indicate the session cookie is invalid or
/// expired, scanned over the raw response body of non-succeeded adds.
/// Innertube documents no stable error code for this, so detection is
/// coupled to observed response phrasing and will break if that changes.
const AUTH_FAILURE_MARKERS: [&str; 4] = [
    "visitorData",
    "UNAUTHENTICATED",
    "CREDENTIALS_MISSING",
    "responseContext",
];

/// YouTube innertube client, authenticated by the configured headers
/// (session cookie + client version) rather than an API key.
pub struct YoutubeClient {
    client: reqwest::Client,
    headers: HeaderMap,
    client_version: String,
}

impl YoutubeClient {
    pub fn new(config: &YoutubeConfig) -> Result<Self> {
        let client_version = config
            .client_version()
            .ok_or_eyre("Youtube config is missing the X-Youtube-Client-Version header")?
            .to_string();

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .wrap_err_with(|| format!("Invalid header name in config: {}", name))?;
            let value = HeaderValue::from_str(value)
                .wrap_err_with(|| format!("Invalid value for header: {}", name))?;
            headers.insert(name, value);
        }

        Ok(Self {
            client: reqwest::Client::new(),
            headers,
            client_version,
        })
    }

    fn context(&self) -> ClientContext {
        ClientContext::web(&self.client_version)
    }
}

#[async_trait::async_trait]
impl YoutubeApi for YoutubeClient {
    async fn search_first(&self, query: &str) -> Result<Option<String>> {
        let request = SearchRequest {
            context: self.context(),
            query: query.to_string(),
        };

        let response = self
            .client
            .post(SEARCH_URL)
            .headers(self.headers.clone())
            .json(&request)
            .timeout(Duration::from_secs(15))
            .send()
            .await?
            .error_for_status()?;

        let data: Value = response
            .json()
            .await
            .wrap_err("Failed to deserialize Youtube search response")?;

        Ok(first_video_id(&data).map(str::to_string))
    }

    async fn add_to_playlist(&self, playlist_id: &str, video_id: &str) -> AddOutcome {
        let request = EditPlaylistRequest {
            context: self.context(),
            actions: vec![AddVideoAction::add(video_id)],
            playlist_id: playlist_id.to_string(),
        };

        let response = match self
            .client
            .post(EDIT_PLAYLIST_URL)
            .headers(self.headers.clone())
            .json(&request)
            .timeout(Duration::from_secs(15))
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => return AddOutcome::TransportError(error.to_string()),
        };

        let status = response.status();
        // 429 is checked before the body is parsed
        if status == StatusCode::TOO_MANY_REQUESTS {
            return AddOutcome::RateLimited;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(error) => return AddOutcome::TransportError(error.to_string()),
        };

        classify_add_response(status, &body)
    }
}

/// Classify an edit_playlist response into exactly one outcome.
pub fn classify_add_response(status: StatusCode, body: &str) -> AddOutcome {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return AddOutcome::RateLimited;
    }

    let parsed: Option<EditPlaylistResponse> = serde_json::from_str(body).ok();
    if parsed.is_some_and(|response| response.status.as_deref() == Some("STATUS_SUCCEEDED")) {
        return AddOutcome::Added;
    }

    if AUTH_FAILURE_MARKERS
        .iter()
        .any(|marker| body.contains(marker))
    {
        return AddOutcome::AuthFailure;
    }

    AddOutcome::Rejected(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_wins_over_body() {
        let outcome = classify_add_response(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"status":"STATUS_SUCCEEDED"}"#,
        );
        assert_eq!(outcome, AddOutcome::RateLimited);
    }

    #[test]
    fn succeeded_status_is_added() {
        let outcome = classify_add_response(StatusCode::OK, r#"{"status":"STATUS_SUCCEEDED"}"#);
        assert_eq!(outcome, AddOutcome::Added);
    }

    #[test]
    fn unauthenticated_marker_is_auth_failure() {
        let body = r#"{"error":{"code":401,"status":"UNAUTHENTICATED"}}"#;
        let outcome = classify_add_response(StatusCode::UNAUTHORIZED, body);
        assert_eq!(outcome, AddOutcome::AuthFailure);
    }

    #[test]
    fn missing_credentials_marker_is_auth_failure() {
        let body = r#"{"error":{"message":"Request had invalid authentication credentials","details":"CREDENTIALS_MISSING"}}"#;
        let outcome = classify_add_response(StatusCode::OK, body);
        assert_eq!(outcome, AddOutcome::AuthFailure);
    }

    #[test]
    fn plain_failure_is_rejected() {
        let body = r#"{"status":"STATUS_FAILED"}"#;
        let outcome = classify_add_response(StatusCode::OK, body);
        assert_eq!(outcome, AddOutcome::Rejected(body.to_string()));
    }

    #[test]
    fn unparseable_marker_free_body_is_rejected() {
        let outcome = classify_add_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(outcome, AddOutcome::Rejected(_)));
    }
}
