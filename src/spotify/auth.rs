use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::spotify::types::SpotifyTokenResponse;

const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

#[derive(Debug, thiserror::Error)]
pub enum AuthenticateError {
    #[error("Spotify rejected the client credentials: {reason}")]
    RejectedCredentials { reason: String },
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse token response")]
    FailedToParseResponse(reqwest::Error),
}

/// Obtain an app access token via the client-credentials grant
/// https://developer.spotify.com/documentation/web-api/tutorials/client-credentials-flow
pub async fn client_credentials_token(
    client_id: &str,
    client_secret: &str,
) -> Result<SpotifyTokenResponse, AuthenticateError> {
    let client = reqwest::Client::new();

    let mut params = HashMap::new();
    params.insert("grant_type", "client_credentials");

    let response = client
        .post(SPOTIFY_TOKEN_URL)
        // Serializes to x-www-form-urlencoded and sets the header (as required by spotify)
        .form(&params)
        .header(
            "Authorization",
            format!(
                "Basic {}",
                STANDARD.encode(format!("{}:{}", client_id, client_secret))
            ),
        )
        .send()
        .await
        .map_err(AuthenticateError::FailedToSendRequest)?;

    if !response.status().is_success() {
        return Err(AuthenticateError::RejectedCredentials {
            reason: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    let token_response: SpotifyTokenResponse = response
        .json()
        .await
        .map_err(AuthenticateError::FailedToParseResponse)?;

    Ok(token_response)
}
