//! OAuth2 password-grant login.

use std::fmt;

use serde::Deserialize;
use tracing::debug;

use crate::{
    config::Credentials,
    error::{Error, Result},
};

/// An authenticated API session.
#[derive(Clone)]
pub struct Session {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Base URL of the org instance, without a trailing slash.
    pub instance_url: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("instance_url", &self.instance_url)
            .finish()
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    /// Issued access token.
    access_token: Option<String>,
    /// Instance the token is valid for.
    instance_url: Option<String>,
}

/// Request an access token with the password grant.
///
/// Any failure, including transport errors, is reported as [`Error::Auth`].
pub async fn authenticate(http: &reqwest::Client, credentials: &Credentials) -> Result<Session> {
    let domain = credentials.domain.trim_end_matches('/');
    let url = format!("{domain}/services/oauth2/token");
    let params = [
        ("grant_type", "password"),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("username", credentials.username.as_str()),
        ("password", credentials.password.as_str()),
    ];

    debug!(%domain, "requesting access token");
    let response = http
        .post(&url)
        .form(&params)
        .send()
        .await
        .map_err(|error| Error::Auth {
            message: format!("token request failed: {error}"),
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Auth {
            message: format!("{status}: {body}"),
        });
    }

    let token: TokenResponse = response.json().await.map_err(|error| Error::Auth {
        message: format!("unreadable token response: {error}"),
    })?;

    let Some(access_token) = token.access_token.filter(|token| !token.is_empty()) else {
        return Err(Error::Auth {
            message: "no access_token returned (invalid_grant?)".to_string(),
        });
    };
    let instance_url = token
        .instance_url
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| domain.to_string());

    Ok(Session {
        access_token,
        instance_url: instance_url.trim_end_matches('/').to_string(),
    })
}
