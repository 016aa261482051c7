use crate::libs::api::api_traits::{ApiError, YammerApi};
use crate::libs::api::oauth::{OAuthCredentials, OAuthSigner};
use crate::libs::models::{FeedEnvelope, MessageId};
use crate::libs::storage::records::TokenPair;
use reqwest::blocking::{Client, Response};
use reqwest::header::AUTHORIZATION;
use reqwest::{StatusCode, Version};
use tracing::{debug, info};

/// Blocking HTTP client for the messages endpoints, signed with the stored access token.
pub struct YammerClient {
    http: Client,
    signer: OAuthSigner,
    access_token: TokenPair,
    api_base: String,
}

impl YammerClient {
    pub fn new(
        http: Client,
        credentials: OAuthCredentials,
        access_token: TokenPair,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            signer: OAuthSigner::new(credentials),
            access_token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn authorization(&self) -> String {
        self.signer
            .authorization_header(Some(&self.access_token), &[])
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.api_base)
    }
}

/// "HTTP/1.1 201 Created"
pub fn status_line(version: Version, status: StatusCode) -> String {
    format!("{:?} {}", version, status)
}

fn response_line(response: &Response) -> String {
    status_line(response.version(), response.status())
}

/// Post and delete each succeed on exactly one status; anything else, other 2xx
/// codes included, is reported with its status line.
fn expect_status(
    version: Version,
    status: StatusCode,
    expected: StatusCode,
    failed: fn(String) -> ApiError,
) -> Result<(), ApiError> {
    if status == expected {
        Ok(())
    } else {
        Err(failed(status_line(version, status)))
    }
}

impl YammerApi for YammerClient {
    fn fetch_feed(&self) -> Result<FeedEnvelope, ApiError> {
        let response = self
            .http
            .get(format!("{}.json", self.messages_url()))
            .header(AUTHORIZATION, self.authorization())
            .send()?;

        if !response.status().is_success() {
            return Err(ApiError::FetchFailed(response_line(&response)));
        }
        let body = response.text()?;
        debug!(bytes = body.len(), "Fetched message feed");
        Ok(FeedEnvelope::from_json(&body)?)
    }

    fn post_message(&self, body: &str, replied_to_id: Option<MessageId>) -> Result<(), ApiError> {
        let mut form = vec![("body", body.to_string())];
        if let Some(replied_to_id) = replied_to_id {
            form.push(("replied_to_id", replied_to_id.to_string()));
        }

        let response = self
            .http
            .post(self.messages_url())
            .header(AUTHORIZATION, self.authorization())
            .form(&form)
            .send()?;

        expect_status(
            response.version(),
            response.status(),
            StatusCode::CREATED,
            ApiError::PostFailed,
        )?;
        info!(replied_to_id = ?replied_to_id, "Posted message");
        Ok(())
    }

    fn delete_message(&self, message_id: MessageId) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(format!("{}/{}", self.messages_url(), message_id))
            .header(AUTHORIZATION, self.authorization())
            .send()?;

        expect_status(
            response.version(),
            response.status(),
            StatusCode::OK,
            ApiError::DeleteFailed,
        )?;
        info!(message_id, "Deleted message");
        Ok(())
    }
}
