use crate::libs::api::api_traits::ApiError;
use crate::libs::storage::records::TokenPair;
use chrono::Utc;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

const OAUTH_VERSION: &str = "1.0";
const SIGNATURE_METHOD: &str = "PLAINTEXT";
const OUT_OF_BAND_CALLBACK: &str = "oob";

// RFC 3986 unreserved characters stay as they are
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn oauth_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .finish()
    }
}

/// Builds `Authorization: OAuth ...` headers with the PLAINTEXT signature method.
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    credentials: OAuthCredentials,
}

impl OAuthSigner {
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self { credentials }
    }

    pub fn authorization_header(&self, token: Option<&TokenPair>, extra: &[(&str, &str)]) -> String {
        let timestamp = Utc::now().timestamp();
        let nonce = Uuid::now_v7().simple().to_string();
        self.header_with(token, extra, timestamp, &nonce)
    }

    pub fn header_with(
        &self,
        token: Option<&TokenPair>,
        extra: &[(&str, &str)],
        timestamp: i64,
        nonce: &str,
    ) -> String {
        let mut params: Vec<(&str, String)> = vec![
            ("oauth_consumer_key", self.credentials.consumer_key.clone()),
            ("oauth_nonce", nonce.to_string()),
            ("oauth_signature_method", SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp", timestamp.to_string()),
            ("oauth_version", OAUTH_VERSION.to_string()),
        ];
        if let Some(token) = token {
            params.push(("oauth_token", token.token.clone()));
        }
        params.extend(extra.iter().map(|(key, value)| (*key, value.to_string())));
        params.push(("oauth_signature", self.signature(token)));

        let fields: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"", key, oauth_encode(value)))
            .collect();
        format!("OAuth {}", fields.join(", "))
    }

    pub fn signature(&self, token: Option<&TokenPair>) -> String {
        let token_secret = token.map(|token| token.secret.as_str()).unwrap_or("");
        format!(
            "{}&{}",
            oauth_encode(&self.credentials.consumer_secret),
            oauth_encode(token_secret)
        )
    }
}

/// The three-legged dance that turns consumer credentials into an access token.
pub struct OAuthHandshake {
    http: Client,
    signer: OAuthSigner,
    oauth_base: String,
}

impl OAuthHandshake {
    pub fn new(http: Client, credentials: OAuthCredentials, oauth_base: impl Into<String>) -> Self {
        Self {
            http,
            signer: OAuthSigner::new(credentials),
            oauth_base: oauth_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn request_token(&self) -> Result<TokenPair, ApiError> {
        let header = self
            .signer
            .authorization_header(None, &[("oauth_callback", OUT_OF_BAND_CALLBACK)]);
        let request_token = self.exchange("request_token", header)?;
        debug!(token = %request_token.token, "Obtained request token");
        Ok(request_token)
    }

    pub fn authorize_url(&self, request_token: &TokenPair) -> String {
        format!(
            "{}/authorize?oauth_token={}",
            self.oauth_base,
            oauth_encode(&request_token.token)
        )
    }

    pub fn access_token(&self, request_token: &TokenPair, verifier: &str) -> Result<TokenPair, ApiError> {
        let header = self
            .signer
            .authorization_header(Some(request_token), &[("oauth_verifier", verifier.trim())]);
        let access_token = self.exchange("access_token", header)?;
        info!("Obtained access token");
        Ok(access_token)
    }

    fn exchange(&self, endpoint: &str, header: String) -> Result<TokenPair, ApiError> {
        let response = self
            .http
            .post(format!("{}/{}", self.oauth_base, endpoint))
            .header(AUTHORIZATION, header)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ApiError::OAuth(format!("{} returned {}", endpoint, status)));
        }
        parse_token_response(&body)
    }
}

pub fn parse_token_response(body: &str) -> Result<TokenPair, ApiError> {
    let mut token = None;
    let mut secret = None;
    for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
        match key.as_ref() {
            "oauth_token" => token = Some(value.into_owned()),
            "oauth_token_secret" => secret = Some(value.into_owned()),
            _ => {}
        }
    }

    match (token, secret) {
        (Some(token), Some(secret)) => Ok(TokenPair::new(token, secret)),
        (None, _) => Err(ApiError::OAuth("response is missing oauth_token".to_string())),
        (_, None) => Err(ApiError::OAuth(
            "response is missing oauth_token_secret".to_string(),
        )),
    }
}
