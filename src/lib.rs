pub mod libs;

use crate::libs::api::api_traits::ApiError;
use crate::libs::api::client::YammerClient;
use crate::libs::api::oauth::OAuthHandshake;
use crate::libs::config::{ConfigError, YammerConfig};
use crate::libs::core::session::FeedSession;
use crate::libs::models::FeedError;
use crate::libs::storage::mugshot_cache::{MugshotCache, PrefetchSummary};
use crate::libs::storage::records::TokenPair;
use crate::libs::storage::storage_traits::{StoreError, TokenStore};
use crate::libs::storage::token_store::FileTokenStore;
use reqwest::blocking::Client;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum YammerError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("Storage Error: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not authorized yet, no access token in {0}")]
    NotAuthorized(String),
}

pub fn http_client(config: &YammerConfig) -> Result<Client, YammerError> {
    let client = Client::builder()
        .user_agent(config.user_agent())
        .build()
        .map_err(ApiError::from)?;
    Ok(client)
}

/// Client for the messages endpoints, using the access token saved by [`authorize`].
pub fn connect(config: &YammerConfig) -> Result<YammerClient, YammerError> {
    let credentials = config.credentials()?;
    let store = FileTokenStore::new(config.token_file());
    let access_token = store
        .load()?
        .ok_or_else(|| YammerError::NotAuthorized(store.path().display().to_string()))?;

    Ok(YammerClient::new(
        http_client(config)?,
        credentials,
        access_token,
        config.api_base(),
    ))
}

/// Runs the OAuth handshake and saves the resulting access token. `read_verifier`
/// is handed the URL the user must visit and returns the code shown there.
pub fn authorize(
    config: &YammerConfig,
    read_verifier: impl FnOnce(&str) -> std::io::Result<String>,
) -> Result<TokenPair, YammerError> {
    let handshake = OAuthHandshake::new(http_client(config)?, config.credentials()?, config.oauth_base());
    let request_token = handshake.request_token()?;
    let verifier = read_verifier(&handshake.authorize_url(&request_token))?;
    let access_token = handshake.access_token(&request_token, &verifier)?;

    FileTokenStore::new(config.token_file()).save(&access_token)?;
    info!("Authorization complete");
    Ok(access_token)
}

pub fn prefetch_mugshots(config: &YammerConfig, session: &FeedSession) -> Result<PrefetchSummary, YammerError> {
    let cache = MugshotCache::new(config.mugshot_dir(), http_client(config)?);
    Ok(cache.prefetch(session.users().users()))
}
