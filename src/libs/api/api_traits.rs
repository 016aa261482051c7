use crate::libs::models::{FeedEnvelope, FeedError, MessageId};
use thiserror::Error;

/// The three calls the feed session makes against the service.
pub trait YammerApi {
    fn fetch_feed(&self) -> Result<FeedEnvelope, ApiError>;
    fn post_message(&self, body: &str, replied_to_id: Option<MessageId>) -> Result<(), ApiError>;
    fn delete_message(&self, message_id: MessageId) -> Result<(), ApiError>;
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Fetching messages failed: {0}")]
    FetchFailed(String),
    #[error("Posting failed: {0}")]
    PostFailed(String),
    #[error("Deleting failed: {0}")]
    DeleteFailed(String),
    #[error("OAuth Error: {0}")]
    OAuth(String),
    #[error(transparent)]
    Feed(#[from] FeedError),
}
