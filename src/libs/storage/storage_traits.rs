use crate::libs::storage::records::TokenPair;
use thiserror::Error;

pub trait TokenStore {
    fn load(&self) -> Result<Option<TokenPair>, StoreError>;
    fn save(&self, token: &TokenPair) -> Result<(), StoreError>;
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed Token File: {0}")]
    MalformedToken(String),
}
