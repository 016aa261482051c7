use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use thiserror::Error;

pub type MessageId = u64;
pub type UserId = u64;

// Yammer sends "2011/03/28 20:39:12 +0000"
const CREATED_AT_FORMAT: &str = "%Y/%m/%d %H:%M:%S %z";

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Feed is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed feed: {record} is missing `{field}`")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },
    #[error("Malformed feed: unreadable timestamp `{value}`")]
    InvalidTimestamp { value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub mugshot_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub replied_to_id: Option<MessageId>,
    pub body_plain: String,
    pub created_at: DateTime<FixedOffset>,
    pub client_type: String,
}

/// An entity referenced by the messages of a feed. Only users are kept in full,
/// everything else (threads, groups, tags) is remembered by its tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    User(User),
    Other { kind: String, id: Option<u64> },
}

impl Reference {
    pub fn as_user(&self) -> Option<&User> {
        match self {
            Reference::User(user) => Some(user),
            Reference::Other { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedEnvelope {
    pub messages: Vec<Message>,
    pub references: Vec<Reference>,
}

impl FeedEnvelope {
    pub fn from_json(json: &str) -> Result<Self, FeedError> {
        let raw: RawFeed = serde_json::from_str(json)?;
        raw.try_into()
    }
}

#[derive(Debug, Deserialize)]
struct RawFeed {
    messages: Option<Vec<RawMessage>>,
    references: Option<Vec<RawReference>>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    id: Option<MessageId>,
    sender_id: Option<UserId>,
    replied_to_id: Option<MessageId>,
    body: Option<RawBody>,
    created_at: Option<String>,
    client_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBody {
    plain: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawReference {
    #[serde(rename = "type")]
    kind: Option<String>,
    id: Option<u64>,
    full_name: Option<String>,
    mugshot_url: Option<String>,
}

fn required<T>(value: Option<T>, record: &'static str, field: &'static str) -> Result<T, FeedError> {
    value.ok_or(FeedError::MissingField { record, field })
}

pub fn parse_created_at(value: &str) -> Result<DateTime<FixedOffset>, FeedError> {
    DateTime::parse_from_str(value, CREATED_AT_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map_err(|_| FeedError::InvalidTimestamp {
            value: value.to_string(),
        })
}

impl TryFrom<RawFeed> for FeedEnvelope {
    type Error = FeedError;

    fn try_from(raw: RawFeed) -> Result<Self, Self::Error> {
        let messages = required(raw.messages, "feed", "messages")?
            .into_iter()
            .map(Message::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let references = required(raw.references, "feed", "references")?
            .into_iter()
            .map(Reference::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            messages,
            references,
        })
    }
}

impl TryFrom<RawMessage> for Message {
    type Error = FeedError;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        let body = required(raw.body, "message", "body")?;
        let created_at = required(raw.created_at, "message", "created_at")?;

        Ok(Self {
            id: required(raw.id, "message", "id")?,
            sender_id: required(raw.sender_id, "message", "sender_id")?,
            replied_to_id: raw.replied_to_id,
            body_plain: required(body.plain, "message", "body.plain")?,
            created_at: parse_created_at(&created_at)?,
            client_type: required(raw.client_type, "message", "client_type")?,
        })
    }
}

impl TryFrom<RawReference> for Reference {
    type Error = FeedError;

    fn try_from(raw: RawReference) -> Result<Self, Self::Error> {
        match raw.kind.as_deref() {
            Some("user") => Ok(Reference::User(User {
                id: required(raw.id, "user", "id")?,
                full_name: required(raw.full_name, "user", "full_name")?,
                mugshot_url: required(raw.mugshot_url, "user", "mugshot_url")?,
            })),
            other => Ok(Reference::Other {
                kind: other.unwrap_or_default().to_string(),
                id: raw.id,
            }),
        }
    }
}
