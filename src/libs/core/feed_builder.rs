use crate::libs::core::relative_time::format_relative;
use crate::libs::models::{Message, MessageId, Reference, User, UserId};
use chrono::{DateTime, TimeZone};
use std::collections::HashMap;
use std::fmt::Display;
use tracing::debug;

/// Display-ready form of one message.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRecord {
    pub message_id: MessageId,
    pub sender_display_name: String,
    pub reply_context_display_name: Option<String>,
    pub body_plain: String,
    pub relative_time_label: String,
    pub client_type: String,
}

/// Users named by one feed, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<UserId, User>,
}

impl UserDirectory {
    pub fn from_references(references: &[Reference]) -> Self {
        let users = references
            .iter()
            .filter_map(Reference::as_user)
            .map(|user| (user.id, user.clone()))
            .collect();
        Self { users }
    }

    pub fn get(&self, user_id: UserId) -> Option<&User> {
        self.users.get(&user_id)
    }

    /// Unknown senders resolve to an empty name rather than an error.
    pub fn display_name(&self, user_id: UserId) -> &str {
        self.get(user_id)
            .map(|user| user.full_name.as_str())
            .unwrap_or("")
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

pub fn build<Tz>(messages: &[Message], references: &[Reference], now: &DateTime<Tz>) -> Vec<RenderRecord>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    build_with_directory(messages, &UserDirectory::from_references(references), now)
}

pub fn build_with_directory<Tz>(
    messages: &[Message],
    directory: &UserDirectory,
    now: &DateTime<Tz>,
) -> Vec<RenderRecord>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    // later duplicates overwrite earlier ones
    let batch: HashMap<MessageId, &Message> = messages
        .iter()
        .map(|message| (message.id, message))
        .collect();

    let records: Vec<RenderRecord> = messages
        .iter()
        .map(|message| {
            let reply_context_display_name = message
                .replied_to_id
                .and_then(|target| batch.get(&target))
                .map(|target| directory.display_name(target.sender_id).to_string());
            let created_at = message.created_at.with_timezone(&now.timezone());

            RenderRecord {
                message_id: message.id,
                sender_display_name: directory.display_name(message.sender_id).to_string(),
                reply_context_display_name,
                body_plain: indent_body(&message.body_plain),
                relative_time_label: format_relative(now, &created_at),
                client_type: message.client_type.clone(),
            }
        })
        .collect();

    debug!(
        messages = messages.len(),
        users = directory.len(),
        "Built feed model"
    );
    records
}

fn indent_body(body: &str) -> String {
    body.replace('\n', "\n\t")
}
