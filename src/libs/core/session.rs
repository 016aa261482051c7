use crate::libs::api::api_traits::YammerApi;
use crate::libs::core::feed_builder::{build_with_directory, RenderRecord, UserDirectory};
use crate::libs::core::index::{IdentifierIndex, Point};
use crate::libs::core::render::{emit, DisplayBuffer};
use crate::libs::models::{FeedEnvelope, MessageId};
use crate::YammerError;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use tracing::info;

/// Everything one rendered feed consists of. A session only ever holds a complete one.
#[derive(Debug, Clone, Default)]
struct RenderedFeed {
    buffer: DisplayBuffer,
    index: IdentifierIndex,
    users: UserDirectory,
    records: Vec<RenderRecord>,
}

impl RenderedFeed {
    fn build<Tz>(envelope: &FeedEnvelope, now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let users = UserDirectory::from_references(&envelope.references);
        let records = build_with_directory(&envelope.messages, &users, now);
        let mut buffer = DisplayBuffer::default();
        let mut index = IdentifierIndex::new();
        emit(&records, &mut index, &mut buffer);

        Self {
            buffer,
            index,
            users,
            records,
        }
    }
}

/// The state behind the feed display: the rendered buffer, the index from buffer
/// positions to message ids and the users of the last fetch.
#[derive(Debug, Clone, Default)]
pub struct FeedSession {
    feed: RenderedFeed,
}

impl FeedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &DisplayBuffer {
        &self.feed.buffer
    }

    pub fn index(&self) -> &IdentifierIndex {
        &self.feed.index
    }

    pub fn users(&self) -> &UserDirectory {
        &self.feed.users
    }

    pub fn records(&self) -> &[RenderRecord] {
        &self.feed.records
    }

    /// Fetches the feed and replaces the displayed one. On error the previous
    /// display is kept as it was.
    pub fn refresh<A, Tz>(&mut self, api: &A, now: &DateTime<Tz>) -> Result<usize, YammerError>
    where
        A: YammerApi + ?Sized,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let envelope = api.fetch_feed()?;
        Ok(self.load(&envelope, now))
    }

    pub fn load<Tz>(&mut self, envelope: &FeedEnvelope, now: &DateTime<Tz>) -> usize
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.feed = RenderedFeed::build(envelope, now);
        info!(
            messages = self.feed.records.len(),
            chars = self.feed.buffer.len(),
            "Rendered feed"
        );
        self.feed.records.len()
    }

    pub fn message_id_at(&self, point: Point) -> Option<MessageId> {
        self.feed.index.lookup(point)
    }

    /// The displayed record of `message_id`, if the current feed shows it.
    pub fn record_for(&self, message_id: MessageId) -> Option<&RenderRecord> {
        self.feed
            .records
            .iter()
            .find(|record| record.message_id == message_id)
    }

    pub fn post<A, Tz>(&mut self, api: &A, body: &str, now: &DateTime<Tz>) -> Result<(), YammerError>
    where
        A: YammerApi + ?Sized,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        api.post_message(body, None)?;
        self.refresh(api, now)?;
        Ok(())
    }

    /// Replies to the message at `point`. Returns the id replied to, or `None` when no
    /// message is displayed at or before the point.
    pub fn reply_at<A, Tz>(
        &mut self,
        api: &A,
        point: Point,
        body: &str,
        now: &DateTime<Tz>,
    ) -> Result<Option<MessageId>, YammerError>
    where
        A: YammerApi + ?Sized,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let Some(message_id) = self.message_id_at(point) else {
            info!(point, "No message at point to reply to");
            return Ok(None);
        };
        self.reply_to(api, message_id, body, now)?;
        Ok(Some(message_id))
    }

    pub fn reply_to<A, Tz>(
        &mut self,
        api: &A,
        message_id: MessageId,
        body: &str,
        now: &DateTime<Tz>,
    ) -> Result<(), YammerError>
    where
        A: YammerApi + ?Sized,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        api.post_message(body, Some(message_id))?;
        self.refresh(api, now)?;
        Ok(())
    }

    /// Deletes the message at `point`. Returns the deleted id, or `None` when no
    /// message is displayed at or before the point.
    pub fn delete_at<A, Tz>(
        &mut self,
        api: &A,
        point: Point,
        now: &DateTime<Tz>,
    ) -> Result<Option<MessageId>, YammerError>
    where
        A: YammerApi + ?Sized,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let Some(message_id) = self.message_id_at(point) else {
            info!(point, "No message at point to delete");
            return Ok(None);
        };
        self.delete(api, message_id, now)?;
        Ok(Some(message_id))
    }

    pub fn delete<A, Tz>(&mut self, api: &A, message_id: MessageId, now: &DateTime<Tz>) -> Result<(), YammerError>
    where
        A: YammerApi + ?Sized,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        api.delete_message(message_id)?;
        self.refresh(api, now)?;
        Ok(())
    }
}
