#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use yammer_feed::libs::api::api_traits::{ApiError, YammerApi};
use yammer_feed::libs::models::{FeedEnvelope, MessageId};

pub const UNAVAILABLE: &str = "HTTP/1.1 503 Service Unavailable";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

pub fn message(id: u64, sender_id: u64, replied_to_id: Option<u64>, body: &str) -> Value {
    json!({
        "id": id,
        "sender_id": sender_id,
        "replied_to_id": replied_to_id,
        "body": { "plain": body, "parsed": body },
        "created_at": "2024/03/15 11:55:00 +0000",
        "client_type": "Web",
        "thread_id": id,
    })
}

pub fn user(id: u64, full_name: &str) -> Value {
    json!({
        "type": "user",
        "id": id,
        "full_name": full_name,
        "name": full_name.to_lowercase(),
        "mugshot_url": format!("https://example.com/mugshots/{}.png", id),
    })
}

pub fn feed_json(messages: Vec<Value>, references: Vec<Value>) -> String {
    json!({
        "messages": messages,
        "references": references,
        "meta": { "older_available": false },
    })
    .to_string()
}

pub fn feed(messages: Vec<Value>, references: Vec<Value>) -> FeedEnvelope {
    FeedEnvelope::from_json(&feed_json(messages, references)).expect("Fixture feed should parse")
}

/// Bob replying to Alice, newest first.
pub fn alice_and_bob_feed() -> FeedEnvelope {
    feed(
        vec![message(11, 2, Some(10), "hey"), message(10, 1, None, "hi")],
        vec![user(1, "Alice"), user(2, "Bob")],
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch,
    Post {
        body: String,
        replied_to_id: Option<MessageId>,
    },
    Delete(MessageId),
}

/// Scripted stand-in for the service. Each fetch takes the next queued feed; the
/// last one keeps being served. With nothing queued, fetching fails.
#[derive(Default)]
pub struct FakeApi {
    feeds: RefCell<VecDeque<FeedEnvelope>>,
    pub calls: RefCell<Vec<Call>>,
    pub post_failure: Option<String>,
    pub delete_failure: Option<String>,
}

impl FakeApi {
    pub fn serving(feeds: Vec<FeedEnvelope>) -> Self {
        Self {
            feeds: RefCell::new(feeds.into()),
            ..Self::default()
        }
    }

    pub fn stop_serving(&self) {
        self.feeds.borrow_mut().clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl YammerApi for FakeApi {
    fn fetch_feed(&self) -> Result<FeedEnvelope, ApiError> {
        self.calls.borrow_mut().push(Call::Fetch);
        let mut feeds = self.feeds.borrow_mut();
        match feeds.len() {
            0 => Err(ApiError::FetchFailed(UNAVAILABLE.to_string())),
            1 => Ok(feeds[0].clone()),
            _ => Ok(feeds.pop_front().unwrap()),
        }
    }

    fn post_message(&self, body: &str, replied_to_id: Option<MessageId>) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(Call::Post {
            body: body.to_string(),
            replied_to_id,
        });
        match &self.post_failure {
            Some(line) => Err(ApiError::PostFailed(line.clone())),
            None => Ok(()),
        }
    }

    fn delete_message(&self, message_id: MessageId) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(Call::Delete(message_id));
        match &self.delete_failure {
            Some(line) => Err(ApiError::DeleteFailed(line.clone())),
            None => Ok(()),
        }
    }
}

/// Answers a single HTTP request on a local port with `status` and `body`. Joining the
/// handle yields the raw request that was received.
pub fn serve_once(status: &str, body: &[u8]) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind local port");
    let base = format!("http://{}", listener.local_addr().unwrap());
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let body = body.to_vec();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("No request arrived");
        let request = read_request(&mut stream);
        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(&body).unwrap();
        request
    });
    (base, handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut request = String::new();
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap();
            }
        }
        let end_of_head = line == "\r\n" || line.is_empty();
        request.push_str(&line);
        if end_of_head {
            break;
        }
    }
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).unwrap();
    request.push_str(&String::from_utf8_lossy(&body));
    request
}
