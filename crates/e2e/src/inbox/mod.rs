//! Out-of-band mailbox access
//!
//! The retriever only talks to [`Inbox`]. [`YopmailInbox`] scrapes the public
//! disposable-inbox viewer. A mailbox API client can implement the same trait.

mod yopmail;

pub use yopmail::YopmailInbox;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;

/// Clickable row for one message in the inbox list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSummary {
    /// Sender and subject as rendered in the list
    pub display_text: String,
    pub arrived: bool,
}

impl MessageSummary {
    pub fn arrived(display_text: impl Into<String>) -> Self {
        Self {
            display_text: display_text.into(),
            arrived: true,
        }
    }

    pub fn is_from(&self, sender_token: &str) -> bool {
        self.display_text.contains(sender_token)
    }
}

#[async_trait]
pub trait Inbox: Send {
    /// Select `mailbox` and wait for the message list to attach
    async fn open(&mut self, mailbox: &str) -> E2eResult<()>;

    /// Whether the newest message row is visible right now
    async fn has_message(&mut self) -> E2eResult<bool>;

    /// Ask the provider to reload the message list
    async fn refresh(&mut self) -> E2eResult<()>;

    /// Open the newest message and describe its row
    async fn fetch_latest_message(&mut self) -> E2eResult<MessageSummary>;

    /// Text of the message opened by [`Inbox::fetch_latest_message`], once it
    /// has loaded
    async fn read_message_body(&mut self) -> E2eResult<String>;

    /// Release whatever the provider holds (page, connection)
    async fn close(&mut self) -> E2eResult<()>;
}
