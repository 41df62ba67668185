//! Inbox backed by the yopmail web viewer
//!
//! The viewer renders the message list and the opened message in two named
//! iframes. All knowledge of its markup lives in this file.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::browser::{Page, Target, WaitState, PROBE_INTERVAL};
use crate::code::VerificationCode;
use crate::config::InboxConfig;
use crate::error::{E2eError, E2eResult};

use super::{Inbox, MessageSummary};

pub struct YopmailInbox {
    page: Box<dyn Page>,
    config: InboxConfig,
    closed: bool,
}

impl YopmailInbox {
    pub fn new(page: Box<dyn Page>, config: InboxConfig) -> Self {
        Self {
            page,
            config,
            closed: false,
        }
    }

    fn login_field(&self) -> Target {
        Target::role("textbox").named("Login")
    }

    fn lookup_button(&self) -> Target {
        Target::css("#refreshbut button")
    }

    fn refresh_button(&self) -> Target {
        Target::css("#refresh")
    }

    fn inbox_frame(&self) -> Target {
        Target::css(format!("iframe[name=\"{}\"]", self.config.inbox_frame))
    }

    fn newest_row(&self) -> Target {
        Target::role("button").in_frame(&self.config.inbox_frame).first()
    }

    fn message_body(&self) -> Target {
        Target::css("body").in_frame(&self.config.mail_frame)
    }
}

#[async_trait]
impl Inbox for YopmailInbox {
    async fn open(&mut self, mailbox: &str) -> E2eResult<()> {
        info!("Opening inbox {} at {}", mailbox, self.config.viewer_url);
        self.page.goto(&self.config.viewer_url).await?;
        self.page.fill(&self.login_field(), mailbox).await?;
        self.page.click(&self.lookup_button()).await?;

        // Structural wait: the list frame can attach before any message exists.
        let timeout = self.page.default_timeout();
        self.page
            .wait_for(&self.inbox_frame(), WaitState::Attached, timeout)
            .await
    }

    async fn has_message(&mut self) -> E2eResult<bool> {
        self.page.is_visible(&self.newest_row()).await
    }

    async fn refresh(&mut self) -> E2eResult<()> {
        debug!("Refreshing inbox list");
        self.page.click(&self.refresh_button()).await
    }

    async fn fetch_latest_message(&mut self) -> E2eResult<MessageSummary> {
        let row = self.newest_row();
        self.page.click(&row).await?;
        let display_text = self.page.text_content(&row).await?;
        debug!("Newest message row: {:?}", display_text);
        Ok(MessageSummary::arrived(display_text.trim()))
    }

    /// The mail frame still shows the previous document right after the row
    /// is clicked, so the body is re-read until it carries a code or the
    /// page's default timeout passes. The last text read is returned either way.
    async fn read_message_body(&mut self) -> E2eResult<String> {
        let body = self.message_body();
        let timeout = self.page.default_timeout();
        let start = Instant::now();
        self.page.wait_for(&body, WaitState::Attached, timeout).await?;

        loop {
            let text = match self.page.text_content(&body).await {
                Ok(text) => text,
                Err(E2eError::ElementNotFound(_)) => String::new(),
                Err(e) => return Err(e),
            };
            if VerificationCode::extract(&text).is_some() || start.elapsed() >= timeout {
                return Ok(text);
            }
            debug!("Message body has no code yet ({} chars)", text.len());
            tokio::time::sleep(PROBE_INTERVAL).await;
        }
    }

    async fn close(&mut self) -> E2eResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.page
            .close()
            .await
            .map_err(|e| E2eError::WebDriver(format!("closing inbox page: {}", e)))
    }
}
