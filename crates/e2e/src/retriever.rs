//! Verification code retrieval from a disposable inbox
//!
//! After a sign-up form is submitted, the application emails a one-time code.
//! [`VerificationCodeRetriever`] waits for that message and pulls the code out.
//!
//! A lookup ends in one of two ways:
//!
//! - `Ok(CodeResult)`. The newest message was checked: either it came from the
//!   expected sender and carried a code (`Found`), or it did not (`NotFound`,
//!   the sentinel). Callers must check for `NotFound` explicitly.
//! - `Err(E2eError)`. The viewer could not be driven, the message never
//!   arrived within the poll budget (`Timeout`), the lookup was cancelled
//!   (`Cancelled`) or a matching message had no code (`CodeNotInMessage`).

use std::future::Future;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::browser::BrowserSession;
use crate::code::{CodeResult, VerificationCode};
use crate::config::InboxConfig;
use crate::error::{E2eError, E2eResult};
use crate::inbox::{Inbox, YopmailInbox};
use crate::mailbox::MailboxLocks;

/// Bounds on the message-arrival poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&InboxConfig::default())
    }
}

impl From<&InboxConfig> for PollPolicy {
    fn from(config: &InboxConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.max_attempts.max(1),
            deadline: config.deadline(),
        }
    }
}

pub struct VerificationCodeRetriever {
    config: InboxConfig,
    policy: PollPolicy,
    cancel: CancellationToken,
    locks: MailboxLocks,
}

impl VerificationCodeRetriever {
    pub fn new(config: InboxConfig) -> Self {
        let policy = PollPolicy::from(&config);
        Self {
            config,
            policy,
            cancel: CancellationToken::new(),
            locks: MailboxLocks::new(),
        }
    }

    /// Override the poll bounds from config (tests inject small caps here)
    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Share mailbox locks with other retrievers in the same run
    pub fn with_locks(mut self, locks: MailboxLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn sender_token(&self) -> &str {
        &self.config.sender_token
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Open a viewer page in `session`, look up the code, and close the page
    /// again on every exit path.
    pub async fn retrieve_with_session(
        &self,
        session: &dyn BrowserSession,
        recipient_email: &str,
    ) -> E2eResult<CodeResult> {
        let _mailbox = self.locks.acquire(recipient_email).await;

        let page = self
            .guard("opening inbox page", session.new_page())
            .await?;
        let mut inbox = YopmailInbox::new(page, self.config.clone());
        self.retrieve_and_close(&mut inbox, recipient_email).await
    }

    /// Run [`Self::retrieve`] and then close `inbox`. A close failure is logged
    /// and does not replace the lookup outcome.
    pub async fn retrieve_and_close(
        &self,
        inbox: &mut dyn Inbox,
        recipient_email: &str,
    ) -> E2eResult<CodeResult> {
        let result = self.retrieve(inbox, recipient_email).await;
        if let Err(e) = inbox.close().await {
            warn!("Failed to close inbox for {}: {}", recipient_email, e);
        }
        result
    }

    /// Look up the newest message for `recipient_email` on an already
    /// constructed inbox. The caller owns the inbox's lifecycle.
    pub async fn retrieve(&self, inbox: &mut dyn Inbox, recipient_email: &str) -> E2eResult<CodeResult> {
        self.guard("inbox to open", inbox.open(recipient_email)).await?;
        self.wait_for_message(inbox, recipient_email).await?;

        let summary = self
            .guard("newest message to open", inbox.fetch_latest_message())
            .await?;

        if !summary.is_from(&self.config.sender_token) {
            warn!(
                "Newest message for {} is not from {}: {:?}",
                recipient_email, self.config.sender_token, summary.display_text
            );
            return Ok(CodeResult::NotFound);
        }

        let body = self
            .guard("message body", inbox.read_message_body())
            .await?;
        match VerificationCode::extract(&body) {
            Some(code) => {
                info!("Verification code received for {}", recipient_email);
                Ok(CodeResult::Found(code))
            }
            None => Err(E2eError::CodeNotInMessage {
                sender: self.config.sender_token.clone(),
            }),
        }
    }

    /// Refresh until the newest row shows up or the poll budget runs out
    async fn wait_for_message(&self, inbox: &mut dyn Inbox, recipient_email: &str) -> E2eResult<()> {
        let start = Instant::now();
        let mut attempts = 0u32;

        loop {
            if self.guard("message to arrive", inbox.has_message()).await? {
                debug!("Message visible after {} refresh(es)", attempts);
                return Ok(());
            }

            let out_of_time = self
                .policy
                .deadline
                .is_some_and(|deadline| start.elapsed() >= deadline);
            if attempts >= self.policy.max_attempts || out_of_time {
                warn!(
                    "No message for {} after {} refresh(es) in {:?}",
                    recipient_email,
                    attempts,
                    start.elapsed()
                );
                return Err(E2eError::Timeout(format!(
                    "verification email for {} ({} refreshes, {} ms)",
                    recipient_email,
                    attempts,
                    start.elapsed().as_millis()
                )));
            }

            attempts += 1;
            debug!("Inbox empty, refresh {}/{}", attempts, self.policy.max_attempts);
            self.guard("inbox refresh", inbox.refresh()).await?;
            self.guard("poll interval", async {
                tokio::time::sleep(self.policy.interval).await;
                Ok(())
            })
            .await?;
        }
    }

    /// Race `fut` against cancellation
    async fn guard<T>(&self, what: &str, fut: impl Future<Output = E2eResult<T>>) -> E2eResult<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(E2eError::Cancelled(what.to_string())),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_config() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_millis(2500));
        assert_eq!(policy.max_attempts, 48);
        assert_eq!(policy.deadline, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_policy_never_zero_attempts() {
        let config = InboxConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(PollPolicy::from(&config).max_attempts, 1);
    }
}
