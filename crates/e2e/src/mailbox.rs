//! Per-mailbox serialization
//!
//! Two lookups racing on one public mailbox refresh and click over each
//! other. Holding the mailbox's lock for the whole lookup queues them instead.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default, Clone)]
pub struct MailboxLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl MailboxLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `mailbox`. Addresses compare case-insensitively.
    pub async fn acquire(&self, mailbox: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(mailbox.trim().to_ascii_lowercase())
            .or_default()
            .clone();
        lock.lock_owned().await
    }

    /// Number of mailboxes seen so far
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_mailbox_is_exclusive() {
        let locks = MailboxLocks::new();
        let guard = locks.acquire("TestUser@yopmail.com").await;

        let waiting = tokio::time::timeout(
            Duration::from_millis(50),
            locks.acquire("testuser@yopmail.com"),
        )
        .await;
        assert!(waiting.is_err(), "second lookup must wait for the first");

        drop(guard);
        let _again = locks.acquire("testuser@yopmail.com").await;
        assert_eq!(locks.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_mailboxes_do_not_block() {
        let locks = MailboxLocks::new();
        let _a = locks.acquire("a@yopmail.com").await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire("b@yopmail.com")).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }
}
