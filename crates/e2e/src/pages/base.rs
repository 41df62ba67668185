use std::sync::Arc;
use std::time::{Duration, Instant};

use regex::Regex;

use crate::browser::{Page, Target, WaitState, PROBE_INTERVAL};
use crate::config::join_url;
use crate::error::{E2eError, E2eResult};

/// Behaviour shared by every page object
#[derive(Clone)]
pub struct BasePage {
    page: Arc<dyn Page>,
    base_url: String,
}

impl BasePage {
    pub fn new(page: Arc<dyn Page>, base_url: impl Into<String>) -> Self {
        Self {
            page,
            base_url: base_url.into(),
        }
    }

    pub fn page(&self) -> &dyn Page {
        self.page.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Navigate to a path under the base URL
    pub async fn goto(&self, path: &str) -> E2eResult<()> {
        self.page.goto(&join_url(&self.base_url, path)).await
    }

    pub async fn title(&self) -> E2eResult<String> {
        self.page.title().await
    }

    pub async fn current_url(&self) -> E2eResult<String> {
        self.page.current_url().await
    }

    /// Poll the URL until it matches `pattern`
    pub async fn wait_for_url(&self, pattern: &str) -> E2eResult<String> {
        let re = Regex::new(pattern)?;
        let timeout = self.page.default_timeout();
        let start = Instant::now();
        loop {
            let url = self.page.current_url().await?;
            if re.is_match(&url) {
                return Ok(url);
            }
            if start.elapsed() >= timeout {
                return Err(E2eError::Timeout(format!(
                    "URL matching /{}/ (last seen {})",
                    pattern, url
                )));
            }
            tokio::time::sleep(PROBE_INTERVAL).await;
        }
    }

    pub async fn reload(&self) -> E2eResult<()> {
        self.page.reload().await
    }

    pub async fn go_back(&self) -> E2eResult<()> {
        self.page.go_back().await
    }

    pub async fn go_forward(&self) -> E2eResult<()> {
        self.page.go_forward().await
    }

    pub async fn wait(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    pub async fn evaluate(&self, script: &str) -> E2eResult<serde_json::Value> {
        self.page.evaluate(script).await
    }

    pub async fn click(&self, target: &Target) -> E2eResult<()> {
        self.page.click(target).await
    }

    pub async fn fill(&self, target: &Target, value: &str) -> E2eResult<()> {
        self.page.fill(target, value).await
    }

    pub async fn is_visible(&self, target: &Target) -> E2eResult<bool> {
        self.page.is_visible(target).await
    }

    /// Whether every target is visible right now
    pub async fn all_visible(&self, targets: &[&Target]) -> E2eResult<bool> {
        for target in targets {
            if !self.page.is_visible(target).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Wait up to `timeout` for the target to become visible. A timeout is
    /// reported as `false`, anything else as an error.
    pub async fn appears(&self, target: &Target, timeout: Duration) -> E2eResult<bool> {
        match self.page.wait_for(target, WaitState::Visible, timeout).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_timeout() => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn text_of(&self, target: &Target) -> E2eResult<String> {
        Ok(self.page.text_content(target).await?.trim().to_string())
    }

    pub async fn value_of(&self, target: &Target) -> E2eResult<String> {
        self.page.input_value(target).await
    }

    /// Close the notification toast the storefront shows after saves
    pub async fn close_toast(&self) -> E2eResult<()> {
        self.page.click(&Target::role("button").named("Close toast")).await
    }
}
