//! Harness configuration
//!
//! Loaded from TOML, with a handful of environment overrides applied on top
//! so CI can point the suite at another deployment without editing files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct E2eConfig {
    pub app: AppConfig,
    pub browser: BrowserConfig,
    /// Spawn a local WebDriver process when set
    pub driver: Option<DriverConfig>,
    pub inbox: InboxConfig,
    pub specs_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Application under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dev.nepthic.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
        }
    }
}

impl std::str::FromStr for BrowserKind {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            other => Err(E2eError::Config(format!("unsupported browser: {}", other))),
        }
    }
}

/// WebDriver session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub browser: BrowserKind,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub default_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://127.0.0.1:9515".to_string(),
            browser: BrowserKind::Chrome,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            default_timeout_ms: 10_000,
            navigation_timeout_ms: 30_000,
        }
    }
}

impl BrowserConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

/// Local WebDriver process to spawn before connecting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Path to chromedriver or geckodriver
    pub binary_path: PathBuf,

    /// Port to listen on (None = find free port)
    pub port: Option<u16>,

    pub startup_timeout_secs: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("chromedriver"),
            port: None,
            startup_timeout_secs: 30,
        }
    }
}

impl DriverConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }
}

/// Disposable-inbox viewer and polling policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InboxConfig {
    pub viewer_url: String,

    /// Substring the newest message row must contain to count as ours
    pub sender_token: String,

    pub poll_interval_ms: u64,

    /// Refreshes before giving up on the message
    pub max_attempts: u32,

    /// Wall-clock bound on the arrival poll, 0 disables it
    pub deadline_secs: u64,

    /// Name attribute of the iframe holding the message list
    pub inbox_frame: String,

    /// Name attribute of the iframe holding the opened message
    pub mail_frame: String,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            viewer_url: "https://www.yopmail.com".to_string(),
            sender_token: "NEPTHIC".to_string(),
            poll_interval_ms: 2500,
            max_attempts: 48,
            deadline_secs: 120,
            inbox_frame: "ifinbox".to_string(),
            mail_frame: "ifmail".to_string(),
        }
    }
}

impl InboxConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        (self.deadline_secs > 0).then(|| Duration::from_secs(self.deadline_secs))
    }
}

impl E2eConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> E2eResult<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `BASE_URL`, `WEBDRIVER_URL` and `NEPTHIC_HEADLESS` overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("BASE_URL").filter(|v| !v.is_empty()) {
            self.app.base_url = url;
        }
        if let Some(url) = lookup("WEBDRIVER_URL").filter(|v| !v.is_empty()) {
            self.browser.webdriver_url = url;
        }
        if let Some(flag) = lookup("NEPTHIC_HEADLESS") {
            self.browser.headless = !matches!(flag.as_str(), "0" | "false" | "no");
        }
    }

    pub fn validate(&self) -> E2eResult<()> {
        if self.app.base_url.is_empty() {
            return Err(E2eError::Config("app.base_url must not be empty".to_string()));
        }
        if self.inbox.sender_token.is_empty() {
            return Err(E2eError::Config("inbox.sender_token must not be empty".to_string()));
        }
        if self.inbox.max_attempts == 0 {
            return Err(E2eError::Config("inbox.max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Absolute URL for an application route
    pub fn app_url(&self, path: &str) -> String {
        join_url(&self.app.base_url, path)
    }
}

/// Join a base URL and a path without doubling or dropping the slash
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            browser: BrowserConfig::default(),
            driver: None,
            inbox: InboxConfig::default(),
            specs_dir: PathBuf::from("crates/e2e/specs"),
            output_dir: PathBuf::from("test-results"),
        }
    }
}
