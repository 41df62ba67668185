//! WebDriver backend for [`BrowserSession`] and [`Page`]
//!
//! Each page is one browser window. Window and frame focus are global to a
//! WebDriver session, so every command switches to its window and frame
//! under a session-wide lock.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::wd::{Capabilities, TimeoutConfiguration, WindowHandle};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::browser::{BrowserSession, ElementState, Page, Pick, Selector, Target, WaitState};
use crate::config::{BrowserConfig, BrowserKind};
use crate::error::{E2eError, E2eResult};

/// A connected WebDriver session
#[derive(Clone)]
pub struct WebDriverSession {
    client: Client,
    lock: Arc<Mutex<()>>,
    default_timeout: Duration,
}

impl WebDriverSession {
    /// Open a new browser session on the WebDriver server named in `config`
    pub async fn connect(config: &BrowserConfig) -> E2eResult<Self> {
        info!(
            "Connecting to WebDriver at {} ({}, headless: {})",
            config.webdriver_url,
            config.browser.as_str(),
            config.headless
        );

        let client = ClientBuilder::native()
            .capabilities(capabilities(config))
            .connect(&config.webdriver_url)
            .await?;

        client
            .update_timeouts(TimeoutConfiguration::new(
                None,
                Some(config.navigation_timeout()),
                None,
            ))
            .await?;
        client
            .set_window_size(config.viewport_width, config.viewport_height)
            .await?;

        Ok(Self {
            client,
            lock: Arc::new(Mutex::new(())),
            default_timeout: config.default_timeout(),
        })
    }

    /// The window the session started with
    pub async fn main_page(&self) -> E2eResult<WebDriverPage> {
        let _guard = self.lock.lock().await;
        let handle = self.client.window().await?;
        Ok(self.page_for(handle))
    }

    /// End the browser session
    pub async fn quit(self) -> E2eResult<()> {
        info!("Closing WebDriver session");
        self.client.close().await?;
        Ok(())
    }

    fn page_for(&self, handle: WindowHandle) -> WebDriverPage {
        WebDriverPage {
            client: self.client.clone(),
            handle,
            lock: Arc::clone(&self.lock),
            default_timeout: self.default_timeout,
        }
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn new_page(&self) -> E2eResult<Box<dyn Page>> {
        let _guard = self.lock.lock().await;
        let window = self.client.new_window(true).await?;
        debug!("Opened new window");
        Ok(Box::new(self.page_for(window.handle)))
    }
}

/// Build the capabilities object for the configured browser
pub fn capabilities(config: &BrowserConfig) -> Capabilities {
    let mut caps = Capabilities::new();
    match config.browser {
        BrowserKind::Chrome => {
            let mut args = vec![format!(
                "--window-size={},{}",
                config.viewport_width, config.viewport_height
            )];
            if config.headless {
                args.push("--headless=new".to_string());
                args.push("--disable-gpu".to_string());
            }
            caps.insert("browserName".to_string(), json!("chrome"));
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        BrowserKind::Firefox => {
            let args: Vec<&str> = if config.headless { vec!["-headless"] } else { vec![] };
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
    }
    caps
}

/// One window of a [`WebDriverSession`]
pub struct WebDriverPage {
    client: Client,
    handle: WindowHandle,
    lock: Arc<Mutex<()>>,
    default_timeout: Duration,
}

impl WebDriverPage {
    /// Focus this window and the target's frame. Returns false when the
    /// frame is not in the document.
    async fn focus(&self, frame: Option<&str>) -> E2eResult<bool> {
        self.client.switch_to_window(self.handle.clone()).await?;
        self.client.enter_frame(None).await?;
        if let Some(name) = frame {
            let css = format!("iframe[name=\"{}\"], frame[name=\"{}\"]", name, name);
            let frames = self.client.find_all(Locator::Css(&css)).await?;
            match frames.into_iter().next() {
                Some(frame) => frame.enter_frame().await?,
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    async fn find(&self, target: &Target) -> E2eResult<Option<Element>> {
        if !self.focus(target.frame.as_deref()).await? {
            return Ok(None);
        }
        let mut elements = match &target.selector {
            Selector::Css(css) => self.client.find_all(Locator::Css(css)).await?,
            other => {
                let xpath = other.to_xpath().unwrap_or_default();
                self.client.find_all(Locator::XPath(&xpath)).await?
            }
        };
        Ok(match target.pick {
            Pick::First if !elements.is_empty() => Some(elements.swap_remove(0)),
            Pick::Last => elements.pop(),
            _ => None,
        })
    }

    async fn require(&self, target: &Target) -> E2eResult<Element> {
        self.find(target)
            .await?
            .ok_or_else(|| E2eError::ElementNotFound(target.to_string()))
    }

    /// Wait for the target to be visible, then return it with the lock held
    async fn actionable(&self, target: &Target) -> E2eResult<(tokio::sync::MutexGuard<'_, ()>, Element)> {
        self.wait_for(target, WaitState::Visible, self.default_timeout).await?;
        let guard = self.lock.lock().await;
        let element = self.require(target).await?;
        Ok((guard, element))
    }
}

#[async_trait]
impl Page for WebDriverPage {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let _guard = self.lock.lock().await;
        self.focus(None).await?;
        self.client.goto(url).await?;
        debug!("Navigated to: {}", url);
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        let _guard = self.lock.lock().await;
        self.focus(None).await?;
        Ok(self.client.current_url().await?.to_string())
    }

    async fn title(&self) -> E2eResult<String> {
        let _guard = self.lock.lock().await;
        self.focus(None).await?;
        Ok(self.client.title().await?)
    }

    async fn reload(&self) -> E2eResult<()> {
        let _guard = self.lock.lock().await;
        self.focus(None).await?;
        Ok(self.client.refresh().await?)
    }

    async fn go_back(&self) -> E2eResult<()> {
        let _guard = self.lock.lock().await;
        self.focus(None).await?;
        Ok(self.client.back().await?)
    }

    async fn go_forward(&self) -> E2eResult<()> {
        let _guard = self.lock.lock().await;
        self.focus(None).await?;
        Ok(self.client.forward().await?)
    }

    async fn probe(&self, target: &Target) -> E2eResult<ElementState> {
        let _guard = self.lock.lock().await;
        match self.find(target).await? {
            // A node can go stale between lookup and query; count it as hidden.
            Some(element) => Ok(ElementState {
                attached: true,
                visible: element.is_displayed().await.unwrap_or(false),
            }),
            None => Ok(ElementState::DETACHED),
        }
    }

    async fn fill(&self, target: &Target, value: &str) -> E2eResult<()> {
        let (_guard, element) = self.actionable(target).await?;
        element.clear().await?;
        element.send_keys(value).await?;
        Ok(())
    }

    async fn click(&self, target: &Target) -> E2eResult<()> {
        let (_guard, element) = self.actionable(target).await?;
        element.click().await?;
        Ok(())
    }

    async fn text_content(&self, target: &Target) -> E2eResult<String> {
        let _guard = self.lock.lock().await;
        let element = self.require(target).await?;
        Ok(element.text().await?)
    }

    async fn input_value(&self, target: &Target) -> E2eResult<String> {
        let _guard = self.lock.lock().await;
        let element = self.require(target).await?;
        Ok(element.prop("value").await?.unwrap_or_default())
    }

    async fn is_checked(&self, target: &Target) -> E2eResult<bool> {
        let _guard = self.lock.lock().await;
        let element = self.require(target).await?;
        Ok(element.is_selected().await?)
    }

    async fn is_enabled(&self, target: &Target) -> E2eResult<bool> {
        let _guard = self.lock.lock().await;
        let element = self.require(target).await?;
        Ok(element.is_enabled().await?)
    }

    async fn evaluate(&self, script: &str) -> E2eResult<serde_json::Value> {
        let _guard = self.lock.lock().await;
        self.focus(None).await?;
        Ok(self.client.execute(script, vec![]).await?)
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        let _guard = self.lock.lock().await;
        self.focus(None).await?;
        Ok(self.client.screenshot().await?)
    }

    async fn set_viewport(&self, width: u32, height: u32) -> E2eResult<()> {
        let _guard = self.lock.lock().await;
        self.focus(None).await?;
        self.client.set_window_size(width, height).await?;
        debug!("Resized window to {}x{}", width, height);
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        let _guard = self.lock.lock().await;
        self.client.switch_to_window(self.handle.clone()).await?;
        self.client.close_window().await?;
        debug!("Closed window");
        Ok(())
    }

    fn default_timeout(&self) -> Duration {
        self.default_timeout
    }
}
