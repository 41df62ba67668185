//! Browser capability set shared by page objects, the inbox scraper and flows
//!
//! Nothing outside [`crate::webdriver`] knows which automation library sits
//! behind these traits. Elements are addressed with a [`Target`], which
//! combines a selector, an optional named frame and a pick rule.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

/// Interval between element probes while waiting for a state
pub const PROBE_INTERVAL: Duration = Duration::from_millis(100);

/// How an element is selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Css(String),
    XPath(String),
    /// ARIA role with an optional accessible name
    Role { role: String, name: Option<String> },
    /// Element whose own text contains the given string
    Text(String),
}

impl Selector {
    /// XPath equivalent for role and text selectors. CSS has none.
    pub fn to_xpath(&self) -> Option<String> {
        match self {
            Selector::Css(_) => None,
            Selector::XPath(xpath) => Some(xpath.clone()),
            Selector::Role { role, name } => Some(role_xpath(role, name.as_deref())),
            Selector::Text(text) => Some(format!(
                "//*[text()[contains(normalize-space(.), {})]]",
                xpath_literal(text)
            )),
        }
    }
}

/// Which of several matches to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pick {
    #[default]
    First,
    Last,
}

/// A selector scoped to an optional named frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TargetDef", into = "TargetDef")]
pub struct Target {
    pub selector: Selector,
    pub frame: Option<String>,
    pub pick: Pick,
}

impl Target {
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            frame: None,
            pick: Pick::First,
        }
    }

    pub fn css(css: impl Into<String>) -> Self {
        Self::new(Selector::Css(css.into()))
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self::new(Selector::XPath(xpath.into()))
    }

    pub fn role(role: impl Into<String>) -> Self {
        Self::new(Selector::Role {
            role: role.into(),
            name: None,
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Selector::Text(text.into()))
    }

    /// Set the accessible name. Only meaningful for role selectors.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        if let Selector::Role { name: slot, .. } = &mut self.selector {
            *slot = Some(name.into());
        }
        self
    }

    /// Resolve the selector inside the iframe with this `name` attribute
    pub fn in_frame(mut self, frame: impl Into<String>) -> Self {
        self.frame = Some(frame.into());
        self
    }

    pub fn first(mut self) -> Self {
        self.pick = Pick::First;
        self
    }

    pub fn last(mut self) -> Self {
        self.pick = Pick::Last;
        self
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selector {
            Selector::Css(css) => write!(f, "css={}", css)?,
            Selector::XPath(xpath) => write!(f, "xpath={}", xpath)?,
            Selector::Role { role, name: Some(name) } => write!(f, "role={}[name=\"{}\"]", role, name)?,
            Selector::Role { role, name: None } => write!(f, "role={}", role)?,
            Selector::Text(text) => write!(f, "text=\"{}\"", text)?,
        }
        if let Some(frame) = &self.frame {
            write!(f, " in frame {}", frame)?;
        }
        if self.pick == Pick::Last {
            write!(f, " (last)")?;
        }
        Ok(())
    }
}

/// Flat form of [`Target`] used in YAML specs:
/// `{ role: button, name: Verify }` or `{ css: "input[name=email]", frame: ifmail }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TargetDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    css: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    xpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    frame: Option<String>,
    #[serde(default)]
    pick: Pick,
}

impl TryFrom<TargetDef> for Target {
    type Error = String;

    fn try_from(def: TargetDef) -> Result<Self, Self::Error> {
        let selector = match (def.css, def.xpath, def.role, def.text) {
            (Some(css), None, None, None) => Selector::Css(css),
            (None, Some(xpath), None, None) => Selector::XPath(xpath),
            (None, None, Some(role), None) => Selector::Role { role, name: def.name },
            (None, None, None, Some(text)) => Selector::Text(text),
            _ => return Err("target needs exactly one of css, xpath, role or text".to_string()),
        };
        Ok(Target {
            selector,
            frame: def.frame,
            pick: def.pick,
        })
    }
}

impl From<Target> for TargetDef {
    fn from(target: Target) -> Self {
        let mut def = TargetDef {
            frame: target.frame,
            pick: target.pick,
            ..Default::default()
        };
        match target.selector {
            Selector::Css(css) => def.css = Some(css),
            Selector::XPath(xpath) => def.xpath = Some(xpath),
            Selector::Role { role, name } => {
                def.role = Some(role);
                def.name = name;
            }
            Selector::Text(text) => def.text = Some(text),
        }
        def
    }
}

/// Element state a wait can target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

/// Snapshot of an element's presence in the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementState {
    pub attached: bool,
    pub visible: bool,
}

impl ElementState {
    pub const DETACHED: ElementState = ElementState { attached: false, visible: false };

    pub fn satisfies(&self, state: WaitState) -> bool {
        match state {
            WaitState::Visible => self.attached && self.visible,
            WaitState::Hidden => !self.attached || !self.visible,
            WaitState::Attached => self.attached,
            WaitState::Detached => !self.attached,
        }
    }
}

/// One browser page (window or tab)
#[async_trait]
pub trait Page: Send + Sync {
    async fn goto(&self, url: &str) -> E2eResult<()>;

    async fn current_url(&self) -> E2eResult<String>;

    async fn title(&self) -> E2eResult<String>;

    async fn reload(&self) -> E2eResult<()>;

    async fn go_back(&self) -> E2eResult<()>;

    async fn go_forward(&self) -> E2eResult<()>;

    /// Report whether the target is attached and visible. Never errors on absence.
    async fn probe(&self, target: &Target) -> E2eResult<ElementState>;

    /// Clear the field and type `value` into it
    async fn fill(&self, target: &Target, value: &str) -> E2eResult<()>;

    async fn click(&self, target: &Target) -> E2eResult<()>;

    /// Rendered text of the target, including descendants
    async fn text_content(&self, target: &Target) -> E2eResult<String>;

    async fn input_value(&self, target: &Target) -> E2eResult<String>;

    async fn is_checked(&self, target: &Target) -> E2eResult<bool>;

    async fn is_enabled(&self, target: &Target) -> E2eResult<bool>;

    async fn evaluate(&self, script: &str) -> E2eResult<serde_json::Value>;

    /// PNG bytes of the viewport
    async fn screenshot(&self) -> E2eResult<Vec<u8>>;

    async fn set_viewport(&self, width: u32, height: u32) -> E2eResult<()>;

    async fn close(&self) -> E2eResult<()>;

    /// Timeout applied to waits that do not pass their own
    fn default_timeout(&self) -> Duration;

    async fn is_visible(&self, target: &Target) -> E2eResult<bool> {
        Ok(self.probe(target).await?.satisfies(WaitState::Visible))
    }

    /// Poll until the target reaches `state` or `timeout` elapses
    async fn wait_for(&self, target: &Target, state: WaitState, timeout: Duration) -> E2eResult<()> {
        let start = Instant::now();
        loop {
            if self.probe(target).await?.satisfies(state) {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(E2eError::Timeout(format!(
                    "{} to be {:?} after {} ms",
                    target,
                    state,
                    timeout.as_millis()
                )));
            }
            tokio::time::sleep(PROBE_INTERVAL).await;
        }
    }
}

/// A browsing context able to open pages
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn new_page(&self) -> E2eResult<Box<dyn Page>>;
}

/// Quote a string as an XPath 1.0 literal
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|part| format!("'{}'", part)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

fn role_branches(role: &str) -> Vec<String> {
    let implicit: &[&str] = match role {
        "button" => &[
            "//button",
            "//input[@type='button' or @type='submit' or @type='reset']",
        ],
        "textbox" => &[
            "//input[not(@type) or @type='text' or @type='email' or @type='tel' or @type='url' or @type='search']",
            "//textarea",
        ],
        "link" => &["//a[@href]"],
        "heading" => &["//h1", "//h2", "//h3", "//h4", "//h5", "//h6"],
        "checkbox" => &["//input[@type='checkbox']"],
        _ => &[],
    };
    let mut branches: Vec<String> = implicit.iter().map(|b| b.to_string()).collect();
    branches.push(format!("//*[@role={}]", xpath_literal(role)));
    branches
}

fn role_xpath(role: &str, name: Option<&str>) -> String {
    let predicate = name.map(|name| {
        let lit = xpath_literal(name);
        format!(
            "[contains(normalize-space(.), {lit}) or @aria-label={lit} or @title={lit} or @placeholder={lit} or @value={lit}]"
        )
    });
    role_branches(role)
        .into_iter()
        .map(|branch| match &predicate {
            Some(p) => format!("{}{}", branch, p),
            None => branch,
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
