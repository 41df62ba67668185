//! In-memory browser and inbox fakes shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use nepthic_e2e::browser::{BrowserSession, ElementState, Page, Target};
use nepthic_e2e::config::InboxConfig;
use nepthic_e2e::inbox::{Inbox, MessageSummary};
use nepthic_e2e::retriever::PollPolicy;
use nepthic_e2e::{E2eError, E2eResult};

/// Poll bounds small enough for tests
pub fn fast_policy(max_attempts: u32) -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(1),
        max_attempts,
        deadline: None,
    }
}

/// Key under which a fake page stores an element
pub fn key(target: &Target) -> String {
    target.to_string()
}

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub visible: bool,
    pub text: String,
    pub value: String,
    pub checked: bool,
    /// Reads of `text` that come back empty before the text shows up
    pub blank_reads: usize,
}

impl FakeElement {
    pub fn visible() -> Self {
        Self {
            visible: true,
            ..Default::default()
        }
    }

    pub fn attached() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn blank_for(mut self, reads: usize) -> Self {
        self.blank_reads = reads;
        self
    }
}

/// Elements that appear once a target has been clicked `after_clicks` times
#[derive(Debug, Clone)]
pub struct Reveal {
    pub after_clicks: usize,
    pub elements: Vec<(String, FakeElement)>,
    pub url: Option<String>,
}

#[derive(Debug, Default)]
pub struct DomState {
    pub url: String,
    pub elements: HashMap<String, FakeElement>,
    pub reveals: HashMap<String, Vec<Reveal>>,
    pub clicks: HashMap<String, usize>,
    pub actions: Vec<String>,
    pub screenshots: usize,
    pub closed: bool,
}

impl DomState {
    pub fn insert(&mut self, target: &Target, element: FakeElement) {
        self.elements.insert(key(target), element);
    }

    pub fn on_click(&mut self, target: &Target, reveal: Reveal) {
        self.reveals.entry(key(target)).or_default().push(reveal);
    }

    pub fn clicks_on(&self, target: &Target) -> usize {
        self.clicks.get(&key(target)).copied().unwrap_or(0)
    }
}

/// Open and close events of the pages a session handed out
pub type Journal = Arc<Mutex<Vec<String>>>;

/// A page whose document is a map from target to element state
#[derive(Clone)]
pub struct FakePage {
    pub state: Arc<Mutex<DomState>>,
    pub timeout: Duration,
    journal: Option<(usize, Journal)>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::with_state(DomState::default())
    }

    pub fn with_state(state: DomState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            timeout: Duration::from_millis(300),
            journal: None,
        }
    }

    pub fn edit(&self, f: impl FnOnce(&mut DomState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    pub fn actions(&self) -> Vec<String> {
        self.state.lock().unwrap().actions.clone()
    }

    fn visible_element(&self, target: &Target) -> E2eResult<FakeElement> {
        let state = self.state.lock().unwrap();
        match state.elements.get(&key(target)) {
            Some(element) if element.visible => Ok(element.clone()),
            _ => Err(E2eError::ElementNotFound(target.to_string())),
        }
    }

    fn attached_element(&self, target: &Target) -> E2eResult<FakeElement> {
        let state = self.state.lock().unwrap();
        state
            .elements
            .get(&key(target))
            .cloned()
            .ok_or_else(|| E2eError::ElementNotFound(target.to_string()))
    }
}

#[async_trait]
impl Page for FakePage {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        state.url = url.to_string();
        state.actions.push(format!("goto:{}", url));
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn title(&self) -> E2eResult<String> {
        Ok("NEPTHIC".to_string())
    }

    async fn reload(&self) -> E2eResult<()> {
        Ok(())
    }

    async fn go_back(&self) -> E2eResult<()> {
        Ok(())
    }

    async fn go_forward(&self) -> E2eResult<()> {
        Ok(())
    }

    async fn probe(&self, target: &Target) -> E2eResult<ElementState> {
        let state = self.state.lock().unwrap();
        Ok(match state.elements.get(&key(target)) {
            Some(element) => ElementState {
                attached: true,
                visible: element.visible,
            },
            None => ElementState::DETACHED,
        })
    }

    async fn fill(&self, target: &Target, value: &str) -> E2eResult<()> {
        self.visible_element(target)?;
        let mut state = self.state.lock().unwrap();
        if let Some(element) = state.elements.get_mut(&key(target)) {
            element.value = value.to_string();
        }
        state.actions.push(format!("fill:{}={}", target, value));
        Ok(())
    }

    async fn click(&self, target: &Target) -> E2eResult<()> {
        self.visible_element(target)?;
        let mut state = self.state.lock().unwrap();
        let k = key(target);
        state.actions.push(format!("click:{}", target));

        let count = {
            let count = state.clicks.entry(k.clone()).or_insert(0);
            *count += 1;
            *count
        };
        if let Some(element) = state.elements.get_mut(&k) {
            element.checked = !element.checked;
        }

        let fired: Vec<Reveal> = state
            .reveals
            .get(&k)
            .map(|rules| rules.iter().filter(|r| r.after_clicks == count).cloned().collect())
            .unwrap_or_default();
        for reveal in fired {
            for (name, element) in reveal.elements {
                state.elements.insert(name, element);
            }
            if let Some(url) = reveal.url {
                state.url = url;
            }
        }
        Ok(())
    }

    async fn text_content(&self, target: &Target) -> E2eResult<String> {
        let mut state = self.state.lock().unwrap();
        let element = state
            .elements
            .get_mut(&key(target))
            .ok_or_else(|| E2eError::ElementNotFound(target.to_string()))?;
        if element.blank_reads > 0 {
            element.blank_reads -= 1;
            return Ok(String::new());
        }
        Ok(element.text.clone())
    }

    async fn input_value(&self, target: &Target) -> E2eResult<String> {
        Ok(self.attached_element(target)?.value)
    }

    async fn is_checked(&self, target: &Target) -> E2eResult<bool> {
        Ok(self.attached_element(target)?.checked)
    }

    async fn is_enabled(&self, target: &Target) -> E2eResult<bool> {
        self.attached_element(target).map(|_| true)
    }

    async fn evaluate(&self, _script: &str) -> E2eResult<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        self.state.lock().unwrap().screenshots += 1;
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn set_viewport(&self, width: u32, height: u32) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        state.actions.push(format!("viewport:{}x{}", width, height));
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        self.state.lock().unwrap().closed = true;
        if let Some((id, journal)) = &self.journal {
            journal.lock().unwrap().push(format!("close:{}", id));
        }
        Ok(())
    }

    fn default_timeout(&self) -> Duration {
        self.timeout
    }
}

/// How the fake mail viewer behaves once a mailbox is looked up
#[derive(Debug, Clone)]
pub struct ViewerScript {
    /// Refreshes before the newest row shows up, `None` for never
    pub deliver_after: Option<usize>,
    pub row_text: String,
    pub body: String,
    /// Reads of the opened body that come back empty
    pub blank_body_reads: usize,
    /// Row and body of an older message listed below the newest one
    pub older: Option<(String, String)>,
}

impl ViewerScript {
    pub fn delivered(row_text: &str, body: &str) -> Self {
        Self {
            deliver_after: Some(0),
            row_text: row_text.to_string(),
            body: body.to_string(),
            blank_body_reads: 0,
            older: None,
        }
    }

    pub fn body_blank_for(mut self, reads: usize) -> Self {
        self.blank_body_reads = reads;
        self
    }

    pub fn with_older(mut self, row_text: &str, body: &str) -> Self {
        self.older = Some((row_text.to_string(), body.to_string()));
        self
    }

    pub fn after_refreshes(mut self, refreshes: usize) -> Self {
        self.deliver_after = Some(refreshes);
        self
    }

    pub fn never() -> Self {
        Self {
            deliver_after: None,
            row_text: String::new(),
            body: String::new(),
            blank_body_reads: 0,
            older: None,
        }
    }
}

pub fn login_field() -> Target {
    Target::role("textbox").named("Login")
}

pub fn lookup_button() -> Target {
    Target::css("#refreshbut button")
}

pub fn refresh_button() -> Target {
    Target::css("#refresh")
}

pub fn newest_row(config: &InboxConfig) -> Target {
    Target::role("button").in_frame(&config.inbox_frame).first()
}

pub fn message_body(config: &InboxConfig) -> Target {
    Target::css("body").in_frame(&config.mail_frame)
}

/// A page laid out like the disposable-inbox viewer. The mail frame is
/// attached but blank until a row is opened.
pub fn viewer_page(config: &InboxConfig, script: &ViewerScript) -> FakePage {
    let mut state = DomState::default();
    state.insert(&login_field(), FakeElement::visible());
    state.insert(&lookup_button(), FakeElement::visible());
    state.insert(&refresh_button(), FakeElement::visible());
    state.insert(&message_body(config), FakeElement::attached());

    let newest = newest_row(config);
    let older = newest.clone().last();
    let mut rows = vec![(key(&newest), FakeElement::visible().with_text(&script.row_text))];
    state.on_click(
        &newest,
        Reveal {
            after_clicks: 1,
            elements: vec![(
                key(&message_body(config)),
                FakeElement::attached()
                    .with_text(&script.body)
                    .blank_for(script.blank_body_reads),
            )],
            url: None,
        },
    );
    if let Some((row_text, body)) = &script.older {
        rows.push((key(&older), FakeElement::visible().with_text(row_text)));
        state.on_click(
            &older,
            Reveal {
                after_clicks: 1,
                elements: vec![(key(&message_body(config)), FakeElement::attached().with_text(body))],
                url: None,
            },
        );
    }

    let frame = (
        key(&Target::css(format!("iframe[name=\"{}\"]", config.inbox_frame))),
        FakeElement::attached(),
    );
    let mut on_lookup = vec![frame];
    match script.deliver_after {
        Some(0) => on_lookup.extend(rows),
        Some(n) => state.on_click(
            &refresh_button(),
            Reveal {
                after_clicks: n,
                elements: rows,
                url: None,
            },
        ),
        None => {}
    }
    state.on_click(
        &lookup_button(),
        Reveal {
            after_clicks: 1,
            elements: on_lookup,
            url: None,
        },
    );

    let mut page = FakePage::with_state(state);
    page.timeout = Duration::from_secs(1);
    page
}

/// Session that hands out viewer pages and remembers them
#[derive(Clone)]
pub struct FakeSession {
    pub config: InboxConfig,
    pub script: ViewerScript,
    pub opened: Arc<Mutex<Vec<FakePage>>>,
    pub journal: Journal,
}

impl FakeSession {
    pub fn new(config: InboxConfig, script: ViewerScript) -> Self {
        Self {
            config,
            script,
            opened: Arc::new(Mutex::new(Vec::new())),
            journal: Journal::default(),
        }
    }

    pub fn pages(&self) -> Vec<FakePage> {
        self.opened.lock().unwrap().clone()
    }

    /// `open:<n>` / `close:<n>` in the order they happened
    pub fn events(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn new_page(&self) -> E2eResult<Box<dyn Page>> {
        let mut page = viewer_page(&self.config, &self.script);
        let mut opened = self.opened.lock().unwrap();
        let id = opened.len();
        page.journal = Some((id, Arc::clone(&self.journal)));
        self.journal.lock().unwrap().push(format!("open:{}", id));
        opened.push(page.clone());
        Ok(Box::new(page))
    }
}

/// One message as the scripted inbox shows it, newest first
#[derive(Debug, Clone)]
pub struct Message {
    pub row: String,
    pub body: String,
}

impl Message {
    pub fn new(row: &str, body: &str) -> Self {
        Self {
            row: row.to_string(),
            body: body.to_string(),
        }
    }
}

/// Inbox driven by a script instead of a browser
#[derive(Debug, Default)]
pub struct ScriptedInbox {
    pub messages: Vec<Message>,
    /// Refreshes before `messages` become visible, `None` for never
    pub deliver_after: Option<usize>,
    pub fail_open: bool,
    pub opened_mailbox: Option<String>,
    pub refreshes: usize,
    pub opened_message: Option<usize>,
    pub close_calls: usize,
}

impl ScriptedInbox {
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            deliver_after: Some(0),
            ..Default::default()
        }
    }

    pub fn empty_forever() -> Self {
        Self::default()
    }

    fn delivered(&self) -> bool {
        matches!(self.deliver_after, Some(n) if self.refreshes >= n) && !self.messages.is_empty()
    }
}

#[async_trait]
impl Inbox for ScriptedInbox {
    async fn open(&mut self, mailbox: &str) -> E2eResult<()> {
        if self.fail_open {
            return Err(E2eError::Timeout("inbox frame".to_string()));
        }
        self.opened_mailbox = Some(mailbox.to_string());
        Ok(())
    }

    async fn has_message(&mut self) -> E2eResult<bool> {
        Ok(self.delivered())
    }

    async fn refresh(&mut self) -> E2eResult<()> {
        self.refreshes += 1;
        Ok(())
    }

    async fn fetch_latest_message(&mut self) -> E2eResult<MessageSummary> {
        let newest = self
            .messages
            .first()
            .ok_or_else(|| E2eError::ElementNotFound("newest row".to_string()))?;
        self.opened_message = Some(0);
        Ok(MessageSummary::arrived(newest.row.clone()))
    }

    async fn read_message_body(&mut self) -> E2eResult<String> {
        let index = self
            .opened_message
            .ok_or_else(|| E2eError::ElementNotFound("opened message".to_string()))?;
        Ok(self.messages[index].body.clone())
    }

    async fn close(&mut self) -> E2eResult<()> {
        self.close_calls += 1;
        Ok(())
    }
}
