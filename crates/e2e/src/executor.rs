//! Step execution against a [`Fixture`]

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::browser::{Target, WaitState, PROBE_INTERVAL};
use crate::code::{CodeResult, NOT_FOUND_SENTINEL};
use crate::config::join_url;
use crate::data::Credentials;
use crate::error::{E2eError, E2eResult};
use crate::fixture::Fixture;
use crate::spec::{TestStep, Viewport};

/// Result of executing a test step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot_path: Option<PathBuf>,
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static pattern"))
}

/// Runs the steps of one spec, carrying variables between them
pub struct StepExecutor<'a> {
    fixture: &'a Fixture,
    screenshot_dir: PathBuf,
    vars: HashMap<String, String>,
}

impl<'a> StepExecutor<'a> {
    pub fn new(fixture: &'a Fixture, spec_vars: &BTreeMap<String, String>, screenshot_dir: &Path) -> Self {
        let mut vars: HashMap<String, String> = spec_vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        vars.entry("base_url".to_string())
            .or_insert_with(|| fixture.config().app.base_url.clone());

        // Fresh identity per run; spec vars of the same name win.
        let fresh = Credentials::unique("nepthic-e2e");
        vars.entry("unique_email".to_string()).or_insert(fresh.email);
        vars.entry("unique_username".to_string()).or_insert(fresh.username);
        vars.entry("unique_phone".to_string()).or_insert(fresh.phone);

        Self {
            fixture,
            screenshot_dir: screenshot_dir.to_path_buf(),
            vars,
        }
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Replace every `${name}` in `input`. Unknown names are an error.
    pub fn interpolate(&self, input: &str) -> E2eResult<String> {
        let mut missing = None;
        let output = placeholder_re().replace_all(input, |caps: &regex::Captures| {
            match self.vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => {
                    missing.get_or_insert_with(|| caps[1].to_string());
                    String::new()
                }
            }
        });
        match missing {
            Some(name) => Err(E2eError::StepFailed {
                step: "interpolate".to_string(),
                reason: format!("unknown variable ${{{}}}", name),
            }),
            None => Ok(output.into_owned()),
        }
    }

    /// Resize the window before the first step. Reported like a step.
    pub async fn apply_viewport(&self, viewport: Viewport) -> StepResult {
        let start = Instant::now();
        let step_name = format!("viewport:{}x{}", viewport.width, viewport.height);
        let result = self
            .fixture
            .page()
            .set_viewport(viewport.width, viewport.height)
            .await;
        StepResult {
            success: result.is_ok(),
            step_name,
            duration_ms: start.elapsed().as_millis() as u64,
            error: result.err().map(|e| e.to_string()),
            screenshot_path: None,
        }
    }

    /// Execute a single test step. Step failures are reported in the result.
    pub async fn execute_step(&mut self, step: &TestStep) -> StepResult {
        let start = Instant::now();
        let step_name = step.name();

        debug!("Executing step: {}", step_name);

        let result = self.run_step(step, &step_name).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(screenshot_path) => StepResult {
                success: true,
                step_name,
                duration_ms,
                error: None,
                screenshot_path,
            },
            Err(e) => StepResult {
                success: false,
                step_name,
                duration_ms,
                error: Some(e.to_string()),
                screenshot_path: None,
            },
        }
    }

    async fn run_step(&mut self, step: &TestStep, step_name: &str) -> E2eResult<Option<PathBuf>> {
        let fixture = self.fixture;
        let page = fixture.page();
        match step {
            TestStep::Navigate { url, wait_for } => {
                let url = join_url(&fixture.config().app.base_url, &self.interpolate(url)?);
                page.goto(&url).await?;
                if let Some(target) = wait_for {
                    page.wait_for(target, WaitState::Visible, page.default_timeout()).await?;
                }
                Ok(None)
            }
            TestStep::Click { target } => {
                page.click(target).await?;
                Ok(None)
            }
            TestStep::Fill { target, value } => {
                page.fill(target, &self.interpolate(value)?).await?;
                Ok(None)
            }
            TestStep::Wait { target, timeout_ms, state } => {
                page.wait_for(target, *state, Duration::from_millis(*timeout_ms)).await?;
                Ok(None)
            }
            TestStep::Sleep { ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(None)
            }
            TestStep::Assert { target, visible, text, text_contains, value, checked, enabled } => {
                self.execute_assert(
                    target,
                    *visible,
                    text.as_deref(),
                    text_contains.as_deref(),
                    value.as_deref(),
                    *checked,
                    *enabled,
                )
                .await?;
                Ok(None)
            }
            TestStep::AssertUrl { contains, matches, timeout_ms } => {
                self.execute_assert_url(contains.as_deref(), matches.as_deref(), *timeout_ms)
                    .await?;
                Ok(None)
            }
            TestStep::Screenshot { name } => self.execute_screenshot(name).await.map(Some),
            TestStep::RetrieveVerificationCode { email, store_as } => {
                let email = self.interpolate(email)?;
                match fixture.verification_code(&email).await? {
                    CodeResult::Found(code) => {
                        info!("Stored verification code for {} as ${{{}}}", email, store_as);
                        self.vars.insert(store_as.clone(), code.to_string());
                        Ok(None)
                    }
                    CodeResult::NotFound => Err(E2eError::StepFailed {
                        step: step_name.to_string(),
                        reason: NOT_FOUND_SENTINEL.to_string(),
                    }),
                }
            }
            TestStep::Log { message } => {
                info!("[TEST LOG] {}", self.interpolate(message)?);
                Ok(None)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute_assert(
        &self,
        target: &Target,
        visible: Option<bool>,
        text: Option<&str>,
        text_contains: Option<&str>,
        value: Option<&str>,
        checked: Option<bool>,
        enabled: Option<bool>,
    ) -> E2eResult<()> {
        let page = self.fixture.page();

        if let Some(expected) = visible {
            let state = if expected { WaitState::Visible } else { WaitState::Hidden };
            match page.wait_for(target, state, page.default_timeout()).await {
                Ok(()) => {}
                Err(e) if e.is_timeout() => {
                    return Err(E2eError::AssertionFailed(format!(
                        "{} expected visible={}",
                        target, expected
                    )))
                }
                Err(e) => return Err(e),
            }
        }

        if text.is_some() || text_contains.is_some() {
            let actual = page.text_content(target).await?;
            let actual = actual.trim();
            if let Some(expected) = text {
                let expected = self.interpolate(expected)?;
                if actual != expected {
                    return Err(E2eError::AssertionFailed(format!(
                        "{} text was {:?}, expected {:?}",
                        target, actual, expected
                    )));
                }
            }
            if let Some(fragment) = text_contains {
                let fragment = self.interpolate(fragment)?;
                if !actual.contains(&fragment) {
                    return Err(E2eError::AssertionFailed(format!(
                        "{} text {:?} does not contain {:?}",
                        target, actual, fragment
                    )));
                }
            }
        }

        if let Some(expected) = value {
            let expected = self.interpolate(expected)?;
            let actual = page.input_value(target).await?;
            if actual != expected {
                return Err(E2eError::AssertionFailed(format!(
                    "{} value was {:?}, expected {:?}",
                    target, actual, expected
                )));
            }
        }

        if let Some(expected) = checked {
            let actual = page.is_checked(target).await?;
            if actual != expected {
                return Err(E2eError::AssertionFailed(format!(
                    "{} checked={}, expected {}",
                    target, actual, expected
                )));
            }
        }

        if let Some(expected) = enabled {
            let actual = page.is_enabled(target).await?;
            if actual != expected {
                return Err(E2eError::AssertionFailed(format!(
                    "{} enabled={}, expected {}",
                    target, actual, expected
                )));
            }
        }

        Ok(())
    }

    async fn execute_assert_url(
        &self,
        contains: Option<&str>,
        matches: Option<&str>,
        timeout_ms: u64,
    ) -> E2eResult<()> {
        let contains = contains.map(|c| self.interpolate(c)).transpose()?;
        let re = matches.map(|m| Regex::new(&self.interpolate(m)?).map_err(E2eError::from)).transpose()?;

        let page = self.fixture.page();
        let timeout = Duration::from_millis(timeout_ms);
        let start = Instant::now();
        loop {
            let url = page.current_url().await?;
            let contains_ok = contains.as_deref().map_or(true, |c| url.contains(c));
            let matches_ok = re.as_ref().map_or(true, |re| re.is_match(&url));
            if contains_ok && matches_ok {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(E2eError::AssertionFailed(format!(
                    "URL {} did not satisfy contains={:?} matches={:?}",
                    url,
                    contains,
                    re.as_ref().map(|re| re.as_str())
                )));
            }
            tokio::time::sleep(PROBE_INTERVAL).await;
        }
    }

    async fn execute_screenshot(&self, name: &str) -> E2eResult<PathBuf> {
        let name = self.interpolate(name)?;
        let png = self.fixture.page().screenshot().await?;
        std::fs::create_dir_all(&self.screenshot_dir)?;
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
        let path = self.screenshot_dir.join(format!("{}-{}.png", name, stamp));
        std::fs::write(&path, png)?;
        debug!("Screenshot saved to {}", path.display());
        Ok(path)
    }
}
