//! Declarative YAML test specification

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::browser::{Target, WaitState};
use crate::error::{E2eError, E2eResult};

/// A complete test specification parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSpec {
    /// Unique name for this test
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering tests
    #[serde(default)]
    pub tags: Vec<String>,

    /// Values available to `${name}` placeholders in step fields
    #[serde(default)]
    pub vars: BTreeMap<String, String>,

    /// Window size to apply before the first step, if not the configured one
    #[serde(default)]
    pub viewport: Option<Viewport>,

    /// Steps to execute in order
    pub steps: Vec<TestStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// A single step in a test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Navigate to a URL (relative to base)
    Navigate {
        url: String,
        #[serde(default)]
        wait_for: Option<Target>,
    },

    /// Click an element
    Click {
        target: Target,
    },

    /// Fill an input field
    Fill {
        target: Target,
        value: String,
    },

    /// Wait for an element to reach a state
    Wait {
        target: Target,
        #[serde(default = "default_wait_timeout")]
        timeout_ms: u64,
        #[serde(default)]
        state: WaitState,
    },

    /// Wait for a fixed amount of time (use sparingly)
    Sleep {
        ms: u64,
    },

    /// Assert something about an element
    Assert {
        target: Target,
        #[serde(default)]
        visible: Option<bool>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        text_contains: Option<String>,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        checked: Option<bool>,
        #[serde(default)]
        enabled: Option<bool>,
    },

    /// Wait for the current URL to contain a fragment or match a pattern
    AssertUrl {
        #[serde(default)]
        contains: Option<String>,
        #[serde(default)]
        matches: Option<String>,
        #[serde(default = "default_wait_timeout")]
        timeout_ms: u64,
    },

    /// Take a screenshot
    Screenshot {
        name: String,
    },

    /// Look up the emailed verification code and store it as a variable
    RetrieveVerificationCode {
        email: String,
        #[serde(default = "default_code_var")]
        store_as: String,
    },

    /// Log a message (for debugging)
    Log {
        message: String,
    },
}

fn default_wait_timeout() -> u64 {
    5000 // 5 seconds default
}

fn default_code_var() -> String {
    "verification_code".to_string()
}

impl TestStep {
    /// Short label used in logs and reports
    pub fn name(&self) -> String {
        match self {
            TestStep::Navigate { url, .. } => format!("navigate:{}", url),
            TestStep::Click { target } => format!("click:{}", target),
            TestStep::Fill { target, .. } => format!("fill:{}", target),
            TestStep::Wait { target, state, .. } => format!("wait:{}:{:?}", target, state),
            TestStep::Sleep { ms } => format!("sleep:{}ms", ms),
            TestStep::Assert { target, .. } => format!("assert:{}", target),
            TestStep::AssertUrl { contains, matches, .. } => format!(
                "assert_url:{}",
                contains.as_deref().or(matches.as_deref()).unwrap_or("")
            ),
            TestStep::Screenshot { name } => format!("screenshot:{}", name),
            TestStep::RetrieveVerificationCode { email, .. } => format!("verification_code:{}", email),
            TestStep::Log { message } => {
                let end = message.char_indices().nth(30).map(|(i, _)| i).unwrap_or(message.len());
                format!("log:{}", &message[..end])
            }
        }
    }
}

impl TestSpec {
    /// Parse a test spec from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parse a test spec from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all test specs from a directory, sorted by file path
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            let spec = Self::from_file(entry.path())?;
            specs.push(spec);
        }

        Ok(specs)
    }

    /// Filter specs by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }

    fn validate(&self) -> E2eResult<()> {
        if self.name.trim().is_empty() {
            return Err(E2eError::SpecParse("spec name must not be empty".to_string()));
        }
        if let Some(Viewport { width: 0, .. } | Viewport { height: 0, .. }) = self.viewport {
            return Err(E2eError::SpecParse(format!("{}: viewport must not be empty", self.name)));
        }
        for step in &self.steps {
            if let TestStep::AssertUrl { contains: None, matches: None, .. } = step {
                return Err(E2eError::SpecParse(format!(
                    "{}: assert_url needs `contains` or `matches`",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sign_up_spec() {
        let yaml = r#"
name: sign-up-verification
description: Register and confirm with the emailed code
tags:
  - smoke
vars:
  email: someone@yopmail.com
steps:
  - action: navigate
    url: /sign-up
    wait_for: { role: heading, name: Join NEPTHIC }
  - action: fill
    target: { css: 'input[name="email"]' }
    value: ${email}
  - action: retrieve_verification_code
    email: ${email}
  - action: fill
    target: { role: textbox }
    value: ${verification_code}
  - action: assert_url
    contains: /sign-in
"#;
        let spec = TestSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.name, "sign-up-verification");
        assert_eq!(spec.steps.len(), 5);
        assert_eq!(spec.vars["email"], "someone@yopmail.com");
        match &spec.steps[2] {
            TestStep::RetrieveVerificationCode { store_as, .. } => assert_eq!(store_as, "verification_code"),
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_wait_defaults() {
        let yaml = r#"
name: wait-defaults
steps:
  - action: wait
    target: { css: footer }
"#;
        let spec = TestSpec::from_yaml(yaml).unwrap();
        match &spec.steps[0] {
            TestStep::Wait { timeout_ms, state, .. } => {
                assert_eq!(*timeout_ms, 5000);
                assert_eq!(*state, WaitState::Visible);
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_assert_url_requires_condition() {
        let yaml = r#"
name: bad
steps:
  - action: assert_url
"#;
        assert!(matches!(TestSpec::from_yaml(yaml), Err(E2eError::SpecParse(_))));
    }

    #[test]
    fn test_viewport_and_enabled_assertion() {
        let yaml = r#"
name: mobile
viewport: { width: 390, height: 844 }
steps:
  - action: assert
    target: { css: 'button[type="submit"]', pick: last }
    enabled: true
"#;
        let spec = TestSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.viewport, Some(Viewport { width: 390, height: 844 }));
        assert!(matches!(spec.steps[0], TestStep::Assert { enabled: Some(true), .. }));

        let empty = yaml.replace("width: 390", "width: 0");
        assert!(matches!(TestSpec::from_yaml(&empty), Err(E2eError::SpecParse(_))));
    }

    #[test]
    fn test_step_names() {
        let step = TestStep::Click { target: Target::role("button").named("Verify") };
        assert_eq!(step.name(), "click:role=button[name=\"Verify\"]");

        let step = TestStep::Log { message: "é".repeat(40) };
        assert_eq!(step.name().chars().count(), "log:".len() + 30);
    }

    #[test]
    fn test_load_all_and_filter() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b.yaml"),
            "name: b\ntags: [regression]\nsteps: []\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("a.yml"), "name: a\ntags: [smoke]\nsteps: []\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let specs = TestSpec::load_all(dir.path()).unwrap();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);

        let smoke = TestSpec::filter_by_tag(&specs, "smoke");
        assert_eq!(smoke.len(), 1);
        assert_eq!(smoke[0].name, "a");
    }
}
