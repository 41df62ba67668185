//! One-time verification codes and the retriever's two-outcome result

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Text returned in place of a code when no message from the expected sender exists
pub const NOT_FOUND_SENTINEL: &str = "Verification email not found";

/// Number of digits in a verification code
pub const CODE_LEN: usize = 6;

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // A run of exactly six digits: the neighbours, if any, are not digits.
    PATTERN.get_or_init(|| Regex::new(r"(?:^|[^0-9])([0-9]{6})(?:[^0-9]|$)").expect("static pattern"))
}

/// Exactly six ASCII digits, kept as text so leading zeros survive
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VerificationCode(String);

impl VerificationCode {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.len() == CODE_LEN && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    /// First standalone run of six digits in `text`
    pub fn extract(text: &str) -> Option<Self> {
        code_pattern()
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VerificationCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("not a {}-digit code: {:?}", CODE_LEN, value))
    }
}

impl From<VerificationCode> for String {
    fn from(code: VerificationCode) -> Self {
        code.0
    }
}

/// Outcome of a lookup that completed without a transport or timeout failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeResult {
    Found(VerificationCode),
    /// The newest message did not come from the expected sender
    NotFound,
}

impl CodeResult {
    pub fn code(&self) -> Option<&VerificationCode> {
        match self {
            CodeResult::Found(code) => Some(code),
            CodeResult::NotFound => None,
        }
    }

    pub fn into_code(self) -> Option<VerificationCode> {
        match self {
            CodeResult::Found(code) => Some(code),
            CodeResult::NotFound => None,
        }
    }

    /// The code, or [`NOT_FOUND_SENTINEL`]
    pub fn as_str(&self) -> &str {
        match self {
            CodeResult::Found(code) => code.as_str(),
            CodeResult::NotFound => NOT_FOUND_SENTINEL,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, CodeResult::Found(_))
    }
}

impl fmt::Display for CodeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
