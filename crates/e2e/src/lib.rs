//! NEPTHIC E2E Test Framework
//!
//! This crate provides a Rust-controlled browser harness for the NEPTHIC
//! storefront that:
//! - Drives a real browser over WebDriver, optionally spawning the driver
//! - Wraps the storefront screens in page objects
//! - Retrieves emailed verification codes from a disposable web inbox
//! - Parses and runs declarative YAML test specs
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── start_driver() -> DriverHandle                       │
//! │    ├── Fixture::setup() -> WebDriverSession + main page     │
//! │    └── execute_spec(spec: TestSpec) -> TestResult           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  VerificationCodeRetriever                                  │
//! │    ├── new_page() in the fixture's session                  │
//! │    ├── Inbox (YopmailInbox): open / refresh / fetch / read  │
//! │    ├── bounded poll: attempts + deadline + cancellation     │
//! │    └── CodeResult::{Found(code), NotFound}                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestSpec (YAML)                                            │
//! │    ├── name, description, tags, vars                        │
//! │    └── steps: [Step]                                        │
//! │          ├── navigate { url, wait_for? }                    │
//! │          ├── click / fill / wait / sleep                    │
//! │          ├── assert { target, visible?, text?, value? }     │
//! │          ├── assert_url { contains? | matches? }            │
//! │          ├── retrieve_verification_code { email, store_as } │
//! │          └── screenshot / log                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod code;
pub mod config;
pub mod data;
pub mod driver;
pub mod error;
pub mod executor;
pub mod fixture;
pub mod inbox;
pub mod mailbox;
pub mod pages;
pub mod retriever;
pub mod routes;
pub mod runner;
pub mod spec;
pub mod webdriver;

pub use browser::{BrowserSession, Page, Target, WaitState};
pub use code::{CodeResult, VerificationCode, NOT_FOUND_SENTINEL};
pub use config::E2eConfig;
pub use error::{E2eError, E2eResult};
pub use fixture::Fixture;
pub use retriever::{PollPolicy, VerificationCodeRetriever};
pub use runner::{TestResult, TestRunner, TestSuiteResult};
pub use spec::{TestSpec, TestStep};
