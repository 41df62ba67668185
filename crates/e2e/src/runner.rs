//! Main test runner that orchestrates the WebDriver process, browser
//! fixtures and spec execution

use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::E2eConfig;
use crate::driver::DriverHandle;
use crate::error::{E2eError, E2eResult};
use crate::executor::{StepExecutor, StepResult};
use crate::fixture::Fixture;
use crate::mailbox::MailboxLocks;
use crate::spec::TestSpec;

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub error: Option<String>,
}

/// Result of running all tests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn from_results(results: Vec<TestResult>, duration_ms: u64) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            skipped: 0,
            duration_ms,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Main E2E test runner
pub struct TestRunner {
    config: E2eConfig,

    /// Locally spawned WebDriver process (if any)
    driver: Option<DriverHandle>,

    /// Shared by every fixture so specs using the same mailbox never overlap
    locks: MailboxLocks,
}

impl TestRunner {
    pub fn new(config: E2eConfig) -> Self {
        Self {
            config,
            driver: None,
            locks: MailboxLocks::new(),
        }
    }

    pub fn config(&self) -> &E2eConfig {
        &self.config
    }

    /// Spawn the configured WebDriver binary, if any
    pub async fn start_driver(&mut self) -> E2eResult<()> {
        if self.driver.is_some() {
            return Ok(()); // Already running
        }
        let Some(driver_config) = self.config.driver.clone() else {
            return Ok(());
        };

        let driver = DriverHandle::spawn(&driver_config).await?;

        // Sessions go to the spawned driver instead of the configured URL
        self.config.browser.webdriver_url = driver.url.clone();

        self.driver = Some(driver);
        Ok(())
    }

    pub fn stop_driver(&mut self) -> E2eResult<()> {
        if let Some(mut driver) = self.driver.take() {
            driver.stop()?;
        }
        Ok(())
    }

    /// Run all tests in the specs directory
    pub async fn run_all(&mut self) -> E2eResult<TestSuiteResult> {
        let specs = TestSpec::load_all(&self.config.specs_dir)?;
        self.run_specs(&specs).await
    }

    /// Run tests matching a tag
    pub async fn run_tagged(&mut self, tag: &str) -> E2eResult<TestSuiteResult> {
        let specs = TestSpec::load_all(&self.config.specs_dir)?;
        let filtered: Vec<TestSpec> = TestSpec::filter_by_tag(&specs, tag)
            .into_iter()
            .cloned()
            .collect();
        self.run_specs(&filtered).await
    }

    /// Run a specific test by name
    pub async fn run_test(&mut self, name: &str) -> E2eResult<TestResult> {
        let specs = TestSpec::load_all(&self.config.specs_dir)?;
        let spec = specs
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::SpecParse(format!("Test not found: {}", name)))?;

        self.start_driver().await?;
        Ok(self.run_spec(&spec).await)
    }

    /// Run a list of test specs
    pub async fn run_specs(&mut self, specs: &[TestSpec]) -> E2eResult<TestSuiteResult> {
        let start = Instant::now();
        let mut results = Vec::new();

        self.start_driver().await?;

        info!("Running {} test(s)...", specs.len());

        for spec in specs {
            let result = self.run_spec(spec).await;
            if result.success {
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                error!("✗ {} - {}", result.name, result.error.as_deref().unwrap_or("unknown error"));
            }
            results.push(result);
        }

        let suite = TestSuiteResult::from_results(results, start.elapsed().as_millis() as u64);

        info!("");
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            suite.passed, suite.failed, suite.skipped, suite.duration_ms
        );

        Ok(suite)
    }

    /// Run a single spec on a fresh browser fixture
    pub async fn run_spec(&self, spec: &TestSpec) -> TestResult {
        let start = Instant::now();
        debug!("Running test: {}", spec.name);

        let fixture = match Fixture::setup(&self.config).await {
            Ok(fixture) => fixture.with_locks(self.locks.clone()),
            Err(e) => {
                return TestResult {
                    name: spec.name.clone(),
                    success: false,
                    duration_ms: start.elapsed().as_millis() as u64,
                    steps: vec![],
                    error: Some(e.to_string()),
                }
            }
        };

        let mut result = self.execute_spec(&fixture, spec).await;

        if let Err(e) = fixture.teardown().await {
            warn!("Teardown failed for {}: {}", spec.name, e);
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    /// Execute the steps of `spec` on an existing fixture, stopping at the
    /// first failing step
    pub async fn execute_spec(&self, fixture: &Fixture, spec: &TestSpec) -> TestResult {
        let start = Instant::now();
        let screenshot_dir = self.config.output_dir.join("screenshots");
        let mut executor = StepExecutor::new(fixture, &spec.vars, &screenshot_dir);

        let mut step_results = Vec::new();
        let mut test_error: Option<String> = None;

        if let Some(viewport) = spec.viewport {
            let result = executor.apply_viewport(viewport).await;
            if !result.success {
                test_error = result.error.clone();
            }
            step_results.push(result);
        }

        for step in &spec.steps {
            if test_error.is_some() {
                break;
            }
            let result = executor.execute_step(step).await;

            if !result.success {
                test_error = result.error.clone();
                step_results.push(result);
                break; // Stop on first failure
            }

            step_results.push(result);
        }

        TestResult {
            name: spec.name.clone(),
            success: test_error.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            steps: step_results,
            error: test_error,
        }
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Drop for TestRunner {
    fn drop(&mut self) {
        let _ = self.stop_driver();
    }
}
