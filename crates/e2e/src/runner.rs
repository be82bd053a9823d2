//! Scenario runner: setup, run, teardown and reporting

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contactlist_common::{
    Credentials, E2eError, E2eResult, FailureKind, FixtureGenerator, PageFactory, UserFixture,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::client::{ApiClient, Session};
use crate::config::SuiteConfig;
use crate::ui::UiSession;

/// One complete setup → action → assert → teardown case
#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> String;

    fn suite(&self) -> &'static str;

    fn tags(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// UI scenarios get a fresh browser page in their context
    fn needs_browser(&self) -> bool {
        false
    }

    async fn setup(&self, _ctx: &mut ScenarioContext) -> E2eResult<()> {
        Ok(())
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> E2eResult<()>;

    /// Always runs, even when setup failed
    async fn teardown(&self, _ctx: &mut ScenarioContext) -> E2eResult<()> {
        Ok(())
    }
}

/// Everything a scenario may touch; rebuilt for every scenario
pub struct ScenarioContext {
    pub api: ApiClient,
    pub fixtures: FixtureGenerator,
    pub ui: Option<UiSession>,
    /// Primary user registered during setup
    pub user: Option<UserFixture>,
    pub session: Option<Session>,
    /// Contact created during setup
    pub contact_id: Option<String>,
    /// Accounts to delete when the scenario ends
    created_users: Vec<Credentials>,
}

impl ScenarioContext {
    pub fn new(api: ApiClient, ui: Option<UiSession>) -> Self {
        Self {
            api,
            fixtures: FixtureGenerator::default(),
            ui,
            user: None,
            session: None,
            contact_id: None,
            created_users: Vec::new(),
        }
    }

    pub fn ui(&mut self) -> E2eResult<&mut UiSession> {
        self.ui
            .as_mut()
            .ok_or_else(|| E2eError::Driver("scenario has no browser page".into()))
    }

    pub fn user(&self) -> E2eResult<&UserFixture> {
        self.user
            .as_ref()
            .ok_or_else(|| E2eError::Driver("scenario has no registered user".into()))
    }

    pub fn session(&self) -> E2eResult<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| E2eError::Driver("scenario has no registered user".into()))
    }

    pub fn contact_id(&self) -> E2eResult<&str> {
        self.contact_id
            .as_deref()
            .ok_or_else(|| E2eError::Driver("scenario has no contact".into()))
    }

    /// Remember an account created outside `register_user`, e.g. through the UI
    pub fn track_user(&mut self, user: &UserFixture) {
        self.created_users.push(user.credentials());
    }

    /// Register a fresh user over the API; it is deleted at teardown
    pub async fn register_user(&mut self) -> E2eResult<(UserFixture, Session)> {
        let user = self.fixtures.generate_user();
        let session = self.register(&user).await?;
        Ok((user, session))
    }

    /// Register the primary user and keep both its fixture and session
    pub async fn sign_up_primary(&mut self) -> E2eResult<()> {
        let (user, session) = self.register_user().await?;
        self.user = Some(user);
        self.session = Some(session);
        Ok(())
    }

    pub async fn register(&mut self, user: &UserFixture) -> E2eResult<Session> {
        let session = Session::register(&self.api, user).await?;
        self.track_user(user);
        Ok(session)
    }

    /// Close the page and delete every tracked account, best effort
    pub async fn release(&mut self) {
        if let Some(mut ui) = self.ui.take() {
            if let Err(e) = ui.close().await {
                warn!("closing page failed: {}", e);
            }
        }

        // log in again: a scenario may have logged the original token out
        for credentials in std::mem::take(&mut self.created_users) {
            match self.api.login(&credentials).await {
                Ok(resp) if resp.is_success() => match resp.json::<contactlist_common::AuthPayload>() {
                    Ok(payload) => Session::from(payload).cleanup(&self.api).await,
                    Err(e) => warn!(email = %credentials.email, "cleanup login unreadable: {}", e),
                },
                Ok(resp) => debug!(
                    email = %credentials.email,
                    status = resp.status(),
                    "account already gone"
                ),
                Err(e) => warn!(email = %credentials.email, "cleanup failed: {}", e),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub suite: String,
    pub status: TestStatus,
    pub kind: Option<FailureKind>,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot: Option<PathBuf>,
}

impl TestResult {
    fn skipped(scenario: &dyn Scenario, reason: &str) -> Self {
        Self {
            name: scenario.name(),
            suite: scenario.suite().to_string(),
            status: TestStatus::Skipped,
            kind: None,
            duration_ms: 0,
            error: Some(reason.to_string()),
            screenshot: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

/// Failure counts per kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCounts {
    pub transport: usize,
    pub assertion: usize,
    pub timeout: usize,
    pub harness: usize,
}

impl FailureCounts {
    fn record(&mut self, kind: FailureKind) {
        match kind {
            FailureKind::Transport => self.transport += 1,
            FailureKind::Assertion => self.assertion += 1,
            FailureKind::Timeout => self.timeout += 1,
            FailureKind::Harness => self.harness += 1,
        }
    }
}

/// Result of running all scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: FailureCounts,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn from_results(started_at: DateTime<Utc>, duration_ms: u64, results: Vec<TestResult>) -> Self {
        let mut failures = FailureCounts::default();
        let (mut passed, mut failed, mut skipped) = (0, 0, 0);
        for r in &results {
            match r.status {
                TestStatus::Passed => passed += 1,
                TestStatus::Skipped => skipped += 1,
                TestStatus::Failed => {
                    failed += 1;
                    failures.record(r.kind.unwrap_or(FailureKind::Harness));
                }
            }
        }
        Self {
            started_at,
            total: results.len(),
            passed,
            failed,
            skipped,
            failures,
            duration_ms,
            results,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Which scenarios to run; every set field must match
#[derive(Debug, Clone, Default)]
pub struct ScenarioFilter {
    pub suite: Option<String>,
    pub tag: Option<String>,
    /// Substring of the scenario name
    pub name: Option<String>,
}

impl ScenarioFilter {
    pub fn matches(&self, scenario: &dyn Scenario) -> bool {
        self.suite.as_deref().map_or(true, |s| scenario.suite() == s)
            && self
                .tag
                .as_deref()
                .map_or(true, |t| scenario.tags().contains(&t))
            && self
                .name
                .as_deref()
                .map_or(true, |n| scenario.name().contains(n))
    }
}

/// Runs scenarios one after another; a failure never stops the suite
pub struct ScenarioRunner {
    config: SuiteConfig,
    pages: Option<Arc<dyn PageFactory>>,
    filter: ScenarioFilter,
}

impl ScenarioRunner {
    pub fn new(config: SuiteConfig) -> Self {
        Self {
            config,
            pages: None,
            filter: ScenarioFilter::default(),
        }
    }

    /// Without a page factory, browser scenarios are reported as skipped
    pub fn with_pages(mut self, pages: Arc<dyn PageFactory>) -> Self {
        self.pages = Some(pages);
        self
    }

    pub fn with_filter(mut self, filter: ScenarioFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub async fn run_all(&self, scenarios: &[Box<dyn Scenario>]) -> TestSuiteResult {
        let started_at = Utc::now();
        let start = Instant::now();

        let selected: Vec<&dyn Scenario> = scenarios
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| self.filter.matches(*s))
            .collect();
        info!("Running {} scenario(s)...", selected.len());

        let mut results = Vec::with_capacity(selected.len());
        for scenario in selected {
            let result = self.run_scenario(scenario).await;
            match result.status {
                TestStatus::Passed => info!("✓ {} ({} ms)", result.name, result.duration_ms),
                TestStatus::Skipped => info!(
                    "- {} skipped: {}",
                    result.name,
                    result.error.as_deref().unwrap_or("")
                ),
                TestStatus::Failed => error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                ),
            }
            results.push(result);
        }

        let suite = TestSuiteResult::from_results(started_at, start.elapsed().as_millis() as u64, results);
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            suite.passed, suite.failed, suite.skipped, suite.duration_ms
        );
        suite
    }

    pub async fn run_scenario(&self, scenario: &dyn Scenario) -> TestResult {
        let start = Instant::now();
        let name = scenario.name();
        debug!("Running scenario: {}", name);

        let mut ctx = match self.context_for(scenario).await {
            Ok(Some(ctx)) => ctx,
            Ok(None) => return TestResult::skipped(scenario, "no browser available"),
            Err(e) => return self.finish(scenario, start, Err(e), None),
        };

        let outcome = match scenario.setup(&mut ctx).await {
            Ok(()) => scenario.run(&mut ctx).await,
            Err(e) => Err(e),
        };

        let mut screenshot = None;
        if outcome.is_err() && self.config.screenshot_on_failure {
            if let Some(ui) = ctx.ui.as_mut() {
                match ui.screenshot(&artifact_name(&name)).await {
                    Ok(path) => screenshot = Some(path),
                    Err(e) => warn!("screenshot for {} failed: {}", name, e),
                }
            }
        }

        if let Err(e) = scenario.teardown(&mut ctx).await {
            warn!("teardown of {} failed: {}", name, e);
        }
        ctx.release().await;

        self.finish(scenario, start, outcome, screenshot)
    }

    async fn context_for(&self, scenario: &dyn Scenario) -> E2eResult<Option<ScenarioContext>> {
        let api = ApiClient::new(self.config.base_url(), self.config.request_timeout())?;
        if !scenario.needs_browser() {
            return Ok(Some(ScenarioContext::new(api, None)));
        }

        let Some(pages) = &self.pages else {
            return Ok(None);
        };
        let mut page = pages.open().await?;
        page.set_viewport(self.config.viewport_width, self.config.viewport_height)
            .await?;
        let ui = UiSession::new(page, self.config.base_url(), self.config.wait_policy());
        Ok(Some(ScenarioContext::new(api, Some(ui))))
    }

    fn finish(
        &self,
        scenario: &dyn Scenario,
        start: Instant,
        outcome: E2eResult<()>,
        screenshot: Option<PathBuf>,
    ) -> TestResult {
        let (status, kind, error) = match outcome {
            Ok(()) => (TestStatus::Passed, None, None),
            Err(e) => (TestStatus::Failed, Some(e.kind()), Some(e.to_string())),
        };
        TestResult {
            name: scenario.name(),
            suite: scenario.suite().to_string(),
            status,
            kind,
            duration_ms: start.elapsed().as_millis() as u64,
            error,
            screenshot,
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

/// File-name-safe form of a scenario name
fn artifact_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: TestStatus, kind: Option<FailureKind>) -> TestResult {
        TestResult {
            name: "x".into(),
            suite: "api".into(),
            status,
            kind,
            duration_ms: 1,
            error: None,
            screenshot: None,
        }
    }

    #[test]
    fn suite_result_counts_by_status_and_kind() {
        let suite = TestSuiteResult::from_results(
            Utc::now(),
            10,
            vec![
                result(TestStatus::Passed, None),
                result(TestStatus::Failed, Some(FailureKind::Timeout)),
                result(TestStatus::Failed, Some(FailureKind::Assertion)),
                result(TestStatus::Failed, Some(FailureKind::Timeout)),
                result(TestStatus::Skipped, None),
            ],
        );
        assert_eq!((suite.total, suite.passed, suite.failed, suite.skipped), (5, 1, 3, 1));
        assert_eq!(suite.failures.timeout, 2);
        assert_eq!(suite.failures.assertion, 1);
        assert_eq!(suite.failures.transport, 0);
        assert!(!suite.success());
    }

    #[test]
    fn artifact_names_are_path_safe() {
        assert_eq!(artifact_name("auth::login valid/ok"), "auth__login_valid_ok");
    }

    #[test]
    fn statuses_serialize_lowercase() {
        let json = serde_json::to_string(&result(TestStatus::Failed, Some(FailureKind::Timeout))).unwrap();
        assert!(json.contains(r#""status":"failed""#));
        assert!(json.contains(r#""kind":"timeout""#));
    }
}
