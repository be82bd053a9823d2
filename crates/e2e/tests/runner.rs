//! Scenario lifecycle, failure classification and reporting

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use contactlist_common::{E2eError, E2eResult, FailureKind};
use contactlist_e2e::runner::{
    Scenario, ScenarioContext, ScenarioFilter, ScenarioRunner, TestStatus, TestSuiteResult,
};
use contactlist_e2e::SuiteConfig;
use contactlist_mock::{MockApp, MockServer};
use tempfile::TempDir;

#[derive(Default)]
struct Probe {
    ran: AtomicBool,
    torn_down: AtomicBool,
}

/// Scriptable scenario recording which phases ran
struct Scripted {
    name: &'static str,
    tags: Vec<&'static str>,
    browser: bool,
    setup_error: Option<fn() -> E2eError>,
    run_error: Option<fn() -> E2eError>,
    teardown_fails: bool,
    probe: Arc<Probe>,
}

impl Scripted {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            tags: Vec::new(),
            browser: false,
            setup_error: None,
            run_error: None,
            teardown_fails: false,
            probe: Arc::new(Probe::default()),
        }
    }
}

#[async_trait]
impl Scenario for Scripted {
    fn name(&self) -> String {
        self.name.to_string()
    }

    fn suite(&self) -> &'static str {
        "scripted"
    }

    fn tags(&self) -> Vec<&'static str> {
        self.tags.clone()
    }

    fn needs_browser(&self) -> bool {
        self.browser
    }

    async fn setup(&self, _ctx: &mut ScenarioContext) -> E2eResult<()> {
        match self.setup_error {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }

    async fn run(&self, _ctx: &mut ScenarioContext) -> E2eResult<()> {
        self.probe.ran.store(true, Ordering::SeqCst);
        match self.run_error {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }

    async fn teardown(&self, _ctx: &mut ScenarioContext) -> E2eResult<()> {
        self.probe.torn_down.store(true, Ordering::SeqCst);
        if self.teardown_fails {
            return Err(E2eError::Driver("teardown exploded".into()));
        }
        Ok(())
    }
}

struct Harness {
    app: MockApp,
    _server: MockServer,
    dir: TempDir,
    config: SuiteConfig,
}

async fn harness() -> Harness {
    let app = MockApp::new();
    let server = app.serve().await.unwrap();
    let dir = TempDir::new().unwrap();
    let config = SuiteConfig {
        base_url: server.base_url().to_string(),
        output_dir: dir.path().join("results"),
        screenshot_dir: dir.path().join("screenshots"),
        command_timeout_ms: 500,
        poll_interval_ms: 10,
        ..Default::default()
    };
    Harness {
        app,
        _server: server,
        dir,
        config,
    }
}

impl Harness {
    fn runner(&self) -> ScenarioRunner {
        ScenarioRunner::new(self.config.clone())
    }

    fn browser_runner(&self) -> ScenarioRunner {
        let factory = self
            .app
            .page_factory(&self.config.base_url, self.config.screenshot_dir.clone());
        self.runner().with_pages(Arc::new(factory))
    }
}

fn boxed(scenarios: Vec<Scripted>) -> Vec<Box<dyn Scenario>> {
    scenarios
        .into_iter()
        .map(|s| Box::new(s) as Box<dyn Scenario>)
        .collect()
}

#[tokio::test]
async fn teardown_runs_even_when_setup_fails() {
    let h = harness().await;
    let mut scenario = Scripted::new("setup_fails");
    scenario.setup_error = Some(|| E2eError::assertion("setup", 201, 400));
    let probe = scenario.probe.clone();

    let result = h.runner().run_scenario(&scenario).await;

    assert_eq!(result.status, TestStatus::Failed);
    assert_eq!(result.kind, Some(FailureKind::Assertion));
    assert!(!probe.ran.load(Ordering::SeqCst));
    assert!(probe.torn_down.load(Ordering::SeqCst));
}

#[tokio::test]
async fn teardown_failure_does_not_change_the_outcome() {
    let h = harness().await;
    let mut scenario = Scripted::new("teardown_fails");
    scenario.teardown_fails = true;

    let result = h.runner().run_scenario(&scenario).await;
    assert_eq!(result.status, TestStatus::Passed);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn one_failure_never_stops_the_suite() {
    let h = harness().await;
    let mut middle = Scripted::new("times_out");
    middle.run_error = Some(|| E2eError::Timeout {
        condition: "#logout to be visible".into(),
        waited_ms: 500,
    });
    let last = Scripted::new("after_failure");
    let last_probe = last.probe.clone();

    let suite = h
        .runner()
        .run_all(&boxed(vec![Scripted::new("first"), middle, last]))
        .await;

    assert_eq!((suite.total, suite.passed, suite.failed), (3, 2, 1));
    assert_eq!(suite.failures.timeout, 1);
    assert_eq!(suite.failures.assertion, 0);
    assert!(last_probe.ran.load(Ordering::SeqCst));
    assert!(!suite.success());
}

/// Calls the API of a server that is no longer listening
struct Unreachable;

#[async_trait]
impl Scenario for Unreachable {
    fn name(&self) -> String {
        "unreachable".into()
    }

    fn suite(&self) -> &'static str {
        "scripted"
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> E2eResult<()> {
        ctx.api.me(None).await?.expect_status(401)?;
        Ok(())
    }
}

#[tokio::test]
async fn connection_failures_are_transport_failures() {
    let h = harness().await;
    let server = h.app.serve().await.unwrap();
    let mut config = h.config.clone();
    config.base_url = server.base_url().to_string();
    server.stop().await;

    let result = ScenarioRunner::new(config).run_scenario(&Unreachable).await;
    assert_eq!(result.status, TestStatus::Failed);
    assert_eq!(result.kind, Some(FailureKind::Transport));
}

/// Registers two users over the API and leaves them behind
struct LeavesUsers;

#[async_trait]
impl Scenario for LeavesUsers {
    fn name(&self) -> String {
        "leaves_users".into()
    }

    fn suite(&self) -> &'static str {
        "scripted"
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> E2eResult<()> {
        ctx.sign_up_primary().await?;
        let (_, second) = ctx.register_user().await?;
        // a logged-out token must not stop cleanup
        ctx.api.logout(second.token()).await?.expect_status(200)?;
        Ok(())
    }
}

#[tokio::test]
async fn created_users_are_deleted_after_the_scenario() {
    let h = harness().await;
    let result = h.runner().run_scenario(&LeavesUsers).await;

    assert!(result.passed(), "{:?}", result.error);
    assert_eq!(h.app.store().read().user_count(), 0);
}

#[tokio::test]
async fn browser_scenarios_skip_without_pages() {
    let h = harness().await;
    let mut scenario = Scripted::new("needs_page");
    scenario.browser = true;
    let probe = scenario.probe.clone();

    let result = h.runner().run_scenario(&scenario).await;
    assert_eq!(result.status, TestStatus::Skipped);
    assert!(!probe.ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn failed_browser_scenarios_leave_a_screenshot() {
    let h = harness().await;
    let mut scenario = Scripted::new("ui::fails");
    scenario.browser = true;
    scenario.run_error = Some(|| E2eError::ElementNotFound("#delete".into()));

    let result = h.browser_runner().run_scenario(&scenario).await;

    assert_eq!(result.kind, Some(FailureKind::Harness));
    let shot = result.screenshot.expect("screenshot path");
    assert!(shot.starts_with(h.dir.path()));
    assert!(shot.exists());
}

#[tokio::test]
async fn filters_select_by_tag_and_name() {
    let h = harness().await;
    let mut tagged = Scripted::new("api::login_valid");
    tagged.tags = vec!["api", "users"];
    let mut other = Scripted::new("api::list_contacts");
    other.tags = vec!["api", "contacts"];

    let by_tag = h
        .runner()
        .with_filter(ScenarioFilter {
            tag: Some("users".into()),
            ..Default::default()
        })
        .run_all(&boxed(vec![tagged, other]))
        .await;
    assert_eq!(by_tag.total, 1);
    assert_eq!(by_tag.results[0].name, "api::login_valid");

    let by_name = h
        .runner()
        .with_filter(ScenarioFilter {
            name: Some("list".into()),
            ..Default::default()
        })
        .run_all(&boxed(vec![Scripted::new("api::login_valid"), Scripted::new("api::list_contacts")]))
        .await;
    assert_eq!(by_name.total, 1);
    assert_eq!(by_name.results[0].name, "api::list_contacts");
}

#[tokio::test]
async fn results_are_written_as_json() {
    let h = harness().await;
    let runner = h.runner();
    let suite = runner
        .run_all(&boxed(vec![Scripted::new("only")]))
        .await;

    let path = runner.write_results(&suite).unwrap();
    assert_eq!(path, h.config.output_dir.join("test-results.json"));

    let parsed: TestSuiteResult =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed.total, 1);
    assert_eq!(parsed.results[0].status, TestStatus::Passed);
}
