//! Every shipped suite passes against the mock application

use std::sync::Arc;
use std::time::Duration;

use contactlist_e2e::runner::{
    Scenario, ScenarioContext, ScenarioRunner, TestStatus, TestSuiteResult,
};
use contactlist_e2e::suites::contacts::{ContactsCase, ContactsScenario};
use contactlist_e2e::{suites, ApiClient, SuiteConfig, UiSession, WaitPolicy};
use contactlist_mock::MockApp;
use tempfile::TempDir;
use test_case::test_case;

async fn run_suite(name: &str) -> (TestSuiteResult, MockApp) {
    let app = MockApp::new();
    let server = app.serve().await.unwrap();
    let dir = TempDir::new().unwrap();
    let config = SuiteConfig {
        base_url: server.base_url().to_string(),
        output_dir: dir.path().to_path_buf(),
        screenshot_dir: dir.path().join("screenshots"),
        command_timeout_ms: 2_000,
        poll_interval_ms: 10,
        ..Default::default()
    };
    let pages = app.page_factory(server.base_url(), config.screenshot_dir.clone());
    let runner = ScenarioRunner::new(config).with_pages(Arc::new(pages));

    let result = runner.run_all(&suites::named(name).unwrap()).await;
    server.stop().await;
    (result, app)
}

#[test_case("api" ; "api suite")]
#[test_case("auth" ; "auth suite")]
#[test_case("contacts" ; "contacts suite")]
#[test_case("navigation" ; "navigation suite")]
#[tokio::test]
async fn suite_passes_against_mock(name: &str) {
    let (result, app) = run_suite(name).await;

    let failures: Vec<_> = result
        .results
        .iter()
        .filter(|r| r.status != TestStatus::Passed)
        .map(|r| format!("{}: {:?}", r.name, r.error))
        .collect();
    assert!(failures.is_empty(), "{:#?}", failures);
    assert!(result.total > 0);

    // every scenario cleans up the accounts it created
    let store = app.store().read();
    assert_eq!(store.user_count(), 0);
    assert_eq!(store.contact_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn contacts_teardown_without_a_session_returns_at_once() {
    let app = MockApp::new();
    let base_url = "http://mock.local";
    let ui = UiSession::new(Box::new(app.page(base_url)), base_url, WaitPolicy::default());
    let api = ApiClient::new(base_url, Duration::from_secs(1)).unwrap();
    let mut ctx = ScenarioContext::new(api, Some(ui));

    let scenario = ContactsScenario(ContactsCase::ListPage);
    let started = tokio::time::Instant::now();
    scenario.teardown(&mut ctx).await.unwrap();

    // a page-level wait would have burned the full command timeout
    assert!(started.elapsed() < Duration::from_secs(1));
}
