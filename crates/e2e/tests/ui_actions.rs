//! Composite UI helpers driven against the simulated page

use std::time::Duration;

use contactlist_common::fixtures::ContactOverrides;
use contactlist_common::selectors::{self, paths, text};
use contactlist_common::{ContactFixture, E2eError, FailureKind, FixtureGenerator};
use contactlist_e2e::actions::FormOutcome;
use contactlist_e2e::{UiSession, WaitPolicy};
use contactlist_mock::MockApp;

const BASE_URL: &str = "http://mock.local";

fn session(app: &MockApp) -> UiSession {
    UiSession::new(
        Box::new(app.page(BASE_URL)),
        BASE_URL,
        WaitPolicy {
            timeout: Duration::from_secs(2),
            poll_interval: Duration::from_millis(10),
        },
    )
}

#[tokio::test]
async fn register_logout_and_login_again() {
    let app = MockApp::new();
    let mut ui = session(&app);
    let user = FixtureGenerator::default().generate_user();

    ui.register(&user).await.unwrap();
    ui.expect_url_contains(paths::CONTACT_LIST).await.unwrap();

    ui.logout().await.unwrap();
    assert_eq!(ui.current_url().await.unwrap(), "http://mock.local/");

    ui.login(&user.credentials()).await.unwrap();
    ui.expect_visible(selectors::ADD_CONTACT).await.unwrap();
}

#[tokio::test]
async fn rejected_forms_report_the_error_text() {
    let app = MockApp::new();
    let mut ui = session(&app);
    let user = FixtureGenerator::default().generate_user();
    ui.register(&user).await.unwrap();
    ui.logout().await.unwrap();

    match ui.try_register(&user).await.unwrap() {
        FormOutcome::Rejected(message) => assert!(message.contains(text::EMAIL_IN_USE)),
        FormOutcome::Accepted => panic!("duplicate sign-up accepted"),
    }

    let mut wrong = user.credentials();
    wrong.password = "wrongpassword".into();
    assert_eq!(
        ui.try_login(&wrong).await.unwrap(),
        FormOutcome::Rejected(text::BAD_CREDENTIALS.into())
    );
    let err = ui.login(&wrong).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Assertion);
}

#[tokio::test]
async fn clear_all_contacts_empties_the_table_and_is_idempotent() {
    let app = MockApp::new();
    let mut ui = session(&app);
    ui.register(&FixtureGenerator::default().generate_user())
        .await
        .unwrap();

    for (first, last) in [("Ann", "One"), ("Bob", "Two"), ("Cat", "Three")] {
        ui.add_contact(&ContactFixture::named(first, last))
            .await
            .unwrap();
    }
    ui.expect_count(selectors::CONTACT_ROW, 3).await.unwrap();

    assert_eq!(ui.clear_all_contacts().await.unwrap(), 3);
    ui.expect_count(selectors::CONTACT_ROW, 0).await.unwrap();
    assert_eq!(app.store().read().contact_count(), 0);

    assert_eq!(ui.clear_all_contacts().await.unwrap(), 0);
}

#[tokio::test]
async fn edit_waits_for_the_prefilled_form() {
    let app = MockApp::new();
    let mut ui = session(&app);
    ui.register(&FixtureGenerator::default().generate_user())
        .await
        .unwrap();

    let mut contact = ContactFixture::named("John", "Doe");
    contact.email = Some("john.doe@example.com".into());
    ui.add_contact(&contact).await.unwrap();
    ui.open_contact("John Doe").await.unwrap();

    ui.edit_contact(&[(selectors::FIRST_NAME, "UpdatedJohn")])
        .await
        .unwrap();
    ui.expect_text("UpdatedJohn").await.unwrap();
    // untouched fields survive the edit
    ui.expect_text("john.doe@example.com").await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn a_condition_that_never_holds_times_out() {
    let app = MockApp::new();
    let mut ui = UiSession::new(Box::new(app.page(BASE_URL)), BASE_URL, WaitPolicy::default());
    ui.visit(paths::HOME).await.unwrap();

    let err = ui.expect_visible("#does-not-exist").await.unwrap_err();
    match &err {
        E2eError::Timeout { condition, waited_ms } => {
            assert!(condition.contains("#does-not-exist"));
            assert!(*waited_ms >= 10_000);
        }
        other => panic!("expected a timeout, got {:?}", other),
    }
    assert_eq!(err.kind(), FailureKind::Timeout);
}

#[tokio::test(start_paused = true)]
async fn clicking_a_missing_element_times_out_instead_of_failing_fast() {
    let app = MockApp::new();
    let mut ui = UiSession::new(Box::new(app.page(BASE_URL)), BASE_URL, WaitPolicy::default());
    ui.visit(paths::HOME).await.unwrap();

    let err = ui.click(selectors::DELETE).await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn blank_contact_names_are_rejected_before_touching_the_page() {
    let app = MockApp::new();
    let mut ui = session(&app);
    ui.register(&FixtureGenerator::default().generate_user())
        .await
        .unwrap();

    let blank = FixtureGenerator::default().generate_contact_with(ContactOverrides {
        first_name: Some(String::new()),
        ..Default::default()
    });
    let err = ui.add_contact(&blank).await.unwrap_err();
    assert!(matches!(err, E2eError::InvalidFixture(_)), "{:?}", err);
    assert_eq!(err.kind(), FailureKind::Harness);

    // still on the list page, nothing submitted
    ui.expect_url_contains(paths::CONTACT_LIST).await.unwrap();
    assert_eq!(app.store().read().contact_count(), 0);
}

#[tokio::test]
async fn clearing_known_contacts_deletes_exactly_that_many() {
    let app = MockApp::new();
    let mut ui = session(&app);
    ui.register(&FixtureGenerator::default().generate_user())
        .await
        .unwrap();
    for (first, last) in [("Ann", "One"), ("Bob", "Two")] {
        ui.add_contact(&ContactFixture::named(first, last))
            .await
            .unwrap();
    }

    assert_eq!(ui.clear_known_contacts(2).await.unwrap(), 2);
    assert_eq!(app.store().read().contact_count(), 0);
    assert_eq!(ui.clear_known_contacts(0).await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn clearing_known_contacts_waits_for_the_rows_to_render() {
    let app = MockApp::new();
    let mut ui = UiSession::new(Box::new(app.page(BASE_URL)), BASE_URL, WaitPolicy::default());
    ui.register(&FixtureGenerator::default().generate_user())
        .await
        .unwrap();
    ui.add_contact(&ContactFixture::named("Ann", "One"))
        .await
        .unwrap();

    // a row count that never appears is a timeout, not an empty list
    let err = ui.clear_known_contacts(3).await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(app.store().read().contact_count(), 1);
}
