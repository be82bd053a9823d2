//! Contact List E2E Test Harness
//!
//! This crate drives the Contact List application end to end:
//! - Talks to the REST API through an authenticated `reqwest` client
//! - Controls a browser page through Playwright (or the in-memory mock page)
//! - Bounds every UI interaction by a polled condition with a deadline
//! - Runs scenario suites with unconditional teardown and JSON reporting
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Scenario Runner (tests/e2e.rs)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioRunner                                             │
//! │    ├── run_all(scenarios) -> TestSuiteResult                │
//! │    ├── setup -> run -> teardown (always) -> release         │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioContext                                            │
//! │    ├── ApiClient     (bearer auth, non-2xx as data)         │
//! │    ├── FixtureGenerator (unique users, contacts)            │
//! │    └── UiSession     (Page + WaitPolicy)                    │
//! │          ├── PlaywrightPage  (node driver, JSON lines)      │
//! │          └── MockPage        (contactlist-mock)             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Suites: api, auth, contacts, navigation                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod actions;
pub mod check;
pub mod client;
pub mod config;
pub mod playwright;
pub mod runner;
pub mod suites;
pub mod ui;
pub mod wait;

pub use client::{ApiClient, ApiResponse, Endpoint, Session};
pub use config::SuiteConfig;
pub use contactlist_common::{E2eError, E2eResult, FailureKind};
pub use runner::{
    Scenario, ScenarioContext, ScenarioFilter, ScenarioRunner, TestResult, TestStatus,
    TestSuiteResult,
};
pub use ui::UiSession;
pub use wait::{Condition, WaitPolicy};
