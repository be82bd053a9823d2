//! Scenario suites for the Contact List application
//!
//! `api` talks to the REST endpoints only; `auth`, `contacts` and
//! `navigation` drive a browser page and are skipped when none is available.

pub mod api;
pub mod auth;
pub mod contacts;
pub mod navigation;

use contactlist_common::{E2eError, E2eResult};

use crate::runner::Scenario;

pub const SUITE_NAMES: [&str; 4] = ["api", "auth", "contacts", "navigation"];

/// Every scenario of every suite, in suite order
pub fn all() -> Vec<Box<dyn Scenario>> {
    let mut scenarios = api::scenarios();
    scenarios.extend(auth::scenarios());
    scenarios.extend(contacts::scenarios());
    scenarios.extend(navigation::scenarios());
    scenarios
}

pub fn named(name: &str) -> E2eResult<Vec<Box<dyn Scenario>>> {
    match name {
        "api" => Ok(api::scenarios()),
        "auth" => Ok(auth::scenarios()),
        "contacts" => Ok(contacts::scenarios()),
        "navigation" => Ok(navigation::scenarios()),
        other => Err(E2eError::Config(format!(
            "unknown suite '{}', expected one of {}",
            other,
            SUITE_NAMES.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn scenario_names_are_unique_across_suites() {
        let scenarios = all();
        let names: HashSet<String> = scenarios.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), scenarios.len());
    }

    #[test]
    fn suite_lookup() {
        for name in SUITE_NAMES {
            let scenarios = named(name).unwrap();
            assert!(!scenarios.is_empty());
            assert!(scenarios.iter().all(|s| s.suite() == name));
        }
        assert!(matches!(named("visual"), Err(E2eError::Config(_))));
    }

    #[test]
    fn only_the_api_suite_runs_without_a_browser() {
        for scenario in all() {
            assert_eq!(scenario.needs_browser(), scenario.suite() != "api");
        }
    }
}
