//! Contact List Common
//!
//! Shared types for the Contact List test harness: the error taxonomy, the
//! user/contact data model, fixture generation and the browser `Page`
//! abstraction that both the real driver and the in-memory application
//! implement.

pub mod error;
pub mod fixtures;
pub mod page;
pub mod selectors;
pub mod types;

pub use error::{E2eError, E2eResult, FailureKind};
pub use fixtures::FixtureGenerator;
pub use page::{Page, PageFactory};
pub use types::*;
