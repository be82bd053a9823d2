//! Contact List Mock
//!
//! An in-memory stand-in for the Contact List application. One `Store`
//! backs both the REST API served on a loopback port and the simulated
//! browser pages, so a user registered through the UI can log in over HTTP
//! and the other way round.

pub mod api;
pub mod auth;
pub mod server;
pub mod store;
pub mod ui;

use std::path::PathBuf;

use axum::Router;

pub use server::MockServer;
pub use store::{SharedStore, Store, StoreError};
pub use ui::{MockPage, MockPageFactory};

/// The mock application: one shared store and the surfaces built over it
#[derive(Clone, Default)]
pub struct MockApp {
    store: SharedStore,
}

impl MockApp {
    pub fn new() -> Self {
        Self {
            store: Store::shared(),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn router(&self) -> Router {
        api::router(self.store.clone())
    }

    /// Serve the REST API on an ephemeral loopback port
    pub async fn serve(&self) -> std::io::Result<MockServer> {
        MockServer::start(self.store.clone()).await
    }

    pub fn page(&self, base_url: &str) -> MockPage {
        MockPage::new(self.store.clone(), base_url, std::env::temp_dir())
    }

    pub fn page_factory(&self, base_url: &str, artifact_dir: impl Into<PathBuf>) -> MockPageFactory {
        MockPageFactory::new(self.store.clone(), base_url, artifact_dir.into())
    }
}
