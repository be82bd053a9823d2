//! Browser page abstraction
//!
//! Primitive operations act once and never wait. A missing element is an
//! immediate `ElementNotFound`; retrying until a deadline is the caller's job.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::E2eResult;

/// One browser tab pointed at the application
#[async_trait]
pub trait Page: Send {
    /// Navigate to a path relative to the application's base URL
    async fn goto(&mut self, path: &str) -> E2eResult<()>;

    /// Absolute URL currently shown
    async fn current_url(&mut self) -> E2eResult<String>;

    async fn title(&mut self) -> E2eResult<String>;

    /// Number of elements matching `selector`
    async fn count(&mut self, selector: &str) -> E2eResult<usize>;

    /// Whether the first element matching `selector` is rendered and visible
    async fn is_visible(&mut self, selector: &str) -> E2eResult<bool>;

    /// Whether some visible element contains `text`
    async fn text_visible(&mut self, text: &str) -> E2eResult<bool>;

    /// Click the first element matching `selector`
    async fn click(&mut self, selector: &str) -> E2eResult<()>;

    /// Click the innermost visible element containing `text`
    async fn click_text(&mut self, text: &str) -> E2eResult<()>;

    /// Replace the value of an input
    async fn fill(&mut self, selector: &str, value: &str) -> E2eResult<()>;

    async fn input_value(&mut self, selector: &str) -> E2eResult<String>;

    async fn text_content(&mut self, selector: &str) -> E2eResult<String>;

    async fn attribute(&mut self, selector: &str, name: &str) -> E2eResult<Option<String>>;

    /// Computed CSS property value
    async fn css_value(&mut self, selector: &str, property: &str) -> E2eResult<String>;

    /// Press a key on whatever element has focus
    async fn press(&mut self, key: &str) -> E2eResult<()>;

    /// `id` of the focused element, if any
    async fn focused_id(&mut self) -> E2eResult<Option<String>>;

    async fn go_back(&mut self) -> E2eResult<()>;

    async fn go_forward(&mut self) -> E2eResult<()>;

    async fn set_viewport(&mut self, width: u32, height: u32) -> E2eResult<()>;

    /// Fail every request whose URL ends with `url_suffix` at the network level
    async fn abort_requests(&mut self, method: &str, url_suffix: &str) -> E2eResult<()>;

    async fn screenshot(&mut self, name: &str) -> E2eResult<PathBuf>;

    async fn close(&mut self) -> E2eResult<()>;
}

/// Opens a fresh page for each scenario
#[async_trait]
pub trait PageFactory: Send + Sync {
    async fn open(&self) -> E2eResult<Box<dyn Page>>;
}
