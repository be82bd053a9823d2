//! Waiting wrappers around a browser page

use std::path::PathBuf;

use contactlist_common::{E2eResult, Page};
use tracing::debug;

use crate::wait::{self, Condition, WaitPolicy};

/// A page plus the deadline every interaction is bounded by
///
/// Interactions first wait for their target to be visible, so a slow render
/// becomes a timeout instead of an immediate `ElementNotFound`.
pub struct UiSession {
    page: Box<dyn Page>,
    base_url: String,
    policy: WaitPolicy,
}

impl UiSession {
    pub fn new(page: Box<dyn Page>, base_url: &str, policy: WaitPolicy) -> Self {
        Self {
            page,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    /// The raw page, for one-shot primitives that must not wait
    pub fn page(&mut self) -> &mut dyn Page {
        self.page.as_mut()
    }

    pub fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an application path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn wait_for(&mut self, condition: Condition) -> E2eResult<()> {
        wait::until(self.page.as_mut(), &condition, &self.policy).await
    }

    pub async fn visit(&mut self, path: &str) -> E2eResult<()> {
        debug!(path, "visit");
        self.page.goto(path).await
    }

    pub async fn click(&mut self, selector: &str) -> E2eResult<()> {
        self.wait_for(Condition::visible(selector)).await?;
        self.page.click(selector).await
    }

    pub async fn click_text(&mut self, text: &str) -> E2eResult<()> {
        self.wait_for(Condition::text(text)).await?;
        self.page.click_text(text).await
    }

    pub async fn type_into(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.wait_for(Condition::visible(selector)).await?;
        self.page.fill(selector, value).await
    }

    pub async fn expect_visible(&mut self, selector: &str) -> E2eResult<()> {
        self.wait_for(Condition::visible(selector)).await
    }

    pub async fn expect_absent(&mut self, selector: &str) -> E2eResult<()> {
        self.wait_for(Condition::absent(selector)).await
    }

    pub async fn expect_count(&mut self, selector: &str, n: usize) -> E2eResult<()> {
        self.wait_for(Condition::count(selector, n)).await
    }

    pub async fn expect_text(&mut self, text: &str) -> E2eResult<()> {
        self.wait_for(Condition::text(text)).await
    }

    pub async fn expect_no_text(&mut self, text: &str) -> E2eResult<()> {
        self.wait_for(Condition::no_text(text)).await
    }

    pub async fn expect_url_contains(&mut self, fragment: &str) -> E2eResult<()> {
        self.wait_for(Condition::url_contains(fragment)).await
    }

    /// Exact match against `base_url + path`
    pub async fn expect_url(&mut self, path: &str) -> E2eResult<()> {
        let url = self.url_for(path);
        self.wait_for(Condition::UrlIs(url)).await
    }

    pub async fn expect_value(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.wait_for(Condition::InputValue(selector.to_string(), value.to_string()))
            .await
    }

    pub async fn expect_focused(&mut self, id: &str) -> E2eResult<()> {
        self.wait_for(Condition::Focused(id.to_string())).await
    }

    /// Text of the first element matching `selector`, once it is visible
    pub async fn text_of(&mut self, selector: &str) -> E2eResult<String> {
        self.wait_for(Condition::visible(selector)).await?;
        self.page.text_content(selector).await
    }

    pub async fn current_url(&mut self) -> E2eResult<String> {
        self.page.current_url().await
    }

    pub async fn screenshot(&mut self, name: &str) -> E2eResult<PathBuf> {
        self.page.screenshot(name).await
    }

    pub async fn close(&mut self) -> E2eResult<()> {
        self.page.close().await
    }
}
