//! Condition polling with a deadline
//!
//! Page primitives never wait. Everything that has to become true after an
//! action is expressed as a [`Condition`] and polled here until it holds or
//! the deadline passes, which yields [`E2eError::Timeout`] rather than an
//! assertion failure.

use std::fmt;
use std::time::Duration;

use contactlist_common::{E2eError, E2eResult, Page};
use tokio::time::{sleep, Instant};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Something observable on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Visible(String),
    Absent(String),
    Count(String, usize),
    UrlContains(String),
    UrlIs(String),
    TextVisible(String),
    TextAbsent(String),
    InputValue(String, String),
    /// Input holds any non-empty value
    Filled(String),
    Focused(String),
    /// Holds as soon as one of the inner conditions does
    Any(Vec<Condition>),
}

impl Condition {
    pub fn visible(selector: &str) -> Self {
        Condition::Visible(selector.to_string())
    }

    pub fn absent(selector: &str) -> Self {
        Condition::Absent(selector.to_string())
    }

    pub fn count(selector: &str, n: usize) -> Self {
        Condition::Count(selector.to_string(), n)
    }

    pub fn url_contains(fragment: &str) -> Self {
        Condition::UrlContains(fragment.to_string())
    }

    pub fn text(text: &str) -> Self {
        Condition::TextVisible(text.to_string())
    }

    pub fn no_text(text: &str) -> Self {
        Condition::TextAbsent(text.to_string())
    }

    /// Evaluate once. A missing element counts as "not yet".
    pub async fn holds(&self, page: &mut dyn Page) -> E2eResult<bool> {
        match self {
            Condition::Any(inner) => {
                for c in inner {
                    if c.holds_leaf(page).await? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            leaf => leaf.holds_leaf(page).await,
        }
    }

    // `Any` does not nest
    async fn holds_leaf(&self, page: &mut dyn Page) -> E2eResult<bool> {
        let result = match self {
            Condition::Visible(sel) => page.is_visible(sel).await,
            Condition::Absent(sel) => page.count(sel).await.map(|n| n == 0),
            Condition::Count(sel, n) => page.count(sel).await.map(|c| c == *n),
            Condition::UrlContains(frag) => page
                .current_url()
                .await
                .map(|u| u.contains(frag.as_str())),
            Condition::UrlIs(url) => page.current_url().await.map(|u| u == *url),
            Condition::TextVisible(text) => page.text_visible(text).await,
            Condition::TextAbsent(text) => page.text_visible(text).await.map(|v| !v),
            Condition::InputValue(sel, want) => page.input_value(sel).await.map(|v| v == *want),
            Condition::Filled(sel) => page.input_value(sel).await.map(|v| !v.is_empty()),
            Condition::Focused(id) => page
                .focused_id()
                .await
                .map(|f| f.as_deref() == Some(id.as_str())),
            Condition::Any(_) => Ok(false),
        };
        match result {
            Err(E2eError::ElementNotFound(_)) => Ok(false),
            other => other,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Visible(sel) => write!(f, "{} to be visible", sel),
            Condition::Absent(sel) => write!(f, "{} to not exist", sel),
            Condition::Count(sel, n) => write!(f, "{} to match {} element(s)", sel, n),
            Condition::UrlContains(frag) => write!(f, "url to include {:?}", frag),
            Condition::UrlIs(url) => write!(f, "url to equal {:?}", url),
            Condition::TextVisible(text) => write!(f, "text {:?} to be visible", text),
            Condition::TextAbsent(text) => write!(f, "text {:?} to not exist", text),
            Condition::InputValue(sel, v) => write!(f, "{} to have value {:?}", sel, v),
            Condition::Filled(sel) => write!(f, "{} to have a value", sel),
            Condition::Focused(id) => write!(f, "#{} to be focused", id),
            Condition::Any(inner) => {
                let parts: Vec<String> = inner.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(" or "))
            }
        }
    }
}

/// Poll `condition` until it holds or `policy.timeout` elapses
pub async fn until(page: &mut dyn Page, condition: &Condition, policy: &WaitPolicy) -> E2eResult<()> {
    let start = Instant::now();
    let deadline = start + policy.timeout;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        if condition.holds(page).await? {
            trace!(%condition, attempts, "condition met");
            return Ok(());
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(E2eError::Timeout {
                condition: condition.to_string(),
                waited_ms: now.duration_since(start).as_millis() as u64,
            });
        }
        sleep(policy.poll_interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_reads_as_alternatives() {
        let c = Condition::Any(vec![
            Condition::url_contains("/contactList"),
            Condition::visible("#error"),
        ]);
        assert_eq!(
            c.to_string(),
            "url to include \"/contactList\" or #error to be visible"
        );
    }

    #[test]
    fn default_policy_matches_command_timeout() {
        let p = WaitPolicy::default();
        assert_eq!(p.timeout, Duration::from_secs(10));
        assert!(p.poll_interval < p.timeout);
    }
}
