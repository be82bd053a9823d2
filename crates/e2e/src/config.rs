//! Suite configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use contactlist_common::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};

use crate::playwright::{Browser, PlaywrightConfig};
use crate::wait::WaitPolicy;

pub const DEFAULT_BASE_URL: &str = "https://thinking-tester-contact-list.herokuapp.com";

/// Runner configuration
///
/// Resolved in three layers: an optional TOML file, then `CONTACT_LIST_*`
/// environment variables, then command line flags applied by the harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Application under test
    pub base_url: String,

    /// Deadline for every DOM condition wait
    pub command_timeout_ms: u64,

    /// Deadline for each REST call
    pub request_timeout_ms: u64,

    /// How often a pending condition is re-checked
    pub poll_interval_ms: u64,

    pub viewport_width: u32,
    pub viewport_height: u32,

    pub browser: Browser,
    pub headless: bool,

    /// Capture the page when a UI scenario fails
    pub screenshot_on_failure: bool,
    pub screenshot_dir: PathBuf,

    /// Where `test-results.json` is written
    pub output_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            command_timeout_ms: 10_000,
            request_timeout_ms: 10_000,
            poll_interval_ms: 100,
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
            screenshot_on_failure: true,
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

impl SuiteConfig {
    /// Load configuration from file, falling back to defaults when it is absent
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> E2eResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `CONTACT_LIST_*` overrides from the process environment
    pub fn apply_env(&mut self) -> E2eResult<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> E2eResult<()> {
        if let Some(url) = lookup("CONTACT_LIST_BASE_URL") {
            self.base_url = url;
        }
        if let Some(ms) = lookup("CONTACT_LIST_COMMAND_TIMEOUT_MS") {
            self.command_timeout_ms = parse_ms("CONTACT_LIST_COMMAND_TIMEOUT_MS", &ms)?;
        }
        if let Some(ms) = lookup("CONTACT_LIST_REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = parse_ms("CONTACT_LIST_REQUEST_TIMEOUT_MS", &ms)?;
        }
        if let Some(browser) = lookup("CONTACT_LIST_BROWSER") {
            self.browser = browser.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> E2eResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.command_timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(E2eError::Config("timeouts must be non-zero".into()));
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > self.command_timeout_ms {
            return Err(E2eError::Config(format!(
                "poll_interval_ms must be between 1 and command_timeout_ms ({})",
                self.command_timeout_ms
            )));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            timeout: Duration::from_millis(self.command_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn playwright(&self) -> PlaywrightConfig {
        PlaywrightConfig {
            base_url: self.base_url().to_string(),
            screenshot_dir: self.screenshot_dir.clone(),
            viewport_width: self.viewport_width,
            viewport_height: self.viewport_height,
            browser: self.browser,
            headless: self.headless,
            ..Default::default()
        }
    }
}

fn parse_ms(key: &str, value: &str) -> E2eResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| E2eError::Config(format!("{} must be milliseconds, got {:?}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_the_hosted_app() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.wait_policy().timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!((config.viewport_width, config.viewport_height), (1280, 720));
        config.validate().unwrap();
    }

    #[test]
    fn toml_overrides_only_named_fields() {
        let config = SuiteConfig::from_toml(
            r#"
base_url = "http://127.0.0.1:3000/"
command_timeout_ms = 2500
browser = "firefox"
"#,
        )
        .unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:3000");
        assert_eq!(config.command_timeout_ms, 2500);
        assert_eq!(config.browser, Browser::Firefox);
        assert_eq!(config.request_timeout_ms, 10_000);
        assert!(config.screenshot_on_failure);
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("CONTACT_LIST_BASE_URL", "http://localhost:8080"),
            ("CONTACT_LIST_REQUEST_TIMEOUT_MS", "500"),
            ("CONTACT_LIST_BROWSER", "webkit"),
        ]
        .into_iter()
        .collect();

        let mut config = SuiteConfig::default();
        config
            .apply_env_from(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout_ms, 500);
        assert_eq!(config.browser, Browser::Webkit);
        assert_eq!(config.command_timeout_ms, 10_000);
    }

    #[test]
    fn bad_env_values_are_config_errors() {
        let mut config = SuiteConfig::default();
        let err = config
            .apply_env_from(|k| (k == "CONTACT_LIST_COMMAND_TIMEOUT_MS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, E2eError::Config(_)));
    }

    #[test]
    fn validate_rejects_nonsense() {
        let mut config = SuiteConfig {
            base_url: "ftp://example.com".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.base_url = "http://ok".into();
        config.poll_interval_ms = 20_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = SuiteConfig::load(Path::new("/nonexistent/contact-list.toml")).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
