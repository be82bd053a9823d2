//! Playwright browser automation
//!
//! A single `node` process per page runs [`DRIVER_SCRIPT`], which owns the
//! browser and answers one JSON command per stdin line with one JSON reply
//! per stdout line. Commands act once; waiting stays on the Rust side.

use std::path::PathBuf;
use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use contactlist_common::{E2eError, E2eResult, Page, PageFactory};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(format!("unknown browser {:?}", other))),
        }
    }
}

impl std::fmt::Display for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub screenshot_dir: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub browser: Browser,
    pub headless: bool,
    /// Upper bound for a single click/fill once the element exists
    pub action_timeout: Duration,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
            action_timeout: Duration::from_secs(2),
        }
    }
}

/// Check if Playwright is installed
pub async fn check_playwright_installed() -> E2eResult<()> {
    let status = Command::new("npx")
        .args(["playwright", "--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => Ok(()),
        _ => Err(E2eError::PlaywrightNotFound),
    }
}

/// One command sent to the driver
#[derive(Debug, Serialize)]
struct DriverRequest<'a> {
    id: u64,
    op: &'a str,
    #[serde(flatten)]
    args: Value,
}

/// One reply from the driver
#[derive(Debug, Deserialize)]
struct DriverResponse {
    id: u64,
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, rename = "notFound")]
    not_found: Option<String>,
}

impl DriverResponse {
    fn into_result(self) -> E2eResult<Value> {
        if self.ok {
            return Ok(self.value);
        }
        if let Some(selector) = self.not_found {
            return Err(E2eError::ElementNotFound(selector));
        }
        Err(E2eError::Playwright(
            self.error.unwrap_or_else(|| "unknown driver error".to_string()),
        ))
    }
}

/// Browser page driven through a long-lived Playwright process
pub struct PlaywrightPage {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    screenshot_dir: PathBuf,
    // keeps driver.js alive as long as the process
    _script_dir: TempDir,
}

impl PlaywrightPage {
    pub async fn launch(config: &PlaywrightConfig) -> E2eResult<Self> {
        tokio::fs::create_dir_all(&config.screenshot_dir).await?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        tokio::fs::write(&script_path, DRIVER_SCRIPT).await?;

        debug!("Launching Playwright driver: {}", script_path.display());
        let mut child = Command::new("node")
            .arg(&script_path)
            .env("CL_BASE_URL", &config.base_url)
            .env("CL_BROWSER", config.browser.as_str())
            .env("CL_HEADLESS", if config.headless { "1" } else { "0" })
            .env("CL_VIEWPORT_WIDTH", config.viewport_width.to_string())
            .env("CL_VIEWPORT_HEIGHT", config.viewport_height.to_string())
            .env("CL_ACTION_TIMEOUT_MS", config.action_timeout.as_millis().to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => E2eError::PlaywrightNotFound,
                _ => E2eError::Io(e),
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Driver("driver stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Driver("driver stdout unavailable".into()))?;

        let mut page = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 0,
            screenshot_dir: config.screenshot_dir.clone(),
            _script_dir: script_dir,
        };

        // the driver answers this only once the browser is up
        page.call("ready", json!({})).await?;
        info!("{} ready ({}x{})", config.browser, config.viewport_width, config.viewport_height);
        Ok(page)
    }

    async fn call(&mut self, op: &str, args: Value) -> E2eResult<Value> {
        self.next_id += 1;
        let id = self.next_id;

        let mut line = serde_json::to_string(&DriverRequest { id, op, args })?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        loop {
            let Some(line) = self.stdout.next_line().await? else {
                return Err(E2eError::Driver(format!("driver exited during {}", op)));
            };
            match serde_json::from_str::<DriverResponse>(&line) {
                Ok(resp) if resp.id == id => return resp.into_result(),
                Ok(resp) => warn!("dropping stale driver reply {}", resp.id),
                Err(_) => debug!(target: "playwright", "{}", line),
            }
        }
    }

    async fn call_str(&mut self, op: &str, args: Value) -> E2eResult<String> {
        match self.call(op, args).await? {
            Value::String(s) => Ok(s),
            Value::Null => Ok(String::new()),
            other => Ok(other.to_string()),
        }
    }

    async fn call_bool(&mut self, op: &str, args: Value) -> E2eResult<bool> {
        let value = self.call(op, args).await?;
        value
            .as_bool()
            .ok_or_else(|| E2eError::Driver(format!("{} returned {}", op, value)))
    }
}

#[async_trait]
impl Page for PlaywrightPage {
    async fn goto(&mut self, path: &str) -> E2eResult<()> {
        self.call("goto", json!({ "path": path })).await.map(drop)
    }

    async fn current_url(&mut self) -> E2eResult<String> {
        self.call_str("url", json!({})).await
    }

    async fn title(&mut self) -> E2eResult<String> {
        self.call_str("title", json!({})).await
    }

    async fn count(&mut self, selector: &str) -> E2eResult<usize> {
        let value = self.call("count", json!({ "selector": selector })).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| E2eError::Driver(format!("count returned {}", value)))
    }

    async fn is_visible(&mut self, selector: &str) -> E2eResult<bool> {
        self.call_bool("visible", json!({ "selector": selector })).await
    }

    async fn text_visible(&mut self, text: &str) -> E2eResult<bool> {
        self.call_bool("textVisible", json!({ "text": text })).await
    }

    async fn click(&mut self, selector: &str) -> E2eResult<()> {
        self.call("click", json!({ "selector": selector })).await.map(drop)
    }

    async fn click_text(&mut self, text: &str) -> E2eResult<()> {
        self.call("clickText", json!({ "text": text })).await.map(drop)
    }

    async fn fill(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.call("fill", json!({ "selector": selector, "value": value }))
            .await
            .map(drop)
    }

    async fn input_value(&mut self, selector: &str) -> E2eResult<String> {
        self.call_str("inputValue", json!({ "selector": selector })).await
    }

    async fn text_content(&mut self, selector: &str) -> E2eResult<String> {
        self.call_str("text", json!({ "selector": selector })).await
    }

    async fn attribute(&mut self, selector: &str, name: &str) -> E2eResult<Option<String>> {
        let value = self
            .call("attribute", json!({ "selector": selector, "name": name }))
            .await?;
        Ok(value.as_str().map(String::from))
    }

    async fn css_value(&mut self, selector: &str, property: &str) -> E2eResult<String> {
        self.call_str("css", json!({ "selector": selector, "property": property }))
            .await
    }

    async fn press(&mut self, key: &str) -> E2eResult<()> {
        self.call("press", json!({ "key": key })).await.map(drop)
    }

    async fn focused_id(&mut self) -> E2eResult<Option<String>> {
        let value = self.call("focusedId", json!({})).await?;
        Ok(value.as_str().filter(|s| !s.is_empty()).map(String::from))
    }

    async fn go_back(&mut self) -> E2eResult<()> {
        self.call("back", json!({})).await.map(drop)
    }

    async fn go_forward(&mut self) -> E2eResult<()> {
        self.call("forward", json!({})).await.map(drop)
    }

    async fn set_viewport(&mut self, width: u32, height: u32) -> E2eResult<()> {
        self.call("viewport", json!({ "width": width, "height": height }))
            .await
            .map(drop)
    }

    async fn abort_requests(&mut self, method: &str, url_suffix: &str) -> E2eResult<()> {
        self.call("abort", json!({ "method": method, "suffix": url_suffix }))
            .await
            .map(drop)
    }

    async fn screenshot(&mut self, name: &str) -> E2eResult<PathBuf> {
        let path = self.screenshot_dir.join(format!("{}.png", name));
        self.call("screenshot", json!({ "path": path.to_string_lossy() }))
            .await?;
        Ok(path)
    }

    async fn close(&mut self) -> E2eResult<()> {
        let result = self.call("close", json!({})).await;
        let _ = self.child.wait().await;
        result.map(drop)
    }
}

/// Launches one Playwright page per scenario
#[derive(Debug, Clone)]
pub struct PlaywrightFactory {
    config: PlaywrightConfig,
}

impl PlaywrightFactory {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PageFactory for PlaywrightFactory {
    async fn open(&self) -> E2eResult<Box<dyn Page>> {
        Ok(Box::new(PlaywrightPage::launch(&self.config).await?))
    }
}

/// Node side of the driver protocol
pub const DRIVER_SCRIPT: &str = r#"
const readline = require('readline');
const playwright = require(require.resolve('playwright', { paths: [process.cwd()] }));

const baseUrl = process.env.CL_BASE_URL;
const actionTimeout = Number(process.env.CL_ACTION_TIMEOUT_MS || 2000);

class NotFound extends Error {
  constructor(selector) { super(`not found: ${selector}`); this.selector = selector; }
}

(async () => {
  const browser = await playwright[process.env.CL_BROWSER || 'chromium'].launch({
    headless: process.env.CL_HEADLESS !== '0',
  });
  const context = await browser.newContext({
    viewport: {
      width: Number(process.env.CL_VIEWPORT_WIDTH || 1280),
      height: Number(process.env.CL_VIEWPORT_HEIGHT || 720),
    },
  });
  const page = await context.newPage();
  page.on('dialog', (dialog) => dialog.accept());

  const first = async (selector) => {
    const loc = page.locator(selector);
    if ((await loc.count()) === 0) throw new NotFound(selector);
    return loc.first();
  };
  const firstText = async (text) => {
    const loc = page.getByText(text);
    if ((await loc.count()) === 0) throw new NotFound(`text=${text}`);
    return loc.last();
  };

  const ops = {
    ready: async () => true,
    goto: async ({ path }) => { await page.goto(path.startsWith('http') ? path : baseUrl + path); },
    url: async () => page.url(),
    title: async () => page.title(),
    count: async ({ selector }) => page.locator(selector).count(),
    visible: async ({ selector }) => page.locator(selector).first().isVisible(),
    textVisible: async ({ text }) => {
      const loc = page.getByText(text);
      const n = await loc.count();
      for (let i = 0; i < n; i++) if (await loc.nth(i).isVisible()) return true;
      return false;
    },
    click: async ({ selector }) => { await (await first(selector)).click({ timeout: actionTimeout }); },
    clickText: async ({ text }) => { await (await firstText(text)).click({ timeout: actionTimeout }); },
    fill: async ({ selector, value }) => { await (await first(selector)).fill(value, { timeout: actionTimeout }); },
    inputValue: async ({ selector }) => (await first(selector)).inputValue({ timeout: actionTimeout }),
    text: async ({ selector }) => (await first(selector)).innerText({ timeout: actionTimeout }),
    attribute: async ({ selector, name }) => (await first(selector)).getAttribute(name, { timeout: actionTimeout }),
    css: async ({ selector, property }) =>
      (await first(selector)).evaluate((el, p) => getComputedStyle(el).getPropertyValue(p), property),
    press: async ({ key }) => { await page.keyboard.press(key); },
    focusedId: async () => page.evaluate(() => (document.activeElement && document.activeElement.id) || null),
    back: async () => { await page.goBack(); },
    forward: async () => { await page.goForward(); },
    viewport: async ({ width, height }) => { await page.setViewportSize({ width, height }); },
    abort: async ({ method, suffix }) => {
      await page.route((url) => url.pathname.endsWith(suffix), (route, request) =>
        request.method() === method.toUpperCase() ? route.abort() : route.continue());
    },
    screenshot: async ({ path }) => { await page.screenshot({ path, fullPage: true }); },
    close: async () => { await browser.close(); },
  };

  const reply = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');
  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    let req;
    try { req = JSON.parse(line); } catch (e) { continue; }
    const op = ops[req.op];
    try {
      if (!op) throw new Error(`unknown op ${req.op}`);
      const value = await op(req);
      reply({ id: req.id, ok: true, value: value === undefined ? null : value });
    } catch (error) {
      if (error instanceof NotFound) reply({ id: req.id, ok: false, notFound: error.selector });
      else reply({ id: req.id, ok: false, error: error.message });
    }
    if (req.op === 'close') process.exit(0);
  }
  await browser.close();
})().catch((error) => {
  process.stderr.write(`driver failed: ${error.stack || error}\n`);
  process.exit(1);
});
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("chromium", Browser::Chromium)]
    #[test_case("Firefox", Browser::Firefox)]
    #[test_case("webkit", Browser::Webkit)]
    #[test_case(" chrome ", Browser::Chromium)]
    fn parses_browser_names(input: &str, expected: Browser) {
        assert_eq!(input.parse::<Browser>().unwrap(), expected);
    }

    #[test]
    fn unknown_browser_is_a_config_error() {
        assert!(matches!("lynx".parse::<Browser>(), Err(E2eError::Config(_))));
    }

    #[test]
    fn requests_flatten_their_arguments() {
        let req = DriverRequest {
            id: 7,
            op: "fill",
            args: json!({ "selector": "#email", "value": "a@b.c" }),
        };
        let line: Value = serde_json::from_str(&serde_json::to_string(&req).unwrap()).unwrap();
        assert_eq!(line, json!({ "id": 7, "op": "fill", "selector": "#email", "value": "a@b.c" }));
    }

    #[test]
    fn not_found_replies_map_to_element_not_found() {
        let resp: DriverResponse =
            serde_json::from_str(r##"{"id":1,"ok":false,"notFound":"#delete"}"##).unwrap();
        assert!(matches!(resp.into_result(), Err(E2eError::ElementNotFound(s)) if s == "#delete"));

        let resp: DriverResponse =
            serde_json::from_str(r#"{"id":2,"ok":false,"error":"Timeout 2000ms exceeded"}"#).unwrap();
        assert!(matches!(resp.into_result(), Err(E2eError::Playwright(_))));

        let resp: DriverResponse = serde_json::from_str(r#"{"id":3,"ok":true,"value":4}"#).unwrap();
        assert_eq!(resp.into_result().unwrap(), json!(4));
    }

    #[test]
    fn driver_script_handles_every_page_operation() {
        for op in [
            "goto:", "url:", "title:", "count:", "visible:", "textVisible:", "click:",
            "clickText:", "fill:", "inputValue:", "text:", "attribute:", "css:", "press:",
            "focusedId:", "back:", "forward:", "viewport:", "abort:", "screenshot:", "close:",
        ] {
            assert!(DRIVER_SCRIPT.contains(op), "driver lacks {}", op);
        }
    }
}
