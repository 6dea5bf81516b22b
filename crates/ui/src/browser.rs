//! Playwright-backed session: a long-lived node driver process
//!
//! One `node` child runs for the whole session, holding the browser open so
//! navigation state survives across actions. Commands and replies are
//! single-line JSON over the child's stdin/stdout:
//!
//! ```text
//! > {"cmd":"click","selector":"[data-testid=\"save\"]"}
//! < {"ok":true}
//! > {"cmd":"text","selector":"[data-testid=\"title\"]"}
//! < {"ok":true,"value":"EVM User alice"}
//! < {"ok":false,"kind":"timeout","error":"Timeout 5000ms exceeded"}
//! ```

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{UiError, UiResult};
use crate::session::UiSession;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
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

    pub fn parse(name: &str) -> Self {
        match name {
            "firefox" => Browser::Firefox,
            "webkit" => Browser::Webkit,
            _ => Browser::Chromium,
        }
    }
}

/// Configuration for a browser session
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub base_url: String,
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub action_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            action_timeout: Duration::from_secs(5),
        }
    }
}

/// The JavaScript side of the driver protocol. Reads one JSON command per
/// stdin line, replies with one JSON line on stdout.
const DRIVER_JS: &str = r#"
const readline = require('readline');
const { chromium, firefox, webkit } = require('playwright');

const [browserName, headless, width, height, timeout] = process.argv.slice(2);
const engines = { chromium, firefox, webkit };

(async () => {
  const browser = await engines[browserName].launch({ headless: headless === 'true' });
  const context = await browser.newContext({
    viewport: { width: Number(width), height: Number(height) }
  });
  const page = await context.newPage();
  page.setDefaultTimeout(Number(timeout));

  let acceptNext = 0;
  page.on('dialog', async (dialog) => {
    if (acceptNext > 0) {
      acceptNext -= 1;
      await dialog.accept();
    } else {
      await dialog.dismiss();
    }
  });

  async function requireElement(selector) {
    if (await page.locator(selector).count() === 0) {
      const err = new Error('no element matching ' + selector);
      err.kind = 'notfound';
      throw err;
    }
  }

  async function run(msg) {
    switch (msg.cmd) {
      case 'goto':
        await page.goto(msg.url);
        return {};
      case 'click':
        await requireElement(msg.selector);
        await page.click(msg.selector);
        return {};
      case 'fill':
        await requireElement(msg.selector);
        await page.fill(msg.selector, msg.value);
        return {};
      case 'select':
        await requireElement(msg.selector);
        await page.selectOption(msg.selector, msg.value);
        return {};
      case 'check':
        await requireElement(msg.selector);
        if (msg.checked) { await page.check(msg.selector); }
        else { await page.uncheck(msg.selector); }
        return {};
      case 'wait':
        await page.waitForSelector(msg.selector, { state: 'visible', timeout: msg.timeout });
        return {};
      case 'text':
        await requireElement(msg.selector);
        return { value: await page.locator(msg.selector).first().innerText() };
      case 'texts':
        return { value: await page.locator(msg.selector).allInnerTexts() };
      case 'visible':
        return { value: await page.locator(msg.selector).first().isVisible().catch(() => false) };
      case 'accept_dialog':
        acceptNext += 1;
        return {};
      case 'url':
        return { value: new URL(page.url()).pathname };
      case 'close':
        await browser.close();
        process.exit(0);
      default:
        throw new Error('unknown command: ' + msg.cmd);
    }
  }

  const rl = readline.createInterface({ input: process.stdin });
  process.stdout.write(JSON.stringify({ ok: true, ready: true }) + '\n');
  for await (const line of rl) {
    if (!line.trim()) continue;
    let reply;
    try {
      const result = await run(JSON.parse(line));
      reply = Object.assign({ ok: true }, result);
    } catch (err) {
      const kind = err.kind || (String(err.message).includes('Timeout') ? 'timeout' : 'script');
      reply = { ok: false, kind, error: String(err.message) };
    }
    process.stdout.write(JSON.stringify(reply) + '\n');
  }
  await browser.close();
})().catch((err) => {
  process.stdout.write(JSON.stringify({ ok: false, kind: 'script', error: String(err) }) + '\n');
  process.exit(1);
});
"#;

struct DriverProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// A real browser session driven through Playwright.
pub struct PlaywrightSession {
    base_url: String,
    action_timeout: Duration,
    driver: Mutex<DriverProcess>,
    // Keeps driver.js alive for the session lifetime.
    _workdir: tempfile::TempDir,
}

impl PlaywrightSession {
    /// Launch the browser. Fails with [`UiError::PlaywrightNotFound`] when
    /// the Playwright CLI is not installed.
    pub fn new(config: BrowserConfig) -> UiResult<Self> {
        Self::check_playwright_installed()?;

        let workdir = tempfile::tempdir()?;
        let script_path = workdir.path().join("driver.js");
        std::fs::write(&script_path, DRIVER_JS)?;

        debug!(
            browser = config.browser.as_str(),
            headless = config.headless,
            "launching browser driver"
        );

        let mut child = Command::new("node")
            .arg(&script_path)
            .arg(config.browser.as_str())
            .arg(config.headless.to_string())
            .arg(config.viewport_width.to_string())
            .arg(config.viewport_height.to_string())
            .arg(config.action_timeout.as_millis().to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| UiError::Driver("driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| UiError::Driver("driver stdout unavailable".to_string()))?;

        let mut driver = DriverProcess {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };

        // The driver announces readiness once the browser is up.
        let ready = Self::read_reply(&mut driver)?;
        if ready.get("ready").and_then(Value::as_bool) != Some(true) {
            return Err(UiError::Driver(format!("unexpected ready reply: {ready}")));
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            action_timeout: config.action_timeout,
            driver: Mutex::new(driver),
            _workdir: workdir,
        })
    }

    fn check_playwright_installed() -> UiResult<()> {
        let status = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(UiError::PlaywrightNotFound),
        }
    }

    fn read_reply(driver: &mut DriverProcess) -> UiResult<Value> {
        let mut line = String::new();
        if driver.stdout.read_line(&mut line)? == 0 {
            return Err(UiError::Driver("driver exited unexpectedly".to_string()));
        }
        Ok(serde_json::from_str(line.trim())?)
    }

    fn send(&self, cmd: Value, selector: &str) -> UiResult<Value> {
        let mut driver = self.driver.lock();

        let mut line = cmd.to_string();
        line.push('\n');
        driver.stdin.write_all(line.as_bytes())?;
        driver.stdin.flush()?;

        let reply = Self::read_reply(&mut driver)?;
        if reply.get("ok").and_then(Value::as_bool) == Some(true) {
            return Ok(reply.get("value").cloned().unwrap_or(Value::Null));
        }

        let message = reply
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown driver error")
            .to_string();
        match reply.get("kind").and_then(Value::as_str) {
            Some("notfound") => Err(UiError::CandidateNotFound {
                selector: selector.to_string(),
            }),
            Some("timeout") => Err(UiError::Timeout {
                selector: selector.to_string(),
            }),
            _ => Err(UiError::Script(message)),
        }
    }
}

impl UiSession for PlaywrightSession {
    fn goto(&self, path: &str) -> UiResult<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "goto");
        self.send(json!({ "cmd": "goto", "url": url }), path)?;
        Ok(())
    }

    fn click(&self, selector: &str) -> UiResult<()> {
        self.send(json!({ "cmd": "click", "selector": selector }), selector)?;
        Ok(())
    }

    fn fill(&self, selector: &str, value: &str) -> UiResult<()> {
        self.send(
            json!({ "cmd": "fill", "selector": selector, "value": value }),
            selector,
        )?;
        Ok(())
    }

    fn select_option(&self, selector: &str, value: &str) -> UiResult<()> {
        self.send(
            json!({ "cmd": "select", "selector": selector, "value": value }),
            selector,
        )?;
        Ok(())
    }

    fn set_checkbox(&self, selector: &str, checked: bool) -> UiResult<()> {
        self.send(
            json!({ "cmd": "check", "selector": selector, "checked": checked }),
            selector,
        )?;
        Ok(())
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> UiResult<()> {
        self.send(
            json!({
                "cmd": "wait",
                "selector": selector,
                "timeout": timeout.as_millis() as u64,
            }),
            selector,
        )?;
        Ok(())
    }

    fn text_of(&self, selector: &str) -> UiResult<String> {
        let value = self.send(json!({ "cmd": "text", "selector": selector }), selector)?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    fn texts_of(&self, selector: &str) -> UiResult<Vec<String>> {
        let value = self.send(json!({ "cmd": "texts", "selector": selector }), selector)?;
        Ok(value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn is_visible(&self, selector: &str) -> UiResult<bool> {
        let value = self.send(json!({ "cmd": "visible", "selector": selector }), selector)?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn accept_alert(&self) -> UiResult<()> {
        self.send(json!({ "cmd": "accept_dialog" }), "")?;
        Ok(())
    }

    fn current_path(&self) -> UiResult<String> {
        let value = self.send(json!({ "cmd": "url" }), "")?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}

impl Drop for PlaywrightSession {
    fn drop(&mut self) {
        let mut driver = self.driver.lock();
        let _ = driver.stdin.write_all(b"{\"cmd\":\"close\"}\n");
        let _ = driver.stdin.flush();
        std::thread::sleep(self.action_timeout.min(Duration::from_millis(500)));
        if let Ok(None) = driver.child.try_wait() {
            warn!("driver did not exit on close, killing");
            let _ = driver.child.kill();
        }
        let _ = driver.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_names_round_trip() {
        for browser in [Browser::Chromium, Browser::Firefox, Browser::Webkit] {
            assert_eq!(Browser::parse(browser.as_str()), browser);
        }
        assert_eq!(Browser::parse("unknown"), Browser::Chromium);
    }

    #[test]
    fn driver_script_covers_every_command() {
        for cmd in [
            "goto", "click", "fill", "select", "check", "wait", "text", "texts", "visible",
            "accept_dialog", "url", "close",
        ] {
            assert!(
                DRIVER_JS.contains(&format!("case '{cmd}':")),
                "driver script missing command {cmd}"
            );
        }
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let config = BrowserConfig {
            base_url: "http://127.0.0.1:8080/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.base_url.trim_end_matches('/'), "http://127.0.0.1:8080");
    }
}
