//! Secure browser harness.
//!
//! Rendering happens in a short-lived helper process: an inline Playwright
//! script executed via `node -e`, one process per request, talking JSON over
//! stdout. Chromium is launched with `--host-resolver-rules` mapping the
//! validated hostname to the already-resolved IP, so navigation never
//! performs a second DNS lookup (the rebinding window is closed before the
//! process starts). Every other hostname resolves to NOTFOUND.
//!
//! The helper closes the browser in `finally` on every exit path; if launch
//! itself fails there is nothing to close. On the Rust side the process is
//! killed when it outlives the hard process timeout.

use std::fs;
use std::io;
use std::net::IpAddr;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::extract::dom::RawDomColors;
use crate::extract::style_vars::StyleVariables;
use crate::validator::ValidatedTarget;
use crate::{BexError, Result, Viewport};

const CAPTURE_SCRIPT: &str = r#"
const [, , url, resolverRules, width, height, navTimeout, idleTimeout, screenshotPath, headlessFlag] = process.argv;

function fail(phase, err) {
  const message = err && err.message ? err.message : String(err);
  console.error(JSON.stringify({ status: 'error', phase, message }));
  process.exitCode = 1;
}

async function run() {
  let browser;
  try {
    const { chromium } = require('playwright');
    const navMs = parseInt(navTimeout, 10);
    const idleMs = parseInt(idleTimeout, 10);

    try {
      browser = await chromium.launch({
        headless: headlessFlag !== '0',
        args: [
          '--host-resolver-rules=' + resolverRules,
          '--disable-dev-shm-usage'
        ]
      });
    } catch (err) {
      fail('launch', err);
      return;
    }

    let page;
    try {
      const context = await browser.newContext({
        viewport: {
          width: parseInt(width, 10),
          height: parseInt(height, 10)
        }
      });
      page = await context.newPage();
      page.setDefaultTimeout(navMs);
    } catch (err) {
      fail('page', err);
      return;
    }

    try {
      await page.goto(url, { waitUntil: 'networkidle', timeout: navMs });
      await page.waitForLoadState('networkidle', { timeout: idleMs });
    } catch (err) {
      fail('navigate', err);
      return;
    }

    // Declared custom properties on the document root. Read-only; any
    // failure (cross-origin sheets, CSP) degrades to found=false.
    let styleVars = { found: false, colors: [] };
    try {
      styleVars = await page.evaluate(() => {
        const seen = new Map();
        const rootStyle = window.getComputedStyle(document.documentElement);
        for (const sheet of Array.from(document.styleSheets)) {
          let rules;
          try { rules = sheet.cssRules; } catch (e) { continue; }
          for (const rule of Array.from(rules || [])) {
            if (!rule.selectorText || !rule.selectorText.includes(':root')) continue;
            for (const name of Array.from(rule.style || [])) {
              if (!name.startsWith('--') || seen.has(name)) continue;
              const value = rootStyle.getPropertyValue(name).trim()
                || rule.style.getPropertyValue(name).trim();
              if (value) seen.set(name, value);
            }
          }
        }
        return { found: seen.size > 0, colors: Array.from(seen.entries()) };
      });
    } catch (err) {
      styleVars = { found: false, colors: [] };
    }

    // Effective colors of the five semantic element categories. Each
    // category degrades to an empty list on its own failure.
    let domColors = {};
    try {
      domColors = await page.evaluate(() => {
        const pick = (el, props) => {
          const style = window.getComputedStyle(el);
          for (const prop of props) {
            const value = style.getPropertyValue(prop);
            if (value && value !== 'none' && value !== 'transparent'
                && value !== 'rgba(0, 0, 0, 0)') {
              return value;
            }
          }
          return null;
        };
        const collect = (selector, props) => {
          const out = [];
          for (const el of Array.from(document.querySelectorAll(selector)).slice(0, 20)) {
            const value = pick(el, props);
            if (value) out.push(value);
          }
          return out;
        };
        const categories = {
          logo: ['[class*="logo"], [id*="logo"], header img, header svg',
                 ['fill', 'color', 'background-color']],
          cta: ['button, [class*="btn"], [class*="cta"], a[class*="button"]',
                ['background-color']],
          navigation: ['nav, header, [class*="nav"]', ['background-color']],
          headings: ['h1, h2, h3', ['color']],
          accent: ['[class*="accent"], [class*="badge"], [class*="tag"], [class*="highlight"]',
                   ['background-color', 'color']]
        };
        const out = {};
        for (const [category, [selector, props]] of Object.entries(categories)) {
          try { out[category] = collect(selector, props); } catch (e) { out[category] = []; }
        }
        return out;
      });
    } catch (err) {
      domColors = {};
    }

    let screenshotOk = true;
    try {
      await page.screenshot({ path: screenshotPath, fullPage: false });
    } catch (err) {
      screenshotOk = false;
    }

    console.log(JSON.stringify({ status: 'ok', styleVars, domColors, screenshotOk }));
  } catch (err) {
    fail('capture', err);
  } finally {
    if (browser) {
      await browser.close();
    }
  }
}

run();
"#;

pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_NETWORK_IDLE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(45);
const NODE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const PLAYWRIGHT_CHECK_SCRIPT: &str = "require('playwright'); process.stdout.write('ok');";

/// Configuration for one sandboxed capture.
#[derive(Debug, Clone)]
pub struct SecureBrowserOptions {
    pub node_command: String,
    pub viewport: Viewport,
    pub headless: bool,
    pub navigation_timeout: Duration,
    pub network_idle_timeout: Duration,
    pub process_timeout: Duration,
}

impl Default for SecureBrowserOptions {
    fn default() -> Self {
        Self {
            node_command: "node".to_string(),
            viewport: Viewport::default(),
            headless: true,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            network_idle_timeout: DEFAULT_NETWORK_IDLE_TIMEOUT,
            process_timeout: DEFAULT_PROCESS_TIMEOUT,
        }
    }
}

/// Raw signals collected from a rendered page in one helper run.
#[derive(Debug, Clone)]
pub struct PageSignals {
    pub style_vars: StyleVariables,
    pub dom_colors: RawDomColors,
    /// PNG bytes of the viewport; None when the screenshot stage failed.
    pub screenshot: Option<Vec<u8>>,
}

/// Chromium resolver rules pinning the validated hostname to its resolved
/// address. Everything else maps to NOTFOUND so the sandbox cannot be used
/// to reach hosts that never passed validation.
fn host_resolver_rules(hostname: &str, resolved_ip: IpAddr) -> String {
    let addr = match resolved_ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{}]", v6),
    };
    format!("MAP {} {},MAP * ~NOTFOUND", hostname, addr)
}

/// Renders the validated target and collects all page signals.
///
/// One helper process per call; the hard process timeout bounds launch,
/// navigation, extraction, and screenshot together. Launch, page, and
/// navigation failures surface as phase-tagged [`BexError::Browser`] values;
/// style-variable and DOM collection degrade inside the script instead of
/// failing the run.
pub async fn capture_page(
    target: &ValidatedTarget,
    screenshot_path: &Path,
    options: &SecureBrowserOptions,
) -> Result<PageSignals> {
    ensure_node_available(&options.node_command).await?;
    ensure_playwright_available(&options.node_command).await?;

    if let Some(parent) = screenshot_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| BexError::Config(format!("Failed to create screenshot dir: {}", e)))?;
    }

    let rules = host_resolver_rules(&target.hostname, target.resolved_ip);

    let mut cmd = Command::new(&options.node_command);
    cmd.arg("-e")
        .arg(CAPTURE_SCRIPT)
        .arg(target.url.as_str())
        .arg(&rules)
        .arg(options.viewport.width.to_string())
        .arg(options.viewport.height.to_string())
        .arg(options.navigation_timeout.as_millis().to_string())
        .arg(options.network_idle_timeout.as_millis().to_string())
        .arg(screenshot_path.to_string_lossy().to_string())
        .arg(if options.headless { "1" } else { "0" })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let start = Instant::now();
    let mut child = cmd
        .spawn()
        .map_err(|err| map_spawn_error(err, &options.node_command))?;

    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_pipe {
            let _ = out.read_to_end(&mut buf).await;
        }
        buf
    });

    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_pipe {
            let _ = err.read_to_end(&mut buf).await;
        }
        buf
    });

    let status = match timeout(options.process_timeout, child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(err)) => return Err(BexError::Io(err)),
        Err(_) => {
            let _ = child.kill().await;
            let _ = child.wait().await;
            return Err(BexError::browser(
                "timeout",
                format!("render exceeded {:?}", options.process_timeout),
            ));
        }
    };

    let stdout = stdout_task.await.unwrap_or_else(|_| Vec::new());
    let stderr = stderr_task.await.unwrap_or_else(|_| Vec::new());

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr);
        return Err(map_capture_error(status.to_string(), &stderr));
    }

    let stdout = String::from_utf8_lossy(&stdout);
    let outcome: CaptureOutcome = serde_json::from_str(&stdout).map_err(|e| {
        BexError::browser(
            "protocol",
            format!("unexpected helper output: {} - raw: {}", e, stdout.trim()),
        )
    })?;

    if outcome.status != "ok" {
        return Err(BexError::browser(
            "capture",
            format!("helper returned non-ok status: {}", outcome.status),
        ));
    }

    let screenshot = if outcome.screenshot_ok {
        fs::read(screenshot_path).ok()
    } else {
        None
    };

    tracing::debug!(
        host = %target.hostname,
        elapsed_ms = start.elapsed().as_millis() as u64,
        vars = outcome.style_vars.as_ref().map(|v| v.colors.len()).unwrap_or(0),
        screenshot = screenshot.is_some(),
        "page captured"
    );

    Ok(PageSignals {
        style_vars: outcome.style_vars.unwrap_or_default(),
        dom_colors: outcome.dom_colors.unwrap_or_default(),
        screenshot,
    })
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptureOutcome {
    status: String,
    #[serde(default)]
    style_vars: Option<StyleVariables>,
    #[serde(default)]
    dom_colors: Option<RawDomColors>,
    #[serde(default)]
    screenshot_ok: bool,
}

#[derive(Debug, serde::Deserialize)]
struct ScriptError {
    #[allow(dead_code)]
    status: String,
    phase: Option<String>,
    message: String,
}

fn map_spawn_error(err: io::Error, command: &str) -> BexError {
    if err.kind() == io::ErrorKind::NotFound {
        BexError::Config(format!(
            "Unable to spawn render helper; '{}' was not found on PATH",
            command
        ))
    } else {
        BexError::Io(err)
    }
}

fn map_capture_error(status_text: impl Into<String>, stderr: &str) -> BexError {
    if let Ok(error) = serde_json::from_str::<ScriptError>(stderr) {
        if error
            .message
            .to_ascii_lowercase()
            .contains("cannot find module 'playwright'")
        {
            return missing_playwright_error();
        }
        return BexError::browser(
            error.phase.unwrap_or_else(|| "capture".to_string()),
            error.message,
        );
    }

    if stderr
        .to_ascii_lowercase()
        .contains("cannot find module 'playwright'")
    {
        return missing_playwright_error();
    }

    BexError::browser(
        "process",
        format!("helper exited with status {}: {}", status_text.into(), stderr.trim()),
    )
}

fn missing_playwright_error() -> BexError {
    BexError::Config(
        "Playwright npm package is missing; install with `npm install playwright`.".to_string(),
    )
}

async fn ensure_node_available(node_command: &str) -> Result<()> {
    let mut cmd = Command::new(node_command);
    cmd.arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let status = tokio::time::timeout(NODE_CHECK_TIMEOUT, cmd.status())
        .await
        .map_err(|_| {
            BexError::Config(format!(
                "Timed out checking node availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !status.success() {
        return Err(BexError::Config(format!(
            "Node command {:?} is not available (exit {})",
            node_command, status
        )));
    }

    Ok(())
}

async fn ensure_playwright_available(node_command: &str) -> Result<()> {
    let mut cmd = Command::new(node_command);
    cmd.arg("-e")
        .arg(PLAYWRIGHT_CHECK_SCRIPT)
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let output = tokio::time::timeout(NODE_CHECK_TIMEOUT, cmd.output())
        .await
        .map_err(|_| {
            BexError::Config(format!(
                "Timed out checking Playwright availability after {:?}",
                NODE_CHECK_TIMEOUT
            ))
        })?
        .map_err(|err| map_spawn_error(err, node_command))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(map_capture_error(format!("{:?}", output.status), &stderr));
    }

    Ok(())
}
