//! Smoke test against a real Chromium. Requires `PICKER_CHROME_BIN`.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures_util::StreamExt;
use log::info;

use ai_picker::adapter::chromiumoxide::ChromiumoxideBridge;
use ai_picker::bridge::ScriptBridge;
use ai_picker::script::{generate_picker_script, POLL_QUERY};

#[tokio::test]
async fn bridge_evaluates_against_real_chromium() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let chrome_bin = match env::var("PICKER_CHROME_BIN") {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => {
            eprintln!("skipping chromiumoxide integration test: PICKER_CHROME_BIN not set");
            return Ok(());
        }
    };

    if !chrome_bin.exists() {
        eprintln!(
            "skipping chromiumoxide integration test: chrome executable not found at {}",
            chrome_bin.display()
        );
        return Ok(());
    }

    let (mut browser, mut handler) = Browser::launch(
        BrowserConfig::builder()
            .chrome_executable(chrome_bin)
            .build()
            .map_err(|err| anyhow::anyhow!(err))?,
    )
    .await
    .context("failed to launch chromium")?;

    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    let page = browser
        .new_page("https://example.com")
        .await
        .context("failed to open page")?;
    let bridge = ChromiumoxideBridge::new(page);

    let sum = bridge.execute("1 + 1").await.context("evaluate 1 + 1")?;
    assert_eq!(sum, serde_json::json!(2));

    let url = bridge.current_url().await.context("fetch current url")?;
    info!("current url: {url}");
    assert!(url.contains("example.com"));

    let script = generate_picker_script(&HashMap::new()).context("generate picker script")?;
    bridge
        .execute(&script)
        .await
        .context("inject picker bundle")?;

    // No interaction yet, so the session is still pending.
    let pending = bridge.execute(POLL_QUERY).await.context("poll result")?;
    assert!(pending.is_null(), "expected pending result, got {pending}");

    browser.close().await.ok();
    handler_task.abort();
    Ok(())
}
