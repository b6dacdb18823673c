//! Interactive smoke check: open a search page, type a query, and hold the
//! window open until the operator presses Enter.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::conditions::wait_for_element;
use crate::driver::{Browser, By, Key};
use crate::error::E2eResult;
use crate::wait::WaitConfig;

#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub url: String,
    pub query: String,
    pub search_box: By,
    pub wait: WaitConfig,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            url: "https://www.google.com".to_string(),
            query: "hello world".to_string(),
            search_box: By::class_name("gLFyf"),
            wait: WaitConfig::default(),
        }
    }
}

/// Run the search, wait for one line on `pause`, then quit the session.
///
/// The session is closed on every path; a search failure is returned after
/// the quit.
pub async fn run_demo<R>(browser: Browser, options: &DemoOptions, pause: R) -> E2eResult<()>
where
    R: AsyncBufRead + Unpin,
{
    let outcome = search_and_pause(&browser, options, pause).await;

    if let Err(e) = browser.quit().await {
        warn!("Failed to close demo session: {}", e);
    }
    outcome
}

async fn search_and_pause<R>(browser: &Browser, options: &DemoOptions, mut pause: R) -> E2eResult<()>
where
    R: AsyncBufRead + Unpin,
{
    browser.goto(&options.url).await?;

    let search_box = wait_for_element(browser, &options.search_box, options.wait).await?;
    search_box.send_keys(&options.query).await?;
    search_box.send_keys(Key::ENTER).await?;
    info!("Searched for '{}'; press Enter to close the browser", options.query);

    let mut line = String::new();
    pause.read_line(&mut line).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeBrowser, FakeElement};

    #[tokio::test]
    async fn types_query_then_quits() {
        let fake = FakeBrowser::default();
        fake.add(FakeElement::new("q").locator(By::class_name("gLFyf")));

        run_demo(fake.browser(), &DemoOptions::default(), &b"\n"[..])
            .await
            .unwrap();

        assert_eq!(fake.with_page(|page| page.value_of("q")), "hello world\u{E007}");
        assert_eq!(fake.with_page(|page| page.location.clone()), "https://www.google.com");
        assert_eq!(fake.quit_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn quits_even_when_search_box_never_appears() {
        let fake = FakeBrowser::default();

        let err = run_demo(fake.browser(), &DemoOptions::default(), &b""[..])
            .await
            .unwrap_err();

        assert!(err.is_timeout_or_missing());
        assert_eq!(fake.quit_count(), 1);
    }
}
