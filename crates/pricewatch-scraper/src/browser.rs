//! Headless-browser page pool for script-rendered sites.
//!
//! A single shared Chromium process is launched lazily on the first
//! [`PagePool::acquire`]; pages are recycled between crawls and discarded
//! whenever a reset fails, so a broken page is never handed out twice.

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

use crate::error::ScrapeError;

/// A rendered page snapshot: the post-settle DOM serialization and the
/// result of the optional in-page price script.
#[derive(Debug)]
pub struct Rendered {
    pub html: String,
    pub evaluated: Option<String>,
}

/// An exclusively-held browser page.
///
/// A lease is valid until returned through [`PagePool::release`]; holding
/// a page reference past release is impossible because release consumes
/// the lease.
pub struct PageLease {
    page: Page,
    permit: OwnedSemaphorePermit,
}

/// Bounded pool of reusable headless-browser pages.
///
/// The semaphore caps total outstanding pages (idle + leased) at
/// `capacity`, so rendered extraction concurrency is genuinely bounded
/// even when every acquire misses the idle stack.
pub struct PagePool {
    capacity: usize,
    navigation_timeout: Duration,
    settle_delay: Duration,
    permits: Arc<Semaphore>,
    browser: Mutex<Option<Browser>>,
    idle: Mutex<Vec<Page>>,
}

impl PagePool {
    #[must_use]
    pub fn new(capacity: usize, navigation_timeout_secs: u64, settle_ms: u64) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            navigation_timeout: Duration::from_secs(navigation_timeout_secs),
            settle_delay: Duration::from_millis(settle_ms),
            permits: Arc::new(Semaphore::new(capacity)),
            browser: Mutex::new(None),
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Acquires an exclusive page, waiting while `capacity` pages are
    /// already out. Reuses an idle page when one is available, otherwise
    /// opens a new one (launching the shared browser on first use).
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Browser`] if the browser cannot be launched
    /// or a page cannot be opened.
    pub async fn acquire(&self) -> Result<PageLease, ScrapeError> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| ScrapeError::Browser("page pool is closed".to_string()))?;

        if let Some(page) = self.idle.lock().await.pop() {
            return Ok(PageLease { page, permit });
        }

        let page = self.open_page().await?;
        Ok(PageLease { page, permit })
    }

    /// Returns a page to the pool. The page is reset to `about:blank`
    /// first; if the reset fails (page crashed or session closed) it is
    /// discarded and the pool shrinks by one idle page.
    pub async fn release(&self, lease: PageLease) {
        let PageLease { page, permit } = lease;

        match page.goto("about:blank").await {
            Ok(_) => {
                let mut idle = self.idle.lock().await;
                if idle.len() < self.capacity {
                    idle.push(page);
                } else {
                    drop(idle);
                    let _ = page.close().await;
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, "discarding browser page that failed reset");
                let _ = page.close().await;
            }
        }

        drop(permit);
    }

    /// Navigates to `url`, waits the settle delay, optionally runs
    /// `script` in-page, and returns the serialized DOM.
    ///
    /// A navigation that fails because the page's session died is retried
    /// exactly once with a freshly acquired page; any other failure
    /// propagates as-is.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Browser`] on launch, navigation, timeout, or
    /// evaluation failure.
    pub async fn render(&self, url: &str, script: Option<&str>) -> Result<Rendered, ScrapeError> {
        let lease = self.acquire().await?;
        match self.render_on(&lease, url, script).await {
            Ok(rendered) => {
                self.release(lease).await;
                Ok(rendered)
            }
            Err(err) if is_session_error(&err) => {
                tracing::warn!(url, error = %err, "browser session died mid-crawl; retrying once");
                self.release(lease).await;
                let fresh = self.acquire().await?;
                let result = self.render_on(&fresh, url, script).await;
                self.release(fresh).await;
                result
            }
            Err(err) => {
                self.release(lease).await;
                Err(err)
            }
        }
    }

    /// Closes every idle page and the shared browser process.
    pub async fn close(&self) {
        let pages = std::mem::take(&mut *self.idle.lock().await);
        for page in pages {
            let _ = page.close().await;
        }
        if let Some(mut browser) = self.browser.lock().await.take() {
            let _ = browser.close().await;
        }
    }

    async fn render_on(
        &self,
        lease: &PageLease,
        url: &str,
        script: Option<&str>,
    ) -> Result<Rendered, ScrapeError> {
        match tokio::time::timeout(self.navigation_timeout, lease.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => return Err(ScrapeError::Browser(err.to_string())),
            Err(_) => {
                return Err(ScrapeError::Browser(format!(
                    "navigation timed out after {}s",
                    self.navigation_timeout.as_secs()
                )))
            }
        }

        // Give client-side rendering a moment to paint the price block.
        tokio::time::sleep(self.settle_delay).await;

        let evaluated = match script {
            Some(script) => self.evaluate_on::<Option<String>>(lease, script).await?,
            None => None,
        };

        let html = self
            .evaluate_on::<String>(lease, "document.documentElement.outerHTML")
            .await?;

        Ok(Rendered { html, evaluated })
    }

    /// In-page evaluation under the same fixed timeout as navigation, so a
    /// wedged renderer cannot hold a pool slot indefinitely.
    async fn evaluate_on<T: serde::de::DeserializeOwned>(
        &self,
        lease: &PageLease,
        script: &str,
    ) -> Result<T, ScrapeError> {
        match tokio::time::timeout(self.navigation_timeout, lease.page.evaluate(script)).await {
            Ok(Ok(result)) => result
                .into_value::<T>()
                .map_err(|e| ScrapeError::Browser(format!("evaluation result: {e}"))),
            Ok(Err(err)) => Err(ScrapeError::Browser(err.to_string())),
            Err(_) => Err(ScrapeError::Browser(format!(
                "evaluation timed out after {}s",
                self.navigation_timeout.as_secs()
            ))),
        }
    }

    async fn open_page(&self) -> Result<Page, ScrapeError> {
        let mut guard = self.browser.lock().await;
        if guard.is_none() {
            *guard = Some(launch_browser().await?);
        }
        let Some(browser) = guard.as_ref() else {
            return Err(ScrapeError::Browser("browser unavailable".to_string()));
        };
        browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))
    }
}

/// Launches the shared headless Chromium. Non-essential resource types
/// (images, fonts) are disabled at the renderer level to cut page weight.
async fn launch_browser() -> Result<Browser, ScrapeError> {
    let config = BrowserConfig::builder()
        .arg("--headless=new")
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--blink-settings=imagesEnabled=false")
        .arg("--disable-remote-fonts")
        .build()
        .map_err(|e| ScrapeError::Browser(format!("failed to build browser config: {e}")))?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| ScrapeError::Browser(format!("failed to launch browser: {e}")))?;

    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            let _ = event;
        }
    });

    Ok(browser)
}

/// Whether an error message indicates the page's devtools session died
/// (the one failure class worth retrying with a fresh page).
fn is_session_error(err: &ScrapeError) -> bool {
    let message = err.to_string().to_ascii_lowercase();
    message.contains("session closed")
        || message.contains("target closed")
        || message.contains("browser closed")
        || message.contains("page crashed")
}
