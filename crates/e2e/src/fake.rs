//! In-memory browser for exercising waits and scenarios without a real
//! WebDriver service.
//!
//! Elements answer to the locators they are registered with, in insertion
//! order. Page changes are scripted either as click handlers or as
//! mutations scheduled at an offset from creation; scheduled mutations are
//! applied lazily whenever the page is queried, against
//! `tokio::time::Instant`, so tests can run with paused time.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use base64::Engine as _;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::Instant;

use crate::driver::{Browser, By, Driver, ElementId};
use crate::error::{E2eError, E2eResult};

/// 1x1 transparent PNG
const BLANK_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

pub type PageAction = Arc<dyn Fn(&mut FakePage) + Send + Sync>;
pub type PageRule = Arc<dyn Fn(&FakePage) -> bool + Send + Sync>;

/// One element of the fake page
#[derive(Clone)]
pub struct FakeElement {
    pub id: String,
    pub locators: Vec<By>,
    pub text: String,
    pub value: String,
    pub displayed: bool,
    pub enabled: bool,
    enabled_when: Option<PageRule>,
    on_click: Option<PageAction>,
}

impl FakeElement {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            locators: Vec::new(),
            text: String::new(),
            value: String::new(),
            displayed: true,
            enabled: true,
            enabled_when: None,
            on_click: None,
        }
    }

    pub fn locator(mut self, by: By) -> Self {
        self.locators.push(by);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Enabled state computed from the page on every read.
    pub fn enabled_when<F>(mut self, rule: F) -> Self
    where
        F: Fn(&FakePage) -> bool + Send + Sync + 'static,
    {
        self.enabled_when = Some(Arc::new(rule));
        self
    }

    pub fn on_click<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut FakePage) + Send + Sync + 'static,
    {
        self.on_click = Some(Arc::new(action));
        self
    }
}

/// Mutable state of the fake page
#[derive(Default)]
pub struct FakePage {
    pub location: String,
    elements: Vec<FakeElement>,
    pub local_storage_clears: usize,
    pub navigations: Vec<String>,
}

impl FakePage {
    pub fn add(&mut self, element: FakeElement) {
        self.elements.push(element);
    }

    /// Detach an element; existing handles to it go stale.
    pub fn remove(&mut self, id: &str) {
        self.elements.retain(|e| e.id != id);
    }

    /// Keep only elements accepted by `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&FakeElement) -> bool) {
        self.elements.retain(keep);
    }

    pub fn get(&self, id: &str) -> Option<&FakeElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut FakeElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Value typed into the element with `id`, empty when absent.
    pub fn value_of(&self, id: &str) -> String {
        self.get(id).map(|e| e.value.clone()).unwrap_or_default()
    }

    pub fn set_displayed(&mut self, id: &str, displayed: bool) {
        if let Some(element) = self.get_mut(id) {
            element.displayed = displayed;
        }
    }

    pub fn set_text(&mut self, id: &str, text: &str) {
        if let Some(element) = self.get_mut(id) {
            element.text = text.to_string();
        }
    }

    fn is_enabled(&self, element: &FakeElement) -> bool {
        match &element.enabled_when {
            Some(rule) => rule(self),
            None => element.enabled,
        }
    }
}

struct Scheduled {
    at: Instant,
    action: PageAction,
}

#[derive(Default)]
struct Counters {
    queries: usize,
    clicks: usize,
    screenshots: usize,
    quits: usize,
}

struct Inner {
    page: FakePage,
    scheduled: Vec<Scheduled>,
    counters: Counters,
    /// Every command fails with this once set
    fault: Option<String>,
}

/// Scripted in-memory [`Driver`]
#[derive(Clone)]
pub struct FakeBrowser {
    created: Instant,
    inner: Arc<Mutex<Inner>>,
}

impl Default for FakeBrowser {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl FakeBrowser {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            created: Instant::now(),
            inner: Arc::new(Mutex::new(Inner {
                page: FakePage {
                    location: location.into(),
                    ..Default::default()
                },
                scheduled: Vec::new(),
                counters: Counters::default(),
                fault: None,
            })),
        }
    }

    pub fn browser(&self) -> Browser {
        Browser::new(Arc::new(self.clone()))
    }

    pub fn with_page<R>(&self, f: impl FnOnce(&mut FakePage) -> R) -> R {
        let mut inner = self.inner.lock();
        f(&mut inner.page)
    }

    pub fn add(&self, element: FakeElement) {
        self.with_page(|page| page.add(element));
    }

    /// Apply `action` once `after` has elapsed since the browser was created.
    pub fn schedule<F>(&self, after: Duration, action: F)
    where
        F: Fn(&mut FakePage) + Send + Sync + 'static,
    {
        self.inner.lock().scheduled.push(Scheduled {
            at: self.created + after,
            action: Arc::new(action),
        });
    }

    /// Make every later command fail as if the browser went away.
    pub fn fault(&self, message: impl Into<String>) {
        self.inner.lock().fault = Some(message.into());
    }

    pub fn query_count(&self) -> usize {
        self.inner.lock().counters.queries
    }

    pub fn click_count(&self) -> usize {
        self.inner.lock().counters.clicks
    }

    pub fn screenshot_count(&self) -> usize {
        self.inner.lock().counters.screenshots
    }

    pub fn quit_count(&self) -> usize {
        self.inner.lock().counters.quits
    }

    fn with_live<R>(&self, f: impl FnOnce(&mut Inner) -> E2eResult<R>) -> E2eResult<R> {
        let mut inner = self.inner.lock();
        if let Some(message) = &inner.fault {
            return Err(E2eError::WebDriver {
                code: "invalid session id".to_string(),
                message: message.clone(),
            });
        }

        let now = Instant::now();
        let (due, pending): (Vec<_>, Vec<_>) =
            inner.scheduled.drain(..).partition(|s| s.at <= now);
        inner.scheduled = pending;
        for scheduled in due {
            (scheduled.action)(&mut inner.page);
        }

        f(&mut inner)
    }

    fn with_element<R>(
        &self,
        id: &ElementId,
        f: impl FnOnce(&FakePage, &FakeElement) -> E2eResult<R>,
    ) -> E2eResult<R> {
        self.with_live(|inner| {
            let element = inner
                .page
                .get(&id.0)
                .ok_or_else(|| E2eError::StaleElement(id.0.clone()))?;
            f(&inner.page, element)
        })
    }

    fn activate(&self, id: &ElementId, require_displayed: bool) -> E2eResult<()> {
        self.with_live(|inner| {
            let element = inner
                .page
                .get(&id.0)
                .ok_or_else(|| E2eError::StaleElement(id.0.clone()))?;
            if require_displayed && !element.displayed {
                return Err(E2eError::WebDriver {
                    code: "element not interactable".to_string(),
                    message: format!("{} is not displayed", id),
                });
            }
            if !inner.page.is_enabled(element) {
                return Ok(());
            }
            let action = element.on_click.clone();
            inner.counters.clicks += 1;
            if let Some(action) = action {
                action(&mut inner.page);
            }
            Ok(())
        })
    }
}

#[async_trait]
impl Driver for FakeBrowser {
    /// Navigation reloads the page, so typed values are lost.
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.with_live(|inner| {
            for element in &mut inner.page.elements {
                element.value.clear();
            }
            inner.page.location = url.to_string();
            inner.page.navigations.push(url.to_string());
            Ok(())
        })
    }

    async fn current_url(&self) -> E2eResult<String> {
        self.with_live(|inner| Ok(inner.page.location.clone()))
    }

    async fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementId>> {
        self.with_live(|inner| {
            inner.counters.queries += 1;
            Ok(inner
                .page
                .elements
                .iter()
                .filter(|e| e.locators.contains(by))
                .map(|e| ElementId(e.id.clone()))
                .collect())
        })
    }

    async fn is_enabled(&self, element: &ElementId) -> E2eResult<bool> {
        self.with_element(element, |page, e| Ok(page.is_enabled(e)))
    }

    async fn is_displayed(&self, element: &ElementId) -> E2eResult<bool> {
        self.with_element(element, |_, e| Ok(e.displayed))
    }

    async fn text(&self, element: &ElementId) -> E2eResult<String> {
        self.with_element(element, |_, e| Ok(if e.displayed { e.text.clone() } else { String::new() }))
    }

    async fn click(&self, element: &ElementId) -> E2eResult<()> {
        self.activate(element, true)
    }

    async fn js_click(&self, element: &ElementId) -> E2eResult<()> {
        self.activate(element, false)
    }

    async fn send_keys(&self, element: &ElementId, text: &str) -> E2eResult<()> {
        self.with_live(|inner| {
            let target = inner
                .page
                .get_mut(&element.0)
                .ok_or_else(|| E2eError::StaleElement(element.0.clone()))?;
            target.value.push_str(text);
            Ok(())
        })
    }

    async fn clear(&self, element: &ElementId) -> E2eResult<()> {
        self.with_live(|inner| {
            let target = inner
                .page
                .get_mut(&element.0)
                .ok_or_else(|| E2eError::StaleElement(element.0.clone()))?;
            target.value.clear();
            Ok(())
        })
    }

    async fn execute_script(&self, script: &str, _args: Vec<Value>) -> E2eResult<Value> {
        self.with_live(|inner| {
            if script.contains("localStorage.clear") {
                inner.page.local_storage_clears += 1;
            }
            Ok(Value::Null)
        })
    }

    async fn screenshot_base64(&self) -> E2eResult<String> {
        self.with_live(|inner| {
            inner.counters.screenshots += 1;
            Ok(base64::engine::general_purpose::STANDARD.encode(BLANK_PNG))
        })
    }

    async fn quit(&self) -> E2eResult<()> {
        let mut inner = self.inner.lock();
        inner.counters.quits += 1;
        Ok(())
    }
}
