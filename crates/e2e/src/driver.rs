//! Browser driver abstraction
//!
//! [`Driver`] is the narrow surface the suite needs from a browser
//! automation backend. [`Browser`] and [`Element`] wrap it in handles that
//! read like the usual WebDriver client API.

use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{E2eError, E2eResult};

/// Element locator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "using", content = "value", rename_all = "snake_case")]
pub enum By {
    Id(String),
    Css(String),
    #[serde(rename = "xpath")]
    XPath(String),
    ClassName(String),
}

impl By {
    pub fn id(id: impl Into<String>) -> Self {
        By::Id(id.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        By::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        By::XPath(expr.into())
    }

    pub fn class_name(name: impl Into<String>) -> Self {
        By::ClassName(name.into())
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            By::Id(id) => write!(f, "id={}", id),
            By::Css(sel) => write!(f, "css={}", sel),
            By::XPath(expr) => write!(f, "xpath={}", expr),
            By::ClassName(name) => write!(f, "class={}", name),
        }
    }
}

/// Opaque reference to a DOM element owned by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub String);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// WebDriver key code points
pub struct Key;

impl Key {
    pub const ENTER: &'static str = "\u{E007}";
    pub const RETURN: &'static str = "\u{E006}";
    pub const TAB: &'static str = "\u{E004}";
    pub const ESCAPE: &'static str = "\u{E00C}";
}

#[async_trait]
pub trait Driver: Send + Sync {
    async fn goto(&self, url: &str) -> E2eResult<()>;

    async fn current_url(&self) -> E2eResult<String>;

    /// All elements matching `by`, in document order.
    async fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementId>>;

    async fn is_enabled(&self, element: &ElementId) -> E2eResult<bool>;

    async fn is_displayed(&self, element: &ElementId) -> E2eResult<bool>;

    async fn text(&self, element: &ElementId) -> E2eResult<String>;

    async fn click(&self, element: &ElementId) -> E2eResult<()>;

    /// Click dispatched from page script, bypassing overlap checks.
    async fn js_click(&self, element: &ElementId) -> E2eResult<()>;

    async fn send_keys(&self, element: &ElementId, text: &str) -> E2eResult<()>;

    async fn clear(&self, element: &ElementId) -> E2eResult<()>;

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> E2eResult<Value>;

    /// PNG screenshot of the viewport, base64 encoded.
    async fn screenshot_base64(&self) -> E2eResult<String>;

    async fn quit(&self) -> E2eResult<()>;
}

/// Cloneable handle to a live browser session
#[derive(Clone)]
pub struct Browser {
    driver: Arc<dyn Driver>,
}

impl fmt::Debug for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Browser").finish_non_exhaustive()
    }
}

impl Browser {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    pub async fn goto(&self, url: &str) -> E2eResult<()> {
        self.driver.goto(url).await
    }

    pub async fn location(&self) -> E2eResult<String> {
        self.driver.current_url().await
    }

    /// First element matching `by`; `NotFound` when there is none.
    pub async fn find_element(&self, by: &By) -> E2eResult<Element> {
        self.driver
            .find_elements(by)
            .await?
            .into_iter()
            .next()
            .map(|id| self.element(id))
            .ok_or_else(|| E2eError::NotFound(by.to_string()))
    }

    pub async fn find_elements(&self, by: &By) -> E2eResult<Vec<Element>> {
        let ids = self.driver.find_elements(by).await?;
        Ok(ids.into_iter().map(|id| self.element(id)).collect())
    }

    pub async fn execute_script(&self, script: &str, args: Vec<Value>) -> E2eResult<Value> {
        self.driver.execute_script(script, args).await
    }

    pub async fn clear_local_storage(&self) -> E2eResult<()> {
        self.driver
            .execute_script("window.localStorage.clear();", Vec::new())
            .await
            .map(|_| ())
    }

    pub async fn screenshot_base64(&self) -> E2eResult<String> {
        self.driver.screenshot_base64().await
    }

    pub async fn quit(&self) -> E2eResult<()> {
        self.driver.quit().await
    }

    fn element(&self, id: ElementId) -> Element {
        Element {
            id,
            driver: Arc::clone(&self.driver),
        }
    }
}

/// Handle to one element of the live page
#[derive(Clone)]
pub struct Element {
    id: ElementId,
    driver: Arc<dyn Driver>,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Element").field(&self.id).finish()
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Element {
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub async fn click(&self) -> E2eResult<()> {
        self.driver.click(&self.id).await
    }

    pub async fn js_click(&self) -> E2eResult<()> {
        self.driver.js_click(&self.id).await
    }

    pub async fn send_keys(&self, text: &str) -> E2eResult<()> {
        self.driver.send_keys(&self.id, text).await
    }

    pub async fn clear(&self) -> E2eResult<()> {
        self.driver.clear(&self.id).await
    }

    pub async fn text(&self) -> E2eResult<String> {
        self.driver.text(&self.id).await
    }

    pub async fn is_enabled(&self) -> E2eResult<bool> {
        self.driver.is_enabled(&self.id).await
    }

    pub async fn is_displayed(&self) -> E2eResult<bool> {
        self.driver.is_displayed(&self.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_display_names_strategy() {
        assert_eq!(By::id("email").to_string(), "id=email");
        assert_eq!(By::css("[role='option']").to_string(), "css=[role='option']");
    }

    #[test]
    fn locator_serializes_tagged() {
        let json = serde_json::to_value(By::xpath("//h3")).unwrap();
        assert_eq!(json["using"], "xpath");
        assert_eq!(json["value"], "//h3");
    }
}
