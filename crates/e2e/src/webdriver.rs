//! W3C WebDriver client
//!
//! Speaks the WebDriver HTTP/JSON protocol directly against a running
//! service (geckodriver, msedgedriver, chromedriver).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::BrowserKind;
use crate::driver::{By, Driver, ElementId};
use crate::error::{E2eError, E2eResult};

/// W3C web element identifier key
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52f-4a4e-8d9e-7d7cdd24e0c6";

/// Key used by pre-W3C drivers
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// One WebDriver session
pub struct WebDriverClient {
    http: reqwest::Client,
    endpoint: String,
    session_id: String,
    closed: AtomicBool,
}

impl WebDriverClient {
    /// Open a new session on the service at `endpoint`.
    pub async fn connect(endpoint: &str, kind: BrowserKind, headless: bool) -> E2eResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        let endpoint = endpoint.trim_end_matches('/').to_string();

        let body = json!({ "capabilities": { "alwaysMatch": capabilities(kind, headless) } });
        let value = send(&http, Method::POST, &format!("{}/session", endpoint), Some(body)).await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| E2eError::WebDriver {
                code: "session not created".to_string(),
                message: format!("response without sessionId: {}", value),
            })?
            .to_string();

        info!("Opened {} WebDriver session {}", kind.as_str(), session_id);

        Ok(Self {
            http,
            endpoint,
            session_id,
            closed: AtomicBool::new(false),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.endpoint, self.session_id, path)
    }

    async fn call(&self, method: Method, path: &str, body: Option<Value>) -> E2eResult<Value> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(E2eError::WebDriver {
                code: "invalid session id".to_string(),
                message: format!("session {} already closed", self.session_id),
            });
        }
        send(&self.http, method, &self.url(path), body).await
    }

    async fn element_call(&self, method: Method, element: &ElementId, path: &str, body: Option<Value>) -> E2eResult<Value> {
        self.call(method, &format!("/element/{}{}", element.0, path), body).await
    }
}

#[async_trait]
impl Driver for WebDriverClient {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        debug!("navigate {}", url);
        self.call(Method::POST, "/url", Some(json!({ "url": url }))).await?;
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        let value = self.call(Method::GET, "/url", None).await?;
        expect_string(value)
    }

    async fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementId>> {
        let (using, selector) = locator(by);
        let value = self
            .call(Method::POST, "/elements", Some(json!({ "using": using, "value": selector })))
            .await?;
        parse_elements(value)
    }

    async fn is_enabled(&self, element: &ElementId) -> E2eResult<bool> {
        let value = self.element_call(Method::GET, element, "/enabled", None).await?;
        expect_bool(value)
    }

    async fn is_displayed(&self, element: &ElementId) -> E2eResult<bool> {
        let value = self.element_call(Method::GET, element, "/displayed", None).await?;
        expect_bool(value)
    }

    async fn text(&self, element: &ElementId) -> E2eResult<String> {
        let value = self.element_call(Method::GET, element, "/text", None).await?;
        expect_string(value)
    }

    async fn click(&self, element: &ElementId) -> E2eResult<()> {
        self.element_call(Method::POST, element, "/click", Some(json!({}))).await?;
        Ok(())
    }

    async fn js_click(&self, element: &ElementId) -> E2eResult<()> {
        self.execute_script("arguments[0].click();", vec![element_ref(element)])
            .await
            .map(|_| ())
    }

    async fn send_keys(&self, element: &ElementId, text: &str) -> E2eResult<()> {
        self.element_call(Method::POST, element, "/value", Some(json!({ "text": text })))
            .await?;
        Ok(())
    }

    async fn clear(&self, element: &ElementId) -> E2eResult<()> {
        self.element_call(Method::POST, element, "/clear", Some(json!({}))).await?;
        Ok(())
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> E2eResult<Value> {
        self.call(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    async fn screenshot_base64(&self) -> E2eResult<String> {
        let value = self.call(Method::GET, "/screenshot", None).await?;
        expect_string(value)
    }

    async fn quit(&self) -> E2eResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!("Closing WebDriver session {}", self.session_id);
        let url = format!("{}/session/{}", self.endpoint, self.session_id);
        send(&self.http, Method::DELETE, &url, None).await.map(|_| ())
    }
}

impl Drop for WebDriverClient {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::SeqCst) {
            warn!("WebDriver session {} dropped without quit", self.session_id);
        }
    }
}

/// Issue one command and unwrap the `value` member of the response.
async fn send(http: &reqwest::Client, method: Method, url: &str, body: Option<Value>) -> E2eResult<Value> {
    let mut request = http.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    let mut payload: Value = response.json().await?;
    let value = payload.get_mut("value").map(Value::take).unwrap_or(Value::Null);

    if status.is_success() {
        Ok(value)
    } else {
        Err(map_error(status, &value))
    }
}

/// Translate a WebDriver error payload into the suite's error kinds.
pub fn map_error(status: StatusCode, value: &Value) -> E2eError {
    let code = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match code.as_str() {
        "no such element" => E2eError::NotFound(message),
        "stale element reference" => E2eError::StaleElement(message),
        "invalid session id" | "session not created" => E2eError::Faulted {
            condition: "webdriver session".to_string(),
            source: Box::new(E2eError::WebDriver { code, message }),
        },
        _ => E2eError::WebDriver {
            code,
            message: format!("{} (HTTP {})", message, status.as_u16()),
        },
    }
}

/// Browser-specific `alwaysMatch` capabilities.
pub fn capabilities(kind: BrowserKind, headless: bool) -> Value {
    match kind {
        BrowserKind::Firefox => {
            let args: Vec<&str> = if headless { vec!["-headless"] } else { vec![] };
            json!({ "browserName": kind.as_str(), "moz:firefoxOptions": { "args": args } })
        }
        BrowserKind::Edge => {
            let args: Vec<&str> = if headless { vec!["--headless=new"] } else { vec![] };
            json!({ "browserName": kind.as_str(), "ms:edgeOptions": { "args": args } })
        }
        BrowserKind::Chrome => {
            let args: Vec<&str> = if headless { vec!["--headless=new"] } else { vec![] };
            json!({ "browserName": kind.as_str(), "goog:chromeOptions": { "args": args } })
        }
    }
}

/// WebDriver location strategy for a locator.
pub fn locator(by: &By) -> (&'static str, String) {
    match by {
        By::Id(id) => ("css selector", format!("[id=\"{}\"]", id.replace('"', "\\\""))),
        By::Css(selector) => ("css selector", selector.clone()),
        By::XPath(expr) => ("xpath", expr.clone()),
        By::ClassName(name) => ("css selector", format!(".{}", name)),
    }
}

pub fn element_ref(element: &ElementId) -> Value {
    json!({ ELEMENT_KEY: element.0 })
}

pub fn parse_elements(value: Value) -> E2eResult<Vec<ElementId>> {
    let Value::Array(items) = value else {
        return Err(E2eError::WebDriver {
            code: "invalid response".to_string(),
            message: format!("expected element list, got {}", value),
        });
    };

    items
        .iter()
        .map(|item| {
            item.get(ELEMENT_KEY)
                .or_else(|| item.get(LEGACY_ELEMENT_KEY))
                .and_then(Value::as_str)
                .map(|id| ElementId(id.to_string()))
                .ok_or_else(|| E2eError::WebDriver {
                    code: "invalid response".to_string(),
                    message: format!("not an element reference: {}", item),
                })
        })
        .collect()
}

fn expect_bool(value: Value) -> E2eResult<bool> {
    value.as_bool().ok_or_else(|| E2eError::WebDriver {
        code: "invalid response".to_string(),
        message: format!("expected boolean, got {}", value),
    })
}

fn expect_string(value: Value) -> E2eResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(E2eError::WebDriver {
            code: "invalid response".to_string(),
            message: format!("expected string, got {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_locator_becomes_attribute_selector() {
        assert_eq!(
            locator(&By::id("numberplate")),
            ("css selector", "[id=\"numberplate\"]".to_string())
        );
        assert_eq!(locator(&By::class_name("gLFyf")).1, ".gLFyf");
        assert_eq!(locator(&By::xpath("//h3")).0, "xpath");
    }

    #[test]
    fn parse_element_list() {
        let value = json!([{ ELEMENT_KEY: "a" }, { "ELEMENT": "b" }]);
        let ids = parse_elements(value).unwrap();
        assert_eq!(ids, vec![ElementId("a".into()), ElementId("b".into())]);
    }

    #[test]
    fn parse_rejects_non_list() {
        assert!(parse_elements(json!({ "x": 1 })).is_err());
    }

    #[test]
    fn maps_lookup_errors_to_transient_kinds() {
        let err = map_error(
            StatusCode::NOT_FOUND,
            &json!({ "error": "no such element", "message": "Unable to locate #email" }),
        );
        assert!(matches!(err, E2eError::NotFound(_)));

        let err = map_error(
            StatusCode::NOT_FOUND,
            &json!({ "error": "stale element reference", "message": "gone" }),
        );
        assert!(err.is_transient());
    }

    #[test]
    fn maps_dead_session_to_fault() {
        let err = map_error(StatusCode::NOT_FOUND, &json!({ "error": "invalid session id" }));
        assert!(matches!(err, E2eError::Faulted { .. }));
    }

    #[test]
    fn headless_capabilities_per_browser() {
        let caps = capabilities(BrowserKind::Firefox, true);
        assert_eq!(caps["moz:firefoxOptions"]["args"][0], "-headless");
        let caps = capabilities(BrowserKind::Edge, false);
        assert_eq!(caps["browserName"], "MicrosoftEdge");
        assert!(caps["ms:edgeOptions"]["args"].as_array().unwrap().is_empty());
    }
}
