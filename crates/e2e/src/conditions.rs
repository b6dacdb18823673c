//! Composed wait conditions
//!
//! Each helper builds a predicate and hands it to [`await_condition`]; the
//! predicates re-run their element queries on every tick.

use std::fmt;

use crate::driver::{Browser, By, Element};
use crate::error::E2eResult;
use crate::wait::{await_condition, Poll, WaitConfig};

/// Declarative filter over rendered elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    text: Option<String>,
    displayed: bool,
    enabled: bool,
}

impl Match {
    pub fn any() -> Self {
        Self::default()
    }

    /// Exact match against the element's trimmed text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn displayed(mut self) -> Self {
        self.displayed = true;
        self
    }

    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    pub async fn accepts(&self, element: &Element) -> E2eResult<bool> {
        if self.displayed && !element.is_displayed().await? {
            return Ok(false);
        }
        if self.enabled && !element.is_enabled().await? {
            return Ok(false);
        }
        if let Some(expected) = &self.text {
            if element.text().await?.trim() != expected {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(text) = &self.text {
            parts.push(format!("text='{}'", text));
        }
        if self.displayed {
            parts.push("displayed".to_string());
        }
        if self.enabled {
            parts.push("enabled".to_string());
        }
        if parts.is_empty() {
            f.write_str("any")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// First candidate, in render order, accepted by `filter`.
///
/// Candidates that went stale since the query are skipped.
pub async fn first_match(candidates: Vec<Element>, filter: &Match) -> E2eResult<Option<Element>> {
    for candidate in candidates {
        match filter.accepts(&candidate).await {
            Ok(true) => return Ok(Some(candidate)),
            Ok(false) => {}
            Err(err) if err.is_transient() => {}
            Err(err) => return Err(err),
        }
    }
    Ok(None)
}

/// Poll until some element matching `by` passes `filter`.
pub async fn find_first_matching(
    browser: &Browser,
    by: &By,
    filter: &Match,
    config: WaitConfig,
) -> E2eResult<Element> {
    let description = format!("first {} matching {}", by, filter);
    await_condition(browser, config, &description, move |browser: Browser| async move {
        let candidates = browser.find_elements(by).await?;
        let count = candidates.len();
        Ok(match first_match(candidates, filter).await? {
            Some(element) => Poll::Ready(element),
            None => Poll::Pending(format!("{} candidate(s), none matched", count)),
        })
    })
    .await
}

pub async fn wait_for_element(browser: &Browser, by: &By, config: WaitConfig) -> E2eResult<Element> {
    let description = format!("element {}", by);
    await_condition(browser, config, &description, move |browser: Browser| async move {
        browser.find_element(by).await.map(Some)
    })
    .await
}

/// Wait until the current location starts with `prefix`; returns the location.
pub async fn wait_for_location(browser: &Browser, prefix: &str, config: WaitConfig) -> E2eResult<String> {
    let description = format!("location starting with {}", prefix);
    await_condition(browser, config, &description, move |browser: Browser| async move {
        let location = browser.location().await?;
        Ok(if location.starts_with(prefix) {
            Poll::Ready(location)
        } else {
            Poll::Pending(format!("location is {}", location))
        })
    })
    .await
}

/// Wait until no element matching `by` is displayed (closed panels, overlays).
pub async fn wait_until_none_displayed(browser: &Browser, by: &By, config: WaitConfig) -> E2eResult<()> {
    let description = format!("no displayed {}", by);
    await_condition(browser, config, &description, move |browser: Browser| async move {
        let mut visible = 0;
        for element in browser.find_elements(by).await? {
            match element.is_displayed().await {
                Ok(true) => visible += 1,
                Ok(false) => {}
                Err(err) if err.is_transient() => {}
                Err(err) => return Err(err),
            }
        }
        Ok(if visible == 0 {
            Poll::Ready(())
        } else {
            Poll::Pending(format!("{} element(s) still displayed", visible))
        })
    })
    .await
}

pub async fn wait_until_enabled(element: &Element, config: WaitConfig) -> E2eResult<()> {
    let description = format!("element {} to be enabled", element.id());
    await_condition(element, config, &description, move |element: Element| async move {
        element.is_enabled().await
    })
    .await
    .map(|_| ())
}

/// Wait until the number of elements matching `by` satisfies `accept`.
pub async fn wait_for_count<F>(
    browser: &Browser,
    by: &By,
    config: WaitConfig,
    expectation: &str,
    accept: F,
) -> E2eResult<Vec<Element>>
where
    F: Fn(usize) -> bool,
{
    let description = format!("{} {}", expectation, by);
    let accept = &accept;
    await_condition(browser, config, &description, move |browser: Browser| async move {
        let elements = browser.find_elements(by).await?;
        Ok(if accept(elements.len()) {
            Poll::Ready(elements)
        } else {
            Poll::Pending(format!("{} element(s) present", elements.len()))
        })
    })
    .await
}

pub async fn wait_for_absence(browser: &Browser, by: &By, config: WaitConfig) -> E2eResult<()> {
    wait_for_count(browser, by, config, "absence of", |count| count == 0)
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_display_lists_constraints() {
        assert_eq!(Match::any().to_string(), "any");
        assert_eq!(
            Match::any().displayed().text("Samsung").to_string(),
            "text='Samsung', displayed"
        );
    }
}
