//! Shared UI widgets: dropdowns and the loading overlay

use crate::conditions::{find_first_matching, wait_for_element, wait_until_none_displayed, Match};
use crate::driver::{Browser, By};
use crate::error::E2eResult;
use crate::wait::WaitConfig;

pub const DROPDOWN: &str = "[role='combobox'], [id^='pn_id_']";
pub const DROPDOWN_OPTION: &str = "[role='option']";
pub const LOADING_OVERLAY: &str = ".loading-overlay";

pub fn dropdown() -> By {
    By::css(DROPDOWN)
}

pub fn dropdown_options() -> By {
    By::css(DROPDOWN_OPTION)
}

pub fn loading_overlay() -> By {
    By::css(LOADING_OVERLAY)
}

/// How the chosen option gets clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickMode {
    Native,
    /// Through page script; survives overlapping elements
    Script,
}

/// Open the dropdown, click the first option accepted by `option`, and wait
/// for the option panel to close so it cannot cover later targets.
pub async fn select_dropdown_option(
    browser: &Browser,
    option: &Match,
    click: ClickMode,
    config: WaitConfig,
) -> E2eResult<()> {
    let dropdown = wait_for_element(browser, &dropdown(), config).await?;
    dropdown.click().await?;

    let choice = find_first_matching(browser, &dropdown_options(), option, config).await?;
    match click {
        ClickMode::Native => choice.click().await?,
        ClickMode::Script => choice.js_click().await?,
    }

    wait_until_none_displayed(browser, &dropdown_options(), config).await
}

pub async fn wait_for_loading_overlay(browser: &Browser, config: WaitConfig) -> E2eResult<()> {
    wait_until_none_displayed(browser, &loading_overlay(), config).await
}
