use crate::visibility::{prefetch_root_margin, RootMargin, WatchOptions};
use leptos::logging::warn;
use serde::{Deserialize, Serialize};

/// Which scroll gesture is allowed to trigger a load.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScrollDirection {
    Down,
    Up,
    #[default]
    Both,
}

impl ScrollDirection {
    pub fn allows(self, scrolling_down: bool) -> bool {
        match self {
            ScrollDirection::Down => scrolling_down,
            ScrollDirection::Up => !scrolling_down,
            ScrollDirection::Both => true,
        }
    }
}

/// Options for a `ScrollList`.
///
/// Every field has a default, so callers usually write
/// `ScrollListOptions { reverse: true, ..Default::default() }`.
/// The same shape can be supplied globally as `window.ENV.SCROLL_LIST`
/// (see [`ScrollListOptions::from_env`]).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ScrollListOptions {
    /// Visible fraction of the primary sentinel that counts as intersecting.
    pub threshold: f64,
    /// CSS margin shorthand applied around the viewport, e.g. `"0px 0px 100px 0px"`.
    pub root_margin: String,
    /// Prepend at the top instead of appending at the bottom (chat logs).
    pub reverse: bool,
    pub scroll_direction: ScrollDirection,
    /// Render the error with a retry button instead of the loading affordance.
    pub retry_on_error: bool,
    /// Fire one primary load on mount without waiting for an intersection.
    pub initial_load: bool,
    /// Quiet period before a triggered load is issued. `0` calls immediately.
    pub debounce_ms: u32,
    pub enable_prefetch: bool,
    /// How many pixels ahead of the primary sentinel the prefetch sentinel fires.
    pub prefetch_offset: f64,
}

impl Default for ScrollListOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: "0px".to_string(),
            reverse: false,
            scroll_direction: ScrollDirection::default(),
            retry_on_error: false,
            initial_load: false,
            debounce_ms: 0,
            enable_prefetch: false,
            prefetch_offset: 200.0,
        }
    }
}

impl ScrollListOptions {
    /// Defaults, overridden by `window.ENV.SCROLL_LIST` when the page provides it.
    ///
    /// Unknown fields are ignored and missing ones keep their default, so a page
    /// can set only what it cares about:
    /// `window.ENV = { SCROLL_LIST: { debounce_ms: 150 } }`.
    pub fn from_env() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                if let Some(env) = window.get("ENV") {
                    if !env.is_undefined() && env.is_object() {
                        if let Ok(raw) = js_sys::Reflect::get(&env, &"SCROLL_LIST".into()) {
                            if raw.is_object() {
                                if let Some(json) =
                                    js_sys::JSON::stringify(&raw).ok().and_then(|s| s.as_string())
                                {
                                    return Self::from_json(&json);
                                }
                            }
                        }
                    }
                }
            }
        }

        Self::default()
    }

    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(options) => options,
            Err(e) => {
                warn!("scroll-list: ignoring invalid options ({e})");
                Self::default()
            }
        }
    }

    pub fn clamped_threshold(&self) -> f64 {
        if self.threshold.is_nan() {
            return 0.0;
        }
        self.threshold.clamp(0.0, 1.0)
    }

    /// Parsed root margin; an invalid value falls back to `0px`.
    pub fn parsed_root_margin(&self) -> RootMargin {
        match self.root_margin.parse::<RootMargin>() {
            Ok(margin) => margin,
            Err(e) => {
                warn!("scroll-list: {e}; using 0px");
                RootMargin::default()
            }
        }
    }

    pub fn primary_watch_options(&self) -> WatchOptions {
        WatchOptions {
            root_margin: self.parsed_root_margin(),
            threshold: self.clamped_threshold(),
        }
    }

    pub fn prefetch_watch_options(&self) -> WatchOptions {
        WatchOptions {
            root_margin: prefetch_root_margin(
                &self.parsed_root_margin(),
                self.prefetch_offset.max(0.0),
                self.reverse,
                self.scroll_direction,
            ),
            threshold: 0.0,
        }
    }
}
