//! Infinite-scroll list for Leptos.
//!
//! `ScrollList` renders its children followed (or, in reverse mode, preceded)
//! by an invisible sentinel. An `IntersectionObserver` on the sentinel calls
//! the caller's `load_more` when it comes into view, with optional debounce,
//! scroll-direction filtering, an earlier prefetch sentinel and a retry
//! affordance for failed loads.
//!
//! The load state machine, margin math, direction filter and layout are plain
//! Rust and are tested natively; only the component and the watcher touch
//! the browser.

pub mod components;
pub mod config;
mod demo;
pub mod load;
pub mod render;
mod util;
pub mod visibility;

pub use components::ScrollList;
pub use config::{ScrollDirection, ScrollListOptions};
pub use load::{LoadError, LoadKind, LoadMore, LoadState};
pub use render::EndMessage;

use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use leptos::mount::mount_to;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn container() -> web_sys::HtmlElement {
        let doc = document();
        let el = doc
            .create_element("div")
            .expect("create container")
            .unchecked_into::<web_sys::HtmlElement>();
        doc.body()
            .expect("document body")
            .append_child(&el)
            .expect("attach container");
        el
    }

    /// Container fixed to the top of the viewport, so its sentinels are visible.
    fn pinned_container() -> web_sys::HtmlElement {
        let el = container();
        el.set_attribute("style", "position:fixed;top:0;left:0;width:320px")
            .expect("pin container");
        el
    }

    fn count(root: &web_sys::HtmlElement, selector: &str) -> u32 {
        root.query_selector_all(selector)
            .expect("valid selector")
            .length()
    }

    fn noop_loader() -> LoadMore {
        LoadMore::sync(|| Ok(()))
    }

    #[wasm_bindgen_test]
    fn test_browser_exposes_intersection_observer() {
        assert!(visibility::observation_supported());
        assert!(visibility::current_scroll_offset().is_some());
    }

    #[wasm_bindgen_test]
    fn test_exhausted_list_renders_end_message_and_no_sentinel() {
        let root = container();
        let _handle = mount_to(root.clone(), || {
            view! {
                <ScrollList has_more=false load_more=noop_loader() end_message="No more posts">
                    <p class="item">"one"</p>
                </ScrollList>
            }
        });

        assert_eq!(count(&root, "[data-scroll-sentinel]"), 0);
        assert_eq!(count(&root, "[data-name=ScrollListEnd]"), 1);
        assert_eq!(count(&root, "p.item"), 1);
        let text = root.text_content().unwrap_or_default();
        assert!(text.contains("No more posts"));
    }

    #[wasm_bindgen_test]
    fn test_prefetch_sentinel_is_hidden_marker() {
        let root = container();
        let options = ScrollListOptions {
            enable_prefetch: true,
            ..Default::default()
        };
        let _handle = mount_to(root.clone(), move || {
            view! {
                <ScrollList has_more=true load_more=noop_loader() options=options.clone()>
                    <p class="item">"one"</p>
                </ScrollList>
            }
        });

        assert_eq!(count(&root, "[data-scroll-sentinel]"), 2);
        assert_eq!(count(&root, "[data-scroll-sentinel=prefetch][aria-hidden=true]"), 1);
    }

    #[wasm_bindgen_test]
    async fn test_reverse_places_sentinel_before_children() {
        let root = container();
        let reverse = RwSignal::new(false);
        let options = Signal::derive(move || ScrollListOptions {
            reverse: reverse.get(),
            ..Default::default()
        });
        let _handle = mount_to(root.clone(), move || {
            view! {
                <ScrollList has_more=true load_more=noop_loader() options=options>
                    <p class="item">"one"</p>
                    <p class="item">"two"</p>
                </ScrollList>
            }
        });

        let list = root
            .query_selector("[data-name=ScrollList]")
            .expect("valid selector")
            .expect("list rendered");
        let first_attr = |name: &str| {
            list.first_element_child()
                .and_then(|el| el.get_attribute(name))
        };

        assert_eq!(first_attr("class").as_deref(), Some("item"));
        list.first_element_child()
            .expect("first row")
            .set_attribute("data-mark", "kept")
            .expect("mark row");

        reverse.set(true);
        crate::util::sleep(20).await;
        assert_eq!(first_attr("data-scroll-sentinel").as_deref(), Some("primary"));
        assert_eq!(count(&root, "p.item"), 2);
        // Rows are moved around, never rebuilt.
        assert_eq!(count(&root, "p.item[data-mark=kept]"), 1);
    }

    #[wasm_bindgen_test]
    async fn test_end_of_feed_keeps_rows_and_drops_sentinels() {
        let root = container();
        let has_more = RwSignal::new(true);
        let _handle = mount_to(root.clone(), move || {
            view! {
                <ScrollList has_more=has_more load_more=noop_loader() end_message="That's all">
                    <p class="item">"one"</p>
                </ScrollList>
            }
        });

        root.query_selector("p.item")
            .expect("valid selector")
            .expect("row rendered")
            .set_attribute("data-mark", "kept")
            .expect("mark row");
        assert_eq!(count(&root, "[data-scroll-sentinel=primary]"), 1);

        has_more.set(false);
        crate::util::sleep(20).await;
        assert_eq!(count(&root, "[data-scroll-sentinel]"), 0);
        assert_eq!(count(&root, "[data-name=ScrollListEnd]"), 1);
        assert_eq!(count(&root, "p.item[data-mark=kept]"), 1);
    }

    #[wasm_bindgen_test]
    async fn test_short_pages_keep_loading_while_sentinel_visible() {
        let root = pinned_container();
        let pages = RwSignal::new(0_u32);
        let has_more = Signal::derive(move || pages.get() < 3);
        let load_more = LoadMore::sync(move || {
            pages.update(|n| *n += 1);
            Ok(())
        });
        let _handle = mount_to(root.clone(), move || {
            view! {
                <ScrollList has_more=has_more load_more=load_more.clone()>
                    <p class="item">"short page"</p>
                </ScrollList>
            }
        });

        crate::util::sleep(300).await;
        assert_eq!(pages.get_untracked(), 3);
        assert_eq!(count(&root, "[data-scroll-sentinel]"), 0);
        root.remove();
    }
}

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(demo::App);
}
