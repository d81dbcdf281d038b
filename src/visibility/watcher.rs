use super::WatchOptions;

/// One intersection notification for a watched sentinel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEvent {
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

/// Whether the host exposes `IntersectionObserver`.
///
/// Always false outside wasm (tests, server rendering), which turns every
/// subscription attempt into a no-op.
pub fn observation_supported() -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .map(|w| js_sys::Reflect::has(&w, &"IntersectionObserver".into()).unwrap_or(false))
            .unwrap_or(false)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        false
    }
}

/// Current vertical scroll offset of the window, if there is one.
pub fn current_scroll_offset() -> Option<f64> {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window().and_then(|w| w.scroll_y().ok())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        None
    }
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use super::{IntersectionEvent, WatchOptions};
    use leptos::logging::warn;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{
        Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    };

    type Listener = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

    /// A live observation of one element. Dropping it unobserves and
    /// disconnects, so replacing the value is enough to resubscribe.
    pub struct VisibilityWatcher {
        observer: IntersectionObserver,
        target: Element,
        _listener: Listener,
    }

    impl VisibilityWatcher {
        pub fn observe(
            target: &Element,
            options: &WatchOptions,
            mut on_event: impl FnMut(IntersectionEvent) + 'static,
        ) -> Option<Self> {
            if !super::observation_supported() {
                return None;
            }

            let listener: Listener = Closure::new(move |entries: js_sys::Array, _: IntersectionObserver| {
                // A batch can hold several entries for the same target; the last one is current.
                let Some(entry) = entries
                    .iter()
                    .last()
                    .and_then(|e| e.dyn_into::<IntersectionObserverEntry>().ok())
                else {
                    return;
                };
                on_event(IntersectionEvent {
                    is_intersecting: entry.is_intersecting(),
                    intersection_ratio: entry.intersection_ratio(),
                });
            });

            let init = IntersectionObserverInit::new();
            init.set_root_margin(&options.root_margin.to_string());
            init.set_threshold(&JsValue::from_f64(options.threshold));

            let observer = match IntersectionObserver::new_with_options(
                listener.as_ref().unchecked_ref(),
                &init,
            ) {
                Ok(observer) => observer,
                Err(e) => {
                    warn!("scroll-list: IntersectionObserver rejected options: {e:?}");
                    return None;
                }
            };
            observer.observe(target);

            Some(Self {
                observer,
                target: target.clone(),
                _listener: listener,
            })
        }

        /// Asks for a fresh notification with the target's current
        /// visibility, even if it has not crossed a threshold since the last one.
        pub fn rearm(&self) {
            self.observer.unobserve(&self.target);
            self.observer.observe(&self.target);
        }
    }

    impl Drop for VisibilityWatcher {
        fn drop(&mut self) {
            self.observer.unobserve(&self.target);
            self.observer.disconnect();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use super::{IntersectionEvent, WatchOptions};

    /// Placeholder for hosts without `IntersectionObserver`; never constructed.
    pub struct VisibilityWatcher {
        _private: (),
    }

    impl VisibilityWatcher {
        pub fn observe(
            _target: &web_sys::Element,
            _options: &WatchOptions,
            _on_event: impl FnMut(IntersectionEvent) + 'static,
        ) -> Option<Self> {
            None
        }

        pub fn rearm(&self) {}
    }
}

pub use imp::VisibilityWatcher;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_absent_outside_browser() {
        assert!(!observation_supported());
        assert_eq!(current_scroll_offset(), None);
    }
}
