mod direction;
mod margin;
mod watcher;

pub use direction::ScrollMemory;
pub use margin::{prefetch_edge, prefetch_root_margin, Edge, MarginLength, RootMargin, RootMarginError};
pub use watcher::{current_scroll_offset, observation_supported, IntersectionEvent, VisibilityWatcher};

/// Options for one `IntersectionObserver` subscription.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WatchOptions {
    pub root_margin: RootMargin,
    pub threshold: f64,
}
