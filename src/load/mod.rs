mod coordinator;
mod driver;
mod scheduler;

pub use coordinator::{LoadCoordinator, LoadState, Skip, TriggerGate};
pub use driver::{DriverHooks, LoadDriver};
pub use scheduler::{BrowserScheduler, BrowserTimer, LocalTask, Scheduler};

#[cfg(test)]
pub(crate) use scheduler::manual::ManualScheduler;

use std::fmt;
use std::future::Future;
use std::ops::{Index, IndexMut};
use std::pin::Pin;
use std::rc::Rc;

/// The two independent load tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LoadKind {
    /// Triggered by the sentinel at the list edge.
    Primary,
    /// Triggered ahead of the edge to hide latency.
    Prefetch,
}

/// Failure reported by a `load_more` callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadError {
    pub message: String,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LoadError {}

impl From<String> for LoadError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for LoadError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<wasm_bindgen::JsValue> for LoadError {
    /// Uses a thrown string as is, or the `message` of a thrown `Error`.
    fn from(value: wasm_bindgen::JsValue) -> Self {
        if let Some(s) = value.as_string() {
            return Self { message: s };
        }
        let message = js_sys::Reflect::get(&value, &"message".into())
            .ok()
            .and_then(|m| m.as_string())
            .unwrap_or_else(|| format!("{value:?}"));
        Self { message }
    }
}

pub type LoadResult = Result<(), LoadError>;

pub type LoadFuture = Pin<Box<dyn Future<Output = LoadResult>>>;

/// Caller-supplied loader for the next page.
///
/// The loader is invoked synchronously when a load starts; the returned
/// future is driven on the local executor. It must eventually complete: a
/// future that never resolves keeps both tracks blocked.
#[derive(Clone)]
pub struct LoadMore(Rc<dyn Fn() -> LoadFuture>);

impl LoadMore {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = LoadResult> + 'static,
    {
        Self(Rc::new(move || Box::pin(f())))
    }

    /// Loader that finishes its work before returning.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn() -> LoadResult + 'static,
    {
        Self::new(move || std::future::ready(f()))
    }

    pub(crate) fn invoke(&self) -> LoadFuture {
        (self.0)()
    }
}

impl fmt::Debug for LoadMore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LoadMore(..)")
    }
}

/// One value per load track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tracks<T> {
    pub primary: T,
    pub prefetch: T,
}

impl<T> Index<LoadKind> for Tracks<T> {
    type Output = T;

    fn index(&self, kind: LoadKind) -> &T {
        match kind {
            LoadKind::Primary => &self.primary,
            LoadKind::Prefetch => &self.prefetch,
        }
    }
}

impl<T> IndexMut<LoadKind> for Tracks<T> {
    fn index_mut(&mut self, kind: LoadKind) -> &mut T {
        match kind {
            LoadKind::Primary => &mut self.primary,
            LoadKind::Prefetch => &mut self.prefetch,
        }
    }
}
