use super::{LoadError, LoadKind};

/// Observable load status of one `ScrollList`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadState {
    pub is_loading: bool,
    pub is_prefetching: bool,
    pub last_error: Option<LoadError>,
    /// Set by a prefetch, cleared by a primary load or a page change.
    pub has_prefetched_since_last_page: bool,
    /// Loads that finished without an error since mount.
    pub completed_loads: u64,
}

impl LoadState {
    pub fn is_busy(&self) -> bool {
        self.is_loading || self.is_prefetching
    }

    pub fn is_active(&self, kind: LoadKind) -> bool {
        match kind {
            LoadKind::Primary => self.is_loading,
            LoadKind::Prefetch => self.is_prefetching,
        }
    }

    fn set_active(&mut self, kind: LoadKind, active: bool) {
        match kind {
            LoadKind::Primary => self.is_loading = active,
            LoadKind::Prefetch => self.is_prefetching = active,
        }
    }
}

/// Inputs outside the coordinator that decide whether a trigger may fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerGate {
    pub has_more: bool,
    pub direction_allows: bool,
}

impl TriggerGate {
    pub fn open() -> Self {
        Self {
            has_more: true,
            direction_allows: true,
        }
    }
}

/// Why a trigger was ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Skip {
    #[strum(to_string = "a load is already running")]
    Busy,
    #[strum(to_string = "no more pages")]
    Exhausted,
    #[strum(to_string = "already prefetched this page")]
    AlreadyPrefetched,
    #[strum(to_string = "scroll direction filtered")]
    WrongDirection,
}

/// Two-track load state machine (primary and prefetch) behind a single
/// busy gate: nothing starts while either track is active.
#[derive(Clone, Debug, Default)]
pub struct LoadCoordinator {
    state: LoadState,
}

impl LoadCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Admits or rejects a trigger. On admission the prefetch guard is
    /// updated right away: a primary trigger re-arms prefetch, a prefetch
    /// trigger disarms it until the next page.
    pub fn try_trigger(&mut self, kind: LoadKind, gate: TriggerGate) -> Result<(), Skip> {
        if !gate.has_more {
            return Err(Skip::Exhausted);
        }
        if self.state.is_busy() {
            return Err(Skip::Busy);
        }
        if kind == LoadKind::Prefetch && self.state.has_prefetched_since_last_page {
            return Err(Skip::AlreadyPrefetched);
        }
        if !gate.direction_allows {
            return Err(Skip::WrongDirection);
        }

        self.state.has_prefetched_since_last_page = kind == LoadKind::Prefetch;
        Ok(())
    }

    /// Marks `kind` as running. Returns false when the other track (or this
    /// one) got there first, e.g. after a debounce window elapsed.
    pub fn begin(&mut self, kind: LoadKind) -> bool {
        if self.state.is_busy() {
            return false;
        }
        self.state.set_active(kind, true);
        self.state.last_error = None;
        true
    }

    /// An admitted trigger of `kind` never reached the loader (its debounce
    /// timer was cancelled or `begin` refused it). A prefetch that did not run
    /// must not hold the guard for the rest of the page.
    pub fn abandon(&mut self, kind: LoadKind) {
        if kind == LoadKind::Prefetch {
            self.state.has_prefetched_since_last_page = false;
        }
    }

    pub fn record_success(&mut self) {
        self.state.completed_loads += 1;
    }

    pub fn record_failure(&mut self, error: LoadError) {
        self.state.last_error = Some(error);
    }

    pub fn settle(&mut self, kind: LoadKind) {
        self.state.set_active(kind, false);
    }

    pub fn clear_error(&mut self) {
        self.state.last_error = None;
    }

    pub fn page_changed(&mut self) {
        self.state.has_prefetched_since_last_page = false;
    }
}
