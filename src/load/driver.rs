use super::coordinator::{LoadCoordinator, LoadState, Skip, TriggerGate};
use super::scheduler::Scheduler;
use super::{LoadError, LoadKind, LoadMore, Tracks};
use leptos::logging::{debug_warn, warn};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Side channels the driver reports through.
#[derive(Clone, Default)]
pub struct DriverHooks {
    /// Called once per failed load, before the active flag is cleared.
    pub on_error: Option<Rc<dyn Fn(&LoadError)>>,
    /// Called after every state transition with a snapshot.
    pub on_change: Option<Rc<dyn Fn(&LoadState)>>,
}

struct DriverState<T> {
    coordinator: LoadCoordinator,
    debounce_ms: u32,
    timers: Tracks<Option<T>>,
    initial_load_done: bool,
}

struct Shared<S: Scheduler> {
    scheduler: S,
    loader: LoadMore,
    hooks: DriverHooks,
    state: RefCell<DriverState<S::Timer>>,
}

/// Runs a [`LoadCoordinator`] against real time: owns one debounce timer per
/// track and the loader futures.
///
/// Cheap to clone. Timers and in-flight loads only hold weak references, so
/// once the last handle is dropped pending timers are cancelled and late
/// completions are ignored.
pub struct LoadDriver<S: Scheduler> {
    shared: Rc<Shared<S>>,
}

impl<S: Scheduler> Clone for LoadDriver<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<S: Scheduler> LoadDriver<S> {
    pub fn new(scheduler: S, loader: LoadMore, debounce_ms: u32, hooks: DriverHooks) -> Self {
        Self {
            shared: Rc::new(Shared {
                scheduler,
                loader,
                hooks,
                state: RefCell::new(DriverState {
                    coordinator: LoadCoordinator::new(),
                    debounce_ms,
                    timers: Tracks::default(),
                    initial_load_done: false,
                }),
            }),
        }
    }

    fn from_weak(weak: &Weak<Shared<S>>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    pub fn state(&self) -> LoadState {
        self.shared.state.borrow().coordinator.state().clone()
    }

    pub fn set_debounce_ms(&self, debounce_ms: u32) {
        self.shared.state.borrow_mut().debounce_ms = debounce_ms;
    }

    fn notify(&self) {
        if let Some(on_change) = &self.shared.hooks.on_change {
            let snapshot = self.state();
            on_change(&snapshot);
        }
    }

    /// Entry point for intersection events.
    pub fn trigger(&self, kind: LoadKind, has_more: bool, direction_allows: bool) -> Result<(), Skip> {
        let debounce_ms = {
            let mut st = self.shared.state.borrow_mut();
            st.coordinator.try_trigger(
                kind,
                TriggerGate {
                    has_more,
                    direction_allows,
                },
            )?;
            st.debounce_ms
        };
        self.notify();

        if debounce_ms == 0 {
            self.call(kind);
        } else {
            self.schedule(kind, debounce_ms);
        }
        Ok(())
    }

    /// (Re)starts the debounce timer of `kind`; the previous one is cancelled.
    fn schedule(&self, kind: LoadKind, debounce_ms: u32) {
        let weak = Rc::downgrade(&self.shared);
        let timer = self.shared.scheduler.delay(
            debounce_ms,
            Box::new(move || {
                let Some(driver) = Self::from_weak(&weak) else {
                    return;
                };
                let fired = driver.shared.state.borrow_mut().timers[kind].take();
                drop(fired);
                driver.call(kind);
            }),
        );

        let Some(timer) = timer else {
            warn!("scroll-list: could not debounce {kind} load; calling now");
            let previous = self.shared.state.borrow_mut().timers[kind].take();
            drop(previous);
            self.call(kind);
            return;
        };

        let previous = self.shared.state.borrow_mut().timers[kind].replace(timer);
        drop(previous);
    }

    /// Drops the debounce timer of `kind`, if any. The trigger it carried
    /// counts as never fired.
    pub fn cancel_pending(&self, kind: LoadKind) {
        let pending = {
            let mut st = self.shared.state.borrow_mut();
            let pending = st.timers[kind].take();
            if pending.is_some() {
                st.coordinator.abandon(kind);
            }
            pending
        };
        if pending.is_some() {
            drop(pending);
            self.notify();
        }
    }

    pub fn has_pending(&self, kind: LoadKind) -> bool {
        self.shared.state.borrow().timers[kind].is_some()
    }

    /// Starts a load of `kind` now, unless one is already running.
    pub fn call(&self, kind: LoadKind) -> bool {
        let started = {
            let mut st = self.shared.state.borrow_mut();
            let started = st.coordinator.begin(kind);
            if !started {
                st.coordinator.abandon(kind);
            }
            started
        };
        if !started {
            debug_warn!("scroll-list: dropped {kind} load, another load is running");
            self.notify();
            return false;
        }
        self.notify();

        let future = self.shared.loader.invoke();
        let weak = Rc::downgrade(&self.shared);
        self.shared.scheduler.spawn(Box::pin(async move {
            let result = future.await;
            // Unmounted while loading: nothing left to update.
            if let Some(driver) = Self::from_weak(&weak) {
                driver.finish(kind, result);
            }
        }));
        true
    }

    fn finish(&self, kind: LoadKind, result: Result<(), LoadError>) {
        if result.is_ok() {
            self.shared.state.borrow_mut().coordinator.record_success();
        }
        if let Err(error) = result {
            warn!("scroll-list: {kind} load failed: {error}");
            self.shared
                .state
                .borrow_mut()
                .coordinator
                .record_failure(error.clone());
            if let Some(on_error) = &self.shared.hooks.on_error {
                on_error(&error);
            }
        }
        self.shared.state.borrow_mut().coordinator.settle(kind);
        self.notify();
    }

    /// Fires the primary load once per driver, without waiting for a sentinel.
    pub fn initial_load(&self, has_more: bool) -> bool {
        {
            let mut st = self.shared.state.borrow_mut();
            if st.initial_load_done {
                return false;
            }
            st.initial_load_done = true;
        }
        self.start_primary_now(has_more)
    }

    /// Clears the recorded error and loads the primary page right away.
    pub fn retry(&self) -> bool {
        let pending = {
            let mut st = self.shared.state.borrow_mut();
            st.coordinator.clear_error();
            st.timers.primary.take()
        };
        drop(pending);
        self.notify();
        self.start_primary_now(true)
    }

    fn start_primary_now(&self, has_more: bool) -> bool {
        let admitted = self.shared.state.borrow_mut().coordinator.try_trigger(
            LoadKind::Primary,
            TriggerGate {
                has_more,
                direction_allows: true,
            },
        );
        if let Err(skip) = admitted {
            debug_warn!("scroll-list: primary load skipped: {skip}");
            return false;
        }
        self.call(LoadKind::Primary)
    }

    /// `has_more` flipped: the next page may be prefetched again.
    pub fn page_changed(&self) {
        self.shared.state.borrow_mut().coordinator.page_changed();
        self.notify();
    }
}
