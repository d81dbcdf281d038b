use crate::components::ui::{Button, ButtonSize, ButtonVariant, Notice, NoticeText, Spinner};
use crate::config::ScrollListOptions;
use crate::load::{
    BrowserScheduler, DriverHooks, LoadDriver, LoadError, LoadKind, LoadMore, LoadState, Scheduler,
};
use crate::render::{around_children, Affordance, EndMessage, Layout, Slot};
use crate::visibility::{
    current_scroll_offset, observation_supported, IntersectionEvent, ScrollMemory,
    VisibilityWatcher, WatchOptions,
};
use leptos::ev;
use leptos::html;
use leptos::logging::{debug_warn, log};
use leptos::prelude::*;
use std::rc::Rc;
use tw_merge::tw_merge;

type Driver = StoredValue<LoadDriver<BrowserScheduler>, LocalStorage>;

/// Infinite-scroll list.
///
/// Renders `children` and calls `load_more` when a sentinel at the list edge
/// (the top edge when `options.reverse`) scrolls into view. While `has_more`
/// is false the sentinels are gone and `end_message` is shown instead.
///
/// ```ignore
/// <ScrollList
///     has_more=has_more
///     load_more=LoadMore::new(move || fetch_next_page(page))
///     options=ScrollListOptions { enable_prefetch: true, ..Default::default() }
///     end_message="You're all caught up"
/// >
///     <For each=move || items.get() key=|i| i.id let:item>
///         <FeedRow item />
///     </For>
/// </ScrollList>
/// ```
#[component]
pub fn ScrollList(
    children: ChildrenFn,
    #[prop(into)] has_more: Signal<bool>,
    load_more: LoadMore,
    /// Falls back to `ScrollListOptions::from_env()` when not given.
    #[prop(into, optional)]
    options: MaybeProp<ScrollListOptions>,
    /// Replaces the default spinner shown while more items are expected.
    #[prop(into, optional)]
    loading: Option<ViewFn>,
    #[prop(into, optional)] end_message: Option<EndMessage>,
    #[prop(into, optional)] on_error: Option<Callback<LoadError>>,
    #[prop(into, optional)] class: String,
    #[prop(into, optional)] loader_class: String,
) -> impl IntoView {
    let env_defaults = ScrollListOptions::from_env();
    let resolved = Memo::new(move |_| options.get().unwrap_or_else(|| env_defaults.clone()));

    let load_state: RwSignal<LoadState> = RwSignal::new(LoadState::default());
    let scroll_memory = StoredValue::new(ScrollMemory::default());
    let primary_ref: NodeRef<html::Div> = NodeRef::new();
    let prefetch_ref: NodeRef<html::Div> = NodeRef::new();

    let hooks = DriverHooks {
        on_error: on_error.map(|cb| Rc::new(move |e: &LoadError| cb.run(e.clone())) as Rc<dyn Fn(&LoadError)>),
        on_change: Some(Rc::new(move |s: &LoadState| {
            // The list may be gone by the time a load settles.
            let _ = load_state.try_set(s.clone());
        })),
    };
    let driver: Driver = StoredValue::new_local(LoadDriver::new(
        BrowserScheduler,
        load_more,
        resolved.get_untracked().debounce_ms,
        hooks,
    ));

    if !observation_supported() {
        log!("scroll-list: IntersectionObserver unavailable, scroll loading disabled");
    }

    let sentinels = Sentinels {
        has_more,
        options: resolved,
        load_state,
        driver,
        scroll_memory,
    };
    sentinels.watch(LoadKind::Primary, primary_ref);
    sentinels.watch(LoadKind::Prefetch, prefetch_ref);

    Effect::new(move |_| {
        let opts = resolved.get();
        if let Some(d) = driver.try_get_value() {
            apply_options(&d, &opts);
        }
    });

    Effect::new(move |previous: Option<bool>| {
        let current = has_more.get();
        match driver.try_get_value() {
            Some(d) => follow_has_more(&d, previous, current),
            None => current,
        }
    });

    Effect::new(move |_| {
        if resolved.with_untracked(|o| o.initial_load) {
            if let Some(d) = driver.try_get_value() {
                d.initial_load(has_more.get_untracked());
            }
        }
    });

    let on_retry = move |_: ev::MouseEvent| {
        if let Some(d) = driver.try_get_value() {
            d.retry();
        }
    };

    let affordance = move || {
        let retry_on_error = resolved.with(|o| o.retry_on_error);
        match load_state.with(|s| Affordance::for_state(retry_on_error, s)) {
            Affordance::Loading => match &loading {
                Some(custom) => custom.run(),
                None => view! { <LoadingMore /> }.into_any(),
            },
            Affordance::Failed { message } => view! {
                <Notice class="border-destructive/30" attr:role="alert">
                    <NoticeText class="text-destructive">{message}</NoticeText>
                    <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_retry>
                        "Retry"
                    </Button>
                </Notice>
            }
            .into_any(),
        }
    };

    let has_end_message = end_message.is_some();
    let layout = Memo::new(move |_| {
        let (reverse, enable_prefetch) = resolved.with(|o| (o.reverse, o.enable_prefetch));
        Layout {
            has_more: has_more.get(),
            reverse,
            enable_prefetch,
            has_end_message,
        }
    });
    let before = Memo::new(move |_| around_children(layout.get()).before);
    let after = Memo::new(move |_| around_children(layout.get()).after);

    let merged_class = tw_merge!("flex w-full flex-col", class);
    let loader_class = tw_merge!("flex w-full justify-center py-3", loader_class);

    let render_slots = move |slots: Vec<Slot>| {
        slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Children => ().into_any(),
                Slot::PrefetchSentinel => view! {
                    <div
                        node_ref=prefetch_ref
                        data-scroll-sentinel="prefetch"
                        aria-hidden="true"
                        style="height:1px;margin-top:-1px;pointer-events:none;visibility:hidden"
                    ></div>
                }
                .into_any(),
                Slot::Affordance => {
                    let affordance = affordance.clone();
                    view! {
                        <div data-name="ScrollListLoader" class=loader_class.clone()>
                            {affordance}
                        </div>
                    }
                    .into_any()
                }
                Slot::PrimarySentinel => view! {
                    <div node_ref=primary_ref data-scroll-sentinel="primary" class="h-px w-full"></div>
                }
                .into_any(),
                Slot::EndMessage => {
                    let text = end_message.as_ref().map(EndMessage::resolve).unwrap_or_default();
                    view! {
                        <div data-name="ScrollListEnd" class="py-4 text-center text-xs text-muted-foreground">
                            {text}
                        </div>
                    }
                    .into_any()
                }
            })
            .collect_view()
    };
    let render_before = render_slots.clone();

    // Children are rendered once; only the slots around them follow the layout.
    view! {
        <div data-name="ScrollList" class=merged_class>
            {move || render_before(before.get())}
            {children()}
            {move || render_slots(after.get())}
        </div>
    }
}

#[component]
fn LoadingMore() -> impl IntoView {
    view! {
        <span class="inline-flex items-center gap-2 text-xs text-muted-foreground">
            <Spinner />
            "Loading more..."
        </span>
    }
}

/// Reactive inputs shared by both sentinel watchers.
#[derive(Clone, Copy)]
struct Sentinels {
    has_more: Signal<bool>,
    options: Memo<ScrollListOptions>,
    load_state: RwSignal<LoadState>,
    driver: Driver,
    scroll_memory: StoredValue<ScrollMemory>,
}

impl Sentinels {
    /// Keeps one `IntersectionObserver` on `sentinel` for as long as the node
    /// exists and `kind` is wanted. Any change to the node, `has_more` or the
    /// options drops the old subscription and cancels that track's pending
    /// debounce before subscribing again.
    fn watch(self, kind: LoadKind, sentinel: NodeRef<html::Div>) {
        let Sentinels {
            has_more,
            options,
            load_state,
            driver,
            scroll_memory,
        } = self;
        let watcher: StoredValue<Option<VisibilityWatcher>, LocalStorage> = StoredValue::new_local(None);

        Effect::new(move |_| {
            let node = sentinel.get();
            let has_more_now = has_more.get();
            let opts = options.get();

            watcher.update_value(|w| *w = None);
            let Some(d) = driver.try_get_value() else {
                return;
            };
            let Some(watch) = resubscribe(&d, kind, has_more_now, &opts) else {
                return;
            };
            let Some(node) = node else {
                return;
            };
            if !observation_supported() {
                return;
            }

            let direction = opts.scroll_direction;
            let next = VisibilityWatcher::observe(node.as_ref(), &watch, move |event: IntersectionEvent| {
                if !event.is_intersecting {
                    return;
                }
                let direction_allows = scroll_memory
                    .try_update_value(|m| m.check(current_scroll_offset(), direction))
                    .unwrap_or(true);
                if let Some(d) = driver.try_get_value() {
                    if let Err(skip) = d.trigger(kind, has_more.get_untracked(), direction_allows) {
                        debug_warn!("scroll-list: {kind} trigger skipped: {skip}");
                    }
                }
            });
            watcher.set_value(next);
        });

        // A load that settles while the sentinel is still in view produces no
        // new intersection, so ask the observer for the current one.
        Effect::new(move |previous: Option<u64>| {
            let completed = load_state.with(|s| s.completed_loads);
            if changed(previous, &completed) {
                let _ = watcher.try_with_value(|w| {
                    if let Some(w) = w {
                        w.rearm();
                    }
                });
            }
            completed
        });

        on_cleanup(move || {
            let _ = watcher.try_update_value(|w| *w = None);
        });
    }
}

/// Whether an effect input differs from the value seen on its previous run.
/// The first run is never a change.
fn changed<T: PartialEq>(previous: Option<T>, current: &T) -> bool {
    previous.is_some_and(|p| p != *current)
}

/// Every `has_more` flip is a page boundary and re-arms prefetch.
fn follow_has_more<S: Scheduler>(driver: &LoadDriver<S>, previous: Option<bool>, current: bool) -> bool {
    if changed(previous, &current) {
        driver.page_changed();
    }
    current
}

/// Forgets the pending debounce of `kind` and returns what its sentinel
/// should be observed with, or `None` when the sentinel is not wanted.
fn resubscribe<S: Scheduler>(
    driver: &LoadDriver<S>,
    kind: LoadKind,
    has_more: bool,
    options: &ScrollListOptions,
) -> Option<WatchOptions> {
    driver.cancel_pending(kind);
    let wanted = has_more && (kind == LoadKind::Primary || options.enable_prefetch);
    wanted.then(|| match kind {
        LoadKind::Primary => options.primary_watch_options(),
        LoadKind::Prefetch => options.prefetch_watch_options(),
    })
}

fn apply_options<S: Scheduler>(driver: &LoadDriver<S>, options: &ScrollListOptions) {
    driver.set_debounce_ms(options.debounce_ms);
}
