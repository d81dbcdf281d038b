//! Demo pages mounted by the wasm entry point: a forward feed and a reverse
//! chat log, both backed by a fake paged source.

use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use crate::components::ScrollList;
use crate::config::{ScrollDirection, ScrollListOptions};
use crate::load::{LoadError, LoadMore};
use crate::render::EndMessage;
use crate::util::{now_ms, sleep};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes, A};
use leptos_router::path;

const PAGE_SIZE: usize = 20;
const FEED_PAGES: usize = 6;
const CHAT_PAGES: usize = 4;
// Page that fails on its first attempt, to show the retry affordance.
const FLAKY_PAGE: usize = 3;

#[derive(Clone, Debug, PartialEq)]
struct FeedItem {
    id: usize,
    title: String,
}

#[derive(Clone, Debug, PartialEq)]
struct ChatMessage {
    id: usize,
    author: &'static str,
    body: String,
}

fn feed_page(page: usize) -> Vec<FeedItem> {
    (0..PAGE_SIZE)
        .map(|i| {
            let id = page * PAGE_SIZE + i;
            FeedItem {
                id,
                title: format!("Post #{}", id + 1),
            }
        })
        .collect()
}

/// Older messages come first in the returned page.
fn chat_page(page: usize) -> Vec<ChatMessage> {
    let newest = 1_000 - page * PAGE_SIZE;
    (0..PAGE_SIZE)
        .rev()
        .map(|i| {
            let id = newest - i;
            ChatMessage {
                id,
                author: if id % 3 == 0 { "you" } else { "ferris" },
                body: format!("message {id}"),
            }
        })
        .collect()
}

#[component]
fn DemoNav() -> impl IntoView {
    view! {
        <nav class="mb-6 flex items-center gap-4 text-sm">
            <A href="/">"Feed"</A>
            <A href="/chat">"Chat (reverse)"</A>
        </nav>
    }
}

#[component]
pub fn FeedDemo() -> impl IntoView {
    let items: RwSignal<Vec<FeedItem>> = RwSignal::new(vec![]);
    let has_more = RwSignal::new(true);
    let next_page = RwSignal::new(0usize);
    let flaky_failed = RwSignal::new(false);
    let last_error: RwSignal<Option<String>> = RwSignal::new(None);

    let load_more = LoadMore::new(move || async move {
        sleep(500).await;

        let page = next_page.get_untracked();
        if page == FLAKY_PAGE && !flaky_failed.get_untracked() {
            flaky_failed.set(true);
            return Err(LoadError::new("Could not reach the feed service."));
        }

        items.update(|list| list.extend(feed_page(page)));
        next_page.set(page + 1);
        if page + 1 >= FEED_PAGES {
            has_more.set(false);
        }
        Ok(())
    });

    let options = ScrollListOptions {
        initial_load: true,
        enable_prefetch: true,
        prefetch_offset: 400.0,
        retry_on_error: true,
        debounce_ms: 120,
        ..ScrollListOptions::from_env()
    };

    let loaded_at = now_ms();
    let end_message = EndMessage::lazy(move || {
        let secs = (now_ms() - loaded_at) / 1000;
        format!("That's everything. Feed opened {secs}s ago.")
    });

    let on_reset = move |_| {
        items.set(vec![]);
        next_page.set(0);
        flaky_failed.set(false);
        has_more.set(true);
    };

    view! {
        <div class="mx-auto w-full max-w-xl px-4 py-8">
            <DemoNav />
            <div class="mb-4 flex items-center justify-between">
                <h1 class="text-xl font-semibold">"Feed"</h1>
                <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=on_reset>
                    "Reset"
                </Button>
            </div>

            <Show when=move || last_error.get().is_some() fallback=|| ().into_view()>
                <p class="mb-2 text-xs text-muted-foreground">
                    {move || last_error.get().map(|e| format!("Last error: {e}"))}
                </p>
            </Show>

            <ScrollList
                has_more=has_more
                load_more=load_more
                options=options
                end_message=end_message
                on_error=move |e: LoadError| last_error.set(Some(e.message))
                class="gap-2"
            >
                <For
                    each=move || items.get()
                    key=|item| item.id
                    children=move |item: FeedItem| {
                        view! {
                            <div class="rounded-md border px-4 py-6 text-sm">{item.title}</div>
                        }
                    }
                />
            </ScrollList>
        </div>
    }
}

#[component]
pub fn ChatDemo() -> impl IntoView {
    let messages: RwSignal<Vec<ChatMessage>> = RwSignal::new(vec![]);
    let has_more = RwSignal::new(true);
    let next_page = RwSignal::new(0usize);

    let load_more = LoadMore::new(move || async move {
        sleep(400).await;
        let page = next_page.get_untracked();
        messages.update(|list| {
            let mut older = chat_page(page);
            older.append(list);
            *list = older;
        });
        next_page.set(page + 1);
        if page + 1 >= CHAT_PAGES {
            has_more.set(false);
        }
        Ok(())
    });

    let options = ScrollListOptions {
        reverse: true,
        scroll_direction: ScrollDirection::Up,
        initial_load: true,
        ..ScrollListOptions::from_env()
    };

    view! {
        <div class="mx-auto w-full max-w-xl px-4 py-8">
            <DemoNav />
            <h1 class="mb-4 text-xl font-semibold">"Chat"</h1>
            <ScrollList
                has_more=has_more
                load_more=load_more
                options=options
                end_message="Beginning of conversation"
                class="gap-1"
            >
                <For
                    each=move || messages.get()
                    key=|m| m.id
                    children=move |m: ChatMessage| {
                        let align = if m.author == "you" { "self-end bg-primary text-primary-foreground" } else { "self-start bg-muted" };
                        view! {
                            <div class=format!("max-w-[80%] rounded-lg px-3 py-2 text-sm {align}")>
                                <span class="mr-2 text-xs opacity-70">{m.author}</span>
                                {m.body}
                            </div>
                        }
                    }
                />
            </ScrollList>
        </div>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - `use_location()`/router hooks require a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("chat") view=ChatDemo />
                <Route path=path!("") view=FeedDemo />
            </Routes>
        </Router>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_pages_are_contiguous() {
        let first = feed_page(0);
        let second = feed_page(1);
        assert_eq!(first.len(), PAGE_SIZE);
        assert_eq!(first.last().map(|i| i.id + 1), second.first().map(|i| i.id));
        assert_eq!(first[0].title, "Post #1");
    }

    #[test]
    fn test_chat_pages_are_oldest_first_and_go_back_in_time() {
        let newest = chat_page(0);
        let older = chat_page(1);
        assert!(newest.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(older.last().map(|m| m.id + 1), newest.first().map(|m| m.id));
    }
}
