use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Notice, div, "flex w-full items-center justify-between gap-3 rounded-lg border px-4 py-3 text-sm"}
    clx! {NoticeText, p, "text-sm leading-relaxed"}
}

pub use components::*;
