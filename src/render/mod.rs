use crate::load::LoadState;
use std::fmt;
use std::sync::Arc;

/// The inputs that decide which nodes exist and in what order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub has_more: bool,
    pub reverse: bool,
    pub enable_prefetch: bool,
    pub has_end_message: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Children,
    PrefetchSentinel,
    Affordance,
    PrimarySentinel,
    EndMessage,
}

/// Orders the list's nodes. Forward lists end with the sentinels, reverse
/// lists start with them.
pub fn compose(layout: Layout) -> Vec<Slot> {
    let mut slots = vec![Slot::Children];

    if layout.has_more {
        if layout.enable_prefetch {
            slots.push(Slot::PrefetchSentinel);
        }
        slots.push(Slot::Affordance);
        slots.push(Slot::PrimarySentinel);
    } else if layout.has_end_message {
        slots.push(Slot::EndMessage);
    }

    if layout.reverse {
        slots.reverse();
    }
    slots
}

/// The slots on either side of the children.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Around {
    pub before: Vec<Slot>,
    pub after: Vec<Slot>,
}

/// Splits [`compose`] at the children, which are rendered once and never
/// move; only the slots around them change with the layout.
pub fn around_children(layout: Layout) -> Around {
    let mut slots = compose(layout);
    let Some(at) = slots.iter().position(|s| *s == Slot::Children) else {
        return Around {
            before: Vec::new(),
            after: slots,
        };
    };
    let after = slots.split_off(at + 1);
    slots.pop();
    Around {
        before: slots,
        after,
    }
}

/// What the loading area shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Affordance {
    Loading,
    Failed { message: String },
}

impl Affordance {
    /// Errors are only surfaced when the list offers a retry; otherwise the
    /// loading affordance stays up and the caller hears about it via `on_error`.
    pub fn for_state(retry_on_error: bool, state: &LoadState) -> Self {
        match &state.last_error {
            Some(error) if retry_on_error => Affordance::Failed {
                message: error.to_string(),
            },
            _ => Affordance::Loading,
        }
    }
}

/// Text shown once the list is exhausted.
#[derive(Clone)]
pub enum EndMessage {
    Static(String),
    /// Evaluated every time the message is rendered.
    Lazy(Arc<dyn Fn() -> String + Send + Sync>),
}

impl EndMessage {
    pub fn lazy(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        EndMessage::Lazy(Arc::new(f))
    }

    pub fn resolve(&self) -> String {
        match self {
            EndMessage::Static(text) => text.clone(),
            EndMessage::Lazy(f) => f(),
        }
    }
}

impl fmt::Debug for EndMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndMessage::Static(text) => f.debug_tuple("Static").field(text).finish(),
            EndMessage::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl From<&str> for EndMessage {
    fn from(text: &str) -> Self {
        EndMessage::Static(text.to_string())
    }
}

impl From<String> for EndMessage {
    fn from(text: String) -> Self {
        EndMessage::Static(text)
    }
}
