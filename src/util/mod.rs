use leptos_dom::helpers::{set_timeout_with_handle, TimeoutHandle};
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

#[derive(Default)]
struct SleepState {
    done: bool,
    waker: Option<Waker>,
}

/// Resolves after `ms` on the browser clock. Dropping it clears the timeout.
pub(crate) struct Sleep {
    state: Rc<RefCell<SleepState>>,
    handle: Option<TimeoutHandle>,
}

pub(crate) fn sleep(ms: u32) -> Sleep {
    let state = Rc::new(RefCell::new(SleepState::default()));
    let s2 = state.clone();
    let handle = set_timeout_with_handle(
        move || {
            let waker = {
                let mut s = s2.borrow_mut();
                s.done = true;
                s.waker.take()
            };
            if let Some(waker) = waker {
                waker.wake();
            }
        },
        Duration::from_millis(ms.into()),
    )
    .ok();

    // Could not schedule: resolve right away instead of hanging.
    if handle.is_none() {
        state.borrow_mut().done = true;
    }

    Sleep { state, handle }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut s = self.state.borrow_mut();
        if s.done {
            Poll::Ready(())
        } else {
            s.waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.clear();
        }
    }
}
