//! Bridge coroutines to Rust futures.
//!
//! An async host function is wrapped as a `LuaFunction` that suspends with
//! a `Pending` payload carrying the future. `AsyncThread` drives a
//! coroutine: whenever the coroutine suspends on a pending future it polls
//! that future and resumes the coroutine with its output.
//!
//! ```text
//! AsyncThread::poll()
//!   ├── pending future? → poll it
//!   │     ├── Pending → Poll::Pending
//!   │     └── Ready(values) → resume(values) → check again
//!   └── no pending future → resume(args)
//!         ├── returned / failed → Poll::Ready
//!         ├── Pending(future) → store it, poll it
//!         └── normal yield → wake & Poll::Pending
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tracing::debug;

use crate::lua_value::{LuaFunction, LuaValue, ResumeOutcome, ThreadRef};
use crate::lua_vm::LuaError;
use crate::lua_vm::suspension::AsyncFuture;

/// Drives a coroutine to completion as a `Future`.
///
/// Not `Send`: poll it from the thread that owns the engine, e.g. on a
/// current-thread runtime or a `LocalSet`.
pub struct AsyncThread {
    thread: ThreadRef,

    /// Future the coroutine is currently waiting on
    pending: Option<AsyncFuture>,

    /// Arguments for the next resume
    resume_args: Option<Vec<LuaValue>>,
}

impl AsyncThread {
    pub fn new(thread: ThreadRef, args: Vec<LuaValue>) -> Self {
        AsyncThread {
            thread,
            pending: None,
            resume_args: Some(args),
        }
    }

    pub fn thread(&self) -> &ThreadRef {
        &self.thread
    }
}

impl Future for AsyncThread {
    type Output = Result<Vec<LuaValue>, LuaError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        loop {
            if let Some(future) = this.pending.as_mut() {
                match future.as_mut().poll(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Ok(values)) => {
                        debug!(values = values.len(), "async call ready");
                        this.pending = None;
                        this.resume_args = Some(values);
                    }
                    Poll::Ready(Err(e)) => {
                        this.pending = None;
                        return Poll::Ready(Err(e));
                    }
                }
            }

            let args = this.resume_args.take().unwrap_or_default();
            match this.thread.resume(&args) {
                Ok(ResumeOutcome::Returned(values)) => return Poll::Ready(Ok(values)),
                Ok(ResumeOutcome::Pending(future)) => {
                    debug!("async call pending");
                    this.pending = Some(future);
                }
                Ok(ResumeOutcome::Yielded(_)) => {
                    // plain yields give the executor a turn and continue
                    cx.waker().wake_by_ref();
                    return Poll::Pending;
                }
                Err(e) => return Poll::Ready(Err(e)),
            }
        }
    }
}

/// Wrap an async host function as a `LuaFunction`.
///
/// When called, the function builds its future from the arguments and
/// suspends; under an `AsyncThread` the future's output becomes the call's
/// results.
pub fn wrap_async_function<F, Fut>(f: F) -> LuaFunction
where
    F: Fn(Vec<LuaValue>) -> Fut + 'static,
    Fut: Future<Output = Result<Vec<LuaValue>, LuaError>> + 'static,
{
    LuaFunction::from_fn(move |lua_state, args| {
        let future = f(args.to_vec());
        lua_state.await_future(Box::pin(future))
    })
}
