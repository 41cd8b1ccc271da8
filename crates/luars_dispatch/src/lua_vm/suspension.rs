//! Suspend/resume plumbing.
//!
//! A suspension travels outward through `Unwind::Suspend`. Every dispatcher
//! call it crosses that still has work to do after the inner call returns
//! pushes a `ContinuationFrame` describing that work. A driver later replays
//! the chain: the innermost frame resumes first with the values the
//! suspended call should have produced, writes its own outcome into the
//! return buffer, and that outcome feeds the next frame.
//!
//! ```text
//! le(A, B) -> __lt(B, A) -> yield
//!   unwind:  [yield-frame] -> [yield-frame, negate-frame]
//!   resume(true): yield-frame passes `true` through, negate-frame writes `false`
//! ```

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::lua_value::LuaValue;
use crate::lua_vm::execute::call::evaluate_tail_calls;
use crate::lua_vm::{LuaError, LuaResult, LuaState, Unwind};

/// Host operation that completes asynchronously. Not `Send`: it runs on the
/// thread that owns the execution context.
pub type AsyncFuture = Pin<Box<dyn Future<Output = Result<Vec<LuaValue>, LuaError>>>>;

/// Something that knows how to finish a dispatcher step once the call it
/// was waiting on has produced its results.
///
/// On entry the return buffer holds those results; `state` is the data the
/// frame saved when it was captured.
pub trait Resumable {
    fn resume(&self, lua_state: &mut LuaState, state: Box<dyn Any>) -> LuaResult<()>;
}

/// Downcast a frame's saved state, failing if a frame was paired with state
/// of the wrong type.
pub fn suspended_state<T: Any>(state: Box<dyn Any>) -> Result<Box<T>, LuaError> {
    state.downcast::<T>().map_err(|_| LuaError::BadSuspendedState)
}

pub struct ContinuationFrame {
    resumable: Rc<dyn Resumable>,
    state: Box<dyn Any>,
}

impl ContinuationFrame {
    pub fn new(resumable: Rc<dyn Resumable>, state: impl Any) -> Self {
        ContinuationFrame {
            resumable,
            state: Box::new(state),
        }
    }

    /// Consume the frame, finishing its step.
    pub fn resume(self, lua_state: &mut LuaState) -> LuaResult<()> {
        trace!("resuming continuation frame");
        self.resumable.resume(lua_state, self.state)
    }
}

impl fmt::Debug for ContinuationFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContinuationFrame")
    }
}

/// Frames of one suspension, innermost first.
#[derive(Debug, Default)]
pub struct ContinuationChain {
    frames: VecDeque<ContinuationFrame>,
}

impl ContinuationChain {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames from innermost to outermost.
    pub fn iter(&self) -> impl Iterator<Item = &ContinuationFrame> {
        self.frames.iter()
    }

    /// Record a frame while unwinding; each push is further out than the last.
    pub fn push_outer(&mut self, frame: ContinuationFrame) {
        trace!(depth = self.frames.len(), "captured continuation frame");
        self.frames.push_back(frame);
    }

    pub fn pop_innermost(&mut self) -> Option<ContinuationFrame> {
        self.frames.pop_front()
    }

    /// Put the frames of an older, partially replayed chain behind ours.
    pub fn append_outer(&mut self, mut older: ContinuationChain) {
        self.frames.append(&mut older.frames);
    }

    /// Replay the chain with `values` as the results of the suspended call.
    ///
    /// On success the return buffer holds the result of the outermost
    /// captured operation. If a frame suspends again, the new suspension is
    /// returned carrying its own frames followed by the ones not yet run.
    pub fn resume(mut self, lua_state: &mut LuaState, values: &[LuaValue]) -> LuaResult<()> {
        if self.is_empty() {
            return Err(LuaError::NoContinuation.into());
        }
        debug!(frames = self.len(), "resuming continuation chain");

        lua_state.return_buffer_mut().set_to_slice(values);
        while let Some(frame) = self.pop_innermost() {
            let step = frame
                .resume(lua_state)
                .and_then(|()| evaluate_tail_calls(lua_state));
            if let Err(unwind) = step {
                return Err(match unwind {
                    Unwind::Suspend(mut suspension) => {
                        debug!(
                            remaining = self.len(),
                            "continuation suspended again during resume"
                        );
                        suspension.chain.append_outer(self);
                        Unwind::Suspend(suspension)
                    }
                    error => error,
                });
            }
        }
        Ok(())
    }
}

struct ResumeValuesAsResults;

impl Resumable for ResumeValuesAsResults {
    fn resume(&self, _lua_state: &mut LuaState, _state: Box<dyn Any>) -> LuaResult<()> {
        Ok(())
    }
}

/// What a suspension hands to whoever drives the execution context.
pub enum SuspendPayload {
    /// A coroutine yield; the values go to the resumer.
    Yield(Vec<LuaValue>),
    /// A host operation still in flight; its output resumes the chain.
    Pending(AsyncFuture),
}

impl fmt::Debug for SuspendPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuspendPayload::Yield(values) => f.debug_tuple("Yield").field(values).finish(),
            SuspendPayload::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

#[derive(Debug)]
pub struct Suspension {
    pub payload: SuspendPayload,
    pub chain: ContinuationChain,
}

impl Suspension {
    pub fn new(payload: SuspendPayload) -> Self {
        Suspension {
            payload,
            chain: ContinuationChain::new(),
        }
    }

    /// Suspension raised by a function call whose results will be the
    /// resume values. Its chain starts with one frame that leaves those
    /// values in the buffer.
    pub fn from_call(payload: SuspendPayload) -> Self {
        let mut suspension = Self::new(payload);
        suspension
            .chain
            .push_outer(ContinuationFrame::new(Rc::new(ResumeValuesAsResults), ()));
        suspension
    }

    pub fn yield_values(values: Vec<LuaValue>) -> Self {
        Self::from_call(SuspendPayload::Yield(values))
    }

    pub fn pending(future: AsyncFuture) -> Self {
        Self::from_call(SuspendPayload::Pending(future))
    }

    pub fn into_parts(self) -> (SuspendPayload, ContinuationChain) {
        (self.payload, self.chain)
    }
}

impl Unwind {
    /// Push a continuation frame if this is a suspension; errors pass
    /// through untouched. The frame is only built when needed.
    pub fn capture(self, frame: impl FnOnce() -> ContinuationFrame) -> Unwind {
        match self {
            Unwind::Suspend(mut suspension) => {
                suspension.chain.push_outer(frame());
                Unwind::Suspend(suspension)
            }
            error => error,
        }
    }
}
