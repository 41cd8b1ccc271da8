use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::lua_value::{LuaFunction, LuaValue};
use crate::lua_vm::execute::call;
use crate::lua_vm::{
    AsyncFuture, ContinuationChain, LuaError, LuaState, SuspendPayload, Unwind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoroutineStatus {
    Suspended,
    Running,
    Dead,
}

impl CoroutineStatus {
    pub const fn name(self) -> &'static str {
        match self {
            CoroutineStatus::Suspended => "suspended",
            CoroutineStatus::Running => "running",
            CoroutineStatus::Dead => "dead",
        }
    }
}

/// What one `resume` produced.
pub enum ResumeOutcome {
    /// The body returned; the coroutine is dead.
    Returned(Vec<LuaValue>),
    /// The body yielded these values.
    Yielded(Vec<LuaValue>),
    /// The body is waiting on a host future; resume with its output.
    Pending(AsyncFuture),
}

impl fmt::Debug for ResumeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResumeOutcome::Returned(v) => f.debug_tuple("Returned").field(v).finish(),
            ResumeOutcome::Yielded(v) => f.debug_tuple("Yielded").field(v).finish(),
            ResumeOutcome::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Lua coroutine.
///
/// Runs its body in its own execution context. A suspension escaping the
/// body is stored as a continuation chain and replayed by the next resume,
/// so the coroutine never holds a native stack while suspended.
pub struct LuaThread {
    status: CoroutineStatus,
    state: LuaState,
    /// Body, until the first resume starts it
    body: Option<LuaValue>,
    /// Pending work, while suspended after a yield
    chain: Option<ContinuationChain>,
}

impl LuaThread {
    pub fn new(state: LuaState, body: LuaValue) -> Self {
        LuaThread {
            status: CoroutineStatus::Suspended,
            state,
            body: Some(body),
            chain: None,
        }
    }

    #[inline]
    pub fn status(&self) -> CoroutineStatus {
        self.status
    }

    pub fn state(&self) -> &LuaState {
        &self.state
    }

    /// Start the body with `args`, or continue after a yield with `args` as
    /// the yield's results.
    pub fn resume(&mut self, args: &[LuaValue]) -> Result<ResumeOutcome, LuaError> {
        if self.status != CoroutineStatus::Suspended {
            return Err(LuaError::CannotResume {
                status: self.status.name(),
            });
        }
        self.status = CoroutineStatus::Running;
        debug!(status = "running", "coroutine resumed");

        let step = match (self.body.take(), self.chain.take()) {
            (Some(body), _) => call(&mut self.state, &body, args),
            (None, Some(chain)) => chain.resume(&mut self.state, args),
            (None, None) => Err(LuaError::NoContinuation.into()),
        };

        match step {
            Ok(()) => {
                self.status = CoroutineStatus::Dead;
                debug!(status = "dead", "coroutine returned");
                Ok(ResumeOutcome::Returned(self.state.results()))
            }
            Err(Unwind::Suspend(suspension)) => {
                let (payload, chain) = suspension.into_parts();
                self.chain = Some(chain);
                self.status = CoroutineStatus::Suspended;
                debug!(status = "suspended", "coroutine suspended");
                Ok(match payload {
                    SuspendPayload::Yield(values) => ResumeOutcome::Yielded(values),
                    SuspendPayload::Pending(future) => ResumeOutcome::Pending(future),
                })
            }
            Err(Unwind::Error(e)) => {
                self.status = CoroutineStatus::Dead;
                debug!(status = "dead", error = %e, "coroutine failed");
                Err(e)
            }
        }
    }
}

/// Shared handle to a coroutine. Equality is identity.
#[derive(Clone)]
pub struct ThreadRef(Rc<RefCell<LuaThread>>);

impl ThreadRef {
    pub fn new(thread: LuaThread) -> Self {
        ThreadRef(Rc::new(RefCell::new(thread)))
    }

    #[inline]
    pub fn ptr_eq(&self, other: &ThreadRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub fn as_ptr(&self) -> *const RefCell<LuaThread> {
        Rc::as_ptr(&self.0)
    }

    /// Status as seen from outside; a coroutine resuming itself reports
    /// running.
    pub fn status(&self) -> CoroutineStatus {
        match self.0.try_borrow() {
            Ok(thread) => thread.status(),
            Err(_) => CoroutineStatus::Running,
        }
    }

    pub fn resume(&self, args: &[LuaValue]) -> Result<ResumeOutcome, LuaError> {
        let mut thread = self.0.try_borrow_mut().map_err(|_| LuaError::CannotResume {
            status: CoroutineStatus::Running.name(),
        })?;
        thread.resume(args)
    }
}

impl fmt::Debug for ThreadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "thread: {:p}", self.as_ptr())
    }
}

/// The `coroutine.yield` function: suspends with its arguments; the values
/// of the next resume become its results.
pub fn coroutine_yield() -> LuaFunction {
    LuaFunction::from_fn(|lua_state, args| lua_state.do_yield(args.to_vec()))
}
