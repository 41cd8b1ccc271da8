// Lua operation dispatcher
// Shared engine state, per-context state, and the dispatch entry points
pub mod async_thread;
mod const_string;
pub mod execute;
mod lua_error;
pub mod lua_limits;
mod lua_state;
pub mod return_buffer;
mod safe_option;
pub mod suspension;

use std::cell::RefCell;
use std::rc::Rc;

use crate::lua_value::{LuaThread, LuaValue, LuaValueKind, TableRef, ThreadRef};
pub use async_thread::{AsyncThread, wrap_async_function};
pub use const_string::ConstString;
pub use execute::TmKind;
pub use lua_error::{LuaError, Unwind};
pub use lua_state::LuaState;
pub use return_buffer::ReturnBuffer;
pub use safe_option::SafeOption;
pub use suspension::{
    AsyncFuture, ContinuationChain, ContinuationFrame, Resumable, SuspendPayload, Suspension,
};

/// Result of any dispatcher step: a value, or an error, or a suspension.
pub type LuaResult<T> = Result<T, Unwind>;

/// Engine state shared by every execution context.
pub struct LuaVM {
    option: SafeOption,

    // Pre-built metatable keys
    const_strings: ConstString,

    /// Metatables for kinds that don't carry their own (string, number, ...)
    type_metatables: RefCell<[Option<TableRef>; LuaValueKind::COUNT]>,
}

impl LuaVM {
    pub fn new(option: SafeOption) -> Rc<Self> {
        Rc::new(LuaVM {
            option,
            const_strings: ConstString::new(),
            type_metatables: RefCell::new(Default::default()),
        })
    }

    #[inline]
    pub fn option(&self) -> &SafeOption {
        &self.option
    }

    #[inline]
    pub fn const_strings(&self) -> &ConstString {
        &self.const_strings
    }

    /// Shared metatable for every value of `kind`. Tables and userdata use
    /// their own metatables instead.
    pub fn type_metatable(&self, kind: LuaValueKind) -> Option<TableRef> {
        self.type_metatables.borrow()[kind as usize].clone()
    }

    pub fn set_type_metatable(&self, kind: LuaValueKind, mt: Option<TableRef>) {
        self.type_metatables.borrow_mut()[kind as usize] = mt;
    }

    /// New execution context on this engine.
    pub fn new_state(self: &Rc<Self>) -> LuaState {
        LuaState::new(Rc::clone(self))
    }

    /// New coroutine running `body`, in its own execution context.
    pub fn create_thread(self: &Rc<Self>, body: LuaValue) -> ThreadRef {
        ThreadRef::new(LuaThread::new(self.new_state(), body))
    }

    /// Drive a new coroutine running `body` as a future.
    pub fn create_async_thread(self: &Rc<Self>, body: LuaValue, args: Vec<LuaValue>) -> AsyncThread {
        AsyncThread::new(self.create_thread(body), args)
    }
}
