// Lua execution state (one per thread/coroutine)
// Multiple LuaStates share one LuaVM

use std::rc::Rc;

use tracing::debug;

use crate::lua_value::LuaValue;
use crate::lua_vm::execute::get_metatable;
use crate::lua_vm::return_buffer::ReturnBuffer;
use crate::lua_vm::safe_option::SafeOption;
use crate::lua_vm::suspension::{AsyncFuture, Suspension};
use crate::lua_vm::{LuaError, LuaResult, LuaVM};

/// Execution context handed to every dispatcher entry point and every
/// invoked function.
pub struct LuaState {
    vm: Rc<LuaVM>,

    /// Results of the last dispatch step, or a pending tail call
    return_buffer: ReturnBuffer,

    /// Native dispatch depth; tail calls do not count
    call_depth: usize,
}

impl LuaState {
    pub fn new(vm: Rc<LuaVM>) -> Self {
        LuaState {
            vm,
            return_buffer: ReturnBuffer::new(),
            call_depth: 0,
        }
    }

    #[inline]
    pub fn vm(&self) -> &Rc<LuaVM> {
        &self.vm
    }

    #[inline]
    pub fn safe_option(&self) -> &SafeOption {
        self.vm.option()
    }

    #[inline]
    pub fn return_buffer(&self) -> &ReturnBuffer {
        &self.return_buffer
    }

    #[inline]
    pub fn return_buffer_mut(&mut self) -> &mut ReturnBuffer {
        &mut self.return_buffer
    }

    /// Snapshot of the current results.
    pub fn results(&self) -> Vec<LuaValue> {
        self.return_buffer.to_vec()
    }

    #[inline]
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Enter one native dispatch level.
    pub(crate) fn enter_call(&mut self) -> Result<(), LuaError> {
        if self.call_depth >= self.vm.option().max_call_depth {
            debug!(depth = self.call_depth, "call depth limit reached");
            return Err(LuaError::StackOverflow);
        }
        self.call_depth += 1;
        Ok(())
    }

    pub(crate) fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    /// Name of a value's type for error messages: the metatable's string
    /// `__name` when present, else the basic type name.
    pub fn type_name_of(&self, value: &LuaValue) -> String {
        if let Some(mt) = get_metatable(self, value) {
            let name = mt.raw_get(&self.vm.const_strings().tm_name);
            if let LuaValue::String(s) = name {
                return s.to_str_lossy().into_owned();
            }
        }
        value.type_name().to_owned()
    }

    /// Suspend the running coroutine, handing `values` to its resumer.
    /// Always returns `Err`; the resume values become this call's results.
    pub fn do_yield(&mut self, values: Vec<LuaValue>) -> LuaResult<()> {
        Err(Suspension::yield_values(values).into())
    }

    /// Suspend until `future` completes; its output becomes this call's
    /// results. Always returns `Err`.
    pub fn await_future(&mut self, future: AsyncFuture) -> LuaResult<()> {
        Err(Suspension::pending(future).into())
    }
}
