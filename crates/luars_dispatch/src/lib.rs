// Lua operation dispatcher
// Metamethod dispatch, tail-call trampolining and resumable suspension

#[cfg(test)]
mod test;

pub mod lua_value;
pub mod lua_vm;

pub use lua_value::{
    CoroutineStatus, LuaFunction, LuaNumber, LuaString, LuaTable, LuaThread, LuaUserdata,
    LuaValue, LuaValueKind, ResumeOutcome, TableRef, ThreadRef, UserdataRef, coroutine_yield,
};
pub use lua_vm::{
    AsyncThread, LuaError, LuaResult, LuaState, LuaVM, SafeOption, Suspension, TmKind, Unwind,
    wrap_async_function,
};
