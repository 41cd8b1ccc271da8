// Call dispatch and the tail-call trampoline.
use crate::lua_value::{LuaFunction, LuaValue};
use crate::lua_vm::execute::metamethod::{TmKind, get_metamethod};
use crate::lua_vm::{LuaError, LuaResult, LuaState, Unwind};

/// How a value is invoked.
#[derive(Debug, Clone)]
pub enum CallTarget {
    /// The value is itself a function.
    Direct(LuaFunction),
    /// The value's `__call` handler; the value is passed as first argument.
    WithImplicitSelf(LuaFunction),
}

/// Resolve how `target` is called. A `__call` handler must itself be a
/// function.
pub fn call_target(lua_state: &LuaState, target: &LuaValue) -> Result<CallTarget, LuaError> {
    if let LuaValue::Function(f) = target {
        return Ok(CallTarget::Direct(f.clone()));
    }
    match get_metamethod(lua_state, target, TmKind::Call) {
        Some(LuaValue::Function(handler)) => Ok(CallTarget::WithImplicitSelf(handler)),
        _ => Err(LuaError::Call {
            type_name: lua_state.type_name_of(target),
        }),
    }
}

/// One invocation step. The buffer may be left holding a tail call.
fn invoke_once(lua_state: &mut LuaState, target: &LuaValue, args: &[LuaValue]) -> LuaResult<()> {
    let callee = call_target(lua_state, target)?;
    lua_state.return_buffer_mut().reset();
    match callee {
        CallTarget::Direct(f) => f.invoke(lua_state, args),
        CallTarget::WithImplicitSelf(handler) => {
            let mut full = Vec::with_capacity(args.len() + 1);
            full.push(target.clone());
            full.extend_from_slice(args);
            handler.invoke(lua_state, &full)
        }
    }
}

/// Run pending tail calls until the buffer holds final results.
///
/// Each tail call replaces the previous invocation at the same native
/// depth, so a chain of any length runs in constant native stack.
pub fn evaluate_tail_calls(lua_state: &mut LuaState) -> LuaResult<()> {
    while let Some((target, args)) = lua_state.return_buffer_mut().take_tail_call() {
        invoke_once(lua_state, &target, &args)?;
    }
    Ok(())
}

/// Call `target` with `args`, leaving its results in the return buffer.
///
/// If the call fails, the buffer keeps the results it held before the call.
/// A suspension leaves it to whoever resumes the chain.
pub fn call(lua_state: &mut LuaState, target: &LuaValue, args: &[LuaValue]) -> LuaResult<()> {
    lua_state.enter_call()?;
    let saved = std::mem::take(lua_state.return_buffer_mut());
    let result = invoke_once(lua_state, target, args).and_then(|()| evaluate_tail_calls(lua_state));
    if let Err(Unwind::Error(_)) = &result {
        *lua_state.return_buffer_mut() = saved;
    }
    lua_state.exit_call();
    result
}

#[inline]
pub fn call0(lua_state: &mut LuaState, target: &LuaValue) -> LuaResult<()> {
    call(lua_state, target, &[])
}

#[inline]
pub fn call1(lua_state: &mut LuaState, target: &LuaValue, a: LuaValue) -> LuaResult<()> {
    call(lua_state, target, &[a])
}

#[inline]
pub fn call2(lua_state: &mut LuaState, target: &LuaValue, a: LuaValue, b: LuaValue) -> LuaResult<()> {
    call(lua_state, target, &[a, b])
}

#[inline]
pub fn call3(
    lua_state: &mut LuaState,
    target: &LuaValue,
    a: LuaValue,
    b: LuaValue,
    c: LuaValue,
) -> LuaResult<()> {
    call(lua_state, target, &[a, b, c])
}

#[inline]
pub fn call4(
    lua_state: &mut LuaState,
    target: &LuaValue,
    a: LuaValue,
    b: LuaValue,
    c: LuaValue,
    d: LuaValue,
) -> LuaResult<()> {
    call(lua_state, target, &[a, b, c, d])
}

#[inline]
pub fn call5(
    lua_state: &mut LuaState,
    target: &LuaValue,
    a: LuaValue,
    b: LuaValue,
    c: LuaValue,
    d: LuaValue,
    e: LuaValue,
) -> LuaResult<()> {
    call(lua_state, target, &[a, b, c, d, e])
}
