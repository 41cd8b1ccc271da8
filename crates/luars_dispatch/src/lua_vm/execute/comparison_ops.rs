// Equality and order operators.
use std::any::Any;
use std::rc::Rc;

use crate::lua_value::{ComparisonImpl, LuaValue};
use crate::lua_vm::execute::call::call;
use crate::lua_vm::execute::metamethod::{TmKind, binary_handler_for};
use crate::lua_vm::suspension::{ContinuationFrame, Resumable, suspended_state};
use crate::lua_vm::{LuaError, LuaResult, LuaState};

/// Turns a comparison handler's first result into a boolean, matched
/// against the saved `cmp_to` (false for `le` evaluated as `not (b < a)`).
struct ComparisonResumable;

impl Resumable for ComparisonResumable {
    fn resume(&self, lua_state: &mut LuaState, state: Box<dyn Any>) -> LuaResult<()> {
        let cmp_to = *suspended_state::<bool>(state)?;
        let result = !lua_state.return_buffer().first().is_falsy() == cmp_to;
        lua_state.return_buffer_mut().set_to(LuaValue::Boolean(result));
        Ok(())
    }
}

#[inline]
fn finish(lua_state: &mut LuaState, result: bool) -> LuaResult<bool> {
    lua_state.return_buffer_mut().set_to(LuaValue::Boolean(result));
    Ok(result)
}

fn call_order_tm(
    lua_state: &mut LuaState,
    handler: &LuaValue,
    args: &[LuaValue],
    cmp_to: bool,
) -> LuaResult<bool> {
    call(lua_state, handler, args)
        .map_err(|e| e.capture(|| ContinuationFrame::new(Rc::new(ComparisonResumable), cmp_to)))?;
    let result = !lua_state.return_buffer().first().is_falsy() == cmp_to;
    finish(lua_state, result)
}

fn compare_error(lua_state: &LuaState, a: &LuaValue, b: &LuaValue) -> LuaError {
    LuaError::Compare {
        left: lua_state.type_name_of(a),
        right: lua_state.type_name_of(b),
    }
}

/// `a == b`. `__eq` is consulted only for two raw-unequal tables or two
/// raw-unequal userdata.
pub fn equal(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<bool> {
    if a.raw_equal(b) {
        return finish(lua_state, true);
    }
    let handler = match (a, b) {
        (LuaValue::Table(_), LuaValue::Table(_)) | (LuaValue::Userdata(_), LuaValue::Userdata(_)) => {
            binary_handler_for(lua_state, TmKind::Eq, a, b)
        }
        _ => None,
    };
    match handler {
        Some(handler) => call_order_tm(lua_state, &handler, &[a.clone(), b.clone()], true),
        None => finish(lua_state, false),
    }
}

/// `a < b`.
pub fn less_than(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<bool> {
    if let Some(cmp) = ComparisonImpl::of(a, b) {
        let result = cmp.lt(a, b);
        return finish(lua_state, result);
    }
    match binary_handler_for(lua_state, TmKind::Lt, a, b) {
        Some(handler) => call_order_tm(lua_state, &handler, &[a.clone(), b.clone()], true),
        None => Err(compare_error(lua_state, a, b).into()),
    }
}

/// `a <= b`. Without `__le`, evaluates `not (b < a)` through `__lt`,
/// looked up on `(b, a)`.
pub fn less_equal(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<bool> {
    if let Some(cmp) = ComparisonImpl::of(a, b) {
        let result = cmp.le(a, b);
        return finish(lua_state, result);
    }
    if let Some(handler) = binary_handler_for(lua_state, TmKind::Le, a, b) {
        return call_order_tm(lua_state, &handler, &[a.clone(), b.clone()], true);
    }
    if let Some(handler) = binary_handler_for(lua_state, TmKind::Lt, b, a) {
        return call_order_tm(lua_state, &handler, &[b.clone(), a.clone()], false);
    }
    Err(compare_error(lua_state, a, b).into())
}

/// `not a`. Never consults a metamethod.
pub fn not(lua_state: &mut LuaState, a: &LuaValue) -> bool {
    let result = a.is_falsy();
    lua_state.return_buffer_mut().set_to(LuaValue::Boolean(result));
    result
}
