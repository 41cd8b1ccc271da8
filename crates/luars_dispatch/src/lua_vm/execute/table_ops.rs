// Indexed reads and writes with the `__index` / `__newindex` chains.
use tracing::debug;

use crate::lua_value::LuaValue;
use crate::lua_vm::execute::metamethod::{TmKind, call_tm, call_tm_res, get_metamethod};
use crate::lua_vm::{LuaError, LuaResult, LuaState};

/// `t[key]`.
///
/// A present raw value ends the lookup. For an absent key, a function
/// handler is called with `(t, key)`; any other handler becomes the new
/// lookup target. The number of retries is bounded by `max_tag_loop`.
pub fn index(lua_state: &mut LuaState, t: &LuaValue, key: &LuaValue) -> LuaResult<LuaValue> {
    let max_tag_loop = lua_state.safe_option().max_tag_loop;
    let mut target = t.clone();
    for _ in 0..max_tag_loop {
        let handler = if let LuaValue::Table(table) = &target {
            let raw = table.raw_get(key);
            if !raw.is_nil() {
                lua_state.return_buffer_mut().set_to(raw.clone());
                return Ok(raw);
            }
            match get_metamethod(lua_state, &target, TmKind::Index) {
                Some(handler) => handler,
                None => {
                    lua_state.return_buffer_mut().set_to(LuaValue::Nil);
                    return Ok(LuaValue::Nil);
                }
            }
        } else {
            match get_metamethod(lua_state, &target, TmKind::Index) {
                Some(handler) => handler,
                None => {
                    return Err(LuaError::Index {
                        type_name: lua_state.type_name_of(&target),
                    }
                    .into());
                }
            }
        };

        if handler.is_function() {
            return call_tm_res(lua_state, &handler, &[target, key.clone()]);
        }
        target = handler;
    }

    debug!(limit = max_tag_loop, "__index chain exceeded the loop limit");
    Err(LuaError::MetatableLoop {
        event: TmKind::Index.name(),
    }
    .into())
}

/// `t[key] = value`.
///
/// Writes raw when the key already holds a value or the table has no
/// `__newindex`. Otherwise a function handler is called with
/// `(t, key, value)` and its results are discarded; any other handler
/// becomes the new assignment target.
pub fn new_index(
    lua_state: &mut LuaState,
    t: &LuaValue,
    key: &LuaValue,
    value: LuaValue,
) -> LuaResult<()> {
    let max_tag_loop = lua_state.safe_option().max_tag_loop;
    let mut target = t.clone();
    for _ in 0..max_tag_loop {
        let handler = if let LuaValue::Table(table) = &target {
            let handler = if table.raw_get(key).is_nil() {
                get_metamethod(lua_state, &target, TmKind::NewIndex)
            } else {
                None
            };
            match handler {
                Some(handler) => handler,
                None => {
                    table.raw_set(key, value)?;
                    lua_state.return_buffer_mut().reset();
                    return Ok(());
                }
            }
        } else {
            match get_metamethod(lua_state, &target, TmKind::NewIndex) {
                Some(handler) => handler,
                None => {
                    return Err(LuaError::Index {
                        type_name: lua_state.type_name_of(&target),
                    }
                    .into());
                }
            }
        };

        if handler.is_function() {
            return call_tm(lua_state, &handler, &[target, key.clone(), value]);
        }
        target = handler;
    }

    debug!(limit = max_tag_loop, "__newindex chain exceeded the loop limit");
    Err(LuaError::MetatableLoop {
        event: TmKind::NewIndex.name(),
    }
    .into())
}
