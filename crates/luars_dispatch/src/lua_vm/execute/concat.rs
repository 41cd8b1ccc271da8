// Concatenation and length.
use crate::lua_value::LuaValue;
use crate::lua_vm::execute::metamethod::{TmKind, binary_handler_for, call_tm_res, get_metamethod};
use crate::lua_vm::{LuaError, LuaResult, LuaState};

/// `a .. b`. Strings and numbers concatenate directly; anything else goes
/// through `__concat`.
pub fn concat(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    if let (Some(x), Some(y)) = (a.to_lua_string(), b.to_lua_string()) {
        let value = LuaValue::String(x.concat(&y));
        lua_state.return_buffer_mut().set_to(value.clone());
        return Ok(value);
    }
    match binary_handler_for(lua_state, TmKind::Concat, a, b) {
        Some(handler) => call_tm_res(lua_state, &handler, &[a.clone(), b.clone()]),
        None => {
            let culprit = if a.to_lua_string().is_none() { a } else { b };
            Err(LuaError::Concatenate {
                type_name: lua_state.type_name_of(culprit),
            }
            .into())
        }
    }
}

/// `#a`. Strings report their byte length; a `__len` handler wins over the
/// raw length of a table.
pub fn len(lua_state: &mut LuaState, a: &LuaValue) -> LuaResult<LuaValue> {
    if let LuaValue::String(s) = a {
        let value = LuaValue::Integer(s.len() as i64);
        lua_state.return_buffer_mut().set_to(value.clone());
        return Ok(value);
    }
    if let Some(handler) = get_metamethod(lua_state, a, TmKind::Len) {
        return call_tm_res(lua_state, &handler, &[a.clone(), a.clone()]);
    }
    match a {
        LuaValue::Table(t) => {
            let value = LuaValue::Integer(t.raw_len() as i64);
            lua_state.return_buffer_mut().set_to(value.clone());
            Ok(value)
        }
        _ => Err(LuaError::Length {
            type_name: lua_state.type_name_of(a),
        }
        .into()),
    }
}
