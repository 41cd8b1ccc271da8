pub mod test_math;
pub mod test_metamethods;
pub mod test_table;

use crate::lua_value::{LuaFunction, LuaTable, LuaValue, TableRef};
use crate::lua_vm::{LuaState, LuaVM, SafeOption};

pub(crate) fn new_state() -> LuaState {
    LuaVM::new(SafeOption::default()).new_state()
}

/// Fresh table whose metatable holds `entries`.
pub(crate) fn table_with_meta(entries: Vec<(&str, LuaValue)>) -> LuaValue {
    let mt = TableRef::new(LuaTable::new());
    for (k, v) in entries {
        mt.raw_set(&LuaValue::from(k), v).unwrap();
    }
    let t = TableRef::new(LuaTable::new());
    t.set_metatable(Some(mt));
    LuaValue::Table(t)
}

/// Function returning `value` regardless of its arguments.
pub(crate) fn returning(value: LuaValue) -> LuaValue {
    LuaFunction::from_fn(move |lua_state, _args| {
        lua_state.return_buffer_mut().set_to(value.clone());
        Ok(())
    })
    .into()
}
