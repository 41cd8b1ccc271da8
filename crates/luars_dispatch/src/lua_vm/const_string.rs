use crate::lua_value::LuaValue;
use crate::lua_vm::execute::TmKind;

/// Strings the dispatcher looks up on every metamethod probe, built once
/// per VM.
pub struct ConstString {
    // indexed by `TmKind as usize`
    tm_names: Vec<LuaValue>,
    /// "__name", consulted when naming a value in error messages
    pub tm_name: LuaValue,
}

impl ConstString {
    pub fn new() -> Self {
        Self {
            tm_names: TmKind::ALL
                .iter()
                .map(|tm| LuaValue::from(tm.name()))
                .collect(),
            tm_name: LuaValue::from("__name"),
        }
    }

    /// Metatable key for `tm`.
    #[inline]
    pub fn tm(&self, tm: TmKind) -> &LuaValue {
        &self.tm_names[tm as usize]
    }
}

impl Default for ConstString {
    fn default() -> Self {
        Self::new()
    }
}
