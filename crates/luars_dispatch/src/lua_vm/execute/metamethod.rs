// Metatable resolution and the small helpers every metamethod call shares.
use std::rc::Rc;

use crate::lua_value::{LuaValue, TableRef};
use crate::lua_vm::execute::call::call;
use crate::lua_vm::suspension::{ContinuationFrame, Resumable};
use crate::lua_vm::{LuaResult, LuaState};

/// Tag methods understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TmKind {
    Index = 0,
    NewIndex = 1,
    Len = 2,
    Eq = 3,
    Add = 4,
    Sub = 5,
    Mul = 6,
    Mod = 7,
    Pow = 8,
    Div = 9,
    IDiv = 10,
    Band = 11,
    Bor = 12,
    Bxor = 13,
    Shl = 14,
    Shr = 15,
    Unm = 16,
    Bnot = 17,
    Lt = 18,
    Le = 19,
    Concat = 20,
    Call = 21,
}

impl TmKind {
    pub const COUNT: usize = 22;

    pub const ALL: [TmKind; TmKind::COUNT] = [
        TmKind::Index,
        TmKind::NewIndex,
        TmKind::Len,
        TmKind::Eq,
        TmKind::Add,
        TmKind::Sub,
        TmKind::Mul,
        TmKind::Mod,
        TmKind::Pow,
        TmKind::Div,
        TmKind::IDiv,
        TmKind::Band,
        TmKind::Bor,
        TmKind::Bxor,
        TmKind::Shl,
        TmKind::Shr,
        TmKind::Unm,
        TmKind::Bnot,
        TmKind::Lt,
        TmKind::Le,
        TmKind::Concat,
        TmKind::Call,
    ];

    /// Metatable key for this event.
    pub const fn name(self) -> &'static str {
        match self {
            TmKind::Index => "__index",
            TmKind::NewIndex => "__newindex",
            TmKind::Len => "__len",
            TmKind::Eq => "__eq",
            TmKind::Add => "__add",
            TmKind::Sub => "__sub",
            TmKind::Mul => "__mul",
            TmKind::Mod => "__mod",
            TmKind::Pow => "__pow",
            TmKind::Div => "__div",
            TmKind::IDiv => "__idiv",
            TmKind::Band => "__band",
            TmKind::Bor => "__bor",
            TmKind::Bxor => "__bxor",
            TmKind::Shl => "__shl",
            TmKind::Shr => "__shr",
            TmKind::Unm => "__unm",
            TmKind::Bnot => "__bnot",
            TmKind::Lt => "__lt",
            TmKind::Le => "__le",
            TmKind::Concat => "__concat",
            TmKind::Call => "__call",
        }
    }
}

/// Metatable associated with a value: its own for tables and userdata, the
/// per-kind one for everything else.
pub fn get_metatable(lua_state: &LuaState, value: &LuaValue) -> Option<TableRef> {
    match value {
        LuaValue::Table(t) => t.metatable(),
        LuaValue::Userdata(u) => u.metatable(),
        other => lua_state.vm().type_metatable(other.kind()),
    }
}

/// Handler registered for `tm` on `value`, if any. The lookup is raw.
pub fn get_metamethod(lua_state: &LuaState, value: &LuaValue, tm: TmKind) -> Option<LuaValue> {
    let mt = get_metatable(lua_state, value)?;
    let handler = mt.raw_get(lua_state.vm().const_strings().tm(tm));
    if handler.is_nil() { None } else { Some(handler) }
}

/// Binary handler precedence: the left operand's handler, else the right's.
pub fn binary_handler_for(
    lua_state: &LuaState,
    tm: TmKind,
    a: &LuaValue,
    b: &LuaValue,
) -> Option<LuaValue> {
    get_metamethod(lua_state, a, tm).or_else(|| get_metamethod(lua_state, b, tm))
}

/// Truncates whatever the buffer holds to its first value.
struct SingleResult;

impl Resumable for SingleResult {
    fn resume(&self, lua_state: &mut LuaState, _state: Box<dyn std::any::Any>) -> LuaResult<()> {
        let first = lua_state.return_buffer().first();
        lua_state.return_buffer_mut().set_to(first);
        Ok(())
    }
}

/// Empties the buffer.
struct DiscardResults;

impl Resumable for DiscardResults {
    fn resume(&self, lua_state: &mut LuaState, _state: Box<dyn std::any::Any>) -> LuaResult<()> {
        lua_state.return_buffer_mut().reset();
        Ok(())
    }
}

/// Call a metamethod and adjust its results to exactly one value.
pub fn call_tm_res(
    lua_state: &mut LuaState,
    handler: &LuaValue,
    args: &[LuaValue],
) -> LuaResult<LuaValue> {
    call(lua_state, handler, args)
        .map_err(|e| e.capture(|| ContinuationFrame::new(Rc::new(SingleResult), ())))?;
    let first = lua_state.return_buffer().first();
    lua_state.return_buffer_mut().set_to(first.clone());
    Ok(first)
}

/// Call a metamethod for its side effects only.
pub fn call_tm(lua_state: &mut LuaState, handler: &LuaValue, args: &[LuaValue]) -> LuaResult<()> {
    call(lua_state, handler, args)
        .map_err(|e| e.capture(|| ContinuationFrame::new(Rc::new(DiscardResults), ())))?;
    lua_state.return_buffer_mut().reset();
    Ok(())
}
