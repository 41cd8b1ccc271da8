// Arithmetic and bitwise operators.
use crate::lua_value::{LuaNumber, LuaValue, MathImpl};
use crate::lua_vm::execute::metamethod::{TmKind, binary_handler_for, call_tm_res, get_metamethod};
use crate::lua_vm::{LuaError, LuaResult, LuaState};

/// Raw result: store in the buffer and return it.
#[inline]
fn finish(lua_state: &mut LuaState, value: LuaValue) -> LuaResult<LuaValue> {
    lua_state.return_buffer_mut().set_to(value.clone());
    Ok(value)
}

fn arith<F>(
    lua_state: &mut LuaState,
    a: &LuaValue,
    b: &LuaValue,
    tm: TmKind,
    op: F,
) -> LuaResult<LuaValue>
where
    F: FnOnce(MathImpl, LuaNumber, LuaNumber) -> Result<LuaNumber, LuaError>,
{
    if let (Some(x), Some(y)) = (a.to_number(), b.to_number()) {
        let n = op(MathImpl::of(x, y), x, y)?;
        return finish(lua_state, n.into());
    }
    match binary_handler_for(lua_state, tm, a, b) {
        Some(handler) => call_tm_res(lua_state, &handler, &[a.clone(), b.clone()]),
        None => {
            let culprit = if a.to_number().is_none() { a } else { b };
            Err(LuaError::Arithmetic {
                type_name: lua_state.type_name_of(culprit),
            }
            .into())
        }
    }
}

pub fn add(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    arith(lua_state, a, b, TmKind::Add, |m, x, y| Ok(m.add(x, y)))
}

pub fn sub(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    arith(lua_state, a, b, TmKind::Sub, |m, x, y| Ok(m.sub(x, y)))
}

pub fn mul(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    arith(lua_state, a, b, TmKind::Mul, |m, x, y| Ok(m.mul(x, y)))
}

pub fn div(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    arith(lua_state, a, b, TmKind::Div, |m, x, y| Ok(m.div(x, y)))
}

pub fn modulo(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    arith(lua_state, a, b, TmKind::Mod, |m, x, y| m.modulo(x, y))
}

pub fn idiv(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    arith(lua_state, a, b, TmKind::IDiv, |m, x, y| m.idiv(x, y))
}

pub fn pow(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    arith(lua_state, a, b, TmKind::Pow, |m, x, y| Ok(m.pow(x, y)))
}

/// Unary minus. The handler receives the operand twice.
pub fn unm(lua_state: &mut LuaState, a: &LuaValue) -> LuaResult<LuaValue> {
    if let (Some(m), Some(x)) = (MathImpl::unary(a), a.to_number()) {
        return finish(lua_state, m.unm(x).into());
    }
    match get_metamethod(lua_state, a, TmKind::Unm) {
        Some(handler) => call_tm_res(lua_state, &handler, &[a.clone(), a.clone()]),
        None => Err(LuaError::Arithmetic {
            type_name: lua_state.type_name_of(a),
        }
        .into()),
    }
}

// ============ Bitwise ============

/// Logical shift; negative counts shift right, counts of 64 or more clear.
pub fn shift_left(x: i64, y: i64) -> i64 {
    if y <= -64 || y >= 64 {
        0
    } else if y < 0 {
        ((x as u64) >> (-y as u32)) as i64
    } else {
        ((x as u64) << (y as u32)) as i64
    }
}

#[inline]
pub fn shift_right(x: i64, y: i64) -> i64 {
    shift_left(x, y.wrapping_neg())
}

/// Error for a bitwise operation with no raw path and no handler.
fn bitwise_error(lua_state: &LuaState, a: &LuaValue, b: &LuaValue) -> LuaError {
    if a.to_number().is_some() && b.to_number().is_some() {
        LuaError::NoIntegerRepresentation
    } else {
        let culprit = if a.to_number().is_none() { a } else { b };
        LuaError::Bitwise {
            type_name: lua_state.type_name_of(culprit),
        }
    }
}

fn bitwise<F>(
    lua_state: &mut LuaState,
    a: &LuaValue,
    b: &LuaValue,
    tm: TmKind,
    op: F,
) -> LuaResult<LuaValue>
where
    F: FnOnce(i64, i64) -> i64,
{
    if let (Some(x), Some(y)) = (a.to_integer(), b.to_integer()) {
        return finish(lua_state, LuaValue::Integer(op(x, y)));
    }
    match binary_handler_for(lua_state, tm, a, b) {
        Some(handler) => call_tm_res(lua_state, &handler, &[a.clone(), b.clone()]),
        None => Err(bitwise_error(lua_state, a, b).into()),
    }
}

pub fn band(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    bitwise(lua_state, a, b, TmKind::Band, |x, y| x & y)
}

pub fn bor(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    bitwise(lua_state, a, b, TmKind::Bor, |x, y| x | y)
}

pub fn bxor(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    bitwise(lua_state, a, b, TmKind::Bxor, |x, y| x ^ y)
}

pub fn shl(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    bitwise(lua_state, a, b, TmKind::Shl, shift_left)
}

pub fn shr(lua_state: &mut LuaState, a: &LuaValue, b: &LuaValue) -> LuaResult<LuaValue> {
    bitwise(lua_state, a, b, TmKind::Shr, shift_right)
}

/// Bitwise not. The handler receives the operand twice.
pub fn bnot(lua_state: &mut LuaState, a: &LuaValue) -> LuaResult<LuaValue> {
    if let Some(x) = a.to_integer() {
        return finish(lua_state, LuaValue::Integer(!x));
    }
    match get_metamethod(lua_state, a, TmKind::Bnot) {
        Some(handler) => call_tm_res(lua_state, &handler, &[a.clone(), a.clone()]),
        None => Err(bitwise_error(lua_state, a, a).into()),
    }
}
