//! Numeric tower: Lua's integer/float subtypes and the rules that pick
//! between them for arithmetic and comparison.

use std::fmt;

use crate::lua_value::LuaValue;
use crate::lua_vm::LuaError;
use crate::lua_vm::lua_limits::LUAI_NUMDIGITS;

/// 2^63 as a float; the first float past `i64::MAX`.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

#[derive(Debug, Clone, Copy)]
pub enum LuaNumber {
    Integer(i64),
    Float(f64),
}

impl LuaNumber {
    #[inline]
    pub fn as_float(self) -> f64 {
        match self {
            LuaNumber::Integer(i) => i as f64,
            LuaNumber::Float(f) => f,
        }
    }

    /// Integer value if the number has an exact integer representation.
    #[inline]
    pub fn to_integer(self) -> Option<i64> {
        match self {
            LuaNumber::Integer(i) => Some(i),
            LuaNumber::Float(f) => float_to_integer(f),
        }
    }

    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, LuaNumber::Float(_))
    }

    pub fn add(self, rhs: LuaNumber) -> LuaNumber {
        MathImpl::of(self, rhs).add(self, rhs)
    }

    pub fn sub(self, rhs: LuaNumber) -> LuaNumber {
        MathImpl::of(self, rhs).sub(self, rhs)
    }

    pub fn mul(self, rhs: LuaNumber) -> LuaNumber {
        MathImpl::of(self, rhs).mul(self, rhs)
    }

    pub fn div(self, rhs: LuaNumber) -> LuaNumber {
        MathImpl::of(self, rhs).div(self, rhs)
    }

    pub fn modulo(self, rhs: LuaNumber) -> Result<LuaNumber, LuaError> {
        MathImpl::of(self, rhs).modulo(self, rhs)
    }

    pub fn idiv(self, rhs: LuaNumber) -> Result<LuaNumber, LuaError> {
        MathImpl::of(self, rhs).idiv(self, rhs)
    }

    pub fn pow(self, rhs: LuaNumber) -> LuaNumber {
        MathImpl::of(self, rhs).pow(self, rhs)
    }

    pub fn unm(self) -> LuaNumber {
        match self {
            LuaNumber::Integer(i) => LuaNumber::Integer(i.wrapping_neg()),
            LuaNumber::Float(f) => LuaNumber::Float(-f),
        }
    }

    pub fn num_eq(self, rhs: LuaNumber) -> bool {
        ComparisonImpl::numeric(self, rhs).num_eq(self, rhs)
    }

    pub fn num_lt(self, rhs: LuaNumber) -> bool {
        ComparisonImpl::numeric(self, rhs).num_lt(self, rhs)
    }

    pub fn num_le(self, rhs: LuaNumber) -> bool {
        ComparisonImpl::numeric(self, rhs).num_le(self, rhs)
    }
}

impl PartialEq for LuaNumber {
    fn eq(&self, other: &Self) -> bool {
        self.num_eq(*other)
    }
}

impl From<i64> for LuaNumber {
    fn from(i: i64) -> Self {
        LuaNumber::Integer(i)
    }
}

impl From<f64> for LuaNumber {
    fn from(f: f64) -> Self {
        LuaNumber::Float(f)
    }
}

impl From<LuaNumber> for LuaValue {
    fn from(n: LuaNumber) -> Self {
        match n {
            LuaNumber::Integer(i) => LuaValue::Integer(i),
            LuaNumber::Float(f) => LuaValue::Float(f),
        }
    }
}

impl fmt::Display for LuaNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuaNumber::Integer(i) => {
                let mut buf = itoa::Buffer::new();
                f.write_str(buf.format(*i))
            }
            LuaNumber::Float(n) => f.write_str(&lua_float_to_string(*n)),
        }
    }
}

// ============ Arithmetic ============

/// Arithmetic semantics selected for a pair of operands.
///
/// `Integer` is chosen only when every operand is an integer (numeric strings
/// included); a single float operand promotes the operation to `Float`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathImpl {
    Integer,
    Float,
}

impl MathImpl {
    #[inline]
    pub fn of(a: LuaNumber, b: LuaNumber) -> MathImpl {
        match (a, b) {
            (LuaNumber::Integer(_), LuaNumber::Integer(_)) => MathImpl::Integer,
            _ => MathImpl::Float,
        }
    }

    /// Resolve semantics for two values; `None` when either is not coercible.
    pub fn arithmetic(a: &LuaValue, b: &LuaValue) -> Option<MathImpl> {
        Some(MathImpl::of(a.to_number()?, b.to_number()?))
    }

    /// Resolve semantics for a single operand (unary minus).
    pub fn unary(a: &LuaValue) -> Option<MathImpl> {
        match a.to_number()? {
            LuaNumber::Integer(_) => Some(MathImpl::Integer),
            LuaNumber::Float(_) => Some(MathImpl::Float),
        }
    }

    pub fn add(self, a: LuaNumber, b: LuaNumber) -> LuaNumber {
        match (self, a, b) {
            (MathImpl::Integer, LuaNumber::Integer(x), LuaNumber::Integer(y)) => {
                LuaNumber::Integer(x.wrapping_add(y))
            }
            _ => LuaNumber::Float(a.as_float() + b.as_float()),
        }
    }

    pub fn sub(self, a: LuaNumber, b: LuaNumber) -> LuaNumber {
        match (self, a, b) {
            (MathImpl::Integer, LuaNumber::Integer(x), LuaNumber::Integer(y)) => {
                LuaNumber::Integer(x.wrapping_sub(y))
            }
            _ => LuaNumber::Float(a.as_float() - b.as_float()),
        }
    }

    pub fn mul(self, a: LuaNumber, b: LuaNumber) -> LuaNumber {
        match (self, a, b) {
            (MathImpl::Integer, LuaNumber::Integer(x), LuaNumber::Integer(y)) => {
                LuaNumber::Integer(x.wrapping_mul(y))
            }
            _ => LuaNumber::Float(a.as_float() * b.as_float()),
        }
    }

    /// `/` is always float division.
    pub fn div(self, a: LuaNumber, b: LuaNumber) -> LuaNumber {
        LuaNumber::Float(a.as_float() / b.as_float())
    }

    /// `^` is always float exponentiation.
    pub fn pow(self, a: LuaNumber, b: LuaNumber) -> LuaNumber {
        LuaNumber::Float(a.as_float().powf(b.as_float()))
    }

    pub fn idiv(self, a: LuaNumber, b: LuaNumber) -> Result<LuaNumber, LuaError> {
        match (self, a, b) {
            (MathImpl::Integer, LuaNumber::Integer(x), LuaNumber::Integer(y)) => {
                Ok(LuaNumber::Integer(int_floor_div(x, y)?))
            }
            _ => Ok(LuaNumber::Float((a.as_float() / b.as_float()).floor())),
        }
    }

    pub fn modulo(self, a: LuaNumber, b: LuaNumber) -> Result<LuaNumber, LuaError> {
        match (self, a, b) {
            (MathImpl::Integer, LuaNumber::Integer(x), LuaNumber::Integer(y)) => {
                Ok(LuaNumber::Integer(int_mod(x, y)?))
            }
            _ => Ok(LuaNumber::Float(float_mod(a.as_float(), b.as_float()))),
        }
    }

    pub fn unm(self, a: LuaNumber) -> LuaNumber {
        match (self, a) {
            (MathImpl::Integer, LuaNumber::Integer(x)) => LuaNumber::Integer(x.wrapping_neg()),
            _ => LuaNumber::Float(-a.as_float()),
        }
    }
}

/// Floor division for integers (`luaV_idiv`).
fn int_floor_div(m: i64, n: i64) -> Result<i64, LuaError> {
    if n == 0 {
        return Err(LuaError::DivideByZero);
    }
    if n == -1 {
        // avoids overflow of MIN / -1
        return Ok(m.wrapping_neg());
    }
    let q = m / n;
    if (m % n != 0) && ((m ^ n) < 0) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

/// Integer modulo with the sign of the divisor (`luaV_mod`).
fn int_mod(m: i64, n: i64) -> Result<i64, LuaError> {
    if n == 0 {
        return Err(LuaError::ModuloByZero);
    }
    if n == -1 {
        return Ok(0);
    }
    let r = m % n;
    if r != 0 && (r ^ n) < 0 {
        Ok(r + n)
    } else {
        Ok(r)
    }
}

/// Float modulo with the sign of the divisor (`luai_nummod`).
fn float_mod(a: f64, b: f64) -> f64 {
    let m = a % b;
    if (m > 0.0 && b < 0.0) || (m < 0.0 && b > 0.0) {
        m + b
    } else {
        m
    }
}

// ============ Comparison ============

/// Comparison semantics selected for a pair of operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonImpl {
    Integer,
    Float,
    /// One integer, one float: compared exactly without lossy casts.
    Mixed,
    /// Two strings: bytewise lexicographic order.
    String,
}

impl ComparisonImpl {
    /// Resolve semantics for two values; `None` when they are not directly
    /// comparable (no string-to-number coercion happens here).
    pub fn of(a: &LuaValue, b: &LuaValue) -> Option<ComparisonImpl> {
        match (a, b) {
            (LuaValue::Integer(_), LuaValue::Integer(_)) => Some(ComparisonImpl::Integer),
            (LuaValue::Float(_), LuaValue::Float(_)) => Some(ComparisonImpl::Float),
            (LuaValue::Integer(_), LuaValue::Float(_))
            | (LuaValue::Float(_), LuaValue::Integer(_)) => Some(ComparisonImpl::Mixed),
            (LuaValue::String(_), LuaValue::String(_)) => Some(ComparisonImpl::String),
            _ => None,
        }
    }

    #[inline]
    pub fn numeric(a: LuaNumber, b: LuaNumber) -> ComparisonImpl {
        match (a, b) {
            (LuaNumber::Integer(_), LuaNumber::Integer(_)) => ComparisonImpl::Integer,
            (LuaNumber::Float(_), LuaNumber::Float(_)) => ComparisonImpl::Float,
            _ => ComparisonImpl::Mixed,
        }
    }

    pub fn lt(self, a: &LuaValue, b: &LuaValue) -> bool {
        match (a, b) {
            (LuaValue::String(x), LuaValue::String(y)) => x.as_bytes() < y.as_bytes(),
            _ => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => self.num_lt(x, y),
                _ => false,
            },
        }
    }

    pub fn le(self, a: &LuaValue, b: &LuaValue) -> bool {
        match (a, b) {
            (LuaValue::String(x), LuaValue::String(y)) => x.as_bytes() <= y.as_bytes(),
            _ => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => self.num_le(x, y),
                _ => false,
            },
        }
    }

    pub fn num_eq(self, a: LuaNumber, b: LuaNumber) -> bool {
        match (a, b) {
            (LuaNumber::Integer(x), LuaNumber::Integer(y)) => x == y,
            (LuaNumber::Float(x), LuaNumber::Float(y)) => x == y,
            (LuaNumber::Integer(i), LuaNumber::Float(f))
            | (LuaNumber::Float(f), LuaNumber::Integer(i)) => float_to_integer(f) == Some(i),
        }
    }

    pub fn num_lt(self, a: LuaNumber, b: LuaNumber) -> bool {
        match (a, b) {
            (LuaNumber::Integer(x), LuaNumber::Integer(y)) => x < y,
            (LuaNumber::Float(x), LuaNumber::Float(y)) => x < y,
            (LuaNumber::Integer(i), LuaNumber::Float(f)) => int_lt_float(i, f),
            (LuaNumber::Float(f), LuaNumber::Integer(i)) => float_lt_int(f, i),
        }
    }

    pub fn num_le(self, a: LuaNumber, b: LuaNumber) -> bool {
        match (a, b) {
            (LuaNumber::Integer(x), LuaNumber::Integer(y)) => x <= y,
            (LuaNumber::Float(x), LuaNumber::Float(y)) => x <= y,
            (LuaNumber::Integer(i), LuaNumber::Float(f)) => int_le_float(i, f),
            (LuaNumber::Float(f), LuaNumber::Integer(i)) => float_le_int(f, i),
        }
    }
}

/// Convert a float in `[-2^63, 2^63)` to an integer; `None` outside the range
/// or for NaN. The float must already be integral.
#[inline]
fn integral_float_to_i64(f: f64) -> Option<i64> {
    if (-TWO_POW_63..TWO_POW_63).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

/// Exact float-to-integer conversion: fails for fractional values,
/// NaN and values out of range.
#[inline]
pub fn float_to_integer(f: f64) -> Option<i64> {
    if f.floor() == f {
        integral_float_to_i64(f)
    } else {
        None
    }
}

// i < f  <=>  i < ceil(f)
fn int_lt_float(i: i64, f: f64) -> bool {
    match integral_float_to_i64(f.ceil()) {
        Some(fi) => i < fi,
        None => f > 0.0,
    }
}

// i <= f  <=>  i <= floor(f)
fn int_le_float(i: i64, f: f64) -> bool {
    match integral_float_to_i64(f.floor()) {
        Some(fi) => i <= fi,
        None => f > 0.0,
    }
}

// f < i  <=>  floor(f) < i
fn float_lt_int(f: f64, i: i64) -> bool {
    match integral_float_to_i64(f.floor()) {
        Some(fi) => fi < i,
        None => f < 0.0,
    }
}

// f <= i  <=>  ceil(f) <= i
fn float_le_int(f: f64, i: i64) -> bool {
    match integral_float_to_i64(f.ceil()) {
        Some(fi) => fi <= i,
        None => f < 0.0,
    }
}

// ============ Loops ============

/// Numeric `for` continuation test: should the loop body run for `index`?
///
/// A zero or NaN step never runs; the direction follows the sign of `step`.
pub fn continue_loop(index: LuaNumber, limit: LuaNumber, step: LuaNumber) -> bool {
    let zero = LuaNumber::Integer(0);
    if step.num_eq(zero) || step.as_float().is_nan() {
        return false;
    }
    if zero.num_lt(step) {
        index.num_le(limit)
    } else {
        limit.num_le(index)
    }
}

// ============ Formatting ============

/// Format a float like C's `%.14g`, keeping a `.0` suffix on integral
/// results so they still read as floats.
pub fn lua_float_to_string(f: f64) -> String {
    if f.is_nan() {
        return if f.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let precision = LUAI_NUMDIGITS - 1;
    let sci = format!("{:.*e}", precision, f);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    let mut out = if exp < -4 || exp >= LUAI_NUMDIGITS as i32 {
        let mantissa = strip_trailing_zeros(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.unsigned_abs())
    } else {
        let decimals = (precision as i32 - exp).max(0) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, f)).to_string()
    };

    if out.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        out.push_str(".0");
    }
    out
}

fn strip_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
