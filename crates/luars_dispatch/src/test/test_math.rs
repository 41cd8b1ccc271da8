// Tests for the numeric tower
use crate::lua_value::lua_number::{continue_loop, lua_float_to_string};
use crate::lua_value::parse_number::parse_lua_number;
use crate::lua_value::{ComparisonImpl, LuaNumber, LuaValue, MathImpl};
use crate::lua_vm::LuaError;

use LuaNumber::{Float, Integer};

#[test]
fn test_idiv_keeps_subtype() {
    assert_eq!(Integer(7).idiv(Integer(2)), Ok(Integer(3)));
    assert!(matches!(Float(7.0).idiv(Integer(2)), Ok(Float(f)) if f == 3.0));
    assert_eq!(Integer(-7).idiv(Integer(2)), Ok(Integer(-4)));
    assert_eq!(Integer(i64::MIN).idiv(Integer(-1)), Ok(Integer(i64::MIN)));
}

#[test]
fn test_integer_division_by_zero() {
    assert_eq!(Integer(1).idiv(Integer(0)), Err(LuaError::DivideByZero));
    assert_eq!(Integer(1).modulo(Integer(0)), Err(LuaError::ModuloByZero));
    assert_eq!(
        LuaError::DivideByZero.to_string(),
        "attempt to perform 'n//0'"
    );
    assert_eq!(LuaError::ModuloByZero.to_string(), "attempt to perform 'n%0'");

    // float division by zero is fine
    assert!(matches!(Float(1.0).idiv(Integer(0)), Ok(Float(f)) if f == f64::INFINITY));
}

#[test]
fn test_modulo_sign_follows_divisor() {
    assert_eq!(Integer(-5).modulo(Integer(3)), Ok(Integer(1)));
    assert_eq!(Integer(5).modulo(Integer(-3)), Ok(Integer(-1)));
    assert!(matches!(Float(-5.5).modulo(Integer(2)), Ok(Float(f)) if f == 0.5));
}

#[test]
fn test_division_and_power_always_float() {
    assert!(matches!(Integer(6).div(Integer(3)), Float(f) if f == 2.0));
    assert!(matches!(Integer(2).pow(Integer(10)), Float(f) if f == 1024.0));
    assert!(matches!(Integer(1).add(Float(0.5)), Float(f) if f == 1.5));
    assert_eq!(Integer(i64::MAX).add(Integer(1)), Integer(i64::MIN));
}

#[test]
fn test_math_impl_selection() {
    let i = LuaValue::Integer(1);
    let f = LuaValue::Float(1.0);
    let s = LuaValue::from("10");
    assert_eq!(MathImpl::arithmetic(&i, &i), Some(MathImpl::Integer));
    assert_eq!(MathImpl::arithmetic(&i, &f), Some(MathImpl::Float));
    assert_eq!(MathImpl::arithmetic(&i, &s), Some(MathImpl::Integer));
    assert_eq!(MathImpl::arithmetic(&i, &LuaValue::Nil), None);
    assert_eq!(MathImpl::unary(&LuaValue::from("x")), None);
}

#[test]
fn test_int_float_equality() {
    assert_eq!(LuaValue::Integer(1), LuaValue::Float(1.0));
    assert!(Integer(1).num_eq(Float(1.0)));
    assert!(!Integer(i64::MAX).num_eq(Float(9_223_372_036_854_775_807.0)));
}

#[test]
fn test_nan_comparisons() {
    let nan = Float(f64::NAN);
    let one = Float(1.0);
    assert!(!nan.num_lt(one));
    assert!(!one.num_lt(nan));
    assert!(!nan.num_le(nan));
    assert!(!nan.num_eq(nan));
    assert!(!Integer(1).num_lt(nan));
}

#[test]
fn test_mixed_comparison_is_exact() {
    // 2^53 + 1 is not representable as a float
    let big = (1i64 << 53) + 1;
    let f = Float((1i64 << 53) as f64);
    assert!(f.num_lt(Integer(big)));
    assert!(!Integer(big).num_le(f));
    assert!(Integer(i64::MAX).num_lt(Float(9.3e18)));
    assert!(Float(-9.3e18).num_lt(Integer(i64::MIN)));
}

#[test]
fn test_comparison_impl_of() {
    let s = LuaValue::from("a");
    assert_eq!(ComparisonImpl::of(&s, &s), Some(ComparisonImpl::String));
    assert_eq!(
        ComparisonImpl::of(&LuaValue::Integer(1), &LuaValue::Float(2.0)),
        Some(ComparisonImpl::Mixed)
    );
    // no string coercion for order comparisons
    assert_eq!(ComparisonImpl::of(&s, &LuaValue::Integer(1)), None);
    assert!(ComparisonImpl::String.lt(&"a".into(), &"b".into()));
    assert!(ComparisonImpl::String.le(&"ab".into(), &"ab".into()));
}

#[test]
fn test_parse_lua_number() {
    assert_eq!(parse_lua_number(b"42"), Some(Integer(42)));
    assert_eq!(parse_lua_number(b"  -7  "), Some(Integer(-7)));
    assert_eq!(parse_lua_number(b"0x10"), Some(Integer(16)));
    assert_eq!(parse_lua_number(b"0xffffffffffffffff"), Some(Integer(-1)));
    assert!(matches!(parse_lua_number(b"0x1.8p1"), Some(Float(f)) if f == 3.0));
    assert!(matches!(parse_lua_number(b"1e2"), Some(Float(f)) if f == 100.0));
    assert!(matches!(parse_lua_number(b".5"), Some(Float(f)) if f == 0.5));
    assert!(matches!(
        parse_lua_number(b"9223372036854775808"),
        Some(Float(f)) if f == 9_223_372_036_854_775_808.0
    ));
    assert_eq!(parse_lua_number(b"inf"), None);
    assert_eq!(parse_lua_number(b"nan"), None);
    assert_eq!(parse_lua_number(b"1e"), None);
    assert_eq!(parse_lua_number(b"12abc"), None);
    assert_eq!(parse_lua_number(b""), None);
}

#[test]
fn test_float_formatting() {
    assert_eq!(lua_float_to_string(3.0), "3.0");
    assert_eq!(lua_float_to_string(-0.5), "-0.5");
    assert_eq!(lua_float_to_string(0.1), "0.1");
    assert_eq!(lua_float_to_string(1e15), "1e+15");
    assert_eq!(lua_float_to_string(1e-5), "1e-05");
    assert_eq!(lua_float_to_string(f64::INFINITY), "inf");
    assert_eq!(lua_float_to_string(f64::NEG_INFINITY), "-inf");
    assert_eq!(Integer(10).to_string(), "10");
}

#[test]
fn test_value_coercions() {
    assert_eq!(LuaValue::Float(3.0).to_integer(), Some(3));
    assert_eq!(LuaValue::Float(3.5).to_integer(), None);
    assert_eq!(LuaValue::from("0x10").to_integer(), Some(16));
    assert_eq!(LuaValue::from("2.0").to_integer(), Some(2));
    assert_eq!(LuaValue::Boolean(true).to_number(), None);
    assert_eq!(
        LuaValue::Integer(12).to_lua_string().map(|s| s.to_string()),
        Some("12".to_string())
    );
    assert!(LuaValue::Nil.is_falsy());
    assert!(LuaValue::Boolean(false).is_falsy());
    assert!(!LuaValue::Integer(0).is_falsy());
}

#[test]
fn test_continue_loop() {
    assert!(continue_loop(Integer(1), Integer(3), Integer(1)));
    assert!(!continue_loop(Integer(4), Integer(3), Integer(1)));
    assert!(continue_loop(Integer(3), Integer(1), Integer(-1)));
    assert!(!continue_loop(Integer(0), Integer(1), Integer(-1)));
    assert!(!continue_loop(Integer(1), Integer(3), Integer(0)));
    assert!(!continue_loop(Float(1.0), Float(3.0), Float(f64::NAN)));
    assert!(continue_loop(Float(0.5), Integer(1), Float(0.25)));
}
