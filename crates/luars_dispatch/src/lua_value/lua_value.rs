// LuaValue - the closed set of Lua value variants.
//
// Scalars (nil, boolean, integer, float) are stored inline; strings are
// shared immutable byte buffers; tables, functions, userdata and threads are
// reference types compared by identity.
use std::fmt;

use crate::lua_value::lua_number::{LuaNumber, float_to_integer, lua_float_to_string};
use crate::lua_value::parse_number::parse_lua_number;
use crate::lua_value::{LuaFunction, LuaString, LuaTable, TableRef, ThreadRef, UserdataRef};

/// Basic type of a value, as reported by `type()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LuaValueKind {
    Nil = 0,
    Boolean = 1,
    Number = 2,
    String = 3,
    Table = 4,
    Function = 5,
    Userdata = 6,
    Thread = 7,
}

impl LuaValueKind {
    /// Number of basic kinds; sizes per-kind lookup arrays.
    pub const COUNT: usize = 8;

    pub const fn name(self) -> &'static str {
        match self {
            LuaValueKind::Nil => "nil",
            LuaValueKind::Boolean => "boolean",
            LuaValueKind::Number => "number",
            LuaValueKind::String => "string",
            LuaValueKind::Table => "table",
            LuaValueKind::Function => "function",
            LuaValueKind::Userdata => "userdata",
            LuaValueKind::Thread => "thread",
        }
    }
}

#[derive(Clone, Default)]
pub enum LuaValue {
    #[default]
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(LuaString),
    Table(TableRef),
    Function(LuaFunction),
    Userdata(UserdataRef),
    Thread(ThreadRef),
}

impl LuaValue {
    // ============ Constructors ============

    #[inline(always)]
    pub const fn nil() -> Self {
        LuaValue::Nil
    }

    #[inline(always)]
    pub const fn boolean(b: bool) -> Self {
        LuaValue::Boolean(b)
    }

    #[inline(always)]
    pub const fn integer(i: i64) -> Self {
        LuaValue::Integer(i)
    }

    #[inline(always)]
    pub const fn float(n: f64) -> Self {
        LuaValue::Float(n)
    }

    #[inline]
    pub fn string(s: impl Into<LuaString>) -> Self {
        LuaValue::String(s.into())
    }

    /// A fresh, empty table.
    #[inline]
    pub fn new_table() -> Self {
        LuaValue::Table(TableRef::new(LuaTable::new()))
    }

    // ============ Type predicates ============

    pub fn kind(&self) -> LuaValueKind {
        match self {
            LuaValue::Nil => LuaValueKind::Nil,
            LuaValue::Boolean(_) => LuaValueKind::Boolean,
            LuaValue::Integer(_) | LuaValue::Float(_) => LuaValueKind::Number,
            LuaValue::String(_) => LuaValueKind::String,
            LuaValue::Table(_) => LuaValueKind::Table,
            LuaValue::Function(_) => LuaValueKind::Function,
            LuaValue::Userdata(_) => LuaValueKind::Userdata,
            LuaValue::Thread(_) => LuaValueKind::Thread,
        }
    }

    /// Basic type name, without consulting `__name`.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    #[inline(always)]
    pub fn is_nil(&self) -> bool {
        matches!(self, LuaValue::Nil)
    }

    /// Only `nil` and `false` are falsy.
    #[inline(always)]
    pub fn is_falsy(&self) -> bool {
        matches!(self, LuaValue::Nil | LuaValue::Boolean(false))
    }

    #[inline(always)]
    pub fn is_number(&self) -> bool {
        matches!(self, LuaValue::Integer(_) | LuaValue::Float(_))
    }

    #[inline(always)]
    pub fn is_string(&self) -> bool {
        matches!(self, LuaValue::String(_))
    }

    #[inline(always)]
    pub fn is_table(&self) -> bool {
        matches!(self, LuaValue::Table(_))
    }

    #[inline(always)]
    pub fn is_function(&self) -> bool {
        matches!(self, LuaValue::Function(_))
    }

    #[inline(always)]
    pub fn is_userdata(&self) -> bool {
        matches!(self, LuaValue::Userdata(_))
    }

    // ============ Accessors ============

    #[inline]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            LuaValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload, only for the integer subtype.
    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            LuaValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Float payload, only for the float subtype.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            LuaValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Numeric payload without string coercion.
    #[inline]
    pub fn as_number(&self) -> Option<LuaNumber> {
        match self {
            LuaValue::Integer(i) => Some(LuaNumber::Integer(*i)),
            LuaValue::Float(f) => Some(LuaNumber::Float(*f)),
            _ => None,
        }
    }

    #[inline]
    pub fn as_lua_string(&self) -> Option<&LuaString> {
        match self {
            LuaValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// String contents as `&str` when the value is a UTF-8 string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        self.as_lua_string().and_then(LuaString::as_str)
    }

    #[inline]
    pub fn as_table(&self) -> Option<&TableRef> {
        match self {
            LuaValue::Table(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub fn as_function(&self) -> Option<&LuaFunction> {
        match self {
            LuaValue::Function(f) => Some(f),
            _ => None,
        }
    }

    #[inline]
    pub fn as_userdata(&self) -> Option<&UserdataRef> {
        match self {
            LuaValue::Userdata(u) => Some(u),
            _ => None,
        }
    }

    #[inline]
    pub fn as_thread(&self) -> Option<&ThreadRef> {
        match self {
            LuaValue::Thread(t) => Some(t),
            _ => None,
        }
    }

    // ============ Coercions ============

    /// Number coercion used by arithmetic: numbers as-is, strings parsed as
    /// Lua numerals.
    pub fn to_number(&self) -> Option<LuaNumber> {
        match self {
            LuaValue::Integer(i) => Some(LuaNumber::Integer(*i)),
            LuaValue::Float(f) => Some(LuaNumber::Float(*f)),
            LuaValue::String(s) => parse_lua_number(s.as_bytes()),
            _ => None,
        }
    }

    /// Integer coercion used by bitwise operators: integers, integral floats
    /// and numeric strings with an integral value.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            LuaValue::Integer(i) => Some(*i),
            LuaValue::Float(f) => float_to_integer(*f),
            LuaValue::String(_) => self.to_number()?.to_integer(),
            _ => None,
        }
    }

    /// String coercion used by concatenation: strings as-is, numbers
    /// formatted the way `tostring` does.
    pub fn to_lua_string(&self) -> Option<LuaString> {
        match self {
            LuaValue::String(s) => Some(s.clone()),
            LuaValue::Integer(i) => {
                let mut buf = itoa::Buffer::new();
                Some(LuaString::from(buf.format(*i)))
            }
            LuaValue::Float(f) => Some(LuaString::from(lua_float_to_string(*f))),
            _ => None,
        }
    }

    // ============ Equality ============

    /// Primitive equality without metamethods.
    ///
    /// Numbers compare by mathematical value across subtypes, strings by
    /// contents, reference types by identity.
    pub fn raw_equal(&self, other: &LuaValue) -> bool {
        match (self, other) {
            (LuaValue::Nil, LuaValue::Nil) => true,
            (LuaValue::Boolean(a), LuaValue::Boolean(b)) => a == b,
            (LuaValue::String(a), LuaValue::String(b)) => a == b,
            (LuaValue::Table(a), LuaValue::Table(b)) => a.ptr_eq(b),
            (LuaValue::Function(a), LuaValue::Function(b)) => a.ptr_eq(b),
            (LuaValue::Userdata(a), LuaValue::Userdata(b)) => a.ptr_eq(b),
            (LuaValue::Thread(a), LuaValue::Thread(b)) => a.ptr_eq(b),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.num_eq(b),
                _ => false,
            },
        }
    }
}

impl PartialEq for LuaValue {
    fn eq(&self, other: &Self) -> bool {
        self.raw_equal(other)
    }
}

impl fmt::Debug for LuaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LuaValue::Nil => write!(f, "nil"),
            LuaValue::Boolean(b) => write!(f, "{}", b),
            LuaValue::Integer(i) => write!(f, "{}", i),
            LuaValue::Float(n) => write!(f, "{}", lua_float_to_string(*n)),
            LuaValue::String(s) => write!(f, "{:?}", s),
            LuaValue::Table(t) => write!(f, "table: {:p}", t.as_ptr()),
            LuaValue::Function(func) => write!(f, "function: {:#x}", func.addr()),
            LuaValue::Userdata(u) => write!(f, "userdata: {:p}", u.as_ptr()),
            LuaValue::Thread(t) => write!(f, "thread: {:p}", t.as_ptr()),
        }
    }
}

// ============ Conversions ============

impl From<bool> for LuaValue {
    fn from(b: bool) -> Self {
        LuaValue::Boolean(b)
    }
}

impl From<i64> for LuaValue {
    fn from(i: i64) -> Self {
        LuaValue::Integer(i)
    }
}

impl From<f64> for LuaValue {
    fn from(n: f64) -> Self {
        LuaValue::Float(n)
    }
}

impl From<&str> for LuaValue {
    fn from(s: &str) -> Self {
        LuaValue::String(LuaString::from(s))
    }
}

impl From<String> for LuaValue {
    fn from(s: String) -> Self {
        LuaValue::String(LuaString::from(s))
    }
}

impl From<LuaString> for LuaValue {
    fn from(s: LuaString) -> Self {
        LuaValue::String(s)
    }
}

impl From<TableRef> for LuaValue {
    fn from(t: TableRef) -> Self {
        LuaValue::Table(t)
    }
}

impl From<LuaFunction> for LuaValue {
    fn from(f: LuaFunction) -> Self {
        LuaValue::Function(f)
    }
}

impl From<UserdataRef> for LuaValue {
    fn from(u: UserdataRef) -> Self {
        LuaValue::Userdata(u)
    }
}

impl From<ThreadRef> for LuaValue {
    fn from(t: ThreadRef) -> Self {
        LuaValue::Thread(t)
    }
}
