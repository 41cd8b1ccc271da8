use thiserror::Error;

use crate::lua_vm::suspension::Suspension;

/// Failures raised by the dispatcher.
///
/// Messages follow the reference interpreter's wording so a host-level
/// reporter can prepend location information and show them as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LuaError {
    // ===== Illegal operations =====
    #[error("attempt to call a {type_name} value")]
    Call { type_name: String },

    #[error("attempt to perform arithmetic on a {type_name} value")]
    Arithmetic { type_name: String },

    #[error("attempt to perform bitwise operation on a {type_name} value")]
    Bitwise { type_name: String },

    #[error("attempt to get length of a {type_name} value")]
    Length { type_name: String },

    #[error("attempt to concatenate a {type_name} value")]
    Concatenate { type_name: String },

    #[error("{}", compare_message(.left, .right))]
    Compare { left: String, right: String },

    #[error("attempt to index a {type_name} value")]
    Index { type_name: String },

    // ===== Representation =====
    #[error("number has no integer representation")]
    NoIntegerRepresentation,

    #[error("attempt to perform 'n//0'")]
    DivideByZero,

    #[error("attempt to perform 'n%0'")]
    ModuloByZero,

    // ===== Structural guards =====
    #[error("'{event}' chain too long; possible loop")]
    MetatableLoop { event: &'static str },

    #[error("stack overflow")]
    StackOverflow,

    // ===== Tables =====
    #[error("index is nil")]
    NilIndex,

    #[error("index is NaN")]
    NaNIndex,

    // ===== Result buffer / continuations =====
    #[error("result index {index} out of range (size {size})")]
    ResultIndexOutOfRange { index: usize, size: usize },

    #[error("cannot resume: suspension owns no pending continuation")]
    NoContinuation,

    #[error("continuation resumed with a foreign suspended state")]
    BadSuspendedState,

    #[error("cannot resume {status} coroutine")]
    CannotResume { status: &'static str },

    /// Error raised by host code (native functions, drivers).
    #[error("{0}")]
    Runtime(String),
}

fn compare_message(left: &str, right: &str) -> String {
    if left == right {
        format!("attempt to compare two {} values", left)
    } else {
        format!("attempt to compare {} with {}", left, right)
    }
}

impl LuaError {
    pub fn runtime(msg: impl Into<String>) -> Self {
        LuaError::Runtime(msg.into())
    }
}

/// Non-local exit from a dispatcher operation.
///
/// A suspension travels through the same channel as errors so `?` unwinds
/// the native stack, but it is not a failure: every layer it crosses either
/// passes it on untouched or pushes its own continuation frame onto it.
#[derive(Debug, Error)]
pub enum Unwind {
    #[error(transparent)]
    Error(#[from] LuaError),

    #[error("operation suspended")]
    Suspend(Suspension),
}

impl From<Suspension> for Unwind {
    fn from(suspension: Suspension) -> Self {
        Unwind::Suspend(suspension)
    }
}

impl Unwind {
    #[inline]
    pub fn is_suspend(&self) -> bool {
        matches!(self, Unwind::Suspend(_))
    }

    /// Borrow the error, if this is one.
    pub fn as_error(&self) -> Option<&LuaError> {
        match self {
            Unwind::Error(e) => Some(e),
            Unwind::Suspend(_) => None,
        }
    }

    pub fn into_error(self) -> Option<LuaError> {
        match self {
            Unwind::Error(e) => Some(e),
            Unwind::Suspend(_) => None,
        }
    }

    pub fn into_suspension(self) -> Option<Suspension> {
        match self {
            Unwind::Suspend(s) => Some(s),
            Unwind::Error(_) => None,
        }
    }
}
