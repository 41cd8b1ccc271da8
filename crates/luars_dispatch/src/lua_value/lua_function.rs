use std::rc::Rc;

use crate::lua_value::LuaValue;
use crate::lua_vm::{LuaResult, LuaState};

/// Anything that can be invoked as a Lua function.
///
/// An invocation writes its results into the state's return buffer, or
/// stores a tail-call request there instead. It may also unwind with an
/// error or a suspension.
pub trait Invokable {
    fn invoke(&self, lua_state: &mut LuaState, args: &[LuaValue]) -> LuaResult<()>;
}

struct NativeFn<F>(F);

impl<F> Invokable for NativeFn<F>
where
    F: Fn(&mut LuaState, &[LuaValue]) -> LuaResult<()>,
{
    fn invoke(&self, lua_state: &mut LuaState, args: &[LuaValue]) -> LuaResult<()> {
        (self.0)(lua_state, args)
    }
}

/// Adapter for functions of exactly one parameter: a missing argument is
/// nil and extra arguments are ignored.
struct NativeFn1<F>(F);

impl<F> Invokable for NativeFn1<F>
where
    F: Fn(&mut LuaState, LuaValue) -> LuaResult<()>,
{
    fn invoke(&self, lua_state: &mut LuaState, args: &[LuaValue]) -> LuaResult<()> {
        let arg = args.first().cloned().unwrap_or_default();
        (self.0)(lua_state, arg)
    }
}

/// Shared handle to an invokable. Equality is identity.
#[derive(Clone)]
pub struct LuaFunction(Rc<dyn Invokable>);

impl LuaFunction {
    pub fn new(f: impl Invokable + 'static) -> Self {
        LuaFunction(Rc::new(f))
    }

    /// Wrap a variadic native function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&mut LuaState, &[LuaValue]) -> LuaResult<()> + 'static,
    {
        LuaFunction(Rc::new(NativeFn(f)))
    }

    /// Wrap a native function taking a single argument.
    pub fn from_fn1<F>(f: F) -> Self
    where
        F: Fn(&mut LuaState, LuaValue) -> LuaResult<()> + 'static,
    {
        LuaFunction(Rc::new(NativeFn1(f)))
    }

    #[inline]
    pub fn invoke(&self, lua_state: &mut LuaState, args: &[LuaValue]) -> LuaResult<()> {
        self.0.invoke(lua_state, args)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &LuaFunction) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared allocation, for hashing and display.
    #[inline]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl std::fmt::Debug for LuaFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "function: {:#x}", self.addr())
    }
}
