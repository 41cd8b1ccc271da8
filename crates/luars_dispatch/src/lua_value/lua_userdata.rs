use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::lua_value::TableRef;

/// Host-owned opaque data with an optional per-instance metatable.
pub struct LuaUserdata {
    data: RefCell<Box<dyn Any>>,
    metatable: RefCell<Option<TableRef>>,
}

impl LuaUserdata {
    pub fn new<T: Any>(data: T) -> Self {
        LuaUserdata {
            data: RefCell::new(Box::new(data)),
            metatable: RefCell::new(None),
        }
    }

    pub fn is<T: Any>(&self) -> bool {
        self.data.borrow().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.data.borrow(), |d| d.downcast_ref::<T>()).ok()
    }

    pub fn downcast_mut<T: Any>(&self) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.data.borrow_mut(), |d| d.downcast_mut::<T>()).ok()
    }

    pub fn metatable(&self) -> Option<TableRef> {
        self.metatable.borrow().clone()
    }

    pub fn set_metatable(&self, mt: Option<TableRef>) {
        *self.metatable.borrow_mut() = mt;
    }
}

/// Shared handle to a userdata. Equality is identity.
#[derive(Clone)]
pub struct UserdataRef(Rc<LuaUserdata>);

impl UserdataRef {
    pub fn new<T: Any>(data: T) -> Self {
        UserdataRef(Rc::new(LuaUserdata::new(data)))
    }

    #[inline]
    pub fn ptr_eq(&self, other: &UserdataRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub fn as_ptr(&self) -> *const LuaUserdata {
        Rc::as_ptr(&self.0)
    }
}

impl std::ops::Deref for UserdataRef {
    type Target = LuaUserdata;

    fn deref(&self) -> &LuaUserdata {
        &self.0
    }
}

impl std::fmt::Debug for UserdataRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "userdata: {:p}", self.as_ptr())
    }
}
