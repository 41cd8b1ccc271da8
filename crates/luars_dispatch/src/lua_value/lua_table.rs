// Lua table with an array part and a hash part.
// - Array part holds integer keys [1..array.len()]
// - Hash part uses ahash for every other key
use std::cell::{Ref, RefCell, RefMut};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use ahash::AHashMap;

use crate::lua_value::LuaValue;
use crate::lua_value::lua_number::float_to_integer;
use crate::lua_vm::LuaError;

/// Hash-part key. Floats with an integral value are stored as integers, so
/// `t[1]` and `t[1.0]` address the same slot.
#[derive(Clone, Debug)]
pub struct TableKey(LuaValue);

impl TableKey {
    /// Normalize a key for storage. Returns `None` for keys that can never
    /// be stored (nil, NaN).
    fn normalize(key: &LuaValue) -> Option<TableKey> {
        match key {
            LuaValue::Nil => None,
            LuaValue::Float(f) if f.is_nan() => None,
            LuaValue::Float(f) => Some(TableKey(match float_to_integer(*f) {
                Some(i) => LuaValue::Integer(i),
                None => LuaValue::Float(*f),
            })),
            other => Some(TableKey(other.clone())),
        }
    }

    pub fn value(&self) -> &LuaValue {
        &self.0
    }
}

impl PartialEq for TableKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.raw_equal(&other.0)
    }
}

impl Eq for TableKey {}

impl Hash for TableKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            LuaValue::Nil => {}
            LuaValue::Boolean(b) => b.hash(state),
            LuaValue::Integer(i) => i.hash(state),
            LuaValue::Float(f) => f.to_bits().hash(state),
            LuaValue::String(s) => s.hash(state),
            LuaValue::Table(t) => (t.as_ptr() as usize).hash(state),
            LuaValue::Function(f) => f.addr().hash(state),
            LuaValue::Userdata(u) => (u.as_ptr() as usize).hash(state),
            LuaValue::Thread(t) => (t.as_ptr() as usize).hash(state),
        }
    }
}

#[derive(Default)]
pub struct LuaTable {
    /// Values for keys 1..=array.len(); never ends with nil.
    array: Vec<LuaValue>,
    /// Every other key. Key `array.len() + 1` is never present here.
    hash: AHashMap<TableKey, LuaValue>,
    metatable: Option<TableRef>,
}

impl LuaTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(narray: usize, nhash: usize) -> Self {
        LuaTable {
            array: Vec::with_capacity(narray),
            hash: AHashMap::with_capacity(nhash),
            metatable: None,
        }
    }

    pub fn metatable(&self) -> Option<TableRef> {
        self.metatable.clone()
    }

    pub fn set_metatable(&mut self, mt: Option<TableRef>) {
        self.metatable = mt;
    }

    /// Border of the array part; the raw `#` of this table.
    #[inline]
    pub fn raw_len(&self) -> usize {
        self.array.len()
    }

    #[inline]
    pub fn get_int(&self, key: i64) -> LuaValue {
        if key >= 1 && (key as u64) <= self.array.len() as u64 {
            return self.array[(key - 1) as usize].clone();
        }
        self.hash
            .get(&TableKey(LuaValue::Integer(key)))
            .cloned()
            .unwrap_or_default()
    }

    /// Raw read; absent keys (including nil and NaN) read as nil.
    pub fn raw_get(&self, key: &LuaValue) -> LuaValue {
        match TableKey::normalize(key) {
            Some(TableKey(LuaValue::Integer(i))) => self.get_int(i),
            Some(k) => self.hash.get(&k).cloned().unwrap_or_default(),
            None => LuaValue::Nil,
        }
    }

    /// Raw write. Storing nil removes the key.
    pub fn raw_set(&mut self, key: &LuaValue, value: LuaValue) -> Result<(), LuaError> {
        match TableKey::normalize(key) {
            Some(TableKey(LuaValue::Integer(i))) => {
                self.set_int(i, value);
                Ok(())
            }
            Some(k) => {
                if value.is_nil() {
                    self.hash.remove(&k);
                } else {
                    self.hash.insert(k, value);
                }
                Ok(())
            }
            None if key.is_nil() => Err(LuaError::NilIndex),
            None => Err(LuaError::NaNIndex),
        }
    }

    pub fn set_int(&mut self, key: i64, value: LuaValue) {
        let len = self.array.len();
        if key >= 1 && (key as u64) <= len as u64 {
            let idx = (key - 1) as usize;
            self.array[idx] = value;
            if idx + 1 == len {
                self.shrink_trailing_nils();
            }
            return;
        }

        if key >= 1 && key as u64 == len as u64 + 1 {
            if value.is_nil() {
                return;
            }
            self.array.push(value);
            self.migrate_from_hash();
            return;
        }

        let k = TableKey(LuaValue::Integer(key));
        if value.is_nil() {
            self.hash.remove(&k);
        } else {
            self.hash.insert(k, value);
        }
    }

    /// Pull keys that now continue the array out of the hash part.
    fn migrate_from_hash(&mut self) {
        loop {
            let next = TableKey(LuaValue::Integer(self.array.len() as i64 + 1));
            match self.hash.remove(&next) {
                Some(v) => self.array.push(v),
                None => break,
            }
        }
    }

    fn shrink_trailing_nils(&mut self) {
        while matches!(self.array.last(), Some(LuaValue::Nil)) {
            self.array.pop();
        }
    }

    /// Append after the current border.
    pub fn push(&mut self, value: LuaValue) {
        let next = self.array.len() as i64 + 1;
        self.set_int(next, value);
    }
}

/// Shared, mutable handle to a table. Equality is identity.
#[derive(Clone, Default)]
pub struct TableRef(Rc<RefCell<LuaTable>>);

impl TableRef {
    pub fn new(table: LuaTable) -> Self {
        TableRef(Rc::new(RefCell::new(table)))
    }

    #[inline]
    pub fn ptr_eq(&self, other: &TableRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub fn as_ptr(&self) -> *const RefCell<LuaTable> {
        Rc::as_ptr(&self.0)
    }

    pub fn borrow(&self) -> Ref<'_, LuaTable> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, LuaTable> {
        self.0.borrow_mut()
    }

    pub fn raw_get(&self, key: &LuaValue) -> LuaValue {
        self.0.borrow().raw_get(key)
    }

    pub fn raw_set(&self, key: &LuaValue, value: LuaValue) -> Result<(), LuaError> {
        self.0.borrow_mut().raw_set(key, value)
    }

    pub fn raw_len(&self) -> usize {
        self.0.borrow().raw_len()
    }

    pub fn metatable(&self) -> Option<TableRef> {
        self.0.borrow().metatable()
    }

    pub fn set_metatable(&self, mt: Option<TableRef>) {
        self.0.borrow_mut().set_metatable(mt);
    }
}

impl std::fmt::Debug for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "table: {:p}", self.as_ptr())
    }
}
