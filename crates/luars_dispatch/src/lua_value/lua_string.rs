use std::fmt;
use std::rc::Rc;

/// Lua string: immutable bytes, cheap to clone.
///
/// Lua strings are not required to be UTF-8, so the payload is a byte slice
/// and ordering is plain bytewise comparison.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LuaString {
    data: Rc<[u8]>,
}

impl LuaString {
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        LuaString {
            data: Rc::from(bytes.as_ref()),
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The contents as `&str` when they are valid UTF-8.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    pub fn to_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &LuaString) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// Concatenate two strings into a fresh one.
    pub fn concat(&self, other: &LuaString) -> LuaString {
        let mut buf = Vec::with_capacity(self.len() + other.len());
        buf.extend_from_slice(&self.data);
        buf.extend_from_slice(&other.data);
        LuaString::from(buf)
    }
}

impl From<&str> for LuaString {
    fn from(s: &str) -> Self {
        LuaString::new(s.as_bytes())
    }
}

impl From<String> for LuaString {
    fn from(s: String) -> Self {
        LuaString::from(s.into_bytes())
    }
}

impl From<&[u8]> for LuaString {
    fn from(bytes: &[u8]) -> Self {
        LuaString::new(bytes)
    }
}

impl From<Vec<u8>> for LuaString {
    fn from(bytes: Vec<u8>) -> Self {
        LuaString {
            data: Rc::from(bytes.into_boxed_slice()),
        }
    }
}

impl fmt::Debug for LuaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_str_lossy())
    }
}

impl fmt::Display for LuaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}
