use crate::lua_vm::lua_limits::{MAX_CALL_DEPTH, MAXTAGLOOP};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SafeOption {
    /// Maximum nesting of non-tail calls through the trampoline.
    /// Tail calls are flushed in a loop and never count against it.
    pub max_call_depth: usize,
    /// Maximum number of __index / __newindex retries before the chain
    /// is reported as a loop.
    pub max_tag_loop: usize,
}

impl Default for SafeOption {
    fn default() -> Self {
        Self {
            max_call_depth: MAX_CALL_DEPTH,
            max_tag_loop: MAXTAGLOOP,
        }
    }
}

#[cfg(feature = "serde")]
impl SafeOption {
    /// Load options from a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
