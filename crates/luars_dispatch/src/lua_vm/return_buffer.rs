use crate::lua_value::LuaValue;
use crate::lua_vm::LuaError;
use crate::lua_vm::lua_limits::RETURN_BUFFER_INLINE;

/// Multi-value register shared by every dispatch step of one execution
/// context.
///
/// Holds call results on the way out. When `tail_call` is set, the contents
/// are the arguments of that pending target instead of results; the
/// trampoline in `execute::call` drains it.
///
/// Up to `RETURN_BUFFER_INLINE` values live in fixed slots; longer sequences
/// are held entirely in `overflow`.
pub struct ReturnBuffer {
    size: usize,
    slots: [LuaValue; RETURN_BUFFER_INLINE],
    overflow: Vec<LuaValue>,
    tail_call: Option<LuaValue>,
}

impl Default for ReturnBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReturnBuffer {
    pub fn new() -> Self {
        ReturnBuffer {
            size: 0,
            slots: Default::default(),
            overflow: Vec::new(),
            tail_call: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn is_tail_call(&self) -> bool {
        self.tail_call.is_some()
    }

    pub fn tail_call_target(&self) -> Option<&LuaValue> {
        self.tail_call.as_ref()
    }

    /// The i-th value; fails when `index >= len()`.
    pub fn get(&self, index: usize) -> Result<&LuaValue, LuaError> {
        self.as_slice()
            .get(index)
            .ok_or(LuaError::ResultIndexOutOfRange {
                index,
                size: self.size,
            })
    }

    /// First value, or nil when empty. This is the "adjust to one result"
    /// read used after metamethod calls.
    #[inline]
    pub fn first(&self) -> LuaValue {
        self.as_slice().first().cloned().unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[LuaValue] {
        if self.size <= RETURN_BUFFER_INLINE {
            &self.slots[..self.size]
        } else {
            &self.overflow
        }
    }

    pub fn to_vec(&self) -> Vec<LuaValue> {
        self.as_slice().to_vec()
    }

    /// Drop every value and clear the tail-call flag.
    pub fn reset(&mut self) {
        self.clear_slots();
        self.tail_call = None;
    }

    fn clear_slots(&mut self) {
        for slot in &mut self.slots[..self.size.min(RETURN_BUFFER_INLINE)] {
            *slot = LuaValue::Nil;
        }
        self.overflow.clear();
        self.size = 0;
    }

    pub fn set_to(&mut self, v: LuaValue) {
        self.reset();
        self.slots[0] = v;
        self.size = 1;
    }

    pub fn set_to2(&mut self, a: LuaValue, b: LuaValue) {
        self.reset();
        self.slots[0] = a;
        self.slots[1] = b;
        self.size = 2;
    }

    pub fn set_to_slice(&mut self, values: &[LuaValue]) {
        self.reset();
        self.fill(values);
    }

    pub fn set_to_vec(&mut self, values: Vec<LuaValue>) {
        self.reset();
        if values.len() > RETURN_BUFFER_INLINE {
            self.size = values.len();
            self.overflow = values;
        } else {
            self.fill(&values);
        }
    }

    /// Request a tail call: the trampoline will invoke `target` with `args`
    /// in place of the current invocation.
    pub fn set_to_tail_call(&mut self, target: LuaValue, args: &[LuaValue]) {
        self.reset();
        self.fill(args);
        self.tail_call = Some(target);
    }

    /// Take a pending tail call, leaving the buffer empty.
    pub fn take_tail_call(&mut self) -> Option<(LuaValue, Vec<LuaValue>)> {
        let target = self.tail_call.take()?;
        let args = self.to_vec();
        self.clear_slots();
        Some((target, args))
    }

    fn fill(&mut self, values: &[LuaValue]) {
        if values.len() > RETURN_BUFFER_INLINE {
            self.overflow.extend_from_slice(values);
        } else {
            self.slots[..values.len()].clone_from_slice(values);
        }
        self.size = values.len();
    }
}

impl std::fmt::Debug for ReturnBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReturnBuffer")
            .field("values", &self.as_slice())
            .field("tail_call", &self.tail_call)
            .finish()
    }
}
