//! Centralized dispatcher limits and configuration constants.
//!
//! Mirrors Lua 5.4's `luaconf.h` / `llimits.h` design.
//! All magic numbers that control dispatch behavior are collected here
//! for easy tuning and configuration.

// ===== Calls =====

/// Default maximum nesting of non-tail calls made through the trampoline.
/// Matches Lua's LUAI_MAXCCALLS.
pub const MAX_CALL_DEPTH: usize = 200;

// ===== Metamethods =====

/// Maximum depth for __index / __newindex metamethod chains.
/// Prevents infinite loops in metamethod resolution.
/// Matches Lua's MAXTAGLOOP.
pub const MAXTAGLOOP: usize = 2000;

// ===== Result buffer =====

/// Number of values the return buffer keeps inline before spilling
/// into its overflow vector.
pub const RETURN_BUFFER_INLINE: usize = 5;

// ===== Numbers =====

/// Maximum number of significant digits when formatting floats (`%.14g`).
pub const LUAI_NUMDIGITS: usize = 14;
