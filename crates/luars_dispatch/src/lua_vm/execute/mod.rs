/*----------------------------------------------------------------------
  Operation dispatcher

  Every entry point takes the execution context plus operands, tries the
  raw path first, and otherwise resolves a metamethod and calls it through
  the trampoline in `call`. Results land in the context's return buffer;
  single-valued operations also return their value.

  A suspension raised by a metamethod passes back through the entry point
  with a continuation frame attached that finishes the operation (result
  truncation, boolean coercion, negation) once the chain is resumed.
----------------------------------------------------------------------*/

mod arithmetic_ops;
pub mod call;
mod comparison_ops;
mod concat;
mod metamethod;
mod table_ops;

pub use arithmetic_ops::{
    add, band, bnot, bor, bxor, div, idiv, modulo, mul, pow, shift_left, shift_right, shl, shr,
    sub, unm,
};
pub use call::{CallTarget, call, call0, call1, call2, call3, call4, call5, call_target};
pub use comparison_ops::{equal, less_equal, less_than, not};
pub use concat::{concat, len};
pub use metamethod::{TmKind, binary_handler_for, get_metamethod, get_metatable};
pub use table_ops::{index, new_index};
