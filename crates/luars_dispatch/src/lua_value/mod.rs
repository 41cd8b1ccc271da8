// Lua values and the containers the dispatcher needs
mod lua_function;
pub mod lua_number;
mod lua_string;
mod lua_table;
mod lua_thread;
mod lua_userdata;
#[allow(clippy::module_inception)]
mod lua_value;
pub mod parse_number;

pub use lua_function::{Invokable, LuaFunction};
pub use lua_number::{ComparisonImpl, LuaNumber, MathImpl};
pub use lua_string::LuaString;
pub use lua_table::{LuaTable, TableKey, TableRef};
pub use lua_thread::{CoroutineStatus, LuaThread, ResumeOutcome, ThreadRef, coroutine_yield};
pub use lua_userdata::{LuaUserdata, UserdataRef};
pub use lua_value::{LuaValue, LuaValueKind};
