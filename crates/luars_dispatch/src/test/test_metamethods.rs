// Tests for __index, __newindex and __call dispatch
use std::cell::RefCell;
use std::rc::Rc;

use crate::lua_value::{LuaFunction, LuaTable, LuaValue, TableRef};
use crate::lua_vm::execute::{
    CallTarget, call, call_target, call1, call3, call4, call5, index, new_index,
};
use crate::lua_vm::{LuaError, LuaVM, SafeOption, Unwind};

use super::{new_state, returning, table_with_meta};

fn failing() -> LuaValue {
    LuaFunction::from_fn(|_, _| Err(LuaError::runtime("handler must not run").into())).into()
}

#[test]
fn test_raw_hit_short_circuits_index() {
    let mut st = new_state();
    let t = table_with_meta(vec![("__index", failing())]);
    t.as_table().unwrap().raw_set(&"k".into(), "raw".into()).unwrap();
    assert_eq!(index(&mut st, &t, &"k".into()).unwrap(), LuaValue::from("raw"));
}

#[test]
fn test_index_without_handler() {
    let mut st = new_state();
    let t = LuaValue::new_table();
    assert!(index(&mut st, &t, &"missing".into()).unwrap().is_nil());
    assert_eq!(st.results(), vec![LuaValue::Nil]);

    match index(&mut st, &LuaValue::Nil, &"k".into()) {
        Err(Unwind::Error(e)) => assert_eq!(e.to_string(), "attempt to index a nil value"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_index_chain_through_tables() {
    let mut st = new_state();
    let base = LuaValue::new_table();
    base.as_table().unwrap().raw_set(&"k".into(), LuaValue::Integer(3)).unwrap();
    let middle = table_with_meta(vec![("__index", base)]);
    let top = table_with_meta(vec![("__index", middle)]);

    assert_eq!(index(&mut st, &top, &"k".into()).unwrap(), LuaValue::Integer(3));
    assert!(index(&mut st, &top, &"other".into()).unwrap().is_nil());
}

#[test]
fn test_index_function_handler() {
    let mut st = new_state();
    let handler = LuaFunction::from_fn(|lua_state, args| {
        assert!(args[0].is_table());
        let key = args[1].clone();
        lua_state.return_buffer_mut().set_to2(key, "ignored".into());
        Ok(())
    });
    let t = table_with_meta(vec![("__index", handler.into())]);
    assert_eq!(index(&mut st, &t, &"echo".into()).unwrap(), LuaValue::from("echo"));
    assert_eq!(st.return_buffer().len(), 1);
}

/// `n` tables whose metatables point `event` at the next table, in a ring.
fn table_cycle(n: usize, event: &str) -> Vec<TableRef> {
    let tables: Vec<TableRef> = (0..n).map(|_| TableRef::new(LuaTable::new())).collect();
    for i in 0..n {
        let mt = TableRef::new(LuaTable::new());
        mt.raw_set(&event.into(), tables[(i + 1) % n].clone().into())
            .unwrap();
        tables[i].set_metatable(Some(mt));
    }
    tables
}

#[test]
fn test_index_cycle_hits_loop_guard() {
    let mut st = new_state();
    let tables = table_cycle(5, "__index");
    let first: LuaValue = tables[0].clone().into();

    match index(&mut st, &first, &"k".into()) {
        Err(Unwind::Error(e)) => {
            assert_eq!(e, LuaError::MetatableLoop { event: "__index" });
            assert_eq!(e.to_string(), "'__index' chain too long; possible loop");
        }
        other => panic!("unexpected {:?}", other),
    }

    // no __newindex anywhere in the ring: plain raw write
    new_index(&mut st, &first, &"k".into(), LuaValue::Integer(1)).unwrap();
    assert_eq!(tables[0].raw_get(&"k".into()), LuaValue::Integer(1));
    assert!(tables[1].raw_get(&"k".into()).is_nil());
}

#[test]
fn test_newindex_cycle_hits_loop_guard() {
    let mut st = new_state();
    let tables = table_cycle(5, "__newindex");
    let first: LuaValue = tables[0].clone().into();

    match new_index(&mut st, &first, &"k".into(), LuaValue::Integer(1)) {
        Err(Unwind::Error(e)) => {
            assert_eq!(e, LuaError::MetatableLoop { event: "__newindex" });
            assert_eq!(e.to_string(), "'__newindex' chain too long; possible loop");
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(tables.iter().all(|t| t.raw_get(&"k".into()).is_nil()));
}

#[test]
fn test_loop_guard_is_configurable() {
    let vm = LuaVM::new(SafeOption {
        max_tag_loop: 2,
        ..SafeOption::default()
    });
    let mut st = vm.new_state();
    let base = LuaValue::new_table();
    let middle = table_with_meta(vec![("__index", base)]);
    let top = table_with_meta(vec![("__index", middle)]);
    assert!(index(&mut st, &top, &"k".into()).is_err());
}

#[test]
fn test_newindex_raw_paths() {
    let mut st = new_state();
    let t = table_with_meta(vec![("__newindex", failing())]);
    let table = t.as_table().unwrap().clone();
    table.raw_set(&"k".into(), LuaValue::Integer(1)).unwrap();

    // existing key: raw write, handler untouched
    new_index(&mut st, &t, &"k".into(), LuaValue::Integer(2)).unwrap();
    assert_eq!(table.raw_get(&"k".into()), LuaValue::Integer(2));

    // no handler at all
    let plain = LuaValue::new_table();
    new_index(&mut st, &plain, &LuaValue::Integer(1), "v".into()).unwrap();
    assert_eq!(plain.as_table().unwrap().raw_len(), 1);

    match new_index(&mut st, &plain, &LuaValue::Nil, "v".into()) {
        Err(Unwind::Error(e)) => assert_eq!(e, LuaError::NilIndex),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_newindex_function_handler() {
    let mut st = new_state();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let handler = LuaFunction::from_fn(move |lua_state, args| {
        log.borrow_mut().extend_from_slice(&args[1..]);
        lua_state.return_buffer_mut().set_to("discarded".into());
        Ok(())
    });
    let t = table_with_meta(vec![("__newindex", handler.into())]);
    new_index(&mut st, &t, &"k".into(), LuaValue::Integer(7)).unwrap();

    assert_eq!(*seen.borrow(), vec![LuaValue::from("k"), LuaValue::Integer(7)]);
    assert!(t.as_table().unwrap().raw_get(&"k".into()).is_nil());
    assert!(st.return_buffer().is_empty());
}

#[test]
fn test_newindex_redirects_to_table() {
    let mut st = new_state();
    let store = LuaValue::new_table();
    let t = table_with_meta(vec![("__newindex", store.clone())]);
    new_index(&mut st, &t, &"k".into(), LuaValue::Integer(1)).unwrap();
    assert_eq!(store.as_table().unwrap().raw_get(&"k".into()), LuaValue::Integer(1));
    assert!(t.as_table().unwrap().raw_get(&"k".into()).is_nil());
}

#[test]
fn test_call_direct_and_variadic() {
    let mut st = new_state();
    let sum = LuaFunction::from_fn(|lua_state, args| {
        let total: i64 = args.iter().filter_map(LuaValue::as_integer).sum();
        lua_state.return_buffer_mut().set_to2(total.into(), (args.len() as i64).into());
        Ok(())
    });
    let f: LuaValue = sum.into();
    let args: Vec<LuaValue> = (1..=8).map(LuaValue::Integer).collect();
    call(&mut st, &f, &args).unwrap();
    assert_eq!(st.results(), vec![LuaValue::Integer(36), LuaValue::Integer(8)]);

    crate::lua_vm::execute::call2(&mut st, &f, 1i64.into(), 2i64.into()).unwrap();
    assert_eq!(st.results(), vec![LuaValue::Integer(3), LuaValue::Integer(2)]);
    crate::lua_vm::execute::call0(&mut st, &f).unwrap();
    assert_eq!(st.results(), vec![LuaValue::Integer(0), LuaValue::Integer(0)]);
}

#[test]
fn test_call_metamethod_prepends_target() {
    let mut st = new_state();
    let handler = LuaFunction::from_fn(|lua_state, args| {
        lua_state.return_buffer_mut().set_to_slice(args);
        Ok(())
    });
    let t = table_with_meta(vec![("__call", handler.into())]);
    assert!(matches!(
        call_target(&st, &t),
        Ok(CallTarget::WithImplicitSelf(_))
    ));

    call(&mut st, &t, &[LuaValue::Integer(1)]).unwrap();
    let results = st.results();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0], t);
    assert_eq!(results[1], LuaValue::Integer(1));
}

#[test]
fn test_fixed_arity_calls() {
    let mut st = new_state();
    let echo = LuaFunction::from_fn(|lua_state, args| {
        lua_state.return_buffer_mut().set_to_slice(args);
        Ok(())
    });
    let f: LuaValue = echo.clone().into();
    let n = |i: i64| LuaValue::Integer(i);

    call1(&mut st, &f, n(1)).unwrap();
    assert_eq!(st.results(), vec![n(1)]);
    call3(&mut st, &f, n(1), n(2), n(3)).unwrap();
    assert_eq!(st.results(), vec![n(1), n(2), n(3)]);
    call4(&mut st, &f, n(1), n(2), n(3), n(4)).unwrap();
    assert_eq!(st.return_buffer().len(), 4);

    // five arguments plus the implicit self spill past the inline slots
    let t = table_with_meta(vec![("__call", echo.into())]);
    call5(&mut st, &t, n(1), n(2), n(3), n(4), n(5)).unwrap();
    let results = st.results();
    assert_eq!(results.len(), 6);
    assert_eq!(results[0], t);
    assert_eq!(&results[1..], &[n(1), n(2), n(3), n(4), n(5)]);
    assert_eq!(st.return_buffer().get(5).unwrap(), &n(5));
}

#[test]
fn test_failed_call_keeps_previous_results() {
    let mut st = new_state();
    st.return_buffer_mut().set_to("prev".into());

    let tail_fails: LuaValue = LuaFunction::from_fn(|lua_state, _args| {
        lua_state
            .return_buffer_mut()
            .set_to_tail_call(failing(), &[]);
        Ok(())
    })
    .into();
    assert!(call(&mut st, &tail_fails, &[]).is_err());
    assert_eq!(st.results(), vec![LuaValue::from("prev")]);
    assert_eq!(st.call_depth(), 0);
}

#[test]
fn test_call_errors() {
    let mut st = new_state();
    match call(&mut st, &LuaValue::Integer(1), &[]) {
        Err(Unwind::Error(e)) => assert_eq!(e.to_string(), "attempt to call a number value"),
        other => panic!("unexpected {:?}", other),
    }

    // a __call handler that is not a function does not make a value callable
    let callable_table = table_with_meta(vec![("__call", returning(LuaValue::Nil))]);
    let t = table_with_meta(vec![("__call", callable_table)]);
    match call(&mut st, &t, &[]) {
        Err(Unwind::Error(e)) => assert_eq!(e, LuaError::Call { type_name: "table".into() }),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_from_fn1_adapter() {
    let mut st = new_state();
    let f: LuaValue = LuaFunction::from_fn1(|lua_state, arg| {
        lua_state.return_buffer_mut().set_to(arg);
        Ok(())
    })
    .into();
    call(&mut st, &f, &[]).unwrap();
    assert_eq!(st.results(), vec![LuaValue::Nil]);
    call(&mut st, &f, &["a".into(), "b".into()]).unwrap();
    assert_eq!(st.results(), vec![LuaValue::from("a")]);
}

#[test]
fn test_call_depth_limit() {
    let vm = LuaVM::new(SafeOption {
        max_call_depth: 10,
        ..SafeOption::default()
    });
    let mut st = vm.new_state();
    let recurse: Rc<RefCell<Option<LuaValue>>> = Rc::new(RefCell::new(None));
    let me = recurse.clone();
    let f: LuaValue = LuaFunction::from_fn(move |lua_state, _args| {
        let target = me.borrow().clone().unwrap_or_default();
        call(lua_state, &target, &[])
    })
    .into();
    *recurse.borrow_mut() = Some(f.clone());

    match call(&mut st, &f, &[]) {
        Err(Unwind::Error(e)) => assert_eq!(e, LuaError::StackOverflow),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(st.call_depth(), 0);
}
