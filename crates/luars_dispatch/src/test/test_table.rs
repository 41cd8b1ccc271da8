// Tests for the table container and value identity
use crate::lua_value::{LuaTable, LuaValue, TableRef, UserdataRef};

#[test]
fn test_border_follows_array_part() {
    let t = TableRef::new(LuaTable::new());
    for i in (1..=4).rev() {
        t.raw_set(&LuaValue::Integer(i), LuaValue::Integer(i)).unwrap();
    }
    assert_eq!(t.raw_len(), 4);

    t.raw_set(&LuaValue::Integer(4), LuaValue::Nil).unwrap();
    t.raw_set(&LuaValue::Integer(3), LuaValue::Nil).unwrap();
    assert_eq!(t.raw_len(), 2);
    assert!(t.raw_get(&LuaValue::Integer(3)).is_nil());

    t.borrow_mut().push("x".into());
    assert_eq!(t.raw_get(&LuaValue::Float(3.0)), LuaValue::from("x"));
}

#[test]
fn test_keys_by_value_and_identity() {
    let t = TableRef::new(LuaTable::new());
    let k1 = LuaValue::new_table();
    let k2 = LuaValue::new_table();
    t.raw_set(&k1, LuaValue::Integer(1)).unwrap();
    t.raw_set(&k2, LuaValue::Integer(2)).unwrap();
    t.raw_set(&LuaValue::Boolean(true), LuaValue::Integer(3)).unwrap();
    t.raw_set(&LuaValue::from("s"), LuaValue::Integer(4)).unwrap();

    assert_eq!(t.raw_get(&k1), LuaValue::Integer(1));
    assert_eq!(t.raw_get(&k2), LuaValue::Integer(2));
    assert_eq!(t.raw_get(&LuaValue::Boolean(true)), LuaValue::Integer(3));
    assert_eq!(t.raw_get(&LuaValue::from("s")), LuaValue::Integer(4));
    assert!(t.raw_get(&LuaValue::Boolean(false)).is_nil());
}

#[test]
fn test_negative_and_zero_keys() {
    let t = TableRef::new(LuaTable::new());
    t.raw_set(&LuaValue::Integer(0), "zero".into()).unwrap();
    t.raw_set(&LuaValue::Integer(-1), "neg".into()).unwrap();
    assert_eq!(t.raw_len(), 0);
    assert_eq!(t.raw_get(&LuaValue::Float(-1.0)), LuaValue::from("neg"));
}

#[test]
fn test_reference_identity() {
    let a = LuaValue::new_table();
    assert_eq!(a, a.clone());
    assert_ne!(a, LuaValue::new_table());

    let u = UserdataRef::new(String::from("payload"));
    assert_eq!(u.downcast_ref::<String>().as_deref().map(String::as_str), Some("payload"));
    assert!(u.downcast_ref::<u32>().is_none());
    if let Some(mut s) = u.downcast_mut::<String>() {
        s.push('!');
    }
    assert!(u.is::<String>());
    let v: LuaValue = u.clone().into();
    assert_eq!(v, LuaValue::Userdata(u.clone()));
    assert_eq!(v.type_name(), "userdata");
    assert_eq!(u.downcast_ref::<String>().map(|s| s.len()), Some(8));
}
