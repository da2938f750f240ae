use param_bind::request::Request;
use param_bind::{Bind, FieldPath, FieldRole};

use crate::support::{binder, Outer};

#[test]
fn nested_fields_are_bound_at_every_depth() {
    let compiled = binder().prepare(|outer: Outer| outer).unwrap();

    let outer = compiled
        .call(&Request::get("/?id=17&flag=on").header("X-Depth", "3"))
        .unwrap();

    assert_eq!(outer.id, 17);
    assert_eq!(outer.middle.note, "");
    assert_eq!(outer.middle.inner.depth, 3);
    assert!(outer.middle.inner.flag);
}

#[test]
fn derived_descriptors_follow_declaration_order() {
    let names: Vec<&str> = Outer::fields().iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["id", "middle"]);

    let fields = Outer::fields();
    assert!(matches!(fields[0].role(), FieldRole::Bound("query,name=id")));
    match fields[1].role() {
        FieldRole::Nested(children) => {
            let children = children();
            assert!(matches!(children[0].role(), FieldRole::Plain));
            assert!(matches!(children[1].role(), FieldRole::Nested(_)));
        }
        other => panic!("expected nested, got {:?}", other),
    }
}

#[test]
fn field_paths_address_nested_slots() {
    let mut outer = Outer::default();
    let path = FieldPath::root().child(1).child(1).child(0);

    let slot = Bind::slot_mut(&mut outer, path.as_slice()).unwrap();
    *slot.downcast_mut::<u8>().unwrap() = 9;
    assert_eq!(outer.middle.inner.depth, 9);

    assert!(Bind::slot_mut(&mut outer, &[1, 5]).is_none());
    assert!(Bind::slot_mut(&mut outer, &[0, 0]).is_none());
}

#[test]
fn unbound_nested_values_come_from_the_probe() {
    let compiled = binder().prepare(|outer: Outer| outer.middle.note).unwrap();
    let note = compiled
        .call(&Request::get("/?id=1&flag=false").header("x-depth", "0"))
        .unwrap();
    assert_eq!(note, "");
}
