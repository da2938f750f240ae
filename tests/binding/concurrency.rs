use std::sync::Arc;
use std::thread;

use param_bind::request::Request;

use crate::support::{binder, Abc, Outer};

#[test]
fn concurrent_calls_do_not_share_state() {
    let compiled = Arc::new(binder().prepare(|abc: Abc, outer: Outer| (abc, outer)).unwrap());

    let handles: Vec<_> = (0..16)
        .map(|t| {
            let compiled = Arc::clone(&compiled);
            thread::spawn(move || {
                for i in 0..200u64 {
                    let id = t * 1_000 + i;
                    let req = Request::get(&format!("/?a=a{id}&id={id}&flag=true"))
                        .header("x-b", format!("b{id}"))
                        .header("x-depth", (id % 200).to_string());

                    let (abc, outer) = compiled.call(&req).unwrap();
                    assert_eq!(abc.a, format!("a{id}"));
                    assert_eq!(abc.b, format!("b{id}"));
                    assert_eq!(abc.c, "x");
                    assert_eq!(outer.id, id);
                    assert_eq!(outer.middle.inner.depth as u64, id % 200);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn failing_calls_do_not_affect_concurrent_successes() {
    let compiled = binder().prepare(|abc: Abc| abc.a).unwrap();

    thread::scope(|s| {
        for t in 0..8 {
            let compiled = compiled.clone();
            s.spawn(move || {
                for i in 0..100 {
                    if (t + i) % 2 == 0 {
                        let req = Request::get(&format!("/?a={t}-{i}")).header("x-b", "b");
                        assert_eq!(compiled.call(&req).unwrap(), format!("{t}-{i}"));
                    } else {
                        assert!(compiled.call(&Request::get("/")).is_err());
                    }
                }
            });
        }
    });
}

#[test]
fn prepare_from_many_threads() {
    let binder = binder();

    thread::scope(|s| {
        for t in 0..8 {
            let binder = &binder;
            s.spawn(move || {
                let compiled = binder.prepare(|abc: Abc| abc.a).unwrap();
                let req = Request::get(&format!("/?a={t}")).header("x-b", "b");
                assert_eq!(compiled.call(&req).unwrap(), t.to_string());
            });
        }
    });
}
