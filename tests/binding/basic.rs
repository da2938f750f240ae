//! Compiled handlers produce the same values as hand-written extraction.

use param_bind::request::{Headers, Method, Query, Request};
use serde_json::json;

use crate::support::{binder, binder_with_db, Abc, CreateUser, ListUsers, NewUser, Order};

fn list_request() -> Request {
    Request::get("/users?page=3&per_page=50&sort=name")
        .header("x-tenant", "acme")
        .header("Cookie", "sid=s-1; theme=dark")
}

/// Extraction written out by hand, for comparison.
fn manual_list_users(req: &Request) -> ListUsers {
    ListUsers {
        page: req.query().get("page").map_or(1, |p| p.parse().unwrap()),
        per_page: req.query().get("per_page").map(|p| p.parse().unwrap()),
        tenant: req.headers().value("X-Tenant").unwrap().to_string(),
        session: req.cookies().get("sid").map(str::to_string),
        raw: req
            .query()
            .as_multimap()
            .pairs()
            .iter()
            .cloned()
            .collect(),
    }
}

#[test]
fn struct_fields_match_manual_extraction() {
    let compiled = binder().prepare(|q: ListUsers| q).unwrap();

    for req in [
        list_request(),
        Request::get("/users").header("X-Tenant", "other"),
    ] {
        let bound = compiled.call(&req).unwrap();
        let manual = manual_list_users(&req);
        assert_eq!(bound.page, manual.page);
        assert_eq!(bound.per_page, manual.per_page);
        assert_eq!(bound.tenant, manual.tenant);
        assert_eq!(bound.session, manual.session);
        assert_eq!(bound.raw, manual.raw);
    }
}

#[test]
fn defaults_fill_absent_query_keys() {
    let compiled = binder().prepare(|q: ListUsers| q).unwrap();
    let bound = compiled
        .call(&Request::get("/users").header("X-Tenant", "acme"))
        .unwrap();
    assert_eq!(bound.page, 1);
    assert_eq!(bound.per_page, None);
    assert_eq!(bound.session, None);
    assert!(bound.raw.is_empty());
}

#[test]
fn each_call_gets_its_own_struct() {
    let compiled = binder().prepare(|abc: Abc| abc).unwrap();

    let first = compiled
        .call(&Request::get("/?a=1").header("x-b", "one"))
        .unwrap();
    let second = compiled
        .call(&Request::get("/?a=2").header("x-b", "two"))
        .unwrap();

    assert_eq!((first.a.as_str(), first.b.as_str()), ("1", "one"));
    assert_eq!((second.a.as_str(), second.b.as_str()), ("2", "two"));
    assert_eq!(first.c, "x");
    assert_eq!(second.c, "x");
}

#[test]
fn type_bound_parameters() {
    let compiled = binder()
        .prepare(|method: Method, query: Query, headers: Headers, req: Request| {
            format!(
                "{} {} {} {}",
                method,
                query.get("q").unwrap_or("-"),
                headers.value("x-id").unwrap_or("-"),
                req.path()
            )
        })
        .unwrap();

    let out = compiled
        .call(&Request::new("put", "/things?q=7").header("X-Id", "abc"))
        .unwrap();
    assert_eq!(out, "PUT 7 abc /things");
}

#[test]
fn mixed_parameters_in_declared_order() {
    let compiled = binder()
        .prepare(|abc: Abc, method: Method, missing: Option<String>| {
            (abc.a, method.to_string(), missing)
        })
        .unwrap();
    assert_eq!(compiled.arity(), 3);

    let args = compiled
        .arguments(&Request::post("/?a=z").header("x-b", "b"))
        .unwrap();
    assert_eq!(args.len(), 3);
    assert_eq!(args.get::<Abc>(0).map(|abc| abc.a.as_str()), Some("z"));
    assert_eq!(args.get::<Method>(1).map(Method::as_str), Some("POST"));
    assert_eq!(args.get::<Option<String>>(2), Some(&None));
}

#[test]
fn boxed_struct_parameters() {
    let compiled = binder().prepare(|abc: Box<Abc>| abc.a.clone()).unwrap();
    let out = compiled
        .call(&Request::get("/?a=boxed").header("x-b", "b"))
        .unwrap();
    assert_eq!(out, "boxed");
}

#[test]
fn body_params_nested_and_injected_fields() {
    let compiled = binder_with_db().prepare(|cmd: CreateUser| cmd).unwrap();

    let req = Request::post("/orgs/acme/users?order=desc")
        .param("org", "acme")
        .json(&json!({ "name": "Ann", "email": "ann@example.com" }))
        .unwrap();
    let cmd = compiled.call(&req).unwrap();

    assert_eq!(cmd.org, "acme");
    assert_eq!(
        cmd.user,
        NewUser {
            name: "Ann".into(),
            email: "ann@example.com".into(),
        }
    );
    assert_eq!(cmd.paging.page, 1);
    assert_eq!(cmd.paging.order, Order::Desc);
    assert_eq!(cmd.db.name, "primary");
    assert_eq!(cmd.method.as_str(), "POST");
}

#[test]
fn prepare_twice_gives_equivalent_functions() {
    let binder = binder();
    let first = binder.prepare(|abc: Abc| (abc.a, abc.b, abc.c)).unwrap();
    let second = binder.prepare(|abc: Abc| (abc.a, abc.b, abc.c)).unwrap();

    let req = Request::get("/?a=same").header("x-b", "b");
    assert_eq!(first.call(&req).unwrap(), second.call(&req).unwrap());

    let cloned = first.clone();
    assert_eq!(cloned.call(&req).unwrap(), second.call(&req).unwrap());
}
