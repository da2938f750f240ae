use param_bind::request::Request;
use param_bind::{BindError, Service};
use serde_json::{json, Value};

use crate::support::{binder, binder_with_db, Abc, CreateUser, ListUsers};

fn service() -> Service<Request, Value> {
    Service::new(binder_with_db())
        .handler("users.list", |q: ListUsers| {
            json!({ "page": q.page, "tenant": q.tenant })
        })
        .unwrap()
        .handler("users.create", |cmd: CreateUser| {
            json!({ "org": cmd.org, "name": cmd.user.name, "db": cmd.db.name })
        })
        .unwrap()
        .handler("abc", |abc: Abc| json!([abc.a, abc.b, abc.c]))
        .unwrap()
}

#[test]
fn dispatch_binds_and_calls() {
    let service = service();

    let out = service
        .dispatch(
            "users.list",
            &Request::get("/users?page=4").header("X-Tenant", "acme"),
        )
        .unwrap();
    assert_eq!(out, json!({ "page": 4, "tenant": "acme" }));

    let req = Request::post("/")
        .param("org", "o1")
        .json(&json!({ "name": "Bo", "email": "bo@example.com" }))
        .unwrap();
    let out = service.dispatch("users.create", &req).unwrap();
    assert_eq!(out, json!({ "org": "o1", "name": "Bo", "db": "primary" }));
}

#[test]
fn handler_names_are_listed() {
    assert_eq!(service().handlers(), vec!["abc", "users.create", "users.list"]);
    assert!(service().compiled("abc").is_some());
}

#[test]
fn unknown_handler() {
    let err = service().dispatch("nope", &Request::get("/")).unwrap_err();
    assert!(matches!(err, BindError::UnknownHandler(_)));
}

#[test]
fn registration_fails_for_unbindable_handlers() {
    // no singleton for the injected `db` field
    let result = Service::<Request, Value>::new(binder())
        .handler("users.create", |cmd: CreateUser| json!(cmd.org));
    assert!(matches!(result, Err(BindError::UnresolvableField { .. })));
}
