use std::sync::Arc;

use param_bind::request::{BodyParser, MultimapParser, Request};
use param_bind::{type_parser, Bind, BindError, BindExecutor, DelayBinder, ErrorKind};

use crate::support::{binder, binder_with_db, Abc, CreateUser};

#[derive(Debug, Clone, Default, Bind)]
struct FromSession {
    #[bind(session, name = "user")]
    user: String,
}

#[derive(Debug, Clone, Default)]
struct Tenant(String);

#[derive(Debug, Clone, Default, Bind)]
struct NeedsTenant {
    #[bind]
    tenant: Tenant,
}

#[test]
fn duplicate_parsers_fail_init() {
    let err = BindExecutor::<Request>::builder()
        .with_standard_parsers()
        .name_parser(BodyParser)
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, BindError::DuplicateNameParser(ref m) if m == "body"));
    assert_eq!(err.kind(), ErrorKind::Registration);

    let err = BindExecutor::<Request>::builder()
        .with_standard_parsers()
        .type_parser(type_parser(|req: &Request| Ok(req.query().clone())))
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, BindError::DuplicateTypeParser(_)));

    let err = BindExecutor::<Request>::builder()
        .name_parser(MultimapParser::query())
        .name_parser(MultimapParser::query())
        .build()
        .err()
        .unwrap();
    assert!(err.is_fatal());
}

#[test]
fn unknown_marker_fails_prepare_naming_the_field() {
    let err = binder().prepare(|s: FromSession| s.user).err().unwrap();
    assert!(matches!(
        err,
        BindError::NoParserForField { ref field, ref marker } if field == "user" && marker == "session"
    ));
    assert!(err.to_string().contains("user"));
    assert_eq!(err.kind(), ErrorKind::Unresolvable);
}

#[test]
fn untyped_field_without_type_parser_fails_prepare() {
    let err = binder().prepare(|t: NeedsTenant| t.tenant.0).err().unwrap();
    assert!(matches!(err, BindError::UnresolvableField { ref field, .. } if field == "tenant"));
}

#[test]
fn registering_a_type_parser_makes_it_resolvable() {
    let executor = BindExecutor::builder()
        .with_standard_parsers()
        .type_parser(type_parser(|req: &Request| {
            Ok(Tenant(req.headers().value("x-tenant").unwrap_or("none").to_string()))
        }))
        .build()
        .unwrap();
    let compiled = DelayBinder::new(Arc::new(executor))
        .prepare(|t: NeedsTenant| t.tenant.0)
        .unwrap();
    assert_eq!(compiled.call(&Request::get("/").header("X-Tenant", "t1")).unwrap(), "t1");
}

#[test]
fn missing_singleton_for_injected_field_fails_prepare() {
    let err = binder().prepare(|cmd: CreateUser| cmd.org).err().unwrap();
    assert!(matches!(err, BindError::UnresolvableField { ref field, .. } if field == "db"));
}

#[test]
fn unresolvable_parameter_fails_prepare() {
    let err = binder().prepare(|_: Abc, n: u32| n).err().unwrap();
    assert!(matches!(err, BindError::UnresolvableParam { index: 1, ty: "u32" }));
}

#[test]
fn extraction_error_discards_the_whole_call() {
    let compiled = binder()
        .prepare(|abc: Abc, id: param_bind::request::Method| format!("{}{}{}", abc.a, abc.b, id))
        .unwrap();

    // `a` present, `x-b` header missing
    let err = compiled.arguments(&Request::get("/?a=1")).unwrap_err();
    assert!(matches!(err, BindError::Missing { source: "header", ref key } if key == "x-b"));
    assert_eq!(err.kind(), ErrorKind::Extraction);
    assert_eq!(err.status_code(), 400);

    // the failure is scoped to that call
    let ok = compiled
        .call(&Request::get("/?a=1").header("x-b", "2"))
        .unwrap();
    assert_eq!(ok, "12GET");
}

#[test]
fn malformed_values_are_decode_errors() {
    #[derive(Debug, Clone, Default, Bind)]
    struct Page {
        #[bind(query)]
        page: u32,
    }

    let compiled = binder().prepare(|p: Page| p.page).unwrap();
    let err = compiled.call(&Request::get("/?page=two")).unwrap_err();
    assert!(matches!(err, BindError::Decode { source: "query", ref key, .. } if key == "page"));
    assert_eq!(compiled.call(&Request::get("/?page=2")).unwrap(), 2);
}

#[test]
fn absent_body_and_structured_values_are_missing() {
    let compiled = binder_with_db().prepare(|cmd: CreateUser| cmd.user.name).unwrap();
    let err = compiled
        .call(&Request::post("/").param("org", "o1"))
        .unwrap_err();
    assert!(matches!(err, BindError::Missing { source: "body", ref key } if key == "user"));
    assert_eq!(err.status_code(), 400);

    #[derive(Debug, Clone, Default, Bind)]
    struct Filtered {
        #[bind(query, name = "filter")]
        filter: serde_json::Value,
    }

    let compiled = binder().prepare(|f: Filtered| f.filter).unwrap();
    let err = compiled.call(&Request::get("/")).unwrap_err();
    assert!(matches!(err, BindError::Missing { source: "query", ref key } if key == "filter"));
    assert_eq!(
        compiled.call(&Request::get("/?filter=on")).unwrap(),
        serde_json::json!("on")
    );
}
