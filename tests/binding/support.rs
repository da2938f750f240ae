//! Shared fixtures: bindable structs over the standard `Request` context.

use std::collections::HashMap;
use std::sync::Arc;

use param_bind::request::Request;
use param_bind::{Bind, BindExecutor, DelayBinder, Resolver};
use serde::Deserialize;

/// Executor with the standard request parsers.
pub fn executor() -> Arc<BindExecutor<Request>> {
    let _ = tracing_subscriber::fmt::try_init();
    Arc::new(
        BindExecutor::builder()
            .with_standard_parsers()
            .build()
            .unwrap(),
    )
}

pub fn binder() -> DelayBinder<Request> {
    DelayBinder::new(executor())
}

/// A shared dependency handed out by the resolver.
#[derive(Debug, Default)]
pub struct Db {
    pub name: &'static str,
}

pub fn binder_with_db() -> DelayBinder<Request> {
    binder().with_resolver(Resolver::new().provide(Arc::new(Db { name: "primary" })))
}

/// `A` from the query, `B` from a header, `C` left at its default.
#[derive(Debug, Clone, Bind)]
pub struct Abc {
    #[bind(query, name = "a")]
    pub a: String,
    #[bind(header, name = "x-b")]
    pub b: String,
    pub c: String,
}

impl Default for Abc {
    fn default() -> Self {
        Self {
            a: String::new(),
            b: String::new(),
            c: "x".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Bind)]
pub struct ListUsers {
    #[bind(query, default = "1")]
    pub page: u32,
    #[bind(query, name = "per_page")]
    pub per_page: Option<u32>,
    #[bind(header, name = "X-Tenant")]
    pub tenant: String,
    #[bind(cookie, name = "sid")]
    pub session: Option<String>,
    #[bind(query, all)]
    pub raw: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, Bind)]
pub struct Paging {
    #[bind(query, default = "1")]
    pub page: u32,
    #[bind(query, default = "asc")]
    pub order: Order,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Bind)]
pub struct CreateUser {
    #[bind(param)]
    pub org: String,
    #[bind(body)]
    pub user: NewUser,
    #[bind(nested)]
    pub paging: Paging,
    #[bind(inject)]
    pub db: Arc<Db>,
    #[bind]
    pub method: param_bind::request::Method,
}

/// Three levels deep, to exercise field paths past the first nesting.
#[derive(Debug, Clone, Default, Bind)]
pub struct Outer {
    #[bind(query, name = "id")]
    pub id: u64,
    #[bind(nested)]
    pub middle: Middle,
}

#[derive(Debug, Clone, Default, Bind)]
pub struct Middle {
    pub note: String,
    #[bind(nested)]
    pub inner: Inner,
}

#[derive(Debug, Clone, Default, Bind)]
pub struct Inner {
    #[bind(header, name = "x-depth")]
    pub depth: u8,
    #[bind(query, name = "flag")]
    pub flag: bool,
}
