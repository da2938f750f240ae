//! A transport-neutral request context and the parsers that bind from it.
//!
//! ```
//! use param_bind::request::Request;
//!
//! let req = Request::get("/users?page=2")
//!     .header("X-Tenant", "acme")
//!     .header("Cookie", "sid=abc");
//!
//! assert_eq!(req.query().get("page"), Some("2"));
//! assert_eq!(req.headers().value("x-tenant"), Some("acme"));
//! assert_eq!(req.cookies().get("sid"), Some("abc"));
//! ```

mod parsers;
mod sources;

use serde::Serialize;

pub use parsers::{BodyParser, MultimapParser};
pub use sources::{Body, Cookies, Headers, Method, Multimap, PathParams, Query};

/// Everything a handler can bind from.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: Method,
    path: String,
    query: Query,
    headers: Headers,
    cookies: Cookies,
    params: PathParams,
    body: Body,
}

impl Request {
    /// Request for `target`, which may carry a query string.
    pub fn new(method: &str, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, raw)) => (path, Query::parse(raw)),
            None => (target, Query::new()),
        };
        Self {
            method: Method::new(method),
            path: path.to_string(),
            query,
            ..Self::default()
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new("GET", target)
    }

    pub fn post(target: &str) -> Self {
        Self::new("POST", target)
    }

    /// Add a header. A `Cookie` header also fills the cookie jar.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if name.eq_ignore_ascii_case("cookie") {
            self.cookies.extend_from_header(&value);
        }
        self.headers.append(name, value);
        self
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.append(key, value);
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.append(name, value);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.append(name, value);
        self
    }

    pub fn params(mut self, params: PathParams) -> Self {
        self.params = params;
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Body::new(body);
        self
    }

    /// Serialize `value` as the JSON body and set `content-type`.
    pub fn json<T: Serialize>(self, value: &T) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        Ok(self.header("content-type", "application/json").body(bytes))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn cookies(&self) -> &Cookies {
        &self.cookies
    }

    pub fn path_params(&self) -> &PathParams {
        &self.params
    }

    pub fn body_bytes(&self) -> &Body {
        &self.body
    }
}
