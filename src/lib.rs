//! param_bind: bind handler parameters from a request context through
//! extractors compiled once per handler.
//!
//! ```ignore
//! use std::sync::Arc;
//! use param_bind::{Bind, BindExecutor, DelayBinder};
//! use param_bind::request::Request;
//!
//! #[derive(Clone, Default, Bind)]
//! struct ListUsers {
//!     #[bind(query, name = "page", default = "1")]
//!     page: u32,
//!     #[bind(header, name = "x-tenant")]
//!     tenant: String,
//! }
//!
//! let executor = BindExecutor::builder().with_standard_parsers().build()?;
//! let binder = DelayBinder::new(Arc::new(executor));
//! let list = binder.prepare(|q: ListUsers| format!("{}@{}", q.page, q.tenant))?;
//!
//! let req = Request::get("/users?page=2").header("X-Tenant", "acme");
//! assert_eq!(list.call(&req)?, "2@acme");
//! ```

extern crate self as param_bind;

mod compiler;
mod error;
mod executor;
mod field;
mod parser;
mod resolve;
mod service;
mod value;

pub mod decode;
pub mod request;
pub mod tag;

#[cfg(feature = "http")]
pub mod http;

pub use compiler::{CompiledFunc, DelayBinder};
pub use decode::{Decode, DecodeError};
pub use error::{BindError, ErrorKind};
pub use executor::{BindExecutor, ExecutorBuilder};
pub use field::{probe_of, AssignFn, Bind, FieldDescriptor, FieldPath, FieldRole, Probe};
pub use parser::{
    type_parser, BindFn, FieldSetter, FnTypeParser, NameParser, NameParsers, TypeParser,
    TypeParsers,
};
pub use resolve::{
    ConstantFn, FieldVisit, Handler, Param, ParamKind, ParamSpec, Resolved, Resolver,
};
pub use service::Service;
pub use tag::{Tag, TagError};
pub use value::{unbox, Arguments, BoxedValue, TypeInfo};

// #[derive(Bind)]
pub use param_bind_macros::Bind;
