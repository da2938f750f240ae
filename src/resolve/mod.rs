//! Function-parameter resolution.
//!
//! A handler declares its parameters through [`Handler::params`]; the
//! [`Resolver`] turns each one into a [`Resolved`] value: a constant, a
//! context extractor, or a struct probe whose bound fields are reported
//! through a hook.

mod handler;
mod param;
mod resolver;

pub use handler::Handler;
pub use param::{Param, ParamKind, ParamSpec};
pub use resolver::{ConstantFn, FieldVisit, Resolved, Resolver};
