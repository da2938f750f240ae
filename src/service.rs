//! Service: a registry of named, pre-compiled handlers.
//!
//! Handlers are prepared when they are registered, so a handler whose
//! parameters cannot be bound is rejected at startup instead of on its first
//! request.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use param_bind::{BindExecutor, DelayBinder, Service};
//! use param_bind::request::Request;
//!
//! let executor = BindExecutor::builder().with_standard_parsers().build()?;
//! let service = Service::new(DelayBinder::new(Arc::new(executor)))
//!     .handler("users.list", |q: ListUsers| json!({ "page": q.page }))?;
//!
//! let out = service.dispatch("users.list", &Request::get("/?page=2"))?;
//! ```

use std::collections::HashMap;

use crate::compiler::{CompiledFunc, DelayBinder};
use crate::error::BindError;
use crate::resolve::Handler;

/// Named handlers over a context `C`, all producing `R`.
pub struct Service<C, R> {
    binder: DelayBinder<C>,
    handlers: HashMap<String, CompiledFunc<C, R>>,
}

impl<C: 'static, R: 'static> Service<C, R> {
    pub fn new(binder: DelayBinder<C>) -> Self {
        Self {
            binder,
            handlers: HashMap::new(),
        }
    }

    /// Prepare `handler` and register it under `name`.
    ///
    /// Registering a name again replaces the earlier handler.
    pub fn handler<H, Args>(mut self, name: &str, handler: H) -> Result<Self, BindError>
    where
        H: Handler<Args, Output = R>,
    {
        let compiled = self.binder.prepare(handler).map_err(|e| {
            tracing::warn!(handler = name, error = %e, "handler rejected");
            e
        })?;
        tracing::debug!(handler = name, arity = compiled.arity(), "handler registered");
        self.handlers.insert(name.to_string(), compiled);
        Ok(self)
    }

    /// Bind the arguments of handler `name` from `ctx` and call it.
    pub fn dispatch(&self, name: &str, ctx: &C) -> Result<R, BindError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| BindError::UnknownHandler(name.to_string()))?;
        handler.call(ctx)
    }

    /// The compiled form of handler `name`.
    pub fn compiled(&self, name: &str) -> Option<&CompiledFunc<C, R>> {
        self.handlers.get(name)
    }

    /// List registered handler names.
    pub fn handlers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn binder(&self) -> &DelayBinder<C> {
        &self.binder
    }
}
