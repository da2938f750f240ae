//! Delay-bind compiler.
//!
//! [`DelayBinder::prepare`] runs once per handler at startup:
//!
//! 1. **probe**: resolve every parameter against a fresh session, asking the
//!    executor for a setter for each bound struct field;
//! 2. **link**: turn each resolved parameter into a call-time producer,
//!    pairing every struct field path with its recorded setter;
//! 3. **compile**: wrap the producers and the handler into a
//!    [`CompiledFunc`].
//!
//! No type inspection happens when a compiled function is called.

mod compiled;
mod session;

use std::sync::Arc;

pub use compiled::CompiledFunc;

use crate::error::BindError;
use crate::executor::BindExecutor;
use crate::resolve::{Handler, Resolver};
use session::ProbeSession;

/// Prepares handlers against one executor and resolver.
pub struct DelayBinder<C> {
    executor: Arc<BindExecutor<C>>,
    resolver: Resolver,
}

impl<C: 'static> DelayBinder<C> {
    pub fn new(executor: Arc<BindExecutor<C>>) -> Self {
        Self {
            executor,
            resolver: Resolver::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn executor(&self) -> &Arc<BindExecutor<C>> {
        &self.executor
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Compile `handler` into a function of the context.
    ///
    /// Fails if any parameter or bound field cannot be resolved; nothing is
    /// kept from a failed attempt.
    pub fn prepare<H, Args>(&self, handler: H) -> Result<CompiledFunc<C, H::Output>, BindError>
    where
        H: Handler<Args>,
        H::Output: 'static,
    {
        let name = std::any::type_name::<H>();
        let params = H::params();
        tracing::debug!(handler = name, params = params.len(), "preparing handler");

        let probed = ProbeSession::new(&self.executor).probe(&self.resolver, &params)?;
        let recorded = probed.recorded();
        let linked = probed.link()?;

        tracing::debug!(handler = name, setters = recorded, "handler compiled");
        Ok(CompiledFunc::new(
            name,
            linked,
            Box::new(move |args| handler.invoke(args)),
        ))
    }
}

impl<C> Clone for DelayBinder<C> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            resolver: self.resolver.clone(),
        }
    }
}
