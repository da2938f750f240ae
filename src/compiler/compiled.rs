use std::fmt;
use std::sync::Arc;

use crate::error::BindError;
use crate::field::{FieldPath, Probe};
use crate::parser::{BindFn, FieldSetter};
use crate::resolve::ConstantFn;
use crate::value::{Arguments, BoxedValue};

/// Call-time producer of one argument, fixed at link time.
pub(crate) enum Linked<C> {
    Constant(ConstantFn),
    Bind(BindFn<C>),
    Struct(StructAssembler<C>),
}

impl<C> Linked<C> {
    fn produce(&self, ctx: &C) -> Result<BoxedValue, BindError> {
        match self {
            Linked::Constant(make) => make(),
            Linked::Bind(bind) => bind(ctx),
            Linked::Struct(assembler) => assembler.assemble(ctx),
        }
    }
}

/// Builds a fresh struct value per call: clone the probe, then run every
/// recorded setter into the clone.
pub(crate) struct StructAssembler<C> {
    probe: Box<dyn Probe>,
    setters: Vec<(FieldPath, FieldSetter<C>)>,
}

impl<C> StructAssembler<C> {
    pub(crate) fn new(probe: Box<dyn Probe>, setters: Vec<(FieldPath, FieldSetter<C>)>) -> Self {
        Self { probe, setters }
    }

    fn assemble(&self, ctx: &C) -> Result<BoxedValue, BindError> {
        let mut value = self.probe.clone_probe();
        for (path, setter) in &self.setters {
            let expected = value.type_name();
            let slot = value
                .slot_mut(path.as_slice())
                .ok_or(BindError::TypeMismatch { expected })?;
            setter(ctx, slot)?;
        }
        Ok(value.into_value())
    }
}

type InvokeFn<R> = Box<dyn Fn(Arguments) -> Result<R, BindError> + Send + Sync>;

struct Inner<C, R> {
    handler: &'static str,
    linked: Vec<Linked<C>>,
    invoke: InvokeFn<R>,
}

/// A handler with every parameter's extraction decided ahead of time.
///
/// Cloning is cheap and every clone may be called from any number of threads
/// at once; each call builds its own argument values.
pub struct CompiledFunc<C, R> {
    inner: Arc<Inner<C, R>>,
}

impl<C, R> CompiledFunc<C, R> {
    pub(crate) fn new(handler: &'static str, linked: Vec<Linked<C>>, invoke: InvokeFn<R>) -> Self {
        Self {
            inner: Arc::new(Inner {
                handler,
                linked,
                invoke,
            }),
        }
    }

    /// Type name of the compiled handler.
    pub fn handler(&self) -> &'static str {
        self.inner.handler
    }

    pub fn arity(&self) -> usize {
        self.inner.linked.len()
    }

    /// Produce every argument for `ctx`, in parameter order.
    ///
    /// Stops at the first failing parameter; values produced before it are
    /// dropped.
    pub fn arguments(&self, ctx: &C) -> Result<Arguments, BindError> {
        let mut args = Arguments::with_capacity(self.inner.linked.len());
        for (index, linked) in self.inner.linked.iter().enumerate() {
            match linked.produce(ctx) {
                Ok(value) => args.push(value),
                Err(err) => {
                    tracing::trace!(
                        handler = self.inner.handler,
                        param = index,
                        error = %err,
                        "argument extraction failed"
                    );
                    return Err(err);
                }
            }
        }
        Ok(args)
    }

    /// Extract the arguments for `ctx` and call the handler with them.
    pub fn call(&self, ctx: &C) -> Result<R, BindError> {
        let args = self.arguments(ctx)?;
        (self.inner.invoke)(args)
    }
}

impl<C, R> Clone for CompiledFunc<C, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, R> fmt::Debug for CompiledFunc<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFunc")
            .field("handler", &self.inner.handler)
            .field("arity", &self.arity())
            .finish()
    }
}
