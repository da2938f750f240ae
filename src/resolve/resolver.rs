use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::param::{ParamKind, ParamSpec};
use crate::error::BindError;
use crate::field::{FieldDescriptor, FieldPath, FieldRole, Probe};
use crate::parser::BindFn;
use crate::value::{BoxedValue, TypeInfo};

/// Produces a value that ignores the context.
pub type ConstantFn = Arc<dyn Fn() -> Result<BoxedValue, BindError> + Send + Sync>;

#[derive(Clone)]
struct Singleton {
    type_name: &'static str,
    make: Arc<dyn Fn() -> BoxedValue + Send + Sync>,
}

/// Resolves handler parameters into values or extraction plans.
///
/// Singletons registered with [`Resolver::provide`] win over everything
/// else: a parameter or `#[bind(inject)]` field of a provided type always
/// receives a clone of the provided value.
#[derive(Clone, Default)]
pub struct Resolver {
    singletons: HashMap<TypeId, Singleton>,
}

/// One parameter after resolution.
pub enum Resolved<C> {
    /// Same value for every call.
    Constant(ConstantFn),
    /// Extracted from the context on every call.
    Bind(BindFn<C>),
    /// A bindable struct. `probe` already carries injected singletons; its
    /// bound fields were reported to the field hook.
    Struct {
        probe: Box<dyn Probe>,
        fields: fn() -> Vec<FieldDescriptor>,
    },
}

impl<C> fmt::Debug for Resolved<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Constant(_) => f.write_str("Constant"),
            Resolved::Bind(_) => f.write_str("Bind"),
            Resolved::Struct { probe, .. } => {
                f.debug_tuple("Struct").field(&probe.type_name()).finish()
            }
        }
    }
}

/// A bound field met while probing a struct parameter.
#[derive(Debug)]
pub struct FieldVisit<'a> {
    pub param: usize,
    pub path: &'a FieldPath,
    pub field: &'a FieldDescriptor,
    /// Dotted field names from the parameter root, e.g. `filter.code`.
    pub qualified: &'a str,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` as the singleton for its type.
    pub fn provide<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.singletons.insert(
            TypeId::of::<T>(),
            Singleton {
                type_name: std::any::type_name::<T>(),
                make: Arc::new(move || Box::new(value.clone()) as BoxedValue),
            },
        );
        self
    }

    pub fn provides(&self, ty: &TypeInfo) -> bool {
        self.singletons.contains_key(&ty.id())
    }

    /// Names of the provided types.
    pub fn provided(&self) -> Vec<&'static str> {
        self.singletons.values().map(|s| s.type_name).collect()
    }

    /// Resolve `params` in order.
    ///
    /// `types` is asked for an extractor of each opaque parameter type;
    /// `on_field` is called once per bound field of every struct parameter,
    /// nested ones included. The first error aborts resolution.
    pub fn resolve<C>(
        &self,
        params: &[ParamSpec],
        types: &mut dyn FnMut(&TypeInfo) -> Option<BindFn<C>>,
        on_field: &mut dyn FnMut(&FieldVisit<'_>) -> Result<(), BindError>,
    ) -> Result<Vec<Resolved<C>>, BindError> {
        let mut resolved = Vec::with_capacity(params.len());

        for (index, param) in params.iter().enumerate() {
            let ty = param.ty();

            if let Some(singleton) = self.singletons.get(&ty.id()) {
                tracing::debug!(param = index, ty = ty.name(), "parameter provided as singleton");
                let make = Arc::clone(&singleton.make);
                resolved.push(Resolved::Constant(Arc::new(move || Ok(make()))));
                continue;
            }

            match param.kind() {
                ParamKind::Struct { fields, probe } => {
                    let mut probe = probe();
                    self.visit(
                        index,
                        &mut *probe,
                        &fields(),
                        &FieldPath::root(),
                        "",
                        on_field,
                    )?;
                    tracing::debug!(param = index, ty = ty.name(), "parameter bound as struct");
                    resolved.push(Resolved::Struct { probe, fields });
                }
                ParamKind::Opaque { fallback } => {
                    if let Some(bind) = types(&ty) {
                        tracing::debug!(param = index, ty = ty.name(), "parameter bound by type");
                        resolved.push(Resolved::Bind(bind));
                    } else if fallback().is_some() {
                        tracing::debug!(param = index, ty = ty.name(), "parameter uses fallback");
                        let expected = ty.name();
                        resolved.push(Resolved::Constant(Arc::new(move || {
                            fallback().ok_or(BindError::TypeMismatch { expected })
                        })));
                    } else {
                        return Err(BindError::UnresolvableParam {
                            index,
                            ty: ty.name(),
                        });
                    }
                }
            }
        }

        Ok(resolved)
    }

    fn visit(
        &self,
        param: usize,
        probe: &mut dyn Probe,
        fields: &[FieldDescriptor],
        path: &FieldPath,
        prefix: &str,
        on_field: &mut dyn FnMut(&FieldVisit<'_>) -> Result<(), BindError>,
    ) -> Result<(), BindError> {
        for (ordinal, field) in fields.iter().enumerate() {
            let path = path.child(ordinal);
            let qualified = if prefix.is_empty() {
                field.name().to_string()
            } else {
                format!("{}.{}", prefix, field.name())
            };

            match field.role() {
                FieldRole::Plain => {}
                FieldRole::Bound(_) => on_field(&FieldVisit {
                    param,
                    path: &path,
                    field,
                    qualified: &qualified,
                })?,
                FieldRole::Inject => {
                    let ty = field.ty();
                    let singleton = self.singletons.get(&ty.id()).ok_or_else(|| {
                        BindError::UnresolvableField {
                            field: qualified.clone(),
                            ty: ty.name(),
                        }
                    })?;
                    let slot = probe.slot_mut(path.as_slice()).ok_or(BindError::TypeMismatch {
                        expected: ty.name(),
                    })?;
                    field.assign(slot, (singleton.make)())?;
                }
                FieldRole::Nested(children) => {
                    self.visit(param, probe, &children(), &path, &qualified, on_field)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("provided", &self.provided())
            .finish()
    }
}
