//! Probe and link phases of `prepare`.

use std::collections::HashMap;

use super::compiled::{Linked, StructAssembler};
use crate::error::BindError;
use crate::executor::BindExecutor;
use crate::field::{FieldDescriptor, FieldPath, FieldRole};
use crate::parser::FieldSetter;
use crate::resolve::{ParamSpec, Resolved, Resolver};

type SetterKey = (usize, FieldPath);

/// A fresh probing pass. Owns the field-setter map for one `prepare` call.
pub(super) struct ProbeSession<'a, C> {
    executor: &'a BindExecutor<C>,
    setters: HashMap<SetterKey, FieldSetter<C>>,
}

/// Parameters resolved and setters recorded, not yet linked.
pub(super) struct Probed<C> {
    resolved: Vec<Resolved<C>>,
    setters: HashMap<SetterKey, FieldSetter<C>>,
}

impl<'a, C: 'static> ProbeSession<'a, C> {
    pub(super) fn new(executor: &'a BindExecutor<C>) -> Self {
        Self {
            executor,
            setters: HashMap::new(),
        }
    }

    /// Resolve every parameter, recording one setter per bound field.
    pub(super) fn probe(
        mut self,
        resolver: &Resolver,
        params: &[ParamSpec],
    ) -> Result<Probed<C>, BindError> {
        let executor = self.executor;
        let setters = &mut self.setters;

        let resolved = resolver.resolve(
            params,
            &mut |ty| executor.injected_by_type(ty),
            &mut |visit| {
                let setter = executor.find_field_setter(visit.field)?;
                tracing::debug!(
                    param = visit.param,
                    field = visit.qualified,
                    path = %visit.path,
                    "field setter recorded"
                );
                setters.insert((visit.param, visit.path.clone()), setter);
                Ok(())
            },
        )?;

        Ok(Probed {
            resolved,
            setters: self.setters,
        })
    }
}

impl<C: 'static> Probed<C> {
    pub(super) fn recorded(&self) -> usize {
        self.setters.len()
    }

    /// Decide once how each parameter is produced at call time.
    pub(super) fn link(mut self) -> Result<Vec<Linked<C>>, BindError> {
        let resolved = std::mem::take(&mut self.resolved);
        let mut linked = Vec::with_capacity(resolved.len());

        for (index, value) in resolved.into_iter().enumerate() {
            linked.push(match value {
                Resolved::Constant(make) => Linked::Constant(make),
                Resolved::Bind(bind) => Linked::Bind(bind),
                Resolved::Struct { probe, fields } => {
                    let mut setters = Vec::new();
                    self.collect(index, &fields(), &FieldPath::root(), &mut setters)?;
                    Linked::Struct(StructAssembler::new(probe, setters))
                }
            });
        }

        Ok(linked)
    }

    fn collect(
        &mut self,
        index: usize,
        fields: &[FieldDescriptor],
        path: &FieldPath,
        out: &mut Vec<(FieldPath, FieldSetter<C>)>,
    ) -> Result<(), BindError> {
        for (ordinal, field) in fields.iter().enumerate() {
            let path = path.child(ordinal);
            match field.role() {
                FieldRole::Bound(_) => {
                    let setter = self.setters.remove(&(index, path.clone())).ok_or_else(|| {
                        BindError::UnresolvableField {
                            field: field.name().to_string(),
                            ty: field.ty().name(),
                        }
                    })?;
                    out.push((path, setter));
                }
                FieldRole::Nested(children) => self.collect(index, &children(), &path, out)?,
                FieldRole::Plain | FieldRole::Inject => {}
            }
        }
        Ok(())
    }
}
