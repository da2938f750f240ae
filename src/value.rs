//! Type-erased values passed between parsers, probes and handlers.

use std::any::{Any, TypeId};
use std::fmt;

use crate::error::BindError;

/// A value produced by a parser, not yet downcast to its concrete type.
pub type BoxedValue = Box<dyn Any + Send>;

/// Runtime identity of a type: its `TypeId` plus a readable name for errors.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    /// Identity of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Downcast a boxed value into `T`.
pub fn unbox<T: 'static>(value: BoxedValue) -> Result<T, BindError> {
    value
        .downcast::<T>()
        .map(|b| *b)
        .map_err(|_| BindError::TypeMismatch {
            expected: std::any::type_name::<T>(),
        })
}

/// The argument list assembled for one handler invocation, in parameter order.
pub struct Arguments {
    values: Vec<BoxedValue>,
}

impl Arguments {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, value: BoxedValue) {
        self.values.push(value);
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow argument `index` as `T`. `None` if out of range or of another type.
    pub fn get<T: 'static>(&self, index: usize) -> Option<&T> {
        self.values.get(index)?.downcast_ref::<T>()
    }

    /// Consume the list into its boxed values.
    pub fn into_values(self) -> Vec<BoxedValue> {
        self.values
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("len", &self.values.len())
            .finish()
    }
}

impl IntoIterator for Arguments {
    type Item = BoxedValue;
    type IntoIter = std::vec::IntoIter<BoxedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
