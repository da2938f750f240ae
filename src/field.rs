//! Struct introspection for bindable structs.
//!
//! `#[derive(Bind)]` implements [`Bind`] for a struct: an ordered list of
//! [`FieldDescriptor`]s plus a slot accessor addressed by [`FieldPath`]. The
//! descriptor's position in that list is the field's ordinal, so the same
//! path can be recomputed from the descriptors at any time without relying
//! on where a particular instance lives in memory.
//!
//! ```ignore
//! #[derive(Clone, Default, Bind)]
//! struct ListUsers {
//!     #[bind(query, name = "page")]
//!     page: Option<u32>,
//!     #[bind(header, name = "x-tenant")]
//!     tenant: String,
//!     #[bind(nested)]
//!     filter: Filter,
//!     #[bind(inject)]
//!     db: Arc<Db>,
//!     limit: usize,
//! }
//! ```

use std::any::Any;
use std::fmt;

use crate::decode::Decode;
use crate::error::BindError;
use crate::value::{BoxedValue, TypeInfo};

/// Writes a boxed value into a slot of the same type.
pub type AssignFn = fn(&mut dyn Any, BoxedValue) -> Result<(), BindError>;

/// How the resolver treats a field.
#[derive(Clone, Copy)]
pub enum FieldRole {
    /// No binding attribute: keeps the probe value.
    Plain,
    /// `#[bind(...)]`: set from the context through a name or type parser.
    Bound(&'static str),
    /// `#[bind(inject)]`: filled once from a provided singleton.
    Inject,
    /// `#[bind(nested)]`: a bindable struct whose fields are visited in turn.
    Nested(fn() -> Vec<FieldDescriptor>),
}

impl fmt::Debug for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRole::Plain => f.write_str("Plain"),
            FieldRole::Bound(tag) => f.debug_tuple("Bound").field(tag).finish(),
            FieldRole::Inject => f.write_str("Inject"),
            FieldRole::Nested(_) => f.write_str("Nested"),
        }
    }
}

/// Static description of one struct field.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    name: &'static str,
    role: FieldRole,
    ty: TypeInfo,
    decode: Option<Decode>,
    assign: AssignFn,
}

impl FieldDescriptor {
    /// A field without binding attribute.
    pub fn plain<T: Send + 'static>(name: &'static str) -> Self {
        Self::new::<T>(name, FieldRole::Plain, None)
    }

    /// A bound field whose tag carries no marker: resolved by type.
    pub fn typed<T: Send + 'static>(name: &'static str, tag: &'static str) -> Self {
        Self::new::<T>(name, FieldRole::Bound(tag), None)
    }

    /// A bound field whose tag starts with a marker: resolved by name parser.
    pub fn tagged<T>(name: &'static str, tag: &'static str) -> Self
    where
        T: serde::de::DeserializeOwned + Send + 'static,
    {
        Self::new::<T>(name, FieldRole::Bound(tag), Some(Decode::of::<T>()))
    }

    /// A field filled from a provided singleton.
    pub fn inject<T: Send + 'static>(name: &'static str) -> Self {
        Self::new::<T>(name, FieldRole::Inject, None)
    }

    /// A nested bindable struct.
    pub fn nested<T: Bind>(name: &'static str) -> Self {
        Self::new::<T>(name, FieldRole::Nested(T::fields), None)
    }

    fn new<T: Send + 'static>(name: &'static str, role: FieldRole, decode: Option<Decode>) -> Self {
        Self {
            name,
            role,
            ty: TypeInfo::of::<T>(),
            decode,
            assign: assign_slot::<T>,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn role(&self) -> FieldRole {
        self.role
    }

    /// Raw binding tag, for bound fields.
    pub fn tag(&self) -> Option<&'static str> {
        match self.role {
            FieldRole::Bound(tag) => Some(tag),
            _ => None,
        }
    }

    #[inline]
    pub fn ty(&self) -> TypeInfo {
        self.ty
    }

    /// Decoders for the field type; present for marker-tagged fields.
    pub fn decode(&self) -> Option<Decode> {
        self.decode
    }

    /// Write `value` into `slot`, both expected to be of the field type.
    pub fn assign(&self, slot: &mut dyn Any, value: BoxedValue) -> Result<(), BindError> {
        (self.assign)(slot, value)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("ty", &self.ty)
            .finish()
    }
}

fn assign_slot<T: Send + 'static>(slot: &mut dyn Any, value: BoxedValue) -> Result<(), BindError> {
    let expected = std::any::type_name::<T>();
    let slot = slot
        .downcast_mut::<T>()
        .ok_or(BindError::TypeMismatch { expected })?;
    *slot = *value
        .downcast::<T>()
        .map_err(|_| BindError::TypeMismatch { expected })?;
    Ok(())
}

/// Ordinal path of a field from the root of a struct.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<usize>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of field `index` inside the struct at `self`.
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", index)?;
        }
        Ok(())
    }
}

/// A struct whose fields can be bound from a context.
///
/// Implemented by `#[derive(Bind)]`. `Default` builds the probe instance,
/// `Clone` gives each invocation its own copy of it.
pub trait Bind: Default + Clone + Send + Sync + 'static {
    /// Descriptors of every named field, in declaration order.
    fn fields() -> Vec<FieldDescriptor>;

    /// Slot of the field at `path`, descending into nested structs.
    fn slot_mut(&mut self, path: &[usize]) -> Option<&mut dyn Any>;
}

impl<T: Bind> Bind for Box<T> {
    fn fields() -> Vec<FieldDescriptor> {
        T::fields()
    }

    fn slot_mut(&mut self, path: &[usize]) -> Option<&mut dyn Any> {
        <T as Bind>::slot_mut(&mut **self, path)
    }
}

/// Type-erased probe instance of a bindable struct.
pub trait Probe: Send + Sync {
    fn clone_probe(&self) -> Box<dyn Probe>;

    fn slot_mut(&mut self, path: &[usize]) -> Option<&mut dyn Any>;

    fn into_value(self: Box<Self>) -> BoxedValue;

    fn type_name(&self) -> &'static str;
}

impl<T: Bind> Probe for T {
    fn clone_probe(&self) -> Box<dyn Probe> {
        Box::new(self.clone())
    }

    fn slot_mut(&mut self, path: &[usize]) -> Option<&mut dyn Any> {
        Bind::slot_mut(self, path)
    }

    fn into_value(self: Box<Self>) -> BoxedValue {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Build a default probe of `T`.
pub fn probe_of<T: Bind>() -> Box<dyn Probe> {
    Box::new(T::default())
}
