//! How handler parameter types present themselves to the resolver.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::field::{probe_of, Bind, FieldDescriptor, Probe};
use crate::value::{BoxedValue, TypeInfo};

/// A type that can appear as a handler parameter.
///
/// Opaque parameters are produced whole: by a provided singleton, by a type
/// parser, or by [`Param::fallback`]. `#[derive(Bind)]` structs report
/// [`ParamKind::Struct`] and are assembled field by field instead.
///
/// ```
/// use param_bind::Param;
///
/// #[derive(Clone)]
/// struct Tenant(String);
///
/// impl Param for Tenant {}
/// ```
pub trait Param: Send + 'static {
    fn kind() -> ParamKind
    where
        Self: Sized,
    {
        ParamKind::Opaque {
            fallback: fallback_of::<Self>,
        }
    }

    /// Value used when nothing else can produce this parameter.
    fn fallback() -> Option<Self>
    where
        Self: Sized,
    {
        None
    }
}

/// Resolution strategy of a parameter type, decided from the type alone.
#[derive(Clone, Copy)]
pub enum ParamKind {
    Opaque {
        fallback: fn() -> Option<BoxedValue>,
    },
    Struct {
        fields: fn() -> Vec<FieldDescriptor>,
        probe: fn() -> Box<dyn Probe>,
    },
}

impl ParamKind {
    /// Struct kind for a bindable type.
    pub fn structure<T: Bind>() -> Self {
        ParamKind::Struct {
            fields: T::fields,
            probe: probe_of::<T>,
        }
    }
}

impl fmt::Debug for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Opaque { .. } => f.write_str("Opaque"),
            ParamKind::Struct { .. } => f.write_str("Struct"),
        }
    }
}

fn fallback_of<T: Param>() -> Option<BoxedValue> {
    T::fallback().map(|v| Box::new(v) as BoxedValue)
}

/// One declared parameter of a handler.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    ty: TypeInfo,
    kind: ParamKind,
}

impl ParamSpec {
    pub fn of<T: Param>() -> Self {
        Self {
            ty: TypeInfo::of::<T>(),
            kind: T::kind(),
        }
    }

    #[inline]
    pub fn ty(&self) -> TypeInfo {
        self.ty
    }

    #[inline]
    pub fn kind(&self) -> ParamKind {
        self.kind
    }
}

macro_rules! opaque_params {
    ($($ty:ty),* $(,)?) => {
        $( impl Param for $ty {} )*
    };
}

opaque_params!(
    String, bool, char, f32, f64, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128,
    usize, serde_json::Value,
);

impl<T: Send + 'static> Param for Vec<T> {}

impl<T: Send + 'static> Param for Option<T> {
    fn fallback() -> Option<Self> {
        Some(None)
    }
}

impl<K: Send + 'static, V: Send + 'static> Param for HashMap<K, V> {}

impl<T: ?Sized + Send + Sync + 'static> Param for Arc<T> {}

impl<T: Bind> Param for Box<T> {
    fn kind() -> ParamKind {
        ParamKind::structure::<Box<T>>()
    }
}
