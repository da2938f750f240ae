//! Parser traits: the pluggable extraction strategies.
//!
//! - [`TypeParser`] produces a whole value of one type from a context.
//! - [`NameParser`] is selected by a tag marker and builds, once per field,
//!   a specialised extractor for that field.
//!
//! Both are stored behind `Arc` in the registries of [`crate::BindExecutor`].

mod registry;

use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::BindError;
use crate::field::FieldDescriptor;
use crate::tag::Tag;
use crate::value::{BoxedValue, TypeInfo};

pub use registry::{NameParsers, TypeParsers};

/// Pure extraction of one value from a context.
pub type BindFn<C> = Arc<dyn Fn(&C) -> Result<BoxedValue, BindError> + Send + Sync>;

/// Extraction of one value from a context, written into a field slot.
pub type FieldSetter<C> =
    Arc<dyn Fn(&C, &mut dyn std::any::Any) -> Result<(), BindError> + Send + Sync>;

/// Produces whole values of one type.
pub trait TypeParser<C>: Send + Sync {
    fn parse(&self, ctx: &C) -> Result<BoxedValue, BindError>;

    /// The type this parser produces.
    fn type_info(&self) -> TypeInfo;
}

/// Builds field extractors for one tag marker.
pub trait NameParser<C>: Send + Sync {
    /// Inspect `field` once and return an extractor specialised for it.
    ///
    /// `tag` is the whole parsed tag, so the parser can tell a single named
    /// value (`query,name=page`) from bind-all mode (`query,all`).
    fn build_parser(&self, tag: &Tag, field: &FieldDescriptor) -> Result<BindFn<C>, BindError>;

    /// The marker selecting this parser.
    fn name(&self) -> &str;
}

/// A [`TypeParser`] backed by a closure.
pub struct FnTypeParser<C, T, F> {
    parse: F,
    _phantom: PhantomData<fn(&C) -> T>,
}

impl<C, T, F> TypeParser<C> for FnTypeParser<C, T, F>
where
    T: Send + 'static,
    F: Fn(&C) -> Result<T, BindError> + Send + Sync,
{
    fn parse(&self, ctx: &C) -> Result<BoxedValue, BindError> {
        (self.parse)(ctx).map(|v| Box::new(v) as BoxedValue)
    }

    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }
}

/// Wrap a closure producing `T` into a type parser.
///
/// ```
/// use param_bind::{type_parser, TypeParser};
///
/// struct Ctx { user: String }
///
/// let parser = type_parser(|ctx: &Ctx| Ok(ctx.user.clone()));
/// assert!(parser.type_info().is::<String>());
/// ```
pub fn type_parser<C, T, F>(parse: F) -> FnTypeParser<C, T, F>
where
    T: Send + 'static,
    F: Fn(&C) -> Result<T, BindError> + Send + Sync,
{
    FnTypeParser {
        parse,
        _phantom: PhantomData,
    }
}
