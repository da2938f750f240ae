//! Bind executor: dispatch from a field or parameter type to an extractor.
//!
//! The executor owns the two parser registries. It is built once at startup
//! through [`ExecutorBuilder`] and is read-only afterwards, so it can be
//! shared between any number of compiled handlers without locking.
//!
//! ## Example
//!
//! ```ignore
//! use param_bind::{BindExecutor, type_parser};
//!
//! let executor = BindExecutor::<Request>::builder()
//!     .with_standard_parsers()
//!     .type_parser(type_parser(|req: &Request| Ok(Tenant::from(req))))
//!     .build()?;
//! ```

use std::sync::Arc;

use crate::error::BindError;
use crate::field::FieldDescriptor;
use crate::parser::{BindFn, FieldSetter, NameParser, NameParsers, TypeParser, TypeParsers};
use crate::tag::Tag;
use crate::value::TypeInfo;

/// Collects parsers; `build` validates them into a [`BindExecutor`].
pub struct ExecutorBuilder<C> {
    type_parsers: Vec<Arc<dyn TypeParser<C>>>,
    name_parsers: Vec<Arc<dyn NameParser<C>>>,
}

impl<C: 'static> ExecutorBuilder<C> {
    pub fn new() -> Self {
        Self {
            type_parsers: Vec::new(),
            name_parsers: Vec::new(),
        }
    }

    /// Add a type parser.
    pub fn type_parser<P: TypeParser<C> + 'static>(mut self, parser: P) -> Self {
        self.type_parsers.push(Arc::new(parser));
        self
    }

    /// Add a name parser.
    pub fn name_parser<P: NameParser<C> + 'static>(mut self, parser: P) -> Self {
        self.name_parsers.push(Arc::new(parser));
        self
    }

    /// Add an already shared type parser.
    pub fn shared_type_parser(mut self, parser: Arc<dyn TypeParser<C>>) -> Self {
        self.type_parsers.push(parser);
        self
    }

    /// Add an already shared name parser.
    pub fn shared_name_parser(mut self, parser: Arc<dyn NameParser<C>>) -> Self {
        self.name_parsers.push(parser);
        self
    }

    /// Build both registries. Fails on the first duplicate type or marker.
    pub fn build(self) -> Result<BindExecutor<C>, BindError> {
        let mut type_parsers = TypeParsers::new();
        for parser in self.type_parsers {
            type_parsers.insert(parser)?;
        }

        let mut name_parsers = NameParsers::new();
        for parser in self.name_parsers {
            name_parsers.insert(parser)?;
        }

        tracing::debug!(
            type_parsers = type_parsers.len(),
            name_parsers = name_parsers.len(),
            "bind executor initialised"
        );

        Ok(BindExecutor {
            type_parsers,
            name_parsers,
        })
    }
}

impl<C: 'static> Default for ExecutorBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatch between "what is this field or parameter" and "how do I get its
/// value from a context".
pub struct BindExecutor<C> {
    type_parsers: TypeParsers<C>,
    name_parsers: NameParsers<C>,
}

impl<C: 'static> BindExecutor<C> {
    pub fn builder() -> ExecutorBuilder<C> {
        ExecutorBuilder::new()
    }

    /// Build an executor from parser lists in one go.
    pub fn init(
        type_parsers: Vec<Arc<dyn TypeParser<C>>>,
        name_parsers: Vec<Arc<dyn NameParser<C>>>,
    ) -> Result<Self, BindError> {
        ExecutorBuilder {
            type_parsers,
            name_parsers,
        }
        .build()
    }

    /// Extractor for a whole value of type `ty`, if a type parser exists.
    ///
    /// `None` means "not applicable", not an error.
    pub fn injected_by_type(&self, ty: &TypeInfo) -> Option<BindFn<C>> {
        let parser = Arc::clone(self.type_parsers.get(ty)?);
        Some(Arc::new(move |ctx: &C| parser.parse(ctx)))
    }

    /// Setter for a bound field, resolved from its tag.
    pub fn find_field_setter(&self, field: &FieldDescriptor) -> Result<FieldSetter<C>, BindError> {
        let raw = field.tag().unwrap_or("");
        let tag = Tag::parse(raw).map_err(|e| BindError::InvalidTag {
            field: field.name().to_string(),
            tag: raw.to_string(),
            reason: e.to_string(),
        })?;
        self.find_field_setter_for_tag(&tag, field)
    }

    /// Setter for a field with an already parsed tag.
    ///
    /// A marker selects a name parser; without one the field's declared type
    /// is looked up among the type parsers.
    pub fn find_field_setter_for_tag(
        &self,
        tag: &Tag,
        field: &FieldDescriptor,
    ) -> Result<FieldSetter<C>, BindError> {
        let extract = match tag.marker() {
            Some(marker) => {
                let parser =
                    self.name_parsers
                        .get(marker)
                        .ok_or_else(|| BindError::NoParserForField {
                            field: field.name().to_string(),
                            marker: marker.to_string(),
                        })?;
                parser.build_parser(tag, field)?
            }
            None => self.injected_by_type(&field.ty()).ok_or_else(|| {
                BindError::UnresolvableField {
                    field: field.name().to_string(),
                    ty: field.ty().name(),
                }
            })?,
        };

        let field = *field;
        Ok(Arc::new(move |ctx: &C, slot: &mut dyn std::any::Any| {
            let value = extract(ctx)?;
            field.assign(slot, value)
        }))
    }

    pub fn type_parsers(&self) -> &TypeParsers<C> {
        &self.type_parsers
    }

    pub fn name_parsers(&self) -> &NameParsers<C> {
        &self.name_parsers
    }
}
