//! Error types for parser registration, handler preparation and extraction.

use std::error::Error;
use std::fmt;

use crate::decode::DecodeError;

/// Broad class of a [`BindError`].
///
/// `Registration` and `Unresolvable` errors happen before a handler serves
/// traffic and are fatal to startup / registration. `Extraction` errors are
/// scoped to a single invocation of a compiled function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Registration,
    Unresolvable,
    Extraction,
}

/// Error type for every operation in this crate.
#[derive(Debug)]
pub enum BindError {
    /// Two type parsers were registered for the same type.
    DuplicateTypeParser(&'static str),
    /// Two name parsers were registered for the same marker.
    DuplicateNameParser(String),
    /// A field's tag names a marker with no registered name parser.
    NoParserForField { field: String, marker: String },
    /// A field without marker whose type has no registered type parser,
    /// or an `inject` field with no provided singleton.
    UnresolvableField { field: String, ty: &'static str },
    /// A handler parameter that nothing can produce.
    UnresolvableParam { index: usize, ty: &'static str },
    /// A binding tag that does not follow the tag grammar.
    InvalidTag { field: String, tag: String, reason: String },
    /// A name parser refused to build an extractor for this field.
    UnsupportedField { field: String, reason: String },
    /// A required value is absent from the context.
    Missing { source: &'static str, key: String },
    /// A value is present but could not be converted.
    Decode {
        source: &'static str,
        key: String,
        message: String,
    },
    /// A type-erased value did not have the expected type.
    TypeMismatch { expected: &'static str },
    /// No handler registered under this name.
    UnknownHandler(String),
    /// Other extraction error raised by a custom parser.
    Other(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::DuplicateTypeParser(ty) => {
                write!(f, "duplicate type parser registered for {}", ty)
            }
            BindError::DuplicateNameParser(name) => {
                write!(f, "duplicate name parser registered for marker `{}`", name)
            }
            BindError::NoParserForField { field, marker } => {
                write!(f, "no parser for field `{}` (marker `{}`)", field, marker)
            }
            BindError::UnresolvableField { field, ty } => {
                write!(f, "cannot resolve field `{}` of type {}", field, ty)
            }
            BindError::UnresolvableParam { index, ty } => {
                write!(f, "cannot resolve parameter #{} of type {}", index, ty)
            }
            BindError::InvalidTag { field, tag, reason } => {
                write!(f, "invalid tag `{}` on field `{}`: {}", tag, field, reason)
            }
            BindError::UnsupportedField { field, reason } => {
                write!(f, "unsupported field `{}`: {}", field, reason)
            }
            BindError::Missing { source, key } => write!(f, "missing {} `{}`", source, key),
            BindError::Decode {
                source,
                key,
                message,
            } => write!(f, "invalid {} `{}`: {}", source, key, message),
            BindError::TypeMismatch { expected } => {
                write!(f, "type mismatch: expected {}", expected)
            }
            BindError::UnknownHandler(name) => write!(f, "unknown handler: {}", name),
            BindError::Other(e) => write!(f, "bind error: {}", e),
        }
    }
}

impl Error for BindError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BindError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl BindError {
    /// Wrap a decoder failure for `key` read from `source`.
    pub fn decode(source: &'static str, key: impl Into<String>, err: DecodeError) -> Self {
        BindError::Decode {
            source,
            key: key.into(),
            message: err.to_string(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BindError::DuplicateTypeParser(_) | BindError::DuplicateNameParser(_) => {
                ErrorKind::Registration
            }
            BindError::NoParserForField { .. }
            | BindError::UnresolvableField { .. }
            | BindError::UnresolvableParam { .. }
            | BindError::InvalidTag { .. }
            | BindError::UnsupportedField { .. } => ErrorKind::Unresolvable,
            BindError::Missing { .. }
            | BindError::Decode { .. }
            | BindError::TypeMismatch { .. }
            | BindError::UnknownHandler(_)
            | BindError::Other(_) => ErrorKind::Extraction,
        }
    }

    /// Whether this error must stop startup or handler registration.
    pub fn is_fatal(&self) -> bool {
        self.kind() != ErrorKind::Extraction
    }

    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            BindError::Missing { .. } | BindError::Decode { .. } => 400,
            BindError::UnknownHandler(_) => 404,
            _ => 500,
        }
    }
}

impl From<DecodeError> for BindError {
    fn from(err: DecodeError) -> Self {
        BindError::Decode {
            source: "value",
            key: String::new(),
            message: err.to_string(),
        }
    }
}
