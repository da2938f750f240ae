//! Standard parsers over [`Request`].
//!
//! | marker   | source                      |
//! |----------|-----------------------------|
//! | `query`  | query string                |
//! | `header` | headers (case-insensitive)  |
//! | `cookie` | cookies                     |
//! | `param`  | router path parameters      |
//! | `body`   | JSON body                   |

use std::sync::Arc;

use super::sources::{Body, Cookies, Headers, Method, Multimap, PathParams, Query};
use super::Request;
use crate::decode::{Decode, DecodeError};
use crate::error::BindError;
use crate::executor::ExecutorBuilder;
use crate::field::FieldDescriptor;
use crate::parser::{type_parser, BindFn, NameParser};
use crate::resolve::Param;
use crate::tag::{Tag, DEFAULT, NAME};

fn decoder(marker: &str, field: &FieldDescriptor) -> Result<Decode, BindError> {
    field.decode().ok_or_else(|| BindError::UnsupportedField {
        field: field.name().to_string(),
        reason: format!("`{}` fields must be deserializable", marker),
    })
}

fn extraction_error(source: &'static str, key: &str, err: DecodeError) -> BindError {
    if err.is_missing() {
        BindError::Missing {
            source,
            key: key.to_string(),
        }
    } else {
        BindError::decode(source, key, err)
    }
}

/// Binds from one multi-valued source of the request.
///
/// - `#[bind(query)]` reads the key named like the field;
/// - `name = "..."` reads another key;
/// - `default = "..."` is used when the key is absent;
/// - `all` decodes every pair of the source into a struct or map.
#[derive(Clone, Copy)]
pub struct MultimapParser {
    marker: &'static str,
    source: fn(&Request) -> &Multimap,
    fold_case: bool,
}

impl MultimapParser {
    pub fn new(marker: &'static str, source: fn(&Request) -> &Multimap) -> Self {
        Self {
            marker,
            source,
            fold_case: false,
        }
    }

    /// Lowercase keys before lookup.
    pub fn fold_case(mut self) -> Self {
        self.fold_case = true;
        self
    }

    pub fn query() -> Self {
        Self::new("query", query_source)
    }

    pub fn header() -> Self {
        Self::new("header", header_source).fold_case()
    }

    pub fn cookie() -> Self {
        Self::new("cookie", cookie_source)
    }

    pub fn param() -> Self {
        Self::new("param", param_source)
    }
}

fn query_source(req: &Request) -> &Multimap {
    req.query().as_multimap()
}

fn header_source(req: &Request) -> &Multimap {
    req.headers().as_multimap()
}

fn cookie_source(req: &Request) -> &Multimap {
    req.cookies().as_multimap()
}

fn param_source(req: &Request) -> &Multimap {
    req.path_params().as_multimap()
}

impl NameParser<Request> for MultimapParser {
    fn build_parser(
        &self,
        tag: &Tag,
        field: &FieldDescriptor,
    ) -> Result<BindFn<Request>, BindError> {
        let decode = decoder(self.marker, field)?;
        let marker = self.marker;
        let source = self.source;

        if tag.binds_all() {
            return Ok(Arc::new(move |req: &Request| {
                decode
                    .pairs(source(req).pairs())
                    .map_err(|e| extraction_error(marker, "*", e))
            }));
        }

        let mut key = tag.get(NAME).unwrap_or(field.name()).to_string();
        if self.fold_case {
            key = key.to_ascii_lowercase();
        }
        let default = tag.get(DEFAULT).map(str::to_string);

        Ok(Arc::new(move |req: &Request| {
            let mut values = source(req).get_all(&key);
            if values.is_empty() {
                if let Some(default) = &default {
                    values.push(default.as_str());
                }
            }
            decode
                .values(&values)
                .map_err(|e| extraction_error(marker, &key, e))
        }))
    }

    fn name(&self) -> &str {
        self.marker
    }
}

/// Binds from the JSON body: the whole document, or with `name = "..."` one
/// top-level member of it. An empty body or absent member counts as missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyParser;

impl NameParser<Request> for BodyParser {
    fn build_parser(
        &self,
        tag: &Tag,
        field: &FieldDescriptor,
    ) -> Result<BindFn<Request>, BindError> {
        let decode = decoder("body", field)?;

        match tag.get(NAME).map(str::to_string) {
            None => {
                let key = field.name();
                Ok(Arc::new(move |req: &Request| {
                    let bytes = req.body_bytes().as_bytes();
                    let decoded = if bytes.is_empty() {
                        decode.values(&[])
                    } else {
                        decode.json(bytes)
                    };
                    decoded.map_err(|e| extraction_error("body", key, e))
                }))
            }
            Some(member) => Ok(Arc::new(move |req: &Request| {
                let bytes = req.body_bytes().as_bytes();
                let value = if bytes.is_empty() {
                    None
                } else {
                    let document: serde_json::Value = serde_json::from_slice(bytes)
                        .map_err(|e| BindError::Decode {
                            source: "body",
                            key: member.clone(),
                            message: e.to_string(),
                        })?;
                    match document {
                        serde_json::Value::Object(mut object) => object.remove(&member),
                        _ => None,
                    }
                };
                let decoded = match value {
                    Some(value) => decode.json_value(value),
                    None => decode.values(&[]),
                };
                decoded.map_err(|e| extraction_error("body", &member, e))
            })),
        }
    }

    fn name(&self) -> &str {
        "body"
    }
}

impl ExecutorBuilder<Request> {
    /// Register the name parsers for `query`, `header`, `cookie`, `param` and
    /// `body`, plus type parsers for [`Request`] and each of its parts.
    pub fn with_standard_parsers(self) -> Self {
        self.name_parser(MultimapParser::query())
            .name_parser(MultimapParser::header())
            .name_parser(MultimapParser::cookie())
            .name_parser(MultimapParser::param())
            .name_parser(BodyParser)
            .type_parser(type_parser(|req: &Request| Ok(req.clone())))
            .type_parser(type_parser(|req: &Request| Ok(req.query().clone())))
            .type_parser(type_parser(|req: &Request| Ok(req.headers().clone())))
            .type_parser(type_parser(|req: &Request| Ok(req.cookies().clone())))
            .type_parser(type_parser(|req: &Request| Ok(req.path_params().clone())))
            .type_parser(type_parser(|req: &Request| Ok(req.body_bytes().clone())))
            .type_parser(type_parser(|req: &Request| Ok(req.method().clone())))
    }
}

impl Param for Request {}
impl Param for Query {}
impl Param for Headers {}
impl Param for Cookies {}
impl Param for PathParams {}
impl Param for Body {}
impl Param for Method {}
