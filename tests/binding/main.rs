//! Delay-bind integration tests.

mod support;
mod basic;
mod nested;
mod errors;
mod concurrency;
mod service;

#[cfg(feature = "http")]
mod http;
