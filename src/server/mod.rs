//! Serves the [`vistoria::api`] handlers over HTTP with `tiny_http`

pub mod tiny_http;

pub use self::tiny_http::serve;
