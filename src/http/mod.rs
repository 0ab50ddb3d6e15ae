//! HTTP request and response types.

pub mod header;

mod method;
mod request;
mod response;

pub use bytes::Bytes;
pub use header::{ContentType, Headers};
pub use http::StatusCode;
pub use method::{InvalidMethod, Method, Methods};
pub use request::{Attributes, ParamSource, Params, Request};
pub use response::{Link, Response};
