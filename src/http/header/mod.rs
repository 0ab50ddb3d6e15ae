mod common;
mod map;

pub use common::ContentType;
pub use map::{canonicalize, Headers};
