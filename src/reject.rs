use crate::http::{InvalidMethod, Response};
use crate::Error;

use std::fmt::{Debug, Display};

/// An error capable of rejecting a request with an HTTP error response.
pub trait Reject: Debug + Display {
    /// Reject the request with an HTTP error response.
    fn reject(self) -> Response;
}

impl Reject for Error {
    fn reject(self) -> Response {
        Response::from_error(&self)
    }
}

impl Reject for InvalidMethod {
    fn reject(self) -> Response {
        Error::no_route().reject()
    }
}
