use crate::http::{Response, StatusCode};
use crate::Error;

use serde::Serialize;
use serde_json::Value;

/// A type that can be converted into a response.
///
/// Endpoint callbacks may return any type implementing this trait:
/// a [`Response`], a JSON [`Value`], a `(StatusCode, T)` pair, an
/// [`Error`], or a `Result` of those.
pub trait Respond {
    /// Convert into a response, or the error to respond with.
    fn respond(self) -> Result<Response, Error>;

    /// Returns a new responder that overrides the response status.
    fn with_status(self, status: StatusCode) -> (StatusCode, Self)
    where
        Self: Sized,
    {
        (status, self)
    }
}

impl Respond for Response {
    fn respond(self) -> Result<Response, Error> {
        Ok(self)
    }
}

impl Respond for Value {
    fn respond(self) -> Result<Response, Error> {
        Ok(Response::new(self))
    }
}

impl Respond for () {
    fn respond(self) -> Result<Response, Error> {
        Ok(Response::new(Value::Null))
    }
}

impl Respond for Error {
    fn respond(self) -> Result<Response, Error> {
        Err(self)
    }
}

impl<T> Respond for (StatusCode, T)
where
    T: Respond,
{
    fn respond(self) -> Result<Response, Error> {
        self.1.respond().map(|mut response| {
            response.set_status(self.0);
            response
        })
    }
}

impl<T, E> Respond for Result<T, E>
where
    T: Respond,
    E: Into<Error>,
{
    fn respond(self) -> Result<Response, Error> {
        self.map_err(Into::into).and_then(Respond::respond)
    }
}

/// Serializes the inner value as the response data.
///
/// ```
/// use restwire::{Json, Respond};
///
/// #[derive(serde::Serialize)]
/// struct Widget {
///     id: u32,
/// }
///
/// let response = Json(Widget { id: 42 }).respond().unwrap();
/// assert_eq!(response.data()["id"], 42);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Json<T>(pub T);

impl<T> Respond for Json<T>
where
    T: Serialize,
{
    fn respond(self) -> Result<Response, Error> {
        serde_json::to_value(self.0).map(Response::new).map_err(|err| {
            Error::new(
                "rest_serialization_failed",
                format!("Failed to serialize response: {}", err),
            )
        })
    }
}

macro_rules! into_value {
    ($($ty:ty),* $(,)?) => { $(
        impl Respond for $ty {
            fn respond(self) -> Result<Response, Error> {
                Ok(Response::new(Value::from(self)))
            }
        })*
    }
}

into_value! {
    String,
    &'static str,
    bool,
    i64,
    u64,
    f64,
}
