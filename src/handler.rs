//! Endpoint callbacks and permission checks.

use crate::{Error, Request, Respond, Response};

/// A synchronous endpoint callback.
///
/// This trait is implemented for any `Fn(&Request) -> impl Respond`.
/// Implement it directly for controller types that carry their own state.
pub trait Handler: Send + Sync + 'static {
    /// Produce a response for a request whose parameters
    /// have already been sanitized and validated.
    fn call(&self, req: &Request) -> Result<Response, Error>;
}

impl<F, R> Handler for F
where
    F: Fn(&Request) -> R + Send + Sync + 'static,
    R: Respond,
{
    fn call(&self, req: &Request) -> Result<Response, Error> {
        self(req).respond()
    }
}

/// A permission check guarding an endpoint.
///
/// A check either grants access, denies it, or denies it with a
/// specific error that is returned to the client instead of the
/// generic `rest_forbidden`.
pub trait Permission: Send + Sync + 'static {
    fn check(&self, req: &Request) -> Result<bool, Error>;
}

impl<F, G> Permission for F
where
    F: Fn(&Request) -> G + Send + Sync + 'static,
    G: Grant,
{
    fn check(&self, req: &Request) -> Result<bool, Error> {
        self(req).into_grant()
    }
}

/// The outcome of a permission callback.
pub trait Grant {
    fn into_grant(self) -> Result<bool, Error>;
}

impl Grant for bool {
    fn into_grant(self) -> Result<bool, Error> {
        Ok(self)
    }
}

impl<E> Grant for Result<bool, E>
where
    E: Into<Error>,
{
    fn into_grant(self) -> Result<bool, Error> {
        self.map_err(Into::into)
    }
}

impl<E> Grant for Result<(), E>
where
    E: Into<Error>,
{
    fn into_grant(self) -> Result<bool, Error> {
        self.map(|()| true).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, StatusCode};

    use serde_json::json;

    struct Echo {
        prefix: &'static str,
    }

    impl Handler for Echo {
        fn call(&self, req: &Request) -> Result<Response, Error> {
            Ok(Response::new(format!("{}{}", self.prefix, req.route())))
        }
    }

    fn call(handler: &dyn Handler, req: &Request) -> Result<Response, Error> {
        handler.call(req)
    }

    #[test]
    fn closures_and_controllers() {
        let req = Request::new(Method::Get, "/widgets");

        let response = call(&|req: &Request| json!({ "route": req.route() }), &req).unwrap();
        assert_eq!(response.data(), &json!({ "route": "/widgets" }));

        let response = call(&Echo { prefix: "at " }, &req).unwrap();
        assert_eq!(response.data(), &json!("at /widgets"));
    }

    #[test]
    fn failing_handler() {
        let req = Request::new(Method::Get, "/");
        let handler = |_: &Request| Err::<Response, _>(Error::new("nope", "Nope.").with_status(StatusCode::CONFLICT));

        let err = call(&handler, &req).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn grants() {
        let req = Request::new(Method::Get, "/");

        assert_eq!((|_: &Request| true).check(&req), Ok(true));
        assert_eq!((|_: &Request| false).check(&req), Ok(false));
        assert_eq!((|_: &Request| Ok::<(), Error>(())).check(&req), Ok(true));

        let denied = (|_: &Request| Err::<bool, _>(Error::new("rest_cannot_edit", "Sorry.")))
            .check(&req)
            .unwrap_err();
        assert_eq!(denied.code(), "rest_cannot_edit");
    }
}
