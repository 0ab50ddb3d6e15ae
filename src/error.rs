use http::StatusCode;
use serde_json::{json, Map, Value};

use std::borrow::Cow;

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No route matched the path, or the route has no endpoint for the method.
    NoRoute,
    /// Every candidate endpoint refused the request.
    Forbidden,
    /// One or more required parameters are absent.
    MissingParameter,
    /// One or more parameters failed validation.
    InvalidParameter,
    /// An error raised by an endpoint callback.
    Upstream,
}

/// A typed error that renders into the standard envelope:
///
/// ```json
/// { "code": "...", "message": "...", "data": { "status": 400, "params": ... } }
/// ```
///
/// Errors built with [`Error::new`] are [`ErrorKind::Upstream`]
/// errors with a default status of `500`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} ({code})")]
pub struct Error {
    kind: ErrorKind,
    code: Cow<'static, str>,
    message: String,
    status: StatusCode,
    data: Map<String, Value>,
}

impl Error {
    /// Create an error with a machine readable code and a message.
    pub fn new(code: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Error {
            kind: ErrorKind::Upstream,
            code: code.into(),
            message: message.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            data: Map::new(),
        }
    }

    /// Set the HTTP status this error is sent with.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Attach an extra field to the `data` object of the envelope.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn no_route() -> Self {
        Error::new(
            "rest_no_route",
            "No route was found matching the URL and request method.",
        )
        .of_kind(ErrorKind::NoRoute)
        .with_status(StatusCode::NOT_FOUND)
    }

    pub fn forbidden() -> Self {
        Error::new("rest_forbidden", "Sorry, you are not allowed to do that.")
            .of_kind(ErrorKind::Forbidden)
            .with_status(StatusCode::FORBIDDEN)
    }

    /// A single error listing every missing parameter.
    pub fn missing_params<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let params: Vec<String> = params.into_iter().map(Into::into).collect();

        Error::new(
            "rest_missing_callback_param",
            format!("Missing parameter(s): {}", params.join(", ")),
        )
        .of_kind(ErrorKind::MissingParameter)
        .with_status(StatusCode::BAD_REQUEST)
        .with_data("params", params)
    }

    /// A single error mapping every invalid parameter to its failure detail.
    pub fn invalid_params(params: Map<String, Value>) -> Self {
        let names = params.keys().cloned().collect::<Vec<_>>().join(", ");

        Error::new(
            "rest_invalid_param",
            format!("Invalid parameter(s): {}", names),
        )
        .of_kind(ErrorKind::InvalidParameter)
        .with_status(StatusCode::BAD_REQUEST)
        .with_data("params", params)
    }

    fn of_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The wire representation of this error.
    pub fn to_envelope(&self) -> Value {
        let mut data = self.data.clone();
        data.insert("status".to_owned(), json!(self.status.as_u16()));

        json!({
            "code": self.code,
            "message": self.message,
            "data": data,
        })
    }
}

/// Error returned when a route cannot be registered.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("invalid route pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("endpoint for '{0}' has no methods")]
    NoMethods(String),
}
