//! A REST route dispatcher.
//!
//! Endpoints are registered on a [`RouteTable`] under regular expression
//! patterns, and a [`Dispatcher`] turns each [`Request`] into a
//! [`Response`]: matching the route, checking permissions, sanitizing
//! and validating parameters, and rendering errors as JSON envelopes.
//!
//! ```
//! use restwire::{Arg, ArgType, Dispatcher, Endpoint, Request, RouteTable};
//! use restwire::http::{Method, StatusCode};
//! use serde_json::json;
//!
//! let mut routes = RouteTable::new();
//! routes.register_in(
//!     "shop/v1",
//!     "/widgets/(?P<id>[0-9]+)",
//!     Endpoint::get(|req: &Request| json!({ "id": req.get_param("id") }))
//!         .arg("id", Arg::new().kind(ArgType::Integer)),
//! )?;
//!
//! let dispatcher = Dispatcher::new(routes);
//!
//! let response = dispatcher.dispatch(Request::new(Method::Get, "/shop/v1/widgets/7"));
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(response.data(), &json!({ "id": 7 }));
//!
//! let response = dispatcher.dispatch(Request::new(Method::Delete, "/shop/v1/widgets/7"));
//! assert_eq!(response.status(), StatusCode::NOT_FOUND);
//! # Ok::<(), restwire::RouteError>(())
//! ```

mod args;
mod config;
mod dispatch;
mod endpoint;
mod error;
mod handler;
mod pagination;
mod reject;
mod respond;
mod router;

pub mod http;

pub use args::{Arg, ArgType, Args, Sanitized, Verdict};
pub use config::Config;
pub use dispatch::Dispatcher;
pub use endpoint::Endpoint;
pub use error::{Error, ErrorKind, RouteError};
pub use handler::{Grant, Handler, Permission};
pub use pagination::Pagination;
pub use reject::Reject;
pub use respond::{Json, Respond};
pub use router::{Route, RouteTable, Scope};

#[doc(inline)]
pub use crate::http::{Request, Response};
