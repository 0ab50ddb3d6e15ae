//! Serve a [`restwire::Dispatcher`] over HTTP with hyper.
//!
//! ```no_run
//! use restwire::{Dispatcher, Endpoint, Request, RouteTable};
//! use restwire_hyper::Serve;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut routes = RouteTable::new();
//!     routes.register("/ping", Endpoint::get(|_: &Request| "pong"))?;
//!
//!     Dispatcher::new(routes).serve("127.0.0.1:3000")?.await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::future::{ready, Future, Ready};
use std::io;
use std::net::*;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use hyper::body::HttpBody;
use hyper::server::conn::AddrIncoming;
use hyper::service::Service;
use restwire::http::StatusCode;
use restwire::{Dispatcher, Error, Reject, Request, Response};

pub use hyper::Server;

/// Serve a dispatcher with hyper.
pub trait Serve {
    fn serve(self, addr: impl ToSocketAddr) -> io::Result<Server<AddrIncoming, DispatchMakeService>>;
    fn into_make_service(self) -> DispatchMakeService;
    fn into_service(self) -> DispatchService;
}

impl Serve for Dispatcher {
    fn serve(self, addr: impl ToSocketAddr) -> io::Result<Server<AddrIncoming, DispatchMakeService>> {
        let addr = addr.to_socket_addr()?;
        let incoming = AddrIncoming::bind(&addr).map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        tracing::info!(%addr, "listening");
        Ok(Server::builder(incoming).serve(self.into_make_service()))
    }

    fn into_make_service(self) -> DispatchMakeService {
        DispatchMakeService {
            service: self.into_service(),
        }
    }

    fn into_service(self) -> DispatchService {
        DispatchService {
            dispatcher: Arc::new(self),
        }
    }
}

pub struct DispatchMakeService {
    service: DispatchService,
}

impl<T> Service<T> for DispatchMakeService {
    type Response = DispatchService;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Infallible>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _: T) -> Self::Future {
        ready(Ok(self.service.clone()))
    }
}

#[derive(Clone)]
pub struct DispatchService {
    dispatcher: Arc<Dispatcher>,
}

impl Service<hyper::Request<hyper::Body>> for DispatchService {
    type Response = hyper::Response<hyper::Body>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: hyper::Request<hyper::Body>) -> Self::Future {
        let dispatcher = self.dispatcher.clone();

        Box::pin(async move {
            let head = req.method() == http::Method::HEAD;
            let limit = dispatcher.config().max_body();

            let (parts, body) = req.into_parts();
            let response = match read_body(body, limit).await {
                Ok(body) => match Request::from_http(http::Request::from_parts(parts, body)) {
                    Ok(req) => dispatcher.dispatch(req),
                    Err(err) => {
                        tracing::debug!(error = %err, "unsupported method");
                        err.reject()
                    }
                },
                Err(err) => {
                    tracing::warn!(error = %err, "failed to read request body");
                    err.reject()
                }
            };

            Ok(into_hyper(response, head))
        })
    }
}

fn into_hyper(response: Response, head: bool) -> hyper::Response<hyper::Body> {
    let response = response.into_http();
    if head {
        response.map(|_| hyper::Body::empty())
    } else {
        response.map(hyper::Body::from)
    }
}

/// Failure to buffer a request body.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("failed to read request body: {0}")]
    Read(#[from] hyper::Error),
}

impl Reject for BodyError {
    fn reject(self) -> Response {
        let err = match &self {
            BodyError::TooLarge { limit } => Error::new("rest_body_too_large", self.to_string())
                .with_status(StatusCode::PAYLOAD_TOO_LARGE)
                .with_data("limit", *limit),
            BodyError::Read(_) => Error::new("rest_invalid_body", self.to_string())
                .with_status(StatusCode::BAD_REQUEST),
        };

        err.reject()
    }
}

async fn read_body(mut body: hyper::Body, limit: usize) -> Result<Bytes, BodyError> {
    if body.size_hint().lower() > limit as u64 {
        return Err(BodyError::TooLarge { limit });
    }

    let mut buf = BytesMut::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk?;
        if buf.len() + chunk.len() > limit {
            return Err(BodyError::TooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf.freeze())
}

pub trait ToSocketAddr {
    fn to_socket_addr(self) -> io::Result<SocketAddr>;
}

impl ToSocketAddr for SocketAddr {
    fn to_socket_addr(self) -> io::Result<SocketAddr> {
        Ok(self)
    }
}

macro_rules! to_socket_addr {
    ($($ty:ty),*) => {$(
        impl ToSocketAddr for $ty {
            fn to_socket_addr(self) -> io::Result<SocketAddr> {
                self.to_socket_addrs()?.next().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "could not resolve socket address")
                })
            }
        }
    )*}
}

to_socket_addr! {
    &str,
    String,
    (&str, u16),
    (IpAddr, u16),
    (String, u16),
    (Ipv4Addr, u16),
    (Ipv6Addr, u16),
    SocketAddrV4,
    SocketAddrV6
}

#[cfg(test)]
mod tests {
    use super::*;
    use restwire::{Config, Endpoint, RouteTable};
    use serde_json::{json, Value};

    fn service() -> DispatchService {
        let mut routes = RouteTable::new();
        routes
            .register(
                "/echo",
                Endpoint::post(|req: &Request| json!({ "name": req.get_param("name") })),
            )
            .unwrap()
            .register("/ping", Endpoint::get(|_: &Request| "pong"))
            .unwrap();

        Dispatcher::new(routes)
            .with_config(Config::new().body_limit(64))
            .into_service()
    }

    async fn send(req: hyper::Request<hyper::Body>) -> (StatusCode, http::HeaderMap, Bytes) {
        let response = service().call(req).await.unwrap();
        let (parts, body) = response.into_parts();
        (parts.status, parts.headers, hyper::body::to_bytes(body).await.unwrap())
    }

    #[tokio::test]
    async fn json_body() {
        let req = hyper::Request::post("/echo")
            .header("content-type", "application/json")
            .body(hyper::Body::from(r#"{"name":"gizmo"}"#))
            .unwrap();

        let (status, headers, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "application/json; charset=UTF-8");
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({ "name": "gizmo" }));
    }

    #[tokio::test]
    async fn oversized_body() {
        let req = hyper::Request::post("/echo")
            .body(hyper::Body::from(vec![b'a'; 65]))
            .unwrap();

        let (status, _, body) = send(req).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        let body = serde_json::from_slice::<Value>(&body).unwrap();
        assert_eq!(body["code"], "rest_body_too_large");
        assert_eq!(body["data"]["status"], 413);
    }

    #[tokio::test]
    async fn unsupported_method() {
        let req = hyper::Request::builder()
            .method("TRACE")
            .uri("/ping")
            .body(hyper::Body::empty())
            .unwrap();

        let (status, _, _) = send(req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn head_has_no_body() {
        let req = hyper::Request::head("/ping").body(hyper::Body::empty()).unwrap();

        let (status, _, body) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }
}
