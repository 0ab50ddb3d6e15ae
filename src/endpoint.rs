use crate::args::{Arg, Args};
use crate::handler::{Grant, Handler, Permission};
use crate::http::{Attributes, Method, Methods};
use crate::{Error, Request, Respond, Response};

use serde_json::{json, Value};

use std::fmt;

/// A callback bound to a set of methods on a route,
/// with its permission check and parameter schema.
///
/// ```
/// use restwire::{Arg, ArgType, Endpoint, Request};
/// use restwire::http::Methods;
/// use serde_json::json;
///
/// let endpoint = Endpoint::new(Methods::EDITABLE, |req: &Request| {
///     json!({ "id": req.get_param("id") })
/// })
/// .permission(|req: &Request| req.get_header("authorization").is_some())
/// .arg("id", Arg::new().kind(ArgType::Integer).required());
///
/// assert!(endpoint.methods().contains(restwire::http::Method::Patch));
/// ```
pub struct Endpoint {
    methods: Methods,
    handler: Box<dyn Handler>,
    permission: Option<Box<dyn Permission>>,
    args: Args,
    hidden: bool,
}

impl Endpoint {
    /// Create an endpoint answering `methods` with a callback.
    pub fn new<F, R>(methods: impl Into<Methods>, f: F) -> Self
    where
        F: Fn(&Request) -> R + Send + Sync + 'static,
        R: Respond,
    {
        Endpoint::handler(methods, f)
    }

    /// Create an endpoint from any [`Handler`].
    pub fn handler(methods: impl Into<Methods>, handler: impl Handler) -> Self {
        Endpoint {
            methods: methods.into(),
            handler: Box::new(handler),
            permission: None,
            args: Args::new(),
            hidden: false,
        }
    }

    /// Guard the endpoint with a permission callback.
    ///
    /// Endpoints without one are open to everyone.
    pub fn permission<F, G>(mut self, f: F) -> Self
    where
        F: Fn(&Request) -> G + Send + Sync + 'static,
        G: Grant,
    {
        self.permission = Some(Box::new(f));
        self
    }

    /// Guard the endpoint with any [`Permission`].
    pub fn permission_check(mut self, permission: impl Permission) -> Self {
        self.permission = Some(Box::new(permission));
        self
    }

    /// Declare a parameter.
    pub fn arg(mut self, name: impl Into<String>, arg: Arg) -> Self {
        self.args.insert(name, arg);
        self
    }

    /// Replace the parameter schema.
    pub fn args(mut self, args: Args) -> Self {
        self.args = args;
        self
    }

    /// Leave this endpoint out of the discovery output.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn methods(&self) -> Methods {
        self.methods
    }

    pub fn arg_schema(&self) -> &Args {
        &self.args
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub(crate) fn allows(&self, req: &Request) -> Result<bool, Error> {
        match &self.permission {
            Some(permission) => permission.check(req),
            None => Ok(true),
        }
    }

    pub(crate) fn call(&self, req: &Request) -> Result<Response, Error> {
        self.handler.call(req)
    }

    pub(crate) fn attributes(&self) -> Attributes {
        Attributes {
            args: self.args.clone(),
            methods: self.methods,
            hidden: self.hidden,
        }
    }

    /// The discovery description of this endpoint.
    pub fn describe(&self) -> Value {
        json!({
            "methods": self.methods.iter().map(Method::as_str).collect::<Vec<_>>(),
            "args": self.args.describe(),
        })
    }
}

macro_rules! endpoint {
    ($name:ident => $methods:ident) => {
        #[doc = concat!("Create an endpoint for the `", stringify!($methods), "` method.")]
        pub fn $name<F, R>(f: F) -> Self
        where
            F: Fn(&Request) -> R + Send + Sync + 'static,
            R: Respond,
        {
            Endpoint::new(Methods::$methods, f)
        }
    };
}

impl Endpoint {
    endpoint!(get => GET);
    endpoint!(post => POST);
    endpoint!(put => PUT);
    endpoint!(patch => PATCH);
    endpoint!(delete => DELETE);
    endpoint!(options => OPTIONS);
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("methods", &self.methods)
            .field("args", &self.args)
            .field("permission", &self.permission.is_some())
            .field("hidden", &self.hidden)
            .finish()
    }
}
