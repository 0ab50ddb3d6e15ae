use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// An HTTP method.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl Method {
    /// Every method, in the order they are listed in an `Allow` header.
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
        Method::Options,
        Method::Head,
    ];

    /// The string representation of this HTTP method.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
        }
    }

    /// Whether requests with this method may carry body parameters.
    pub fn has_body(self) -> bool {
        !matches!(self, Method::Get | Method::Head)
    }

    pub(crate) fn from_http(method: &http::Method) -> Option<Self> {
        method.as_str().parse().ok()
    }

    fn bit(self) -> u8 {
        match self {
            Method::Get => 1,
            Method::Post => 1 << 1,
            Method::Put => 1 << 2,
            Method::Patch => 1 << 3,
            Method::Delete => 1 << 4,
            Method::Options => 1 << 5,
            Method::Head => 1 << 6,
        }
    }
}

impl Default for Method {
    fn default() -> Self {
        Method::Get
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unsupported HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method '{0}'")]
pub struct InvalidMethod(pub String);

impl FromStr for Method {
    type Err = InvalidMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .iter()
            .copied()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| InvalidMethod(s.to_owned()))
    }
}

/// A set of HTTP methods an endpoint responds to.
///
/// ```
/// use restwire::http::{Method, Methods};
///
/// let methods = Methods::GET | Methods::POST;
/// assert!(methods.contains(Method::Post));
/// assert!(!methods.contains(Method::Delete));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Methods(u8);

impl Methods {
    pub const NONE: Methods = Methods(0);
    pub const GET: Methods = Methods(1);
    pub const POST: Methods = Methods(1 << 1);
    pub const PUT: Methods = Methods(1 << 2);
    pub const PATCH: Methods = Methods(1 << 3);
    pub const DELETE: Methods = Methods(1 << 4);
    pub const OPTIONS: Methods = Methods(1 << 5);

    /// Alias for `GET`.
    pub const READABLE: Methods = Methods::GET;
    /// Alias for `POST`.
    pub const CREATABLE: Methods = Methods::POST;
    /// Alias for `POST, PUT, PATCH`.
    pub const EDITABLE: Methods = Methods(Methods::POST.0 | Methods::PUT.0 | Methods::PATCH.0);
    /// Alias for `DELETE`.
    pub const DELETABLE: Methods = Methods::DELETE;
    /// Alias for `GET, POST, PUT, PATCH, DELETE`.
    pub const ALL_METHODS: Methods = Methods(
        Methods::GET.0 | Methods::POST.0 | Methods::PUT.0 | Methods::PATCH.0 | Methods::DELETE.0,
    );

    /// Returns `true` if the set contains `method`.
    ///
    /// `HEAD` is served by any endpoint that serves `GET`, as well
    /// as by endpoints registered for `HEAD` itself.
    pub fn contains(self, method: Method) -> bool {
        let bits = match method {
            Method::Head => Method::Head.bit() | Method::Get.bit(),
            other => other.bit(),
        };

        self.0 & bits != 0
    }

    pub fn insert(&mut self, method: Method) {
        self.0 |= method.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over the methods in this set, in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Method> {
        Method::ALL
            .into_iter()
            .filter(move |method| self.0 & method.bit() != 0)
    }

    /// The value of an `Allow` header listing this set.
    pub fn to_header(self) -> String {
        self.iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<Method> for Methods {
    fn from(method: Method) -> Self {
        Methods(method.bit())
    }
}

impl BitOr for Methods {
    type Output = Methods;

    fn bitor(self, rhs: Methods) -> Methods {
        Methods(self.0 | rhs.0)
    }
}

impl BitOrAssign for Methods {
    fn bitor_assign(&mut self, rhs: Methods) {
        self.0 |= rhs.0;
    }
}

impl FromIterator<Method> for Methods {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Method>,
    {
        let mut methods = Methods::NONE;
        for method in iter {
            methods.insert(method);
        }
        methods
    }
}

impl fmt::Debug for Methods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("patch".parse::<Method>(), Ok(Method::Patch));
        assert_eq!("GET".parse::<Method>(), Ok(Method::Get));
        assert!("TRACE".parse::<Method>().is_err());
    }

    #[test]
    fn head_is_served_by_get() {
        assert!(Methods::READABLE.contains(Method::Head));
        assert!(!Methods::EDITABLE.contains(Method::Head));
    }

    #[test]
    fn head_only_sets_serve_head() {
        let head = Methods::from(Method::Head);
        assert!(head.contains(Method::Head));
        assert!(!head.contains(Method::Get));
    }

    #[test]
    fn allow_header_is_canonically_ordered() {
        let methods = Methods::DELETE | Methods::GET | Methods::PATCH;
        assert_eq!(methods.to_header(), "GET, PATCH, DELETE");
        assert_eq!(Methods::EDITABLE.to_header(), "POST, PUT, PATCH");
    }
}
