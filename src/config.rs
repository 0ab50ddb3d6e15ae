use serde::Deserialize;

/// Dispatcher configuration.
///
/// Every option has a default, so a partial configuration
/// can be deserialized:
///
/// ```
/// use restwire::Config;
///
/// let config: Config = serde_json::from_str(r#"{ "envelope": false }"#).unwrap();
/// assert!(!config.envelope_enabled());
/// assert!(config.method_override_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    method_override: bool,
    envelope: bool,
    index: bool,
    always_allow: bool,
    body_limit: usize,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `POST` requests choose their method through the
    /// `X-HTTP-Method-Override` header or the `_method` query parameter.
    pub fn method_override(mut self, enabled: bool) -> Self {
        self.method_override = enabled;
        self
    }

    /// Wrap responses in `{body, status, headers}` when the
    /// request carries an `_envelope` parameter.
    pub fn envelope(mut self, enabled: bool) -> Self {
        self.envelope = enabled;
        self
    }

    /// Serve the discovery index on `GET /` and `GET /{namespace}`.
    pub fn index(mut self, enabled: bool) -> Self {
        self.index = enabled;
        self
    }

    /// Send the `Allow` header on every matched response rather
    /// than only on errors and `OPTIONS`.
    pub fn always_allow(mut self, enabled: bool) -> Self {
        self.always_allow = enabled;
        self
    }

    /// The largest request body, in bytes, a transport adapter
    /// should accept.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn method_override_enabled(&self) -> bool {
        self.method_override
    }

    pub fn envelope_enabled(&self) -> bool {
        self.envelope
    }

    pub fn index_enabled(&self) -> bool {
        self.index
    }

    pub fn always_allow_enabled(&self) -> bool {
        self.always_allow
    }

    pub fn max_body(&self) -> usize {
        self.body_limit
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            method_override: true,
            envelope: true,
            index: true,
            always_allow: false,
            body_limit: 2_097_152,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let config = Config::new().always_allow(true).body_limit(1024);
        assert!(config.always_allow_enabled());
        assert_eq!(config.max_body(), 1024);
        assert!(config.index_enabled());
    }

    #[test]
    fn deserialize_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }
}
