use super::Request;

use serde_json::{Map, Value};

/// A bag of request parameters.
pub type Params = Map<String, Value>;

/// A source of request parameters.
///
/// Sources are consulted from highest to lowest precedence:
/// `Json`, `Body`, `Query`, `Url`, `Defaults`. `Json` only takes part
/// when the request has a JSON content type, and `Body` only when the
/// method can carry a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSource {
    Json,
    Body,
    Query,
    Url,
    Defaults,
}

impl Request {
    /// The sources consulted by [`get_param`](Request::get_param),
    /// highest precedence first.
    pub fn param_order(&self) -> Vec<ParamSource> {
        let mut order = Vec::with_capacity(5);

        if self.content_type().map_or(false, |ct| ct.is_json()) {
            order.push(ParamSource::Json);
        }

        if self.method.has_body() {
            order.push(ParamSource::Body);
        }

        order.extend([ParamSource::Query, ParamSource::Url, ParamSource::Defaults]);
        order
    }

    /// Returns the effective value of a parameter.
    pub fn get_param(&self, key: &str) -> Option<&Value> {
        self.param_order()
            .into_iter()
            .find_map(|source| self.bag(source)?.get(key))
    }

    /// Returns `true` if any source provides the parameter.
    pub fn has_param(&self, key: &str) -> bool {
        self.get_param(key).is_some()
    }

    /// Returns every parameter, merged in order of precedence.
    pub fn get_params(&self) -> Params {
        let mut params = Params::new();

        for source in self.param_order().into_iter().rev() {
            if let Some(bag) = self.bag(source) {
                params.extend(bag.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        params
    }

    /// Set a parameter in the source that currently provides it,
    /// or in the highest precedence source otherwise.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let order = self.param_order();

        let source = self
            .param_source(&key)
            .or_else(|| order.into_iter().find(|&source| self.bag(source).is_some()))
            .unwrap_or(ParamSource::Query);

        if let Some(bag) = self.bag_mut(source) {
            bag.insert(key, value.into());
        }
    }

    /// The source providing the effective value of a parameter.
    pub fn param_source(&self, key: &str) -> Option<ParamSource> {
        self.param_order()
            .into_iter()
            .find(|&source| self.bag(source).map_or(false, |bag| bag.contains_key(key)))
    }

    pub fn url_params(&self) -> &Params {
        &self.url
    }

    pub fn set_url_params(&mut self, params: Params) {
        self.url = params;
    }

    pub fn query_params(&self) -> &Params {
        &self.query
    }

    pub fn set_query_params(&mut self, params: Params) {
        self.query = params;
        self.raw_query = None;
    }

    /// Replace the query parameters with those of an urlencoded string.
    pub fn set_query_string(&mut self, query: &str) {
        let query = query.trim_start_matches('?');
        self.query = decode_pairs(query.as_bytes());
        self.raw_query = Some(query.to_owned());
    }

    /// The query string the parameters were decoded from, if they
    /// were not replaced since.
    pub fn query_string(&self) -> Option<&str> {
        self.raw_query.as_deref()
    }

    /// Parameters set explicitly as the request body.
    pub fn body_params(&self) -> &Params {
        &self.body
    }

    pub fn set_body_params(&mut self, params: Params) {
        self.body = params;
    }

    pub fn file_params(&self) -> &Params {
        &self.files
    }

    pub fn set_file_params(&mut self, params: Params) {
        self.files = params;
    }

    pub fn default_params(&self) -> &Params {
        &self.defaults
    }

    pub fn set_default_params(&mut self, params: Params) {
        self.defaults = params;
    }

    pub(crate) fn bag(&self, source: ParamSource) -> Option<&Params> {
        match source {
            ParamSource::Json => self.json_params(),
            ParamSource::Body => Some(self.effective_body()),
            ParamSource::Query => Some(&self.query),
            ParamSource::Url => Some(&self.url),
            ParamSource::Defaults => Some(&self.defaults),
        }
    }

    pub(crate) fn bag_mut(&mut self, source: ParamSource) -> Option<&mut Params> {
        match source {
            ParamSource::Json => {
                self.json_params()?;
                self.json.get_mut().and_then(Option::as_mut)
            }
            ParamSource::Body if self.body.is_empty() => {
                self.effective_body();
                self.form.get_mut()
            }
            ParamSource::Body => Some(&mut self.body),
            ParamSource::Query => Some(&mut self.query),
            ParamSource::Url => Some(&mut self.url),
            ParamSource::Defaults => Some(&mut self.defaults),
        }
    }
}

/// Decode `application/x-www-form-urlencoded` data.
///
/// Keys ending in `[]` collect their values into an array.
/// Malformed input decodes to an empty bag.
pub(crate) fn decode_pairs(input: &[u8]) -> Params {
    let pairs = match serde_urlencoded::from_bytes::<Vec<(String, String)>>(input) {
        Ok(pairs) => pairs,
        Err(err) => {
            tracing::debug!(error = %err, "ignoring malformed urlencoded data");
            return Params::new();
        }
    };

    let mut params = Params::new();

    for (key, value) in pairs {
        match key.strip_suffix("[]") {
            Some(key) => match params
                .entry(key.to_owned())
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(values) => values.push(Value::String(value)),
                other => *other = Value::Array(vec![Value::String(value)]),
            },
            None => {
                params.insert(key, Value::String(value));
            }
        }
    }

    params
}
