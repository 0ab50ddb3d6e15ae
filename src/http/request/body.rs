use super::param::{decode_pairs, Params};
use super::Request;

use serde_json::Value;

impl Request {
    /// Parameters decoded from a JSON body.
    ///
    /// Returns `None` unless the content type is JSON and the body
    /// decodes to an object. The body is decoded at most once until
    /// it is replaced.
    pub fn json_params(&self) -> Option<&Params> {
        self.json
            .get_or_init(|| {
                if !self.content_type()?.is_json() || self.raw_body.is_empty() {
                    return None;
                }

                match serde_json::from_slice::<Value>(&self.raw_body) {
                    Ok(Value::Object(params)) => Some(params),
                    Ok(_) => {
                        tracing::debug!("ignoring JSON body that is not an object");
                        None
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "ignoring invalid JSON body");
                        None
                    }
                }
            })
            .as_ref()
    }

    /// The body parameters in effect.
    ///
    /// When no body parameters were set explicitly, a form-encoded
    /// (or untyped) raw body is decoded instead, so that `PUT`,
    /// `PATCH` and `DELETE` bodies are available like `POST` ones.
    pub(crate) fn effective_body(&self) -> &Params {
        if !self.body.is_empty() {
            return &self.body;
        }

        self.form.get_or_init(|| {
            let decodable = match self.content_type() {
                Some(ct) => ct.is_form(),
                None => true,
            };

            if decodable && !self.raw_body.is_empty() {
                decode_pairs(&self.raw_body)
            } else {
                Params::new()
            }
        })
    }
}
