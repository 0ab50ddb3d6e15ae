//! Per-parameter constraints declared by an endpoint.

use crate::{Error, Request};

use serde_json::{json, Map, Number, Value};

use std::fmt;
use std::sync::Arc;

type Sanitizer = Arc<dyn Fn(&Value, &Request, &str) -> Result<Value, String> + Send + Sync>;
type Validator = Arc<dyn Fn(&Value, &Request, &str) -> Result<(), String> + Send + Sync>;

/// The JSON type a parameter is declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ArgType {
    pub fn as_str(self) -> &'static str {
        match self {
            ArgType::String => "string",
            ArgType::Integer => "integer",
            ArgType::Number => "number",
            ArgType::Boolean => "boolean",
            ArgType::Array => "array",
            ArgType::Object => "object",
        }
    }

    /// Convert loosely typed input, such as query string values,
    /// into this type. Values that cannot be converted are returned
    /// unchanged, and left for validation to reject.
    pub fn coerce(self, value: &Value) -> Value {
        let coerced = match (self, value) {
            (ArgType::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (ArgType::Integer, Value::Number(n)) if n.is_f64() => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f))
                .map(|f| Value::from(f as i64)),
            (ArgType::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            (ArgType::Boolean, Value::String(s)) => match s.as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" | "" => Some(Value::Bool(false)),
                _ => None,
            },
            (ArgType::Boolean, Value::Number(n)) => match n.as_i64() {
                Some(1) => Some(Value::Bool(true)),
                Some(0) => Some(Value::Bool(false)),
                _ => None,
            },
            (ArgType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (ArgType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (ArgType::Array, Value::String(s)) => Some(Value::Array(
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(Value::from)
                    .collect(),
            )),
            _ => None,
        };

        coerced.unwrap_or_else(|| value.clone())
    }

    /// Whether `value` is of this type.
    pub fn check(self, value: &Value) -> bool {
        match self {
            ArgType::String => value.is_string(),
            ArgType::Integer => value.is_i64() || value.is_u64(),
            ArgType::Number => value.is_number(),
            ArgType::Boolean => value.is_boolean(),
            ArgType::Array => value.is_array(),
            ArgType::Object => value.is_object(),
        }
    }
}

/// A value returned by a validate callback.
///
/// Implemented for `bool`, where `false` means invalid, and for
/// `Result<(), Error>`, where the error message becomes the failure
/// detail.
pub trait Verdict {
    fn into_verdict(self) -> Result<(), String>;
}

impl Verdict for bool {
    fn into_verdict(self) -> Result<(), String> {
        if self {
            Ok(())
        } else {
            Err("Invalid parameter.".to_owned())
        }
    }
}

impl Verdict for Result<(), Error> {
    fn into_verdict(self) -> Result<(), String> {
        self.map_err(|err| err.message().to_owned())
    }
}

/// A value returned by a sanitize callback.
pub trait Sanitized {
    fn into_sanitized(self) -> Result<Value, String>;
}

impl Sanitized for Value {
    fn into_sanitized(self) -> Result<Value, String> {
        Ok(self)
    }
}

impl Sanitized for Result<Value, Error> {
    fn into_sanitized(self) -> Result<Value, String> {
        self.map_err(|err| err.message().to_owned())
    }
}

/// Constraints on a single request parameter.
///
/// ```
/// use restwire::{Arg, ArgType};
///
/// let per_page = Arg::new()
///     .kind(ArgType::Integer)
///     .default(10)
///     .validate(|value, _, _| value.as_i64().map_or(false, |n| (1..=100).contains(&n)));
/// ```
#[derive(Clone, Default)]
pub struct Arg {
    required: bool,
    default: Option<Value>,
    kind: Option<ArgType>,
    choices: Option<Vec<Value>>,
    description: Option<String>,
    sanitize: Option<Sanitizer>,
    validate: Option<Validator>,
}

impl Arg {
    pub fn new() -> Self {
        Default::default()
    }

    /// Mark the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The value used when no source provides one.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Declare the parameter's type.
    ///
    /// Without explicit callbacks, the type is used to coerce
    /// the value during sanitization and to check it during validation.
    pub fn kind(mut self, kind: ArgType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restrict the parameter to a fixed set of values.
    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the parameter's value before validation.
    pub fn sanitize<F, S>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Request, &str) -> S + Send + Sync + 'static,
        S: Sanitized,
    {
        self.sanitize = Some(Arc::new(move |value: &Value, req: &Request, key: &str| {
            f(value, req, key).into_sanitized()
        }));
        self
    }

    /// Check the parameter's value.
    ///
    /// The callback only runs when the parameter is present.
    pub fn validate<F, V>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Request, &str) -> V + Send + Sync + 'static,
        V: Verdict,
    {
        self.validate = Some(Arc::new(move |value: &Value, req: &Request, key: &str| {
            f(value, req, key).into_verdict()
        }));
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub(crate) fn sanitize_value(
        &self,
        value: &Value,
        req: &Request,
        key: &str,
    ) -> Result<Value, String> {
        match (&self.sanitize, self.kind) {
            (Some(sanitize), _) => sanitize(value, req, key),
            (None, Some(kind)) => Ok(kind.coerce(value)),
            (None, None) => Ok(value.clone()),
        }
    }

    pub(crate) fn validate_value(
        &self,
        value: &Value,
        req: &Request,
        key: &str,
    ) -> Result<(), String> {
        if let Some(validate) = &self.validate {
            return validate(value, req, key);
        }

        if let Some(kind) = self.kind {
            if !kind.check(value) {
                return Err(format!("{} is not of type {}.", key, kind.as_str()));
            }
        }

        if let Some(choices) = &self.choices {
            if !choices.contains(value) {
                let choices = choices
                    .iter()
                    .map(|choice| match choice {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>();

                return Err(format!("{} is not one of {}.", key, choices.join(", ")));
            }
        }

        Ok(())
    }

    /// The public description of this argument, as listed by discovery.
    pub fn describe(&self) -> Value {
        let mut out = Map::new();
        out.insert("required".to_owned(), json!(self.required));

        if let Some(default) = &self.default {
            out.insert("default".to_owned(), default.clone());
        }
        if let Some(kind) = self.kind {
            out.insert("type".to_owned(), json!(kind.as_str()));
        }
        if let Some(choices) = &self.choices {
            out.insert("enum".to_owned(), Value::Array(choices.clone()));
        }
        if let Some(description) = &self.description {
            out.insert("description".to_owned(), json!(description));
        }

        Value::Object(out)
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arg")
            .field("required", &self.required)
            .field("default", &self.default)
            .field("kind", &self.kind)
            .field("choices", &self.choices)
            .field("sanitize", &self.sanitize.is_some())
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// The argument schema of an endpoint, in declaration order.
#[derive(Clone, Default, Debug)]
pub struct Args(Vec<(String, Arg)>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an argument, replacing any previous declaration with the same name.
    pub fn insert(&mut self, name: impl Into<String>, arg: Arg) {
        let name = name.into();

        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = arg,
            None => self.0.push((name, arg)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, arg)| arg)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arg)> {
        self.0.iter().map(|(key, arg)| (key.as_str(), arg))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The default values declared by the schema.
    pub fn defaults(&self) -> Map<String, Value> {
        self.0
            .iter()
            .filter_map(|(key, arg)| Some((key.clone(), arg.default.clone()?)))
            .collect()
    }

    pub fn describe(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, arg)| (key.clone(), arg.describe()))
                .collect(),
        )
    }
}

impl<S> FromIterator<(S, Arg)> for Args
where
    S: Into<String>,
{
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (S, Arg)>,
    {
        let mut args = Args::new();
        for (name, arg) in iter {
            args.insert(name, arg);
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_coercion() {
        assert_eq!(ArgType::Integer.coerce(&json!("42")), json!(42));
        assert_eq!(ArgType::Integer.coerce(&json!(" 7 ")), json!(7));
        assert_eq!(ArgType::Integer.coerce(&json!("4.5")), json!("4.5"));
        assert_eq!(ArgType::Integer.coerce(&json!(3.0)), json!(3));
    }

    #[test]
    fn out_of_range_floats_stay_floats() {
        let huge = json!(1e30);
        assert_eq!(ArgType::Integer.coerce(&huge), huge);
        assert!(!ArgType::Integer.check(&ArgType::Integer.coerce(&huge)));

        let edge = json!(9_223_372_036_854_775_808.0);
        assert_eq!(ArgType::Integer.coerce(&edge), edge);
        assert_eq!(ArgType::Integer.coerce(&json!(-9_223_372_036_854_775_808.0)), json!(i64::MIN));
    }

    #[test]
    fn boolean_and_array_coercion() {
        assert_eq!(ArgType::Boolean.coerce(&json!("1")), json!(true));
        assert_eq!(ArgType::Boolean.coerce(&json!("false")), json!(false));
        assert_eq!(ArgType::Boolean.coerce(&json!("maybe")), json!("maybe"));
        assert_eq!(ArgType::Array.coerce(&json!("a, b,,c")), json!(["a", "b", "c"]));
    }

    #[test]
    fn type_check() {
        assert!(ArgType::Integer.check(&json!(1)));
        assert!(!ArgType::Integer.check(&json!(1.5)));
        assert!(ArgType::Number.check(&json!(1.5)));
        assert!(!ArgType::String.check(&json!(1)));
    }

    #[test]
    fn insert_replaces_by_name() {
        let mut args = Args::new();
        args.insert("id", Arg::new());
        args.insert("id", Arg::new().required());
        assert_eq!(args.len(), 1);
        assert!(args.get("id").unwrap().is_required());
    }

    #[test]
    fn defaults_and_description() {
        let args: Args = vec![
            ("page", Arg::new().kind(ArgType::Integer).default(1)),
            ("search", Arg::new().description("Limit results.")),
        ]
        .into_iter()
        .collect();

        assert_eq!(args.defaults().get("page"), Some(&json!(1)));
        assert_eq!(args.defaults().get("search"), None);
        assert_eq!(
            args.describe(),
            json!({
                "page": { "required": false, "default": 1, "type": "integer" },
                "search": { "required": false, "description": "Limit results." }
            })
        );
    }
}
