use super::Request;
use crate::Error;

use serde_json::{Map, Value};

impl Request {
    /// Fill the default parameters from the attached argument schema.
    pub fn set_default_params_from_args(&mut self) {
        self.defaults = self.attributes.args.defaults();
    }

    /// Run the sanitizer of every declared argument over its
    /// effective value.
    ///
    /// The value is replaced in whichever source provides it.
    /// Every failing argument is reported in a single
    /// `rest_invalid_param` error.
    pub fn sanitize_params(&mut self) -> Result<(), Error> {
        let mut invalid = Map::new();
        self.sanitize_into(&mut invalid);
        params_result(Vec::new(), invalid)
    }

    /// Check required arguments and run validators.
    ///
    /// Both checks always run over every argument. Missing
    /// arguments produce one `rest_missing_callback_param` error
    /// listing each of them (with any invalid arguments under
    /// `data.invalid`); otherwise failing validators produce one
    /// `rest_invalid_param` error.
    pub fn has_valid_params(&self) -> Result<(), Error> {
        let mut missing = Vec::new();
        let mut invalid = Map::new();
        self.validate_into(&mut missing, &mut invalid);
        params_result(missing, invalid)
    }

    /// Sanitize, then validate, reporting the failures of both
    /// steps in one error.
    ///
    /// An argument whose sanitizer failed keeps that failure
    /// rather than its validation result.
    pub fn check_params(&mut self) -> Result<(), Error> {
        let mut missing = Vec::new();
        let mut invalid = Map::new();
        self.sanitize_into(&mut invalid);
        self.validate_into(&mut missing, &mut invalid);
        params_result(missing, invalid)
    }

    fn sanitize_into(&mut self, invalid: &mut Map<String, Value>) {
        let args = self.attributes.args.clone();

        for (key, arg) in args.iter() {
            let source = match self.param_source(key) {
                Some(source) => source,
                None => continue,
            };

            let sanitized = match self.get_param(key) {
                Some(value) => arg.sanitize_value(value, self, key),
                None => continue,
            };

            match sanitized {
                Ok(value) => {
                    if let Some(bag) = self.bag_mut(source) {
                        bag.insert(key.to_owned(), value);
                    }
                }
                Err(detail) => {
                    invalid.insert(key.to_owned(), Value::String(detail));
                }
            }
        }
    }

    fn validate_into(&self, missing: &mut Vec<String>, invalid: &mut Map<String, Value>) {
        for (key, arg) in self.attributes.args.iter() {
            match self.get_param(key) {
                None | Some(Value::Null) => {
                    if arg.is_required() {
                        missing.push(key.to_owned());
                    }
                }
                Some(_) if invalid.contains_key(key) => {}
                Some(value) => {
                    if let Err(detail) = arg.validate_value(value, self, key) {
                        invalid.insert(key.to_owned(), Value::String(detail));
                    }
                }
            }
        }
    }
}

fn params_result(missing: Vec<String>, invalid: Map<String, Value>) -> Result<(), Error> {
    if !missing.is_empty() {
        let mut err = Error::missing_params(missing);
        if !invalid.is_empty() {
            err = err.with_data("invalid", invalid);
        }
        return Err(err);
    }

    if !invalid.is_empty() {
        return Err(Error::invalid_params(invalid));
    }

    Ok(())
}
