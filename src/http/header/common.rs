/// A parsed `Content-Type` header.
///
/// ```
/// use restwire::http::header::ContentType;
///
/// let ct = ContentType::parse("Application/JSON; charset=utf-8").unwrap();
/// assert_eq!(ct.value, "application/json");
/// assert_eq!(ct.subtype, "json");
/// assert_eq!(ct.parameters, "charset=utf-8");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// `type/subtype`, lower-cased.
    pub value: String,
    /// The top-level media type.
    pub kind: String,
    pub subtype: String,
    /// Everything after the first `;`, or the empty string.
    pub parameters: String,
}

impl ContentType {
    /// Parse a raw header value.
    ///
    /// Returns `None` for an empty header, or one without a
    /// `type/subtype` pair.
    pub fn parse(header: &str) -> Option<ContentType> {
        if header.trim().is_empty() {
            return None;
        }

        let (value, parameters) = match header.split_once(';') {
            Some((value, parameters)) => (value, parameters),
            None => (header, ""),
        };

        let value = value.trim().to_ascii_lowercase();
        let (kind, subtype) = value.split_once('/')?;

        Some(ContentType {
            kind: kind.trim().to_owned(),
            subtype: subtype.trim().to_owned(),
            parameters: parameters.trim().to_owned(),
            value: value.clone(),
        })
    }

    /// Whether this is `application/json` or a `+json` media type.
    pub fn is_json(&self) -> bool {
        match self.value.parse::<mime::Mime>() {
            Ok(mime) => mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON),
            Err(_) => false,
        }
    }

    /// Whether this is `application/x-www-form-urlencoded`.
    pub fn is_form(&self) -> bool {
        self.value == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_parameters() {
        let ct = ContentType::parse("text/HTML").unwrap();
        assert_eq!(ct.value, "text/html");
        assert_eq!(ct.kind, "text");
        assert_eq!(ct.subtype, "html");
        assert_eq!(ct.parameters, "");
    }

    #[test]
    fn splits_on_first_semicolon() {
        let ct = ContentType::parse("multipart/form-data; boundary=a;b").unwrap();
        assert_eq!(ct.value, "multipart/form-data");
        assert_eq!(ct.parameters, "boundary=a;b");
    }

    #[test]
    fn missing_or_malformed() {
        assert_eq!(ContentType::parse(""), None);
        assert_eq!(ContentType::parse("   "), None);
        assert_eq!(ContentType::parse("json"), None);
    }

    #[test]
    fn json_detection() {
        let json = |s| ContentType::parse(s).unwrap().is_json();
        assert!(json("application/json"));
        assert!(json("application/json; charset=UTF-8"));
        assert!(json("application/vnd.api+json"));
        assert!(!json("text/plain"));
        assert!(!json("application/x-www-form-urlencoded"));
    }

    #[test]
    fn form_detection() {
        let ct = ContentType::parse("application/x-www-form-urlencoded; charset=utf-8").unwrap();
        assert!(ct.is_form());
        assert!(!ct.is_json());
    }
}
