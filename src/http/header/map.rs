use std::collections::hash_map::{self, HashMap};
use std::fmt;

/// Request headers, keyed by their canonical name.
///
/// Names are compared case-insensitively, with dashes and
/// underscores treated as equal, so `Content-Type`,
/// `content_type` and `CONTENT-TYPE` all address the same
/// header. A header may hold several values.
#[derive(Clone, Default)]
pub struct Headers {
    map: HashMap<String, Vec<String>>,
}

/// Returns the canonical form of a header name.
///
/// ```
/// use restwire::http::header::canonicalize;
///
/// assert_eq!(canonicalize("Test-Header"), "test_header");
/// assert_eq!(canonicalize("TEST-HEADER"), canonicalize("test_header"));
/// ```
pub fn canonicalize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

impl Headers {
    pub fn new() -> Headers {
        Headers {
            map: HashMap::with_capacity(16),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&canonicalize(name))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns every value of the header joined with `", "`.
    pub fn get(&self, name: &str) -> Option<String> {
        self.get_all(name).map(|values| values.join(", "))
    }

    /// Returns the values of the header in the order they were added.
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.map.get(&canonicalize(name)).map(Vec::as_slice)
    }

    /// Replace all values of a header.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.map.insert(canonicalize(name), vec![value.into()]);
    }

    /// Replace all values of a header with a list.
    pub fn insert_all<I, V>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();

        if values.is_empty() {
            self.map.remove(&canonicalize(name));
        } else {
            self.map.insert(canonicalize(name), values);
        }
    }

    /// Add a value to a header, keeping existing values.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        match self.map.entry(canonicalize(name)) {
            hash_map::Entry::Occupied(mut entry) => entry.get_mut().push(value.into()),
            hash_map::Entry::Vacant(entry) => {
                entry.insert(vec![value.into()]);
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.map.remove(&canonicalize(name))
    }

    /// Iterate over `(canonical name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().flat_map(|(name, values)| {
            values
                .iter()
                .map(move |value| (name.as_str(), value.as_str()))
        })
    }

    pub(crate) fn from_http(http: &http::HeaderMap) -> Self {
        let mut headers = Headers::new();

        for (name, value) in http {
            // values that are not visible ASCII are dropped
            if let Ok(value) = value.to_str() {
                headers.append(name.as_str(), value);
            }
        }

        headers
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_separators() {
        let mut headers = Headers::new();
        headers.insert("Test-Header", "value");

        assert_eq!(headers.get("test_header").as_deref(), Some("value"));
        assert_eq!(headers.get("TEST-HEADER").as_deref(), Some("value"));
        assert!(headers.contains("test-header"));
    }

    #[test]
    fn append_keeps_order() {
        let mut headers = Headers::new();
        headers.append("Accept", "application/json");
        headers.append("accept", "text/html");

        assert_eq!(
            headers.get("Accept").as_deref(),
            Some("application/json, text/html")
        );
        assert_eq!(
            headers.get_all("ACCEPT"),
            Some(&["application/json".to_owned(), "text/html".to_owned()][..])
        );

        headers.insert("accept", "*/*");
        assert_eq!(headers.get_all("accept").map(<[String]>::len), Some(1));
    }

    #[test]
    fn missing_header() {
        let mut headers = Headers::new();
        assert_eq!(headers.get("x"), None);
        assert_eq!(headers.get_all("x"), None);
        assert_eq!(headers.remove("x"), None);
        assert!(headers.is_empty());
    }
}
