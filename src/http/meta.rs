use std::collections::HashMap;

/// Represents a value for an HTTP header, which can be either a single string or multiple values.
///
/// Repeated headers such as `Cookie` lines or `Set-Cookie` entries are kept as
/// separate values instead of being folded together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    /// A single header value
    Single(String),
    /// Multiple header values
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// Create a new HeaderValue from a single string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use starberry_cookie::http::meta::HeaderValue;
    /// let header = HeaderValue::new("sid=abc123");
    /// assert_eq!(header.len(), 1);
    /// ```
    pub fn new<T: Into<String>>(value: T) -> Self {
        HeaderValue::Single(value.into())
    }

    /// Keeps `value` as its own entry, the way repeated `Cookie` and
    /// `Set-Cookie` lines must stay apart.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use starberry_cookie::http::meta::HeaderValue;
    /// let mut cookies = HeaderValue::new("sessionId=abc123; Path=/");
    /// cookies.add_without_combining("theme=dark; Path=/; Max-Age=3600");
    ///
    /// let values = cookies.values();
    /// assert_eq!(values[0], "sessionId=abc123; Path=/");
    /// assert_eq!(values[1], "theme=dark; Path=/; Max-Age=3600");
    /// ```
    pub fn add_without_combining<T: Into<String>>(&mut self, value: T) {
        let value = value.into();
        match self {
            HeaderValue::Multiple(values) => values.push(value),
            HeaderValue::Single(first) => {
                let first = std::mem::take(first);
                *self = HeaderValue::Multiple(vec![first, value]);
            }
        }
    }

    /// Returns the number of values in this HeaderValue.
    pub fn len(&self) -> usize {
        match self {
            HeaderValue::Single(_) => 1,
            HeaderValue::Multiple(v) => v.len(),
        }
    }

    /// `true` if there are no values or only empty strings.
    pub fn is_empty(&self) -> bool {
        match self {
            HeaderValue::Single(s) => s.is_empty(),
            HeaderValue::Multiple(v) => v.iter().all(|s| s.is_empty()),
        }
    }

    /// All values in insertion order.
    pub fn values(&self) -> Vec<&String> {
        match self {
            HeaderValue::Single(s) => vec![s],
            HeaderValue::Multiple(v) => v.iter().collect(),
        }
    }

    /// Renders one `Name: value` line per value, each terminated by CRLF.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use starberry_cookie::http::meta::HeaderValue;
    /// let mut header = HeaderValue::new("a=1");
    /// header.add_without_combining("b=2");
    /// assert_eq!(header.into_header_string("Set-Cookie"), "Set-Cookie: a=1\r\nSet-Cookie: b=2\r\n");
    /// ```
    pub fn into_header_string(&self, header_name: &str) -> String {
        self.values()
            .iter()
            .map(|value| format!("{}: {}\r\n", header_name, value))
            .collect()
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Single(value)
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Single(value.to_string())
    }
}

/// Header section of a request or response. Names are stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpMeta {
    pub header: HashMap<String, HeaderValue>,
}

impl HttpMeta {
    pub fn new(header: HashMap<String, HeaderValue>) -> Self {
        let header = header
            .into_iter()
            .map(|(key, value)| (key.to_ascii_lowercase(), value))
            .collect();
        Self { header }
    }

    /// Gets a header by case-insensitive name.
    pub fn get_header<T: AsRef<str>>(&self, key: T) -> Option<&HeaderValue> {
        self.header.get(&key.as_ref().to_ascii_lowercase())
    }

    /// Sets a header, replacing all existing values.
    pub fn set_header<K: AsRef<str>, V: Into<HeaderValue>>(&mut self, key: K, value: V) {
        self.header.insert(key.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Adds a header value, keeping any existing values under the same name.
    pub fn add_header<K: AsRef<str>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.as_ref().to_ascii_lowercase();
        match self.header.get_mut(&key) {
            Some(existing) => existing.add_without_combining(value),
            None => {
                self.header.insert(key, HeaderValue::new(value));
            }
        }
    }

    /// Renders the header section as CRLF-terminated lines, sorted by header name.
    pub fn represent(&self) -> String {
        let mut keys: Vec<&String> = self.header.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| self.header[key].into_header_string(key))
            .collect()
    }
}
