use std::collections::HashMap;

use crate::error::{CookieError, Result};
use super::access::CookieSource;
use super::cookie::{find_in_header, parse_cookie_header, CookieRecord};
use super::meta::{HeaderValue, HttpMeta};
use super::safety::CookieSafety;

/// The header side of an incoming HTTP request, as far as cookies are concerned.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub meta: HttpMeta,
    safety: CookieSafety,
}

impl HttpRequest {
    pub fn new(meta: HttpMeta) -> Self {
        Self { meta, safety: CookieSafety::default() }
    }

    /// Builds a request carrying a single `Cookie` header line.
    ///
    /// # Examples
    /// ```rust
    /// use starberry_cookie::http::request::HttpRequest;
    /// let req = HttpRequest::with_cookie_header("sid=xyz; theme=dark");
    /// assert_eq!(starberry_cookie::get("theme", &req), "dark");
    /// ```
    pub fn with_cookie_header<T: Into<String>>(line: T) -> Self {
        let mut header = HashMap::new();
        header.insert("cookie".to_string(), HeaderValue::new(line));
        Self::new(HttpMeta::new(header))
    }

    /// Replaces the limits used while reading cookies.
    pub fn with_safety(self, safety: CookieSafety) -> Self {
        Self { safety, ..self }
    }

    pub fn meta(&self) -> &HttpMeta {
        &self.meta
    }

    pub fn safety(&self) -> &CookieSafety {
        &self.safety
    }

    /// `Cookie` header lines within the length limit.
    fn cookie_lines(&self) -> Vec<&String> {
        self.meta
            .get_header("cookie")
            .map(HeaderValue::values)
            .unwrap_or_default()
            .into_iter()
            .filter(|line| self.safety.check_header_len(line.len()))
            .collect()
    }

    /// Every well-formed cookie on the request, across all `Cookie` lines.
    pub fn cookies(&self) -> Vec<CookieRecord> {
        self.cookie_lines()
            .into_iter()
            .flat_map(|line| parse_cookie_header(line, None))
            .collect()
    }
}

impl CookieSource for HttpRequest {
    fn find_cookie(&self, name: &str) -> Result<CookieRecord> {
        let Some(header) = self.meta.get_header("cookie") else {
            return Err(CookieError::NotFound(name.to_string()));
        };

        let mut failure = CookieError::NotFound(name.to_string());
        for line in header.values() {
            if !self.safety.check_header_len(line.len()) {
                failure = CookieError::HeaderTooLarge(line.len());
                continue;
            }
            match find_in_header(line, name) {
                Ok(cookie) => return Ok(cookie),
                Err(CookieError::NotFound(_)) => {}
                Err(err) => failure = err,
            }
        }
        Err(failure)
    }
}
