use super::access::CookieSink;
use super::cookie::CookieRecord;
use super::meta::{HeaderValue, HttpMeta};

/// The header side of an outgoing HTTP response.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub meta: HttpMeta,
}

impl HttpResponse {
    pub fn new(meta: HttpMeta) -> Self {
        Self { meta }
    }

    /// Raw `Set-Cookie` entries in the order they were added.
    pub fn set_cookie_lines(&self) -> Vec<&String> {
        self.meta
            .get_header("set-cookie")
            .map(HeaderValue::values)
            .unwrap_or_default()
    }

    /// Reparses the `Set-Cookie` entries, skipping any that do not parse.
    pub fn set_cookies(&self) -> Vec<CookieRecord> {
        self.set_cookie_lines()
            .into_iter()
            .filter_map(|line| CookieRecord::parse_set_cookie(line).ok())
            .collect()
    }

    /// Builder-style `add`, mirroring how handlers chain response changes.
    pub fn add_cookie(mut self, cookie: &CookieRecord) -> Self {
        super::access::add(cookie, &mut self);
        self
    }
}

impl CookieSink for HttpResponse {
    fn append_set_cookie(&mut self, line: String) {
        self.meta.add_header("set-cookie", line);
    }
}

impl CookieSink for HttpMeta {
    fn append_set_cookie(&mut self, line: String) {
        self.add_header("set-cookie", line);
    }
}
