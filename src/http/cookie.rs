use chrono::{DateTime, Datelike, Months, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{CookieError, Result};
use super::domain::{is_valid_cookie_domain, is_valid_domain_attribute, strip_port};

/// May be set on `CookieRecord::expires` to make the browser drop the cookie at once.
pub static COOKIE_EXPIRE_DELETE: Lazy<DateTime<Utc>> = Lazy::new(|| {
    Utc.with_ymd_and_hms(2009, 11, 10, 23, 0, 0)
        .single()
        .expect("fixed deletion timestamp is valid")
});

/// Practically infinite expiry: fifty years after first use in this process.
pub static COOKIE_EXPIRE_UNLIMITED: Lazy<DateTime<Utc>> = Lazy::new(|| {
    Utc::now()
        .checked_add_months(Months::new(50 * 12))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
});

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
const HTTP_DATE_DASHED: &str = "%a, %d-%b-%Y %H:%M:%S GMT";

static COOKIE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[!#$%&'*+.^_`|~0-9A-Za-z-]+$").expect("cookie name pattern compiles"));

/// Returns true if `name` is a valid RFC 6265 cookie name (an HTTP token).
pub fn is_valid_cookie_name(name: &str) -> bool {
    COOKIE_NAME.is_match(name)
}

fn is_valid_value_byte(b: u8) -> bool {
    (0x20..0x7f).contains(&b) && b != b'"' && b != b';' && b != b'\\'
}

/// The `SameSite` attribute. `Default` is never written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    #[default]
    Default,
    Lax,
    Strict,
    None,
}

impl SameSite {
    fn as_attr(&self) -> Option<&'static str> {
        match self {
            SameSite::Default => None,
            SameSite::Lax => Some("Lax"),
            SameSite::Strict => Some("Strict"),
            SameSite::None => Some("None"),
        }
    }
}

/// One cookie with its full attribute set.
///
/// A record built with `new` is a session cookie with no attributes. Records
/// taken from a `CookiePool` start from a different baseline, see
/// `CookiePool::acquire`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub path: String,
    pub domain: String,
    pub expires: Option<DateTime<Utc>>,
    /// `0` leaves Max-Age out, negative deletes the cookie now, positive is seconds.
    pub max_age: i64,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    /// Header text the record was parsed from, empty otherwise.
    pub raw: String,
}

impl CookieRecord {
    /// Creates a session cookie with the given name and value.
    ///
    /// # Examples
    /// ```rust
    /// use starberry_cookie::CookieRecord;
    /// let cookie = CookieRecord::new("sid", "xyz").path("/").http_only(true);
    /// assert_eq!(cookie.to_string(), "sid=xyz; Path=/; HttpOnly");
    /// ```
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    /// Puts the record back into the state handed out by `CookiePool::acquire`.
    /// String buffers keep their capacity.
    pub(crate) fn reset(&mut self) {
        self.name.clear();
        self.value.clear();
        self.path.clear();
        self.domain.clear();
        self.raw.clear();
        self.expires = Some(*COOKIE_EXPIRE_UNLIMITED);
        self.max_age = -1;
        self.http_only = true;
        self.secure = false;
        self.same_site = SameSite::Default;
    }

    pub fn path<T: Into<String>>(self, path: T) -> Self {
        Self { path: path.into(), ..self }
    }

    pub fn domain<T: Into<String>>(self, domain: T) -> Self {
        Self { domain: domain.into(), ..self }
    }

    pub fn expires(self, expires: DateTime<Utc>) -> Self {
        Self { expires: Some(expires), ..self }
    }

    pub fn max_age(self, max_age: i64) -> Self {
        Self { max_age, ..self }
    }

    pub fn http_only(self, http_only: bool) -> Self {
        Self { http_only, ..self }
    }

    pub fn secure(self, secure: bool) -> Self {
        Self { secure, ..self }
    }

    pub fn same_site(self, same_site: SameSite) -> Self {
        Self { same_site, ..self }
    }

    /// Sets `domain` from a request host only if browsers would honour it as a
    /// cookie domain. A `:port` suffix is ignored. Returns whether the domain was set.
    ///
    /// # Examples
    /// ```rust
    /// use starberry_cookie::CookieRecord;
    /// let mut cookie = CookieRecord::new("sid", "xyz");
    /// assert!(!cookie.set_domain_if_valid("localhost:8080"));
    /// assert!(cookie.set_domain_if_valid("app.example.com:443"));
    /// assert_eq!(cookie.domain, "app.example.com");
    /// ```
    pub fn set_domain_if_valid(&mut self, host: &str) -> bool {
        let host = strip_port(host);
        if !is_valid_domain_attribute(host) || !is_valid_cookie_domain(host) {
            return false;
        }
        self.domain.clear();
        self.domain.push_str(host);
        true
    }

    /// Serializes the record as a `Set-Cookie` header value.
    ///
    /// Returns an empty string if the name is not a valid token. Invalid bytes
    /// are dropped from the value and path rather than rejected; a domain that
    /// is not a plain host name or bracketed address is left out.
    pub fn to_set_cookie(&self) -> String {
        if !is_valid_cookie_name(&self.name) {
            return String::new();
        }

        let mut result = format!("{}={}", self.name, sanitize_value(&self.value));
        if !self.path.is_empty() {
            result.push_str("; Path=");
            result.push_str(&sanitize_path(&self.path));
        }
        if !self.domain.is_empty() {
            let domain = self.domain.strip_prefix('.').unwrap_or(&self.domain);
            if is_valid_domain_attribute(domain) {
                result.push_str("; Domain=");
                result.push_str(domain);
            } else {
                debug!(cookie = %self.name, domain = ?self.domain, "dropping invalid cookie domain");
            }
        }
        if let Some(expires) = self.expires {
            if expires.year() >= 1601 {
                result.push_str("; Expires=");
                result.push_str(&format_http_date(&expires));
            }
        }
        if self.max_age > 0 {
            result.push_str(&format!("; Max-Age={}", self.max_age));
        } else if self.max_age < 0 {
            result.push_str("; Max-Age=0");
        }
        if self.http_only {
            result.push_str("; HttpOnly");
        }
        if self.secure {
            result.push_str("; Secure");
        }
        if let Some(same_site) = self.same_site.as_attr() {
            result.push_str("; SameSite=");
            result.push_str(same_site);
        }
        result
    }

    /// Parses a `Set-Cookie` header value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use starberry_cookie::CookieRecord;
    ///
    /// let cookie = CookieRecord::parse_set_cookie("sid=abc123; Path=/; Max-Age=0; HttpOnly").unwrap();
    /// assert_eq!(cookie.name, "sid");
    /// assert_eq!(cookie.value, "abc123");
    /// assert_eq!(cookie.path, "/");
    /// assert_eq!(cookie.max_age, -1);
    /// assert!(cookie.http_only);
    /// ```
    pub fn parse_set_cookie(line: &str) -> Result<Self> {
        let mut parts = line.trim().split(';');
        let first = parts.next().unwrap_or("");

        let (name, value) = first
            .split_once('=')
            .ok_or_else(|| CookieError::Malformed(format!("missing '=' in {:?}", first)))?;
        let name = name.trim();
        if !is_valid_cookie_name(name) {
            return Err(CookieError::InvalidName(name.to_string()));
        }
        let value = parse_value(value.trim())
            .ok_or_else(|| CookieError::Malformed(format!("invalid value for {}", name)))?;

        let mut cookie = CookieRecord::new(name, value);
        cookie.raw = line.to_string();

        for attr in parts {
            let attr = attr.trim();
            if attr.is_empty() {
                continue;
            }
            let (key, val) = match attr.split_once('=') {
                Some((key, val)) => (key.trim(), val.trim()),
                None => (attr, ""),
            };

            match key.to_ascii_lowercase().as_str() {
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                "path" => cookie.path = val.to_string(),
                "domain" => cookie.domain = val.to_string(),
                "samesite" => {
                    cookie.same_site = match val.to_ascii_lowercase().as_str() {
                        "lax" => SameSite::Lax,
                        "strict" => SameSite::Strict,
                        "none" => SameSite::None,
                        _ => SameSite::Default,
                    }
                }
                "max-age" => {
                    // Leading zeros are not allowed by RFC 6265
                    if let Ok(secs) = val.parse::<i64>() {
                        if secs == 0 || !val.starts_with('0') {
                            cookie.max_age = if secs <= 0 { -1 } else { secs };
                        }
                    }
                }
                "expires" => {
                    if let Some(expires) = parse_http_date(val) {
                        cookie.expires = Some(expires);
                    }
                }
                _ => {} // Ignore unknown attributes
            }
        }

        Ok(cookie)
    }
}

impl std::fmt::Display for CookieRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_set_cookie())
    }
}

/// Parses a request `Cookie` header line into records.
///
/// Entries with an invalid name or value are skipped. When `filter` is given
/// only cookies of that name are returned. Every record keeps `line` as `raw`.
///
/// # Examples
///
/// ```rust
/// use starberry_cookie::http::cookie::parse_cookie_header;
///
/// let cookies = parse_cookie_header("sid=abc123; theme=\"dark\"; bad name=1", None);
/// assert_eq!(cookies.len(), 2);
/// assert_eq!(cookies[1].value, "dark");
/// ```
pub fn parse_cookie_header(line: &str, filter: Option<&str>) -> Vec<CookieRecord> {
    line.split(';')
        .filter_map(|part| parse_pair(part, line).ok())
        .filter(|cookie| filter.is_none_or(|name| cookie.name == name))
        .collect()
}

/// Finds the first cookie named `name` in a request `Cookie` header line.
///
/// Distinguishes a missing cookie from one whose entry could not be parsed.
pub(crate) fn find_in_header(line: &str, name: &str) -> Result<CookieRecord> {
    let mut failure = None;
    for part in line.split(';') {
        let part_name = part.split_once('=').map_or(part, |(n, _)| n).trim();
        if part_name != name {
            continue;
        }
        match parse_pair(part, line) {
            Ok(cookie) => return Ok(cookie),
            Err(err) => failure = Some(err),
        }
    }
    Err(failure.unwrap_or_else(|| CookieError::NotFound(name.to_string())))
}

fn parse_pair(part: &str, raw: &str) -> Result<CookieRecord> {
    let part = part.trim();
    if part.is_empty() {
        return Err(CookieError::Malformed("empty cookie entry".to_string()));
    }
    let (name, value) = part.split_once('=').unwrap_or((part, ""));
    let name = name.trim();
    if !is_valid_cookie_name(name) {
        return Err(CookieError::InvalidName(name.to_string()));
    }
    let value = parse_value(value)
        .ok_or_else(|| CookieError::Malformed(format!("invalid value for {}", name)))?;

    let mut cookie = CookieRecord::new(name, value);
    cookie.raw = raw.to_string();
    Ok(cookie)
}

/// Strips one pair of surrounding double quotes and checks every byte.
fn parse_value(value: &str) -> Option<&str> {
    let value = if value.len() > 1 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    };
    value.bytes().all(is_valid_value_byte).then_some(value)
}

fn sanitize_value(value: &str) -> String {
    let cleaned: String = value.chars().filter(|c| c.is_ascii() && is_valid_value_byte(*c as u8)).collect();
    if cleaned.contains(' ') || cleaned.contains(',') {
        format!("\"{}\"", cleaned)
    } else {
        cleaned
    }
}

fn sanitize_path(path: &str) -> String {
    path.chars().filter(|c| (' '..='~').contains(c) && *c != ';').collect()
}

/// Formats a timestamp as an HTTP-date, e.g. `Tue, 10 Nov 2009 23:00:00 GMT`.
pub fn format_http_date(time: &DateTime<Utc>) -> String {
    time.format(HTTP_DATE).to_string()
}

/// Parses an HTTP-date, also accepting the dashed `02-Jan-2006` variant.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    [HTTP_DATE, HTTP_DATE_DASHED]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert_eq!(format_http_date(&COOKIE_EXPIRE_DELETE), "Tue, 10 Nov 2009 23:00:00 GMT");
        assert_eq!(COOKIE_EXPIRE_DELETE.timestamp(), 1_257_894_000);

        let years = COOKIE_EXPIRE_UNLIMITED.year() - Utc::now().year();
        assert!((49..=50).contains(&years), "unlimited expiry is {} years out", years);
    }

    #[test]
    fn test_new_is_session_cookie() {
        let cookie = CookieRecord::new("sid", "xyz");
        assert_eq!(cookie.expires, None);
        assert_eq!(cookie.max_age, 0);
        assert!(!cookie.http_only);
        assert_eq!(cookie.to_string(), "sid=xyz");
    }

    #[test]
    fn test_full_serialization() {
        let cookie = CookieRecord::new("sid", "xyz")
            .path("/app")
            .domain(".example.com")
            .expires(*COOKIE_EXPIRE_DELETE)
            .max_age(3600)
            .http_only(true)
            .secure(true)
            .same_site(SameSite::Lax);
        assert_eq!(
            cookie.to_set_cookie(),
            "sid=xyz; Path=/app; Domain=example.com; Expires=Tue, 10 Nov 2009 23:00:00 GMT; \
             Max-Age=3600; HttpOnly; Secure; SameSite=Lax"
        );
    }

    #[test]
    fn test_negative_max_age_serializes_as_zero() {
        let cookie = CookieRecord::new("sid", "").max_age(-1);
        assert_eq!(cookie.to_string(), "sid=; Max-Age=0");
    }

    #[test]
    fn test_invalid_name_serializes_empty() {
        assert_eq!(CookieRecord::new("", "x").to_set_cookie(), "");
        assert_eq!(CookieRecord::new("bad name", "x").to_set_cookie(), "");
        assert_eq!(CookieRecord::new("a;b", "x").to_set_cookie(), "");
    }

    #[test]
    fn test_value_sanitizing() {
        assert_eq!(CookieRecord::new("a", "x\"y;z\\w").to_string(), "a=xyzw");
        assert_eq!(CookieRecord::new("a", "hello world").to_string(), "a=\"hello world\"");
        assert_eq!(CookieRecord::new("a", "1,2").to_string(), "a=\"1,2\"");
        assert_eq!(CookieRecord::new("a", "caf\u{e9}").to_string(), "a=caf");
        assert_eq!(CookieRecord::new("a", "x").path("/a;b\n").to_string(), "a=x; Path=/ab");
    }

    #[test]
    fn test_invalid_domain_is_omitted() {
        for domain in ["evil.com; SameSite=None", "evil .com", "evil.com\r\nX-Injected: 1", ".", "[::1"] {
            let line = CookieRecord::new("sid", "xyz").domain(domain).to_set_cookie();
            assert_eq!(line, "sid=xyz", "domain {:?} leaked into {:?}", domain, line);
        }
        assert_eq!(CookieRecord::new("a", "x").domain("[::1]").to_string(), "a=x; Domain=[::1]");
    }

    #[test]
    fn test_set_domain_if_valid_rejects_header_text() {
        let mut cookie = CookieRecord::new("sid", "xyz");
        assert!(!cookie.set_domain_if_valid("evil.com; SameSite=None\r\nX-Injected: 1"));
        assert!(!cookie.set_domain_if_valid("evil .com"));
        assert!(cookie.domain.is_empty());
    }

    #[test]
    fn test_ancient_expiry_is_omitted() {
        let ancient = Utc.with_ymd_and_hms(1600, 1, 1, 0, 0, 0).single().unwrap();
        assert_eq!(CookieRecord::new("a", "x").expires(ancient).to_string(), "a=x");
    }

    #[test]
    fn test_reset() {
        let mut cookie = CookieRecord::new("sid", "xyz").path("/").domain("example.com").secure(true);
        cookie.raw = "sid=xyz".to_string();
        cookie.reset();
        assert!(cookie.name.is_empty() && cookie.value.is_empty());
        assert!(cookie.path.is_empty() && cookie.domain.is_empty() && cookie.raw.is_empty());
        assert_eq!(cookie.expires, Some(*COOKIE_EXPIRE_UNLIMITED));
        assert_eq!(cookie.max_age, -1);
        assert!(cookie.http_only);
        assert!(!cookie.secure);
        assert_eq!(cookie.same_site, SameSite::Default);
    }

    #[test]
    fn test_parse_cookie_header() {
        let line = "sid=abc123; theme=\"dark\";  ; lang=en";
        let cookies = parse_cookie_header(line, None);
        let names: Vec<&str> = cookies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["sid", "theme", "lang"]);
        assert_eq!(cookies[1].value, "dark");
        assert!(cookies.iter().all(|c| c.raw == line));

        let only = parse_cookie_header(line, Some("lang"));
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].value, "en");
    }

    #[test]
    fn test_parse_cookie_header_skips_invalid() {
        let cookies = parse_cookie_header("bad name=1; ok=2; worse=a\\b; flag", None);
        let pairs: Vec<(&str, &str)> = cookies.iter().map(|c| (c.name.as_str(), c.value.as_str())).collect();
        assert_eq!(pairs, [("ok", "2"), ("flag", "")]);
    }

    #[test]
    fn test_find_in_header() {
        assert_eq!(find_in_header("a=1; b=2", "b").unwrap().value, "2");
        assert_eq!(find_in_header("a=1", "b"), Err(CookieError::NotFound("b".to_string())));
        assert!(matches!(find_in_header("b=x\\y", "b"), Err(CookieError::Malformed(_))));
        // A later valid entry wins over an earlier broken one
        assert_eq!(find_in_header("b=x\\y; b=ok", "b").unwrap().value, "ok");
    }

    #[test]
    fn test_parse_set_cookie_attributes() {
        let line = "sid=\"abc\"; path=/; DOMAIN=example.com; Expires=Tue, 10 Nov 2009 23:00:00 GMT; \
                    Max-Age=60; secure; HttpOnly; SameSite=Strict; Foo=bar";
        let cookie = CookieRecord::parse_set_cookie(line).unwrap();
        assert_eq!(cookie.name, "sid");
        assert_eq!(cookie.value, "abc");
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.domain, "example.com");
        assert_eq!(cookie.expires, Some(*COOKIE_EXPIRE_DELETE));
        assert_eq!(cookie.max_age, 60);
        assert!(cookie.secure && cookie.http_only);
        assert_eq!(cookie.same_site, SameSite::Strict);
        assert_eq!(cookie.raw, line);
    }

    #[test]
    fn test_parse_set_cookie_max_age_rules() {
        let parse = |line: &str| CookieRecord::parse_set_cookie(line).unwrap().max_age;
        assert_eq!(parse("a=1; Max-Age=0"), -1);
        assert_eq!(parse("a=1; Max-Age=-5"), -1);
        assert_eq!(parse("a=1; Max-Age=010"), 0);
        assert_eq!(parse("a=1; Max-Age=abc"), 0);
    }

    #[test]
    fn test_parse_set_cookie_rejects() {
        assert!(matches!(CookieRecord::parse_set_cookie("novalue"), Err(CookieError::Malformed(_))));
        assert!(matches!(CookieRecord::parse_set_cookie("=x"), Err(CookieError::InvalidName(_))));
        assert!(matches!(CookieRecord::parse_set_cookie("a=b\"c"), Err(CookieError::Malformed(_))));
    }

    #[test]
    fn test_http_date_variants() {
        let expected = Some(*COOKIE_EXPIRE_DELETE);
        assert_eq!(parse_http_date("Tue, 10 Nov 2009 23:00:00 GMT"), expected);
        assert_eq!(parse_http_date("Tue, 10-Nov-2009 23:00:00 GMT"), expected);
        assert_eq!(parse_http_date("yesterday"), None);
    }
}
