//! Read, write and expire cookies on a single request/response exchange.

use tracing::{debug, trace};

use crate::error::Result;
use super::cookie::{CookieRecord, COOKIE_EXPIRE_DELETE};

/// Incoming side of an exchange: something that carries request cookies.
pub trait CookieSource {
    /// Looks up the named cookie, supplying its name, value and raw header text.
    fn find_cookie(&self, name: &str) -> Result<CookieRecord>;
}

/// Outgoing side of an exchange: something that accepts `Set-Cookie` entries.
pub trait CookieSink {
    /// Appends one `Set-Cookie` header value.
    fn append_set_cookie(&mut self, line: String);
}

/// Returns the value of the named request cookie, or an empty string if
/// nothing was found.
///
/// A missing cookie, an unparseable one and a cookie whose value is empty all
/// read as `""`. Use `CookieSource::find_cookie` to tell them apart.
pub fn get<R: CookieSource + ?Sized>(name: &str, req: &R) -> String {
    match req.find_cookie(name) {
        Ok(cookie) => cookie.value,
        Err(err) => {
            trace!(cookie = name, error = %err, "cookie lookup failed");
            String::new()
        }
    }
}

/// Tells the browser to delete the named cookie.
///
/// Only acts if the request carries the cookie; the directive is scoped to
/// `Path=/` and has no domain, so a cookie set under another path or domain
/// is not reached.
pub fn remove<W, R>(name: &str, res: &mut W, req: &R)
where
    W: CookieSink + ?Sized,
    R: CookieSource + ?Sized,
{
    let mut cookie = match req.find_cookie(name) {
        Ok(cookie) => cookie,
        Err(err) => {
            trace!(cookie = name, error = %err, "nothing to remove");
            return;
        }
    };

    cookie.expires = Some(*COOKIE_EXPIRE_DELETE);
    cookie.max_age = -1;
    cookie.value.clear();
    cookie.path.clear();
    cookie.path.push('/');
    add(&cookie, res);
}

/// Writes the cookie to the response as one `Set-Cookie` entry.
///
/// A record that serializes to nothing (an empty or invalid name) leaves the
/// response untouched.
pub fn add<W: CookieSink + ?Sized>(cookie: &CookieRecord, res: &mut W) {
    let line = cookie.to_set_cookie();
    if line.is_empty() {
        debug!(cookie = %cookie.name, "skipping cookie with invalid name");
        return;
    }
    res.append_set_cookie(line);
}
