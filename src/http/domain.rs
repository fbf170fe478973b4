/// Returns true if `domain` can be used as the `Domain` attribute of a cookie,
/// i.e. the browser recognises it as a domain whose subdomains share the cookie.
///
/// Loopback literals, dot-less hosts such as `localhost` and dotted-quad
/// addresses are rejected; for those the `Domain` attribute should be left
/// unset so the browser scopes the cookie to the exact host.
///
/// Only names with three or more dots are checked for a numeric last label,
/// so `"10.1"` or `"example.123"` are accepted. This is a heuristic, not an
/// IP address parser.
///
/// # Examples
/// ```rust
/// use starberry_cookie::is_valid_cookie_domain;
/// assert!(is_valid_cookie_domain("example.com"));
/// assert!(!is_valid_cookie_domain("localhost"));
/// assert!(!is_valid_cookie_domain("192.168.1.1"));
/// ```
pub fn is_valid_cookie_domain(domain: &str) -> bool {
    if domain == "0.0.0.0" || domain == "127.0.0.1" {
        return false;
    }

    let dots = domain.bytes().filter(|b| *b == b'.').count();
    if dots == 0 {
        return false;
    }

    if dots >= 3 {
        if let Some(idx) = domain.rfind('.') {
            let last = &domain[idx + 1..];
            if !last.is_empty() && last.parse::<i64>().is_ok() {
                return false;
            }
        }
    }

    true
}

/// Returns true if `domain` is safe to write as a `Domain` attribute: a host
/// name made of letters, digits, `.` and `-`, or a bracketed address literal.
pub(crate) fn is_valid_domain_attribute(domain: &str) -> bool {
    if let Some(inner) = domain.strip_prefix('[').and_then(|d| d.strip_suffix(']')) {
        return !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_hexdigit() || b == b':' || b == b'.');
    }
    domain.bytes().any(|b| b != b'.')
        && domain.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
}

/// Drops a trailing `:port` from a host header value.
pub(crate) fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}
