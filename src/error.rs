use std::fmt;

/// Failures seen below the public cookie helpers.
///
/// `get`, `remove` and `add` swallow these; they surface only on
/// `CookieSource::find_cookie` and `CookieRecord::parse_set_cookie`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieError {
    NotFound(String),
    Malformed(String),
    InvalidName(String),
    HeaderTooLarge(usize),
}

impl fmt::Display for CookieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "Cookie not found: {}", name),
            Self::Malformed(reason) => write!(f, "Malformed cookie header: {}", reason),
            Self::InvalidName(name) => write!(f, "Invalid cookie name: {:?}", name),
            Self::HeaderTooLarge(len) => write!(f, "Cookie header too large: {} bytes", len),
        }
    }
}

impl std::error::Error for CookieError {}

pub type Result<T> = std::result::Result<T, CookieError>;
