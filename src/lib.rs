pub mod http;
pub mod pool;
pub mod error;

pub use error::{CookieError, Result};
pub use pool::{CookiePool, acquire_cookie, release_cookie};

pub use http::access::{add, get, remove, CookieSink, CookieSource};
pub use http::cookie::{CookieRecord, SameSite, COOKIE_EXPIRE_DELETE, COOKIE_EXPIRE_UNLIMITED};
pub use http::domain::is_valid_cookie_domain;
pub use http::safety::CookieSafety;
