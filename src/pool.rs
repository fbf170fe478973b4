use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;
use tracing::trace;

use crate::http::cookie::CookieRecord;
use crate::http::safety::CookieSafety;

/// A free list of reusable `CookieRecord`s, shared by every clone of the handle.
///
/// Every record handed out by `acquire` has been reset, whether it was
/// recycled or freshly allocated.
#[derive(Clone, Debug)]
pub struct CookiePool {
    items: Arc<Mutex<VecDeque<CookieRecord>>>,
    max_pooled: usize,
}

impl CookiePool {
    /// Creates a new, empty pool with default limits.
    pub fn new() -> Self {
        Self::with_safety(&CookieSafety::default())
    }

    /// Creates a new, empty pool keeping at most `safety.effective_max_pooled()` idle records.
    pub fn with_safety(safety: &CookieSafety) -> Self {
        CookiePool {
            items: Arc::new(Mutex::new(VecDeque::new())),
            max_pooled: safety.effective_max_pooled(),
        }
    }

    // Records are plain data, so a panic while the lock was held leaves nothing half-written.
    fn lock(&self) -> MutexGuard<'_, VecDeque<CookieRecord>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Takes a record from the pool, allocating one if the pool is empty.
    ///
    /// The record comes back with `http_only = true`, `max_age = -1`,
    /// `expires = COOKIE_EXPIRE_UNLIMITED` and every string field empty.
    ///
    /// # Examples
    /// ```rust
    /// use starberry_cookie::{CookiePool, COOKIE_EXPIRE_UNLIMITED};
    /// let pool = CookiePool::new();
    /// let cookie = pool.acquire();
    /// assert!(cookie.http_only);
    /// assert_eq!(cookie.max_age, -1);
    /// assert_eq!(cookie.expires, Some(*COOKIE_EXPIRE_UNLIMITED));
    /// pool.release(cookie);
    /// ```
    pub fn acquire(&self) -> CookieRecord {
        let recycled = self.lock().pop_back();
        let mut cookie = match recycled {
            Some(cookie) => cookie,
            None => {
                trace!("cookie pool empty, allocating");
                CookieRecord::default()
            }
        };
        cookie.reset();
        cookie
    }

    /// Returns a record to the pool. The record is dropped instead if the
    /// pool is already holding its maximum number of idle records.
    pub fn release(&self, cookie: CookieRecord) {
        let mut items = self.lock();
        if items.len() >= self.max_pooled {
            trace!(max_pooled = self.max_pooled, "cookie pool full, dropping record");
            return;
        }
        items.push_back(cookie);
    }

    /// Number of idle records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CookiePool {
    fn default() -> Self {
        Self::new()
    }
}

static COOKIE_POOL: Lazy<CookiePool> = Lazy::new(CookiePool::new);

/// Takes a reset record from the process-wide pool.
///
/// Hand it back with `release_cookie` to avoid an allocation next time.
pub fn acquire_cookie() -> CookieRecord {
    COOKIE_POOL.acquire()
}

/// Returns a record acquired with `acquire_cookie` to the process-wide pool.
pub fn release_cookie(cookie: CookieRecord) {
    COOKIE_POOL.release(cookie)
}
