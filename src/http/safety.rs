/// Limits applied by the cookie helpers
///
/// Tracks whether each parameter has been explicitly set or should use its default value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSafety {
    /// Maximum number of idle records a pool keeps (None = use default)
    max_pooled: Option<usize>,

    /// Maximum length of a single `Cookie` header line (None = use default)
    max_header_len: Option<usize>,
}

// Default constants for safety parameters
const DEFAULT_MAX_POOLED: usize = 1024;
const DEFAULT_MAX_HEADER_LEN: usize = 8 * 1024; // 8 KB

impl CookieSafety {
    /// Creates a new `CookieSafety` instance with all parameters unset
    ///
    /// # Examples
    /// ```
    /// # use starberry_cookie::CookieSafety;
    /// let safety = CookieSafety::new();
    /// assert!(safety.max_pooled().is_none());
    /// assert_eq!(safety.effective_max_pooled(), 1024);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    // --------------------------------------------------
    // Pool Capacity
    // --------------------------------------------------

    /// Gets the explicitly set pool capacity (None if unset)
    pub fn max_pooled(&self) -> Option<usize> {
        self.max_pooled
    }

    /// Sets the pool capacity explicitly
    pub fn set_max_pooled(&mut self, size: Option<usize>) {
        self.max_pooled = size;
    }

    /// Builder variant of `set_max_pooled`
    pub fn with_max_pooled(mut self, size: usize) -> Self {
        self.max_pooled = Some(size);
        self
    }

    /// Gets the effective pool capacity (always returns a value)
    pub fn effective_max_pooled(&self) -> usize {
        self.max_pooled.unwrap_or(DEFAULT_MAX_POOLED)
    }

    // --------------------------------------------------
    // Header Length
    // --------------------------------------------------

    /// Gets the explicitly set header length limit (None if unset)
    pub fn max_header_len(&self) -> Option<usize> {
        self.max_header_len
    }

    /// Sets the header length limit explicitly
    pub fn set_max_header_len(&mut self, len: Option<usize>) {
        self.max_header_len = len;
    }

    /// Builder variant of `set_max_header_len`
    pub fn with_max_header_len(mut self, len: usize) -> Self {
        self.max_header_len = Some(len);
        self
    }

    /// Gets the effective header length limit (always returns a value)
    pub fn effective_max_header_len(&self) -> usize {
        self.max_header_len.unwrap_or(DEFAULT_MAX_HEADER_LEN)
    }

    /// Checks if a header line is within the effective length limit
    pub fn check_header_len(&self, len: usize) -> bool {
        len <= self.effective_max_header_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let safety = CookieSafety::new();
        assert_eq!(safety, CookieSafety::default());
        assert_eq!(safety.effective_max_pooled(), DEFAULT_MAX_POOLED);
        assert_eq!(safety.effective_max_header_len(), DEFAULT_MAX_HEADER_LEN);
        assert!(safety.check_header_len(DEFAULT_MAX_HEADER_LEN));
        assert!(!safety.check_header_len(DEFAULT_MAX_HEADER_LEN + 1));
    }

    #[test]
    fn test_explicit_values() {
        let mut safety = CookieSafety::new().with_max_pooled(4).with_max_header_len(16);
        assert_eq!(safety.max_pooled(), Some(4));
        assert_eq!(safety.effective_max_header_len(), 16);

        safety.set_max_pooled(None);
        assert_eq!(safety.effective_max_pooled(), DEFAULT_MAX_POOLED);
        safety.set_max_header_len(Some(0));
        assert!(!safety.check_header_len(1));
    }
}
