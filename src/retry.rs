/// Attempt budget for the blocking startup loops.
///
/// Production runs `Unbounded`: flight cannot proceed without a confirmed,
/// calibrated sensor or an armed ESC, so startup waits forever. Tests bound it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub const UNBOUNDED: RetryPolicy = RetryPolicy { max_attempts: None };

    #[inline]
    pub const fn bounded(max_attempts: u32) -> Self {
        RetryPolicy { max_attempts: Some(max_attempts) }
    }

    #[inline]
    pub const fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// `true` while attempt number `attempt` (zero based) may still run.
    #[inline]
    pub fn allows(&self, attempt: u32) -> bool {
        match self.max_attempts {
            None => true,
            Some(max) => attempt < max,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::UNBOUNDED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_stops_at_max() {
        let policy = RetryPolicy::bounded(3);
        assert!(policy.allows(0));
        assert!(policy.allows(2));
        assert!(!policy.allows(3));
    }

    #[test]
    fn test_unbounded_default() {
        assert_eq!(RetryPolicy::UNBOUNDED, RetryPolicy::default());
        assert!(RetryPolicy::default().allows(u32::MAX));
    }
}
