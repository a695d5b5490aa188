//! Atomics backend. Native `core` atomics by default, `portable-atomic` when the
//! target lacks CAS (enable one of the `portable-atomic*` features).

#[cfg(not(feature = "portable-atomic"))]
pub(crate) use core::sync::atomic::{AtomicBool, AtomicI32, AtomicPtr, AtomicU8, AtomicU32, Ordering, fence};

#[cfg(feature = "portable-atomic")]
pub(crate) use portable_atomic::{AtomicBool, AtomicI32, AtomicPtr, AtomicU8, AtomicU32, Ordering, fence};

/// One-shot claim over a channel side. Taking it is a single swap; it never waits.
pub(crate) struct Claim<'a>(&'a AtomicBool);

impl<'a> Claim<'a> {
    #[inline]
    pub(crate) fn try_take(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::Acquire) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for Claim<'_> {
    #[inline]
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::{AtomicBool, Claim, Ordering};

    #[test]
    fn claim_is_exclusive_until_dropped() {
        let flag = AtomicBool::new(false);
        let first = Claim::try_take(&flag);
        assert!(first.is_some());
        assert!(Claim::try_take(&flag).is_none());
        drop(first);
        assert!(!flag.load(Ordering::Relaxed));
        assert!(Claim::try_take(&flag).is_some());
    }
}
