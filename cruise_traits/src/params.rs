use std::collections::{BTreeMap, HashMap};

/// Read-only view of the persistent integer parameter store.
///
/// - get_int(): returns the stored value for `key`, or `None` when the key is
///   absent or unreadable. Callers fall back to their own defaults.
///
/// Implementations must not block; the control loop polls this on a
/// staggered schedule from inside the tick.
pub trait ParamSource {
    fn get_int(&self, key: &str) -> Option<i64>;
}

impl<T: ParamSource + ?Sized> ParamSource for &T {
    #[inline]
    fn get_int(&self, key: &str) -> Option<i64> {
        (**self).get_int(key)
    }
}

impl ParamSource for HashMap<String, i64> {
    #[inline]
    fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).copied()
    }
}

impl ParamSource for BTreeMap<String, i64> {
    #[inline]
    fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).copied()
    }
}

/// Store with no entries; every lookup misses and defaults apply.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticParams;

impl StaticParams {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl ParamSource for StaticParams {
    #[inline]
    fn get_int(&self, _key: &str) -> Option<i64> {
        None
    }
}
