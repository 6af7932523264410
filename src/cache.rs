//! The function-application memoization cache (§3, §4.3, §9).
//!
//! Keyed by the (function-value, argument-value) pair passed to
//! `DecodeAndEvaluate`, using the value layer's structural equality. The
//! evaluator is pure, so a cache entry is never invalidated once written —
//! eviction (not implemented here; see §9) would only ever be a space
//! optimization, never a correctness concern.

use std::cell::Cell;
use std::collections::HashMap;

use crate::value::Value;

#[derive(Debug, Default)]
pub struct ApplicationCache {
    entries: HashMap<(Value, Value), Value>,
    lookup_count: Cell<u64>,
    max_argument_len: Cell<usize>,
}

impl ApplicationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, function: &Value, argument: &Value) -> Option<Value> {
        self.lookup_count.set(self.lookup_count.get() + 1);
        if let Value::List(items) = argument {
            self.max_argument_len.set(self.max_argument_len.get().max(items.len()));
        }
        self.entries
            .get(&(function.clone(), argument.clone()))
            .cloned()
    }

    pub fn insert(&mut self, function: Value, argument: Value, result: Value) {
        self.entries.insert((function, argument), result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup_count(&self) -> u64 {
        self.lookup_count.get()
    }

    pub fn max_argument_len(&self) -> usize {
        self.max_argument_len.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn int(n: i64) -> Value {
        Value::from_signed_int(&BigInt::from(n))
    }

    #[test]
    fn hit_returns_inserted_value_and_counts_lookups() {
        let mut cache = ApplicationCache::new();
        assert!(cache.get(&int(1), &int(2)).is_none());
        cache.insert(int(1), int(2), int(3));
        assert_eq!(cache.get(&int(1), &int(2)), Some(int(3)));
        assert_eq!(cache.lookup_count(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn tracks_max_observed_argument_list_length() {
        let cache = ApplicationCache::new();
        cache.get(&int(1), &Value::list(vec![int(1), int(2), int(3)]));
        assert_eq!(cache.max_argument_len(), 3);
    }
}
