//! Process-wide interning tables for popular Pine values.
//!
//! Integers in `[-100, 299]`, character code points in `[0, 4000)`, and a
//! fixed list of popular strings are built once, lazily, and never mutated
//! afterwards. Lookup is optional — a miss just means the caller constructs
//! a fresh value — so correctness never depends on interning succeeding.

use std::ops::Range;

use num_bigint::BigInt;
use once_cell::sync::Lazy;

use crate::value::Value;

const INT_RANGE: Range<i64> = -100..300;
const CHAR_RANGE: Range<u32> = 0..4000;

const POPULAR_STRINGS: &[&str] = &[
    "", "True", "False", "Nothing", "Just", "Ok", "Err", "List", "Cons", "Nil", "Dict", "Set",
];

struct IntTable {
    values: Vec<Value>,
}

impl IntTable {
    fn build() -> Self {
        Self {
            values: INT_RANGE
                .map(|n| Value::from_signed_int(&BigInt::from(n)))
                .collect(),
        }
    }

    fn get(&self, n: i64) -> Option<&Value> {
        if INT_RANGE.contains(&n) {
            self.values.get((n - INT_RANGE.start) as usize)
        } else {
            None
        }
    }
}

struct CharTable {
    values: Vec<Value>,
}

impl CharTable {
    fn build() -> Self {
        Self {
            values: CHAR_RANGE
                .map(|cp| Value::from_signed_int(&BigInt::from(cp)))
                .collect(),
        }
    }

    fn get(&self, code_point: u32) -> Option<&Value> {
        if CHAR_RANGE.contains(&code_point) {
            self.values.get(code_point as usize)
        } else {
            None
        }
    }
}

struct StringTable {
    values: Vec<(&'static str, Value)>,
}

impl StringTable {
    fn build() -> Self {
        Self {
            values: POPULAR_STRINGS
                .iter()
                .map(|s| (*s, Value::from_string(s)))
                .collect(),
        }
    }

    fn get(&self, s: &str) -> Option<&Value> {
        self.values.iter().find(|(k, _)| *k == s).map(|(_, v)| v)
    }
}

static INT_TABLE: Lazy<IntTable> = Lazy::new(IntTable::build);
static CHAR_TABLE: Lazy<CharTable> = Lazy::new(CharTable::build);
static STRING_TABLE: Lazy<StringTable> = Lazy::new(StringTable::build);

/// Returns the interned blob for `n` if it falls in the popular range,
/// otherwise `None` — callers fall back to [`Value::from_signed_int`].
pub fn interned_int(n: &BigInt) -> Option<Value> {
    let n: i64 = n.try_into().ok()?;
    INT_TABLE.get(n).cloned()
}

/// Returns the interned blob for a code point below 4000, otherwise `None`.
pub fn interned_char(code_point: u32) -> Option<Value> {
    CHAR_TABLE.get(code_point).cloned()
}

/// Returns the interned list-of-blobs for a popular string, otherwise `None`.
pub fn interned_string(s: &str) -> Option<Value> {
    STRING_TABLE.get(s).cloned()
}
