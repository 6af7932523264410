//! The Pine value layer: a uniform tree of bytes.
//!
//! Every Pine value is either a `Blob` (an immutable byte sequence) or a
//! `List` (an immutable ordered sequence of Pine values). This is the
//! substrate every higher layer — expressions, the evaluator, the Elm-value
//! domain — is built on top of.

use std::cmp::Ordering;
use std::rc::Rc;

use im::Vector;
use num_bigint::{BigInt, Sign};
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::error::PineError;

/// A Pine value: a blob of bytes, or an ordered list of Pine values.
///
/// `List` uses `im::Vector` for structural sharing — cloning a list and
/// pushing/slicing it does not copy the whole backing store, which matters
/// because the evaluator clones values freely (it never mutates one in
/// place).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Blob(#[serde(with = "blob_bytes")] Rc<[u8]>),
    List(Vector<Value>),
}

mod blob_bytes {
    use std::rc::Rc;

    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Rc<[u8]>, s: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(bytes.as_ref(), s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Rc<[u8]>, D::Error> {
        let v: Vec<u8> = serde::Deserialize::deserialize(d)?;
        Ok(Rc::from(v))
    }
}

/// The canonical boolean encoding: a single-byte blob `0x04` is True,
/// anything else is treated as False (§4.3 — "non-True ≡ False, by design").
pub const TRUE_BYTE: u8 = 0x04;

impl Value {
    pub fn blob(bytes: impl Into<Rc<[u8]>>) -> Self {
        Value::Blob(bytes.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn empty_blob() -> Self {
        Value::Blob(Rc::from(&[][..]))
    }

    pub fn empty_list() -> Self {
        Value::List(Vector::new())
    }

    pub fn true_value() -> Self {
        Value::Blob(Rc::from(&[TRUE_BYTE][..]))
    }

    pub fn false_value() -> Self {
        Value::empty_list()
    }

    /// The evaluator's truthiness rule: equal to the canonical True value,
    /// or not. There is no third state and no error path here — see §4.3.
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Blob(b) if b.as_ref() == [TRUE_BYTE])
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vector<Value>> {
        match self {
            Value::List(l) => Some(l),
            Value::Blob(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Blob(_) => "Blob",
            Value::List(_) => "List",
        }
    }

    /// Encode a signed, arbitrary-precision integer as a blob: a sign byte
    /// (`0x00` non-negative, `0x04` negative) followed by the big-endian
    /// minimal-magnitude byte sequence of the absolute value (§4.1).
    pub fn from_signed_int(n: &BigInt) -> Self {
        let (sign, magnitude) = n.to_bytes_be();
        let tag: u8 = if sign == Sign::Minus { 0x04 } else { 0x00 };
        let mut bytes = Vec::with_capacity(1 + magnitude.len());
        bytes.push(tag);
        bytes.extend_from_slice(&magnitude);
        Value::Blob(Rc::from(bytes))
    }

    /// Inverse of [`Value::from_signed_int`]. Fails on an empty blob or a
    /// sign byte outside `{0x00, 0x04}` (§4.1).
    pub fn to_signed_int(&self) -> Result<BigInt, PineError> {
        let bytes = self
            .as_blob()
            .ok_or_else(|| PineError::type_mismatch("Blob", self.type_name()))?;
        if bytes.is_empty() {
            return Err(PineError::decode("integer blob must not be empty"));
        }
        let sign = match bytes[0] {
            0x00 => Sign::Plus,
            0x04 => Sign::Minus,
            other => {
                return Err(PineError::decode(format!(
                    "invalid integer sign byte 0x{other:02x}"
                )))
            }
        };
        let magnitude = &bytes[1..];
        let n = BigInt::from_bytes_be(sign, magnitude);
        Ok(if n.is_zero() { BigInt::zero() } else { n })
    }

    /// Encode a string as a list of blobs, one per Unicode code point, each
    /// itself a non-negative signed-integer blob (§4.1).
    pub fn from_string(s: &str) -> Self {
        Value::List(
            s.chars()
                .map(|c| Value::from_signed_int(&BigInt::from(c as u32)))
                .collect(),
        )
    }

    /// Inverse of [`Value::from_string`]. Fails if any element is not a
    /// single code-point blob, or if a code point is not valid Unicode.
    pub fn to_string_value(&self) -> Result<String, PineError> {
        let items = self
            .as_list()
            .ok_or_else(|| PineError::type_mismatch("List", self.type_name()))?;
        let mut out = String::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let code = item
                .to_signed_int()
                .map_err(|e| e.context(format!("string element [{i}]")))?;
            let code: u32 = code
                .try_into()
                .map_err(|_| PineError::decode(format!("code point {code} is negative")))?;
            let c = char::from_u32(code)
                .ok_or_else(|| PineError::decode(format!("0x{code:x} is not a valid code point")))?;
            out.push(c);
        }
        Ok(out)
    }

    /// Total ordering used by `is_sorted_ascending_int` (§4.4): blobs compare
    /// as signed integers (non-decodable blobs are equal to each other and
    /// less than any decodable blob); lists compare by length; blobs sort
    /// before lists.
    pub fn kernel_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Blob(_), Value::List(_)) => Ordering::Less,
            (Value::List(_), Value::Blob(_)) => Ordering::Greater,
            (Value::List(a), Value::List(b)) => a.len().cmp(&b.len()),
            (Value::Blob(_), Value::Blob(_)) => {
                match (self.to_signed_int(), other.to_signed_int()) {
                    (Ok(a), Ok(b)) => a.cmp(&b),
                    (Ok(_), Err(_)) => Ordering::Greater,
                    (Err(_), Ok(_)) => Ordering::Less,
                    (Err(_), Err(_)) => Ordering::Equal,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_blob_and_empty_list_are_distinct() {
        assert_ne!(Value::empty_blob(), Value::empty_list());
    }

    #[test]
    fn int_round_trip() {
        for n in [0, 1, -1, 255, -255, 256, -256, 1_000_000, -1_000_000] {
            let big = BigInt::from(n);
            let encoded = Value::from_signed_int(&big);
            assert_eq!(encoded.to_signed_int().unwrap(), big, "n={n}");
        }
    }

    #[test]
    fn int_encoding_matches_spec_example() {
        // KernelApplication("add_int", [2, 3]) evaluates to the blob encoding 5: [0x00, 0x05]
        let five = Value::from_signed_int(&BigInt::from(5));
        assert_eq!(five, Value::blob(vec![0x00, 0x05]));
    }

    #[test]
    fn decode_rejects_empty_blob_and_bad_sign() {
        assert!(Value::empty_blob().to_signed_int().is_err());
        assert!(Value::blob(vec![0x01, 0x05]).to_signed_int().is_err());
    }

    #[test]
    fn string_round_trip() {
        for s in ["", "a", "hello, world", "héllo 🎉"] {
            let encoded = Value::from_string(s);
            assert_eq!(encoded.to_string_value().unwrap(), s);
        }
    }

    #[test]
    fn structural_equality_never_conflates_kinds() {
        assert_ne!(Value::blob(vec![]), Value::list(vec![]));
    }

    #[test]
    fn kernel_cmp_orders_blobs_before_lists() {
        assert_eq!(
            Value::empty_blob().kernel_cmp(&Value::empty_list()),
            Ordering::Less
        );
    }

    #[test]
    fn kernel_cmp_orders_ints_numerically() {
        let a = Value::from_signed_int(&BigInt::from(2));
        let b = Value::from_signed_int(&BigInt::from(10));
        assert_eq!(a.kernel_cmp(&b), Ordering::Less);
    }
}
