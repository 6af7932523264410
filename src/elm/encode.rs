//! The Pine-as-Elm structural encoding (§4.5, §6): a lossless mapping of a
//! Pine value onto itself, shaped as the two-constructor Elm type a
//! self-hosted compiler works with —
//! `type PineValue = BlobValue (List Int) | ListValue (List PineValue)`.
//!
//! This is a different mapping from [`super::elm_from_pine`]: that one
//! *interprets* a Pine value as a richer domain type (records, tags,
//! integers); this one re-represents the value's own shape, byte for byte,
//! so a self-hosted compiler can pattern-match on it as ordinary Elm data.

use num_bigint::BigInt;

use crate::error::PineError;
use crate::value::Value;

const TAG_BLOB_VALUE: &str = "BlobValue";
const TAG_LIST_VALUE: &str = "ListValue";

fn tag_value(name: &str, args: Vec<Value>) -> Value {
    Value::list(vec![Value::from_string(name), Value::list(args)])
}

/// Encode a Pine value as its own Elm-shaped representation.
pub fn encode_pine_as_elm(value: &Value) -> Value {
    match value {
        Value::Blob(bytes) => {
            let byte_list = Value::list(bytes.iter().map(|b| Value::from_signed_int(&BigInt::from(*b))));
            tag_value(TAG_BLOB_VALUE, vec![byte_list])
        }
        Value::List(items) => {
            let encoded = Value::list(items.iter().map(encode_pine_as_elm));
            tag_value(TAG_LIST_VALUE, vec![encoded])
        }
    }
}

/// Inverse of [`encode_pine_as_elm`]. Fails with `UnknownTag` on anything
/// outside `{BlobValue, ListValue}`, and `Decode` on a malformed payload.
pub fn decode_elm_as_pine(value: &Value) -> Result<Value, PineError> {
    let parts = value
        .as_list()
        .ok_or_else(|| PineError::decode("PineValue encoding must be a two-element list"))?;
    if parts.len() != 2 {
        return Err(PineError::decode("PineValue encoding must be a two-element list"));
    }
    let name = parts[0]
        .to_string_value()
        .map_err(|e| e.context("PineValue constructor name"))?;
    let args = parts[1]
        .as_list()
        .ok_or_else(|| PineError::decode("PineValue constructor arguments must be a list"))?;

    match name.as_str() {
        TAG_BLOB_VALUE => {
            let byte_list = args
                .get(0)
                .and_then(Value::as_list)
                .ok_or_else(|| PineError::decode("BlobValue argument must be a list of bytes"))?;
            let mut bytes = Vec::with_capacity(byte_list.len());
            for (i, b) in byte_list.iter().enumerate() {
                let n = b
                    .to_signed_int()
                    .map_err(|e| e.context(format!("BlobValue byte [{i}]")))?;
                let byte: u8 = n
                    .try_into()
                    .map_err(|_| PineError::decode(format!("byte [{i}] is out of range")))?;
                bytes.push(byte);
            }
            Ok(Value::blob(bytes))
        }
        TAG_LIST_VALUE => {
            let items = args
                .get(0)
                .and_then(Value::as_list)
                .ok_or_else(|| PineError::decode("ListValue argument must be a list"))?;
            let decoded: Result<Vec<Value>, PineError> = items
                .iter()
                .enumerate()
                .map(|(i, v)| decode_elm_as_pine(v).map_err(|e| e.context(format!("ListValue element [{i}]"))))
                .collect();
            Ok(Value::list(decoded?))
        }
        other => Err(PineError::unknown_tag(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_round_trips() {
        let v = Value::blob(vec![1, 2, 3]);
        let encoded = encode_pine_as_elm(&v);
        assert_eq!(decode_elm_as_pine(&encoded).unwrap(), v);
    }

    #[test]
    fn nested_list_round_trips() {
        let v = Value::list(vec![Value::blob(vec![1]), Value::list(vec![Value::empty_blob()])]);
        let encoded = encode_pine_as_elm(&v);
        assert_eq!(decode_elm_as_pine(&encoded).unwrap(), v);
    }

    #[test]
    fn unknown_constructor_fails_to_decode() {
        let bogus = tag_value("NotAConstructor", vec![Value::empty_list()]);
        let err = decode_elm_as_pine(&bogus).unwrap_err();
        assert!(matches!(err.kind(), crate::error::ErrorKind::UnknownTag(_)));
    }
}
