//! The Elm-value domain (§3, §4.5): the higher-level, domain-typed view over
//! Pine values, and the lossless mapping between the two.

pub mod encode;
pub mod pretty;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Reserved tag names with domain semantics recognized by the pretty-printer
/// and by well-known stdlib encodings (§4.5).
pub mod reserved_tags {
    pub const TRUE: &str = "True";
    pub const FALSE: &str = "False";
    pub const SET: &str = "Set_elm_builtin";
    pub const RB_EMPTY: &str = "RBEmpty_elm_builtin";
    pub const RB_NODE: &str = "RBNode_elm_builtin";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElmValueKind {
    Integer(BigInt),
    Char(char),
    String(String),
    List(Vec<ElmValue>),
    Tag(String, Vec<ElmValue>),
    /// Ordered `(field name, value)` pairs; field names are strictly
    /// ascending by construction — see [`ElmValue::record`].
    Record(Vec<(String, ElmValue)>),
    /// An opaque diagnostic payload, used when a value structurally
    /// resembles a richer shape (e.g. a record) but violates that shape's
    /// invariant (e.g. non-ascending field names).
    Internal(String),
}

/// A value in the higher-level Elm domain. Carries a cached count of the
/// nodes it contains, for size bookkeeping (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElmValue {
    pub kind: ElmValueKind,
    node_count: usize,
}

impl ElmValue {
    fn leaf(kind: ElmValueKind) -> Self {
        Self { kind, node_count: 1 }
    }

    pub fn integer(n: BigInt) -> Self {
        Self::leaf(ElmValueKind::Integer(n))
    }

    pub fn character(c: char) -> Self {
        Self::leaf(ElmValueKind::Char(c))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::leaf(ElmValueKind::String(s.into()))
    }

    pub fn internal(s: impl Into<String>) -> Self {
        Self::leaf(ElmValueKind::Internal(s.into()))
    }

    pub fn list(items: Vec<ElmValue>) -> Self {
        let node_count = 1 + items.iter().map(ElmValue::node_count).sum::<usize>();
        Self {
            kind: ElmValueKind::List(items),
            node_count,
        }
    }

    pub fn tag(name: impl Into<String>, args: Vec<ElmValue>) -> Self {
        let node_count = 1 + args.iter().map(ElmValue::node_count).sum::<usize>();
        Self {
            kind: ElmValueKind::Tag(name.into(), args),
            node_count,
        }
    }

    /// Builds a record from fields already known to be in ascending order
    /// (callers constructing records by hand are expected to sort first;
    /// [`elm_from_pine`] enforces the invariant when recognizing one).
    pub fn record(fields: Vec<(String, ElmValue)>) -> Self {
        let node_count = 1 + fields.iter().map(|(_, v)| v.node_count()).sum::<usize>();
        Self {
            kind: ElmValueKind::Record(fields),
            node_count,
        }
    }

    pub fn bool(b: bool) -> Self {
        Self::tag(if b { reserved_tags::TRUE } else { reserved_tags::FALSE }, vec![])
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }
}

fn is_lowercase_start(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_lowercase())
}

fn is_uppercase_start(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Tries to recognize `value` as a record: a list of `[name, value]` pairs
/// where every name starts lowercase. Returns `None` if the shape doesn't
/// match at all (not every element is such a pair); returns
/// `Some(ElmValue::Internal(..))` if the shape matches but the strict
/// ascending-name invariant is violated (§4.5 point 2).
fn try_record(items: &im::Vector<Value>) -> Option<ElmValue> {
    let mut names = Vec::with_capacity(items.len());
    for item in items {
        let pair = item.as_list()?;
        if pair.len() != 2 {
            return None;
        }
        let name = pair[0].to_string_value().ok()?;
        if !is_lowercase_start(&name) {
            return None;
        }
        names.push(name);
    }

    let ascending = names.windows(2).all(|w| w[0] < w[1]);
    if !ascending {
        return Some(ElmValue::internal(format!(
            "record-shaped list with {} fields is not in strictly ascending order: {:?}",
            names.len(),
            names
        )));
    }

    let fields = items
        .iter()
        .zip(names)
        .map(|(item, name)| (name, elm_from_pine(&item.as_list().unwrap()[1])))
        .collect();
    Some(ElmValue::record(fields))
}

/// Tries to recognize `value` as a tag: `[String tag-name, List arguments]`
/// where `tag-name` starts uppercase (§4.5 point 3).
fn try_tag(items: &im::Vector<Value>) -> Option<ElmValue> {
    if items.len() != 2 {
        return None;
    }
    let name = items[0].to_string_value().ok()?;
    if !is_uppercase_start(&name) {
        return None;
    }
    let args = items[1].as_list()?;
    Some(ElmValue::tag(name, args.iter().map(elm_from_pine).collect()))
}

/// Maps a Pine value to its higher-level Elm-domain view, following the
/// recognizer protocol of §4.5: record, then tag, then plain list, with a
/// blob decoding as an integer. A list whose elements all happen to be
/// valid code-point blobs is *not* special-cased here — per §4.5 point 1
/// the default is to yield a list, not a string; string rendering is a
/// presentation-layer decision the pretty-printer makes when context calls
/// for it, not a property of this mapping.
pub fn elm_from_pine(value: &Value) -> ElmValue {
    match value {
        Value::Blob(_) => match value.to_signed_int() {
            Ok(n) => ElmValue::integer(n),
            Err(e) => ElmValue::internal(format!("blob does not decode as an integer: {e}")),
        },
        Value::List(items) => try_record(items)
            .or_else(|| try_tag(items))
            .unwrap_or_else(|| ElmValue::list(items.iter().map(elm_from_pine).collect())),
    }
}

/// The inverse of [`elm_from_pine`]: encodes a higher-level Elm-domain value
/// back down to its Pine-value shape (§1, §2 component 5 — the mapping runs
/// both ways). A `Char` is encoded the same as a one-code-point `Integer`,
/// since Pine itself has no separate character kind (§4.1); an `Internal`
/// diagnostic, which never arises from recognizing a real Pine value, is
/// re-encoded as the string it carries so the mapping stays total.
pub fn pine_from_elm(elm: &ElmValue) -> Value {
    match &elm.kind {
        ElmValueKind::Integer(n) => Value::from_signed_int(n),
        ElmValueKind::Char(c) => Value::from_signed_int(&BigInt::from(*c as u32)),
        ElmValueKind::String(s) => Value::from_string(s),
        ElmValueKind::List(items) => Value::list(items.iter().map(pine_from_elm)),
        ElmValueKind::Tag(name, args) => Value::list(vec![
            Value::from_string(name),
            Value::list(args.iter().map(pine_from_elm)),
        ]),
        ElmValueKind::Record(fields) => Value::list(
            fields
                .iter()
                .map(|(name, v)| Value::list(vec![Value::from_string(name), pine_from_elm(v)])),
        ),
        ElmValueKind::Internal(s) => Value::from_string(s),
    }
}
