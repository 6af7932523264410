//! The fixed set of kernel primitives the evaluator can dispatch to (§4.4).

use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;

use crate::error::PineError;
use crate::intern;
use crate::value::Value;

/// Prefers the interned blob for `n` when one exists (§9 "Interning"),
/// falling back to a fresh encoding otherwise.
fn int_value(n: &BigInt) -> Value {
    intern::interned_int(n).unwrap_or_else(|| Value::from_signed_int(n))
}

/// A kernel function name. This is a closed set — [`KernelName::parse`] is
/// the only way to obtain one, and it is what makes an unrecognized name in
/// an encoded `KernelApplication` fail at *decode* time with
/// `ErrorKind::UnknownKernel` rather than at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelName {
    Equal,
    LogicalNot,
    LogicalAnd,
    LogicalOr,
    Length,
    ListHead,
    Skip,
    Take,
    Reverse,
    Concat,
    NegInt,
    AddInt,
    SubInt,
    MulInt,
    DivInt,
    IsSortedAscendingInt,
}

impl KernelName {
    pub const ALL: &'static [KernelName] = &[
        KernelName::Equal,
        KernelName::LogicalNot,
        KernelName::LogicalAnd,
        KernelName::LogicalOr,
        KernelName::Length,
        KernelName::ListHead,
        KernelName::Skip,
        KernelName::Take,
        KernelName::Reverse,
        KernelName::Concat,
        KernelName::NegInt,
        KernelName::AddInt,
        KernelName::SubInt,
        KernelName::MulInt,
        KernelName::DivInt,
        KernelName::IsSortedAscendingInt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            KernelName::Equal => "equal",
            KernelName::LogicalNot => "logical_not",
            KernelName::LogicalAnd => "logical_and",
            KernelName::LogicalOr => "logical_or",
            KernelName::Length => "length",
            KernelName::ListHead => "list_head",
            KernelName::Skip => "skip",
            KernelName::Take => "take",
            KernelName::Reverse => "reverse",
            KernelName::Concat => "concat",
            KernelName::NegInt => "neg_int",
            KernelName::AddInt => "add_int",
            KernelName::SubInt => "sub_int",
            KernelName::MulInt => "mul_int",
            KernelName::DivInt => "div_int",
            KernelName::IsSortedAscendingInt => "is_sorted_ascending_int",
        }
    }

    pub fn parse(name: &str) -> Option<KernelName> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for KernelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applies `name` to the already-evaluated argument value. Soft-failure
/// kernels (per §4.4/§7) return `Value::empty_list()` on an unexpected
/// shape instead of erroring; hard-failure kernels return `TypeMismatch` or
/// `DivisionByZero`.
pub fn apply(name: KernelName, arg: &Value) -> Result<Value, PineError> {
    match name {
        KernelName::Equal => Ok(equal(arg)),
        KernelName::LogicalNot => logical_not(arg),
        KernelName::LogicalAnd => logical_fold(arg, true, |a, b| a && b),
        KernelName::LogicalOr => logical_fold(arg, false, |a, b| a || b),
        KernelName::Length => Ok(length(arg)),
        KernelName::ListHead => Ok(list_head(arg)),
        KernelName::Skip => skip_take(arg, SkipOrTake::Skip),
        KernelName::Take => skip_take(arg, SkipOrTake::Take),
        KernelName::Reverse => Ok(reverse(arg)),
        KernelName::Concat => Ok(concat(arg)),
        KernelName::NegInt => neg_int(arg),
        KernelName::AddInt => int_fold(arg, BigInt::from(0), |a, b| a + b),
        KernelName::SubInt => sub_int(arg),
        KernelName::MulInt => int_fold(arg, BigInt::from(1), |a, b| a * b),
        KernelName::DivInt => div_int(arg),
        KernelName::IsSortedAscendingInt => is_sorted_ascending_int(arg),
    }
}

fn elements(v: &Value) -> Option<Rc<[Value]>> {
    v.as_list().map(|l| l.iter().cloned().collect())
}

/// True iff all elements of a list are pairwise equal, an empty list, or a
/// blob whose bytes are all equal. Never fails.
fn equal(v: &Value) -> Value {
    let all_equal = match v {
        Value::List(items) => match items.iter().next() {
            Some(first) => items.iter().all(|x| x == first),
            None => true,
        },
        Value::Blob(bytes) => bytes.iter().all(|b| Some(b) == bytes.first()),
    };
    if all_equal {
        Value::true_value()
    } else {
        Value::false_value()
    }
}

fn as_bool(v: &Value) -> Result<bool, PineError> {
    if v.is_true() {
        Ok(true)
    } else if *v == Value::false_value() {
        Ok(false)
    } else {
        Err(PineError::type_mismatch("Bool", v.type_name()))
    }
}

fn logical_not(v: &Value) -> Result<Value, PineError> {
    let b = as_bool(v)?;
    Ok(if b { Value::false_value() } else { Value::true_value() })
}

fn logical_fold(
    v: &Value,
    identity: bool,
    op: impl Fn(bool, bool) -> bool,
) -> Result<Value, PineError> {
    let items = v
        .as_list()
        .ok_or_else(|| PineError::type_mismatch("List", v.type_name()))?;
    let mut acc = identity;
    for item in items.iter() {
        acc = op(acc, as_bool(item)?);
    }
    Ok(if acc { Value::true_value() } else { Value::false_value() })
}

fn length(v: &Value) -> Value {
    let n = match v {
        Value::List(items) => items.len(),
        Value::Blob(bytes) => bytes.len(),
    };
    int_value(&BigInt::from(n))
}

fn list_head(v: &Value) -> Value {
    match v.as_list().and_then(|l| l.iter().next()) {
        Some(first) => first.clone(),
        None => Value::empty_list(),
    }
}

enum SkipOrTake {
    Skip,
    Take,
}

fn skip_take(v: &Value, which: SkipOrTake) -> Result<Value, PineError> {
    let pair = v
        .as_list()
        .ok_or_else(|| PineError::type_mismatch("List", v.type_name()))?;
    if pair.len() != 2 {
        return Err(PineError::type_mismatch(
            "[signed-int, collection]",
            "list of different length",
        ));
    }
    let n = pair[0].to_signed_int()?;
    let n: usize = if n < BigInt::from(0) {
        0
    } else {
        n.try_into().unwrap_or(usize::MAX)
    };
    match &pair[1] {
        Value::Blob(bytes) => {
            let clamped = n.min(bytes.len());
            let slice = match which {
                SkipOrTake::Skip => &bytes[clamped..],
                SkipOrTake::Take => &bytes[..clamped],
            };
            Ok(Value::blob(slice.to_vec()))
        }
        Value::List(items) => {
            let clamped = n.min(items.len());
            let result = match which {
                SkipOrTake::Skip => items.clone().slice(clamped..),
                SkipOrTake::Take => items.clone().slice(..clamped),
            };
            Ok(Value::List(result))
        }
    }
}

fn reverse(v: &Value) -> Value {
    match v {
        Value::Blob(bytes) => Value::blob(bytes.iter().rev().copied().collect::<Vec<u8>>()),
        Value::List(items) => Value::List(items.iter().rev().cloned().collect()),
    }
}

/// Left fold over a list of collections; mixed blob/list elements take the
/// kind of the *current* element rather than erroring (§9 open question,
/// fixed per spec as "take the element's kind").
fn concat(v: &Value) -> Value {
    let Some(items) = elements(v) else {
        return Value::empty_list();
    };
    let Some(first) = items.first() else {
        return Value::empty_list();
    };
    let mut acc = first.clone();
    for item in items.iter().skip(1) {
        acc = match (&acc, item) {
            (Value::Blob(a), Value::Blob(b)) => {
                Value::blob([a.as_ref(), b.as_ref()].concat())
            }
            (Value::List(a), Value::List(b)) => {
                Value::List(a.iter().chain(b.iter()).cloned().collect())
            }
            _ => item.clone(),
        };
    }
    acc
}

fn as_int_list(v: &Value) -> Result<Vec<BigInt>, PineError> {
    let items = v
        .as_list()
        .ok_or_else(|| PineError::type_mismatch("List", v.type_name()))?;
    items
        .iter()
        .enumerate()
        .map(|(i, x)| x.to_signed_int().map_err(|e| e.context(format!("element [{i}]"))))
        .collect()
}

fn neg_int(v: &Value) -> Result<Value, PineError> {
    Ok(int_value(&-v.to_signed_int()?))
}

fn int_fold(
    v: &Value,
    identity: BigInt,
    op: impl Fn(BigInt, BigInt) -> BigInt,
) -> Result<Value, PineError> {
    let ints = as_int_list(v)?;
    if ints.is_empty() {
        return Err(PineError::type_mismatch(
            "non-empty list of integers",
            "empty list",
        ));
    }
    let mut acc = identity;
    for n in ints {
        acc = op(acc, n);
    }
    Ok(int_value(&acc))
}

fn sub_int(v: &Value) -> Result<Value, PineError> {
    let ints = as_int_list(v)?;
    let mut iter = ints.into_iter();
    let mut acc = iter
        .next()
        .ok_or_else(|| PineError::type_mismatch("non-empty list of integers", "empty list"))?;
    for n in iter {
        acc -= n;
    }
    Ok(int_value(&acc))
}

fn div_int(v: &Value) -> Result<Value, PineError> {
    let ints = as_int_list(v)?;
    let mut iter = ints.into_iter();
    let mut acc = iter
        .next()
        .ok_or_else(|| PineError::type_mismatch("non-empty list of integers", "empty list"))?;
    for n in iter {
        if n == BigInt::from(0) {
            return Err(PineError::division_by_zero());
        }
        acc /= n;
    }
    Ok(int_value(&acc))
}

fn is_sorted_ascending_int(v: &Value) -> Result<Value, PineError> {
    let items = v
        .as_list()
        .ok_or_else(|| PineError::type_mismatch("List", v.type_name()))?;
    let sorted = items.iter().zip(items.iter().skip(1)).all(|(a, b)| {
        a.kernel_cmp(b) != std::cmp::Ordering::Greater
    });
    Ok(if sorted { Value::true_value() } else { Value::false_value() })
}
