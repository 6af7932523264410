//! The Pine expression algebra (§3, §4.2): the abstract syntax the evaluator
//! interprets, plus its encoding to and decoding from Pine values so that
//! programs are first-class data.

use std::fmt;
use std::rc::Rc;

use crate::error::PineError;
use crate::kernel::KernelName;
use crate::value::Value;

/// A native shortcut installed by the host, outside the encodable subset
/// (§4.3, §9 "Delegating expressions"). Not `PartialEq` in any meaningful
/// sense — two `Delegating` expressions are only equal if they share the
/// same underlying closure pointer.
#[derive(Clone)]
pub struct Delegating(pub Rc<dyn Fn(&Value) -> Result<Value, PineError>>);

impl Delegating {
    pub fn new(f: impl Fn(&Value) -> Result<Value, PineError> + 'static) -> Self {
        Delegating(Rc::new(f))
    }

    pub fn call(&self, env: &Value) -> Result<Value, PineError> {
        (self.0)(env)
    }
}

impl fmt::Debug for Delegating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Delegating(<native>)")
    }
}

impl PartialEq for Delegating {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A Pine expression (§3).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    List(Vec<Expr>),
    Environment,
    Conditional {
        condition: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
    KernelApplication {
        function: KernelName,
        argument: Box<Expr>,
    },
    DecodeAndEvaluate {
        expression: Box<Expr>,
        environment: Box<Expr>,
    },
    StringTag(String, Box<Expr>),
    /// Outside the encodable subset; see [`Delegating`].
    Delegating(Delegating),
}

impl Expr {
    pub fn conditional(condition: Expr, if_true: Expr, if_false: Expr) -> Expr {
        Expr::Conditional {
            condition: Box::new(condition),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        }
    }

    pub fn kernel_application(function: KernelName, argument: Expr) -> Expr {
        Expr::KernelApplication {
            function,
            argument: Box::new(argument),
        }
    }

    pub fn decode_and_evaluate(expression: Expr, environment: Expr) -> Expr {
        Expr::DecodeAndEvaluate {
            expression: Box::new(expression),
            environment: Box::new(environment),
        }
    }
}

// ---------------------------------------------------------------------
// Encoding: each variant becomes a two-element list [tag, payload] (§4.2).
// ---------------------------------------------------------------------

const TAG_LITERAL: &str = "literal";
const TAG_LIST: &str = "list";
const TAG_ENVIRONMENT: &str = "environment";
const TAG_CONDITIONAL: &str = "conditional";
const TAG_KERNEL_APPLICATION: &str = "kernel_application";
const TAG_DECODE_AND_EVALUATE: &str = "decode_and_evaluate";
const TAG_STRING_TAG: &str = "string_tag";

fn tagged(tag: &str, payload: Value) -> Value {
    Value::list(vec![Value::from_string(tag), payload])
}

fn record(fields: &[(&str, Value)]) -> Value {
    Value::list(
        fields
            .iter()
            .map(|(name, v)| Value::list(vec![Value::from_string(name), v.clone()])),
    )
}

fn record_field<'a>(fields: &'a [Value], name: &str) -> Result<&'a Value, PineError> {
    for field in fields {
        let pair = field
            .as_list()
            .ok_or_else(|| PineError::decode(format!("record field '{name}' is not a pair")))?;
        if pair.len() != 2 {
            return Err(PineError::decode(format!(
                "record field '{name}' is not a two-element pair"
            )));
        }
        if pair[0].to_string_value().as_deref() == Ok(name) {
            return Ok(&pair[1]);
        }
    }
    Err(PineError::decode(format!("missing record field '{name}'")))
}

/// Encode a non-`Delegating` expression as a Pine value. `Delegating` has no
/// encoding (§4.2 — "Delegating is not encodable"); encoding one is an
/// internal error since the host should have looked through it already.
pub fn encode_expression(expr: &Expr) -> Result<Value, PineError> {
    Ok(match expr {
        Expr::Literal(v) => tagged(TAG_LITERAL, v.clone()),
        Expr::List(items) => {
            let encoded: Vec<Value> = items
                .iter()
                .map(encode_expression)
                .collect::<Result<_, _>>()?;
            tagged(TAG_LIST, Value::list(encoded))
        }
        Expr::Environment => tagged(TAG_ENVIRONMENT, Value::empty_list()),
        Expr::Conditional {
            condition,
            if_true,
            if_false,
        } => tagged(
            TAG_CONDITIONAL,
            record(&[
                ("condition", encode_expression(condition)?),
                ("ifTrue", encode_expression(if_true)?),
                ("ifFalse", encode_expression(if_false)?),
            ]),
        ),
        Expr::KernelApplication { function, argument } => tagged(
            TAG_KERNEL_APPLICATION,
            record(&[
                ("functionName", Value::from_string(function.as_str())),
                ("argument", encode_expression(argument)?),
            ]),
        ),
        Expr::DecodeAndEvaluate {
            expression,
            environment,
        } => tagged(
            TAG_DECODE_AND_EVALUATE,
            record(&[
                ("expression", encode_expression(expression)?),
                ("environment", encode_expression(environment)?),
            ]),
        ),
        Expr::StringTag(tag, tagged_expr) => tagged(
            TAG_STRING_TAG,
            Value::list(vec![Value::from_string(tag), encode_expression(tagged_expr)?]),
        ),
        Expr::Delegating(_) => {
            return Err(PineError::internal(
                "Delegating expressions are not encodable",
            ))
        }
    })
}

/// Decode a Pine value as an expression. Fails with `UnknownTag` for a tag
/// outside the enumerated set, and `UnknownKernel` for a `KernelApplication`
/// naming a function outside the fixed kernel set (§4.2).
pub fn decode_expression(value: &Value) -> Result<Expr, PineError> {
    let parts = value
        .as_list()
        .ok_or_else(|| PineError::decode("expression must be a two-element list"))?;
    if parts.len() != 2 {
        return Err(PineError::decode("expression must be a two-element list"));
    }
    let tag = parts[0]
        .to_string_value()
        .map_err(|e| e.context("expression tag"))?;
    let payload = parts[1].clone();

    Ok(match tag.as_str() {
        TAG_LITERAL => Expr::Literal(payload),
        TAG_LIST => {
            let items = payload
                .as_list()
                .ok_or_else(|| PineError::decode("list expression payload must be a list"))?;
            Expr::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, e)| decode_expression(e).map_err(|e| e.context(format!("list element [{i}]"))))
                    .collect::<Result<_, _>>()?,
            )
        }
        TAG_ENVIRONMENT => Expr::Environment,
        TAG_CONDITIONAL => {
            let fields = payload
                .as_list()
                .ok_or_else(|| PineError::decode("conditional payload must be a record"))?;
            let fields: Vec<Value> = fields.iter().cloned().collect();
            Expr::Conditional {
                condition: Box::new(decode_expression(record_field(&fields, "condition")?)?),
                if_true: Box::new(decode_expression(record_field(&fields, "ifTrue")?)?),
                if_false: Box::new(decode_expression(record_field(&fields, "ifFalse")?)?),
            }
        }
        TAG_KERNEL_APPLICATION => {
            let fields = payload
                .as_list()
                .ok_or_else(|| PineError::decode("kernel application payload must be a record"))?;
            let fields: Vec<Value> = fields.iter().cloned().collect();
            let name = record_field(&fields, "functionName")?
                .to_string_value()
                .map_err(|e| e.context("kernel function name"))?;
            let function = KernelName::parse(&name).ok_or_else(|| PineError::unknown_kernel(name))?;
            Expr::KernelApplication {
                function,
                argument: Box::new(decode_expression(record_field(&fields, "argument")?)?),
            }
        }
        TAG_DECODE_AND_EVALUATE => {
            let fields = payload
                .as_list()
                .ok_or_else(|| PineError::decode("decode-and-evaluate payload must be a record"))?;
            let fields: Vec<Value> = fields.iter().cloned().collect();
            Expr::DecodeAndEvaluate {
                expression: Box::new(decode_expression(record_field(&fields, "expression")?)?),
                environment: Box::new(decode_expression(record_field(&fields, "environment")?)?),
            }
        }
        TAG_STRING_TAG => {
            let pair = payload
                .as_list()
                .ok_or_else(|| PineError::decode("string_tag payload must be a two-element list"))?;
            if pair.len() != 2 {
                return Err(PineError::decode("string_tag payload must be a two-element list"));
            }
            let tag = pair[0]
                .to_string_value()
                .map_err(|e| e.context("string_tag tag name"))?;
            Expr::StringTag(tag, Box::new(decode_expression(&pair[1])?))
        }
        other => return Err(PineError::unknown_tag(other)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn int_literal(n: i64) -> Expr {
        Expr::Literal(Value::from_signed_int(&BigInt::from(n)))
    }

    #[test]
    fn round_trips_every_non_delegating_variant() {
        let exprs = vec![
            int_literal(42),
            Expr::List(vec![int_literal(1), int_literal(2)]),
            Expr::Environment,
            Expr::conditional(int_literal(1), int_literal(2), int_literal(3)),
            Expr::kernel_application(KernelName::AddInt, int_literal(1)),
            Expr::decode_and_evaluate(int_literal(1), int_literal(2)),
            Expr::StringTag("MyTag".into(), Box::new(int_literal(1))),
        ];
        for expr in exprs {
            let encoded = encode_expression(&expr).unwrap();
            let decoded = decode_expression(&encoded).unwrap();
            assert_eq!(decoded, expr);
        }
    }

    #[test]
    fn unknown_tag_fails_to_decode() {
        let value = Value::list(vec![Value::from_string("nonsense"), Value::empty_list()]);
        let err = decode_expression(&value).unwrap_err();
        assert!(matches!(err.kind(), crate::error::ErrorKind::UnknownTag(_)));
    }

    #[test]
    fn unknown_kernel_fails_to_decode() {
        let payload = Value::list(vec![
            Value::list(vec![Value::from_string("functionName"), Value::from_string("bogus")]),
            Value::list(vec![Value::from_string("argument"), Value::empty_list()]),
        ]);
        let value = Value::list(vec![Value::from_string("kernel_application"), payload]);
        let err = decode_expression(&value).unwrap_err();
        assert!(matches!(err.kind(), crate::error::ErrorKind::UnknownKernel(_)));
    }

    #[test]
    fn delegating_is_not_encodable() {
        let d = Expr::Delegating(Delegating::new(|env| Ok(env.clone())));
        assert!(encode_expression(&d).is_err());
    }
}
