//! The Elm-value pretty-printer (§4.5): renders an [`ElmValue`] the way the
//! Elm REPL would print the value it represents, including the tuple
//! heuristic and the `Dict`/`Set` special cases.

use num_bigint::Sign;

use super::{reserved_tags, ElmValue, ElmValueKind};

pub fn elm_value_to_expression_string(value: &ElmValue) -> String {
    render(value, false)
}

/// Tri-state comparison used by the tuple heuristic: `Some(true)` if the two
/// values are provably different scalar types (so a uniform Elm `List`
/// could never hold both, and the pair must be a tuple); `Some(false)` if
/// they're the same scalar type; `None` if at least one side isn't a bare
/// scalar and nothing can be proven either way.
fn scalars_differ(a: &ElmValue, b: &ElmValue) -> Option<bool> {
    use ElmValueKind::*;
    match (&a.kind, &b.kind) {
        (Integer(_), Integer(_)) | (Char(_), Char(_)) | (String(_), String(_)) => Some(false),
        (Integer(_) | Char(_) | String(_), Integer(_) | Char(_) | String(_)) => Some(true),
        (Tag(n1, a1), Tag(n2, a2)) if is_bool(n1, a1) && is_bool(n2, a2) => Some(false),
        (Tag(n1, a1), Integer(_) | Char(_) | String(_)) if is_bool(n1, a1) => Some(true),
        (Integer(_) | Char(_) | String(_), Tag(n2, a2)) if is_bool(n2, a2) => Some(true),
        _ => None,
    }
}

fn is_bool(name: &str, args: &[ElmValue]) -> bool {
    args.is_empty() && (name == reserved_tags::TRUE || name == reserved_tags::FALSE)
}

/// A list of length 2 or 3 where some pair is provably heterogeneous cannot
/// be a real Elm `List` (which is uniformly typed), so it must be the
/// runtime shape of a tuple. Anything else defaults to a list (§4.5 point 1
/// — list is the default when the shape is ambiguous).
fn is_tuple(items: &[ElmValue]) -> bool {
    if items.len() != 2 && items.len() != 3 {
        return false;
    }
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if scalars_differ(&items[i], &items[j]) == Some(true) {
                return true;
            }
        }
    }
    false
}

fn escape_char(c: char) -> String {
    match c {
        '\'' => "\\'".to_string(),
        '\\' => "\\\\".to_string(),
        '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        other => other.to_string(),
    }
}

fn escape_string(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '"' => "\\\"".to_string(),
            '\\' => "\\\\".to_string(),
            '\n' => "\\n".to_string(),
            '\t' => "\\t".to_string(),
            other => other.to_string(),
        })
        .collect()
}

fn collect_dict_pairs<'a>(node: &'a ElmValue, out: &mut Vec<(&'a ElmValue, &'a ElmValue)>) {
    if let ElmValueKind::Tag(name, args) = &node.kind {
        if name == reserved_tags::RB_NODE && args.len() == 5 {
            collect_dict_pairs(&args[3], out);
            out.push((&args[1], &args[2]));
            collect_dict_pairs(&args[4], out);
        }
    }
}

fn render_dict(node: &ElmValue, needs_parens: bool) -> String {
    let mut pairs = Vec::new();
    collect_dict_pairs(node, &mut pairs);
    if pairs.is_empty() {
        return "Dict.empty".to_string();
    }
    let body = pairs
        .iter()
        .map(|(k, v)| format!("({},{})", render(k, false), render(v, false)))
        .collect::<Vec<_>>()
        .join(",");
    let rendered = format!("Dict.fromList [{body}]");
    if needs_parens {
        format!("({rendered})")
    } else {
        rendered
    }
}

fn render_set(args: &[ElmValue], needs_parens: bool) -> String {
    let mut pairs = Vec::new();
    if let Some(dict) = args.first() {
        collect_dict_pairs(dict, &mut pairs);
    }
    if pairs.is_empty() {
        return "Set.empty".to_string();
    }
    let body = pairs
        .iter()
        .map(|(k, _)| render(k, false))
        .collect::<Vec<_>>()
        .join(",");
    let rendered = format!("Set.fromList [{body}]");
    if needs_parens {
        format!("({rendered})")
    } else {
        rendered
    }
}

fn render(value: &ElmValue, needs_parens: bool) -> String {
    match &value.kind {
        ElmValueKind::Integer(n) => {
            let s = n.to_string();
            if needs_parens && n.sign() == Sign::Minus {
                format!("({s})")
            } else {
                s
            }
        }
        ElmValueKind::Char(c) => format!("'{}'", escape_char(*c)),
        ElmValueKind::String(s) => format!("\"{}\"", escape_string(s)),
        ElmValueKind::Tag(name, args) if is_bool(name, args) => name.clone(),
        ElmValueKind::Tag(name, args) if name == reserved_tags::SET && args.len() == 1 => {
            render_set(args, needs_parens)
        }
        ElmValueKind::Tag(name, _) if name == reserved_tags::RB_NODE || name == reserved_tags::RB_EMPTY => {
            render_dict(value, needs_parens)
        }
        ElmValueKind::Tag(name, args) if args.is_empty() => name.clone(),
        ElmValueKind::Tag(name, args) => {
            let rendered = format!(
                "{name} {}",
                args.iter().map(|a| render(a, true)).collect::<Vec<_>>().join(" ")
            );
            if needs_parens {
                format!("({rendered})")
            } else {
                rendered
            }
        }
        ElmValueKind::Record(fields) => {
            let body = fields
                .iter()
                .map(|(k, v)| format!("{k} = {}", render(v, false)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{ {body} }}")
        }
        ElmValueKind::List(items) if is_tuple(items) => {
            format!("({})", items.iter().map(|v| render(v, false)).collect::<Vec<_>>().join(","))
        }
        ElmValueKind::List(items) => {
            format!("[{}]", items.iter().map(|v| render(v, false)).collect::<Vec<_>>().join(","))
        }
        ElmValueKind::Internal(s) => format!("<{s}>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn integer_prints_as_decimal() {
        assert_eq!(elm_value_to_expression_string(&ElmValue::integer(BigInt::from(42))), "42");
    }

    #[test]
    fn bool_tags_print_bare() {
        assert_eq!(elm_value_to_expression_string(&ElmValue::bool(true)), "True");
        assert_eq!(elm_value_to_expression_string(&ElmValue::bool(false)), "False");
    }

    #[test]
    fn heterogeneous_pair_prints_as_tuple() {
        let v = ElmValue::list(vec![ElmValue::integer(BigInt::from(1)), ElmValue::string("a")]);
        assert_eq!(elm_value_to_expression_string(&v), "(1,\"a\")");
    }

    #[test]
    fn homogeneous_pair_prints_as_list() {
        let v = ElmValue::list(vec![ElmValue::integer(BigInt::from(1)), ElmValue::integer(BigInt::from(2))]);
        assert_eq!(elm_value_to_expression_string(&v), "[1,2]");
    }

    #[test]
    fn record_prints_with_braces() {
        let v = ElmValue::record(vec![("x".to_string(), ElmValue::integer(BigInt::from(1)))]);
        assert_eq!(elm_value_to_expression_string(&v), "{ x = 1 }");
    }

    #[test]
    fn negative_constructor_argument_gets_parenthesized() {
        let v = ElmValue::tag("Just", vec![ElmValue::integer(BigInt::from(-1))]);
        assert_eq!(elm_value_to_expression_string(&v), "Just (-1)");
    }

    #[test]
    fn empty_dict_prints_as_dict_empty() {
        let empty = ElmValue::tag(reserved_tags::RB_EMPTY, vec![]);
        assert_eq!(elm_value_to_expression_string(&empty), "Dict.empty");
    }

    #[test]
    fn populated_dict_prints_as_dict_from_list() {
        let node = ElmValue::tag(
            reserved_tags::RB_NODE,
            vec![
                ElmValue::tag("Black", vec![]),
                ElmValue::string("a"),
                ElmValue::integer(BigInt::from(1)),
                ElmValue::tag(reserved_tags::RB_EMPTY, vec![]),
                ElmValue::tag(reserved_tags::RB_EMPTY, vec![]),
            ],
        );
        assert_eq!(elm_value_to_expression_string(&node), "Dict.fromList [(\"a\",1)]");
    }

    #[test]
    fn empty_set_prints_as_set_empty() {
        let set = ElmValue::tag(reserved_tags::SET, vec![ElmValue::tag(reserved_tags::RB_EMPTY, vec![])]);
        assert_eq!(elm_value_to_expression_string(&set), "Set.empty");
    }
}
