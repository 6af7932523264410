//! End-to-end evaluation tests: encode an expression, run it through a
//! fresh `PineVm`, and check the resulting value.

use num_bigint::BigInt;

use pine_vm::{
    decode_elm_as_pine, elm_from_pine, elm_value_to_expression_string, encode_expression,
    encode_pine_as_elm, pine_from_elm, ElmValue, ElmValueKind, Expr, KernelName, PineVm, Value,
};

fn int(n: i64) -> Value {
    Value::from_signed_int(&BigInt::from(n))
}

fn int_literal(n: i64) -> Expr {
    Expr::Literal(int(n))
}

#[test]
fn add_int_example() {
    let vm = PineVm::new();
    let expr = Expr::kernel_application(KernelName::AddInt, Expr::List(vec![int_literal(2), int_literal(3)]));
    assert_eq!(vm.evaluate(&expr, &Value::empty_list()).unwrap(), int(5));
}

#[test]
fn conditional_with_true_false_and_garbage_condition() {
    let vm = PineVm::new();
    for (condition, expected) in [
        (Value::true_value(), 1),
        (Value::false_value(), 2),
        (int(7), 2), // anything other than the canonical True value is False
    ] {
        let expr = Expr::conditional(Expr::Literal(condition), int_literal(1), int_literal(2));
        assert_eq!(vm.evaluate(&expr, &Value::empty_list()).unwrap(), int(expected));
    }
}

#[test]
fn environment_expression_returns_the_environment_unchanged() {
    let vm = PineVm::new();
    let env = Value::list(vec![int(1), int(2), int(3)]);
    assert_eq!(vm.evaluate(&Expr::Environment, &env).unwrap(), env);
}

#[test]
fn decode_and_evaluate_with_length_kernel() {
    let vm = PineVm::new();
    let function = encode_expression(&Expr::kernel_application(KernelName::Length, Expr::Environment)).unwrap();
    let env = Value::list(vec![int(1), int(2), int(3), int(4)]);
    let expr = Expr::decode_and_evaluate(Expr::Literal(function), Expr::Literal(env));
    assert_eq!(vm.evaluate(&expr, &Value::empty_list()).unwrap(), int(4));
}

#[test]
fn record_with_strictly_ascending_field_names_round_trips_through_elm() {
    let a = Value::list(vec![Value::from_string("a"), int(1)]);
    let b = Value::list(vec![Value::from_string("b"), int(2)]);
    let record = Value::list(vec![a, b]);

    match elm_from_pine(&record).kind {
        ElmValueKind::Record(fields) => {
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[0].0, "a");
            assert_eq!(fields[1].0, "b");
        }
        other => panic!("expected a record, got {other:?}"),
    }
}

#[test]
fn elm_record_encodes_to_pine_and_decodes_back() {
    let record = ElmValue::record(vec![
        ("x".to_string(), ElmValue::integer(BigInt::from(1))),
        ("y".to_string(), ElmValue::integer(BigInt::from(2))),
    ]);

    let pine = pine_from_elm(&record);
    assert_eq!(
        pine,
        Value::list(vec![
            Value::list(vec![Value::from_string("x"), int(1)]),
            Value::list(vec![Value::from_string("y"), int(2)]),
        ])
    );
    assert_eq!(elm_from_pine(&pine), record);
}

#[test]
fn dict_from_list_pretty_prints_matching_real_elm_output() {
    let node = ElmValue::tag(
        pine_vm::elm::reserved_tags::RB_NODE,
        vec![
            ElmValue::tag("Black", vec![]),
            ElmValue::string("a"),
            ElmValue::integer(BigInt::from(1)),
            ElmValue::tag(pine_vm::elm::reserved_tags::RB_EMPTY, vec![]),
            ElmValue::tag(pine_vm::elm::reserved_tags::RB_EMPTY, vec![]),
        ],
    );
    assert_eq!(elm_value_to_expression_string(&node), "Dict.fromList [(\"a\",1)]");
}

#[test]
fn pine_as_elm_encoding_round_trips_arbitrary_values() {
    let value = Value::list(vec![Value::blob(vec![1, 2, 3]), Value::list(vec![Value::empty_blob()])]);
    let encoded = encode_pine_as_elm(&value);
    assert_eq!(decode_elm_as_pine(&encoded).unwrap(), value);
}

#[test]
fn determinism_across_repeated_evaluation() {
    let vm = PineVm::new();
    let expr = Expr::kernel_application(KernelName::MulInt, Expr::List(vec![int_literal(6), int_literal(7)]));
    let env = Value::empty_list();
    let first = vm.evaluate(&expr, &env).unwrap();
    for _ in 0..10 {
        assert_eq!(vm.evaluate(&expr, &env).unwrap(), first);
    }
}
