use std::panic;

use colrt::{
    CallPosition, ConcreteValue, Operand, WrittenValue,
    pri::{self, mark_symbolic, read, write},
};

// The hooks share one process-wide heap; object ids are unique per test.

#[test]
fn hooks_trace_symbolic_instructions() {
    pri::init_runtime();
    pri::enter_call();
    mark_symbolic::argument(0);

    // local0 = arg0 + 1
    assert!(read::argument(Operand::new(1, 0, 4i32), 0).is_symbolic());
    assert!(read::local(Operand::new(1, 1, 1i32), 5).is_concrete());
    write::local(1, 0, WrittenValue::Primitive);
    pri::close_instruction(1);

    // local1 = 2
    write::local(2, 1, WrittenValue::Primitive);
    pri::exit_call();

    let trace = pri::take_trace();
    assert_eq!(trace.len(), 1);
    assert_eq!(trace[0].instruction, 1);
    assert_eq!(trace[0].operand(1), Some(&ConcreteValue::Int(1)));
    assert!(pri::take_trace().is_empty());
}

#[test]
fn hooks_follow_references_and_calls() {
    pri::enter_call();
    mark_symbolic::field(100, 3);

    // local0 = obj100.f3; obj101.g(local0)
    assert!(read::field(Operand::new(1, 0, 7i64), 100, 3).is_symbolic());
    write::local(1, 0, WrittenValue::Primitive);
    read::local(
        Operand::new(2, 0, 7i64).forwarded_to(CallPosition::Argument(0)),
        0,
    );
    read::static_field(
        Operand::new(2, 1, ConcreteValue::Reference(101)).forwarded_to(CallPosition::Receiver),
        9,
    );
    pri::enter_call();
    assert!(read::argument(Operand::new(10, 0, 7i64), 0).is_symbolic());
    assert!(read::this(Operand::new(10, 1, ConcreteValue::Null)).is_concrete());
    write::element(10, 102, 4, WrittenValue::Primitive);
    read::element(Operand::new(11, 0, 7i64).forwarded_to(CallPosition::Return), 102, 4);
    pri::exit_call();

    assert!(read::returned(Operand::new(3, 0, 7i64)).is_symbolic());
    pri::exit_call();

    let ids = pri::take_trace()
        .into_iter()
        .map(|r| r.instruction)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 2, 10, 11, 3]);
}

#[test]
fn integrity_violations_panic() {
    let result = panic::catch_unwind(pri::exit_call);
    assert!(result.is_err());

    let result = panic::catch_unwind(|| read::local(Operand::new(1, 0, 0i32), 0));
    assert!(result.is_err());
}
