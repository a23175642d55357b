use aurora::interpreter::parse_and_run;
use aurora::Value;

#[test]
fn test_counter_closure_shares_one_cell() {
    let result = parse_and_run(
        r#"
        fun mk() {
            let n = 0;
            return fun() { n = n + 1; return n; };
        }
        const c = mk();
        c();
        c();
        c();
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Number(3.0));
}

#[test]
fn test_two_closures_from_one_factory_are_independent() {
    let result = parse_and_run(
        r#"
        fun mk() {
            let n = 0;
            return fun() { n = n + 1; return n; };
        }
        const a = mk();
        const b = mk();
        a();
        a();
        b();
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Number(1.0));
}

#[test]
fn test_closure_captures_binding_not_value() {
    let result = parse_and_run(
        r#"
        let n = 1;
        const read = fun() { return n; };
        n = 42;
        read();
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Number(42.0));
}

#[test]
fn test_lexical_capture_survives_scope_exit() {
    let result = parse_and_run(
        r#"
        let get = null;
        {
            let hidden = "inside";
            get = fun() { return hidden; };
        }
        get();
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::string("inside"));
}

#[test]
fn test_recursion() {
    let result = parse_and_run(
        r#"
        fun fib(n) {
            if (n < 2) { return n; }
            return fib(n - 1) + fib(n - 2);
        }
        fib(10);
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Number(55.0));
}

#[test]
fn test_functions_are_first_class() {
    let result = parse_and_run(
        r#"
        fun twice(f, x) { return f(f(x)); }
        fun inc(n) { return n + 1; }
        twice(inc, 5);
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Number(7.0));
}

#[test]
fn test_anonymous_function_argument() {
    let result = parse_and_run(
        r#"
        fun apply(f, x) { return f(x); }
        apply(fun(n) { return n * n; }, 9);
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Number(81.0));
}

#[test]
fn test_wrong_arity_is_an_error() {
    let err = parse_and_run(
        r#"
        fun f(a, b) { return a + b; }
        f(1);
    "#,
    )
    .unwrap_err();
    assert!(err.contains("expected 2 argument(s), got 1"));
}

#[test]
fn test_calling_a_non_callable_is_an_error() {
    let err = parse_and_run("let x = 5; x();").unwrap_err();
    assert!(err.contains("not callable"));
}

#[test]
fn test_arguments_evaluate_left_to_right() {
    let result = parse_and_run(
        r#"
        let order = [];
        fun note(tag, v) { push(order, tag); return v; }
        fun three(a, b, c) { return a + b + c; }
        three(note("a", 1), note("b", 2), note("c", 3));
        join(order, "");
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::string("abc"));
}

#[test]
fn test_function_without_return_yields_last_expression() {
    let result = parse_and_run(
        r#"
        fun f() { 41 + 1; }
        f();
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Number(42.0));
}

#[test]
fn test_bare_return_yields_null() {
    let result = parse_and_run(
        r#"
        fun f() { return; }
        f();
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Null);
}

#[test]
fn test_function_declaration_is_const() {
    let err = parse_and_run(
        r#"
        fun f() { return 1; }
        f = 2;
    "#,
    )
    .unwrap_err();
    assert!(err.contains("cannot reassign constant `f`"));
}

#[test]
fn test_named_function_expression_does_not_bind() {
    let err = parse_and_run(
        r#"
        let f = fun helper() { return 1; };
        helper();
    "#,
    )
    .unwrap_err();
    assert!(err.contains("undefined variable `helper`"));
}

#[test]
fn test_shadowing_a_builtin_is_allowed() {
    let result = parse_and_run(
        r#"
        let len = fun(x) { return 99; };
        len([1, 2, 3]);
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Number(99.0));
}
