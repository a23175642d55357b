use aurora::interpreter::parse_and_run;
use aurora::Value;

#[test]
fn test_catch_runtime_error() {
    let result = parse_and_run(
        r#"
        let seen = "no";
        try {
            let a = undef;
        } catch (e) {
            seen = "caught";
        }
        seen;
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::string("caught"));
}

#[test]
fn test_caught_runtime_error_is_a_record() {
    let result = parse_and_run(
        r#"
        let kind = null;
        try { undef; } catch (e) { kind = e.kind; }
        kind;
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::string("ReferenceError"));

    let result = parse_and_run(
        r#"
        let msg = null;
        try { undef; } catch (e) { msg = e.message; }
        msg;
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::string("undefined variable `undef`"));
}

#[test]
fn test_throw_user_value() {
    let result = parse_and_run(
        r#"
        let got = null;
        try { throw "boom"; } catch (e) { got = e; }
        got;
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::string("boom"));
}

#[test]
fn test_thrown_records_pass_through_unchanged() {
    let result = parse_and_run(
        r#"
        let code = null;
        try {
            throw { code: 42, message: "custom" };
        } catch (e) {
            code = e.code;
        }
        code;
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Number(42.0));
}

#[test]
fn test_catch_without_binding_still_runs() {
    let result = parse_and_run(
        r#"
        let ran = false;
        try { throw 1; } catch { ran = true; }
        ran;
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Bool(true));
}

#[test]
fn test_bare_try_swallows() {
    let result = parse_and_run(
        r#"
        try { throw "lost"; }
        "after";
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::string("after"));
}

#[test]
fn test_rethrow_from_catch() {
    let err = parse_and_run(
        r#"
        try { throw "inner"; } catch (e) { throw e; }
    "#,
    )
    .unwrap_err();
    assert!(err.contains("inner"));
}

#[test]
fn test_throw_unwinds_call_frames() {
    let result = parse_and_run(
        r#"
        fun deep() { throw "from deep"; }
        fun mid() { deep(); return "unreached"; }
        let got = null;
        try { mid(); } catch (e) { got = e; }
        got;
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::string("from deep"));
}

#[test]
fn test_nearest_enclosing_catch_wins() {
    let result = parse_and_run(
        r#"
        let tags = [];
        try {
            try {
                throw "x";
            } catch (e) {
                push(tags, "inner");
            }
            push(tags, "after-inner");
        } catch (e) {
            push(tags, "outer");
        }
        join(tags, ",");
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::string("inner,after-inner"));
}

#[test]
fn test_const_reassignment_is_catchable() {
    let result = parse_and_run(
        r#"
        const k = 1;
        let kind = null;
        try { k = 2; } catch (e) { kind = e.kind; }
        kind;
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::string("ConstError"));
}

#[test]
fn test_uncaught_throw_surfaces() {
    let err = parse_and_run("throw \"top\";").unwrap_err();
    assert!(err.contains("top"));
}

#[test]
fn test_break_is_not_caught_by_try() {
    let result = parse_and_run(
        r#"
        let n = 0;
        while (true) {
            try {
                n = n + 1;
                if (n == 3) { break; }
            } catch (e) {
                n = 100;
            }
        }
        n;
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Number(3.0));
}

#[test]
fn test_return_is_not_caught_by_try() {
    let result = parse_and_run(
        r#"
        fun f() {
            try {
                return "early";
            } catch (e) {
                return "wrong";
            }
        }
        f();
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::string("early"));
}

#[test]
fn test_error_in_catch_propagates() {
    let err = parse_and_run(
        r#"
        try { throw 1; } catch (e) { undef; }
    "#,
    )
    .unwrap_err();
    assert!(err.contains("undefined variable `undef`"));
}

#[test]
fn test_arity_error_is_catchable() {
    let result = parse_and_run(
        r#"
        fun f(a) { return a; }
        let kind = null;
        try { f(); } catch (e) { kind = e.kind; }
        kind;
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::string("ArityError"));
}

#[test]
fn test_builtin_argument_failure_is_catchable() {
    let result = parse_and_run(
        r#"
        let caught = false;
        try { len(5); } catch { caught = true; }
        caught;
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Bool(true));
}

#[test]
fn test_throw_in_loop_body_exits_through_catch() {
    let result = parse_and_run(
        r#"
        let reached = 0;
        try {
            for (let i = 0; i < 10; i = i + 1) {
                reached = i;
                if (i == 4) { throw "stop"; }
            }
        } catch { }
        reached;
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Number(4.0));
}
