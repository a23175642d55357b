use std::path::PathBuf;

use aurora::interpreter::parse_and_run;
use aurora::Value;

/// A scratch directory for module files, unique per test.
fn scratch_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("aurora-module-tests")
        .join(format!("{}-{}", test, std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn write_module(dir: &PathBuf, name: &str, source: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, source).expect("write module");
    path.display().to_string()
}

#[test]
fn test_module_cache_shares_state_between_requires() {
    let dir = scratch_dir("cache");
    let module = write_module(
        &dir,
        "counter.aur",
        r#"
        let n = 0;
        fun bump() { n = n + 1; return n; }
        module.exports = { bump: bump };
    "#,
    );

    let program = format!(
        r#"
        const m1 = require("{path}");
        const m2 = require("{path}");
        let first = m1.bump();
        let second = m2.bump();
        [first, second, m1 == m2];
    "#,
        path = module
    );

    let result = parse_and_run(&program).unwrap();
    assert_eq!(
        result,
        Value::array(vec![
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Bool(true)
        ])
    );
}

#[test]
fn test_exports_record_is_aliased_not_copied() {
    let dir = scratch_dir("alias");
    let module = write_module(
        &dir,
        "shared.aur",
        r#"
        exports.items = [];
    "#,
    );

    let program = format!(
        r#"
        const a = require("{path}");
        const b = require("{path}");
        push(a.items, 1);
        len(b.items);
    "#,
        path = module
    );

    assert_eq!(parse_and_run(&program).unwrap(), Value::Number(1.0));
}

#[test]
fn test_module_exports_reassignment_propagates() {
    let dir = scratch_dir("reassign");
    let module = write_module(
        &dir,
        "answer.aur",
        r#"
        exports.ignored = true;
        module.exports = 42;
    "#,
    );

    let program = format!("require(\"{path}\");", path = module);
    assert_eq!(parse_and_run(&program).unwrap(), Value::Number(42.0));
}

#[test]
fn test_module_scope_does_not_leak() {
    let dir = scratch_dir("scope");
    let module = write_module(
        &dir,
        "private.aur",
        r#"
        let secret = 7;
        exports.out = secret;
    "#,
    );

    let program = format!(
        r#"
        require("{path}");
        secret;
    "#,
        path = module
    );

    let err = parse_and_run(&program).unwrap_err();
    assert!(err.contains("undefined variable `secret`"));
}

#[test]
fn test_modules_see_builtins() {
    let dir = scratch_dir("builtins");
    let module = write_module(
        &dir,
        "uses-len.aur",
        r#"
        exports.n = len([1, 2, 3]);
    "#,
    );

    let program = format!("require(\"{path}\").n;", path = module);
    assert_eq!(parse_and_run(&program).unwrap(), Value::Number(3.0));
}

#[test]
fn test_missing_module_is_catchable() {
    let result = parse_and_run(
        r#"
        let kind = null;
        try { require("./does-not-exist.aur"); } catch (e) { kind = e.kind; }
        kind;
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::string("ModuleError"));
}

#[test]
fn test_syntax_error_in_module_is_catchable() {
    let dir = scratch_dir("bad-syntax");
    let module = write_module(&dir, "broken.aur", "let = ;");

    let program = format!(
        r#"
        let kind = null;
        try {{ require("{path}"); }} catch (e) {{ kind = e.kind; }}
        kind;
    "#,
        path = module
    );

    assert_eq!(parse_and_run(&program).unwrap(), Value::string("ModuleError"));
}

#[test]
fn test_named_import_binds_const() {
    let dir = scratch_dir("import-named");
    let module = write_module(
        &dir,
        "util.aur",
        r#"
        exports.twice = fun(n) { return n * 2; };
    "#,
    );

    let program = format!(
        r#"
        import util from "{path}";
        util.twice(21);
    "#,
        path = module
    );
    assert_eq!(parse_and_run(&program).unwrap(), Value::Number(42.0));

    let program = format!(
        r#"
        import util from "{path}";
        util = 1;
    "#,
        path = module
    );
    let err = parse_and_run(&program).unwrap_err();
    assert!(err.contains("cannot reassign constant `util`"));
}

#[test]
fn test_bare_import_runs_for_effect() {
    let dir = scratch_dir("import-bare");
    let marker = dir.join("marker.txt");
    let module = write_module(
        &dir,
        "effect.aur",
        &format!(
            "write_file(\"{}\", \"ran\");",
            marker.display()
        ),
    );

    let program = format!("import \"{path}\";", path = module);
    parse_and_run(&program).unwrap();
    assert_eq!(std::fs::read_to_string(&marker).unwrap(), "ran");
}

#[test]
fn test_host_module_math() {
    let result = parse_and_run(
        r#"
        const math = require("math");
        [math.sqrt(81), math.floor(2.9), math.max(3, 7)];
    "#,
    )
    .unwrap();
    assert_eq!(
        result,
        Value::array(vec![
            Value::Number(9.0),
            Value::Number(2.0),
            Value::Number(7.0)
        ])
    );
}

#[test]
fn test_host_module_strings() {
    let result = parse_and_run(
        r#"
        const s = require("strings");
        [s.upper("abc"), s.trim("  x  "), s.contains("haystack", "hay")];
    "#,
    )
    .unwrap();
    assert_eq!(
        result,
        Value::array(vec![
            Value::string("ABC"),
            Value::string("x"),
            Value::Bool(true)
        ])
    );
}

#[test]
fn test_host_module_is_opaque() {
    let result = parse_and_run(
        r#"
        typeof(require("math"));
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::string("host"));
}

#[test]
fn test_host_module_lookup_by_builtin() {
    let result = parse_and_run(
        r#"
        const math = host_module("math");
        math.abs(-4);
    "#,
    )
    .unwrap();
    assert_eq!(result, Value::Number(4.0));
}

#[test]
fn test_unknown_host_module_is_an_error() {
    let err = parse_and_run("require(\"no-such-module\");").unwrap_err();
    assert!(err.contains("no host module named `no-such-module`"));
}

#[test]
fn test_requiring_modules_from_modules() {
    let dir = scratch_dir("nested");
    let leaf = write_module(
        &dir,
        "leaf.aur",
        r#"
        exports.value = 10;
    "#,
    );
    let branch_src = format!(
        r#"
        const leaf = require("{leaf}");
        exports.doubled = leaf.value * 2;
    "#,
        leaf = leaf
    );
    let branch = write_module(&dir, "branch.aur", &branch_src);

    let program = format!("require(\"{path}\").doubled;", path = branch);
    assert_eq!(parse_and_run(&program).unwrap(), Value::Number(20.0));
}
