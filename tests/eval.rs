//! End-to-end script evaluation through the host API.

use vjs::{Interpreter, Kind, ScriptError};

fn eval(code: &str) -> String {
    Interpreter::new().evaluate(code).unwrap()
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(eval("var a = 1+2*3; a;"), "7");
    assert_eq!(eval("(1+2)*3"), "9");
    assert_eq!(eval("10 % 3"), "1");
    assert_eq!(eval("7 / 2"), "3");
    assert_eq!(eval("-3 + 5"), "2");
    assert_eq!(eval("0x10 + 1"), "17");
}

#[test]
fn double_arithmetic() {
    assert_eq!(eval("1.5 + 2.25"), "3.750000");
    assert_eq!(eval("7.0 / 2"), "3.500000");
    assert_eq!(eval("1e3 + 1"), "1001.000000");
}

#[test]
fn string_concatenation_and_length() {
    assert_eq!(eval("var s = \"ab\" + \"cd\"; s.length;"), "4");
    assert_eq!(eval("var s = 'x' + 1; s;"), "x1");
    assert_eq!(eval("\"abc\" < \"abd\""), "true");
}

#[test]
fn array_literals_and_length() {
    assert_eq!(eval("var a = [10,20,30]; a.length + a[1];"), "23");
    assert_eq!(eval("var a = []; a[5] = 1; a.length;"), "6");
    assert_eq!(eval("var a = [1,2]; a[0] = 9; a[0] + a[1];"), "11");
}

#[test]
fn function_definition_and_call() {
    assert_eq!(eval("function f(x){ return x*x; } f(5);"), "25");
    assert_eq!(
        eval("function add(a,b){ return a+b; } add(add(1,2), 3);"),
        "6"
    );
}

#[test]
fn recursion() {
    assert_eq!(
        eval("function fib(n){ if (n<2) return n; return fib(n-1)+fib(n-2); } fib(10);"),
        "55"
    );
}

#[test]
fn return_stops_the_body() {
    assert_eq!(
        eval("function g(){ return 1; return 2; } g();"),
        "1"
    );
    assert_eq!(
        eval("var n = 0; function h(){ n = 1; return 0; n = 2; } h(); n;"),
        "1"
    );
}

#[test]
fn objects_are_passed_by_reference() {
    assert_eq!(eval("var a = {x:1}; var b = a; b.x = 7; a.x;"), "7");
    assert_eq!(
        eval("var a = {x:1}; function g(o){ o.x = 9; } g(a); a.x;"),
        "9"
    );
}

#[test]
fn basics_are_passed_by_value() {
    assert_eq!(
        eval("var n = 1; function g(x){ x = 9; } g(n); n;"),
        "1"
    );
}

#[test]
fn object_literals_and_member_chains() {
    assert_eq!(eval("var o = { a: { b: 2 } }; o.a.b;"), "2");
    assert_eq!(eval("var o = { 'quoted': 3 }; o.quoted;"), "3");
    assert_eq!(eval("var o = {}; o.fresh = 4; o['fresh'];"), "4");
    assert_eq!(eval("var o = {k:1}; o['k'] + 1;"), "2");
    // reading a missing member yields undefined
    assert_eq!(eval("var o = {}; o.missing;"), "undefined");
}

#[test]
fn while_loops() {
    assert_eq!(eval("var i=0; while(i<3){ i = i+1; } i;"), "3");
    assert_eq!(eval("var i=5; while(i<3){ i = i+1; } i;"), "5");
}

#[test]
fn for_loops() {
    assert_eq!(
        eval("var s=0; for (var i=0; i<5; i=i+1) s = s + i; s;"),
        "10"
    );
    assert_eq!(
        eval("var s=0; for (var i=0; i<0; i=i+1) s = s + 1; s;"),
        "0"
    );
}

#[test]
fn equality_lattice() {
    assert_eq!(eval("1 === \"1\""), "false");
    assert_eq!(eval("1 == 1"), "true");
    assert_eq!(eval("null === undefined"), "false");
    assert_eq!(eval("undefined == undefined"), "true");
    assert_eq!(eval("1 == \"1\""), "true");
    assert_eq!(eval("1 !== 1.0"), "true");
    assert_eq!(eval("2 > 1"), "true");
    assert_eq!(eval("1 != 2"), "true");
}

#[test]
fn logic_and_short_circuit() {
    assert_eq!(eval("true && false"), "0");
    assert_eq!(eval("1 && 2"), "1");
    assert_eq!(eval("0 || 1"), "1");
    assert_eq!(eval("!0"), "true");
    assert_eq!(eval("!1"), "false");
    assert_eq!(eval("5 & 3"), "1");
    assert_eq!(eval("5 | 2"), "7");
    assert_eq!(eval("5 ^ 1"), "4");
    // the not-taken side must not run
    assert_eq!(
        eval("var n=0; function bump(){ n=n+1; return true; } false && bump(); n;"),
        "0"
    );
    assert_eq!(
        eval("var n=0; function bump(){ n=n+1; return true; } true || bump(); n;"),
        "0"
    );
    assert_eq!(
        eval("var n=0; function bump(){ n=n+1; return true; } true && bump(); n;"),
        "1"
    );
}

#[test]
fn ternary_runs_exactly_one_branch() {
    assert_eq!(eval("1 ? 2 : 3"), "2");
    assert_eq!(eval("0 ? 2 : 3"), "3");
    assert_eq!(
        eval("var n=0; function bump(){ n=n+1; return n; } 1 ? 5 : bump(); n;"),
        "0"
    );
    // literals survive the skipped branch
    assert_eq!(eval("0 ? {a:1} : 2"), "2");
    assert_eq!(eval("1 ? 2 : [3,4]"), "2");
}

#[test]
fn if_else() {
    assert_eq!(eval("var x=0; if (1 > 0) x = 1; else x = 2; x;"), "1");
    assert_eq!(eval("var x=0; if (1 < 0) x = 1; else x = 2; x;"), "2");
    assert_eq!(eval("var x=0; if (0) { x = 1; } x;"), "0");
}

#[test]
fn shifts_update_in_place() {
    assert_eq!(eval("1 << 3"), "8");
    assert_eq!(eval("16 >> 2"), "4");
    assert_eq!(eval("var x = 2; x << 2; x;"), "8");
    assert_eq!(eval("-1 >>> 60"), "15");
}

#[test]
fn postfix_increment_yields_the_updated_value() {
    assert_eq!(eval("var i = 1; i++;"), "2");
    assert_eq!(eval("var i = 1; i++; i;"), "2");
    assert_eq!(eval("var i = 5; i--;"), "4");
}

#[test]
fn compound_assignment() {
    assert_eq!(eval("var a = 1; a += 4; a;"), "5");
    assert_eq!(eval("var a = 9; a -= 4; a;"), "5");
    assert_eq!(eval("var s = 'a'; s += 'b'; s;"), "ab");
}

#[test]
fn undeclared_assignment_creates_a_global() {
    assert_eq!(eval("function h(){ q = 5; } h(); q;"), "5");
    assert_eq!(eval("fresh = 3; fresh;"), "3");
}

#[test]
fn function_locals_stay_local() {
    assert_eq!(
        eval("function l(){ var inner = 1; return inner; } l(); inner;"),
        "undefined"
    );
}

#[test]
fn this_binds_on_method_calls() {
    assert_eq!(
        eval("var o = {v:42}; function m(){ return this.v; } o.m = m; o.m();"),
        "42"
    );
}

#[test]
fn constructor_functions() {
    assert_eq!(
        eval("function Point(x,y){ this.x=x; this.y=y; } var p = new Point(1,2); p.x + p.y;"),
        "3"
    );
}

#[test]
fn new_with_a_plain_object_sets_the_prototype() {
    assert_eq!(eval("var base = {f:1}; var o = new base(); o.f;"), "1");
    // members found through the prototype chain
    assert_eq!(
        eval("var base = {f:1}; var o = new base; o.g = 2; o.f + o.g;"),
        "3"
    );
}

#[test]
fn anonymous_functions_as_values() {
    assert_eq!(eval("var f = function(a,b){ return a*b; }; f(6,7);"), "42");
}

#[test]
fn comments_are_skipped() {
    assert_eq!(eval("// leading\nvar a = 1; /* inline */ a + 1;"), "2");
}

#[test]
fn empty_statements_and_empty_input() {
    assert_eq!(eval(""), "undefined");
    assert_eq!(eval(";;; 4;"), "4");
}

#[test]
fn var_lists_and_dotted_declarations() {
    assert_eq!(eval("var a = 1, b = 2, c; a + b;"), "3");
    assert_eq!(eval("var a = 1, b; b;"), "undefined");
    assert_eq!(eval("var o.inner = 7; o.inner;"), "7");
}

#[test]
fn skipped_branches_do_not_mutate() {
    assert_eq!(
        eval("var a = 1; if (false) { a = 2; nested = 3; } a;"),
        "1"
    );
    assert_eq!(eval("if (false) { if (true) { deep = 1; } } deep;"), "undefined");
}

#[test]
fn evaluate_complex_returns_a_live_handle() {
    let mut js = Interpreter::new();
    let slot = js.evaluate_complex("var o = {x: 1}; o;").unwrap();
    let value = slot.get();
    assert_eq!(value.borrow().kind(), Kind::Object);
    assert_eq!(
        value.borrow().find_child("x").unwrap().borrow().get_int(),
        1
    );
}

#[test]
fn json_output_of_results() {
    let mut js = Interpreter::new();
    let slot = js
        .evaluate_complex("var o = { n: 1, s: 'hi', list: [1,2] }; o;")
        .unwrap();
    let value = slot.get();
    let mut out = String::new();
    value.borrow().get_json(&mut out, "");
    assert_eq!(
        out,
        "{ \n  \"n\" : 1,\n  \"s\" : \"hi\",\n  \"list\" : [\n1,\n2\n  ]\n}"
    );
}

#[test]
fn parsable_strings_round_trip() {
    let mut js = Interpreter::new();
    for source in ["42", "\"hi\"", "null", "undefined"] {
        let slot = js.evaluate_complex(source).unwrap();
        let value = slot.get();
        let reconstituted = value.borrow().get_parsable_string();
        let round = js.evaluate_complex(&reconstituted).unwrap();
        let original = value.borrow();
        assert!(
            original.equals(&round.get().borrow()),
            "round trip failed for {source}"
        );
    }
}

#[test]
fn runaway_loops_hit_the_iteration_cap() {
    let mut js = Interpreter::new();
    let err = js
        .execute("var i = 0; while (true) { i = i + 1; }")
        .unwrap_err();
    match err {
        ScriptError::Aborted(message) => assert!(message.contains("LOOP_ERROR"), "{message}"),
        other => panic!("unexpected error: {other:?}"),
    }
    // one pass inline, then the capped re-scans
    assert_eq!(js.variable_string("i"), Some("8193".to_string()));
}

#[test]
fn runaway_for_loops_hit_the_cap_too() {
    let mut js = Interpreter::new();
    let err = js.execute("for (var i=0; 1; i=i+1) { }").unwrap_err();
    match err {
        ScriptError::Aborted(message) => assert!(message.contains("LOOP_ERROR"), "{message}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn type_errors_name_the_operator_and_datatype() {
    let mut js = Interpreter::new();
    let err = js.evaluate("var a = [1]; var b = [2]; a * b;").unwrap_err();
    match err {
        ScriptError::Aborted(message) => {
            assert!(
                message.contains("operation '*' not supported on the Array datatype"),
                "{message}"
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = js.evaluate("var o = {}; var p = {}; o - p;").unwrap_err();
    match err {
        ScriptError::Aborted(message) => {
            assert!(message.contains("Object datatype"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn modulo_on_doubles_is_an_error() {
    let mut js = Interpreter::new();
    let err = js.evaluate("5.0 % 2.0").unwrap_err();
    match err {
        ScriptError::Aborted(message) => assert!(message.contains("Double datatype"), "{message}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn division_by_zero_is_an_error() {
    let mut js = Interpreter::new();
    assert!(js.evaluate("1 / 0").is_err());
    assert!(js.evaluate("1 % 0").is_err());
}

#[test]
fn calling_a_non_function_is_an_error() {
    let mut js = Interpreter::new();
    let err = js.evaluate("var x = 1; x();").unwrap_err();
    match err {
        ScriptError::Aborted(message) => {
            assert!(message.contains("expecting 'x' to be a function"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn parse_errors_carry_positions() {
    let mut js = Interpreter::new();
    let err = js.execute("var x = 1 +;").unwrap_err();
    match err {
        ScriptError::Aborted(message) => {
            assert!(message.contains("line"), "{message}");
            assert!(message.contains("col"), "{message}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn break_is_reserved_but_unimplemented() {
    let mut js = Interpreter::new();
    assert!(js.execute("while (false) { }").is_ok());
    assert!(js.execute("break;").is_err());
    assert!(js.execute("continue;").is_err());
}

#[test]
fn interpreter_state_survives_errors() {
    let mut js = Interpreter::new();
    js.execute("var keep = 11;").unwrap();
    assert!(js.execute("var broken = ;").is_err());
    // the root scope and previous state are intact
    assert_eq!(js.evaluate("keep + 1").unwrap(), "12");
}

#[test]
fn several_statements_share_the_root_scope() {
    let mut js = Interpreter::new();
    js.execute("var total = 0;").unwrap();
    js.execute("total = total + 40;").unwrap();
    js.execute("function more(){ return 2; }").unwrap();
    assert_eq!(js.evaluate("total + more()").unwrap(), "42");
}
