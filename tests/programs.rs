use pretty_assertions::assert_eq;

use tlox::{Interpreter, LoxError};

fn run(src: &str) -> Result<String, LoxError> {
    let mut raw_output: Vec<u8> = Vec::new();
    let mut interp = Interpreter::new(&mut raw_output);
    interp.run(src)?;
    Ok(String::from_utf8(raw_output).expect("output is not UTF-8"))
}

/// Runs a program expected to fail and returns the error with the output produced before it.
fn run_failing(src: &str) -> (LoxError, String) {
    let mut raw_output: Vec<u8> = Vec::new();
    let mut interp = Interpreter::new(&mut raw_output);
    let err = match interp.run(src) {
        Err(e) => e,
        Ok(()) => panic!("program succeeded but was expected to fail:\n{}", src),
    };
    (err, String::from_utf8(raw_output).expect("output is not UTF-8"))
}

#[test]
fn counter_closure_outlives_its_scope() -> Result<(), LoxError> {
    let src = r#"
        fun makeCounter() {
            var i = 0;
            fun count() {
                i = i + 1;
                return i;
            }
            return count;
        }

        var counter = makeCounter();
        print counter();
        print counter();
        var other = makeCounter();
        print other();
        print counter();
    "#;
    assert_eq!(run(src)?, "1\n2\n1\n3\n");
    Ok(())
}

#[test]
fn closure_captures_declaration_scope_not_call_scope() -> Result<(), LoxError> {
    let src = r#"
        var a = "global";
        {
            fun show() {
                print a;
            }
            show();
            var a = "block";
            show();
        }
    "#;
    // Without a resolver, the closure sees the block's later definition.
    assert_eq!(run(src)?, "global\nblock\n");
    Ok(())
}

#[test]
fn recursive_factorial() -> Result<(), LoxError> {
    let src = r#"
        fun fact(n) {
            if (n <= 1) return 1;
            return n * fact(n - 1);
        }
        print fact(10);
    "#;
    assert_eq!(run(src)?, "3628800\n");
    Ok(())
}

#[test]
fn recursive_fibonacci_in_a_loop() -> Result<(), LoxError> {
    let src = r#"
        fun fib(n) {
            if (n < 2) return n;
            return fib(n - 2) + fib(n - 1);
        }
        for (var i = 0; i < 10; i = i + 1) {
            print fib(i);
        }
    "#;
    assert_eq!(run(src)?, "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n");
    Ok(())
}

#[test]
fn local_function_recursion() -> Result<(), LoxError> {
    let src = r#"
        {
            fun countdown(n) {
                if (n < 0) return;
                print n;
                countdown(n - 1);
            }
            countdown(2);
        }
    "#;
    assert_eq!(run(src)?, "2\n1\n0\n");
    Ok(())
}

#[test]
fn assignment_walks_the_chain_declaration_does_not() -> Result<(), LoxError> {
    let src = r#"
        var outer = 1;
        var shadowed = "outer";
        {
            outer = 2;
            var shadowed = "inner";
            print shadowed;
        }
        print outer;
        print shadowed;
    "#;
    assert_eq!(run(src)?, "inner\n2\nouter\n");
    Ok(())
}

#[test]
fn block_variable_is_not_visible_afterwards() {
    let (err, output) = run_failing("{\n  var hidden = 1;\n  print hidden;\n}\nprint hidden;");
    assert_eq!(output, "1\n");
    assert_eq!(err.to_string(), "Undefined variable 'hidden'.\n[line 5]");
    assert_eq!(err.exit_code(), 70);
}

#[test]
fn return_unwinds_loops_and_blocks() -> Result<(), LoxError> {
    let src = r#"
        fun firstOver(limit) {
            var i = 0;
            while (true) {
                {
                    if (i * i > limit) return i;
                }
                i = i + 1;
            }
        }
        print firstOver(50);
    "#;
    assert_eq!(run(src)?, "8\n");
    Ok(())
}

#[test]
fn logical_operators_return_operands() -> Result<(), LoxError> {
    let src = r#"
        print "hi" or 2;
        print nil or "yes";
        print nil and boom();
        print 1 and 2;
        var called = false;
        fun touch() { called = true; return true; }
        true or touch();
        print called;
    "#;
    assert_eq!(run(src)?, "hi\nyes\nnil\n2\nfalse\n");
    Ok(())
}

#[test]
fn truthiness_in_conditions() -> Result<(), LoxError> {
    let src = r#"
        if (0) print "zero"; else print "no zero";
        if ("") print "empty"; else print "no empty";
        if (nil) print "nil"; else print "no nil";
        if (false) print "false"; else print "no false";
    "#;
    assert_eq!(run(src)?, "zero\nempty\nno nil\nno false\n");
    Ok(())
}

#[test]
fn string_concatenation_and_equality() -> Result<(), LoxError> {
    let src = r#"
        var greeting = "hello" + ", " + "world";
        print greeting;
        print greeting == "hello, world";
        print 1 == "1";
        print nil == nil;
        print nil != false;
    "#;
    assert_eq!(run(src)?, "hello, world\ntrue\nfalse\ntrue\ntrue\n");
    Ok(())
}

#[test]
fn functions_are_first_class() -> Result<(), LoxError> {
    let src = r#"
        fun twice(f, x) { return f(f(x)); }
        fun inc(n) { return n + 1; }
        print twice(inc, 5);
        print inc;
        print clock;
        var alias = inc;
        print alias == inc;
        print clock() > 0;
    "#;
    assert_eq!(run(src)?, "7\n<fn inc>\n<native fn>\ntrue\ntrue\n");
    Ok(())
}

#[test]
fn mixed_addition_is_a_runtime_error() {
    let (err, _) = run_failing("print 1 + \"b\";");
    assert_eq!(
        err.to_string(),
        "Operands must be two numbers or two strings.\n[line 1]"
    );
    assert_eq!(err.exit_code(), 70);
}

#[test]
fn arity_mismatch_names_both_counts() {
    let src = "fun pair(a, b) { return a; }\nprint \"before\";\npair(1, 2, 3);";
    let (err, output) = run_failing(src);
    assert_eq!(output, "before\n");
    assert_eq!(err.to_string(), "Expected 2 arguments but got 3.\n[line 3]");
    assert_eq!(err.exit_code(), 70);
}

#[test]
fn calling_a_string_fails() {
    let (err, _) = run_failing("\"not a function\"();");
    assert_eq!(err.to_string(), "Can only call functions and classes.\n[line 1]");
}

#[test]
fn all_syntax_errors_are_reported_and_nothing_runs() {
    let src = "print \"start\";\nvar 1 = 2;\nprint (3;\nfun f( { }\nprint \"end\";";
    let (err, output) = run_failing(src);
    assert_eq!(output, "");
    assert_eq!(err.exit_code(), 65);
    match err {
        LoxError::Static(diags) => assert_eq!(
            diags.to_string(),
            [
                "[line 2] Error at '1': Expect variable name.",
                "[line 3] Error at ';': Expect ')' after expression.",
                "[line 4] Error at '{': Expect parameter name.",
            ]
            .join("\n")
        ),
        e => panic!("unexpected error: {:?}", e),
    }
}

#[test]
fn repl_style_sessions_share_globals() -> Result<(), LoxError> {
    let mut raw_output: Vec<u8> = Vec::new();
    let mut interp = Interpreter::new(&mut raw_output);
    interp.run("fun square(x) { return x * x; }")?;
    interp.run("var n = square(4);")?;
    assert!(interp.run("print n +;").is_err());
    assert!(interp.run("print missing;").is_err());
    interp.run("print n;")?;
    assert_eq!(String::from_utf8_lossy(&raw_output), "16\n");
    Ok(())
}

#[test]
fn error_inside_block_restores_enclosing_scope() -> Result<(), LoxError> {
    let mut raw_output: Vec<u8> = Vec::new();
    let mut interp = Interpreter::new(&mut raw_output);
    interp.run("var x = \"global\";")?;
    assert!(interp
        .run("{ var x = \"inner\"; undefined_name; }")
        .is_err());
    interp.run("print x;")?;
    assert_eq!(String::from_utf8_lossy(&raw_output), "global\n");
    Ok(())
}

#[test]
fn error_inside_called_function_restores_enclosing_scope() -> Result<(), LoxError> {
    let mut raw_output: Vec<u8> = Vec::new();
    let mut interp = Interpreter::new(&mut raw_output);
    interp.run("var x = \"global\";\nfun fail(x) { var y = x; return y + 1; }")?;
    let err = match interp.run("{\n  var x = \"inner\";\n  fail(\"text\");\n}") {
        Err(e) => e,
        Ok(()) => panic!("call was expected to fail"),
    };
    assert_eq!(
        err.to_string(),
        "Operands must be two numbers or two strings.\n[line 2]"
    );
    interp.run("print x;")?;
    assert_eq!(String::from_utf8_lossy(&raw_output), "global\n");
    Ok(())
}

#[test]
fn parse_command_renders_expression_tree() -> Result<(), LoxError> {
    let mut raw_output: Vec<u8> = Vec::new();
    let interp = Interpreter::new(&mut raw_output);
    assert_eq!(interp.parse_expression("1 + 2 * 3")?.to_string(), "(+ 1.0 (* 2.0 3.0))");
    assert_eq!(
        interp.parse_expression("-(\"a\" == nil)")?.to_string(),
        "(- (group (== a nil)))"
    );
    Ok(())
}

#[test]
fn evaluate_command_prints_literal_values_back() -> Result<(), LoxError> {
    let mut raw_output: Vec<u8> = Vec::new();
    let mut interp = Interpreter::new(&mut raw_output);
    assert_eq!(interp.evaluate("42")?.to_string(), "42");
    assert_eq!(interp.evaluate("3.25")?.to_string(), "3.25");
    assert_eq!(interp.evaluate("\"quoted text\"")?.to_string(), "quoted text");
    Ok(())
}

#[test]
fn tokenize_dump() {
    let mut raw_output: Vec<u8> = Vec::new();
    let interp = Interpreter::new(&mut raw_output);
    let (tokens, diags) = interp.tokenize("var x = \"s\";\n1.5 >= $");
    let dump = tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    assert_eq!(
        dump,
        [
            "VAR var null",
            "IDENTIFIER x null",
            "EQUAL = null",
            "STRING \"s\" s",
            "SEMICOLON ; null",
            "NUMBER 1.5 1.5",
            "GREATER_EQUAL >= null",
            "EOF  null",
        ]
        .join("\n")
    );
    assert_eq!(diags.to_string(), "[line 2] Error: Unexpected character: $");
}
