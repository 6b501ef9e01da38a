#[cfg(test)]
mod interpreter_tests {
    use pretty_assertions::assert_eq;
    use rox::error::{LoxError, RuntimeError};
    use rox::interpreter::Interpreter;
    use rox::output::Output;
    use rox::parser::Parser;
    use rox::resolver::Resolver;
    use rox::scanner::Scanner;
    use rox::value::Value;

    /// Run `source` and return the printed lines plus the outcome.
    fn run(source: &str) -> (Vec<String>, Result<(), LoxError>) {
        let output = Output::buffered();
        let result = rox::run_source(source, output.clone());
        (output.lines(), result)
    }

    fn run_ok(source: &str) -> Vec<String> {
        let (lines, result) = run(source);
        if let Err(e) = result {
            panic!("program failed: {}\noutput so far: {:?}", e, lines);
        }
        lines
    }

    fn run_err(source: &str) -> (Vec<String>, RuntimeError) {
        match run(source) {
            (lines, Err(LoxError::Runtime(e))) => (lines, e),
            (lines, other) => panic!("expected runtime error, got {:?} with {:?}", other, lines),
        }
    }

    // ───────────────────────── scoping ─────────────────────────

    #[test]
    fn block_shadowing_restores_outer_binding() {
        let lines = run_ok("var a = 1; { var a = 2; print a; } print a;");
        assert_eq!(lines, vec!["2", "1"]);
    }

    #[test]
    fn assignment_in_block_reaches_outer_variable() {
        let lines = run_ok("var a = 1; { a = 5; } print a;");
        assert_eq!(lines, vec!["5"]);
    }

    #[test]
    fn closures_bind_lexically_not_dynamically() {
        let lines = run_ok(
            r#"
            var a = "global";
            {
              fun show() { print a; }
              show();
              var a = "block";
              show();
            }
            "#,
        );
        assert_eq!(lines, vec!["global", "global"]);
    }

    #[test]
    fn undefined_variable_read_is_reported() {
        let (_, err) = run_err("print nope;");
        assert!(matches!(err, RuntimeError::UndefinedVariable { ref name, line: 1 } if name == "nope"));
    }

    #[test]
    fn assignment_to_undeclared_global_fails() {
        let (_, err) = run_err("nope = 3;");
        assert!(matches!(err, RuntimeError::UndefinedVariable { .. }));
    }

    // ───────────────────────── closures ─────────────────────────

    #[test]
    fn counter_closure_keeps_state_between_calls() {
        let lines = run_ok(
            r#"
            fun counter() {
              var i = 0;
              fun inc() { i = i + 1; return i; }
              return inc;
            }
            var c = counter();
            print c();
            print c();
            "#,
        );
        assert_eq!(lines, vec!["1", "2"]);
    }

    #[test]
    fn closures_from_one_call_share_captured_variable() {
        let lines = run_ok(
            r#"
            var get;
            var set;
            fun make() {
              var x = 1;
              fun g() { return x; }
              fun s(v) { x = v; }
              get = g;
              set = s;
            }
            make();
            set(42);
            print get();
            "#,
        );
        assert_eq!(lines, vec!["42"]);
    }

    #[test]
    fn recursion_through_the_environment() {
        let lines = run_ok(
            r#"
            fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
            print fib(15);
            "#,
        );
        assert_eq!(lines, vec!["610"]);
    }

    #[test]
    fn return_unwinds_through_loops_and_blocks() {
        let lines = run_ok(
            r#"
            var outer = "untouched";
            fun find() {
              var i = 0;
              while (true) {
                { var outer = "shadow"; if (i == 3) return i; }
                i = i + 1;
              }
            }
            print find();
            print outer;
            "#,
        );
        assert_eq!(lines, vec!["3", "untouched"]);
    }

    #[test]
    fn function_without_return_yields_nil() {
        let lines = run_ok("fun f() {} print f(); print f;");
        assert_eq!(lines, vec!["null", "<fn f>"]);
    }

    #[test]
    fn nil_prints_as_null() {
        let lines = run_ok("print nil; var x; print x;");
        assert_eq!(lines, vec!["null", "null"]);
    }

    #[test]
    fn for_loop_desugars_to_while() {
        let lines = run_ok("for (var i = 0; i < 3; i = i + 1) print i;");
        assert_eq!(lines, vec!["0", "1", "2"]);
    }

    #[test]
    fn wrong_argument_count_is_arity_mismatch() {
        let (_, err) = run_err("fun f(a, b) {} f(1);");
        assert_eq!(
            err,
            RuntimeError::ArityMismatch {
                expected: 2,
                got: 1,
                lexeme: ")".to_string(),
                line: 1
            }
        );
    }

    #[test]
    fn calling_a_non_callable_is_a_type_error() {
        let (_, err) = run_err("\"str\"();");
        assert!(matches!(err, RuntimeError::TypeError { ref message, .. } if message == "Can only call functions and classes."));
    }

    #[test]
    fn clock_is_a_native_global() {
        let lines = run_ok("print clock() > 0; print clock;");
        assert_eq!(lines, vec!["true", "<native fn>"]);
    }

    // ───────────────────────── operators ─────────────────────────

    #[test]
    fn number_string_concatenation_is_coerced_on_either_side() {
        let lines = run_ok(r#"print 1 + "2"; print "2" + 1; print "x" + 2.5; print "a" + "b";"#);
        assert_eq!(lines, vec!["12", "21", "x2.5", "ab"]);
    }

    #[test]
    fn plus_with_other_types_is_a_type_error() {
        let (_, err) = run_err("print true + 1;");
        assert!(matches!(err, RuntimeError::TypeError { ref message, .. } if message == "Operands must be two numbers or two strings."));
    }

    #[test]
    fn division_by_zero_halts_the_program() {
        let (lines, err) = run_err("print 1;\nprint 10 / 0; print 2;");
        assert_eq!(lines, vec!["1"]);
        assert_eq!(err.line(), 2);
        assert_eq!(
            err,
            RuntimeError::DivisionByZero {
                lexeme: "/".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn division_by_negative_zero_is_also_rejected() {
        let (_, err) = run_err("print -3 / -0;");
        assert!(matches!(err, RuntimeError::DivisionByZero { .. }));
    }

    #[test]
    fn division_produces_real_quotient() {
        let lines = run_ok("print 7 / 2; print -9 / 3; print 1 / 4;");
        assert_eq!(lines, vec!["3.5", "-3", "0.25"]);
    }

    #[test]
    fn arithmetic_on_non_numbers_is_a_type_error() {
        let (_, err) = run_err("print \"a\" - 1;");
        assert!(matches!(err, RuntimeError::TypeError { ref lexeme, .. } if lexeme == "-"));

        let (_, err) = run_err("print -\"a\";");
        assert!(matches!(err, RuntimeError::TypeError { ref message, .. } if message == "Operand must be a number."));
    }

    #[test]
    fn truthiness_and_logical_operators_return_operands() {
        let lines = run_ok(
            r#"
            print !nil;
            print !0;
            print !"";
            print nil or "fallback";
            print 0 and "second";
            print false and undefined_never_evaluated;
            print "first" or undefined_never_evaluated;
            "#,
        );
        assert_eq!(lines, vec!["true", "false", "false", "fallback", "second", "false", "first"]);
    }

    #[test]
    fn equality_never_coerces_between_types() {
        let lines = run_ok(
            r#"
            print nil == nil;
            print nil == false;
            print 1 == "1";
            print "a" == "a";
            print 2 != 3;
            "#,
        );
        assert_eq!(lines, vec!["true", "false", "false", "true", "true"]);
    }

    #[test]
    fn signed_zeros_are_distinct_numbers() {
        let lines = run_ok("print 0 == -0; print -0 == -0; print 0 != -0;");
        assert_eq!(lines, vec!["false", "true", "true"]);
    }

    // ───────────────────────── classes ─────────────────────────

    #[test]
    fn constructor_sets_fields() {
        let lines = run_ok("class Pt { ctor(x) { this.x = x; } } var p = Pt(3); print p.x; print p; print Pt;");
        assert_eq!(lines, vec!["3", "Pt instance", "Pt"]);
    }

    #[test]
    fn super_dispatch_is_static() {
        let lines = run_ok(
            r#"
            class A { greet() { return "A"; } }
            class B < A { greet() { return super.greet() + "B"; } }
            print B().greet();
            "#,
        );
        assert_eq!(lines, vec!["AB"]);
    }

    #[test]
    fn super_method_sees_subclass_instance_as_this() {
        let lines = run_ok(
            r#"
            class A { name() { return this.tag; } }
            class B < A {
              ctor() { this.tag = "from B"; }
              name() { return "override"; }
              viaSuper() { return super.name(); }
            }
            class C < B {}
            print C().viaSuper();
            "#,
        );
        assert_eq!(lines, vec!["from B"]);
    }

    #[test]
    fn super_resolves_from_defining_class_not_runtime_class() {
        let lines = run_ok(
            r#"
            class A { m() { return "A"; } }
            class B < A { m() { return "B"; } test() { return super.m(); } }
            class C < B { m() { return "C"; } }
            print C().test();
            "#,
        );
        assert_eq!(lines, vec!["A"]);
    }

    #[test]
    fn constructor_returns_this_even_with_bare_return() {
        let lines = run_ok(
            r#"
            class Early {
              ctor(flag) { this.a = 1; if (flag) return; this.a = 2; }
            }
            var e = Early(true);
            print e.a;
            print Early(false).a;
            print e.ctor(false) == e;
            "#,
        );
        assert_eq!(lines, vec!["1", "2", "true"]);
    }

    #[test]
    fn inherited_constructor_sets_arity() {
        let (_, err) = run_err("class A { ctor(a, b) {} } class B < A {} B(1);");
        assert!(matches!(err, RuntimeError::ArityMismatch { expected: 2, got: 1, .. }));

        let (_, err) = run_err("class Empty {} Empty(1);");
        assert!(matches!(err, RuntimeError::ArityMismatch { expected: 0, got: 1, .. }));
    }

    #[test]
    fn instances_are_shared_by_reference() {
        let lines = run_ok(
            r#"
            class Box {}
            var a = Box();
            var b = a;
            b.value = "shared";
            print a.value;
            print a == b;
            print Box() == Box();
            "#,
        );
        assert_eq!(lines, vec!["shared", "true", "false"]);
    }

    #[test]
    fn bound_methods_remember_their_receiver() {
        let lines = run_ok(
            r#"
            class Person {
              ctor(name) { this.name = name; }
              hello() { return "hi " + this.name; }
            }
            var m = Person("ann").hello;
            print m();
            print m;
            "#,
        );
        assert_eq!(lines, vec!["hi ann", "<fn hello>"]);
    }

    #[test]
    fn fields_shadow_methods() {
        let lines = run_ok(
            r#"
            class T { m() { return "method"; } }
            var t = T();
            t.m = "field";
            print t.m;
            "#,
        );
        assert_eq!(lines, vec!["field"]);
    }

    #[test]
    fn missing_property_is_undefined_property() {
        let (_, err) = run_err("class T {} print T().missing;");
        assert!(matches!(err, RuntimeError::UndefinedProperty { ref name, .. } if name == "missing"));
    }

    #[test]
    fn missing_super_method_is_undefined_property() {
        let (_, err) = run_err("class A {} class B < A { m() { return super.nothing(); } } B().m();");
        assert!(matches!(err, RuntimeError::UndefinedProperty { ref name, .. } if name == "nothing"));
    }

    #[test]
    fn property_access_on_non_instance_is_a_type_error() {
        let (_, err) = run_err("var x = 1; print x.y;");
        assert!(matches!(err, RuntimeError::TypeError { ref message, .. } if message == "Only instances have properties."));

        let (_, err) = run_err("var x = 1; x.y = 2;");
        assert!(matches!(err, RuntimeError::TypeError { ref message, .. } if message == "Only instances have fields."));
    }

    #[test]
    fn superclass_must_be_a_class() {
        let (_, err) = run_err("var NotAClass = 1; class B < NotAClass {}");
        assert!(matches!(err, RuntimeError::TypeError { ref message, ref lexeme, .. }
            if message == "Superclass must be a class." && lexeme == "NotAClass"));
    }

    #[test]
    fn methods_can_reference_their_own_class() {
        let lines = run_ok(
            r#"
            class Node {
              ctor(depth) { this.depth = depth; }
              child() { return Node(this.depth + 1); }
            }
            print Node(0).child().child().depth;
            "#,
        );
        assert_eq!(lines, vec!["2"]);
    }

    #[test]
    fn failed_run_leaves_interpreter_at_global_scope() {
        let output = Output::buffered();
        let mut interpreter = Interpreter::with_output(output.clone());

        let mut run_on = |source: &str| -> Result<(), LoxError> {
            let tokens = Scanner::new(source.as_bytes()).scan_all()?;
            let statements = Parser::new(tokens).parse()?;
            Resolver::new(&mut interpreter).resolve(&statements)?;
            interpreter.interpret(&statements)
        };

        let first = run_on(
            r#"
            var a = "outer";
            fun boom() { var a = "inner"; { var a = "deeper"; print 1 / 0; } }
            boom();
            "#,
        );
        assert!(matches!(first, Err(LoxError::Runtime(RuntimeError::DivisionByZero { .. }))));

        run_on("print a; var b = 1; print b;").unwrap();
        assert_eq!(output.lines(), vec!["outer", "1"]);

        let b = interpreter.globals().borrow().get_local("b");
        assert_eq!(b, Some(Value::Number(1.0)));
    }
}
