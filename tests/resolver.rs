#[cfg(test)]
mod resolver_tests {
    use pretty_assertions::assert_eq;
    use rox::ast_printer::AstPrinter;
    use rox::error::{LoxError, RuntimeError};
    use rox::interpreter::Interpreter;
    use rox::output::Output;
    use rox::parser::Parser;
    use rox::resolver::Resolver;
    use rox::scanner::Scanner;
    use rox::stmt::Stmt;

    fn parse(source: &str) -> Result<Vec<Stmt>, LoxError> {
        let tokens = Scanner::new(source.as_bytes()).scan_all()?;
        Parser::new(tokens).parse()
    }

    fn resolve_message(source: &str) -> String {
        let statements = parse(source).expect("source should parse");
        let mut interpreter = Interpreter::with_output(Output::buffered());

        match Resolver::new(&mut interpreter).resolve(&statements) {
            Err(LoxError::Resolve { message, .. }) => message,
            other => panic!("expected a resolve error, got {:?}", other),
        }
    }

    fn print_expression(source: &str) -> String {
        let tokens = Scanner::new(source.as_bytes()).scan_all().unwrap();
        let expr = Parser::new(tokens).parse_expression().unwrap();
        AstPrinter.print(&expr)
    }

    #[test]
    fn expressions_print_in_prefix_form() {
        assert_eq!(print_expression("-1 * (2 + 3)"), "(* (- 1.0) (group (+ 2.0 3.0)))");
        assert_eq!(print_expression("a = b or c"), "(= a (or b c))");
        assert_eq!(print_expression("obj.field.call(1)"), "(call (. call (. field obj)) 1.0)");
    }

    #[test]
    fn invalid_assignment_target_is_a_parse_error() {
        let err = parse("1 = 2;").unwrap_err();
        assert!(matches!(err, LoxError::Parse { ref message, .. } if message == "Invalid assignment target."));
    }

    #[test]
    fn missing_semicolon_is_reported_at_end() {
        let err = parse("print 1").unwrap_err();
        assert_eq!(err.to_string(), "[line 1] Error at end: Expect ';' after value.");
    }

    #[test]
    fn return_at_top_level_is_rejected() {
        assert_eq!(resolve_message("return 1;"), "Can't return from top-level code.");
    }

    #[test]
    fn reading_local_in_its_own_initializer_is_rejected() {
        assert_eq!(
            resolve_message("{ var a = a; }"),
            "Can't read local variable in its own initializer."
        );
    }

    #[test]
    fn redeclaring_a_local_is_rejected() {
        assert_eq!(
            resolve_message("fun f() { var a = 1; var a = 2; }"),
            "Already a variable with this name in this scope."
        );
    }

    #[test]
    fn this_outside_class_is_rejected() {
        assert_eq!(resolve_message("print this;"), "Can't use 'this' outside of a class.");
    }

    #[test]
    fn super_without_superclass_is_rejected() {
        assert_eq!(
            resolve_message("class A { m() { super.m(); } }"),
            "Can't use 'super' in a class with no superclass."
        );
        assert_eq!(
            resolve_message("fun f() { super.m(); }"),
            "Can't use 'super' outside of a class."
        );
    }

    #[test]
    fn returns_inside_methods_and_constructors_resolve() {
        let statements =
            parse("class A { ctor() { return; } m() { return 2; } } class B < A { ctor() { return 1; } }")
                .unwrap();
        let mut interpreter = Interpreter::with_output(Output::buffered());

        assert!(Resolver::new(&mut interpreter).resolve(&statements).is_ok());
    }

    #[test]
    fn class_inheriting_from_itself_is_rejected() {
        assert_eq!(
            resolve_message("class A < A {}"),
            "A class can't inherit from itself."
        );
    }

    #[test]
    fn globals_may_be_redeclared() {
        let statements = parse("var a = 1; var a = 2; print a;").unwrap();
        let output = Output::buffered();
        let mut interpreter = Interpreter::with_output(output.clone());

        Resolver::new(&mut interpreter).resolve(&statements).unwrap();
        interpreter.interpret(&statements).unwrap();

        assert_eq!(output.lines(), vec!["2"]);
    }

    #[test]
    fn interpreter_persists_globals_across_runs() {
        let output = Output::buffered();
        let mut interpreter = Interpreter::with_output(output.clone());

        for source in ["var count = 1;", "count = count + 1;", "print count;"] {
            let statements = parse(source).unwrap();
            Resolver::new(&mut interpreter).resolve(&statements).unwrap();
            interpreter.interpret(&statements).unwrap();
        }

        assert_eq!(output.lines(), vec!["2"]);
    }

    #[test]
    fn unresolved_top_level_return_reports_its_keyword() {
        let statements = parse("print 1;\n\nreturn 2;").unwrap();
        let output = Output::buffered();
        let mut interpreter = Interpreter::with_output(output.clone());

        let err = interpreter.interpret(&statements).unwrap_err();

        assert!(matches!(err, LoxError::Runtime(RuntimeError::TypeError { ref lexeme, line: 3, .. })
            if lexeme == "return"));
        assert_eq!(output.lines(), vec!["1"]);
    }
}
