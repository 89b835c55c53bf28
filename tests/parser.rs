#[cfg(test)]
mod parser_tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use rox::ast::{Expr, ExprId, Stmt};
    use rox::ast_printer::AstPrinter;
    use rox::parser::Parser;
    use rox::scanner::Scanner;

    /// Parse `source`, returning the printed program and every diagnostic.
    fn parse(source: &str) -> (String, Vec<String>) {
        let (tokens, lex_errors) = Scanner::new(source).scan_all();
        assert!(lex_errors.is_empty(), "unexpected lex errors: {lex_errors:?}");

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();
        let errors = parser.errors().iter().map(ToString::to_string).collect();

        (AstPrinter::print_program(&statements), errors)
    }

    #[rstest]
    #[case("1 + 2 * 3;", "(; (+ 1.0 (* 2.0 3.0)))")]
    #[case("(1 + 2) * 3;", "(; (* (group (+ 1.0 2.0)) 3.0))")]
    #[case("8 / 4 / 2;", "(; (/ (/ 8.0 4.0) 2.0))")]
    #[case("-1 - -2.5;", "(; (- (- 1.0) (- 2.5)))")]
    #[case("!true == false;", "(; (== (! true) false))")]
    #[case("1 < 2 == 3 >= 4;", "(; (== (< 1.0 2.0) (>= 3.0 4.0)))")]
    #[case("a = b = 3;", "(; (= a (= b 3.0)))")]
    #[case("x or y and z;", "(; (or x (and y z)))")]
    #[case("f(1, \"s\")(2);", "(; (call (call f 1.0 s) 2.0))")]
    #[case("f();", "(; (call f))")]
    fn expression_precedence(#[case] source: &str, #[case] expected: &str) {
        let (printed, errors) = parse(source);

        assert_eq!(errors, Vec::<String>::new());
        assert_eq!(printed, expected);
    }

    #[rstest]
    #[case("print nil;", "(print nil)")]
    #[case("var a;", "(var a)")]
    #[case("var a = \"hi\";", "(var a hi)")]
    #[case("{ var x = 1; print x; }", "(block (var x 1.0) (print x))")]
    #[case("if (a) print 1; else print 2;", "(if a (print 1.0) (print 2.0))")]
    #[case(
        "if (a) if (b) print 1; else print 2;",
        "(if a (if b (print 1.0) (print 2.0)))"
    )]
    #[case("while (x) x = x - 1;", "(while x (; (= x (- x 1.0))))")]
    #[case(
        "fun add(a, b) { return a + b; }",
        "(fun add (a b) (return (+ a b)))"
    )]
    #[case("fun f() { return; }", "(fun f () (return))")]
    fn statements(#[case] source: &str, #[case] expected: &str) {
        let (printed, errors) = parse(source);

        assert_eq!(errors, Vec::<String>::new());
        assert_eq!(printed, expected);
    }

    #[rstest]
    #[case(
        "for (var i = 0; i < 3; i = i + 1) print i;",
        "(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"
    )]
    #[case("for (;;) print 1;", "(while true (print 1.0))")]
    #[case(
        "for (i = 0; i < 1;) print i;",
        "(block (; (= i 0.0)) (while (< i 1.0) (print i)))"
    )]
    #[case("for (; x;) {}", "(while x (block))")]
    fn for_loops_desugar_to_while(#[case] source: &str, #[case] expected: &str) {
        let (printed, errors) = parse(source);

        assert_eq!(errors, Vec::<String>::new());
        assert_eq!(printed, expected);
    }

    #[test]
    fn invalid_assignment_target_is_reported_without_aborting() {
        let (printed, errors) = parse("1 = 2; (a) = 3; print 4;");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at '=': Invalid assignment target.",
                "[line 1] Error at '=': Invalid assignment target.",
            ]
        );
        assert_eq!(printed, "(; 1.0)\n(; (group a))\n(print 4.0)");
    }

    #[test]
    fn missing_semicolon_reports_at_end() {
        let (_, errors) = parse("print 1");

        assert_eq!(errors, vec!["[line 1] Error at end: Expect ';' after value."]);
    }

    #[test]
    fn unclosed_block_reports_at_end() {
        let (_, errors) = parse("{ print 1;");

        assert_eq!(errors, vec!["[line 1] Error at end: Expect '}' after block."]);
    }

    #[test]
    fn synchronizes_and_keeps_parsing() {
        let (printed, errors) = parse("var = 1; print 2; print ;");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at '=': Expect variable name.",
                "[line 1] Error at ';': Expect expression.",
            ]
        );
        assert_eq!(printed, "(print 2.0)");
    }

    #[test]
    fn errors_carry_their_own_line() {
        let (_, errors) = parse("print 1;\n\nprint );\nvar x = 2;");

        assert_eq!(errors, vec!["[line 3] Error at ')': Expect expression."]);
    }

    #[test]
    fn class_declarations_are_not_supported() {
        let (printed, errors) = parse("class Foo {}");

        assert_eq!(errors, vec!["[line 1] Error at 'class': Expect expression."]);
        assert_eq!(printed, "");
    }

    #[test]
    fn too_many_arguments() {
        let args = vec!["0"; 256].join(", ");
        let (printed, errors) = parse(&format!("f({args});"));

        assert_eq!(
            errors,
            vec!["[line 1] Error at '0': Can't have more than 255 arguments."]
        );
        // The call is still built.
        assert!(printed.starts_with("(; (call f 0.0"));
    }

    #[test]
    fn too_many_parameters() {
        let params: Vec<String> = (0..256).map(|i| format!("p{i}")).collect();
        let (_, errors) = parse(&format!("fun f({}) {{}}", params.join(", ")));

        assert_eq!(
            errors,
            vec!["[line 1] Error at 'p255': Can't have more than 255 parameters."]
        );
    }

    #[test]
    fn expression_ids_continue_from_first_id() {
        let (tokens, _) = Scanner::new("a = b;").scan_all();
        let mut parser = Parser::with_first_id(tokens, 10);
        let statements = parser.parse();

        // `a` is parsed as a variable (10) before it turns into the target.
        match &statements[..] {
            [Stmt::Expression(Expr::Assign { id, value, .. })] => {
                assert_eq!(*id, ExprId(12));
                assert!(matches!(**value, Expr::Variable { id: ExprId(11), .. }));
            }
            other => panic!("unexpected statements: {other:?}"),
        }
        assert_eq!(parser.next_id(), 13);
    }

    #[test]
    fn empty_token_buffer_gets_an_eof() {
        let mut parser = Parser::new(Vec::new());

        assert!(parser.parse().is_empty());
        assert!(parser.errors().is_empty());
    }

    #[test]
    fn ast_serializes_to_json() {
        let (tokens, _) = Scanner::new("print 1;").scan_all();
        let statements = Parser::new(tokens).parse();

        let json = serde_json::to_value(&statements).unwrap();

        assert_eq!(json[0]["Print"]["Literal"]["Number"], 1.0);
    }
}
