#[cfg(test)]
mod interpreter_tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use rox::value::Value;
    use rox::{Config, Report, Session};

    fn run(source: &str) -> (String, Report) {
        run_with(source, Config::default())
    }

    fn run_with(source: &str, config: Config) -> (String, Report) {
        let mut session = Session::with_config(Vec::new(), config);
        let report = session.run(source);
        let output = String::from_utf8(session.into_output()).unwrap();
        (output, report)
    }

    /// Run a program that must succeed and return what it printed.
    fn output_of(source: &str) -> String {
        let (output, report) = run(source);
        assert_eq!(report.messages(), Vec::<String>::new());
        output
    }

    #[rstest]
    #[case("print 1 + 2 * 3;", "7")]
    #[case("print (1 + 2) * 3;", "9")]
    #[case("print 7 / 2;", "3.5")]
    #[case("print 10 - 2.5;", "7.5")]
    #[case("print -0;", "-0")]
    #[case("print 0.1 + 0.2;", "0.30000000000000004")]
    #[case("print \"a\" + \"b\";", "ab")]
    #[case("print 3 > 2;", "true")]
    #[case("print 2 <= 1;", "false")]
    #[case("print nil == nil;", "true")]
    #[case("print nil == false;", "false")]
    #[case("print 0 == false;", "false")]
    #[case("print \"a\" == \"a\";", "true")]
    #[case("print 1 != 2;", "true")]
    #[case("print !nil;", "true")]
    #[case("print !0;", "false")]
    #[case("print !\"\";", "false")]
    #[case("print nil or \"x\";", "x")]
    #[case("print nil or false;", "false")]
    #[case("print 1 and 2;", "2")]
    #[case("print false and 1;", "false")]
    #[case("var a; print a;", "nil")]
    #[case("print clock;", "<native fn>")]
    #[case("print clock() > 0;", "true")]
    #[case("fun f() {} print f;", "<fn f>")]
    #[case("fun f() {} print f();", "nil")]
    #[case("fun f() {} print f == f;", "true")]
    fn prints(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(output_of(source), format!("{expected}\n"));
    }

    #[test]
    fn logical_operators_short_circuit() {
        let source = "
            var hits = 0;
            fun touch() { hits = hits + 1; return true; }
            false and touch();
            true or touch();
            print hits;
        ";

        assert_eq!(output_of(source), "0\n");
    }

    #[test]
    fn closures_keep_their_frame_alive() {
        let source = "
            fun makeCounter() {
                var i = 0;
                fun count() {
                    i = i + 1;
                    print i;
                }
                return count;
            }
            var counter = makeCounter();
            counter();
            counter();
        ";

        assert_eq!(output_of(source), "1\n2\n");
    }

    #[test]
    fn closures_share_the_captured_frame() {
        let source = "
            var get;
            var set;
            {
                var x = 1;
                fun g() { return x; }
                fun s(v) { x = v; }
                get = g;
                set = s;
            }
            set(5);
            print get();
        ";

        assert_eq!(output_of(source), "5\n");
    }

    #[test]
    fn resolution_is_static() {
        let source = "
            var a = \"global\";
            {
                fun showA() { print a; }
                showA();
                var a = \"block\";
                showA();
            }
        ";

        assert_eq!(output_of(source), "global\nglobal\n");
    }

    #[test]
    fn shadowing_initializer_reads_outer_binding() {
        let source = "var a = 1; { var a = a + 1; print a; } print a;";

        assert_eq!(output_of(source), "2\n1\n");
    }

    #[test]
    fn blocks_scope_their_declarations() {
        let source = "var a = 1; { var a = 2; print a; } print a;";

        assert_eq!(output_of(source), "2\n1\n");
    }

    #[test]
    fn redeclaration_overwrites() {
        assert_eq!(output_of("var a = 1; var a = 2; print a;"), "2\n");
        assert_eq!(output_of("{ var a = 1; var a = 2; print a; }"), "2\n");
    }

    #[test]
    fn assignment_is_right_associative_and_yields_its_value() {
        let source = "var a; var b; a = b = 3; print a; print b;";

        assert_eq!(output_of(source), "3\n3\n");
    }

    #[test]
    fn recursion() {
        let source = "
            fun fib(n) {
                if (n < 2) return n;
                return fib(n - 1) + fib(n - 2);
            }
            print fib(10);
        ";

        assert_eq!(output_of(source), "55\n");
    }

    #[test]
    fn for_loop_matches_while_loop() {
        let with_for = output_of("for (var i = 0; i < 3; i = i + 1) print i;");
        let with_while = output_of("var i = 0; while (i < 3) { print i; i = i + 1; }");

        assert_eq!(with_for, "0\n1\n2\n");
        assert_eq!(with_for, with_while);
    }

    #[test]
    fn return_unwinds_out_of_loops() {
        let source = "
            fun first() {
                var i = 0;
                while (true) {
                    if (i == 2) return i;
                    i = i + 1;
                }
            }
            print first();
        ";

        assert_eq!(output_of(source), "2\n");
    }

    #[test]
    fn top_level_return_stops_quietly() {
        let (output, report) = run("print 1; return; print 2;");

        assert_eq!(output, "1\n");
        assert_eq!(report.exit_code(), 0);
    }

    #[rstest]
    #[case("print -\"a\";", "[line 1] Error at '-': Operand must be a number.")]
    #[case(
        "print 1 + \"a\";",
        "[line 1] Error at '+': Operands must be two numbers or two strings."
    )]
    #[case("print 1 < \"a\";", "[line 1] Error at '<': Operands must be numbers.")]
    #[case("print nil * 2;", "[line 1] Error at '*': Operands must be numbers.")]
    #[case(
        "print missing;",
        "[line 1] Error at 'missing': Undefined variable 'missing'."
    )]
    #[case("x = 1;", "[line 1] Error at 'x': Undefined variable 'x'.")]
    #[case("\"s\"();", "[line 1] Error at ')': Can only call functions.")]
    #[case(
        "fun f() {} f(1);",
        "[line 1] Error at ')': Expected 0 arguments but got 1."
    )]
    #[case(
        "fun f(a, b) {}\nf(1);",
        "[line 2] Error at ')': Expected 2 arguments but got 1."
    )]
    #[case("clock(1);", "[line 1] Error at ')': Expected 0 arguments but got 1.")]
    fn runtime_errors(#[case] source: &str, #[case] expected: &str) {
        let (_, report) = run(source);

        assert_eq!(report.messages(), vec![expected]);
        assert_eq!(report.exit_code(), 70);
    }

    #[test]
    fn runtime_error_keeps_earlier_output() {
        let (output, report) = run("print 1; print -\"a\"; print 2;");

        assert_eq!(output, "1\n");
        assert!(report.had_runtime_error());
    }

    #[test]
    fn call_depth_is_bounded() {
        let config = Config { max_call_depth: 16 };
        let (_, report) = run_with("fun r() { r(); }\nr();", config);

        assert_eq!(
            report.messages(),
            vec!["[line 1] Error at ')': Stack overflow."]
        );
    }

    #[test]
    fn recursion_within_the_bound_succeeds() {
        let config = Config { max_call_depth: 16 };
        let source = "fun d(n) { if (n > 0) return d(n - 1); return 0; } print d(10);";
        let (output, report) = run_with(source, config);

        assert_eq!(report.exit_code(), 0);
        assert_eq!(output, "0\n");
    }

    const NESTED_RECURSION: &str = "fun d(n) { { { { { { { { { if (n > 0) { while (true) { return d(n - 1); } } } } } } } } } } return 0; }";

    #[test]
    fn deep_nesting_near_the_default_depth_limit_completes() {
        let source = format!("{NESTED_RECURSION} print d(250);");

        assert_eq!(output_of(&source), "0\n");
    }

    #[test]
    fn deep_nesting_past_the_default_depth_limit_reports_overflow() {
        let source = format!("{NESTED_RECURSION} print d(300);");
        let (output, report) = run(&source);

        assert_eq!(output, "");
        assert_eq!(
            report.messages(),
            vec!["[line 1] Error at ')': Stack overflow."]
        );
        assert_eq!(report.exit_code(), 70);
    }

    #[test]
    fn assignment_in_own_initializer_targets_the_new_binding() {
        let source = "var a = 1; { var a = a = 2; print a; } print a;";

        assert_eq!(output_of(source), "2\n1\n");
        assert_eq!(output_of("{ var b = b = 1; print b; }"), "1\n");
    }

    #[test]
    fn values_display_like_lox() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::from("raw").to_string(), "raw");
        assert_eq!(Value::from(true).to_string(), "true");
    }

    #[test]
    fn only_nil_and_false_are_falsy() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::from("").is_truthy());
    }
}
