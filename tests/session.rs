#[cfg(test)]
mod session_tests {
    use std::io::{self, Write};

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use rox::session::{EXIT_DATA_ERR, EXIT_SOFTWARE};
    use rox::Session;

    fn output(session: &Session<Vec<u8>>) -> String {
        String::from_utf8(session.output().clone()).unwrap()
    }

    #[rstest]
    #[case("print 1;", 0)]
    #[case("print 1; print ;", EXIT_DATA_ERR)]
    #[case("print 1; @", EXIT_DATA_ERR)]
    #[case("{ var a = a; }", EXIT_DATA_ERR)]
    #[case("print 1; print nil + 1;", EXIT_SOFTWARE)]
    fn exit_codes(#[case] source: &str, #[case] expected: i32) {
        let mut session = Session::new(Vec::new());

        assert_eq!(session.run(source).exit_code(), expected);
    }

    #[rstest]
    #[case("print 1; print ;")]
    #[case("print 1; @")]
    #[case("print 1; { var a = a; }")]
    fn static_errors_prevent_execution(#[case] source: &str) {
        let mut session = Session::new(Vec::new());
        let report = session.run(source);

        assert!(report.had_static_error());
        assert!(!report.had_runtime_error());
        assert_eq!(output(&session), "");
    }

    #[test]
    fn diagnostics_from_every_phase_are_collected() {
        let mut session = Session::new(Vec::new());
        let report = session.run("@\nprint ;\n{ var a = a; }");

        assert_eq!(
            report.messages(),
            vec![
                "[line 1] Error: Unexpected character.",
                "[line 2] Error at ';': Expect expression.",
                "[line 3] Error at 'a': Can't read local variable in its own initializer.",
            ]
        );
    }

    #[test]
    fn globals_persist_across_runs() {
        let mut session = Session::new(Vec::new());

        session.run("var a = 1;");
        session.run("fun inc() { a = a + 1; }");
        let report = session.run("inc(); print a;");

        assert_eq!(report.exit_code(), 0);
        assert_eq!(output(&session), "2\n");
    }

    #[test]
    fn closures_from_earlier_runs_still_resolve() {
        let mut session = Session::new(Vec::new());

        session.run("fun mk() { var n = 0; fun c() { n = n + 1; return n; } return c; }");
        session.run("var c = mk();");
        session.run("{ var n = 100; print c(); }");
        session.run("print c();");

        assert_eq!(output(&session), "1\n2\n");
    }

    #[test]
    fn session_recovers_after_errors() {
        let mut session = Session::new(Vec::new());

        assert_eq!(session.run("print ;").exit_code(), EXIT_DATA_ERR);
        assert_eq!(
            session.run("{ var inner = 1; print nil + 1; }").exit_code(),
            EXIT_SOFTWARE
        );

        // The block's frame was unwound with the error.
        let report = session.run("print inner;");
        assert_eq!(
            report.messages(),
            vec!["[line 1] Error at 'inner': Undefined variable 'inner'."]
        );

        assert_eq!(session.run("print \"ok\";").exit_code(), 0);
        assert_eq!(output(&session), "ok\n");
    }

    #[test]
    fn globals_seen_by_resolver_in_later_runs() {
        let mut session = Session::new(Vec::new());

        session.run("var a = \"outer\";");
        let report = session.run("{ var a = a; print a; }");

        assert_eq!(report.exit_code(), 0);
        assert_eq!(output(&session), "outer\n");
    }

    struct ClosedSink;

    impl Write for ClosedSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failing_output_sink_is_a_runtime_error() {
        let mut session = Session::new(ClosedSink);
        let report = session.run("print 1;");

        assert_eq!(report.exit_code(), EXIT_SOFTWARE);
        assert_eq!(
            report.messages(),
            vec!["failed to write program output: closed"]
        );
    }
}
