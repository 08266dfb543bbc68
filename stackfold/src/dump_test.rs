use indexmap::IndexMap;

use crate::dump::{DumpStreamParser, parse_dump, parse_dump_lenient};
use crate::error::DumpError;
use crate::locate::RootConfig;
use crate::model::Location;

fn roots() -> RootConfig {
    RootConfig {
        goroot_remote: "/goroot".to_string(),
        goroot_local: "/usr/local/go".to_string(),
        gopath_pairs: IndexMap::from([(
            "/remote/gopath".to_string(),
            "/local/gopath".to_string(),
        )]),
        module_cache_roots: IndexMap::new(),
        go_mod_roots: IndexMap::new(),
    }
}

fn two_goroutine_dump() -> String {
    [
        "goroutine 1 [running]:",
        "main.crash(0xc82000a3c0, 0x1)",
        "\t/remote/gopath/src/example.com/app/main.go:42 +0x6b",
        "runtime.main()",
        "\t/goroot/src/runtime/proc.go:110 +0x2b",
        "",
        "goroutine 5 [chan receive, 5~10 minutes, locked to thread]:",
        "example.com/app/worker.pull(0xc820082000)",
        "\t/remote/gopath/src/example.com/app/worker/worker.go:18 +0x33",
        "created by example.com/app/worker.StartPool",
        "\t/remote/gopath/src/example.com/app/worker/worker.go:10 +0x71",
        "",
    ]
    .join("\n")
}

#[test]
fn parse_dump_builds_headers_frames_and_created_by() {
    let goroutines = parse_dump(&two_goroutine_dump(), &roots()).unwrap();
    assert_eq!(goroutines.len(), 2);

    let first = &goroutines[0];
    assert_eq!(first.id, 1);
    assert_eq!(first.signature.state, "running");
    assert_eq!(first.count, 1);
    assert_eq!(first.signature.stack.calls.len(), 2);
    assert!(first.signature.created_by.calls.is_empty());

    let second = &goroutines[1];
    assert_eq!(second.id, 5);
    assert_eq!(second.signature.state, "chan receive");
    assert_eq!(second.signature.sleep_min, 5);
    assert_eq!(second.signature.sleep_max, 10);
    assert!(second.signature.locked_to_thread);
    let created_by = &second.signature.created_by;
    assert_eq!(created_by.calls.len(), 1);
    assert_eq!(
        created_by.calls[0].func.complete,
        "example.com/app/worker.StartPool"
    );
    // The printed created-by line number is the go statement site, untouched.
    assert_eq!(created_by.calls[0].line, 10);
}

#[test]
fn parse_dump_stores_stacks_root_first() {
    let goroutines = parse_dump(&two_goroutine_dump(), &roots()).unwrap();
    let calls = &goroutines[0].signature.stack.calls;
    assert_eq!(calls[0].func.complete, "runtime.main");
    assert_eq!(calls[1].func.complete, "main.crash");
}

#[test]
fn parse_dump_resolves_frame_locations() {
    let goroutines = parse_dump(&two_goroutine_dump(), &roots()).unwrap();
    let calls = &goroutines[0].signature.stack.calls;
    assert_eq!(calls[0].location, Location::Stdlib);
    assert!(calls[0].is_stdlib);
    assert_eq!(calls[0].local_src_path, "/usr/local/go/src/runtime/proc.go");
    assert_eq!(calls[1].location, Location::Gopath);
    assert_eq!(calls[1].import_path, "example.com/app");
    assert!(calls[1].is_pkg_main);
    assert_eq!(calls[1].remote_src_path, "/remote/gopath/src/example.com/app/main.go");
}

#[test]
fn parse_dump_preserves_argument_elision() {
    let args = (0..10).map(|i| format!("0x{i:x}")).collect::<Vec<_>>();
    let text = format!(
        "goroutine 9 [runnable]:\nmain.wide({}, ...)\n\t/remote/gopath/src/example.com/app/main.go:7 +0x1\n",
        args.join(", ")
    );
    let goroutines = parse_dump(&text, &roots()).unwrap();
    let frame_args = &goroutines[0].signature.stack.calls[0].args;
    assert!(frame_args.elided);
    assert_eq!(frame_args.values.len(), 10);
}

#[test]
fn parse_dump_preserves_frame_count_elision() {
    let text = [
        "goroutine 3 [select]:",
        "main.loop()",
        "\t/remote/gopath/src/example.com/app/main.go:12 +0x1",
        "...additional frames elided...",
        "",
    ]
    .join("\n");
    let goroutines = parse_dump(&text, &roots()).unwrap();
    assert!(goroutines[0].signature.stack.elided);
}

#[test]
fn parse_dump_falls_back_to_opaque_funcs_on_bad_symbols() {
    let text = [
        "goroutine 2 [running]:",
        "main.%zz(0x1)",
        "\t/remote/gopath/src/example.com/app/main.go:3 +0x1",
        "",
    ]
    .join("\n");
    let goroutines = parse_dump(&text, &roots()).unwrap();
    let func = &goroutines[0].signature.stack.calls[0].func;
    assert_eq!(func.complete, "main.%zz");
    assert_eq!(func.import_path, "");
}

#[test]
fn parse_dump_errors_on_junk_inside_a_block() {
    let text = [
        "goroutine 1 [running]:",
        "main.crash()",
        "\t/remote/gopath/src/example.com/app/main.go:42 +0x6b",
        "log: unrelated interleaved output",
        "",
    ]
    .join("\n");
    let err = parse_dump(&text, &roots()).unwrap_err();
    match err {
        DumpError::FrameSyntax { line_no, line } => {
            assert_eq!(line_no, 4);
            assert_eq!(line, "log: unrelated interleaved output");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn parse_dump_tolerates_noise_outside_blocks_even_in_strict_mode() {
    let text = [
        "panic: oh no",
        "",
        "goroutine 1 [running]:",
        "main.crash()",
        "\t/remote/gopath/src/example.com/app/main.go:42 +0x6b",
        "",
        "exit status 2",
    ]
    .join("\n");
    let goroutines = parse_dump(&text, &roots()).unwrap();
    assert_eq!(goroutines.len(), 1);
}

#[test]
fn parse_dump_reports_truncated_input_with_the_partial_block() {
    let text = [
        "goroutine 1 [running]:",
        "main.crash()",
        "\t/remote/gopath/src/example.com/app/main.go:42 +0x6b",
        "runtime.main()",
    ]
    .join("\n");
    let err = parse_dump(&text, &roots()).unwrap_err();
    match err {
        DumpError::TruncatedInput {
            goroutine_id,
            goroutines,
        } => {
            assert_eq!(goroutine_id, 1);
            assert_eq!(goroutines.len(), 1);
            assert_eq!(goroutines[0].signature.stack.calls.len(), 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn lenient_parse_reports_unclassified_lines_and_keeps_goroutines() {
    let noisy = [
        "2026/02/11 10:12:01 worker heartbeat ok",
        "goroutine 1 [running]:",
        "main.crash(0xc82000a3c0, 0x1)",
        "\t/remote/gopath/src/example.com/app/main.go:42 +0x6b",
        "runtime.main()",
        "\t/goroot/src/runtime/proc.go:110 +0x2b",
        "",
        "2026/02/11 10:12:02 shutting down",
    ]
    .join("\n");
    let report = parse_dump_lenient(&noisy, &roots());
    assert!(!report.truncated);
    assert_eq!(report.goroutines.len(), 1);
    assert_eq!(report.unclassified.len(), 2);
    assert_eq!(report.unclassified[0].line_no, 1);

    let clean = two_goroutine_dump();
    let strict = parse_dump(&clean, &roots()).unwrap();
    let lenient = parse_dump_lenient(&clean, &roots());
    assert_eq!(strict, lenient.goroutines);
    assert!(lenient.unclassified.is_empty());
}

#[test]
fn lenient_parse_flags_truncation_instead_of_failing() {
    let text = ["goroutine 7 [select]:", "main.spin()"].join("\n");
    let report = parse_dump_lenient(&text, &roots());
    assert!(report.truncated);
    assert_eq!(report.goroutines.len(), 1);
    assert!(report.goroutines[0].signature.stack.calls.is_empty());
    assert_eq!(report.unclassified.len(), 1);
}

#[test]
fn stream_parser_strips_ansi_and_carriage_returns() {
    let mut parser = DumpStreamParser::new(&roots());
    let lines = [
        "\u{1b}[1m\u{1b}[31mgoroutine 1 [running]:\u{1b}[0m\r",
        "main.crash()\r",
        "\t/remote/gopath/src/example.com/app/main.go:42 +0x6b\r",
        "\r",
    ];
    for line in lines {
        parser.push_line(line).unwrap();
    }
    let goroutines = parser.finish().unwrap();
    assert_eq!(goroutines.len(), 1);
    assert_eq!(goroutines[0].signature.state, "running");
}
