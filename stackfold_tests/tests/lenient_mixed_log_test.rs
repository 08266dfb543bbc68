use stackfold::dump::{parse_dump, parse_dump_lenient};
use stackfold_tests::{clean_crash_dump, fixture_roots, mixed_log_dump};

#[test]
fn lenient_parsing_of_a_noisy_log_recovers_the_clean_dump() {
    let from_noisy = parse_dump_lenient(mixed_log_dump(), &fixture_roots());
    let from_clean = parse_dump(clean_crash_dump(), &fixture_roots()).unwrap();
    similar_asserts::assert_eq!(from_noisy.goroutines, from_clean);
    assert!(!from_noisy.truncated);
}

#[test]
fn lenient_parsing_reports_every_non_dump_line() {
    let report = parse_dump_lenient(mixed_log_dump(), &fixture_roots());
    let texts = report
        .unclassified
        .iter()
        .map(|u| u.text.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        texts,
        vec![
            "2026/02/11 10:12:01 worker 3 heartbeat ok",
            "2026/02/11 10:12:01 accepting connections",
            "SIGQUIT: quit",
            "PC=0x45f1d4 m=0 sigcode=0",
            "2026/02/11 10:12:02 shutting down",
        ]
    );
    assert_eq!(report.unclassified[0].line_no, 1);
    assert_eq!(report.unclassified[4].line_no, 12);
}
