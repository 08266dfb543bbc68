use stackfold::aggregate::{SimilarityPolicy, aggregate};
use stackfold::dump::parse_dump;
use stackfold_tests::{chan_wait_dump, fixture_roots};

#[test]
fn folded_fixture_summary_is_stable() {
    let goroutines = parse_dump(chan_wait_dump(), &fixture_roots()).unwrap();
    let grouped = aggregate(&goroutines, SimilarityPolicy::AnyValue);

    let out = grouped
        .iter()
        .map(|g| {
            let leaf = g
                .signature
                .stack
                .calls
                .last()
                .map(|call| call.func.complete.as_str())
                .unwrap_or("<empty>");
            format!("{}x {} {}", g.count, g.signature.state, leaf)
        })
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!("fold_summary", out);
}
