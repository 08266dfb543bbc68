use indexmap::IndexMap;
use stackfold::dump::parse_dump;
use stackfold::locate::{RootConfig, resolve};
use stackfold::model::Location;
use stackfold::symbol::parse_symbol;

fn module_cache_roots() -> RootConfig {
    RootConfig {
        module_cache_roots: IndexMap::from([(
            "/go/pkg/mod".to_string(),
            "/local/mod".to_string(),
        )]),
        ..RootConfig::default()
    }
}

#[test]
fn versioned_module_cache_frames_keep_the_version_in_the_import_path() {
    let text = [
        "goroutine 8 [select]:",
        "github.com/foo/bar.Get(0xc820082000)",
        "\t/go/pkg/mod/github.com/foo/bar@v2.3.0/client.go:77 +0x12",
        "",
    ]
    .join("\n");
    let goroutines = parse_dump(&text, &module_cache_roots()).unwrap();
    let call = &goroutines[0].signature.stack.calls[0];
    assert_eq!(call.location, Location::GoPkg);
    assert_eq!(call.import_path, "github.com/foo/bar@v2.3.0");
    assert_eq!(
        call.local_src_path,
        "/local/mod/github.com/foo/bar@v2.3.0/client.go"
    );
}

#[test]
fn versioned_module_cache_display_names_drop_the_version() {
    let func = parse_symbol("github.com/foo/bar.Get").unwrap();
    let resolved = resolve(
        &func,
        "/go/pkg/mod/github.com/foo/bar@v2.3.0/client.go",
        &module_cache_roots(),
    );
    assert_eq!(resolved.import_path, "github.com/foo/bar@v2.3.0");
    assert_eq!(resolved.dir_name, "bar");
}
