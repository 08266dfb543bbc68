use indexmap::IndexMap;
use stackfold::locate::RootConfig;

pub fn chan_wait_dump() -> &'static str {
    include_str!("../fixtures/chan_wait.txt")
}

pub fn clean_crash_dump() -> &'static str {
    include_str!("../fixtures/clean_crash.txt")
}

pub fn mixed_log_dump() -> &'static str {
    include_str!("../fixtures/mixed_log.txt")
}

pub fn fixture_roots() -> RootConfig {
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
