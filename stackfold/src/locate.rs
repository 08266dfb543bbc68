use std::path::Path;

use indexmap::IndexMap;
use path_slash::PathExt;

use crate::model::{Call, Func, Location};

#[derive(Debug, Clone, Default)]
pub struct RootConfig {
    pub goroot_remote: String,
    pub goroot_local: String,
    pub gopath_pairs: IndexMap<String, String>,
    pub module_cache_roots: IndexMap<String, String>,
    pub go_mod_roots: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub location: Location,
    pub import_path: String,
    pub declared_import_path: String,
    pub dir_name: String,
    pub local_src_path: String,
    pub rel_src_path: String,
    pub dir_src: String,
    pub src_name: String,
}

pub fn resolve(func: &Func, raw_file: &str, config: &RootConfig) -> ResolvedPath {
    let file = normalize_slashes(raw_file);

    if !config.goroot_remote.is_empty()
        && let Some(rest) = strip_root(&file, &config.goroot_remote)
        && let Some(pkg_rel) = rest.strip_prefix("src/")
    {
        let local_root = if config.goroot_local.is_empty() {
            &config.goroot_remote
        } else {
            &config.goroot_local
        };
        if let Some(resolved) = finish(
            func,
            Location::Stdlib,
            parent_dir(pkg_rel),
            local_root,
            rest,
        ) {
            return resolved;
        }
    }

    for (remote, local) in &config.module_cache_roots {
        if let Some(rest) = strip_root(&file, remote)
            && let Some(resolved) = finish(func, Location::GoPkg, parent_dir(rest), local, rest)
        {
            return resolved;
        }
    }

    for (root, module_path) in &config.go_mod_roots {
        let Some(rest) = strip_root(&file, root) else {
            continue;
        };
        let sub_dir = parent_dir(rest);
        let (location, import_dir) = match vendor_import(sub_dir) {
            Some(vendored) => (Location::Vendor, vendored.to_string()),
            None if sub_dir.is_empty() => (Location::GoMod, module_path.clone()),
            None => (Location::GoMod, format!("{module_path}/{sub_dir}")),
        };
        if let Some(resolved) = finish_with_import(func, location, &import_dir, root, rest) {
            return resolved;
        }
    }

    for (remote, local) in &config.gopath_pairs {
        if let Some(rest) = strip_root(&file, remote)
            && let Some(pkg_rel) = rest.strip_prefix("src/")
            && let Some(resolved) = finish(func, Location::Gopath, parent_dir(pkg_rel), local, rest)
        {
            return resolved;
        }
    }

    ResolvedPath {
        location: Location::Unknown,
        import_path: String::new(),
        declared_import_path: func.import_path.clone(),
        dir_name: String::new(),
        local_src_path: file.clone(),
        rel_src_path: file.clone(),
        dir_src: dir_src_of(&file),
        src_name: file_name_of(&file).to_string(),
    }
}

impl Call {
    // Second pass over an otherwise-immutable Call: fills the resolved
    // location fields from the raw remote path.
    pub fn resolve_paths(&mut self, config: &RootConfig) {
        let resolved = resolve(&self.func, &self.remote_src_path, config);
        self.location = resolved.location;
        self.import_path = resolved.import_path;
        self.local_src_path = resolved.local_src_path;
        self.rel_src_path = resolved.rel_src_path;
        self.dir_src = resolved.dir_src;
        self.src_name = resolved.src_name;
        self.is_stdlib = resolved.location == Location::Stdlib;
    }
}

fn finish(
    func: &Func,
    location: Location,
    import_dir: &str,
    local_root: &str,
    rest: &str,
) -> Option<ResolvedPath> {
    let (location, import_path) = match vendor_import(import_dir) {
        Some(vendored) => (Location::Vendor, vendored.to_string()),
        None => (location, import_dir.to_string()),
    };
    finish_with_import(func, location, &import_path, local_root, rest)
}

fn finish_with_import(
    func: &Func,
    location: Location,
    import_path: &str,
    local_root: &str,
    rest: &str,
) -> Option<ResolvedPath> {
    if import_path.is_empty() {
        return None;
    }
    let local_root = normalize_slashes(local_root);
    let local = Path::new(&local_root)
        .join(rest)
        .to_slash_lossy()
        .to_string();
    let rel = pathdiff::diff_paths(Path::new(&local), Path::new(&local_root))
        .map(|p| p.to_slash_lossy().to_string())
        .unwrap_or_else(|| rest.to_string());
    Some(ResolvedPath {
        location,
        import_path: import_path.to_string(),
        declared_import_path: func.import_path.clone(),
        dir_name: dir_name_of(import_path),
        dir_src: dir_src_of(&local),
        src_name: file_name_of(&local).to_string(),
        local_src_path: local,
        rel_src_path: rel,
    })
}

fn normalize_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

fn strip_root<'a>(file: &'a str, root: &str) -> Option<&'a str> {
    let root = normalize_slashes(root);
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return None;
    }
    file.strip_prefix(root)?.strip_prefix('/')
}

fn parent_dir(rel: &str) -> &str {
    rel.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}

fn dir_src_of(path: &str) -> String {
    let mut parts = path.rsplit('/');
    let file = parts.next().unwrap_or("");
    match parts.next() {
        Some(dir) if !dir.is_empty() => format!("{dir}/{file}"),
        _ => file.to_string(),
    }
}

// The import path keeps any module @version suffix; the display name drops it.
fn dir_name_of(import_path: &str) -> String {
    let segment = import_path.rsplit('/').next().unwrap_or_default();
    segment.split('@').next().unwrap_or_default().to_string()
}

// Strips through the last vendor/ segment of a package-relative directory.
fn vendor_import(import_dir: &str) -> Option<&str> {
    if let Some(rest) = import_dir.strip_prefix("vendor/") {
        if !import_dir.contains("/vendor/") {
            return Some(rest);
        }
    }
    import_dir
        .rfind("/vendor/")
        .map(|i| &import_dir[i + "/vendor/".len()..])
}
