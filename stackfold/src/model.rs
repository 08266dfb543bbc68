use serde::Deserialize;
use serde::Serialize;

// Lowest address the runtime hands out for heap or stack allocations on
// 64-bit targets; values at or above it are treated as pointer-shaped.
pub const HEAP_FLOOR: u64 = 0xc0_0000_0000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Func {
    pub complete: String,
    pub import_path: String,
    pub dir_name: String,
    pub name: String,
    pub is_exported: bool,
    pub is_pkg_main: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Arg {
    Value(u64),
    Name(String),
}

impl Arg {
    pub fn is_ptr(&self) -> bool {
        matches!(self, Arg::Value(v) if *v >= HEAP_FLOOR)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Args {
    pub values: Vec<Arg>,
    pub elided: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Location {
    Unknown,
    Stdlib,
    Gopath,
    GoPkg,
    GoMod,
    Vendor,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub func: Func,
    pub args: Args,
    pub remote_src_path: String,
    pub local_src_path: String,
    pub rel_src_path: String,
    pub dir_src: String,
    pub src_name: String,
    pub line: u64,
    pub location: Location,
    pub import_path: String,
    pub is_stdlib: bool,
    pub is_pkg_main: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    pub calls: Vec<Call>,
    pub elided: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub state: String,
    pub sleep_min: u32,
    pub sleep_max: u32,
    pub locked_to_thread: bool,
    pub stack: Stack,
    pub created_by: Stack,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Goroutine {
    pub id: u64,
    pub signature: Signature,
    pub count: usize,
}

pub fn snapshot_json(goroutines: &[Goroutine]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(goroutines)
}
