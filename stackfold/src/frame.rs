use std::sync::LazyLock;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::DumpError;
use crate::model::{Arg, Args, Func};
use crate::symbol::parse_symbol;

// Bounds on adversarial input: a line longer than this is never part of the
// dump grammar, and no runtime prints more inline argument slots than this.
pub const MAX_LINE_LEN: usize = 32 * 1024;
pub const MAX_FRAME_ARGS: usize = 32;

pub const FRAMES_ELIDED_MARKER: &str = "...additional frames elided...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallLine {
    pub func: Func,
    pub args: Args,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    pub id: u64,
    pub state: String,
    pub sleep_min: u32,
    pub sleep_max: u32,
    pub locked_to_thread: bool,
}

pub fn parse_call_line(line: &str) -> Result<Option<CallLine>, DumpError> {
    let Some((symbol, arg_list)) = split_call_line(line) else {
        return Ok(None);
    };
    let Some(args) = parse_args(arg_list) else {
        return Ok(None);
    };
    let func = parse_symbol(symbol)?;
    Ok(Some(CallLine { func, args }))
}

pub fn split_call_line(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() || line.len() > MAX_LINE_LEN {
        return None;
    }
    if line.starts_with(' ') || line.starts_with('\t') {
        return None;
    }
    let rest = line.trim_end().strip_suffix(')')?;
    let open = rest.rfind('(')?;
    let symbol = &rest[..open];
    if symbol.is_empty() || symbol.contains(' ') {
        return None;
    }
    Some((symbol, &rest[open + 1..]))
}

pub fn parse_args(raw: &str) -> Option<Args> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(Args::default());
    }
    let parts = trimmed.split(", ").collect::<Vec<_>>();
    if parts.len() > MAX_FRAME_ARGS + 1 {
        return None;
    }
    let mut values: Vec<Arg> = Vec::with_capacity(parts.len());
    let mut elided = false;
    for (i, part) in parts.iter().enumerate() {
        if *part == "..." {
            if i + 1 != parts.len() {
                return None;
            }
            elided = true;
            continue;
        }
        values.push(parse_arg(part)?);
    }
    if values.len() > MAX_FRAME_ARGS {
        return None;
    }
    Some(Args { values, elided })
}

fn parse_arg(raw: &str) -> Option<Arg> {
    // Newer runtimes suffix possibly-inaccurate values with '?'.
    let raw = raw.strip_suffix('?').unwrap_or(raw);
    if raw.is_empty() {
        return None;
    }
    if let Some(hex) = raw.strip_prefix("0x") {
        return u64::from_str_radix(hex, 16).ok().map(Arg::Value);
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse().ok().map(Arg::Value);
    }
    is_identifier(raw).then(|| Arg::Name(raw.to_string()))
}

fn is_identifier(raw: &str) -> bool {
    let mut chars = raw.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let head_ok = first.is_alphabetic() || first == '_';
    head_ok && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '·'))
}

pub fn parse_source_line(line: &str) -> Option<(String, u64)> {
    if line.len() > MAX_LINE_LEN {
        return None;
    }
    if !line.starts_with('\t') && !line.starts_with("    ") {
        return None;
    }
    let rest = line.trim();
    let rest = match rest.rsplit_once(" +0x") {
        Some((head, offset))
            if !offset.is_empty() && offset.bytes().all(|b| b.is_ascii_hexdigit()) =>
        {
            head
        }
        _ => rest,
    };
    let (path, line_no) = rest.rsplit_once(':')?;
    if path.is_empty() || path.contains(' ') {
        return None;
    }
    let line_no = line_no.parse::<u64>().ok()?;
    Some((path.to_string(), line_no))
}

pub fn parse_goroutine_header(line: &str) -> Option<HeaderLine> {
    static HEADER_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^goroutine (\d+) \[([^\]]+)\]:$").unwrap());
    if line.len() > MAX_LINE_LEN {
        return None;
    }
    let caps = HEADER_RE.captures(line.trim_end())?;
    let id = caps[1].parse::<u64>().ok()?;
    let mut clauses = caps[2].split(", ");
    let state = clauses.next()?.to_string();
    let mut sleep_min = 0u32;
    let mut sleep_max = 0u32;
    let mut locked_to_thread = false;
    for clause in clauses {
        if clause == "locked to thread" {
            locked_to_thread = true;
            continue;
        }
        let Some(minutes) = clause
            .strip_suffix(" minutes")
            .or_else(|| clause.strip_suffix(" minute"))
        else {
            // Unknown clauses from newer runtimes are ignored.
            continue;
        };
        match minutes.split_once('~') {
            Some((lo, hi)) => {
                sleep_min = lo.trim().parse().ok()?;
                sleep_max = hi.trim().parse().ok()?;
            }
            None => {
                sleep_min = minutes.trim().parse().ok()?;
                sleep_max = sleep_min;
            }
        }
    }
    Some(HeaderLine {
        id,
        state,
        sleep_min,
        sleep_max,
        locked_to_thread,
    })
}

pub fn parse_created_by(line: &str) -> Option<&str> {
    static CREATED_BY_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^created by (\S+?)( in goroutine \d+)?\s*$").unwrap());
    if line.len() > MAX_LINE_LEN {
        return None;
    }
    CREATED_BY_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn is_frames_elided(line: &str) -> bool {
    line.trim() == FRAMES_ELIDED_MARKER
}
