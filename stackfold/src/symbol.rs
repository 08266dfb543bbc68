use crate::error::DumpError;
use crate::model::Func;

pub const ENTRY_PACKAGE: &str = "main";

pub fn parse_symbol(raw: &str) -> Result<Func, DumpError> {
    let complete = percent_decode(raw)?;
    let Some(dot) = package_dot(raw) else {
        let is_exported = first_rune_is_upper(&complete);
        return Ok(Func {
            name: complete.clone(),
            complete,
            import_path: String::new(),
            dir_name: String::new(),
            is_exported,
            is_pkg_main: false,
        });
    };

    let import_path = percent_decode(&raw[..dot])?;
    let name = percent_decode(&raw[dot + 1..])?;
    let dir_name = last_path_segment(&import_path);
    let is_pkg_main = import_path == ENTRY_PACKAGE;
    let is_exported = first_rune_is_upper(unqualified_name(&name));
    Ok(Func {
        complete,
        import_path,
        dir_name,
        name,
        is_exported,
        is_pkg_main,
    })
}

// The dot separating the package segment from the function name: the first
// dot outside any parenthesis group within the last slash-separated segment.
// Escaped dots print as literal "%2e" text, so every '.' seen here is real.
fn package_dot(raw: &str) -> Option<usize> {
    let tail_start = raw.rfind('/').map_or(0, |i| i + 1);
    let mut depth = 0usize;
    for (i, c) in raw[tail_start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => return Some(tail_start + i),
            _ => {}
        }
    }
    None
}

fn unqualified_name(name: &str) -> &str {
    if name.starts_with('(') {
        return name
            .split_once(").")
            .map(|(_, after)| after)
            .unwrap_or(name);
    }
    name.split_once('.').map(|(_, after)| after).unwrap_or(name)
}

fn first_rune_is_upper(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn last_path_segment(import_path: &str) -> String {
    import_path
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn percent_decode(raw: &str) -> Result<String, DumpError> {
    if !raw.contains('%') {
        return Ok(raw.to_string());
    }
    let bytes = raw.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let pair = bytes
            .get(i + 1..i + 3)
            .ok_or_else(|| decode_error(raw, "dangling percent escape"))?;
        let hi = hex_digit(pair[0]).ok_or_else(|| decode_error(raw, "bad escape digit"))?;
        let lo = hex_digit(pair[1]).ok_or_else(|| decode_error(raw, "bad escape digit"))?;
        out.push(hi << 4 | lo);
        i += 3;
    }
    String::from_utf8(out).map_err(|_| decode_error(raw, "escape decodes to invalid utf-8"))
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn decode_error(symbol: &str, message: &str) -> DumpError {
    DumpError::SymbolDecode {
        symbol: symbol.to_string(),
        message: message.to_string(),
    }
}

pub fn opaque_func(raw: &str) -> Func {
    Func {
        complete: raw.to_string(),
        import_path: String::new(),
        dir_name: String::new(),
        name: raw.to_string(),
        is_exported: first_rune_is_upper(raw),
        is_pkg_main: false,
    }
}
