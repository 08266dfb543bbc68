use serde::Deserialize;
use serde::Serialize;

use crate::error::DumpError;
use crate::frame::{
    CallLine, HeaderLine, is_frames_elided, parse_args, parse_created_by, parse_goroutine_header,
    parse_source_line, split_call_line,
};
use crate::locate::RootConfig;
use crate::model::{Args, Call, Func, Goroutine, Location, Signature, Stack};
use crate::symbol::{opaque_func, parse_symbol};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnclassifiedLine {
    pub line_no: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpReport {
    pub goroutines: Vec<Goroutine>,
    pub unclassified: Vec<UnclassifiedLine>,
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Stack,
    CreatedBy,
}

#[derive(Debug, Clone)]
struct PendingFrame {
    call_line: CallLine,
    raw: String,
    line_no: usize,
}

#[derive(Debug, Clone)]
struct OpenBlock {
    id: u64,
    signature: Signature,
    section: Section,
    pending: Option<PendingFrame>,
}

impl OpenBlock {
    fn open(header: HeaderLine) -> Self {
        Self {
            id: header.id,
            signature: Signature {
                state: header.state,
                sleep_min: header.sleep_min,
                sleep_max: header.sleep_max,
                locked_to_thread: header.locked_to_thread,
                stack: Stack::default(),
                created_by: Stack::default(),
            },
            section: Section::Stack,
            pending: None,
        }
    }
}

#[derive(Debug, Clone)]
enum BlockLine {
    Call(CallLine),
    Source(String, u64),
    CreatedBy(Func),
    FramesElided,
    Unrecognized,
}

#[derive(Debug, Clone)]
pub struct DumpStreamParser {
    config: RootConfig,
    strict: bool,
    line_no: usize,
    current: Option<OpenBlock>,
    goroutines: Vec<Goroutine>,
    unclassified: Vec<UnclassifiedLine>,
}

impl DumpStreamParser {
    pub fn new(config: &RootConfig) -> Self {
        Self::with_mode(config, true)
    }

    pub fn new_lenient(config: &RootConfig) -> Self {
        Self::with_mode(config, false)
    }

    fn with_mode(config: &RootConfig, strict: bool) -> Self {
        Self {
            config: config.clone(),
            strict,
            line_no: 0,
            current: None,
            goroutines: vec![],
            unclassified: vec![],
        }
    }

    pub fn push_line(&mut self, raw_line: &str) -> Result<(), DumpError> {
        self.line_no += 1;
        let line = sanitize_line(raw_line);

        if let Some(header) = parse_goroutine_header(&line) {
            self.flush_pending()?;
            self.flush_block();
            self.current = Some(OpenBlock::open(header));
            return Ok(());
        }

        if self.current.is_none() {
            // Outside any block every line passes through, in both modes.
            if !line.trim().is_empty() {
                self.unclassified.push(UnclassifiedLine {
                    line_no: self.line_no,
                    text: line,
                });
            }
            return Ok(());
        }

        if line.trim().is_empty() {
            self.flush_pending()?;
            self.flush_block();
            return Ok(());
        }

        self.block_line(line)
    }

    pub fn finish(mut self) -> Result<Vec<Goroutine>, DumpError> {
        let truncated = self.open_block_truncated();
        let goroutine_id = self.current.as_ref().map(|b| b.id).unwrap_or_default();
        if let Some(block) = self.current.as_mut() {
            block.pending.take();
        }
        self.flush_block();
        if truncated {
            return Err(DumpError::TruncatedInput {
                goroutine_id,
                goroutines: self.goroutines,
            });
        }
        Ok(self.goroutines)
    }

    pub fn finish_lenient(mut self) -> DumpReport {
        let truncated = self.open_block_truncated();
        if let Some(block) = self.current.as_mut()
            && let Some(pending) = block.pending.take()
        {
            self.unclassified.push(UnclassifiedLine {
                line_no: pending.line_no,
                text: pending.raw,
            });
        }
        self.flush_block();
        DumpReport {
            goroutines: self.goroutines,
            unclassified: self.unclassified,
            truncated,
        }
    }

    fn block_line(&mut self, line: String) -> Result<(), DumpError> {
        let line_no = self.line_no;
        let classified = classify_block_line(&line);

        // A call line not followed by its source line never forms a frame.
        if !matches!(classified, BlockLine::Source(..)) {
            self.flush_pending()?;
        }

        let Some(block) = self.current.as_mut() else {
            return Ok(());
        };
        match classified {
            BlockLine::Source(path, src_line) => {
                let Some(pending) = block.pending.take() else {
                    return self.unrecognized(line_no, line);
                };
                let call = build_call(pending.call_line, path, src_line, &self.config);
                match block.section {
                    Section::Stack => block.signature.stack.calls.push(call),
                    Section::CreatedBy => block.signature.created_by.calls.push(call),
                }
                Ok(())
            }
            BlockLine::Call(call_line) => {
                block.pending = Some(PendingFrame {
                    call_line,
                    raw: line,
                    line_no,
                });
                Ok(())
            }
            BlockLine::CreatedBy(func) => {
                block.section = Section::CreatedBy;
                block.pending = Some(PendingFrame {
                    call_line: CallLine {
                        func,
                        args: Args::default(),
                    },
                    raw: line,
                    line_no,
                });
                Ok(())
            }
            BlockLine::FramesElided => {
                match block.section {
                    Section::Stack => block.signature.stack.elided = true,
                    Section::CreatedBy => block.signature.created_by.elided = true,
                }
                Ok(())
            }
            BlockLine::Unrecognized => self.unrecognized(line_no, line),
        }
    }

    fn flush_pending(&mut self) -> Result<(), DumpError> {
        let Some(block) = self.current.as_mut() else {
            return Ok(());
        };
        let Some(pending) = block.pending.take() else {
            return Ok(());
        };
        if self.strict {
            return Err(DumpError::FrameSyntax {
                line_no: pending.line_no,
                line: pending.raw,
            });
        }
        self.unclassified.push(UnclassifiedLine {
            line_no: pending.line_no,
            text: pending.raw,
        });
        Ok(())
    }

    fn flush_block(&mut self) {
        let Some(block) = self.current.take() else {
            return;
        };
        let mut signature = block.signature;
        // The runtime prints the leaf frame first; the model is root-first.
        signature.stack.calls.reverse();
        signature.created_by.calls.reverse();
        self.goroutines.push(Goroutine {
            id: block.id,
            signature,
            count: 1,
        });
    }

    fn open_block_truncated(&self) -> bool {
        self.current.as_ref().is_some_and(|block| {
            block.pending.is_some()
                || (block.signature.stack.calls.is_empty()
                    && !block.signature.stack.elided
                    && block.signature.created_by.calls.is_empty())
        })
    }

    fn unrecognized(&mut self, line_no: usize, line: String) -> Result<(), DumpError> {
        if self.strict {
            return Err(DumpError::FrameSyntax { line_no, line });
        }
        self.unclassified.push(UnclassifiedLine {
            line_no,
            text: line,
        });
        Ok(())
    }
}

pub fn parse_dump(text: &str, config: &RootConfig) -> Result<Vec<Goroutine>, DumpError> {
    let mut parser = DumpStreamParser::new(config);
    for line in text.lines() {
        parser.push_line(line)?;
    }
    parser.finish()
}

pub fn parse_dump_lenient(text: &str, config: &RootConfig) -> DumpReport {
    let mut parser = DumpStreamParser::new_lenient(config);
    text.lines().for_each(|line| {
        let _ = parser.push_line(line);
    });
    parser.finish_lenient()
}

fn classify_block_line(line: &str) -> BlockLine {
    if let Some((path, src_line)) = parse_source_line(line) {
        return BlockLine::Source(path, src_line);
    }
    if let Some(symbol) = parse_created_by(line) {
        let func = parse_symbol(symbol).unwrap_or_else(|_| opaque_func(symbol));
        return BlockLine::CreatedBy(func);
    }
    if is_frames_elided(line) {
        return BlockLine::FramesElided;
    }
    if let Some((symbol, arg_list)) = split_call_line(line)
        && let Some(args) = parse_args(arg_list)
    {
        let func = parse_symbol(symbol).unwrap_or_else(|_| opaque_func(symbol));
        return BlockLine::Call(CallLine { func, args });
    }
    BlockLine::Unrecognized
}

fn build_call(call_line: CallLine, path: String, line: u64, config: &RootConfig) -> Call {
    let mut call = Call {
        is_pkg_main: call_line.func.is_pkg_main,
        func: call_line.func,
        args: call_line.args,
        remote_src_path: path,
        local_src_path: String::new(),
        rel_src_path: String::new(),
        dir_src: String::new(),
        src_name: String::new(),
        line,
        location: Location::Unknown,
        import_path: String::new(),
        is_stdlib: false,
    };
    call.resolve_paths(config);
    call
}

fn sanitize_line(raw: &str) -> String {
    let line = raw.strip_suffix('\r').unwrap_or(raw);
    if line.bytes().any(|b| b == 0x1b) {
        String::from_utf8_lossy(&strip_ansi_escapes::strip(line.as_bytes())).to_string()
    } else {
        line.to_string()
    }
}
