use thiserror::Error;

use crate::model::Goroutine;

#[derive(Debug, Clone, Error)]
pub enum DumpError {
    #[error("cannot decode symbol {symbol:?}: {message}")]
    SymbolDecode { symbol: String, message: String },

    #[error("line {line_no} does not match any stack grammar: {line:?}")]
    FrameSyntax { line_no: usize, line: String },

    #[error("input ended inside the block of goroutine {goroutine_id}")]
    TruncatedInput {
        goroutine_id: u64,
        goroutines: Vec<Goroutine>,
    },
}
