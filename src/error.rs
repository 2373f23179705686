use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovsumError {
    /// A profile line that does not match the block grammar. The offending
    /// line is carried verbatim.
    #[error("failed parsing line '{line}': {reason}")]
    Format { line: String, reason: &'static str },

    /// An I/O failure while reading an input stream.
    #[error("failed scanning input: {0}")]
    Scan(#[source] std::io::Error),

    /// A block span string that does not match `<line>.<col>,<line>.<col>`.
    #[error("wrong file block format: {0}")]
    BlockFormat(String),
}

pub type Result<T> = std::result::Result<T, CovsumError>;
