use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CruiseError {
    #[error("unknown command opcode: {0}")]
    UnknownOpcode(String),
    #[error("invalid argument {arg:?} for {opcode}")]
    InvalidArgument { opcode: &'static str, arg: String },
    #[error("malformed command text: {0:?}")]
    MalformedCommand(String),
    #[error("trace row {tick}: {reason}")]
    Trace { tick: u64, reason: String },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
