use thiserror::Error;
use crate::value::{TypeSet, ValueType};
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("unknown block: {0}")]
    UnknownBlock(String),

    #[error("duplicate name: {0}")]
    DuplicateName(String),

    #[error("parameter index {index} out of range for block '{block}' ({count} parameters)")]
    ParamIndexOutOfRange {
        block: String,
        index: usize,
        count: usize,
    },

    #[error("unknown parameter '{name}' for block '{block}'")]
    UnknownParam { block: String, name: String },

    #[error("invalid value for parameter {index} of block '{block}': {message}")]
    InvalidParam {
        block: String,
        index: usize,
        message: String,
    },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: TypeSet, found: ValueType },

    #[error("cyclic value through variable '{0}'")]
    CyclicValue(String),

    #[error("composition error in chain '{chain}' at block {position}: {message}")]
    Composition {
        chain: String,
        position: usize,
        message: String,
    },

    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("unknown chain: {0}")]
    UnknownChain(String),

    #[error("registry is sealed, cannot register '{0}'")]
    RegistrySealed(String),

    #[error("invalid document: {0}")]
    Document(String),

    #[error(transparent)]
    Block(#[from] BlockError),
}

impl Error {
    pub(crate) fn mismatch(expected: impl Into<TypeSet>, found: ValueType) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            found,
        }
    }
}

/// Domain error raised by a block's `activate`. The engine never inspects
/// `kind`; it is carried through to the chain and the tick report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct BlockError {
    pub kind: String,
    pub message: String,
}

impl BlockError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl From<Error> for BlockError {
    fn from(err: Error) -> Self {
        let kind = match &err {
            Error::TypeMismatch { .. } => "TypeMismatch",
            Error::CyclicValue(_) => "CyclicValue",
            Error::UnknownVariable(_) => "UnknownVariable",
            Error::UnknownChain(_) => "UnknownChain",
            Error::Block(inner) => return inner.clone(),
            _ => "Engine",
        };
        BlockError::new(kind, err.to_string())
    }
}
