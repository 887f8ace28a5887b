use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Client not found: {0}")]
    ClientNotFound(u64),

    #[error("Duplicate client id: {0}")]
    DuplicateClient(u64),

    #[error("Invalid feature dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Feature matrix has no rows")]
    EmptyMatrix,

    #[error("Not enough candidates: have {candidates}, need more than {requested}")]
    InsufficientCandidates { candidates: usize, requested: usize },

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// True for errors a request handler should surface to the caller
    /// rather than treat as a server fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ClientNotFound(_))
    }
}
