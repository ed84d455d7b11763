use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudentBaseError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serializer error")]
    Serializer(#[from] bincode::Error),
    #[error("file is not a student snapshot")]
    BadMagic,
    #[error("snapshot format version {found} is not supported (expected {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },
    #[error("snapshot is truncated")]
    Truncated,
    #[error("snapshot checksum mismatch")]
    ChecksumMismatch,
    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),
}

pub type DbResult<T> = Result<T, StudentBaseError>;
