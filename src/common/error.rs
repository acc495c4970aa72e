//! Error types for blocktree.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in blocktree.
///
/// Format errors (`BadMagic`, `TruncatedBlock`, `BlockOutOfRange`) are fatal
/// to the operation that hit them: the file is not trustworthy and the engine
/// never continues past one. A search miss is *not* an error — lookups return
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Block 0 does not start with the index magic.
    #[error("invalid index file: bad magic")]
    BadMagic,

    /// A block read returned fewer than 512 bytes (truncated/corrupt file).
    #[error("truncated read for block {0}")]
    TruncatedBlock(u64),

    /// A decoded node block carries an impossible field (e.g. a key count
    /// above the fan-out limit).
    #[error("block {0} holds a corrupt node record")]
    CorruptBlock(u64),

    /// A block write targeted an offset past the end of the file.
    ///
    /// The file grows only through sequential allocation; any other write
    /// past EOF indicates a corrupted allocator state.
    #[error("block {0} is outside the allocated file")]
    BlockOutOfRange(u64),

    /// Create was called on a path that already exists.
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    /// An operation referenced an index file that does not exist.
    #[error("no such index file: {0}")]
    FileNotFound(PathBuf),

    /// Malformed key/value input from the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TruncatedBlock(7);
        assert_eq!(format!("{}", err), "truncated read for block 7");

        let err = Error::BadMagic;
        assert_eq!(format!("{}", err), "invalid index file: bad magic");

        let err = Error::AlreadyExists(PathBuf::from("idx.dat"));
        assert_eq!(format!("{}", err), "file already exists: idx.dat");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_result_type_alias() {
        fn might_fail() -> Result<u64> {
            Ok(42)
        }

        assert_eq!(might_fail().unwrap(), 42);
    }
}
