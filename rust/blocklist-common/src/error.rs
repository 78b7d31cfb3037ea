use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// Index outside of `[0, len)` (or `[0, len]` for insertion points).
    pub fn index_out_of_range(name: impl Into<String>, index: u64, len: u64) -> Error {
        Error::invalid_arg(name, format!("index {index} is out of range for length {len}"))
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn empty(name: impl Into<String>) -> Error {
        Error(ErrorKind::Empty { name: name.into() }.into())
    }

    pub fn concurrent_modification() -> Error {
        Error(ErrorKind::ConcurrentModification.into())
    }

    pub fn size_mismatch(expected: usize, actual: usize) -> Error {
        Error(ErrorKind::SizeMismatch { expected, actual }.into())
    }

    /// Returns `true` for every kind that the error taxonomy classifies as an
    /// invalid operation (as opposed to an invalid argument).
    pub fn is_invalid_operation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidOperation { .. }
                | ErrorKind::Empty { .. }
                | ErrorKind::ConcurrentModification
                | ErrorKind::SizeMismatch { .. }
        )
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidArgument { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("invalid operation {name}: the collection is empty")]
    Empty { name: String },

    #[error("invalid operation: collection was modified, enumeration may not continue")]
    ConcurrentModification,

    #[error("invalid operation: block size {actual} does not match pool bucket size {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::index_out_of_range("index", 5, 3).is_invalid_argument());
        assert!(Error::empty("pop").is_invalid_operation());
        assert!(Error::concurrent_modification().is_invalid_operation());
        assert!(Error::size_mismatch(16, 8).is_invalid_operation());
        assert!(!Error::invalid_operation("x").is_invalid_argument());
    }

    #[test]
    fn test_error_messages() {
        let e = Error::index_out_of_range("index", 10, 4);
        assert_eq!(
            e.to_string(),
            "invalid argument index: index 10 is out of range for length 4"
        );
        let e = Error::size_mismatch(16384, 4096);
        assert!(e.to_string().contains("4096"));
        assert!(matches!(
            e.into_kind(),
            ErrorKind::SizeMismatch {
                expected: 16384,
                actual: 4096
            }
        ));
    }
}
