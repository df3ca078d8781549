use std::fmt::Display;
use std::io;
use std::path::PathBuf;

/// Everything that can go wrong while building, transforming or reading a frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    // Frame shape and content.
    /// Two columns share a name, or columns disagree on the row count.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value or column does not have the type an operation needs.
    #[error(
        "type mismatch{}: expected {expected}, got {actual}",
        in_column(.column)
    )]
    TypeMismatch {
        column: Option<String>,
        expected: String,
        actual: String,
    },

    /// No column with this name.
    #[error("column not found: {name}")]
    ColumnNotFound { name: String },

    /// The inputs are valid but the operation cannot be applied to them.
    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },

    /// A read option is out of range.
    #[error("invalid configuration option '{option}': {message}")]
    Configuration { option: String, message: String },

    // Format resolution.
    /// No registered format claims the extension of a path or URL.
    #[error("unknown format for '{target}'")]
    UnknownFormat { target: String },

    /// Every registered format rejected a stream.
    #[error("unknown stream format")]
    UnparseableStream,

    /// Every registered format rejected a file.
    #[error("unknown file format for path '{}'", .path.display())]
    UnparseableFile { path: PathBuf },

    /// The URL scheme is neither `file` nor `http(s)`.
    #[error("invalid protocol for url {url}")]
    InvalidProtocol { url: String },

    // Underlying libraries.
    /// OS-level I/O failure, with the file involved when known.
    #[error("I/O error{}: {source}", reading(.path))]
    Io {
        source: io::Error,
        path: Option<PathBuf>,
    },

    /// Arrow array or schema failure, including CSV decoding.
    #[error("arrow error: {source}")]
    Arrow { source: arrow::error::ArrowError },

    /// Parquet decoding or encoding failure.
    #[error("parquet error: {source}")]
    Parquet {
        source: parquet::errors::ParquetError,
    },

    /// Malformed JSON input.
    #[error("json error: {source}")]
    Json { source: serde_json::Error },

    /// Transport or status failure while fetching a URL.
    #[error("http error: {source}")]
    Http { source: reqwest::Error },
}

/// Result alias for `alopex-frame`.
pub type Result<T> = std::result::Result<T, FrameError>;

impl FrameError {
    /// I/O failure not tied to a file, such as a stream read.
    pub fn io(source: io::Error) -> Self {
        Self::Io { source, path: None }
    }

    /// I/O failure on a known file.
    pub fn io_with_path(source: io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
        }
    }

    /// Frame shape error with a message.
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Type error, optionally attributed to a column.
    pub fn type_mismatch(
        column: impl Into<Option<String>>,
        expected: impl Display,
        actual: impl Display,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Lookup of a column that does not exist.
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }

    /// Operation that cannot be applied to these inputs.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Out-of-range value for the read option `option`.
    pub fn configuration(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            option: option.into(),
            message: message.into(),
        }
    }

    /// `target` is the path or URL whose extension matched nothing.
    pub fn unknown_format(target: impl Into<String>) -> Self {
        Self::UnknownFormat {
            target: target.into(),
        }
    }

    /// `true` for an I/O error caused by a missing file.
    ///
    /// Trial resolution of a file stops on these instead of trying the next
    /// format.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

fn in_column(column: &Option<String>) -> String {
    match column {
        Some(name) => format!(" in column '{name}'"),
        None => String::new(),
    }
}

fn reading(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" reading '{}'", path.display()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::FrameError;

    #[test]
    fn messages_carry_optional_context() {
        let err = FrameError::type_mismatch(Some("age".to_string()), "Number", "Utf8");
        assert_eq!(
            err.to_string(),
            "type mismatch in column 'age': expected Number, got Utf8"
        );
        let err = FrameError::type_mismatch(None::<String>, "Comparable", "Group");
        assert_eq!(err.to_string(), "type mismatch: expected Comparable, got Group");

        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = FrameError::io_with_path(missing, "/tmp/x.csv");
        assert_eq!(err.to_string(), "I/O error reading '/tmp/x.csv': gone");
    }

    #[test]
    fn only_missing_files_are_not_found() {
        let missing = FrameError::io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(missing.is_not_found());
        let denied = FrameError::io(io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert!(!denied.is_not_found());
        assert!(!FrameError::UnparseableStream.is_not_found());
    }
}
