use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the Sieve crates.
#[derive(Error, Debug)]
pub enum SieveError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A log file looked gzip-compressed but could not be decompressed.
    #[error("Failed to decompress {path}: {source}")]
    Decompress {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The logs directory handed to `compute` does not exist.
    #[error("Logs directory not found: {0}")]
    LogsDirNotFound(PathBuf),

    /// The analytics report could not be written.
    #[error("Failed to write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The analytics report could not be serialized.
    #[error("Failed to serialize JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}

/// Convenience alias used throughout the sieve crates.
pub type Result<T> = std::result::Result<T, SieveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = SieveError::FileRead {
            path: PathBuf::from("/logs/E2ABC.2024-03-01-00.gz"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/logs/E2ABC.2024-03-01-00.gz"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_decompress() {
        let io_err = std::io::Error::new(std::io::ErrorKind::InvalidData, "corrupt deflate stream");
        let err = SieveError::Decompress {
            path: PathBuf::from("broken.gz"),
            source: io_err,
        };
        assert_eq!(
            err.to_string(),
            "Failed to decompress broken.gz: corrupt deflate stream"
        );
    }

    #[test]
    fn test_error_display_logs_dir_not_found() {
        let err = SieveError::LogsDirNotFound(PathBuf::from("/missing/dir"));
        assert_eq!(err.to_string(), "Logs directory not found: /missing/dir");
    }

    #[test]
    fn test_error_display_report_write() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = SieveError::ReportWrite {
            path: PathBuf::from("/ro/out.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to write report /ro/out.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: SieveError = json_err.into();
        assert!(err.to_string().contains("Failed to serialize JSON"));
    }
}
