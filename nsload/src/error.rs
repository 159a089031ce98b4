// Configuration errors for autoload tables and manifests

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or loading an autoload table.
///
/// Every variant is fatal: a resolver is never constructed from a table
/// that produced one of these.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Prefix '{prefix}' has no base directories")]
    EmptyDirectories { prefix: String },

    #[error("Prefix '{prefix}' declares length {declared}, but its actual length is {actual}")]
    LengthMismatch {
        prefix: String,
        declared: usize,
        actual: usize,
    },

    #[error("Prefix '{prefix}' has directories but no declared length")]
    MissingLength { prefix: String },

    #[error("Prefix '{prefix}' has a declared length but no directories")]
    UnknownPrefix { prefix: String },

    #[error("Prefix '{prefix}' is filed under bucket '{bucket}'")]
    BucketMismatch { bucket: String, prefix: String },

    #[error("Empty prefixes are not allowed")]
    EmptyPrefix,

    #[error("Prefix '{prefix}' must end with the namespace separator '{separator}'")]
    MissingTrailingSeparator { prefix: String, separator: String },

    #[error("Namespace separator cannot be empty")]
    EmptySeparator,

    #[error("Invalid source file extension: '{0}'")]
    InvalidExtension(String),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse autoload manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_prefix() {
        let err = ConfigError::LengthMismatch {
            prefix: "Dkan\\Datastore\\".to_string(),
            declared: 14,
            actual: 15,
        };
        let message = err.to_string();
        assert!(message.contains("Dkan\\Datastore\\"));
        assert!(message.contains("14"));
        assert!(message.contains("15"));
    }

    #[test]
    fn test_parse_error_converts() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ConfigError = parse.into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
