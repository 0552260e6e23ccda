//! Error types for the definition registry

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Which path index a lookup went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Message,
    Service,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::Message => write!(f, "message"),
            DefinitionKind::Service => write!(f, "service"),
        }
    }
}

/// Definition registry errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("{kind} definition of `{full_name}` is not found")]
    NotFound {
        kind: DefinitionKind,
        full_name: String,
    },

    #[error("{full_name}:{line}: {message}")]
    Syntax {
        full_name: String,
        line: usize,
        message: String,
    },

    #[error("{full_name}: malformed service, expected exactly one '---' separator but found {separators}")]
    MalformedService { full_name: String, separators: usize },

    #[error("cyclic definition: {}", chain.join(" -> "))]
    CyclicDefinition { chain: Vec<String> },

    #[error("invalid definition name `{0}`, expected `package/Type`")]
    InvalidName(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SchemaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SchemaError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the error is a lookup miss in one of the path indexes
    pub fn is_not_found(&self) -> bool {
        matches!(self, SchemaError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = SchemaError::NotFound {
            kind: DefinitionKind::Message,
            full_name: "foo/Bar".to_string(),
        };
        assert_eq!(err.to_string(), "message definition of `foo/Bar` is not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_syntax_message() {
        let err = SchemaError::Syntax {
            full_name: "pkg/Msg".to_string(),
            line: 2,
            message: "invalid field name `1`".to_string(),
        };
        assert_eq!(err.to_string(), "pkg/Msg:2: invalid field name `1`");
    }

    #[test]
    fn test_cycle_message() {
        let err = SchemaError::CyclicDefinition {
            chain: vec!["a/A".into(), "a/B".into(), "a/A".into()],
        };
        assert_eq!(err.to_string(), "cyclic definition: a/A -> a/B -> a/A");
    }
}
