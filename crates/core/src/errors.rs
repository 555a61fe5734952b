use std::path::PathBuf;

/// Result type alias for exambox operations
pub type Result<T> = std::result::Result<T, Error>;

/// Longest slice of CLI output kept inside a parse error
const MAX_ERROR_INPUT_CHARS: usize = 256;

/// Core error type for exambox operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The hypervisor CLI exited non-zero or could not be started
    #[error("failed to execute {command}: {detail}")]
    Invocation {
        command: String,
        /// Combined stdout and stderr of the failed run (may be empty)
        output: String,
        detail: String,
    },

    /// The duplicate hard disk diagnostic matched but fixing it failed
    #[error("failed to fix duplicate hard disk problem for {command}: {message}")]
    Remediation { command: String, message: String },

    /// CLI output did not have the expected shape
    #[error("could not find {what} from output '{input}'")]
    Parse { what: String, input: String },

    /// Version string was found but is not a semantic version
    #[error("'{input}' is not a semantic version number: {source}")]
    Version {
        input: String,
        #[source]
        source: semver::Error,
    },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Response cache could not be constructed
    #[error("response cache error: {message}")]
    Cache { message: String },

    /// A required executable or resource is missing
    #[error("{what} not found: {message}")]
    NotFound { what: String, message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be decoded
    #[error("{message}: {source}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create an invocation error carrying the combined output of the run
    #[must_use]
    pub fn invocation(
        command: impl Into<String>,
        output: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Error::Invocation {
            command: command.into(),
            output: output.into(),
            detail: detail.into(),
        }
    }

    /// Create a remediation error
    #[must_use]
    pub fn remediation(command: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Remediation {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a parse error; long inputs are truncated
    #[must_use]
    pub fn parse(what: impl Into<String>, input: &str) -> Self {
        let input = match input.char_indices().nth(MAX_ERROR_INPUT_CHARS) {
            Some((cut, _)) => format!("{}...", &input[..cut]),
            None => input.to_string(),
        };
        Error::Parse {
            what: what.into(),
            input,
        }
    }

    /// Create a version error
    #[must_use]
    pub fn version(input: impl Into<String>, source: semver::Error) -> Self {
        Error::Version {
            input: input.into(),
            source,
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a cache error
    #[must_use]
    pub fn cache(message: impl Into<String>) -> Self {
        Error::Cache {
            message: message.into(),
        }
    }

    /// Create a not found error
    #[must_use]
    pub fn not_found(what: impl Into<String>, message: impl Into<String>) -> Self {
        Error::NotFound {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a JSON decoding error
    #[must_use]
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Json {
            message: message.into(),
            source,
        }
    }

    /// Combined CLI output captured with an invocation failure
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        match self {
            Error::Invocation { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Whether this failure came from running the hypervisor CLI
    #[must_use]
    pub fn is_invocation(&self) -> bool {
        matches!(self, Error::Invocation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_error_keeps_output() {
        let err = Error::invocation(
            "VBoxManage showvminfo exam",
            "VBoxManage: error: Could not find a registered machine named 'exam'",
            "exit status: 1",
        );
        assert!(err.is_invocation());
        assert!(err
            .output()
            .is_some_and(|out| out.contains("Could not find a registered machine")));
        assert_eq!(
            err.to_string(),
            "failed to execute VBoxManage showvminfo exam: exit status: 1"
        );
    }

    #[test]
    fn test_non_invocation_errors_have_no_output() {
        let err = Error::configuration("bad");
        assert!(err.output().is_none());
        assert!(!err.is_invocation());
    }

    #[test]
    fn test_parse_error_truncates_long_input() {
        let input = "x".repeat(1000);
        let err = Error::parse("vm state", &input);
        match err {
            Error::Parse { input, .. } => {
                assert_eq!(input.len(), MAX_ERROR_INPUT_CHARS + 3);
                assert!(input.ends_with("..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_short_input_unchanged() {
        let err = Error::parse("vm state", "name=\"exam\"");
        assert_eq!(
            err.to_string(),
            "could not find vm state from output 'name=\"exam\"'"
        );
    }

    #[test]
    fn test_json_error_names_document_and_cause() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::json("invalid configuration file 'exambox.json'", source);
        assert!(matches!(err, Error::Json { .. }));
        let message = err.to_string();
        assert!(message.starts_with("invalid configuration file 'exambox.json': "));
        assert!(message.contains("EOF"));
    }
}
