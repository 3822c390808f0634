use thiserror::Error;

/// A view document too malformed to become a page. Fatal for that file only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{file}: view document must be a map")]
    NotAMap { file: String },

    #[error("{file}: missing required field \"{field}\"")]
    MissingField { file: String, field: &'static str },

    #[error("{file}: field \"{field}\" must be {expected}")]
    InvalidField {
        file: String,
        field: &'static str,
        expected: &'static str,
    },
}

impl ParseError {
    pub fn file(&self) -> &str {
        match self {
            ParseError::NotAMap { file }
            | ParseError::MissingField { file, .. }
            | ParseError::InvalidField { file, .. } => file,
        }
    }
}

/// A widget schema or partial document that could not be loaded.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid {document} document: {source}")]
    Invalid {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("partial \"{name}\" has no template")]
    MissingTemplate { name: String },
}

/// A document a compile had to drop. Other documents still compile.
#[derive(Debug, Error)]
pub enum CompileFailure {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

#[cfg(feature = "napi")]
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to parse {what} JSON: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
