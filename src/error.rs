//! Error types for DDIFF.

use crate::kind::SemanticKind;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read file {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    YamlError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not detect file format for {path}")]
    UnknownFormat { path: String },
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Unknown output format: {format}")]
    UnknownFormat { format: String },

    #[error("Failed to serialize to JSON: {source}")]
    JsonSerializationError {
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

/// Raised while comparing or hashing values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    #[error("Unsupported cycle encountered in the graph at {pointer}")]
    UnsupportedCycle { pointer: String },
}

/// Raised by the path-pointer codecs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointerError {
    #[error("Malformed {scheme} path at position {position}: {message}")]
    Malformed {
        scheme: &'static str,
        position: usize,
        message: String,
    },

    #[error("Unknown path scheme: {name} (expected pointer, dotted, or json)")]
    UnknownScheme { name: String },
}

/// Raised while applying or reverting changes against a target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("Cannot descend into {kind} value at {pointer}")]
    UnsupportedTargetKind {
        pointer: String,
        kind: SemanticKind,
    },

    #[error("Object path '{pointer}' must be an array")]
    MoveRequiresSequence { pointer: String },

    #[error("Index {index} is out of range for sequence of length {len} at {pointer}")]
    IndexOutOfRange {
        pointer: String,
        index: isize,
        len: usize,
    },

    #[error("A change to the root value cannot be combined with other changes")]
    RootChangeNotAlone,
}

/// Raised while encoding or decoding change records as text.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("Unrecognized change kind: {kind} at position {position}")]
    UnrecognizedChangeKind { kind: String, position: usize },

    #[error("Malformed change record at position {position}: {message}")]
    Malformed { position: usize, message: String },

    #[error("Cannot encode cyclic value at {pointer}")]
    Cycle { pointer: String },

    #[error(transparent)]
    Pointer(#[from] PointerError),

    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DdiffError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },
}

impl ParseError {
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn read_error(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    pub fn json_error(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonError {
            path: path.into(),
            source,
        }
    }

    pub fn yaml_error(path: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::YamlError {
            path: path.into(),
            source,
        }
    }

    pub fn toml_error(path: impl Into<String>, source: toml::de::Error) -> Self {
        Self::TomlError {
            path: path.into(),
            source,
        }
    }

    pub fn unknown_format(path: impl Into<String>) -> Self {
        Self::UnknownFormat { path: path.into() }
    }
}

impl PointerError {
    pub fn malformed(scheme: &'static str, position: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            scheme,
            position,
            message: message.into(),
        }
    }

    /// Cursor position of a malformed input, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Malformed { position, .. } => Some(*position),
            Self::UnknownScheme { .. } => None,
        }
    }
}

impl SerializeError {
    pub fn malformed(position: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            message: message.into(),
        }
    }
}
