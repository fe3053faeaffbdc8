//! Error types for the keymap system

use thiserror::Error;

/// A raw keybinding string could not be turned into key codes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty keybinding")]
    EmptySequence,
    #[error("empty key in `{0}`")]
    EmptyKey(String),
    #[error("malformed modifier syntax in `{0}`")]
    MalformedModifier(String),
    #[error("unknown key `{key}` in `{input}`")]
    UnknownKey { key: String, input: String },
    #[error("multiple keys in `{0}`")]
    MultipleKeys(String),
    #[error("no key found in `{0}`")]
    MissingKey(String),
}

/// The active keyboard layout cannot map a physical key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("key `{key}` cannot be mapped on keyboard layout `{layout}`")]
pub struct InvalidKeyCodeError {
    pub key: String,
    pub layout: String,
}

/// A when-clause expression could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid when clause `{input}`: {reason}")]
pub struct WhenParseError {
    pub input: String,
    pub reason: String,
}

/// Errors that can occur when loading keymaps
#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid key: {0}")]
    InvalidKey(#[from] ParseError),
    #[error("Invalid condition: {0}")]
    InvalidCondition(#[from] WhenParseError),
}
