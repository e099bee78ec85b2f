use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// Character outside the fixed key set
    #[error("unknown key: {0}")]
    UnknownKey(char),
    /// A chord without any keys can never fire
    #[error("invalid chord: no keys")]
    InvalidChord,
    #[error("action not found: {0}")]
    ActionNotFound(String),
}
