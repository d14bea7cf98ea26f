use thiserror::Error;

/// Errors raised by the scene core.
///
/// None of these cross a frame boundary: the regeneration controller and the
/// animation driver log them and keep the previous scene state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    /// Out-of-domain or non-finite input to the primitive factory
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("missing node `{0}`")]
    MissingNode(String),

    #[error("node name `{0}` is already in use")]
    DuplicateName(String),

    #[error("node `{node}` is not a child of `{parent}`")]
    NotAChild { parent: String, node: String },

    #[error("node `{name}` is not a {expected}")]
    WrongNodeKind { name: String, expected: &'static str },

    #[error("unknown parameter group `{0}`")]
    UnknownGroup(String),

    #[error("unknown parameter `{group}.{key}`")]
    UnknownParameter { group: String, key: String },

    #[error("parameter `{group}.{key}` expects a {expected} value")]
    ParameterType {
        group: String,
        key: String,
        expected: &'static str,
    },

    #[error("render surface error: {0}")]
    Surface(String),
}

impl SceneError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingNode(name.into())
    }
}

pub type Result<T> = std::result::Result<T, SceneError>;
