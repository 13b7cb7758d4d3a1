use std::fmt;

/// Which of the two compared strings an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSide {
    Source,
    Target,
}

impl fmt::Display for InputSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InputSide::Source => write!(f, "source"),
            InputSide::Target => write!(f, "target"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum VisualizerError {
    #[error("{side} input has {len} units, the limit is {limit}")]
    InputTooLarge {
        side: InputSide,
        len: usize,
        limit: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No preset pair at index {0}")]
    UnknownPreset(usize),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Timer error: {0}")]
    Scheduler(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl VisualizerError {
    pub fn invalid_input(msg: impl AsRef<str>) -> Self {
        VisualizerError::InvalidInput(msg.as_ref().to_string())
    }
}

pub type Result<T> = std::result::Result<T, VisualizerError>;

/// Rejects a missing string instead of reading it as empty.
///
/// Hosts such as JavaScript can hand over `null`/`undefined`; those are
/// contract violations, not empty inputs.
pub fn require_input(value: Option<&str>, side: InputSide) -> Result<&str> {
    value.ok_or_else(|| VisualizerError::invalid_input(format!("{side} string is missing")))
}
