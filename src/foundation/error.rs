pub type InvitraResult<T> = Result<T, InvitraError>;

#[derive(thiserror::Error, Debug)]
pub enum InvitraError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("image load error: {0}")]
    Load(String),

    #[error("composite error: {0}")]
    Composite(String),

    #[error("workflow error: {0}")]
    Workflow(String),

    /// A newer render was started for the same surface; this one must stop.
    #[error("render superseded by a newer render for the same surface")]
    Superseded,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InvitraError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    pub fn composite(msg: impl Into<String>) -> Self {
        Self::Composite(msg.into())
    }

    pub fn workflow(msg: impl Into<String>) -> Self {
        Self::Workflow(msg.into())
    }
}
