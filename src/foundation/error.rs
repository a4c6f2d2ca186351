pub type CollageResult<T> = Result<T, CollageError>;

#[derive(thiserror::Error, Debug)]
pub enum CollageError {
    /// Item `index` could not be decoded as a supported image. Fatal to the whole build.
    #[error("decode error: item {index}: {message}")]
    Decode { index: usize, message: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CollageError {
    pub fn decode(index: usize, msg: impl Into<String>) -> Self {
        Self::Decode {
            index,
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Return `true` for errors raised while decoding source bytes.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
