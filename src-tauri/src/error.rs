use thiserror::Error;

#[derive(Debug, Error)]
pub enum OncoscopeError {
    #[error("No image with id {0} in the current session")]
    NotFound(u64),

    #[error("An analysis is already running: {0}")]
    Busy(String),

    #[error("Inference service error: {0}")]
    Inference(String),

    #[error("Could not reach inference service: {0}")]
    Transport(String),

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<OncoscopeError> for String {
    fn from(err: OncoscopeError) -> Self {
        err.to_string()
    }
}
