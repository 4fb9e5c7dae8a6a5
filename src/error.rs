use thiserror::Error;

/// Every failure the lab can hit. The oracle folds these into fallback
/// replies; the REPL prints the rest.
#[derive(Error, Debug)]
pub enum LabError {
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("{param} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        param: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid value '{value}' for {param}")]
    InvalidValue { param: &'static str, value: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("provider reply carried no text")]
    EmptyReply,

    #[error("malformed oracle reply: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("render error: {0}")]
    Render(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LabResult<T> = Result<T, LabError>;
