use thiserror::Error;

/// Errors raised while configuring or stepping the model.
///
/// Numerical hazards inside a step (inverse-trig domain, tiny heat capacity,
/// vanishing ice thickness) are clamped where they occur and never show up here.
#[derive(Error, Debug)]
pub enum EbmError {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("{what} has {found} cells, expected a {expected_nx}x{expected_ny} grid")]
    ShapeMismatch {
        what: String,
        expected_nx: usize,
        expected_ny: usize,
        found: usize,
    },
    #[error("step {step} produced a non-finite value in cell {index}; step discarded")]
    NonFiniteState { step: u32, index: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience type for `Result<T, EbmError>`.
pub type EbmResult<T> = Result<T, EbmError>;

impl EbmError {
    pub fn shape(what: &str, expected_nx: usize, expected_ny: usize, found: usize) -> Self {
        EbmError::ShapeMismatch {
            what: what.to_string(),
            expected_nx,
            expected_ny,
            found,
        }
    }
}
