//! Error types for landmark decoding

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GestureError {
    #[error("hand has {got} landmarks, need {need}")]
    TooFewLandmarks { got: usize, need: usize },

    #[error("landmark {index} is not finite")]
    NonFinite { index: usize },
}

pub type Result<T> = std::result::Result<T, GestureError>;
