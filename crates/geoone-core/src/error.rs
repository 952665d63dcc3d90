//! Error types shared by the planning and overlay routines.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Crate specific error enum.
#[derive(Error, Debug)]
pub enum Error {
    /// A numeric input is outside its accepted range.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// Too few vertices, or a polygon without north-south / west-east extent.
    #[error("degenerate boundary: {0}")]
    DegenerateBoundary(String),
    /// A spacing that would produce no lines or never terminate.
    #[error("invalid spacing `{name}` = {value}")]
    InvalidSpacing { name: &'static str, value: f64 },
    /// The geometry engine failed or returned empty/invalid geometry.
    #[error("geometry engine failure: {0}")]
    Collaborator(String),
    #[error("run cancelled")]
    Cancelled,
    #[error(transparent)]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn collaborator(message: impl Into<String>) -> Self {
        Self::Collaborator(message.into())
    }
}
