/*
[INPUT]:  API failures, user input validation failures, page state violations
[OUTPUT]: PageError / ValidationError taxonomy
[POS]:    Error handling layer for the cluster page core
[UPDATE]: When adding operations with new failure modes
*/

use nailgun_adapter::NailgunError;
use thiserror::Error;

use crate::view::tabs::TabKind;

/// Rejected user input; surfaced immediately, nothing is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("Invalid hostname: {0}")]
    InvalidHostname(String),

    #[error("Invalid IP address: {0}")]
    InvalidIp(String),

    #[error("No gateway at index {index} (have {len})")]
    GatewayIndex { index: usize, len: usize },
}

#[derive(Error, Debug)]
pub enum PageError {
    /// Transport or API failure
    #[error(transparent)]
    Api(#[from] NailgunError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("The {expected} tab is not active")]
    TabNotActive { expected: TabKind },

    #[error("Settings are locked while the environment is deployed or deploying")]
    Locked,

    #[error("Settings are not loaded yet")]
    NotLoaded,

    #[error("The page has been disposed")]
    Disposed,
}

impl PageError {
    /// Transport failures that polling or a retry may recover from
    pub fn is_transient(&self) -> bool {
        matches!(self, PageError::Api(err) if err.is_retryable())
    }
}

pub type PageResult<T> = std::result::Result<T, PageError>;
