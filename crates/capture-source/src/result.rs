use core::fmt::Display;

use thiserror::Error;

/// A shortcut for `Result<T, StatusError>`.
pub type LabelledResult<T> = Result<T, StatusError>;

/// A failed status code from a graphics, host or vendor runtime call, labelled with the call that
/// returned it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub struct StatusError {
    call: &'static str,
    code: i32,
}

impl StatusError {
    /// Create a new StatusError from a status code and a label.
    pub fn new(code: i32, call: &'static str) -> Self {
        Self { call, code }
    }

    /// The call that failed.
    pub fn call(&self) -> &'static str {
        self.call
    }

    /// The status code the call returned.
    pub fn code(&self) -> i32 {
        self.code
    }
}

impl Display for StatusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} call failed with status {:#010x}", self.call, self.code)
    }
}
