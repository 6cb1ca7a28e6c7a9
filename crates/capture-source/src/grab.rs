use thiserror::Error;

use crate::StatusError;

/// The step of a frame grab that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabStage {
    /// Asking the capture session for a frame.
    Grab,

    /// Copying the capture surface into the staging surface.
    Readback,

    /// Mapping the staging surface.
    Map,

    /// Uploading into the published texture.
    Upload,
}

/// A single failed grab attempt. Nothing from the attempt survives into the next one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum GrabError {
    #[error("Capture session is not configured")]
    NotConfigured,

    #[error("No new frame was ready")]
    NotReady,

    #[error("Failed to grab frame:\n{0}")]
    Grab(#[source] StatusError),

    #[error("Failed to copy the capture surface to the staging surface:\n{0}")]
    Readback(#[source] StatusError),

    #[error("Failed to map the staging surface:\n{0}")]
    Map(#[source] StatusError),

    #[error("No texture to upload the frame into")]
    NoTexture,
}

impl GrabError {
    /// The step that failed.
    pub fn stage(&self) -> GrabStage {
        match self {
            Self::NotConfigured | Self::NotReady | Self::Grab(_) => GrabStage::Grab,
            Self::Readback(_) => GrabStage::Readback,
            Self::Map(_) => GrabStage::Map,
            Self::NoTexture => GrabStage::Upload,
        }
    }
}
