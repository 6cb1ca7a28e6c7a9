//! # Capture Source
//! Captures the desktop through a vendor capture runtime on a dedicated graphics device and
//! publishes it as a host texture, paced to the host's frame rate.
//!

pub use context::{CaptureContext, CreateError};
pub use grab::{GrabError, GrabStage};
pub use graphics::{
    DeviceConfig, DeviceHandles, GraphicsBackend, MappedSurface, PixelFormat, PresentInterval,
    ProvisionError, ProvisionStage,
};
pub use host::{FrameRate, GraphicsContext, Host};
pub use publisher::{TextureError, TexturePublisher};
pub use result::{LabelledResult, StatusError};
pub use session::{
    CaptureRuntime, CaptureSession, CreatedSession, FrameInfo, GrabMode, GrabParams, GrabStatus,
    GuardedFault, OutputMode, SessionError, SessionSetup, SessionState, guarded_call,
};
pub use settings::{CaptureSettings, SettingsError};
pub use source::{CaptureSource, SOURCE_INFO, SourceInfo, SourceOutput};
pub use target::{
    CaptureTarget, DisplayEnumerator, DisplayRecord, FALLBACK_SIZE, select_target, select_target_or,
};
pub use throttle::{DEFAULT_FPS, FrameThrottle, GrabReport, TickOutcome, target_fps};

mod context;
mod grab;
pub mod graphics;
pub mod host;
pub mod publisher;
mod result;
pub mod session;
mod settings;
pub mod source;
pub mod target;
pub mod throttle;
