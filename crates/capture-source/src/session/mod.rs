//! The vendor capture session and the runtime it is created through.
//!

mod guard;
mod runtime;

use core::marker::PhantomData;

pub use guard::{GuardedFault, guarded_call};
pub use runtime::{
    CaptureRuntime, CreatedSession, FrameInfo, GrabMode, GrabParams, GrabStatus, OutputMode,
    SessionSetup,
};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{DeviceHandles, GrabError, GraphicsBackend, StatusError};

/// The lifecycle state of a capture session.
///
/// States are only entered in order, any state may return to `Unopened` on failure or close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing is loaded.
    #[default]
    Unopened,

    /// The runtime is loaded, no session exists.
    Loading,

    /// The session exists but is not configured.
    Created,

    /// The session is configured and can grab frames.
    Configured,
}

/// Owns the loaded runtime library and the capture session created through it.
pub struct CaptureSession<G: GraphicsBackend, R: CaptureRuntime<G>> {
    state: SessionState,
    library: Option<R::Library>,
    session: Option<R::Session>,
    max_size: Option<[u32; 2]>,
    _graphics: PhantomData<fn() -> G>,
}

impl<G: GraphicsBackend, R: CaptureRuntime<G>> CaptureSession<G, R> {
    /// An unopened session.
    pub fn new() -> Self {
        Self {
            state: SessionState::Unopened,
            library: None,
            session: None,
            max_size: None,
            _graphics: PhantomData,
        }
    }

    /// Loads the runtime, creates a session bound to the handles' device and configures it to
    /// write into their capture surface.
    ///
    /// On failure everything acquired so far is released and the session is `Unopened`.
    #[instrument("CaptureSession::open", skip_all, err)]
    pub fn open(
        &mut self,
        runtime: &R,
        handles: &DeviceHandles<G>,
        with_hardware_cursor: bool,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::Unopened {
            return Err(SessionError::AlreadyOpen);
        }

        let (Some(device), Some(capture_surface)) = (handles.device(), handles.capture_surface())
        else {
            return Err(SessionError::NoDevice);
        };

        if let Err(error) = self.open_inner(runtime, device, capture_surface, with_hardware_cursor)
        {
            self.close(runtime);
            return Err(error);
        }

        Ok(())
    }

    fn open_inner(
        &mut self,
        runtime: &R,
        device: &G::Device,
        capture_surface: &G::Surface,
        with_hardware_cursor: bool,
    ) -> Result<(), SessionError> {
        self.state = SessionState::Loading;
        let library = runtime.load().map_err(SessionError::Load)?;
        let library = self.library.insert(library);
        info!("Capture runtime loaded");

        let created = guarded_call("CaptureRuntime::create_session", || {
            runtime.create_session(library, device)
        })?
        .map_err(SessionError::Create)?;

        info!(
            "Capture session created (max width: {}, max height: {})",
            created.max_size[0], created.max_size[1]
        );
        self.max_size = Some(created.max_size);
        let session = self.session.insert(created.session);
        self.state = SessionState::Created;

        let setup = SessionSetup::single_buffer(capture_surface, with_hardware_cursor);
        runtime
            .configure(session, &setup)
            .map_err(SessionError::Configure)?;
        self.state = SessionState::Configured;
        info!("Capture session configured");

        Ok(())
    }

    /// Releases the session then unloads the runtime. Does nothing for parts that don't exist.
    pub fn close(&mut self, runtime: &R) {
        if let Some(session) = self.session.take() {
            runtime.release_session(session);
            info!("Capture session released");
        }

        if let Some(library) = self.library.take() {
            runtime.unload(library);
            info!("Capture runtime unloaded");
        }

        self.max_size = None;
        self.state = SessionState::Unopened;
    }

    /// Grabs the latest frame into the capture surface without waiting.
    pub fn grab(&mut self, runtime: &R, params: &GrabParams) -> Result<FrameInfo, GrabError> {
        let session = match (self.state, self.session.as_mut()) {
            (SessionState::Configured, Some(session)) => session,
            _ => return Err(GrabError::NotConfigured),
        };

        match runtime.grab_frame(session, params).map_err(GrabError::Grab)? {
            GrabStatus::Frame(info) => {
                debug!("{info:?}");
                Ok(info)
            }
            GrabStatus::NotReady => Err(GrabError::NotReady),
        }
    }

    /// The current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// If grabs are permitted.
    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Configured
    }

    /// The maximum resolution reported when the session was created.
    pub fn max_size(&self) -> Option<[u32; 2]> {
        self.max_size
    }

    /// If a session handle or loaded runtime is still held.
    pub fn is_live(&self) -> bool {
        self.session.is_some() || self.library.is_some()
    }
}

impl<G: GraphicsBackend, R: CaptureRuntime<G>> Default for CaptureSession<G, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GraphicsBackend, R: CaptureRuntime<G>> Drop for CaptureSession<G, R> {
    fn drop(&mut self) {
        if self.is_live() {
            warn!("Capture session dropped without being closed");
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SessionError {
    #[error("Capture session is already open")]
    AlreadyOpen,

    #[error("No live device and capture surface to bind the capture session to")]
    NoDevice,

    #[error("Failed to load the capture runtime:\n{0}")]
    Load(#[source] StatusError),

    #[error("Failed to create the capture session, possibly an unsupported driver:\n{0}")]
    Create(#[source] StatusError),

    #[error("Capture session creation faulted:\n{0}")]
    Guarded(#[from] GuardedFault),

    #[error("Failed to configure the capture session:\n{0}")]
    Configure(#[source] StatusError),
}
