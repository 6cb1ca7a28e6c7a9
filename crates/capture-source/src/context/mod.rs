//! The capture context, the root of everything a capture source owns.
//!

mod destroy;
mod grab_frame;

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    CaptureRuntime, CaptureSession, CaptureSettings, CaptureTarget, DeviceHandles,
    DisplayEnumerator, FrameThrottle, GrabParams, GraphicsBackend, GraphicsContext, Host,
    ProvisionError, SessionError, SessionState, TextureError, TexturePublisher, TickOutcome,
    select_target_or, target_fps,
};

/// Owns the device, surfaces, capture session and published texture of one capture source, and
/// paces grabs to the host's frame rate.
///
/// Resources are acquired device, surfaces, session, texture, and released session, texture,
/// surfaces, device.
pub struct CaptureContext<H, G, R>
where
    H: Host,
    G: GraphicsBackend,
    R: CaptureRuntime<G>,
{
    host: H,
    graphics: G,
    runtime: R,

    settings: CaptureSettings,
    target: CaptureTarget,

    handles: DeviceHandles<G>,
    session: CaptureSession<G, R>,
    publisher: TexturePublisher<H>,
    throttle: FrameThrottle,
}

impl<H, G, R> CaptureContext<H, G, R>
where
    H: Host,
    G: GraphicsBackend,
    R: CaptureRuntime<G>,
{
    /// Select the capture target from `displays`, then provision the device and surfaces, open
    /// the capture session and create the published texture.
    ///
    /// If any step fails, everything acquired so far is released before the error is returned.
    #[instrument("CaptureContext::create", skip_all, err)]
    pub fn create<D: DisplayEnumerator>(
        host: H,
        graphics: G,
        runtime: R,
        displays: &D,
        settings: CaptureSettings,
    ) -> Result<Self, CreateError> {
        info!("Picking desktop resolution");
        let target = select_target_or(displays, settings.fallback_size);

        let mut context = Self {
            host,
            graphics,
            runtime,
            settings,
            target,
            handles: DeviceHandles::empty(target.size),
            session: CaptureSession::new(),
            publisher: TexturePublisher::empty(target.size),
            throttle: FrameThrottle::new(Instant::now(), settings.report_interval()),
        };

        if let Err(error) = context.acquire() {
            context.destroy();
            return Err(error);
        }

        Ok(context)
    }

    fn acquire(&mut self) -> Result<(), CreateError> {
        info!("Creating device on adapter {}", self.target.adapter_index);
        self.handles =
            DeviceHandles::provision(&self.graphics, self.target.adapter_index, self.target.size)?;

        info!("Opening capture session");
        self.session
            .open(&self.runtime, &self.handles, self.settings.with_cursor)?;

        let context = GraphicsContext::enter(&self.host);
        self.publisher = TexturePublisher::create(&context, self.target.size)?;

        Ok(())
    }

    /// Advance the grab loop by `seconds` of elapsed time, grabbing at most one frame.
    ///
    /// A failed grab is logged and the previous frame stays published.
    pub fn tick(&mut self, seconds: f32) {
        self.tick_at(seconds, Instant::now());
    }

    /// [`Self::tick`] with an explicit wall-clock time for grab count reporting.
    pub fn tick_at(&mut self, seconds: f32, now: Instant) {
        if !self.session.is_ready() {
            return;
        }

        let fps = target_fps(self.host.frame_rate(), self.settings.fallback_fps);
        let params = GrabParams::no_wait(self.target.size, self.settings.grab_mode());

        let Self {
            host,
            graphics,
            runtime,
            handles,
            session,
            publisher,
            throttle,
            ..
        } = self;

        let outcome = throttle.tick(f64::from(seconds), fps, now, || {
            grab_frame::grab_frame(host, graphics, runtime, handles, session, publisher, &params)
                .map(|_| ())
        });

        if let TickOutcome::Failed(error) = outcome {
            error!(
                stage = ?error.stage(),
                "Frame grab failed during video tick:\n{error}"
            );
        }
    }

    /// Draw the published texture with `effect`. Draws nothing if the texture was never created.
    pub fn render(&self, effect: &H::Effect) {
        self.publisher.render(&self.host, effect);
    }

    /// Apply changed settings. Settings are fixed at creation, changes are logged and ignored.
    pub fn update(&mut self, settings: &str) {
        match CaptureSettings::from_toml(settings) {
            Ok(settings) if settings == self.settings => debug!("Update called"),
            Ok(settings) => debug!("Update called, changed settings apply on recreation: {settings:?}"),
            Err(error) => warn!("Update called with invalid settings:\n{error}"),
        }
    }

    /// The capture width.
    pub fn width(&self) -> u32 {
        self.target.size[0]
    }

    /// The capture height.
    pub fn height(&self) -> u32 {
        self.target.size[1]
    }

    /// The selected capture target.
    pub fn target(&self) -> CaptureTarget {
        self.target
    }

    /// The settings the context was created with.
    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// The capture session's state.
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// The maximum capture resolution the runtime reported.
    pub fn max_capture_size(&self) -> Option<[u32; 2]> {
        self.session.max_size()
    }

    /// The grab loop's accumulated time in seconds.
    pub fn accumulated_time(&self) -> f64 {
        self.throttle.accumulated()
    }

    /// Successful grabs in the current report window.
    pub fn grab_count(&self) -> u32 {
        self.throttle.grab_count()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CreateError {
    #[error("Failed to provision the capture device:\n{0}")]
    Provision(#[from] ProvisionError),

    #[error("Failed to open the capture session:\n{0}")]
    Session(#[from] SessionError),

    #[error("Failed to create the published texture:\n{0}")]
    Texture(#[from] TextureError),
}
