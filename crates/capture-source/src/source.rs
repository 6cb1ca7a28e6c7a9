//! The capture source as the host sees it: a static descriptor and the lifecycle callbacks.
//!

use tracing::{error, info};
use utilities::failure::Failure;

use crate::{
    CaptureContext, CaptureRuntime, CaptureSettings, DisplayEnumerator, GraphicsBackend, Host,
};

/// What kind of output a source produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutput {
    /// Video only.
    Video,
}

/// The descriptor a host reads once when registering the source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    /// The unique source type id.
    pub id: &'static str,

    /// The name shown to users.
    pub name: &'static str,

    /// The source's output.
    pub output: SourceOutput,
}

/// The capture source type descriptor.
pub const SOURCE_INFO: SourceInfo = SourceInfo {
    id: "nvfbc_capture",
    name: "NVFBC Capture",
    output: SourceOutput::Video,
};

/// One instance of the capture source. If creation failed the instance stays inert: zero sized
/// and rendering nothing, until it is removed and added again.
pub struct CaptureSource<H, G, R>
where
    H: Host,
    G: GraphicsBackend,
    R: CaptureRuntime<G>,
{
    context: Option<CaptureContext<H, G, R>>,
}

impl<H, G, R> CaptureSource<H, G, R>
where
    H: Host,
    G: GraphicsBackend,
    R: CaptureRuntime<G>,
{
    /// Create a source from the host's settings string.
    ///
    /// Invalid settings are logged and replaced with the defaults.
    pub fn create<D: DisplayEnumerator>(
        settings: &str,
        host: H,
        graphics: G,
        runtime: R,
        displays: &D,
    ) -> Self {
        info!("Creating {} source", SOURCE_INFO.name);

        let settings = CaptureSettings::from_toml(settings)
            .report("Invalid source settings, using defaults")
            .unwrap_or_default();

        let context = match CaptureContext::create(host, graphics, runtime, displays, settings) {
            Ok(context) => Some(context),
            Err(error) => {
                error!("Failed to create {} source:\n{error}", SOURCE_INFO.name);
                None
            }
        };

        Self { context }
    }

    /// Settings changed.
    pub fn update(&mut self, settings: &str) {
        if let Some(context) = self.context.as_mut() {
            context.update(settings);
        }
    }

    /// Per-frame tick with the seconds since the previous tick.
    pub fn video_tick(&mut self, seconds: f32) {
        if let Some(context) = self.context.as_mut() {
            context.tick(seconds);
        }
    }

    /// Render pass.
    pub fn video_render(&self, effect: &H::Effect) {
        if let Some(context) = self.context.as_ref() {
            context.render(effect);
        }
    }

    /// The source width, zero if creation failed.
    pub fn width(&self) -> u32 {
        self.context.as_ref().map_or(0, CaptureContext::width)
    }

    /// The source height, zero if creation failed.
    pub fn height(&self) -> u32 {
        self.context.as_ref().map_or(0, CaptureContext::height)
    }

    /// The capture context, `None` if creation failed.
    pub fn context(&self) -> Option<&CaptureContext<H, G, R>> {
        self.context.as_ref()
    }

    /// Destroy the source, releasing everything it holds.
    pub fn destroy(mut self) {
        if let Some(mut context) = self.context.take() {
            context.destroy();
        }
    }
}
