use crate::{GraphicsBackend, LabelledResult};

/// The vendor capture runtime, a dynamically loaded capability that may be absent.
///
/// Sessions are bound to the device they were created for and must be released before it.
pub trait CaptureRuntime<G: GraphicsBackend> {
    /// The loaded runtime library.
    type Library;

    /// A capture session handle.
    type Session;

    /// Load the runtime, fails if the runtime or driver is missing or unsupported.
    fn load(&self) -> LabelledResult<Self::Library>;

    /// Create a capture session writing through `device`.
    ///
    /// This call runs third-party driver code, callers wrap it in a [`guarded_call`] which only
    /// catches panics. Implementations must turn native faults raised by the driver, such as
    /// structured exceptions, into a panic or an error status before returning, they must never
    /// escape this call.
    ///
    /// [`guarded_call`]: crate::guarded_call
    fn create_session(
        &self,
        library: &Self::Library,
        device: &G::Device,
    ) -> LabelledResult<CreatedSession<Self::Session>>;

    /// Configure the session's output.
    fn configure(
        &self,
        session: &mut Self::Session,
        setup: &SessionSetup<'_, G::Surface>,
    ) -> LabelledResult<()>;

    /// Grab the latest frame into the configured output buffer.
    fn grab_frame(&self, session: &mut Self::Session, params: &GrabParams) -> LabelledResult<GrabStatus>;

    /// Release a session.
    fn release_session(&self, session: Self::Session);

    /// Unload the runtime, all sessions must already be released.
    fn unload(&self, library: Self::Library);
}

/// A newly created session and what the runtime reported alongside it.
#[derive(Debug)]
pub struct CreatedSession<S> {
    /// The session handle.
    pub session: S,

    /// The maximum resolution the runtime can capture at.
    pub max_size: [u32; 2],
}

/// The pixel layout the session writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// 32-bit ARGB.
    Argb,
}

/// How the source is mapped onto the target size during a grab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabMode {
    /// Scale the desktop to the target size.
    Scale,

    /// Copy the source at its own size.
    Source,
}

/// Session configuration.
#[derive(Debug, Clone, Copy)]
pub struct SessionSetup<'a, S> {
    /// The sole output buffer.
    pub output_buffer: &'a S,

    /// The number of output buffers.
    pub buffer_count: u32,

    /// If the hardware cursor is composited into the capture.
    pub with_hardware_cursor: bool,

    /// The output pixel layout.
    pub mode: OutputMode,

    /// Stereo grabs.
    pub stereo: bool,

    /// Per-frame difference maps.
    pub diff_map: bool,

    /// HDR output.
    pub hdr: bool,
}

impl<'a, S> SessionSetup<'a, S> {
    /// A single buffered ARGB setup writing into `output_buffer`.
    pub fn single_buffer(output_buffer: &'a S, with_hardware_cursor: bool) -> Self {
        Self {
            output_buffer,
            buffer_count: 1,
            with_hardware_cursor,
            mode: OutputMode::Argb,
            stereo: false,
            diff_map: false,
            hdr: false,
        }
    }
}

/// Parameters for a single grab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrabParams {
    /// Return immediately if no new frame is ready.
    pub no_wait: bool,

    /// How the desktop is mapped onto the target.
    pub mode: GrabMode,

    /// The size of the output buffer.
    pub target_size: [u32; 2],
}

impl GrabParams {
    /// Non-blocking grab into a buffer of `target_size`.
    pub fn no_wait(target_size: [u32; 2], mode: GrabMode) -> Self {
        Self {
            no_wait: true,
            mode,
            target_size,
        }
    }
}

/// Metadata the runtime reports for a grabbed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameInfo {
    /// The width of the grabbed desktop.
    pub width: u32,

    /// The height of the grabbed desktop.
    pub height: u32,

    /// The runtime's frame counter.
    pub current_frame: u32,

    /// If the desktop changed since the previous grab.
    pub is_new_frame: bool,
}

/// The outcome of a non-blocking grab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabStatus {
    /// A frame was written to the output buffer.
    Frame(FrameInfo),

    /// No frame was ready.
    NotReady,
}
