use std::{collections::HashSet, sync::Arc};

use capture_source::{
    CaptureRuntime, CreatedSession, FrameInfo, GrabParams, GrabStatus, LabelledResult,
    SessionSetup, StatusError,
};
use parking_lot::Mutex;

use crate::{FakeDevice, FakeGraphics, FakeSurface, HandleKind, HandleTracker};

const MOD_NOT_FOUND: i32 = 126;
const UNSUPPORTED: i32 = -3;
const INVALID_PARAM: i32 = -2;
const INVALIDATED_SESSION: i32 = -8;

/// A step of [`FakeRuntime`] that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeFault {
    /// The runtime library is missing.
    Load,
    /// Session creation returns an error status.
    Create,
    /// Session creation panics, like a fault inside driver code.
    CreatePanic,
    /// Session configuration.
    Configure,
    /// Frame grabs.
    Grab,
}

/// A fake loaded runtime.
#[derive(Debug)]
pub struct FakeLibrary {
    /// The tracked handle id.
    pub id: u64,
}

/// A fake capture session.
#[derive(Debug)]
pub struct FakeSession {
    /// The tracked handle id.
    pub id: u64,
    /// The id of the device the session was created for.
    pub device: u64,
    /// The id of the surface the session writes into, once configured.
    pub output: Option<u64>,
}

#[derive(Debug)]
struct RuntimeState {
    faults: HashSet<RuntimeFault>,
    not_ready: bool,
    max_size: [u32; 2],

    cursor: Option<bool>,
    grab_attempts: u32,
    frame: u32,
    last_params: Option<GrabParams>,
}

/// A capture runtime writing pattern frames, with injectable failures.
#[derive(Debug, Clone)]
pub struct FakeRuntime {
    tracker: HandleTracker,
    state: Arc<Mutex<RuntimeState>>,
}

impl FakeRuntime {
    /// A runtime recording into `tracker`.
    pub fn new(tracker: &HandleTracker) -> Self {
        Self {
            tracker: tracker.clone(),
            state: Arc::new(Mutex::new(RuntimeState {
                faults: HashSet::new(),
                not_ready: false,
                max_size: [3840, 2160],
                cursor: None,
                grab_attempts: 0,
                frame: 0,
                last_params: None,
            })),
        }
    }

    /// Make `fault` fail until [`Self::recover`].
    pub fn fail(&self, fault: RuntimeFault) {
        self.state.lock().faults.insert(fault);
    }

    /// Stop `fault` from failing.
    pub fn recover(&self, fault: RuntimeFault) {
        self.state.lock().faults.remove(&fault);
    }

    /// Make grabs report that no frame is ready.
    pub fn set_not_ready(&self, not_ready: bool) {
        self.state.lock().not_ready = not_ready;
    }

    /// Grabs attempted, successful or not.
    pub fn grab_attempts(&self) -> u32 {
        self.state.lock().grab_attempts
    }

    /// Frames delivered.
    pub fn frames(&self) -> u32 {
        self.state.lock().frame
    }

    /// The hardware cursor flag of the last configuration.
    pub fn configured_cursor(&self) -> Option<bool> {
        self.state.lock().cursor
    }

    /// The parameters of the last grab.
    pub fn last_params(&self) -> Option<GrabParams> {
        self.state.lock().last_params
    }

    fn check(&self, fault: RuntimeFault, code: i32, call: &'static str) -> LabelledResult<()> {
        if self.state.lock().faults.contains(&fault) {
            return Err(StatusError::new(code, call));
        }

        Ok(())
    }
}

impl CaptureRuntime<FakeGraphics> for FakeRuntime {
    type Library = FakeLibrary;
    type Session = FakeSession;

    fn load(&self) -> LabelledResult<FakeLibrary> {
        self.check(RuntimeFault::Load, MOD_NOT_FOUND, "LoadLibrary")?;

        Ok(FakeLibrary {
            id: self.tracker.acquire(HandleKind::Library),
        })
    }

    fn create_session(
        &self,
        _library: &FakeLibrary,
        device: &FakeDevice,
    ) -> LabelledResult<CreatedSession<FakeSession>> {
        if self.state.lock().faults.contains(&RuntimeFault::CreatePanic) {
            panic!("exception 0xc0000005 inside session creation");
        }
        self.check(RuntimeFault::Create, UNSUPPORTED, "NvFBC_CreateEx")?;

        let session = FakeSession {
            id: self.tracker.acquire(HandleKind::Session),
            device: device.id,
            output: None,
        };

        Ok(CreatedSession {
            session,
            max_size: self.state.lock().max_size,
        })
    }

    fn configure(
        &self,
        session: &mut FakeSession,
        setup: &SessionSetup<'_, FakeSurface>,
    ) -> LabelledResult<()> {
        self.check(RuntimeFault::Configure, INVALID_PARAM, "NvFBCToDx9Vid::SetUp")?;

        let output = setup.output_buffer;
        if output.kind != HandleKind::RenderTarget || output.device != session.device {
            self.tracker
                .violation("Session configured with a foreign output buffer");
        }

        session.output = Some(output.id);
        self.state.lock().cursor = Some(setup.with_hardware_cursor);

        Ok(())
    }

    fn grab_frame(
        &self,
        session: &mut FakeSession,
        params: &GrabParams,
    ) -> LabelledResult<GrabStatus> {
        {
            let mut state = self.state.lock();
            state.grab_attempts += 1;
            state.last_params = Some(*params);
        }

        if session.output.is_none() {
            self.tracker.violation("Grab on an unconfigured session");
        }

        self.check(
            RuntimeFault::Grab,
            INVALIDATED_SESSION,
            "NvFBCToDx9Vid::GrabFrame",
        )?;

        let mut state = self.state.lock();
        if state.not_ready {
            return Ok(GrabStatus::NotReady);
        }

        state.frame += 1;

        Ok(GrabStatus::Frame(FrameInfo {
            width: params.target_size[0],
            height: params.target_size[1],
            current_frame: state.frame,
            is_new_frame: true,
        }))
    }

    fn release_session(&self, session: FakeSession) {
        self.tracker.release(session.id);
    }

    fn unload(&self, library: FakeLibrary) {
        if self.tracker.live_of(HandleKind::Session) > 0 {
            self.tracker.violation("Runtime unloaded with a live session");
        }

        self.tracker.release(library.id);
    }
}
