use capture_source::{
    CaptureSession, DeviceHandles, GrabError, GrabMode, GrabParams, SessionError, SessionState,
};
use test_helper::{
    FakeGraphics, FakeRuntime, HandleKind, RuntimeFault, doubles, logger::init_logger,
};

type Session = CaptureSession<FakeGraphics, FakeRuntime>;

const SIZE: [u32; 2] = [1920, 1080];

#[test]
fn open_configures_session() {
    init_logger();
    let (tracker, _, graphics, runtime) = doubles();
    let mut handles = DeviceHandles::provision(&graphics, 0, SIZE).unwrap();

    let mut session = Session::new();
    assert_eq!(session.state(), SessionState::Unopened);

    session.open(&runtime, &handles, false).unwrap();
    assert_eq!(session.state(), SessionState::Configured);
    assert!(session.is_ready());
    assert_eq!(session.max_size(), Some([3840, 2160]));
    assert_eq!(runtime.configured_cursor(), Some(false));

    let info = session
        .grab(&runtime, &GrabParams::no_wait(SIZE, GrabMode::Scale))
        .unwrap();
    assert_eq!([info.width, info.height], SIZE);
    assert!(info.is_new_frame);

    session.close(&runtime);
    assert_eq!(session.state(), SessionState::Unopened);
    assert!(!session.is_live());

    handles.release(&graphics);
    assert_eq!(
        tracker.released(),
        [
            HandleKind::Session,
            HandleKind::Library,
            HandleKind::Staging,
            HandleKind::RenderTarget,
            HandleKind::Device,
        ]
    );
    tracker.assert_clean();
}

#[test]
fn open_twice_is_rejected() {
    init_logger();
    let (tracker, _, graphics, runtime) = doubles();
    let mut handles = DeviceHandles::provision(&graphics, 0, SIZE).unwrap();

    let mut session = Session::new();
    session.open(&runtime, &handles, true).unwrap();
    assert_eq!(
        session.open(&runtime, &handles, true),
        Err(SessionError::AlreadyOpen)
    );
    assert!(session.is_ready());

    session.close(&runtime);
    handles.release(&graphics);
    tracker.assert_clean();
}

#[test]
fn open_without_device() {
    init_logger();
    let (tracker, _, _, runtime) = doubles();
    let handles = DeviceHandles::<FakeGraphics>::empty(SIZE);

    let mut session = Session::new();
    assert_eq!(
        session.open(&runtime, &handles, true),
        Err(SessionError::NoDevice)
    );
    assert_eq!(tracker.acquired().len(), 0);
}

#[test]
fn failed_open_releases_everything() {
    init_logger();

    for fault in [
        RuntimeFault::Load,
        RuntimeFault::Create,
        RuntimeFault::CreatePanic,
        RuntimeFault::Configure,
    ] {
        let (tracker, _, graphics, runtime) = doubles();
        let mut handles = DeviceHandles::provision(&graphics, 0, SIZE).unwrap();
        runtime.fail(fault);

        let mut session = Session::new();
        let error = session.open(&runtime, &handles, true).unwrap_err();

        match fault {
            RuntimeFault::Load => match &error {
                SessionError::Load(status) => {
                    assert_eq!(status.call(), "LoadLibrary");
                    assert_eq!(status.code(), 126);
                }
                error => panic!("Unexpected error: {error}"),
            },
            RuntimeFault::Create => assert!(matches!(error, SessionError::Create(_))),
            RuntimeFault::CreatePanic => assert!(matches!(error, SessionError::Guarded(_))),
            RuntimeFault::Configure => assert!(matches!(error, SessionError::Configure(_))),
            RuntimeFault::Grab => unreachable!(),
        }

        assert_eq!(session.state(), SessionState::Unopened);
        assert!(!session.is_live());
        assert_eq!(session.max_size(), None);
        assert_eq!(tracker.live_of(HandleKind::Library), 0);
        assert_eq!(tracker.live_of(HandleKind::Session), 0);

        handles.release(&graphics);
        tracker.assert_clean();
    }
}

#[test]
fn configure_failure_releases_session_before_unload() {
    init_logger();
    let (tracker, _, graphics, runtime) = doubles();
    let mut handles = DeviceHandles::provision(&graphics, 0, SIZE).unwrap();
    runtime.fail(RuntimeFault::Configure);

    let mut session = Session::new();
    session.open(&runtime, &handles, true).unwrap_err();

    assert_eq!(
        tracker.released(),
        [HandleKind::Session, HandleKind::Library]
    );

    handles.release(&graphics);
    tracker.assert_clean();
}

#[test]
fn grab_requires_configured_session() {
    init_logger();
    let (_, _, _, runtime) = doubles();

    let mut session = Session::new();
    let result = session.grab(&runtime, &GrabParams::no_wait(SIZE, GrabMode::Scale));

    assert_eq!(result, Err(GrabError::NotConfigured));
    assert_eq!(runtime.grab_attempts(), 0);
}

#[test]
fn grab_reports_runtime_state() {
    init_logger();
    let (tracker, _, graphics, runtime) = doubles();
    let mut handles = DeviceHandles::provision(&graphics, 0, SIZE).unwrap();

    let mut session = Session::new();
    session.open(&runtime, &handles, true).unwrap();
    let params = GrabParams::no_wait(SIZE, GrabMode::Source);

    runtime.set_not_ready(true);
    assert_eq!(session.grab(&runtime, &params), Err(GrabError::NotReady));

    runtime.set_not_ready(false);
    runtime.fail(RuntimeFault::Grab);
    assert!(matches!(
        session.grab(&runtime, &params),
        Err(GrabError::Grab(_))
    ));

    runtime.recover(RuntimeFault::Grab);
    assert_eq!(session.grab(&runtime, &params).unwrap().current_frame, 1);
    assert_eq!(runtime.last_params(), Some(params));
    assert_eq!(runtime.grab_attempts(), 3);

    session.close(&runtime);
    handles.release(&graphics);
    tracker.assert_clean();
}
