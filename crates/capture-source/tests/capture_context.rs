use capture_source::{
    CaptureContext, CaptureSettings, CreateError, FrameRate, GrabMode, ProvisionStage,
    SessionError, SessionState,
};
use test_helper::{
    FakeDisplays, FakeGraphics, FakeHost, FakeRuntime, GraphicsFault, HandleKind, RuntimeFault,
    doubles, logger::init_logger, pixel_pattern,
};

type Context = CaptureContext<FakeHost, FakeGraphics, FakeRuntime>;

fn create(
    host: &FakeHost,
    graphics: &FakeGraphics,
    runtime: &FakeRuntime,
    size: [u32; 2],
) -> Result<Context, CreateError> {
    Context::create(
        host.clone(),
        graphics.clone(),
        runtime.clone(),
        &FakeDisplays::primary(size),
        CaptureSettings::default(),
    )
}

fn assert_context_balanced(host: &FakeHost) {
    assert_eq!(host.depth(), 0);
    assert_eq!(host.enters(), host.leaves());
}

#[test]
fn create_and_destroy() {
    init_logger();
    let (tracker, host, graphics, runtime) = doubles();

    let mut context = create(&host, &graphics, &runtime, [2560, 1440]).unwrap();
    assert_eq!((context.width(), context.height()), (2560, 1440));
    assert!(context.target().found);
    assert_eq!(context.session_state(), SessionState::Configured);
    assert_eq!(context.max_capture_size(), Some([3840, 2160]));
    assert_eq!(runtime.configured_cursor(), Some(true));
    assert_eq!(
        tracker.acquired(),
        [
            HandleKind::Device,
            HandleKind::RenderTarget,
            HandleKind::Staging,
            HandleKind::Library,
            HandleKind::Session,
            HandleKind::Texture,
        ]
    );

    context.destroy();
    assert!(!context.is_live());
    assert_eq!(
        tracker.released(),
        [
            HandleKind::Session,
            HandleKind::Library,
            HandleKind::Texture,
            HandleKind::Staging,
            HandleKind::RenderTarget,
            HandleKind::Device,
        ]
    );

    context.destroy();
    drop(context);

    assert_eq!(tracker.released().len(), 6);
    assert_context_balanced(&host);
    tracker.assert_clean();
}

#[test]
fn drop_destroys() {
    init_logger();
    let (tracker, host, graphics, runtime) = doubles();

    let context = create(&host, &graphics, &runtime, [1920, 1080]).unwrap();
    drop(context);

    assert_context_balanced(&host);
    tracker.assert_clean();
}

#[test]
fn no_primary_display_uses_fallback() {
    init_logger();
    let (tracker, host, graphics, runtime) = doubles();

    let settings = CaptureSettings::from_toml("fallback_size = [1280, 720]").unwrap();
    let context = Context::create(
        host.clone(),
        graphics.clone(),
        runtime.clone(),
        &FakeDisplays::none(),
        settings,
    )
    .unwrap();

    let target = context.target();
    assert!(!target.found);
    assert_eq!(target.adapter_index, 0);
    assert_eq!((context.width(), context.height()), (1280, 720));

    drop(context);
    tracker.assert_clean();
}

#[test]
fn create_failure_at_every_stage_releases_everything() {
    init_logger();

    let graphics_faults = [
        (GraphicsFault::Device, ProvisionStage::Device),
        (GraphicsFault::RenderTarget, ProvisionStage::CaptureSurface),
        (GraphicsFault::Staging, ProvisionStage::StagingSurface),
    ];

    for (fault, stage) in graphics_faults {
        let (tracker, host, graphics, runtime) = doubles();
        graphics.fail(fault);

        let error = create(&host, &graphics, &runtime, [1920, 1080])
            .err()
            .expect("create should fail");

        match error {
            CreateError::Provision(error) => assert_eq!(error.stage(), stage),
            error => panic!("Unexpected error: {error}"),
        }

        assert_eq!(tracker.live_count(), 0);
        assert_context_balanced(&host);
        tracker.assert_clean();
    }

    for fault in [
        RuntimeFault::Load,
        RuntimeFault::Create,
        RuntimeFault::CreatePanic,
        RuntimeFault::Configure,
    ] {
        let (tracker, host, graphics, runtime) = doubles();
        runtime.fail(fault);

        let error = create(&host, &graphics, &runtime, [1920, 1080])
            .err()
            .expect("create should fail");
        assert!(matches!(error, CreateError::Session(_)), "{error}");

        if fault == RuntimeFault::CreatePanic {
            assert!(matches!(
                error,
                CreateError::Session(SessionError::Guarded(_))
            ));
        }

        assert_context_balanced(&host);
        tracker.assert_clean();
    }

    let (tracker, host, graphics, runtime) = doubles();
    host.fail_textures();

    let error = create(&host, &graphics, &runtime, [1920, 1080])
        .err()
        .expect("create should fail");
    assert!(matches!(error, CreateError::Texture(_)));

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
    assert_context_balanced(&host);
    tracker.assert_clean();
}

#[test]
fn thirty_fps_with_fifty_fps_ticks() {
    init_logger();
    let (tracker, host, graphics, runtime) = doubles();
    host.set_frame_rate(Some(FrameRate::new(30, 1)));

    let mut context = create(&host, &graphics, &runtime, [1920, 1080]).unwrap();

    context.tick(0.02);
    assert_eq!(runtime.grab_attempts(), 0);
    assert!((context.accumulated_time() - 0.02).abs() < 1e-6);

    context.tick(0.02);
    assert_eq!(runtime.grab_attempts(), 1);
    assert!((context.accumulated_time() - (0.04 - 1.0 / 30.0)).abs() < 1e-6);

    for _ in 0..98 {
        context.tick(0.02);
    }

    // Two seconds at 30 FPS
    let attempts = runtime.grab_attempts();
    assert!((59..=60).contains(&attempts), "{attempts} grabs");
    assert_eq!(host.uploads(), attempts);
    assert_eq!(
        runtime.last_params().map(|params| (params.no_wait, params.mode, params.target_size)),
        Some((true, GrabMode::Scale, [1920, 1080]))
    );

    drop(context);
    assert_context_balanced(&host);
    tracker.assert_clean();
}

#[test]
fn unknown_frame_rate_uses_fallback_fps() {
    init_logger();
    let (tracker, host, graphics, runtime) = doubles();
    host.set_frame_rate(Some(FrameRate::new(60, 0)));

    let settings = CaptureSettings::from_toml("fallback_fps = 10.0").unwrap();
    let mut context = Context::create(
        host.clone(),
        graphics.clone(),
        runtime.clone(),
        &FakeDisplays::primary([640, 480]),
        settings,
    )
    .unwrap();

    context.tick(0.05);
    assert_eq!(runtime.grab_attempts(), 0);

    context.tick(0.06);
    assert_eq!(runtime.grab_attempts(), 1);

    drop(context);
    tracker.assert_clean();
}

#[test]
fn failing_grabs_are_attempted_once_per_tick() {
    init_logger();
    let (tracker, host, graphics, runtime) = doubles();
    let mut context = create(&host, &graphics, &runtime, [1920, 1080]).unwrap();
    runtime.fail(RuntimeFault::Grab);

    for _ in 0..5 {
        context.tick(0.5);
    }

    assert_eq!(runtime.grab_attempts(), 5);
    assert_eq!(graphics.readbacks(), 0);
    assert_eq!(host.uploads(), 0);
    assert_eq!(context.grab_count(), 0);
    assert!(context.accumulated_time() <= 1.0 / 60.0 + 1e-9);

    drop(context);
    assert_context_balanced(&host);
    tracker.assert_clean();
}

#[test]
fn not_ready_keeps_previous_frame() {
    init_logger();
    let (tracker, host, graphics, runtime) = doubles();
    let mut context = create(&host, &graphics, &runtime, [64, 16]).unwrap();

    context.tick(0.02);
    assert_eq!(host.uploads(), 1);
    let first = host.texture_data().unwrap();

    runtime.set_not_ready(true);
    context.tick(0.02);
    context.tick(0.02);

    assert_eq!(runtime.grab_attempts(), 3);
    assert_eq!(graphics.readbacks(), 1);
    assert_eq!(host.uploads(), 1);
    assert_eq!(host.texture_data().unwrap(), first);

    drop(context);
    tracker.assert_clean();
}

#[test]
fn readback_and_map_failures_skip_upload() {
    init_logger();

    for fault in [GraphicsFault::Readback, GraphicsFault::Map] {
        let (tracker, host, graphics, runtime) = doubles();
        let mut context = create(&host, &graphics, &runtime, [320, 200]).unwrap();
        graphics.fail(fault);

        context.tick(0.02);
        context.tick(0.02);

        assert_eq!(runtime.grab_attempts(), 2);
        assert_eq!(host.uploads(), 0);
        assert_eq!(graphics.maps(), 0);
        assert_eq!(graphics.mapped_count(), 0);
        assert_context_balanced(&host);

        graphics.recover(fault);
        context.tick(0.02);
        assert_eq!(host.uploads(), 1);
        assert_eq!(graphics.mapped_count(), 0);

        context.destroy();
        assert_context_balanced(&host);
        tracker.assert_clean();
    }
}

#[test]
fn padded_rows_upload_tightly_packed() {
    init_logger();
    let (tracker, host, graphics, runtime) = doubles();
    graphics.set_row_padding(96);

    let size = [37, 23];
    let mut context = create(&host, &graphics, &runtime, size).unwrap();
    context.tick(0.02);

    assert_eq!(host.uploads(), 1);
    assert_eq!(host.texture_data().unwrap(), pixel_pattern(size, size[0] * 4));

    drop(context);
    tracker.assert_clean();
}

#[test]
fn render_draws_full_frame() {
    init_logger();
    let (tracker, host, graphics, runtime) = doubles();
    let context = create(&host, &graphics, &runtime, [1600, 900]).unwrap();

    context.render(&test_helper::FakeEffect);

    assert_eq!(host.binds(), 1);
    assert_eq!(host.draws(), [[1600, 900]]);

    drop(context);
    tracker.assert_clean();
}

#[test]
fn update_keeps_creation_settings() {
    init_logger();
    let (tracker, host, graphics, runtime) = doubles();
    let mut context = create(&host, &graphics, &runtime, [1920, 1080]).unwrap();

    context.update("fallback_fps = 5.0");
    context.update("fallback_fps = \"fast\"");

    assert_eq!(*context.settings(), CaptureSettings::default());

    drop(context);
    tracker.assert_clean();
}

#[test]
fn unvalidated_report_interval_does_not_panic() {
    init_logger();
    let (tracker, host, graphics, runtime) = doubles();

    let settings = CaptureSettings {
        report_interval_secs: 1e300,
        ..CaptureSettings::default()
    };
    let mut context = Context::create(
        host.clone(),
        graphics.clone(),
        runtime.clone(),
        &FakeDisplays::primary([800, 600]),
        settings,
    )
    .unwrap();

    context.tick(0.02);
    assert_eq!(runtime.grab_attempts(), 1);

    drop(context);
    tracker.assert_clean();
}
