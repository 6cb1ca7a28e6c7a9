use std::{thread, time::Duration};

use capture_source::{CaptureSource, FrameRate};
use rand::Rng;
use test_helper::{FakeDisplays, FakeEffect, RuntimeFault, doubles};
use testing::setup_logger;
use tracing::info_span;

const TICKS: u32 = 300;

fn main() {
    let _logger = setup_logger().unwrap();
    let (tracker, host, graphics, runtime) = doubles();
    host.set_frame_rate(Some(FrameRate::new(30000, 1001)));
    graphics.set_row_padding(64);

    let mut source = CaptureSource::create(
        "report_interval_secs = 1.0",
        host.clone(),
        graphics,
        runtime.clone(),
        &FakeDisplays::primary([1920, 1080]),
    );

    let mut rng = rand::rng();
    {
        let _span = info_span!("Simulate").entered();

        for tick in 0..TICKS {
            // Drop a stretch of grabs to exercise the failure path
            if tick == 100 {
                runtime.fail(RuntimeFault::Grab);
            } else if tick == 130 {
                runtime.recover(RuntimeFault::Grab);
            }

            let seconds: f32 = rng.random_range(0.010..0.025);
            source.video_tick(seconds);
            source.video_render(&FakeEffect);

            thread::sleep(Duration::from_secs_f32(seconds));
        }
    }

    println!(
        "{TICKS} ticks, {} grab attempts, {} frames, {} uploads, {} draws",
        runtime.grab_attempts(),
        runtime.frames(),
        host.uploads(),
        host.draws().len()
    );

    source.destroy();

    let violations = tracker.violations();
    println!(
        "{} live handles, {} violations {violations:?}",
        tracker.live_count(),
        violations.len()
    );
}
