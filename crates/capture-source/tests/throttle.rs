use core::time::Duration;
use std::time::Instant;

use capture_source::{FrameThrottle, TickOutcome};
use rand::Rng;
use test_helper::logger::init_logger;

#[test]
fn grabs_track_elapsed_time() {
    init_logger();
    let mut rng = rand::rng();

    for fps in [24.0, 30.0, 59.94, 60.0, 144.0] {
        let interval = 1.0 / fps;
        let now = Instant::now();
        let mut throttle = FrameThrottle::new(now, Duration::from_secs(3600));

        let mut elapsed = 0.0;
        let mut grabs = 0u32;

        for _ in 0..2000 {
            let delta = rng.random_range(0.0..=interval);
            elapsed += delta;

            if throttle.tick::<(), _>(delta, fps, now, || Ok(())) == TickOutcome::Grabbed {
                grabs += 1;
            }

            let accumulated = throttle.accumulated();
            assert!((0.0..=interval).contains(&accumulated));
            assert!((f64::from(grabs) * interval + accumulated - elapsed).abs() < 1e-6);
        }

        let expected = (elapsed / interval).floor();
        assert!((f64::from(grabs) - expected).abs() <= 1.0);
        assert_eq!(throttle.grab_count(), grabs);
    }
}

#[test]
fn at_most_one_attempt_per_tick() {
    init_logger();
    let mut rng = rand::rng();
    let now = Instant::now();
    let mut throttle = FrameThrottle::new(now, Duration::from_secs(1));

    for _ in 0..500 {
        let delta = rng.random_range(0.0..1.0);
        let mut attempts = 0;

        let _ = throttle.tick(delta, 60.0, now, || {
            attempts += 1;
            Err("grab failed")
        });

        assert!(attempts <= 1);
        assert!(throttle.accumulated() <= 1.0 / 60.0 + 1e-12);
    }

    assert_eq!(throttle.grab_count(), 0);
}
