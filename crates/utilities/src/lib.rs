//! # Utilities
//! Small helpers shared across the capture workspace.
//!

pub mod failure;

use core::time::Duration;

/// Display the duration as a string with units. Display is handled in the following order:
/// 1. `>= 10s` displays seconds only.
/// 1. `>= 1s` displays seconds with 2dp.
/// 1. `>= 1ms` displays milliseconds only.
/// 1. `< 1ms` displays microseconds only.
#[inline]
pub fn display_duration(duration: Duration) -> String {
    if duration.as_secs() >= 10 {
        format!("{}s", duration.as_secs())
    } else if duration.as_secs() >= 1 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if duration.as_millis() >= 1 {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{}µs", duration.as_micros())
    }
}

#[cfg(test)]
mod test {
    use core::time::Duration;

    use super::display_duration;

    #[test]
    fn units() {
        assert_eq!(display_duration(Duration::from_secs(12)), "12s");
        assert_eq!(display_duration(Duration::from_millis(1250)), "1.25s");
        assert_eq!(display_duration(Duration::from_millis(16)), "16ms");
        assert_eq!(display_duration(Duration::from_micros(250)), "250µs");
    }
}
