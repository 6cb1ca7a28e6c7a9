use tracing::{debug, info, warn};

/// The resolution used when no primary display can be found.
pub const FALLBACK_SIZE: [u32; 2] = [1920, 1080];

/// A display output as reported by the platform's display enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRecord {
    /// The position of this output in the platform's enumeration order, used as the adapter index.
    pub adapter_index: u32,

    /// The platform device name of the output.
    pub device_name: String,

    /// If the output is the primary desktop output.
    pub primary: bool,

    /// The pixel size of the output's current mode, `None` if the mode couldn't be read.
    pub current_mode: Option<[u32; 2]>,
}

/// A source of display records in a stable, platform defined order.
pub trait DisplayEnumerator {
    /// Returns the current display outputs.
    fn displays(&self) -> Vec<DisplayRecord>;
}

/// The display and resolution a capture context is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTarget {
    /// The size of the target in pixels.
    pub size: [u32; 2],

    /// The adapter the target belongs to.
    pub adapter_index: u32,

    /// If a primary display was found, `false` if the fallback target is in use.
    pub found: bool,
}

impl CaptureTarget {
    /// The target used when no primary display exists.
    pub fn fallback(size: [u32; 2]) -> Self {
        Self {
            size,
            adapter_index: 0,
            found: false,
        }
    }
}

/// Selects the first primary display with a readable mode, or the fallback target.
pub fn select_target(displays: &impl DisplayEnumerator) -> CaptureTarget {
    select_target_or(displays, FALLBACK_SIZE)
}

/// Selects the first primary display with a readable mode, falling back to `fallback_size` on
/// adapter 0.
pub fn select_target_or(displays: &impl DisplayEnumerator, fallback_size: [u32; 2]) -> CaptureTarget {
    for output in displays.displays() {
        debug!("{output:?}");

        if !output.primary {
            continue;
        }

        let Some(size) = output.current_mode else {
            warn!(
                "Primary display \"{}\" has no readable mode, skipping",
                output.device_name
            );
            continue;
        };

        info!(
            "Chosen adapter index: {}, resolution: {}x{}",
            output.adapter_index, size[0], size[1]
        );

        return CaptureTarget {
            size,
            adapter_index: output.adapter_index,
            found: true,
        };
    }

    warn!(
        "No primary display found, using {}x{} on adapter 0",
        fallback_size[0], fallback_size[1]
    );
    CaptureTarget::fallback(fallback_size)
}

#[cfg(test)]
mod test {
    use super::*;

    struct Displays(Vec<DisplayRecord>);

    impl DisplayEnumerator for Displays {
        fn displays(&self) -> Vec<DisplayRecord> {
            self.0.clone()
        }
    }

    fn record(adapter_index: u32, primary: bool, current_mode: Option<[u32; 2]>) -> DisplayRecord {
        DisplayRecord {
            adapter_index,
            device_name: format!("\\\\.\\DISPLAY{}", adapter_index + 1),
            primary,
            current_mode,
        }
    }

    #[test]
    fn selects_primary() {
        let displays = Displays(vec![
            record(0, false, Some([1280, 720])),
            record(1, true, Some([2560, 1440])),
            record(2, true, Some([3840, 2160])),
        ]);

        let target = select_target(&displays);
        assert_eq!(
            target,
            CaptureTarget {
                size: [2560, 1440],
                adapter_index: 1,
                found: true
            }
        );
    }

    #[test]
    fn no_primary_falls_back() {
        let displays = Displays(vec![record(0, false, Some([1280, 720]))]);

        let target = select_target(&displays);
        assert_eq!(target.size, [1920, 1080]);
        assert_eq!(target.adapter_index, 0);
        assert!(!target.found);
    }

    #[test]
    fn empty_enumeration_falls_back() {
        let target = select_target(&Displays(vec![]));
        assert_eq!(target, CaptureTarget::fallback(FALLBACK_SIZE));
    }

    #[test]
    fn primary_without_mode_is_skipped() {
        let displays = Displays(vec![record(0, true, None), record(1, true, Some([1600, 900]))]);

        let target = select_target(&displays);
        assert_eq!(target.size, [1600, 900]);
        assert_eq!(target.adapter_index, 1);
        assert!(target.found);
    }

    #[test]
    fn custom_fallback_size() {
        let target = select_target_or(&Displays(vec![record(0, true, None)]), [1280, 720]);
        assert_eq!(target, CaptureTarget::fallback([1280, 720]));
    }
}
