#![cfg(windows)]

use capture_source::{DisplayEnumerator, select_target};
use windows_display_provider::GdiDisplays;

#[test]
fn enumerate_displays() {
    let displays = GdiDisplays::new().displays();

    for (index, display) in displays.iter().enumerate() {
        assert_eq!(display.adapter_index as usize, index);
        assert!(!display.device_name.is_empty());
    }

    assert!(displays.iter().filter(|display| display.primary).count() <= 1);

    let target = select_target(&GdiDisplays::new());
    assert!(target.size[0] > 0 && target.size[1] > 0);
}
