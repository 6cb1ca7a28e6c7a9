use testing::setup_logger;

#[cfg(windows)]
fn main() {
    use capture_source::{DisplayEnumerator, select_target};
    use windows_display_provider::GdiDisplays;

    let _logger = setup_logger().unwrap();

    let displays = GdiDisplays::new();
    for display in displays.displays() {
        println!("{display:?}");
    }

    let target = select_target(&displays);
    println!("Selected: {target:?}");
}

#[cfg(not(windows))]
fn main() {
    let _logger = setup_logger().unwrap();

    println!("Display enumeration is only supported on Windows");
}
