use capture_source::{DisplayEnumerator, DisplayRecord};
use tracing::{debug, warn};
use windows::Win32::Graphics::Gdi::{
    DEVMODEW, DISPLAY_DEVICE_PRIMARY_DEVICE, DISPLAY_DEVICEW, ENUM_CURRENT_SETTINGS,
    EnumDisplayDevicesW, EnumDisplaySettingsW,
};
use windows_core::PCWSTR;

/// Display outputs as reported by `EnumDisplayDevicesW`, in its enumeration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GdiDisplays;

impl GdiDisplays {
    /// Create a new enumerator.
    pub fn new() -> Self {
        Self
    }
}

impl DisplayEnumerator for GdiDisplays {
    fn displays(&self) -> Vec<DisplayRecord> {
        let mut displays = Vec::new();

        for adapter_index in 0.. {
            let mut device = DISPLAY_DEVICEW {
                cb: size_of::<DISPLAY_DEVICEW>() as u32,
                ..DISPLAY_DEVICEW::default()
            };

            let found =
                unsafe { EnumDisplayDevicesW(PCWSTR::null(), adapter_index, &mut device, 0) };
            if !found.as_bool() {
                break;
            }

            let device_name = wide_to_string(&device.DeviceName);
            let primary = device.StateFlags.contains(DISPLAY_DEVICE_PRIMARY_DEVICE);
            let current_mode = current_mode(&device);

            if primary && current_mode.is_none() {
                warn!("Failed to read the current mode of primary display \"{device_name}\"");
            }

            let record = DisplayRecord {
                adapter_index,
                device_name,
                primary,
                current_mode,
            };
            debug!("{record:?}");

            displays.push(record);
        }

        displays
    }
}

fn current_mode(device: &DISPLAY_DEVICEW) -> Option<[u32; 2]> {
    let mut mode = DEVMODEW {
        dmSize: size_of::<DEVMODEW>() as u16,
        ..DEVMODEW::default()
    };

    let read = unsafe {
        EnumDisplaySettingsW(
            PCWSTR(device.DeviceName.as_ptr()),
            ENUM_CURRENT_SETTINGS,
            &mut mode,
        )
    };

    read.as_bool().then_some([mode.dmPelsWidth, mode.dmPelsHeight])
}

fn wide_to_string(wide: &[u16]) -> String {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    String::from_utf16_lossy(&wide[..len])
}
