use capture_source::{DisplayEnumerator, DisplayRecord};

/// A fixed list of displays.
#[derive(Debug, Clone, Default)]
pub struct FakeDisplays {
    /// The displays returned by every enumeration.
    pub displays: Vec<DisplayRecord>,
}

impl FakeDisplays {
    /// A single primary display on adapter 0 with `size` as its current mode.
    pub fn primary(size: [u32; 2]) -> Self {
        Self {
            displays: vec![DisplayRecord {
                adapter_index: 0,
                device_name: "\\\\.\\DISPLAY1".to_string(),
                primary: true,
                current_mode: Some(size),
            }],
        }
    }

    /// No displays at all.
    pub fn none() -> Self {
        Self::default()
    }
}

impl DisplayEnumerator for FakeDisplays {
    fn displays(&self) -> Vec<DisplayRecord> {
        self.displays.clone()
    }
}
