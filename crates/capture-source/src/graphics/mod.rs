//! The graphics device and the surfaces a capture is read back through.
//!

mod device_handles;

pub use device_handles::{DeviceHandles, ProvisionError, ProvisionStage};

use crate::LabelledResult;

/// The pixel format of the capture and staging surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// 32-bit BGRA, 8 bits per channel. `A8R8G8B8` in Direct3D 9 terms.
    Bgra8,
}

impl PixelFormat {
    /// The number of bytes a single pixel occupies.
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Bgra8 => 4,
        }
    }
}

/// How the device presents, the capture device is never presented on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentInterval {
    /// Present without waiting for vertical sync.
    Immediate,
}

/// The parameters a capture device is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// The back buffer size, the capture target size.
    pub back_buffer_size: [u32; 2],

    /// If the device is windowed, always `true` for an off-screen capture device.
    pub windowed: bool,

    /// The device's presentation interval.
    pub present_interval: PresentInterval,
}

impl DeviceConfig {
    /// Config for a hidden off-screen device sized to the capture target.
    pub fn offscreen(size: [u32; 2]) -> Self {
        Self {
            back_buffer_size: size,
            windowed: true,
            present_interval: PresentInterval::Immediate,
        }
    }
}

/// A staging surface mapped for CPU reads.
#[derive(Debug, Clone, Copy)]
pub struct MappedSurface<'a> {
    /// The mapped bytes, `pitch * height` long.
    pub bytes: &'a [u8],

    /// The number of bytes between the start of two rows. May be larger than `width * 4`.
    pub pitch: u32,
}

/// The graphics API the capture device and surfaces are created through.
///
/// Every handle created by a backend must be passed back to the matching release call exactly
/// once.
pub trait GraphicsBackend {
    /// The device handle.
    type Device;

    /// A surface handle.
    type Surface;

    /// Create a device on the adapter.
    fn create_device(&self, adapter_index: u32, config: &DeviceConfig) -> LabelledResult<Self::Device>;

    /// Create a GPU render target the capture session writes into.
    fn create_render_target(
        &self,
        device: &Self::Device,
        size: [u32; 2],
        format: PixelFormat,
    ) -> LabelledResult<Self::Surface>;

    /// Create a CPU readable surface in system memory.
    fn create_staging_surface(
        &self,
        device: &Self::Device,
        size: [u32; 2],
        format: PixelFormat,
    ) -> LabelledResult<Self::Surface>;

    /// Copy the render target contents into the staging surface.
    fn copy_render_target_data(
        &self,
        device: &Self::Device,
        render_target: &Self::Surface,
        staging: &Self::Surface,
    ) -> LabelledResult<()>;

    /// Map the staging surface for read-only CPU access.
    fn map_read<'a>(&'a self, staging: &'a Self::Surface) -> LabelledResult<MappedSurface<'a>>;

    /// Unmap a mapped staging surface.
    fn unmap(&self, staging: &Self::Surface);

    /// Release a surface.
    fn release_surface(&self, surface: Self::Surface);

    /// Release a device, all surfaces created on it must already be released.
    fn release_device(&self, device: Self::Device);
}
