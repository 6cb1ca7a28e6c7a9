use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::StatusError;

use super::{DeviceConfig, GraphicsBackend, PixelFormat};

/// The format both surfaces are created in.
pub const SURFACE_FORMAT: PixelFormat = PixelFormat::Bgra8;

/// The device and the two surfaces a capture is read back through.
pub struct DeviceHandles<G: GraphicsBackend> {
    device: Option<G::Device>,
    capture_surface: Option<G::Surface>,
    staging_surface: Option<G::Surface>,
    size: [u32; 2],
}

impl<G: GraphicsBackend> DeviceHandles<G> {
    /// Handles with nothing acquired.
    pub fn empty(size: [u32; 2]) -> Self {
        Self {
            device: None,
            capture_surface: None,
            staging_surface: None,
            size,
        }
    }

    /// Creates the device on `adapter_index`, then the capture render target, then the staging
    /// surface, all sized to `size`.
    ///
    /// On failure everything created so far is released before the error is returned.
    #[instrument("DeviceHandles::provision", skip(graphics), err)]
    pub fn provision(
        graphics: &G,
        adapter_index: u32,
        size: [u32; 2],
    ) -> Result<Self, ProvisionError> {
        let mut handles = Self::empty(size);

        if let Err(error) = handles.provision_inner(graphics, adapter_index) {
            handles.release(graphics);
            return Err(error);
        }

        Ok(handles)
    }

    fn provision_inner(&mut self, graphics: &G, adapter_index: u32) -> Result<(), ProvisionError> {
        let config = DeviceConfig::offscreen(self.size);

        let device = graphics
            .create_device(adapter_index, &config)
            .map_err(ProvisionError::Device)?;
        let device = self.device.insert(device);
        info!("Device created on adapter {adapter_index}");

        let capture_surface = graphics
            .create_render_target(device, self.size, SURFACE_FORMAT)
            .map_err(ProvisionError::CaptureSurface)?;
        self.capture_surface = Some(capture_surface);
        debug!("Capture render target created");

        let staging_surface = graphics
            .create_staging_surface(device, self.size, SURFACE_FORMAT)
            .map_err(ProvisionError::StagingSurface)?;
        self.staging_surface = Some(staging_surface);
        debug!("Staging surface created");

        Ok(())
    }

    /// Releases the staging surface, the capture surface, then the device. Handles that were
    /// never created or are already released are skipped.
    pub fn release(&mut self, graphics: &G) {
        let mut released = false;

        if let Some(surface) = self.staging_surface.take() {
            graphics.release_surface(surface);
            released = true;
        }

        if let Some(surface) = self.capture_surface.take() {
            graphics.release_surface(surface);
            released = true;
        }

        if let Some(device) = self.device.take() {
            graphics.release_device(device);
            released = true;
        }

        if released {
            info!("Device released");
        }
    }

    /// The device, if live.
    pub fn device(&self) -> Option<&G::Device> {
        self.device.as_ref()
    }

    /// The capture render target, if live.
    pub fn capture_surface(&self) -> Option<&G::Surface> {
        self.capture_surface.as_ref()
    }

    /// The staging surface, if live.
    pub fn staging_surface(&self) -> Option<&G::Surface> {
        self.staging_surface.as_ref()
    }

    /// The size of both surfaces.
    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    /// If any handle is still live.
    pub fn is_live(&self) -> bool {
        self.device.is_some() || self.capture_surface.is_some() || self.staging_surface.is_some()
    }
}

impl<G: GraphicsBackend> core::fmt::Debug for DeviceHandles<G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceHandles")
            .field("device", &self.device.is_some())
            .field("capture_surface", &self.capture_surface.is_some())
            .field("staging_surface", &self.staging_surface.is_some())
            .field("size", &self.size)
            .finish()
    }
}

/// The provisioning step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStage {
    /// Device creation.
    Device,

    /// Capture render target creation.
    CaptureSurface,

    /// Staging surface creation.
    StagingSurface,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ProvisionError {
    #[error("Failed to create device:\n{0}")]
    Device(#[source] StatusError),

    #[error("Failed to create capture render target:\n{0}")]
    CaptureSurface(#[source] StatusError),

    #[error("Failed to create staging surface:\n{0}")]
    StagingSurface(#[source] StatusError),
}

impl ProvisionError {
    /// The step that failed.
    pub fn stage(&self) -> ProvisionStage {
        match self {
            Self::Device(_) => ProvisionStage::Device,
            Self::CaptureSurface(_) => ProvisionStage::CaptureSurface,
            Self::StagingSurface(_) => ProvisionStage::StagingSurface,
        }
    }
}
