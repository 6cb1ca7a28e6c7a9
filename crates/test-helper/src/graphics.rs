use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use bytemuck::{Pod, Zeroable};
use capture_source::{
    DeviceConfig, GraphicsBackend, LabelledResult, MappedSurface, PixelFormat, StatusError,
};
use parking_lot::Mutex;

use crate::{HandleKind, HandleTracker};

const INVALID_CALL: i32 = 0x8876_086C_u32 as i32;
const OUT_OF_VIDEO_MEMORY: i32 = 0x8876_017C_u32 as i32;

/// A step of [`FakeGraphics`] that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphicsFault {
    /// Device creation.
    Device,
    /// Render target creation.
    RenderTarget,
    /// Staging surface creation.
    Staging,
    /// Render target to staging copy.
    Readback,
    /// Staging surface map.
    Map,
}

/// One BGRA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct Bgra {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl Bgra {
    /// The pattern pixel at `x`, `y`.
    pub fn at(x: u32, y: u32) -> Self {
        Self {
            b: x as u8,
            g: y as u8,
            r: (x ^ y) as u8,
            a: 0xFF,
        }
    }
}

/// The staging contents for `size` with rows `pitch` bytes apart, row padding is `0xEE`.
pub fn pixel_pattern(size: [u32; 2], pitch: u32) -> Vec<u8> {
    let row_bytes = size[0] as usize * 4;
    let padding = (pitch as usize).saturating_sub(row_bytes);

    let mut bytes = Vec::with_capacity(pitch as usize * size[1] as usize);
    for y in 0..size[1] {
        let row: Vec<Bgra> = (0..size[0]).map(|x| Bgra::at(x, y)).collect();
        bytes.extend_from_slice(bytemuck::cast_slice(&row));
        bytes.resize(bytes.len() + padding, 0xEE);
    }

    bytes
}

/// A fake device handle.
#[derive(Debug)]
pub struct FakeDevice {
    /// The tracked handle id.
    pub id: u64,
    /// The adapter the device was created on.
    pub adapter_index: u32,
    /// The config the device was created with.
    pub config: DeviceConfig,
}

/// A fake surface handle. Staging surfaces hold [`pixel_pattern`] contents.
#[derive(Debug)]
pub struct FakeSurface {
    /// The tracked handle id.
    pub id: u64,
    /// Render target or staging.
    pub kind: HandleKind,
    /// The id of the device the surface was created on.
    pub device: u64,
    /// The surface size.
    pub size: [u32; 2],
    /// Bytes between rows.
    pub pitch: u32,
    bytes: Box<[u8]>,
}

#[derive(Debug, Default)]
struct GraphicsState {
    faults: HashSet<GraphicsFault>,
    row_padding: u32,
    surfaces: HashMap<u64, u64>,
    mapped: HashSet<u64>,
    readbacks: u32,
    maps: u32,
}

/// A graphics backend that hands out tracked handles.
#[derive(Debug, Clone)]
pub struct FakeGraphics {
    tracker: HandleTracker,
    state: Arc<Mutex<GraphicsState>>,
}

impl FakeGraphics {
    /// A backend recording into `tracker`.
    pub fn new(tracker: &HandleTracker) -> Self {
        Self {
            tracker: tracker.clone(),
            state: Arc::default(),
        }
    }

    /// Make `fault` fail until [`Self::recover`].
    pub fn fail(&self, fault: GraphicsFault) {
        self.state.lock().faults.insert(fault);
    }

    /// Stop `fault` from failing.
    pub fn recover(&self, fault: GraphicsFault) {
        self.state.lock().faults.remove(&fault);
    }

    /// Pad every staging row by `bytes`, so the pitch is wider than the row.
    pub fn set_row_padding(&self, bytes: u32) {
        self.state.lock().row_padding = bytes;
    }

    /// Successful render target to staging copies.
    pub fn readbacks(&self) -> u32 {
        self.state.lock().readbacks
    }

    /// Successful maps.
    pub fn maps(&self) -> u32 {
        self.state.lock().maps
    }

    /// Surfaces currently mapped.
    pub fn mapped_count(&self) -> usize {
        self.state.lock().mapped.len()
    }

    fn check(&self, fault: GraphicsFault, code: i32, call: &'static str) -> LabelledResult<()> {
        if self.state.lock().faults.contains(&fault) {
            return Err(StatusError::new(code, call));
        }

        Ok(())
    }

    fn create_surface(
        &self,
        device: &FakeDevice,
        kind: HandleKind,
        size: [u32; 2],
        format: PixelFormat,
    ) -> FakeSurface {
        let row_bytes = size[0] * format.bytes_per_pixel();

        let (pitch, bytes) = if kind == HandleKind::Staging {
            let pitch = row_bytes + self.state.lock().row_padding;
            (pitch, pixel_pattern(size, pitch).into_boxed_slice())
        } else {
            (row_bytes, Box::default())
        };

        let id = self.tracker.acquire(kind);
        self.state.lock().surfaces.insert(id, device.id);

        FakeSurface {
            id,
            kind,
            device: device.id,
            size,
            pitch,
            bytes,
        }
    }
}

impl GraphicsBackend for FakeGraphics {
    type Device = FakeDevice;
    type Surface = FakeSurface;

    fn create_device(&self, adapter_index: u32, config: &DeviceConfig) -> LabelledResult<FakeDevice> {
        self.check(GraphicsFault::Device, INVALID_CALL, "IDirect3D9::CreateDevice")?;

        Ok(FakeDevice {
            id: self.tracker.acquire(HandleKind::Device),
            adapter_index,
            config: *config,
        })
    }

    fn create_render_target(
        &self,
        device: &FakeDevice,
        size: [u32; 2],
        format: PixelFormat,
    ) -> LabelledResult<FakeSurface> {
        self.check(
            GraphicsFault::RenderTarget,
            OUT_OF_VIDEO_MEMORY,
            "IDirect3DDevice9::CreateRenderTarget",
        )?;

        Ok(self.create_surface(device, HandleKind::RenderTarget, size, format))
    }

    fn create_staging_surface(
        &self,
        device: &FakeDevice,
        size: [u32; 2],
        format: PixelFormat,
    ) -> LabelledResult<FakeSurface> {
        self.check(
            GraphicsFault::Staging,
            INVALID_CALL,
            "IDirect3DDevice9::CreateOffscreenPlainSurface",
        )?;

        Ok(self.create_surface(device, HandleKind::Staging, size, format))
    }

    fn copy_render_target_data(
        &self,
        device: &FakeDevice,
        render_target: &FakeSurface,
        staging: &FakeSurface,
    ) -> LabelledResult<()> {
        self.check(
            GraphicsFault::Readback,
            INVALID_CALL,
            "IDirect3DDevice9::GetRenderTargetData",
        )?;

        if render_target.kind != HandleKind::RenderTarget || staging.kind != HandleKind::Staging {
            self.tracker.violation("Readback with mismatched surface kinds");
        }
        if render_target.device != device.id || staging.device != device.id {
            self.tracker.violation("Readback across devices");
        }

        self.state.lock().readbacks += 1;
        Ok(())
    }

    fn map_read<'a>(&'a self, staging: &'a FakeSurface) -> LabelledResult<MappedSurface<'a>> {
        self.check(GraphicsFault::Map, INVALID_CALL, "IDirect3DSurface9::LockRect")?;

        let mut state = self.state.lock();
        if !state.mapped.insert(staging.id) {
            self.tracker.violation(format!("Surface {} mapped twice", staging.id));
        }
        state.maps += 1;

        Ok(MappedSurface {
            bytes: &staging.bytes,
            pitch: staging.pitch,
        })
    }

    fn unmap(&self, staging: &FakeSurface) {
        if !self.state.lock().mapped.remove(&staging.id) {
            self.tracker
                .violation(format!("Surface {} unmapped while not mapped", staging.id));
        }
    }

    fn release_surface(&self, surface: FakeSurface) {
        {
            let mut state = self.state.lock();
            if state.mapped.contains(&surface.id) {
                self.tracker
                    .violation(format!("Surface {} released while mapped", surface.id));
            }
            state.surfaces.remove(&surface.id);
        }

        self.tracker.release(surface.id);
    }

    fn release_device(&self, device: FakeDevice) {
        let orphans = self
            .state
            .lock()
            .surfaces
            .values()
            .filter(|owner| **owner == device.id)
            .count();

        if orphans > 0 {
            self.tracker.violation(format!(
                "Device {} released with {orphans} live surfaces",
                device.id
            ));
        }

        self.tracker.release(device.id);
    }
}

#[cfg(test)]
mod test {
    use super::pixel_pattern;

    #[test]
    fn pattern_pads_rows() {
        let bytes = pixel_pattern([2, 2], 12);

        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 0xFF]);
        assert_eq!(&bytes[4..8], &[1, 0, 1, 0xFF]);
        assert_eq!(&bytes[8..12], &[0xEE; 4]);
        assert_eq!(&bytes[12..16], &[0, 1, 1, 0xFF]);
    }
}
