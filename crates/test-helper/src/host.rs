use std::{collections::HashMap, sync::Arc};

use capture_source::{FrameRate, Host, PixelFormat};
use parking_lot::Mutex;

use crate::{HandleKind, HandleTracker};

/// A fake host texture handle.
#[derive(Debug)]
pub struct FakeTexture {
    /// The tracked handle id.
    pub id: u64,
    /// The texture size.
    pub size: [u32; 2],
}

/// A fake effect, draws are recorded on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeEffect;

#[derive(Debug, Default)]
struct HostState {
    frame_rate: Option<FrameRate>,
    fail_textures: bool,

    depth: u32,
    enters: u32,
    leaves: u32,

    textures: HashMap<u64, Vec<u8>>,
    uploads: u32,
    binds: u32,
    draws: Vec<[u32; 2]>,
}

/// A host that stores uploaded texture contents tightly packed and records every draw.
#[derive(Debug, Clone)]
pub struct FakeHost {
    tracker: HandleTracker,
    state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    /// A 60 FPS host recording into `tracker`.
    pub fn new(tracker: &HandleTracker) -> Self {
        let host = Self {
            tracker: tracker.clone(),
            state: Arc::default(),
        };
        host.set_frame_rate(Some(FrameRate::new(60, 1)));

        host
    }

    /// Change the reported frame rate.
    pub fn set_frame_rate(&self, rate: Option<FrameRate>) {
        self.state.lock().frame_rate = rate;
    }

    /// Make texture creation fail.
    pub fn fail_textures(&self) {
        self.state.lock().fail_textures = true;
    }

    /// The current graphics context nesting depth.
    pub fn depth(&self) -> u32 {
        self.state.lock().depth
    }

    /// The number of times the graphics context was entered.
    pub fn enters(&self) -> u32 {
        self.state.lock().enters
    }

    /// The number of times the graphics context was left.
    pub fn leaves(&self) -> u32 {
        self.state.lock().leaves
    }

    /// The number of texture uploads.
    pub fn uploads(&self) -> u32 {
        self.state.lock().uploads
    }

    /// The number of effect binds.
    pub fn binds(&self) -> u32 {
        self.state.lock().binds
    }

    /// The size of every sprite drawn.
    pub fn draws(&self) -> Vec<[u32; 2]> {
        self.state.lock().draws.clone()
    }

    /// The tightly packed contents of the live texture with the lowest id.
    pub fn texture_data(&self) -> Option<Vec<u8>> {
        let state = self.state.lock();

        state
            .textures
            .iter()
            .min_by_key(|(id, _)| **id)
            .map(|(_, data)| data.clone())
    }

    fn require_context(&self, state: &HostState, call: &str) {
        if state.depth == 0 {
            self.tracker
                .violation(format!("{call} outside the graphics context"));
        }
    }
}

impl Host for FakeHost {
    type Texture = FakeTexture;
    type Effect = FakeEffect;

    fn frame_rate(&self) -> Option<FrameRate> {
        self.state.lock().frame_rate
    }

    fn enter_graphics(&self) {
        let mut state = self.state.lock();
        state.depth += 1;
        state.enters += 1;
    }

    fn leave_graphics(&self) {
        let mut state = self.state.lock();
        state.leaves += 1;

        match state.depth.checked_sub(1) {
            Some(depth) => state.depth = depth,
            None => self.tracker.violation("Graphics context left while not entered"),
        }
    }

    fn create_texture(&self, size: [u32; 2], format: PixelFormat) -> Option<FakeTexture> {
        let mut state = self.state.lock();
        self.require_context(&state, "create_texture");

        if state.fail_textures {
            return None;
        }

        let id = self.tracker.acquire(HandleKind::Texture);
        let len = size[0] as usize * size[1] as usize * format.bytes_per_pixel() as usize;
        state.textures.insert(id, vec![0; len]);

        Some(FakeTexture { id, size })
    }

    fn destroy_texture(&self, texture: FakeTexture) {
        let mut state = self.state.lock();
        self.require_context(&state, "destroy_texture");

        state.textures.remove(&texture.id);
        self.tracker.release(texture.id);
    }

    fn set_image(&self, texture: &FakeTexture, data: &[u8], linesize: u32) {
        let mut state = self.state.lock();
        self.require_context(&state, "set_image");

        let row_bytes = texture.size[0] as usize * 4;
        let linesize = linesize as usize;
        let height = texture.size[1] as usize;

        if linesize < row_bytes || data.len() < linesize * height.saturating_sub(1) + row_bytes {
            self.tracker.violation(format!(
                "set_image with {} bytes at linesize {linesize} for a {}x{} texture",
                data.len(),
                texture.size[0],
                texture.size[1]
            ));
            return;
        }

        let Some(contents) = state.textures.get_mut(&texture.id) else {
            self.tracker
                .violation(format!("set_image on dead texture {}", texture.id));
            return;
        };

        for (y, row) in contents.chunks_exact_mut(row_bytes.max(1)).enumerate() {
            let start = y * linesize;
            row.copy_from_slice(&data[start..start + row_bytes]);
        }

        state.uploads += 1;
    }

    fn bind_image(&self, _effect: &FakeEffect, texture: &FakeTexture) {
        if !self.tracker.is_live(texture.id) {
            self.tracker
                .violation(format!("bind_image on dead texture {}", texture.id));
        }

        self.state.lock().binds += 1;
    }

    fn draw_sprite(&self, _texture: &FakeTexture, size: [u32; 2]) {
        self.state.lock().draws.push(size);
    }
}
