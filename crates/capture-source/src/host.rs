//! The host compositor a capture source publishes into.
//!

use crate::PixelFormat;

/// The host's configured output frame rate as `numerator / denominator` frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    /// Frames.
    pub numerator: u32,

    /// Per this many seconds.
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Frames per second, `None` if either part is zero.
    pub fn fps(self) -> Option<f64> {
        if self.numerator == 0 || self.denominator == 0 {
            return None;
        }

        Some(f64::from(self.numerator) / f64::from(self.denominator))
    }
}

/// The host application's rendering primitives.
///
/// Texture creation, destruction and uploads must happen inside the host's graphics context, see
/// [`GraphicsContext`].
pub trait Host {
    /// A host texture handle.
    type Texture;

    /// The effect a render pass draws with.
    type Effect;

    /// The host's output frame rate, if known.
    fn frame_rate(&self) -> Option<FrameRate>;

    /// Enter the host's graphics context.
    fn enter_graphics(&self);

    /// Leave the host's graphics context.
    fn leave_graphics(&self);

    /// Create a dynamic texture, `None` on failure.
    fn create_texture(&self, size: [u32; 2], format: PixelFormat) -> Option<Self::Texture>;

    /// Destroy a texture.
    fn destroy_texture(&self, texture: Self::Texture);

    /// Replace a texture's contents with `data`, whose rows are `linesize` bytes apart.
    fn set_image(&self, texture: &Self::Texture, data: &[u8], linesize: u32);

    /// Bind `texture` to the effect's `image` parameter.
    fn bind_image(&self, effect: &Self::Effect, texture: &Self::Texture);

    /// Draw `texture` as a sprite of `size`.
    fn draw_sprite(&self, texture: &Self::Texture, size: [u32; 2]);
}

/// Holds the host's graphics context, left on drop.
pub struct GraphicsContext<'a, H: Host> {
    host: &'a H,
}

impl<'a, H: Host> GraphicsContext<'a, H> {
    /// Enter the host's graphics context.
    pub fn enter(host: &'a H) -> Self {
        host.enter_graphics();
        Self { host }
    }

    /// The host the context belongs to.
    pub fn host(&self) -> &'a H {
        self.host
    }
}

impl<H: Host> Drop for GraphicsContext<'_, H> {
    fn drop(&mut self) {
        self.host.leave_graphics();
    }
}

#[cfg(test)]
mod test {
    use super::FrameRate;

    #[test]
    fn fps() {
        assert_eq!(FrameRate::new(60, 1).fps(), Some(60.0));

        let ntsc = FrameRate::new(30000, 1001).fps().unwrap();
        assert!((ntsc - 29.97).abs() < 0.001);
    }

    #[test]
    fn zero_is_unknown() {
        assert_eq!(FrameRate::new(60, 0).fps(), None);
        assert_eq!(FrameRate::new(0, 1).fps(), None);
    }
}
