//! The texture the host renders the capture from.
//!

use thiserror::Error;
use tracing::{debug, info};

use crate::{GrabError, GraphicsContext, Host, MappedSurface, PixelFormat};

/// Owns the published texture, the only surface the host renderer sees.
pub struct TexturePublisher<H: Host> {
    texture: Option<H::Texture>,
    size: [u32; 2],
}

impl<H: Host> TexturePublisher<H> {
    /// A publisher without a texture, renders nothing.
    pub fn empty(size: [u32; 2]) -> Self {
        Self {
            texture: None,
            size,
        }
    }

    /// Create the published BGRA texture of `size`.
    pub fn create(context: &GraphicsContext<'_, H>, size: [u32; 2]) -> Result<Self, TextureError> {
        let texture = context
            .host()
            .create_texture(size, PixelFormat::Bgra8)
            .ok_or(TextureError::Create(size))?;

        info!("Published texture created ({}x{})", size[0], size[1]);

        Ok(Self {
            texture: Some(texture),
            size,
        })
    }

    /// Replace the texture contents with a mapped staging surface.
    pub fn upload(
        &self,
        context: &GraphicsContext<'_, H>,
        mapped: MappedSurface<'_>,
    ) -> Result<(), GrabError> {
        let texture = self.texture.as_ref().ok_or(GrabError::NoTexture)?;
        context.host().set_image(texture, mapped.bytes, mapped.pitch);

        Ok(())
    }

    /// Bind the texture to `effect` and draw it full frame. Does nothing without a texture.
    pub fn render(&self, host: &H, effect: &H::Effect) {
        let Some(texture) = self.texture.as_ref() else {
            return;
        };

        host.bind_image(effect, texture);
        host.draw_sprite(texture, self.size);

        debug!("Rendered frame at {}x{}", self.size[0], self.size[1]);
    }

    /// Destroy the texture if it exists.
    pub fn destroy(&mut self, context: &GraphicsContext<'_, H>) {
        if let Some(texture) = self.texture.take() {
            context.host().destroy_texture(texture);
            info!("Published texture destroyed");
        }
    }

    /// If the texture exists.
    pub fn is_live(&self) -> bool {
        self.texture.is_some()
    }

    /// The size of the texture.
    pub fn size(&self) -> [u32; 2] {
        self.size
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TextureError {
    #[error("Failed to create {}x{} texture", .0[0], .0[1])]
    Create([u32; 2]),
}
