use tracing::info;

use crate::{CaptureRuntime, GraphicsBackend, GraphicsContext, Host};

use super::CaptureContext;

impl<H, G, R> CaptureContext<H, G, R>
where
    H: Host,
    G: GraphicsBackend,
    R: CaptureRuntime<G>,
{
    /// Release the capture session, the published texture, the surfaces, then the device.
    ///
    /// Only what was acquired is released, calling this again does nothing.
    pub fn destroy(&mut self) {
        if !self.is_live() {
            return;
        }

        info!("Destroying source instance");

        self.session.close(&self.runtime);

        if self.publisher.is_live() {
            let context = GraphicsContext::enter(&self.host);
            self.publisher.destroy(&context);
        }

        self.handles.release(&self.graphics);

        info!("Source instance destroyed");
    }

    /// If any resource is still held.
    pub fn is_live(&self) -> bool {
        self.session.is_live() || self.publisher.is_live() || self.handles.is_live()
    }
}

impl<H, G, R> Drop for CaptureContext<H, G, R>
where
    H: Host,
    G: GraphicsBackend,
    R: CaptureRuntime<G>,
{
    fn drop(&mut self) {
        self.destroy();
    }
}
