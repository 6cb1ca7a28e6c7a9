use crate::{
    CaptureRuntime, CaptureSession, DeviceHandles, FrameInfo, GrabError, GrabParams,
    GraphicsBackend, GraphicsContext, Host, TexturePublisher,
};

/// Grab the latest frame into the capture surface, read it back through the staging surface and
/// upload it into the published texture.
///
/// Stops at the first failing step, the texture keeps the previous frame.
pub(super) fn grab_frame<H, G, R>(
    host: &H,
    graphics: &G,
    runtime: &R,
    handles: &DeviceHandles<G>,
    session: &mut CaptureSession<G, R>,
    publisher: &TexturePublisher<H>,
    params: &GrabParams,
) -> Result<FrameInfo, GrabError>
where
    H: Host,
    G: GraphicsBackend,
    R: CaptureRuntime<G>,
{
    let (Some(device), Some(capture_surface), Some(staging_surface)) = (
        handles.device(),
        handles.capture_surface(),
        handles.staging_surface(),
    ) else {
        return Err(GrabError::NotConfigured);
    };

    let info = session.grab(runtime, params)?;

    let context = GraphicsContext::enter(host);

    graphics
        .copy_render_target_data(device, capture_surface, staging_surface)
        .map_err(GrabError::Readback)?;

    let mapped = graphics.map_read(staging_surface).map_err(GrabError::Map)?;
    let uploaded = publisher.upload(&context, mapped);
    graphics.unmap(staging_surface);
    uploaded?;

    Ok(info)
}
