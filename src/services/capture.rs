use crate::error::AppError;
use crate::models::session_types::EncodedImage;
use crate::services::image_payload;
use std::path::Path;
use tracing::{debug, warn};

/// Upload path: read an image file and encode it as a data URI.
pub fn read_image_file(path: &Path) -> Result<EncodedImage, AppError> {
    let bytes = std::fs::read(path).map_err(|e| {
        AppError::Capture(format!("Could not read image {}: {}", path.display(), e))
    })?;
    let uri = image_payload::to_data_uri(&bytes).map_err(|e| {
        AppError::Capture(format!("{} is not a supported image: {}", path.display(), e))
    })?;
    Ok(EncodedImage::new(uri))
}

/// Camera-like source. `open` acquires the device, `release` stops every track.
pub trait MediaDevice {
    fn open(&mut self) -> Result<(), AppError>;
    /// One encoded still frame (JPEG, PNG or WebP bytes).
    fn grab_frame(&mut self) -> Result<Vec<u8>, AppError>;
    fn release(&mut self);
}

/// Holds an open device and releases it when dropped, whatever the exit path.
pub struct CaptureSession<'a, D: MediaDevice + ?Sized> {
    device: &'a mut D,
}

impl<'a, D: MediaDevice + ?Sized> CaptureSession<'a, D> {
    pub fn start(device: &'a mut D) -> Result<Self, AppError> {
        device.open().map_err(|e| {
            warn!(error = %e, "camera access denied");
            AppError::Capture("Could not access camera. Please allow camera permissions.".to_string())
        })?;
        debug!("capture session started");
        Ok(Self { device })
    }

    pub fn grab_frame(&mut self) -> Result<Vec<u8>, AppError> {
        self.device.grab_frame()
    }
}

impl<D: MediaDevice + ?Sized> Drop for CaptureSession<'_, D> {
    fn drop(&mut self) {
        self.device.release();
        debug!("capture session released");
    }
}

/// Capture path: open the device, take one still, release the device.
pub fn capture_still<D: MediaDevice + ?Sized>(device: &mut D) -> Result<EncodedImage, AppError> {
    let mut session = CaptureSession::start(device)?;
    let frame = session.grab_frame()?;
    drop(session);

    let uri = image_payload::to_data_uri(&frame)
        .map_err(|e| AppError::Capture(format!("Camera produced an unusable frame: {}", e)))?;
    Ok(EncodedImage::new(uri))
}
