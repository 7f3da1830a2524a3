use thiserror::Error;

/// Failure to load or validate the hall layout.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse hall layout: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid hall layout: {0}")]
    Invalid(String),
}

/// A media command that could not be issued.
///
/// Asynchronous rejections (a `play()` promise failing later) never surface
/// here; they are logged where the promise is awaited.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("media element has no usable source")]
    NoSource,
    #[error("media is not ready to play")]
    NotReady,
    #[error("media command rejected: {0}")]
    Rejected(String),
}

/// GPU setup failures.
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}
