use derive_more::Display;

pub type Result<T> = core::result::Result<T, IsosurfaceError>;

#[derive(Debug, Display, Clone, Copy, PartialEq)]
pub enum IsosurfaceError {
    /// Cube size must be finite and strictly positive.
    #[display("invalid cube size {_0}, expected a finite value > 0")]
    InvalidCubeSize(f32),
    /// Blending function index at or past
    /// [`BlendingFunction::NONE`](crate::field::BlendingFunction::NONE).
    #[display("invalid blending function index {_0}")]
    InvalidBlend(u8),
    /// `update` was called before a successful `build`.
    #[display("isosurface has not been built yet")]
    NotConfigured,
}

impl std::error::Error for IsosurfaceError {}
