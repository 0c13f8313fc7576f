use crate::{
    error::{IsosurfaceError, Result},
    field::BlendingFunction,
    interp::EdgeInterpolation,
    types::Value,
};

/// Extraction parameters.
///
/// ```rust
/// use bevy_isosurface::settings::IsosurfaceSettings;
///
/// let settings = IsosurfaceSettings::default()
///     .with_cube_size(0.2)
///     .with_target_value(0.8);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsosurfaceSettings {
    /// World-space edge length of one voxel. Should be smaller than the smallest node radius.
    pub cube_size: Value,
    /// Kernel used to blend skeleton nodes.
    pub blend: BlendingFunction,
    /// Iso-surface threshold: corners with a potential `<=` this value are "inside".
    pub target_value: Value,
    /// How edge crossings are placed between two corners.
    pub interpolation: EdgeInterpolation,
}

impl Default for IsosurfaceSettings {
    fn default() -> Self {
        Self {
            cube_size: 0.1,
            blend: BlendingFunction::Spore,
            target_value: 0.5,
            interpolation: EdgeInterpolation::Linear,
        }
    }
}

impl IsosurfaceSettings {
    pub fn new(cube_size: Value, blend: BlendingFunction, target_value: Value) -> Self {
        Self {
            cube_size,
            blend,
            target_value,
            ..Default::default()
        }
    }

    /// Sets the world-space size of each voxel edge.
    pub fn with_cube_size(mut self, cube_size: Value) -> Self {
        self.cube_size = cube_size;
        self
    }

    pub fn with_blend(mut self, blend: BlendingFunction) -> Self {
        self.blend = blend;
        self
    }

    /// Sets the iso-surface threshold.
    pub fn with_target_value(mut self, target_value: Value) -> Self {
        self.target_value = target_value;
        self
    }

    pub fn with_interpolation(mut self, interpolation: EdgeInterpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Returns [`IsosurfaceError::InvalidCubeSize`] unless the cube size is finite and positive.
    pub fn validate(&self) -> Result<()> {
        if !self.cube_size.is_finite() || self.cube_size <= 0.0 {
            return Err(IsosurfaceError::InvalidCubeSize(self.cube_size));
        }
        Ok(())
    }
}
