//! Processing options

/// How a source image is fitted to the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalingMethod {
    /// Keep aspect ratio, center on a white background
    #[default]
    Letterbox,
    /// Keep aspect ratio, fill the panel and crop the overflow
    CropCenter,
    /// Ignore aspect ratio
    Stretch,
}

/// Grayscale to 1-bit conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DitheringMethod {
    /// Plain threshold
    None,
    /// Plain threshold (alias kept for callers that name it explicitly)
    Simple,
    /// Floyd-Steinberg error diffusion
    #[default]
    FloydSteinberg,
    /// Three-row Sierra
    Sierra,
    /// Two-row Sierra
    Sierra2Row,
    /// Sierra Lite
    SierraLite,
}

/// Clockwise rotation applied after flips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    /// No rotation
    #[default]
    None,
    /// 90 degrees clockwise
    Rotate90,
    /// 180 degrees
    Rotate180,
    /// 270 degrees clockwise
    Rotate270,
}

/// Everything that affects the packed output for a given source image.
///
/// Two equal option values always produce the same bytes, which is what
/// makes them usable as part of a cache key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProcessingOptions {
    /// Fit mode
    pub scaling: ScalingMethod,
    /// 1-bit conversion
    pub dithering: DitheringMethod,
    /// Rotation after flips
    pub rotation: Rotation,
    /// Mirror left-right before rotating
    pub flip_horizontal: bool,
    /// Mirror top-bottom before rotating
    pub flip_vertical: bool,
    /// Crop X offset in the scaled image (`CropCenter` only, clamped)
    pub crop_x: Option<u32>,
    /// Crop Y offset in the scaled image (`CropCenter` only, clamped)
    pub crop_y: Option<u32>,
    /// Invert grayscale before dithering
    pub invert: bool,
}

impl ProcessingOptions {
    /// Set the scaling method.
    #[must_use]
    pub fn with_scaling(mut self, scaling: ScalingMethod) -> Self {
        self.scaling = scaling;
        self
    }

    /// Set the dithering method.
    #[must_use]
    pub fn with_dithering(mut self, dithering: DitheringMethod) -> Self {
        self.dithering = dithering;
        self
    }

    /// Set the rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set both flips.
    #[must_use]
    pub fn with_flips(mut self, horizontal: bool, vertical: bool) -> Self {
        self.flip_horizontal = horizontal;
        self.flip_vertical = vertical;
        self
    }

    /// Set an explicit crop origin for `CropCenter`.
    #[must_use]
    pub fn with_crop(mut self, x: Option<u32>, y: Option<u32>) -> Self {
        self.crop_x = x;
        self.crop_y = y;
        self
    }

    /// Enable or disable inversion.
    #[must_use]
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }
}
