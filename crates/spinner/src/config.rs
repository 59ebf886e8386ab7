use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::{
    algorithms::{MAX_DETAIL_LEVEL, MAX_SMOOTHING, MIN_DETAIL_LEVEL},
    error::{Result, SpinnerError},
};

/// Upper end of the simplification tolerance range, in pixels.
pub const MAX_TOLERANCE: f64 = 10.0;

#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConversionMode {
    /// Global threshold, corner rounding
    #[default]
    Simple,
    /// Adaptive threshold, Catmull-Rom spline fitting
    Advanced,
}

impl ConversionMode {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Simple => "Global luminance threshold with rounded polygon corners",
            Self::Advanced => "Local adaptive threshold with a closed cubic spline through every vertex",
        }
    }

    /// Names accepted on the command line and in config files
    pub fn names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }
}

#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BearingStyle {
    /// Two rings and a centre hole
    #[default]
    Plain,
    /// Three bands, a ring of balls and a centre hole
    Detailed,
}

#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutlineStyle {
    /// Single circle around every placement
    #[default]
    Circular,
    /// Lobed ring rounding off each slot
    Rounded,
    /// Star-shaped approximation of the convex hull
    #[serde(alias = "hull_like")]
    Hull,
}

impl OutlineStyle {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Circular => "Circle enclosing all frames",
            Self::Rounded => "Rounded lobes echoing frame placement",
            Self::Hull => "Star pattern alternating outer points and inner waists",
        }
    }
}

/// Per-frame raster-to-vector options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct VectorizeOptions {
    pub mode: ConversionMode,
    /// Global luminance threshold (simple mode)
    pub threshold: u8,
    /// Adaptive window detail (advanced mode), higher keeps finer features
    #[schemars(range(min = 1, max = 10))]
    pub detail_level: u8,
    /// Maximum deviation allowed when dropping points, in pixels
    #[schemars(range(min = 0.0, max = 10.0))]
    pub tolerance: f64,
    /// Corner radius (simple) or spline tension (advanced)
    #[schemars(range(min = 0.0, max = 10.0))]
    pub smoothing: f64,
    /// Optional Gaussian blur applied before thresholding
    pub denoise_sigma: Option<f32>,
}

impl Default for VectorizeOptions {
    fn default() -> Self {
        Self::simple()
    }
}

impl VectorizeOptions {
    pub fn simple() -> Self {
        Self {
            mode: ConversionMode::Simple,
            threshold: 128,
            detail_level: 5,
            tolerance: 1.0,
            smoothing: 2.0,
            denoise_sigma: None,
        }
    }

    pub fn advanced() -> Self {
        Self {
            mode: ConversionMode::Advanced,
            threshold: 128,
            detail_level: 6,
            tolerance: 0.5,
            smoothing: 5.0,
            denoise_sigma: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_DETAIL_LEVEL..=MAX_DETAIL_LEVEL).contains(&self.detail_level) {
            return Err(SpinnerError::invalid_option("detail_level", self.detail_level, "1..=10"));
        }
        if !self.tolerance.is_finite() || !(0.0..=MAX_TOLERANCE).contains(&self.tolerance) {
            return Err(SpinnerError::invalid_option("tolerance", self.tolerance, "0.0..=10.0"));
        }
        if !self.smoothing.is_finite() || !(0.0..=MAX_SMOOTHING).contains(&self.smoothing) {
            return Err(SpinnerError::invalid_option("smoothing", self.smoothing, "0.0..=10.0"));
        }
        if let Some(sigma) = self.denoise_sigma {
            if !sigma.is_finite() || sigma <= 0.0 {
                return Err(SpinnerError::invalid_option("denoise_sigma", sigma, "a positive number"));
            }
        }
        Ok(())
    }
}

/// Geometry of the circular arrangement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LayoutSpec {
    /// Overall diameter of the design
    pub diameter: f64,
    /// Number of slots around the circle; frames repeat when there are more slots than frames
    #[schemars(range(min = 1))]
    pub frame_count: usize,
    /// Gap kept between the placement circle and the rim
    pub spacing: f64,
    pub bearing_diameter: f64,
    pub bearing_style: BearingStyle,
    pub outline_thickness: f64,
    pub outline_style: OutlineStyle,
    /// Extrusion depth handed to 3-D exporters
    pub extrusion_thickness: f64,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            diameter: 100.0,
            frame_count: 8,
            spacing: 5.0,
            bearing_diameter: 22.0,
            bearing_style: BearingStyle::Plain,
            outline_thickness: 2.0,
            outline_style: OutlineStyle::Circular,
            extrusion_thickness: 3.0,
        }
    }
}

impl LayoutSpec {
    /// Distance from the centre at which frames are placed.
    pub fn placement_radius(&self) -> f64 {
        (self.diameter - self.bearing_diameter) / 2.0 - self.spacing
    }

    /// Angle between neighbouring slots, in degrees.
    pub fn angular_step(&self) -> f64 {
        360.0 / self.frame_count.max(1) as f64
    }

    pub fn validate(&self) -> Result<()> {
        let non_negative = |name: &'static str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(SpinnerError::layout(name, value, "must be a finite, non-negative number"))
            }
        };

        if !self.diameter.is_finite() || self.diameter <= 0.0 {
            return Err(SpinnerError::layout("diameter", self.diameter, "must be positive"));
        }
        if self.frame_count == 0 {
            return Err(SpinnerError::layout("frame_count", 0.0, "at least one slot is required"));
        }
        non_negative("spacing", self.spacing)?;
        non_negative("bearing_diameter", self.bearing_diameter)?;
        non_negative("outline_thickness", self.outline_thickness)?;
        non_negative("extrusion_thickness", self.extrusion_thickness)?;
        if self.bearing_diameter >= self.diameter {
            return Err(SpinnerError::layout(
                "bearing_diameter",
                self.bearing_diameter,
                "must be smaller than the overall diameter",
            ));
        }

        let radius = self.placement_radius();
        if radius <= 0.0 {
            return Err(SpinnerError::layout(
                "placement_radius",
                radius,
                "diameter leaves no room between bearing and spacing",
            ));
        }
        Ok(())
    }
}

/// Everything a caller configures for one vectorize-and-layout run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SpinnerSettings {
    pub vectorize: VectorizeOptions,
    pub layout: LayoutSpec,
}

impl SpinnerSettings {
    /// JSON schema of the settings document
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SpinnerSettings)
    }

    pub fn validate(&self) -> Result<()> {
        self.vectorize.validate()?;
        self.layout.validate()
    }
}
