use crate::{
    error::Result,
    types::{Contour, OccupancyGrid, PixelBuffer, VectorPath},
};

/// Trait for turning raw pixels into a binary occupancy grid
pub trait BitmapPreprocessor: Send + Sync {
    /// Classify every pixel as foreground or background
    fn preprocess(&self, buffer: &PixelBuffer) -> Result<OccupancyGrid>;
}

/// Trait for boundary extraction on a binary grid
pub trait ContourTracer: Send + Sync {
    /// Trace one contour per connected foreground region, in discovery order
    fn trace(&self, grid: &OccupancyGrid) -> Vec<Contour>;
}

/// Trait for polyline reduction algorithms
pub trait PathSimplifier: Send + Sync {
    /// Reduce the point count while staying within `tolerance` of the input
    fn simplify(&self, contour: &Contour, tolerance: f64) -> Contour;
}

/// Trait for fitting a drawable path through a simplified contour
pub trait PathSmoother: Send + Sync {
    /// Produce a closed vector path through the contour points
    fn smooth(&self, contour: &Contour) -> VectorPath;
}
