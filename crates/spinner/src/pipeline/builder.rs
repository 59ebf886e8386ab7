use crate::{
    algorithms::{
        AdaptiveThresholdPreprocessor, BoundaryTracer, CatmullRomSmoother,
        CornerRoundingSmoother, DouglasPeuckerSimplifier, ThresholdPreprocessor,
    },
    config::{ConversionMode, VectorizeOptions},
    pipeline::Pipeline,
    traits::{BitmapPreprocessor, ContourTracer, PathSimplifier, PathSmoother},
};

/// Tolerance used when none is given.
pub const DEFAULT_TOLERANCE: f64 = 1.0;

/// Builder for creating processing pipelines with a fluent API
pub struct PipelineBuilder {
    preprocessor: Option<Box<dyn BitmapPreprocessor>>,
    tracer: Option<Box<dyn ContourTracer>>,
    simplifier: Option<Box<dyn PathSimplifier>>,
    smoother: Option<Box<dyn PathSmoother>>,
    tolerance: f64,
    denoise_sigma: Option<f32>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            preprocessor: None,
            tracer: None,
            simplifier: None,
            smoother: None,
            tolerance: DEFAULT_TOLERANCE,
            denoise_sigma: None,
        }
    }

    /// Set the preprocessor (replaces any existing one)
    pub fn set_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: BitmapPreprocessor + 'static,
    {
        self.preprocessor = Some(Box::new(preprocessor));
        self
    }

    /// Set the contour tracer (replaces any existing one)
    pub fn set_tracer<T>(mut self, tracer: T) -> Self
    where
        T: ContourTracer + 'static,
    {
        self.tracer = Some(Box::new(tracer));
        self
    }

    /// Set the simplifier (replaces any existing one)
    pub fn set_simplifier<S>(mut self, simplifier: S) -> Self
    where
        S: PathSimplifier + 'static,
    {
        self.simplifier = Some(Box::new(simplifier));
        self
    }

    /// Set the smoother (replaces any existing one)
    pub fn set_smoother<S>(mut self, smoother: S) -> Self
    where
        S: PathSmoother + 'static,
    {
        self.smoother = Some(Box::new(smoother));
        self
    }

    /// Simplification tolerance in pixels; zero keeps every traced point
    pub fn with_simplification(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Blur frames before thresholding
    pub fn with_denoise(mut self, sigma: f32) -> Self {
        self.denoise_sigma = Some(sigma);
        self
    }

    /// Preset for a conversion mode; both modes share one pipeline shape
    pub fn from_options(options: &VectorizeOptions) -> Self {
        let builder = match options.mode {
            ConversionMode::Simple => Self::new()
                .set_preprocessor(ThresholdPreprocessor {
                    threshold: options.threshold,
                })
                .set_smoother(CornerRoundingSmoother {
                    strength: options.smoothing,
                    ..Default::default()
                }),
            ConversionMode::Advanced => Self::new()
                .set_preprocessor(AdaptiveThresholdPreprocessor {
                    detail_level: options.detail_level,
                })
                .set_smoother(CatmullRomSmoother {
                    strength: options.smoothing,
                }),
        }
        .with_simplification(options.tolerance);

        match options.denoise_sigma {
            Some(sigma) => builder.with_denoise(sigma),
            None => builder,
        }
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        Pipeline::new(
            self.preprocessor
                .unwrap_or_else(|| Box::new(ThresholdPreprocessor::default())),
            self.tracer
                .unwrap_or_else(|| Box::new(BoundaryTracer::default())),
            self.simplifier
                .unwrap_or_else(|| Box::new(DouglasPeuckerSimplifier)),
            self.smoother
                .unwrap_or_else(|| Box::new(CornerRoundingSmoother::default())),
            self.tolerance,
            self.denoise_sigma,
        )
    }

    /// Build a global-threshold pipeline
    pub fn build_simple(threshold: u8, tolerance: f64, smoothing: f64) -> Pipeline {
        Self::from_options(&VectorizeOptions {
            threshold,
            tolerance,
            smoothing,
            ..VectorizeOptions::simple()
        })
        .build()
    }

    /// Build an adaptive-threshold pipeline with spline smoothing
    pub fn build_advanced(detail_level: u8, tolerance: f64, smoothing: f64) -> Pipeline {
        Self::from_options(&VectorizeOptions {
            detail_level,
            tolerance,
            smoothing,
            ..VectorizeOptions::advanced()
        })
        .build()
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixelBuffer;
    use image::{Rgba, RgbaImage};
    use imageproc::{drawing::draw_filled_rect_mut, rect::Rect};

    fn square_buffer() -> PixelBuffer {
        let mut image = RgbaImage::from_pixel(20, 20, Rgba([250, 250, 250, 255]));
        draw_filled_rect_mut(&mut image, Rect::at(5, 5).of_size(8, 8), Rgba([10, 10, 10, 255]));
        PixelBuffer::from_image(image).unwrap()
    }

    #[test]
    fn custom_stages_are_used() {
        let pipeline = Pipeline::builder()
            .set_preprocessor(ThresholdPreprocessor { threshold: 5 })
            .build();
        let frame = pipeline.process(&square_buffer()).unwrap();
        assert!(frame.is_empty(), "threshold below the ink level finds nothing");
    }

    #[test]
    fn zero_tolerance_and_strength_keep_the_raw_trace() {
        let pipeline = PipelineBuilder::build_simple(128, 0.0, 0.0);
        let frame = pipeline.process(&square_buffer()).unwrap();

        assert_eq!(frame.paths.len(), 1);
        // 8x8 square boundary has 28 pixels
        assert_eq!(frame.paths[0].anchor_points().len(), 28);
        assert_eq!(frame.paths[0].curve_count(), 0);
    }

    #[test]
    fn advanced_builder_uses_splines() {
        let pipeline = PipelineBuilder::build_advanced(8, 0.5, 4.0);
        let frame = pipeline.process(&square_buffer()).unwrap();
        assert!(!frame.paths.is_empty());
        assert!(frame.paths[0].curve_count() > 0);
    }

    #[test]
    fn denoise_keeps_the_shape() {
        let pipeline = Pipeline::builder().with_denoise(1.0).build();
        let frame = pipeline.process(&square_buffer()).unwrap();
        assert_eq!(frame.paths.len(), 1);
        assert!(pipeline.info().contains("sigma 1"));
    }
}
