pub mod builder;

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::{
    algorithms::MIN_CONTOUR_POINTS,
    config::VectorizeOptions,
    error::{Result, SpinnerError},
    traits::{BitmapPreprocessor, ContourTracer, PathSimplifier, PathSmoother},
    types::{Frame, PixelBuffer},
};

/// Frames finished so far out of the batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Raster-to-vector conversion for single frames and batches
pub struct Pipeline {
    preprocessor: Box<dyn BitmapPreprocessor>,
    tracer: Box<dyn ContourTracer>,
    simplifier: Box<dyn PathSimplifier>,
    smoother: Box<dyn PathSmoother>,
    tolerance: f64,
    denoise_sigma: Option<f32>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Create a new pipeline with the given components
    pub fn new(
        preprocessor: Box<dyn BitmapPreprocessor>,
        tracer: Box<dyn ContourTracer>,
        simplifier: Box<dyn PathSimplifier>,
        smoother: Box<dyn PathSmoother>,
        tolerance: f64,
        denoise_sigma: Option<f32>,
    ) -> Self {
        Self {
            preprocessor,
            tracer,
            simplifier,
            smoother,
            tolerance,
            denoise_sigma,
        }
    }

    /// Validate `options` and build the preset for its conversion mode
    pub fn from_options(options: &VectorizeOptions) -> Result<Self> {
        options.validate()?;
        Ok(builder::PipelineBuilder::from_options(options).build())
    }

    /// Vectorize one frame
    pub fn process(&self, buffer: &PixelBuffer) -> Result<Frame> {
        let source = match self.denoise_sigma {
            Some(sigma) => Cow::Owned(buffer.blurred(sigma)),
            None => Cow::Borrowed(buffer),
        };

        let grid = self.preprocessor.preprocess(&source)?;
        let contours = self.tracer.trace(&grid);
        let traced = contours.len();

        let paths: Vec<_> = contours
            .iter()
            .map(|contour| self.simplifier.simplify(contour, self.tolerance))
            .filter(|contour| contour.len() >= MIN_CONTOUR_POINTS)
            .map(|contour| self.smoother.smooth(&contour))
            .filter(|path| !path.is_empty())
            .collect();

        debug!(
            width = buffer.width(),
            height = buffer.height(),
            foreground = grid.foreground_count(),
            traced,
            kept = paths.len(),
            "vectorized frame"
        );

        Ok(Frame::new(paths, buffer.width(), buffer.height()))
    }

    /// Vectorize every buffer in order.
    ///
    /// `cancel` is checked before each frame, and `on_progress` runs after
    /// each one.
    pub fn process_frames<F>(
        &self,
        buffers: &[PixelBuffer],
        mut on_progress: F,
        cancel: &AtomicBool,
    ) -> Result<Vec<Frame>>
    where
        F: FnMut(Progress),
    {
        if buffers.is_empty() {
            return Err(SpinnerError::input("no frames to vectorize"));
        }

        let total = buffers.len();
        let mut frames = Vec::with_capacity(total);
        for buffer in buffers {
            if cancel.load(Ordering::Relaxed) {
                return Err(SpinnerError::Cancelled {
                    completed: frames.len(),
                    total,
                });
            }
            frames.push(self.process(buffer)?);
            on_progress(Progress {
                completed: frames.len(),
                total,
            });
        }
        Ok(frames)
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: tolerance {}, denoise {}",
            self.tolerance,
            self.denoise_sigma
                .map_or_else(|| "off".to_string(), |sigma| format!("sigma {sigma}"))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionMode;
    use image::{Rgba, RgbaImage};
    use imageproc::{drawing::draw_filled_circle_mut, drawing::draw_filled_rect_mut, rect::Rect};

    fn blob_frame(shift: i32) -> PixelBuffer {
        let mut image = RgbaImage::from_pixel(48, 48, Rgba([255, 255, 255, 255]));
        draw_filled_circle_mut(&mut image, (16 + shift, 24), 8, Rgba([0, 0, 0, 255]));
        draw_filled_rect_mut(&mut image, Rect::at(34, 6).of_size(6, 10), Rgba([20, 20, 20, 255]));
        PixelBuffer::from_image(image).unwrap()
    }

    #[test]
    fn simple_preset_vectorizes_each_blob() {
        let pipeline = Pipeline::from_options(&VectorizeOptions::simple()).unwrap();
        let frame = pipeline.process(&blob_frame(0)).unwrap();

        assert_eq!((frame.width, frame.height), (48, 48));
        assert_eq!(frame.paths.len(), 2);
        assert!(frame.paths.iter().all(|p| p.is_closed()));
    }

    #[test]
    fn advanced_preset_emits_cubic_splines() {
        let options = VectorizeOptions {
            mode: ConversionMode::Advanced,
            detail_level: 3,
            ..VectorizeOptions::advanced()
        };
        let pipeline = Pipeline::from_options(&options).unwrap();
        let frame = pipeline.process(&blob_frame(0)).unwrap();

        assert!(!frame.paths.is_empty());
        assert!(frame.paths.iter().all(|p| p.curve_count() > 0));
    }

    #[test]
    fn blank_frame_produces_an_empty_frame() {
        let blank = PixelBuffer::from_image(RgbaImage::from_pixel(10, 10, Rgba([255; 4]))).unwrap();
        let frame = Pipeline::builder().build().process(&blank).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn batch_reports_real_progress() {
        let pipeline = Pipeline::builder().build();
        let buffers: Vec<PixelBuffer> = (0..3).map(blob_frame).collect();
        let mut seen = Vec::new();

        let frames = pipeline
            .process_frames(&buffers, |p| seen.push(p), &AtomicBool::new(false))
            .unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(
            seen.iter().map(|p| p.completed).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(seen[2].fraction(), 1.0);
    }

    #[test]
    fn cancellation_stops_between_frames() {
        let pipeline = Pipeline::builder().build();
        let buffers: Vec<PixelBuffer> = (0..4).map(blob_frame).collect();
        let cancel = AtomicBool::new(false);

        let err = pipeline
            .process_frames(&buffers, |_| cancel.store(true, Ordering::Relaxed), &cancel)
            .unwrap_err();

        assert!(matches!(
            err,
            SpinnerError::Cancelled {
                completed: 1,
                total: 4
            }
        ));
    }

    #[test]
    fn empty_batch_is_an_input_error() {
        let err = Pipeline::builder()
            .build()
            .process_frames(&[], |_| {}, &AtomicBool::new(false))
            .unwrap_err();
        assert!(matches!(err, SpinnerError::Input { .. }));
    }

    #[test]
    fn invalid_options_are_rejected_up_front() {
        let options = VectorizeOptions {
            tolerance: -1.0,
            ..Default::default()
        };
        assert!(Pipeline::from_options(&options).is_err());
    }
}
