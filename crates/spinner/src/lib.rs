//! # Spinner Design Library
//!
//! Turns animation frames into vector outlines and arranges them around a
//! circle, producing a printable "spinner" design.
//!
//! ## Core Features
//!
//! - **Trait-based Architecture**: each conversion stage is a swappable trait object
//! - **Pipeline System**: threshold, trace, simplify and smooth in one call
//! - **Two Conversion Modes**: global threshold with rounded corners, or adaptive threshold with splines
//! - **Circular Layout**: evenly spaced frames, a choice of outlines and a centre bearing
//! - **JSON Export**: designs serialize to plain JSON for downstream renderers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spinner::{LayoutSpec, Pipeline, PixelBuffer, VectorizeOptions, layout_spinner};
//!
//! let image = image::open("frame.png")?.to_rgba8();
//! let buffer = PixelBuffer::from_image(image)?;
//!
//! let pipeline = Pipeline::from_options(&VectorizeOptions::simple())?;
//! let frame = pipeline.process(&buffer)?;
//!
//! let design = layout_spinner(&[frame], &LayoutSpec::default())?;
//! design.save_json("spinner.json")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use spinner::{Pipeline, algorithms::*};
//!
//! let pipeline = Pipeline::builder()
//!     .set_preprocessor(AdaptiveThresholdPreprocessor { detail_level: 7 })
//!     .set_smoother(CatmullRomSmoother { strength: 3.0 })
//!     .with_simplification(0.5)
//!     .build();
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod config;
pub mod layout;
pub mod pipeline;
pub mod io;

use std::sync::atomic::AtomicBool;

use tracing::debug;

// Re-exports for convenience
pub use error::{Result, SpinnerError};
pub use types::{Contour, Frame, OccupancyGrid, PathBuilder, PathCommand, PixelBuffer, VectorPath};
pub use traits::*;
pub use algorithms::*;
pub use config::{BearingStyle, ConversionMode, LayoutSpec, OutlineStyle, SpinnerSettings, VectorizeOptions};
pub use layout::{LayoutEngine, PlacedFrame, SpinnerDesign, layout_spinner};
pub use pipeline::{Pipeline, Progress, builder::PipelineBuilder};
pub use io::json::FrameSet;

/// Vectorize every buffer and lay the results out in one go.
///
/// Both halves of `settings` are validated before any frame is processed.
pub fn vectorize_and_layout(buffers: &[PixelBuffer], settings: &SpinnerSettings) -> Result<SpinnerDesign> {
    settings.validate()?;
    let pipeline = Pipeline::from_options(&settings.vectorize)?;
    let frames = pipeline.process_frames(
        buffers,
        |progress| debug!(completed = progress.completed, total = progress.total, "frame vectorized"),
        &AtomicBool::new(false),
    )?;
    layout_spinner(&frames, &settings.layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Coord;
    use image::{Rgba, RgbaImage};
    use imageproc::{drawing::draw_filled_rect_mut, rect::Rect};

    fn rectangle_buffer() -> PixelBuffer {
        let mut img = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        // covers pixels x in 2..=6, y in 3..=5
        draw_filled_rect_mut(&mut img, Rect::at(2, 3).of_size(5, 3), Rgba([0, 0, 0, 255]));
        PixelBuffer::from_image(img).unwrap()
    }

    /// Anchors where the outgoing direction differs from the incoming one.
    fn direction_changes(points: &[Coord<f64>]) -> Vec<(i32, i32)> {
        let n = points.len();
        let mut corners: Vec<(i32, i32)> = (0..n)
            .filter(|&i| {
                let prev = points[(i + n - 1) % n];
                let next = points[(i + 1) % n];
                let incoming = points[i] - prev;
                let outgoing = next - points[i];
                incoming.x * outgoing.y - incoming.y * outgoing.x != 0.0
            })
            .map(|i| (points[i].x as i32, points[i].y as i32))
            .collect();
        corners.sort();
        corners
    }

    #[test]
    fn unsimplified_rectangle_keeps_its_pixel_corners() {
        let pipeline = PipelineBuilder::build_simple(128, 0.0, 0.0);
        let frame = pipeline.process(&rectangle_buffer()).unwrap();

        assert_eq!(frame.paths.len(), 1);
        let path = &frame.paths[0];
        assert!(path.is_closed());
        assert_eq!(path.curve_count(), 0);
        assert_eq!(
            direction_changes(&path.anchor_points()),
            vec![(2, 3), (2, 5), (6, 3), (6, 5)]
        );
    }

    #[test]
    fn vectorize_and_layout_places_every_slot() {
        let settings = SpinnerSettings {
            layout: LayoutSpec {
                frame_count: 6,
                ..Default::default()
            },
            ..Default::default()
        };
        let buffers = vec![rectangle_buffer(), rectangle_buffer()];
        let design = vectorize_and_layout(&buffers, &settings).unwrap();

        assert_eq!(design.frames.len(), 6);
        assert!(design.frames.iter().all(|f| f.paths.len() == 1));
        assert_eq!(design.frames[5].source_index, 1);
    }

    #[test]
    fn invalid_layout_fails_before_vectorizing() {
        let settings = SpinnerSettings {
            layout: LayoutSpec {
                diameter: -1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = vectorize_and_layout(&[], &settings).unwrap_err();
        assert!(matches!(err, SpinnerError::Layout { .. }));
    }

    #[test]
    fn no_buffers_is_an_input_error() {
        let err = vectorize_and_layout(&[], &SpinnerSettings::default()).unwrap_err();
        assert!(matches!(err, SpinnerError::Input { .. }));
    }
}
