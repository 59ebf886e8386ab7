//! Circular arrangement of vectorized frames.

pub mod bearing;
pub mod outline;

use geo::AffineTransform;
use geo_types::Coord;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::{LayoutSpec, OutlineStyle},
    error::{Result, SpinnerError},
    types::{Frame, VectorPath},
};

pub use bearing::{BearingPart, BearingRole};

/// Share of the chord between neighbouring slots a frame may occupy.
pub const FRAME_FILL: f64 = 0.9;

/// Where one slot sits on the placement circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramePlacement {
    pub slot: usize,
    pub angle_degrees: f64,
    /// Distance of `position` from the design centre
    pub radius: f64,
    /// Uniform scale applied to the source frame
    pub scale: f64,
    pub position: Coord<f64>,
}

/// A source frame copied into one slot, together with its local transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedFrame {
    pub source_index: usize,
    /// Point of the source frame that lands on `placement.position`
    pub pivot: Coord<f64>,
    pub placement: FramePlacement,
    /// Paths in source pixel coordinates
    pub paths: Vec<VectorPath>,
}

impl PlacedFrame {
    /// Recentre on the pivot, scale, rotate by the slot angle, move to the slot.
    pub fn affine(&self) -> AffineTransform<f64> {
        let FramePlacement {
            angle_degrees,
            scale,
            position,
            ..
        } = self.placement;
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        let (a, b) = (scale * cos, -scale * sin);
        let (d, e) = (scale * sin, scale * cos);
        let xoff = position.x - a * self.pivot.x - b * self.pivot.y;
        let yoff = position.y - d * self.pivot.x - e * self.pivot.y;
        AffineTransform::new(a, b, xoff, d, e, yoff)
    }

    /// Paths in design coordinates.
    pub fn transformed_paths(&self) -> Vec<VectorPath> {
        let transform = self.affine();
        self.paths.iter().map(|p| p.transformed(&transform)).collect()
    }
}

/// Finished layout handed to exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinnerDesign {
    /// Width and height of the square canvas
    pub size: f64,
    pub center: Coord<f64>,
    pub placement_radius: f64,
    pub outline: VectorPath,
    /// Style actually drawn, which may differ from the requested one
    pub outline_style: OutlineStyle,
    pub outline_thickness: f64,
    pub extrusion_thickness: f64,
    pub frames: Vec<PlacedFrame>,
    pub bearing: Vec<BearingPart>,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutEngine;

impl LayoutEngine {
    pub fn layout(&self, frames: &[Frame], spec: &LayoutSpec) -> Result<SpinnerDesign> {
        if frames.is_empty() {
            return Err(SpinnerError::input("at least one frame is required for a layout"));
        }
        if let Some((index, frame)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.width == 0 || f.height == 0)
        {
            return Err(SpinnerError::input(format!(
                "frame {index} has zero area ({}x{})",
                frame.width, frame.height
            )));
        }
        spec.validate()?;

        let center = Coord {
            x: spec.diameter / 2.0,
            y: spec.diameter / 2.0,
        };
        let radius = spec.placement_radius();
        let nominal = frames.iter().map(Frame::nominal_size).max().unwrap_or(1);
        let placements = Self::placements(spec, center, f64::from(nominal));

        let placed: Vec<PlacedFrame> = placements
            .iter()
            .map(|placement| {
                let source_index = placement.slot % frames.len();
                let frame = &frames[source_index];
                PlacedFrame {
                    source_index,
                    pivot: frame.pivot(),
                    placement: *placement,
                    paths: frame.paths.clone(),
                }
            })
            .collect();

        let outline_style = outline::effective_style(spec.outline_style, placements.len());
        if outline_style != spec.outline_style {
            debug!(
                requested = %spec.outline_style,
                slots = placements.len(),
                "too few slots for a shaped outline, drawing a circle"
            );
        }

        debug!(slots = placed.len(), sources = frames.len(), radius, "laid out spinner");
        Ok(SpinnerDesign {
            size: spec.diameter,
            center,
            placement_radius: radius,
            outline: outline::build_outline(outline_style, center, &placements),
            outline_style,
            outline_thickness: spec.outline_thickness,
            extrusion_thickness: spec.extrusion_thickness,
            frames: placed,
            bearing: bearing::build_bearing(spec.bearing_style, center, spec.bearing_diameter),
        })
    }

    /// Slots at equal angular steps from angle 0, scaled so neighbours do not
    /// overlap. `nominal_size` is the source frame extent the scale maps from.
    pub fn placements(spec: &LayoutSpec, center: Coord<f64>, nominal_size: f64) -> Vec<FramePlacement> {
        let n = spec.frame_count;
        let radius = spec.placement_radius();
        let chord = if n >= 2 {
            2.0 * radius * (std::f64::consts::PI / n as f64).sin()
        } else {
            radius
        };
        let scale = chord * FRAME_FILL / nominal_size.max(1.0);

        (0..n)
            .map(|slot| {
                let angle_degrees = slot as f64 * spec.angular_step();
                let (sin, cos) = angle_degrees.to_radians().sin_cos();
                FramePlacement {
                    slot,
                    angle_degrees,
                    radius,
                    scale,
                    position: Coord {
                        x: center.x + radius * cos,
                        y: center.y + radius * sin,
                    },
                }
            })
            .collect()
    }
}

/// Lay out `frames` according to `spec`.
pub fn layout_spinner(frames: &[Frame], spec: &LayoutSpec) -> Result<SpinnerDesign> {
    LayoutEngine.layout(frames, spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BearingStyle;

    fn square_frame(x0: f64, y0: f64, side: f64, raster: u32) -> Frame {
        let mut builder = VectorPath::builder();
        builder
            .move_to(Coord { x: x0, y: y0 })
            .line_to(Coord { x: x0 + side, y: y0 })
            .line_to(Coord { x: x0 + side, y: y0 + side })
            .line_to(Coord { x: x0, y: y0 + side })
            .close();
        Frame::new(vec![builder.build()], raster, raster)
    }

    fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
        (a - b).x.hypot((a - b).y)
    }

    #[test]
    fn empty_frame_list_is_an_input_error() {
        let err = layout_spinner(&[], &LayoutSpec::default()).unwrap_err();
        assert!(matches!(err, SpinnerError::Input { .. }));
    }

    #[test]
    fn zero_area_frame_is_an_input_error() {
        let frames = [Frame::new(vec![], 0, 10)];
        let err = layout_spinner(&frames, &LayoutSpec::default()).unwrap_err();
        assert!(matches!(err, SpinnerError::Input { .. }));
    }

    #[test]
    fn infeasible_spec_is_a_layout_error() {
        let spec = LayoutSpec {
            diameter: 100.0,
            spacing: 10.0,
            bearing_diameter: 80.0,
            ..Default::default()
        };
        let err = layout_spinner(&[square_frame(0.0, 0.0, 10.0, 10)], &spec).unwrap_err();
        assert!(matches!(err, SpinnerError::Layout { .. }));
    }

    #[test]
    fn slots_are_evenly_spaced_on_one_circle() {
        let spec = LayoutSpec {
            frame_count: 8,
            ..Default::default()
        };
        let design = layout_spinner(&[square_frame(0.0, 0.0, 10.0, 10)], &spec).unwrap();

        assert_eq!(design.placement_radius, 34.0);
        assert_eq!(design.frames.len(), 8);
        for (i, frame) in design.frames.iter().enumerate() {
            let placement = frame.placement;
            assert!((placement.angle_degrees - 45.0 * i as f64).abs() < 1e-9);
            assert!((distance(placement.position, design.center) - 34.0).abs() < 1e-9);
            assert_eq!(placement.scale, design.frames[0].placement.scale);
        }
        assert_eq!(design.frames[1].placement.angle_degrees, 45.0);
    }

    #[test]
    fn scale_follows_the_slot_chord() {
        let spec = LayoutSpec {
            frame_count: 8,
            ..Default::default()
        };
        let design = layout_spinner(&[square_frame(0.0, 0.0, 50.0, 100)], &spec).unwrap();
        let chord = 2.0 * 34.0 * (std::f64::consts::PI / 8.0).sin();
        assert!((design.frames[0].placement.scale - chord * FRAME_FILL / 100.0).abs() < 1e-12);
    }

    #[test]
    fn frames_cycle_when_slots_outnumber_sources() {
        let frames = [
            square_frame(0.0, 0.0, 4.0, 8),
            square_frame(2.0, 2.0, 4.0, 8),
        ];
        let spec = LayoutSpec {
            frame_count: 5,
            ..Default::default()
        };
        let design = layout_spinner(&frames, &spec).unwrap();
        let sources: Vec<usize> = design.frames.iter().map(|f| f.source_index).collect();
        assert_eq!(sources, vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn frames_pivot_on_their_own_centre() {
        let spec = LayoutSpec {
            frame_count: 6,
            ..Default::default()
        };
        let design = layout_spinner(&[square_frame(30.0, 10.0, 20.0, 64)], &spec).unwrap();

        for placed in &design.frames {
            assert_eq!(placed.pivot, Coord { x: 40.0, y: 20.0 });
            let moved = &placed.transformed_paths()[0];
            let center = moved.bounding_rect().unwrap().center();
            assert!(distance(center, placed.placement.position) < 1e-9);
        }
    }

    #[test]
    fn transform_scales_and_rotates() {
        let spec = LayoutSpec {
            frame_count: 4,
            ..Default::default()
        };
        let design = layout_spinner(&[square_frame(0.0, 0.0, 10.0, 10)], &spec).unwrap();
        let quarter = &design.frames[1];
        let corner = quarter.affine().apply(Coord { x: 10.0, y: 5.0 });
        let expected = Coord {
            x: quarter.placement.position.x,
            y: quarter.placement.position.y + 5.0 * quarter.placement.scale,
        };
        assert!(distance(corner, expected) < 1e-9);
    }

    #[test]
    fn small_slot_counts_force_a_circular_outline() {
        let spec = LayoutSpec {
            frame_count: 2,
            outline_style: OutlineStyle::Hull,
            ..Default::default()
        };
        let design = layout_spinner(&[square_frame(0.0, 0.0, 10.0, 10)], &spec).unwrap();
        assert_eq!(design.outline_style, OutlineStyle::Circular);
        assert_eq!(design.outline.curve_count(), 4);
    }

    #[test]
    fn design_carries_bearing_and_thicknesses() {
        let spec = LayoutSpec {
            bearing_style: BearingStyle::Detailed,
            outline_thickness: 1.5,
            extrusion_thickness: 4.0,
            ..Default::default()
        };
        let design = layout_spinner(&[square_frame(0.0, 0.0, 10.0, 10)], &spec).unwrap();
        assert_eq!(design.bearing.len(), 12);
        assert!(design.bearing.iter().all(|p| distance(p.center, design.center) < 22.0 / 2.0));
        assert_eq!(design.outline_thickness, 1.5);
        assert_eq!(design.extrusion_thickness, 4.0);
        assert_eq!(design.size, 100.0);
    }

    #[test]
    fn empty_frames_are_still_placed() {
        let design = layout_spinner(&[Frame::new(vec![], 32, 16)], &LayoutSpec::default()).unwrap();
        assert_eq!(design.frames.len(), 8);
        assert!(design.frames.iter().all(|f| f.paths.is_empty()));
        assert_eq!(design.frames[0].pivot, Coord { x: 16.0, y: 8.0 });
    }
}
