//! Outer rim of the spinner.

use geo_types::Coord;

use crate::{
    config::OutlineStyle,
    layout::FramePlacement,
    types::{PathBuilder, VectorPath},
};

/// Clearance between the outermost placement and a circular or rounded rim.
pub const OUTLINE_PADDING: f64 = 5.0;

/// Hull points sit this fraction of the largest placement radius further out.
pub const HULL_PADDING_RATIO: f64 = 0.25;

/// Waist points between slots sit at this fraction of the outer hull radius.
pub const HULL_WAIST_RATIO: f64 = 0.88;

/// Rounded and hull rims need at least a triangle of slots.
pub const MIN_SHAPED_SLOTS: usize = 3;

/// Style actually drawn for `slots` placements.
pub fn effective_style(requested: OutlineStyle, slots: usize) -> OutlineStyle {
    if slots < MIN_SHAPED_SLOTS {
        OutlineStyle::Circular
    } else {
        requested
    }
}

pub fn build_outline(style: OutlineStyle, center: Coord<f64>, placements: &[FramePlacement]) -> VectorPath {
    match effective_style(style, placements.len()) {
        OutlineStyle::Circular => circular(center, placements),
        OutlineStyle::Rounded => rounded(center, placements),
        OutlineStyle::Hull => hull(center, placements),
    }
}

fn polar(center: Coord<f64>, radius: f64, degrees: f64) -> Coord<f64> {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Coord {
        x: center.x + radius * cos,
        y: center.y + radius * sin,
    }
}

fn lerp(a: Coord<f64>, b: Coord<f64>, t: f64) -> Coord<f64> {
    a + (b - a) * t
}

fn circular(center: Coord<f64>, placements: &[FramePlacement]) -> VectorPath {
    let reach = placements
        .iter()
        .map(|p| (p.position - center).x.hypot((p.position - center).y))
        .fold(0.0, f64::max);
    VectorPath::circle(center, reach + OUTLINE_PADDING)
}

fn rounded(center: Coord<f64>, placements: &[FramePlacement]) -> VectorPath {
    let n = placements.len();
    let lobes: Vec<Coord<f64>> = placements
        .iter()
        .map(|p| polar(center, p.radius + OUTLINE_PADDING, p.angle_degrees))
        .collect();
    let midpoints: Vec<Coord<f64>> = (0..n)
        .map(|i| lerp(lobes[i], lobes[(i + 1) % n], 0.5))
        .collect();

    let mut builder = PathBuilder::default();
    builder.move_to(midpoints[n - 1]);
    for i in 0..n {
        let before = midpoints[(i + n - 1) % n];
        let after = midpoints[i];
        builder
            .line_to(lerp(before, lobes[i], 0.5))
            .quad_to(lobes[i], lerp(lobes[i], after, 0.5));
    }
    builder.close();
    builder.build()
}

fn hull(center: Coord<f64>, placements: &[FramePlacement]) -> VectorPath {
    let n = placements.len();
    let max_radius = placements.iter().map(|p| p.radius).fold(0.0, f64::max);
    let half_step = 180.0 / n as f64;

    let mut builder = PathBuilder::default();
    for (i, placement) in placements.iter().enumerate() {
        let outer_radius = placement.radius + max_radius * HULL_PADDING_RATIO;
        let outer = polar(center, outer_radius, placement.angle_degrees);
        let waist = polar(
            center,
            outer_radius * HULL_WAIST_RATIO,
            placement.angle_degrees + half_step,
        );
        if i == 0 {
            builder.move_to(outer);
        } else {
            builder.line_to(outer);
        }
        builder.line_to(waist);
    }
    builder.close();
    builder.build()
}
