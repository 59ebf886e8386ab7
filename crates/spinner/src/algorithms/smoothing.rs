use geo_types::Coord;

use crate::{
    traits::PathSmoother,
    types::{Contour, PathBuilder, VectorPath},
};

/// Upper end of the smoothing strength range.
pub const MAX_SMOOTHING: f64 = 10.0;

/// Corners whose edges are shorter than this stay sharp.
pub const DEFAULT_MIN_EDGE_LENGTH: f64 = 2.0;

fn length(v: Coord<f64>) -> f64 {
    v.x.hypot(v.y)
}

/// Closed polygon through the points, no curves.
pub fn polygon_path(points: &[Coord<f64>]) -> VectorPath {
    let mut builder = PathBuilder::default();
    let Some((first, rest)) = points.split_first() else {
        return builder.build();
    };
    builder.move_to(*first);
    for point in rest {
        builder.line_to(*point);
    }
    builder.close();
    builder.build()
}

/// Rounds corners with a quadratic whose radius follows `strength`.
///
/// On a closed contour the last vertex wraps around to the first, so every
/// corner but the seed is rounded. The seed stays sharp because the path
/// has to begin on it.
#[derive(Debug, Clone)]
pub struct CornerRoundingSmoother {
    pub strength: f64,
    pub min_edge_length: f64,
}

impl Default for CornerRoundingSmoother {
    fn default() -> Self {
        Self {
            strength: 2.0,
            min_edge_length: DEFAULT_MIN_EDGE_LENGTH,
        }
    }
}

impl CornerRoundingSmoother {
    fn corner(&self, builder: &mut PathBuilder, prev: Coord<f64>, corner: Coord<f64>, next: Coord<f64>) {
        let incoming = corner - prev;
        let outgoing = next - corner;
        let (len_in, len_out) = (length(incoming), length(outgoing));

        let too_short = len_in < self.min_edge_length || len_out < self.min_edge_length;
        if too_short || len_in <= f64::EPSILON || len_out <= f64::EPSILON {
            builder.line_to(corner);
            return;
        }

        let radius = self.strength.min(len_in / 2.0).min(len_out / 2.0);
        let entry = corner - incoming * (radius / len_in);
        let exit = corner + outgoing * (radius / len_out);
        builder.line_to(entry).quad_to(corner, exit);
    }
}

impl PathSmoother for CornerRoundingSmoother {
    fn smooth(&self, contour: &Contour) -> VectorPath {
        let points = contour.to_f64();
        let n = points.len();
        if self.strength <= 0.0 || n < 3 {
            return polygon_path(&points);
        }

        let mut builder = PathBuilder::default();
        builder.move_to(points[0]);
        for i in 1..n - 1 {
            self.corner(&mut builder, points[i - 1], points[i], points[i + 1]);
        }
        if contour.is_closed() {
            self.corner(&mut builder, points[n - 2], points[n - 1], points[0]);
        } else {
            builder.line_to(points[n - 1]);
        }
        builder.close();
        builder.build()
    }
}

/// Closed Catmull-Rom spline through every point, emitted as cubics.
///
/// The point list wraps around, so the curve has no seam at the start.
#[derive(Debug, Clone)]
pub struct CatmullRomSmoother {
    pub strength: f64,
}

impl Default for CatmullRomSmoother {
    fn default() -> Self {
        Self { strength: 5.0 }
    }
}

impl CatmullRomSmoother {
    /// Fraction of the neighbour chord used for the control handles.
    fn handle_scale(&self) -> f64 {
        let tension = (self.strength / MAX_SMOOTHING).min(1.0);
        tension / 6.0
    }
}

impl PathSmoother for CatmullRomSmoother {
    fn smooth(&self, contour: &Contour) -> VectorPath {
        let points = contour.to_f64();
        let n = points.len();
        if self.strength <= 0.0 || n < 3 {
            return polygon_path(&points);
        }

        let k = self.handle_scale();
        let mut builder = PathBuilder::default();
        builder.move_to(points[0]);
        for i in 0..n {
            let p0 = points[(i + n - 1) % n];
            let p1 = points[i];
            let p2 = points[(i + 1) % n];
            let p3 = points[(i + 2) % n];
            builder.cubic_to(p1 + (p2 - p0) * k, p2 - (p3 - p1) * k, p2);
        }
        builder.close();
        builder.build()
    }
}
