use geo::EuclideanDistance;
use geo_types::{Coord, Line, Point};

use crate::{traits::PathSimplifier, types::Contour};

/// Recursive Douglas-Peucker reduction.
///
/// A tolerance of zero (or anything that is not a positive number) returns
/// the contour untouched.
#[derive(Debug, Clone, Default)]
pub struct DouglasPeuckerSimplifier;

impl PathSimplifier for DouglasPeuckerSimplifier {
    fn simplify(&self, contour: &Contour, tolerance: f64) -> Contour {
        if contour.len() <= 2 || tolerance.is_nan() || tolerance <= 0.0 {
            return contour.clone();
        }
        Contour::new(reduce(contour.points(), tolerance), contour.is_closed())
    }
}

fn to_point(coord: Coord<i32>) -> Point<f64> {
    Point::new(f64::from(coord.x), f64::from(coord.y))
}

fn reduce(points: &[Coord<i32>], tolerance: f64) -> Vec<Coord<i32>> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    let chord = Line::new(to_point(points[0]), to_point(points[n - 1]));
    let mut split = 0;
    let mut max_distance = 0.0;
    for (i, point) in points.iter().enumerate().take(n - 1).skip(1) {
        let distance = to_point(*point).euclidean_distance(&chord);
        // strict comparison keeps the first of equally distant points
        if distance > max_distance {
            max_distance = distance;
            split = i;
        }
    }

    if max_distance > tolerance {
        let mut kept = reduce(&points[..=split], tolerance);
        kept.pop();
        kept.extend(reduce(&points[split..], tolerance));
        kept
    } else {
        vec![points[0], points[n - 1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algorithms::BoundaryTracer, traits::ContourTracer, types::OccupancyGrid};

    fn disc_contour() -> Contour {
        let grid = OccupancyGrid::from_fn(40, 40, |x, y| {
            let dx = x as f64 - 20.0;
            let dy = y as f64 - 20.0;
            dx * dx + dy * dy <= 15.0 * 15.0
        });
        BoundaryTracer::default()
            .trace(&grid)
            .into_iter()
            .next()
            .expect("disc has a contour")
    }

    #[test]
    fn zero_tolerance_is_identity() {
        let contour = disc_contour();
        assert_eq!(DouglasPeuckerSimplifier.simplify(&contour, 0.0), contour);
    }

    #[test]
    fn short_contours_are_returned_unchanged() {
        let contour = Contour::from_points([(0, 0), (5, 5)]);
        assert_eq!(DouglasPeuckerSimplifier.simplify(&contour, 3.0), contour);
    }

    #[test]
    fn larger_tolerance_never_adds_points() {
        let contour = disc_contour();
        let counts: Vec<usize> = [0.0, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0]
            .into_iter()
            .map(|t| DouglasPeuckerSimplifier.simplify(&contour, t).len())
            .collect();

        assert!(counts.windows(2).all(|w| w[1] <= w[0]), "{counts:?}");
        assert!(counts[counts.len() - 1] < counts[0]);
    }

    #[test]
    fn straight_runs_collapse_to_corners() {
        let grid = OccupancyGrid::from_fn(8, 6, |x, y| x <= 4 && y <= 3);
        let contour = BoundaryTracer::default().trace(&grid).remove(0);
        let simplified = DouglasPeuckerSimplifier.simplify(&contour, 0.5);

        assert_eq!(
            simplified,
            Contour::from_points([(0, 0), (4, 0), (4, 3), (0, 3), (0, 1)])
        );
    }

    #[test]
    fn ties_split_at_first_occurrence() {
        let contour = Contour::from_points([(0, 0), (1, 1), (2, 1), (3, 0)]);
        let simplified = DouglasPeuckerSimplifier.simplify(&contour, 0.5);
        assert_eq!(simplified, Contour::from_points([(0, 0), (1, 1), (3, 0)]));
    }
}
