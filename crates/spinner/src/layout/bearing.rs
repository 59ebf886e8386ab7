//! Decorative hub drawn at the centre of the spinner.

use geo_types::Coord;
use serde::{Deserialize, Serialize};

use crate::{config::BearingStyle, types::VectorPath};

/// Balls in the detailed bearing.
pub const BALL_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BearingRole {
    /// Concentric ring outline
    Band,
    /// Rolling element marker
    Ball,
    /// Solid centre hole
    Hole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BearingPart {
    pub role: BearingRole,
    pub center: Coord<f64>,
    pub radius: f64,
    pub path: VectorPath,
}

impl BearingPart {
    fn circle(role: BearingRole, center: Coord<f64>, radius: f64) -> Self {
        Self {
            role,
            center,
            radius,
            path: VectorPath::circle(center, radius),
        }
    }
}

/// Bearing parts for a hub of `diameter`, outermost first.
pub fn build_bearing(style: BearingStyle, center: Coord<f64>, diameter: f64) -> Vec<BearingPart> {
    if diameter <= 0.0 {
        return Vec::new();
    }

    match style {
        BearingStyle::Plain => vec![
            BearingPart::circle(BearingRole::Band, center, diameter / 2.0),
            BearingPart::circle(BearingRole::Band, center, diameter / 4.0),
            BearingPart::circle(BearingRole::Hole, center, diameter / 8.0),
        ],
        BearingStyle::Detailed => {
            let mut parts = vec![
                BearingPart::circle(BearingRole::Band, center, diameter / 2.0),
                BearingPart::circle(BearingRole::Band, center, diameter / 2.2),
                BearingPart::circle(BearingRole::Band, center, diameter / 3.2),
            ];

            let track = diameter / 2.5;
            let ball_radius = diameter / 16.0;
            parts.extend((0..BALL_COUNT).map(|i| {
                let (sin, cos) = (i as f64 * std::f64::consts::TAU / BALL_COUNT as f64).sin_cos();
                let ball_center = Coord {
                    x: center.x + track * cos,
                    y: center.y + track * sin,
                };
                BearingPart::circle(BearingRole::Ball, ball_center, ball_radius)
            }));

            parts.push(BearingPart::circle(BearingRole::Hole, center, diameter / 6.0));
            parts
        }
    }
}
