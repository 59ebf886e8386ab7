use std::collections::{HashSet, VecDeque};

use geo_types::Coord;
use tracing::{debug, warn};

use crate::{
    traits::ContourTracer,
    types::{Contour, OccupancyGrid},
};

/// Contours shorter than this are noise.
pub const MIN_CONTOUR_POINTS: usize = 3;

/// Compass headings in clockwise order (y grows downwards): E, S, W, N.
const HEADINGS: [(i64, i64); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Turn offsets tried at every step: left, straight, right, back.
const SEARCH_ORDER: [usize; 4] = [3, 0, 1, 2];

const EAST: usize = 0;

/// Left-hand wall follower over 4-connected foreground regions.
///
/// Every region is traced once, starting at its first pixel in row-major
/// order. The walk keeps background on its left, so one-pixel-wide necks and
/// stair-step edges are passed in both directions. A trace closes when it is
/// about to repeat its first step from the seed, and is dropped when it
/// exceeds its step budget.
#[derive(Debug, Clone, Default)]
pub struct BoundaryTracer {
    /// Maximum moves per contour; `None` means `width * height`.
    pub step_budget: Option<usize>,
}

enum TraceOutcome {
    Finished { points: Vec<Coord<i32>>, closed: bool },
    BudgetExceeded { steps: usize },
}

struct Visited {
    width: usize,
    marks: Vec<bool>,
}

impl Visited {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as usize,
            marks: vec![false; width as usize * height as usize],
        }
    }

    fn index(&self, (x, y): (u32, u32)) -> usize {
        y as usize * self.width + x as usize
    }

    fn contains(&self, pixel: (u32, u32)) -> bool {
        self.marks[self.index(pixel)]
    }

    fn insert(&mut self, pixel: (u32, u32)) {
        let idx = self.index(pixel);
        self.marks[idx] = true;
    }
}

fn neighbor(grid: &OccupancyGrid, (x, y): (u32, u32), heading: usize) -> Option<(u32, u32)> {
    let (dx, dy) = HEADINGS[heading];
    let nx = i64::from(x) + dx;
    let ny = i64::from(y) + dy;
    let in_bounds = nx >= 0 && ny >= 0 && nx < i64::from(grid.width()) && ny < i64::from(grid.height());
    in_bounds.then(|| (nx as u32, ny as u32))
}

fn to_coord((x, y): (u32, u32)) -> Coord<i32> {
    Coord {
        x: x as i32,
        y: y as i32,
    }
}

impl BoundaryTracer {
    fn trace_from(
        &self,
        grid: &OccupancyGrid,
        visited: &mut Visited,
        seed: (u32, u32),
        budget: usize,
    ) -> TraceOutcome {
        let mut points = vec![to_coord(seed)];
        visited.insert(seed);

        let mut current = seed;
        let mut heading = EAST;
        let mut first_step = None;
        let mut steps = 0;

        loop {
            let next = SEARCH_ORDER.iter().find_map(|turn| {
                let candidate_heading = (heading + turn) % 4;
                neighbor(grid, current, candidate_heading)
                    .filter(|&(x, y)| grid.is_foreground(x, y))
                    .map(|candidate| (candidate, candidate_heading))
            });

            let Some((pixel, new_heading)) = next else {
                // isolated pixel
                return TraceOutcome::Finished {
                    points,
                    closed: false,
                };
            };

            if current == seed {
                match first_step {
                    None => first_step = Some((pixel, new_heading)),
                    Some(step) if step == (pixel, new_heading) => {
                        // the walk arrived back on the seed last step
                        points.pop();
                        return TraceOutcome::Finished {
                            points,
                            closed: true,
                        };
                    }
                    Some(_) => {}
                }
            }

            if steps >= budget {
                return TraceOutcome::BudgetExceeded { steps };
            }
            steps += 1;

            visited.insert(pixel);
            points.push(to_coord(pixel));
            current = pixel;
            heading = new_heading;
        }
    }

    /// Mark the rest of the seed's region so interior pixels never seed contours.
    fn claim_region(grid: &OccupancyGrid, visited: &mut Visited, seed: (u32, u32)) {
        let mut seen = HashSet::from([seed]);
        let mut queue = VecDeque::from([seed]);
        while let Some(pixel) = queue.pop_front() {
            for heading in 0..HEADINGS.len() {
                let Some(next) = neighbor(grid, pixel, heading) else {
                    continue;
                };
                if grid.is_foreground(next.0, next.1) && seen.insert(next) {
                    visited.insert(next);
                    queue.push_back(next);
                }
            }
        }
    }
}

impl ContourTracer for BoundaryTracer {
    fn trace(&self, grid: &OccupancyGrid) -> Vec<Contour> {
        let (width, height) = grid.dimensions();
        let budget = self
            .step_budget
            .unwrap_or(width as usize * height as usize);
        let mut visited = Visited::new(width, height);
        let mut contours = Vec::new();

        for y in 0..height {
            for x in 0..width {
                if !grid.is_foreground(x, y) || visited.contains((x, y)) {
                    continue;
                }

                match self.trace_from(grid, &mut visited, (x, y), budget) {
                    TraceOutcome::Finished { points, closed } if points.len() >= MIN_CONTOUR_POINTS => {
                        contours.push(Contour::new(points, closed));
                    }
                    TraceOutcome::Finished { points, .. } => {
                        debug!(x, y, points = points.len(), "discarding short contour");
                    }
                    TraceOutcome::BudgetExceeded { steps } => {
                        warn!(x, y, steps, "contour trace exceeded its step budget, dropping it");
                    }
                }
                Self::claim_region(grid, &mut visited, (x, y));
            }
        }

        debug!(contours = contours.len(), "traced occupancy grid");
        contours
    }
}
