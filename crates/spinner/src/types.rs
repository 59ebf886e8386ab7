use geo::{AffineTransform, BoundingRect};
use geo_types::{Coord, LineString, Rect};
use image::{GrayImage, Luma, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpinnerError};

/// Raw RGBA8 pixels of one animation frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Wrap a flat RGBA byte array. Fails on zero area or a length mismatch.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SpinnerError::input(format!(
                "pixel buffer has zero area ({width}x{height})"
            )));
        }
        let expected = width as usize * height as usize * 4;
        let actual = data.len();
        let image = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
            SpinnerError::input(format!(
                "pixel buffer of {width}x{height} needs {expected} bytes, got {actual}"
            ))
        })?;
        Ok(Self { image })
    }

    pub fn from_image(image: RgbaImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(SpinnerError::input(format!(
                "pixel buffer has zero area ({}x{})",
                image.width(),
                image.height()
            )));
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Gaussian-blurred copy, used to knock out single-pixel noise before thresholding.
    pub fn blurred(&self, sigma: f32) -> Self {
        if sigma <= 0.0 || !sigma.is_finite() {
            return self.clone();
        }
        Self {
            image: imageproc::filter::gaussian_blur_f32(&self.image, sigma),
        }
    }
}

impl TryFrom<RgbaImage> for PixelBuffer {
    type Error = SpinnerError;

    fn try_from(image: RgbaImage) -> Result<Self> {
        Self::from_image(image)
    }
}

/// Binary raster: 255 marks foreground ink, 0 background.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    image: GrayImage,
}

impl OccupancyGrid {
    pub const FOREGROUND: u8 = 255;
    pub const BACKGROUND: u8 = 0;

    /// An all-background grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    pub fn from_fn<F>(width: u32, height: u32, mut is_foreground: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let image = GrayImage::from_fn(width, height, |x, y| {
            if is_foreground(x, y) {
                Luma([Self::FOREGROUND])
            } else {
                Luma([Self::BACKGROUND])
            }
        });
        Self { image }
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y).0[0] == Self::FOREGROUND
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn foreground_count(&self) -> usize {
        self.image
            .pixels()
            .filter(|p| p.0[0] == Self::FOREGROUND)
            .count()
    }
}

/// Boundary polyline on the pixel grid, in trace order from its seed pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    points: Vec<Coord<i32>>,
    /// Whether the trace made it back to its seed.
    closed: bool,
}

impl Contour {
    pub fn new(points: Vec<Coord<i32>>, closed: bool) -> Self {
        Self { points, closed }
    }

    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let points = points.into_iter().map(|(x, y)| Coord { x, y }).collect();
        Self::new(points, true)
    }

    pub fn points(&self) -> &[Coord<i32>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn to_f64(&self) -> Vec<Coord<f64>> {
        self.points
            .iter()
            .map(|p| Coord {
                x: f64::from(p.x),
                y: f64::from(p.y),
            })
            .collect()
    }
}

/// Single drawing command with absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PathCommand {
    MoveTo { to: Coord<f64> },
    LineTo { to: Coord<f64> },
    QuadTo { ctrl: Coord<f64>, to: Coord<f64> },
    CubicTo {
        ctrl1: Coord<f64>,
        ctrl2: Coord<f64>,
        to: Coord<f64>,
    },
    Close,
}

impl PathCommand {
    /// End point of the command, `None` for `Close`.
    pub fn end_point(&self) -> Option<Coord<f64>> {
        match *self {
            Self::MoveTo { to }
            | Self::LineTo { to }
            | Self::QuadTo { to, .. }
            | Self::CubicTo { to, .. } => Some(to),
            Self::Close => None,
        }
    }

    pub fn is_curve(&self) -> bool {
        matches!(self, Self::QuadTo { .. } | Self::CubicTo { .. })
    }

    fn map_points<F>(self, f: F) -> Self
    where
        F: Fn(Coord<f64>) -> Coord<f64>,
    {
        match self {
            Self::MoveTo { to } => Self::MoveTo { to: f(to) },
            Self::LineTo { to } => Self::LineTo { to: f(to) },
            Self::QuadTo { ctrl, to } => Self::QuadTo {
                ctrl: f(ctrl),
                to: f(to),
            },
            Self::CubicTo { ctrl1, ctrl2, to } => Self::CubicTo {
                ctrl1: f(ctrl1),
                ctrl2: f(ctrl2),
                to: f(to),
            },
            Self::Close => Self::Close,
        }
    }

    fn points(&self) -> impl Iterator<Item = Coord<f64>> {
        let points: [Option<Coord<f64>>; 3] = match *self {
            Self::MoveTo { to } | Self::LineTo { to } => [Some(to), None, None],
            Self::QuadTo { ctrl, to } => [Some(ctrl), Some(to), None],
            Self::CubicTo { ctrl1, ctrl2, to } => [Some(ctrl1), Some(ctrl2), Some(to)],
            Self::Close => [None, None, None],
        };
        points.into_iter().flatten()
    }
}

/// Resolution-independent shape made of move/line/curve/close commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorPath {
    commands: Vec<PathCommand>,
}

/// Magic number for approximating a quarter circle with one cubic.
const CIRCLE_KAPPA: f64 = 0.552_284_749_830_793_4;

impl VectorPath {
    pub fn builder() -> PathBuilder {
        PathBuilder::default()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn curve_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_curve()).count()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.commands.last(), Some(PathCommand::Close))
    }

    /// On-curve points in drawing order (control points excluded).
    pub fn anchor_points(&self) -> Vec<Coord<f64>> {
        self.commands.iter().filter_map(PathCommand::end_point).collect()
    }

    /// Bounds of every anchor and control point; curves never leave this box.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        let coords: Vec<Coord<f64>> = self.commands.iter().flat_map(|c| c.points()).collect();
        LineString::new(coords).bounding_rect()
    }

    pub fn transformed(&self, transform: &AffineTransform<f64>) -> VectorPath {
        let commands = self
            .commands
            .iter()
            .map(|c| c.map_points(|p| transform.apply(p)))
            .collect();
        VectorPath { commands }
    }

    /// Closed circle built from four cubic quarter arcs, starting at angle 0.
    pub fn circle(center: Coord<f64>, radius: f64) -> VectorPath {
        let k = radius * CIRCLE_KAPPA;
        let Coord { x: cx, y: cy } = center;
        let at = |x: f64, y: f64| Coord { x, y };

        let mut builder = PathBuilder::default();
        builder
            .move_to(at(cx + radius, cy))
            .cubic_to(at(cx + radius, cy + k), at(cx + k, cy + radius), at(cx, cy + radius))
            .cubic_to(at(cx - k, cy + radius), at(cx - radius, cy + k), at(cx - radius, cy))
            .cubic_to(at(cx - radius, cy - k), at(cx - k, cy - radius), at(cx, cy - radius))
            .cubic_to(at(cx + k, cy - radius), at(cx + radius, cy - k), at(cx + radius, cy))
            .close();
        builder.build()
    }
}

/// Accumulates commands for a [`VectorPath`].
#[derive(Debug, Default)]
pub struct PathBuilder {
    commands: Vec<PathCommand>,
}

impl PathBuilder {
    pub fn move_to(&mut self, to: Coord<f64>) -> &mut Self {
        self.commands.push(PathCommand::MoveTo { to });
        self
    }

    pub fn line_to(&mut self, to: Coord<f64>) -> &mut Self {
        self.commands.push(PathCommand::LineTo { to });
        self
    }

    pub fn quad_to(&mut self, ctrl: Coord<f64>, to: Coord<f64>) -> &mut Self {
        self.commands.push(PathCommand::QuadTo { ctrl, to });
        self
    }

    pub fn cubic_to(&mut self, ctrl1: Coord<f64>, ctrl2: Coord<f64>, to: Coord<f64>) -> &mut Self {
        self.commands.push(PathCommand::CubicTo { ctrl1, ctrl2, to });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    pub fn build(self) -> VectorPath {
        VectorPath {
            commands: self.commands,
        }
    }
}

/// The vectorized form of one animation frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// One closed path per traced region
    pub paths: Vec<VectorPath>,
    /// Source pixel dimensions
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(paths: Vec<VectorPath>, width: u32, height: u32) -> Self {
        Self {
            paths,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(VectorPath::is_empty)
    }

    /// Larger side of the source raster.
    pub fn nominal_size(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Union of the bounding boxes of all paths.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.paths
            .iter()
            .filter_map(VectorPath::bounding_rect)
            .reduce(|a, b| {
                Rect::new(
                    Coord {
                        x: a.min().x.min(b.min().x),
                        y: a.min().y.min(b.min().y),
                    },
                    Coord {
                        x: a.max().x.max(b.max().x),
                        y: a.max().y.max(b.max().y),
                    },
                )
            })
    }

    /// Pivot used when the frame is placed: its shape's bounding-box centre,
    /// or the raster centre for an empty frame.
    pub fn pivot(&self) -> Coord<f64> {
        match self.bounding_rect() {
            Some(rect) => rect.center(),
            None => Coord {
                x: f64::from(self.width) / 2.0,
                y: f64::from(self.height) / 2.0,
            },
        }
    }
}
