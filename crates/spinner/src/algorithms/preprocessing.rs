use crate::{
    error::{Result, SpinnerError},
    traits::BitmapPreprocessor,
    types::{OccupancyGrid, PixelBuffer},
};

/// Luminance assigned to fully transparent pixels when averaging windows.
const TRANSPARENT_LUMINANCE: f32 = 255.0;

pub const MIN_DETAIL_LEVEL: u8 = 1;
pub const MAX_DETAIL_LEVEL: u8 = 10;

/// Rec. 601 luma of an RGB triple.
pub fn luminance([r, g, b, _]: [u8; 4]) -> f32 {
    0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)
}

fn ensure_non_empty(buffer: &PixelBuffer) -> Result<()> {
    let (width, height) = buffer.dimensions();
    if width == 0 || height == 0 {
        return Err(SpinnerError::input(format!(
            "cannot threshold a {width}x{height} buffer"
        )));
    }
    Ok(())
}

/// Global thresholding: ink is anything darker than `threshold`
#[derive(Debug, Clone)]
pub struct ThresholdPreprocessor {
    pub threshold: u8,
}

impl Default for ThresholdPreprocessor {
    fn default() -> Self {
        Self { threshold: 128 }
    }
}

impl BitmapPreprocessor for ThresholdPreprocessor {
    fn preprocess(&self, buffer: &PixelBuffer) -> Result<OccupancyGrid> {
        ensure_non_empty(buffer)?;
        let threshold = f32::from(self.threshold);
        Ok(OccupancyGrid::from_fn(buffer.width(), buffer.height(), |x, y| {
            let pixel = buffer.pixel(x, y);
            pixel[3] != 0 && luminance(pixel) < threshold
        }))
    }
}

/// Adaptive threshold against the mean of a local window.
///
/// Higher detail levels shrink the window and raise the bias, so only
/// pixels clearly darker than their close surroundings count as ink.
#[derive(Debug, Clone)]
pub struct AdaptiveThresholdPreprocessor {
    pub detail_level: u8,
}

impl Default for AdaptiveThresholdPreprocessor {
    fn default() -> Self {
        Self { detail_level: 5 }
    }
}

impl AdaptiveThresholdPreprocessor {
    fn detail(&self) -> u8 {
        self.detail_level.clamp(MIN_DETAIL_LEVEL, MAX_DETAIL_LEVEL)
    }

    /// Half-width of the averaging window; the window spans `2r + 1` pixels.
    pub fn window_radius(&self) -> u32 {
        u32::from(MAX_DETAIL_LEVEL + 1 - self.detail()).max(1)
    }

    /// Amount a pixel must undercut its window mean by.
    pub fn bias(&self) -> f32 {
        1.5 * f32::from(self.detail())
    }
}

impl BitmapPreprocessor for AdaptiveThresholdPreprocessor {
    fn preprocess(&self, buffer: &PixelBuffer) -> Result<OccupancyGrid> {
        ensure_non_empty(buffer)?;
        let (width, height) = buffer.dimensions();
        let table = SummedAreaTable::new(buffer);
        let radius = self.window_radius();
        let bias = f64::from(self.bias());

        Ok(OccupancyGrid::from_fn(width, height, |x, y| {
            let pixel = buffer.pixel(x, y);
            if pixel[3] == 0 {
                return false;
            }
            let x0 = x.saturating_sub(radius);
            let y0 = y.saturating_sub(radius);
            let x1 = (x + radius).min(width - 1);
            let y1 = (y + radius).min(height - 1);
            let mean = table.mean(x0, y0, x1, y1);
            f64::from(luminance(pixel)) < mean - bias
        }))
    }
}

/// Integral image of luminance, one row and column larger than the buffer.
struct SummedAreaTable {
    stride: usize,
    sums: Vec<f64>,
}

impl SummedAreaTable {
    fn new(buffer: &PixelBuffer) -> Self {
        let (width, height) = buffer.dimensions();
        let stride = width as usize + 1;
        let mut sums = vec![0.0; stride * (height as usize + 1)];

        for y in 0..height {
            let mut row_sum = 0.0;
            for x in 0..width {
                let pixel = buffer.pixel(x, y);
                row_sum += if pixel[3] == 0 {
                    f64::from(TRANSPARENT_LUMINANCE)
                } else {
                    f64::from(luminance(pixel))
                };
                let idx = (y as usize + 1) * stride + x as usize + 1;
                sums[idx] = sums[idx - stride] + row_sum;
            }
        }

        Self { stride, sums }
    }

    fn at(&self, x: u32, y: u32) -> f64 {
        self.sums[y as usize * self.stride + x as usize]
    }

    /// Mean over the inclusive rectangle `[x0, x1] x [y0, y1]`.
    fn mean(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> f64 {
        let sum = self.at(x1 + 1, y1 + 1) - self.at(x0, y1 + 1) - self.at(x1 + 1, y0)
            + self.at(x0, y0);
        let count = f64::from((x1 - x0 + 1) * (y1 - y0 + 1));
        sum / count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use imageproc::{drawing::draw_filled_rect_mut, rect::Rect};

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn buffer_with_square(size: u32, x: i32, y: i32, side: u32) -> PixelBuffer {
        let mut image = RgbaImage::from_pixel(size, size, WHITE);
        draw_filled_rect_mut(&mut image, Rect::at(x, y).of_size(side, side), BLACK);
        PixelBuffer::from_image(image).expect("non-empty image")
    }

    #[test]
    fn luminance_uses_rec601_weights() {
        assert!((luminance([255, 0, 0, 255]) - 76.245).abs() < 1e-3);
        assert!((luminance([0, 255, 0, 255]) - 149.685).abs() < 1e-3);
        assert!((luminance([0, 0, 255, 255]) - 29.07).abs() < 1e-3);
    }

    #[test]
    fn global_threshold_marks_dark_pixels() {
        let buffer = buffer_with_square(10, 2, 3, 4);
        let grid = ThresholdPreprocessor::default()
            .preprocess(&buffer)
            .expect("threshold");

        assert_eq!(grid.dimensions(), (10, 10));
        assert_eq!(grid.foreground_count(), 16);
        assert!(grid.is_foreground(2, 3));
        assert!(grid.is_foreground(5, 6));
        assert!(!grid.is_foreground(6, 6));
    }

    #[test]
    fn transparent_pixels_are_background() {
        let image = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 0]));
        let buffer = PixelBuffer::from_image(image).expect("non-empty");

        let simple = ThresholdPreprocessor { threshold: 255 }
            .preprocess(&buffer)
            .expect("threshold");
        assert_eq!(simple.foreground_count(), 0);

        let adaptive = AdaptiveThresholdPreprocessor { detail_level: 10 }
            .preprocess(&buffer)
            .expect("adaptive");
        assert_eq!(adaptive.foreground_count(), 0);
    }

    #[test]
    fn detail_level_controls_window_and_bias() {
        let coarse = AdaptiveThresholdPreprocessor { detail_level: 1 };
        let fine = AdaptiveThresholdPreprocessor { detail_level: 10 };
        assert!(fine.window_radius() < coarse.window_radius());
        assert!(fine.bias() > coarse.bias());
        assert_eq!(fine.window_radius(), 1);
    }

    #[test]
    fn adaptive_flags_edges_of_dark_blobs() {
        let buffer = buffer_with_square(20, 8, 8, 3);
        let grid = AdaptiveThresholdPreprocessor { detail_level: 10 }
            .preprocess(&buffer)
            .expect("adaptive");

        // Corner of the blob sees white in its 3x3 window.
        assert!(grid.is_foreground(8, 8));
        // The blob centre is surrounded by ink only.
        assert!(!grid.is_foreground(9, 9));
        assert!(!grid.is_foreground(0, 0));
    }

    #[test]
    fn adaptive_ignores_uniform_regions() {
        let image = RgbaImage::from_pixel(12, 12, Rgba([90, 90, 90, 255]));
        let buffer = PixelBuffer::from_image(image).expect("non-empty");
        let grid = AdaptiveThresholdPreprocessor::default()
            .preprocess(&buffer)
            .expect("adaptive");
        assert_eq!(grid.foreground_count(), 0);
    }

    #[test]
    fn adaptive_window_is_clipped_at_the_border() {
        let buffer = buffer_with_square(5, 0, 0, 1);
        let grid = AdaptiveThresholdPreprocessor { detail_level: 10 }
            .preprocess(&buffer)
            .expect("adaptive");
        assert!(grid.is_foreground(0, 0));
        assert_eq!(grid.foreground_count(), 1);
    }
}
