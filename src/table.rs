//! Fixed table layout: where the community strip and the hand sit in a
//! full-table capture, as fractions of its size

use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};

/// Rectangle given as fractions of the capture height and width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionFraction {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl RegionFraction {
    pub const fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self { top, bottom, left, right }
    }

    /// Pixel rectangle `(x, y, width, height)` for a `width`x`height` capture;
    /// edges are truncated toward zero
    pub fn pixel_rect(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let y0 = (height as f64 * self.top) as u32;
        let y1 = (height as f64 * self.bottom) as u32;
        let x0 = (width as f64 * self.left) as u32;
        let x1 = (width as f64 * self.right) as u32;
        (x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    pub fn crop(&self, capture: &RgbImage) -> RgbImage {
        let (x, y, w, h) = self.pixel_rect(capture.width(), capture.height());
        imageops::crop_imm(capture, x, y, w, h).to_image()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableLayout {
    pub community: RegionFraction,
    pub hand: RegionFraction,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            community: RegionFraction::new(0.26, 0.365, 0.635, 0.855),
            hand: RegionFraction::new(0.48, 0.58, 0.715, 0.783),
        }
    }
}

impl TableLayout {
    /// Community and hand region images of a capture
    pub fn split(&self, capture: &RgbImage) -> (RgbImage, RgbImage) {
        (self.community.crop(capture), self.hand.crop(capture))
    }
}
