//! Colour-band suit classification
//!
//! Two explicit strategies:
//! - [`SuitStrategy::FourColor`] votes red / blue / green / black pixels, for
//!   four-colour decks (hearts red, diamonds blue, clubs green, spades black).
//! - [`SuitStrategy::RedBlack`] votes red against black only and separates the
//!   two suits of a colour family by how much of the image the ink covers.

use crate::utils::ImageUtils;
use crate::Result;
use opencv::{
    core::{self, Mat, Scalar},
    prelude::*,
};
use pokerlens_core::Suit;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inclusive HSV box (OpenCV 8-bit scale: hue 0..180)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorBand {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorBand {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// Single-channel mask of the HSV pixels inside this band
    pub fn mask(&self, hsv: &Mat) -> Result<Mat> {
        let bound = |v: [u8; 3]| Scalar::new(v[0] as f64, v[1] as f64, v[2] as f64, 0.0);
        let mut mask = Mat::default();
        core::in_range(hsv, &bound(self.lower), &bound(self.upper), &mut mask)?;
        Ok(mask)
    }
}

/// Pixels of `hsv` inside any of `bands`
fn count_in_bands(hsv: &Mat, bands: &[ColorBand]) -> Result<usize> {
    let mut union: Option<Mat> = None;
    for band in bands {
        let mask = band.mask(hsv)?;
        union = Some(match union {
            None => mask,
            Some(acc) => {
                let mut merged = Mat::default();
                core::bitwise_or(&acc, &mask, &mut merged, &core::no_array())?;
                merged
            }
        });
    }
    Ok(match union {
        Some(mask) => core::count_non_zero(&mask)? as usize,
        None => 0,
    })
}

/// Bands for the four-colour vote. Red spans the hue wraparound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FourColorBands {
    pub red: Vec<ColorBand>,
    pub blue: Vec<ColorBand>,
    pub green: Vec<ColorBand>,
    pub black: Vec<ColorBand>,
}

impl Default for FourColorBands {
    fn default() -> Self {
        Self {
            red: vec![
                ColorBand::new([0, 100, 100], [10, 255, 255]),
                ColorBand::new([160, 100, 100], [180, 255, 255]),
            ],
            blue: vec![ColorBand::new([100, 100, 100], [130, 255, 255])],
            green: vec![ColorBand::new([40, 100, 100], [80, 255, 255])],
            black: vec![ColorBand::new([0, 0, 0], [180, 255, 30])],
        }
    }
}

/// Bands and ink-coverage ratio for the red/black vote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedBlackBands {
    pub red: Vec<ColorBand>,
    pub black: Vec<ColorBand>,
    /// Share of the image area the winning colour must exceed to pick the
    /// denser suit of its family (hearts, spades)
    pub area_ratio: f64,
}

impl Default for RedBlackBands {
    fn default() -> Self {
        Self {
            red: vec![ColorBand::new([0, 50, 50], [10, 255, 255])],
            black: vec![ColorBand::new([0, 0, 0], [180, 255, 50])],
            area_ratio: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuitConfig {
    pub four_color: FourColorBands,
    pub red_black: RedBlackBands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuitStrategy {
    FourColor,
    RedBlack,
}

/// Pixel votes per colour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorCounts {
    pub red: usize,
    pub blue: usize,
    pub green: usize,
    pub black: usize,
}

impl ColorCounts {
    pub fn total(&self) -> usize {
        self.red + self.blue + self.green + self.black
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitVerdict {
    pub suit: Suit,
    pub strategy: SuitStrategy,
    pub counts: ColorCounts,
    /// Pixel area of the classified image
    pub area: usize,
}

impl SuitVerdict {
    /// Winning colour's share of all votes cast, 0 when nothing voted
    pub fn vote_share(&self) -> f64 {
        let total = self.counts.total();
        if total == 0 {
            return 0.0;
        }
        let winner = match self.strategy {
            SuitStrategy::FourColor => self
                .counts
                .red
                .max(self.counts.blue)
                .max(self.counts.green)
                .max(self.counts.black),
            SuitStrategy::RedBlack => self.counts.red.max(self.counts.black),
        };
        winner as f64 / total as f64
    }
}

pub struct SuitClassifier {
    config: SuitConfig,
}

impl SuitClassifier {
    pub fn new(config: SuitConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, image: &Mat, strategy: SuitStrategy) -> Result<SuitVerdict> {
        let verdict = match strategy {
            SuitStrategy::FourColor => self.classify_four_color(image)?,
            SuitStrategy::RedBlack => self.classify_red_black(image)?,
        };
        debug!(
            "{:?} suit vote {:?} over {} px -> {}",
            strategy, verdict.counts, verdict.area, verdict.suit
        );
        Ok(verdict)
    }

    fn classify_four_color(&self, image: &Mat) -> Result<SuitVerdict> {
        let bands = &self.config.four_color;
        let hsv = ImageUtils::to_hsv(image)?;
        let counts = ColorCounts {
            red: count_in_bands(&hsv, &bands.red)?,
            blue: count_in_bands(&hsv, &bands.blue)?,
            green: count_in_bands(&hsv, &bands.green)?,
            black: count_in_bands(&hsv, &bands.black)?,
        };
        let area = pixel_area(&hsv);

        // Largest vote wins; earlier colours keep ties
        let votes = [
            (counts.red, Suit::Hearts),
            (counts.blue, Suit::Diamonds),
            (counts.green, Suit::Clubs),
            (counts.black, Suit::Spades),
        ];
        let mut suit = Suit::Hearts;
        let mut best = 0;
        for (count, candidate) in votes {
            if count > best {
                best = count;
                suit = candidate;
            }
        }

        Ok(SuitVerdict {
            suit,
            strategy: SuitStrategy::FourColor,
            counts,
            area,
        })
    }

    fn classify_red_black(&self, image: &Mat) -> Result<SuitVerdict> {
        let bands = &self.config.red_black;
        let hsv = ImageUtils::to_hsv(image)?;
        let counts = ColorCounts {
            red: count_in_bands(&hsv, &bands.red)?,
            black: count_in_bands(&hsv, &bands.black)?,
            ..ColorCounts::default()
        };
        let area = pixel_area(&hsv);

        let dense = area as f64 * bands.area_ratio;
        let suit = if counts.red > counts.black {
            if counts.red as f64 > dense { Suit::Hearts } else { Suit::Diamonds }
        } else if counts.black as f64 > dense {
            Suit::Spades
        } else {
            Suit::Clubs
        };

        Ok(SuitVerdict {
            suit,
            strategy: SuitStrategy::RedBlack,
            counts,
            area,
        })
    }
}

impl Default for SuitClassifier {
    fn default() -> Self {
        Self::new(SuitConfig::default())
    }
}

fn pixel_area(image: &Mat) -> usize {
    (image.rows() * image.cols()) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const BACKGROUND: Rgb<u8> = Rgb([250, 250, 250]);

    /// `fill` of the pixels (row-major prefix) painted in `color`
    fn glyph(color: Rgb<u8>, fill: f64) -> Result<Mat> {
        let (w, h) = (20u32, 30u32);
        let painted = (fill * (w * h) as f64).round() as u32;
        let img = RgbImage::from_fn(w, h, |x, y| {
            if y * w + x < painted { color } else { BACKGROUND }
        });
        ImageUtils::rgb_to_mat(&img)
    }

    #[test]
    fn test_mostly_red_glyph_is_hearts_under_both_strategies() -> Result<()> {
        let classifier = SuitClassifier::default();
        let red = glyph(Rgb([220, 20, 20]), 0.9)?;

        let four = classifier.classify(&red, SuitStrategy::FourColor)?;
        assert_eq!(four.suit, Suit::Hearts);
        assert!(four.vote_share() > 0.99);

        let two = classifier.classify(&red, SuitStrategy::RedBlack)?;
        assert_eq!(two.suit, Suit::Hearts);
        Ok(())
    }

    #[test]
    fn test_four_color_mapping() -> Result<()> {
        let classifier = SuitClassifier::default();
        let cases = [
            (Rgb([20, 40, 220]), Suit::Diamonds),
            (Rgb([20, 200, 40]), Suit::Clubs),
            (Rgb([10, 10, 10]), Suit::Spades),
        ];
        for (color, expected) in cases {
            let verdict = classifier.classify(&glyph(color, 0.3)?, SuitStrategy::FourColor)?;
            assert_eq!(verdict.suit, expected, "colour {:?}", color);
        }
        Ok(())
    }

    #[test]
    fn test_red_black_uses_area_ratio_within_family() -> Result<()> {
        let classifier = SuitClassifier::default();
        let sparse_red = glyph(Rgb([220, 20, 20]), 0.05)?;
        let dense_black = glyph(Rgb([10, 10, 10]), 0.4)?;
        let sparse_black = glyph(Rgb([10, 10, 10]), 0.05)?;

        assert_eq!(classifier.classify(&sparse_red, SuitStrategy::RedBlack)?.suit, Suit::Diamonds);
        assert_eq!(classifier.classify(&dense_black, SuitStrategy::RedBlack)?.suit, Suit::Spades);
        assert_eq!(classifier.classify(&sparse_black, SuitStrategy::RedBlack)?.suit, Suit::Clubs);
        Ok(())
    }

    #[test]
    fn test_band_bounds_are_inclusive() -> Result<()> {
        let pixel = Scalar::new(10.0, 100.0, 100.0, 0.0);
        let hsv = Mat::new_rows_cols_with_default(1, 3, core::CV_8UC3, pixel)?;
        let band = ColorBand::new([0, 100, 100], [10, 255, 255]);
        assert_eq!(core::count_non_zero(&band.mask(&hsv)?)?, 3);

        let split = [
            ColorBand::new([0, 0, 0], [5, 255, 255]),
            ColorBand::new([8, 0, 0], [12, 255, 255]),
        ];
        assert_eq!(count_in_bands(&hsv, &split)?, 3);
        assert_eq!(count_in_bands(&hsv, &[])?, 0);
        Ok(())
    }

    #[test]
    fn test_blank_glyph_has_zero_vote_share() -> Result<()> {
        let blank = glyph(BACKGROUND, 0.0)?;
        let verdict = SuitClassifier::default().classify(&blank, SuitStrategy::FourColor)?;
        assert_eq!(verdict.counts.total(), 0);
        assert_eq!(verdict.vote_share(), 0.0);
        Ok(())
    }
}
