//! Rank and suit glyph extraction from the corner index of a card

use crate::bbox::BBox;
use crate::utils::{ContourUtils, ImageUtils};
use crate::Result;
use opencv::{core::Mat, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Corner-index geometry. Defaults match the table's card design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolConfig {
    /// Gray level at or below which a pixel counts as ink
    pub ink_threshold: f64,
    /// Padding around the rank glyph's bounding box
    pub rank_padding: i32,
    /// Gap between the rank glyph's bottom edge and the suit area
    pub suit_gap: i32,
    /// Suit area height beyond the rank glyph's own height
    pub suit_extra_height: i32,
    /// Suit area width beyond the rank glyph's own width
    pub suit_extra_width: i32,
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            ink_threshold: 200.0,
            rank_padding: 5,
            suit_gap: 2,
            suit_extra_height: 25,
            suit_extra_width: 20,
        }
    }
}

/// Rank and suit glyph crops of one card
#[derive(Debug, Clone)]
pub struct SymbolPair {
    pub rank_glyph: Mat,
    pub suit_glyph: Mat,
    /// Unpadded rank glyph box, in card coordinates
    pub rank_box: BBox,
    /// Derived suit area, in card coordinates
    pub suit_box: BBox,
}

pub struct SymbolExtractor {
    config: SymbolConfig,
}

impl SymbolExtractor {
    pub fn new(config: SymbolConfig) -> Self {
        Self { config }
    }

    /// Glyphs of a canonical card, or `None` when the corner index holds no
    /// ink (or the derived suit area falls off the card). `None` means the
    /// card is unidentifiable, not that extraction failed.
    pub fn extract(&self, card: &Mat) -> Result<Option<SymbolPair>> {
        let (card_w, card_h) = (card.cols(), card.rows());
        let corner = BBox::new(0, 0, card_w / 2, card_h / 2);
        if corner.is_empty() {
            return Ok(None);
        }

        let quadrant = ImageUtils::crop(card, &corner)?;
        let gray = ImageUtils::to_gray(&quadrant)?;
        let ink = ImageUtils::binarize(&gray, self.config.ink_threshold, true)?;

        let Some(blob) = ContourUtils::largest_blob(&ink)? else {
            debug!("No ink contour in corner index");
            return Ok(None);
        };
        let rank_box = blob.bbox;

        let padded = rank_box
            .padded(self.config.rank_padding)
            .clamp_to(quadrant.cols(), quadrant.rows());
        let rank_glyph = ImageUtils::crop(&quadrant, &padded)?;

        let suit_box = self.suit_box(&rank_box, card_w, card_h);
        if suit_box.is_empty() {
            debug!("Derived suit area {:?} is empty", suit_box);
            return Ok(None);
        }
        let suit_glyph = ImageUtils::crop(card, &suit_box)?;

        Ok(Some(SymbolPair {
            rank_glyph,
            suit_glyph,
            rank_box,
            suit_box,
        }))
    }

    /// Suit pip location derived from the rank glyph: below it, starting
    /// halfway across it, sized from the glyph plus fixed margins
    pub fn suit_box(&self, rank_box: &BBox, card_w: i32, card_h: i32) -> BBox {
        let start_y = (rank_box.bottom() + self.config.suit_gap).min(card_h);
        let end_y = (start_y + rank_box.height + self.config.suit_extra_height).min(card_h);
        let start_x = (rank_box.x + rank_box.width / 2).min(card_w);
        let end_x = (start_x + rank_box.width + self.config.suit_extra_width).min(card_w);
        BBox::from_corners(start_x, start_y, end_x, end_y)
    }
}

impl Default for SymbolExtractor {
    fn default() -> Self {
        Self::new(SymbolConfig::default())
    }
}
