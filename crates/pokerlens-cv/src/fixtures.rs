//! Synthetic table imagery for unit tests

use crate::bbox::BBox;
use crate::template::{GlyphTemplate, TemplateSet};
use crate::utils::ImageUtils;
use crate::Result;
use image::{Rgb, RgbImage};
use opencv::core::Mat;
use pokerlens_core::{Rank, Suit};

pub const FELT: Rgb<u8> = Rgb([30, 90, 40]);
pub const CARD: Rgb<u8> = Rgb([245, 245, 245]);
pub const INK: Rgb<u8> = Rgb([0, 0, 0]);
pub const RED: Rgb<u8> = Rgb([220, 20, 20]);
pub const BLUE: Rgb<u8> = Rgb([20, 40, 220]);
pub const GREEN: Rgb<u8> = Rgb([20, 200, 40]);

/// Rank glyph placement inside a card
pub const RANK_ORIGIN: (i32, i32) = (8, 8);
pub const RANK_SIZE: (i32, i32) = (14, 20);
/// Pip placement inside a card, inside the area derived from the rank glyph
pub const PIP: BBox = BBox { x: 19, y: 36, width: 12, height: 12 };

fn fill(img: &mut RgbImage, b: BBox, color: Rgb<u8>) {
    for y in b.y..b.bottom() {
        for x in b.x..b.right() {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Closed outline plus a rank-specific inner pattern, in glyph coordinates
fn rank_blocks(rank: Rank) -> Vec<BBox> {
    let (w, h) = RANK_SIZE;
    let mut blocks = vec![
        BBox::new(0, 0, w, 2),
        BBox::new(0, h - 2, w, 2),
        BBox::new(0, 0, 2, h),
        BBox::new(w - 2, 0, 2, h),
    ];
    match rank {
        Rank::Ace => blocks.push(BBox::new(2, 9, w - 4, 3)),
        Rank::King => blocks.push(BBox::new(6, 2, 3, h - 4)),
        _ => {
            blocks.push(BBox::new(2, 2, 5, 5));
            blocks.push(BBox::new(7, 13, 5, 5));
        }
    }
    blocks
}

/// Paint a card with its top-left corner at `origin`. `artwork` adds a large
/// block in the pip colour, the way court cards carry coloured figures.
pub fn paint_card(img: &mut RgbImage, origin: (i32, i32), rank: Rank, pip: Rgb<u8>, artwork: bool) {
    let (ox, oy) = origin;
    fill(img, BBox::new(ox, oy, 100, 140), CARD);
    for b in rank_blocks(rank) {
        let (x, y) = (ox + RANK_ORIGIN.0 + b.x, oy + RANK_ORIGIN.1 + b.y);
        fill(img, BBox::new(x, y, b.width, b.height), INK);
    }
    fill(img, BBox::new(ox + PIP.x, oy + PIP.y, PIP.width, PIP.height), pip);
    if artwork {
        paint_artwork(img, origin, pip);
    }
}

/// Court-style 50x50 block in the lower half of a card, below the corner index
pub fn paint_artwork(img: &mut RgbImage, origin: (i32, i32), color: Rgb<u8>) {
    fill(img, BBox::new(origin.0 + 30, origin.1 + 75, 50, 50), color);
}

/// A single canonical 100x140 card
pub fn card_mat(rank: Rank, pip: Rgb<u8>, artwork: bool) -> Result<Mat> {
    let mut img = RgbImage::from_pixel(100, 140, CARD);
    paint_card(&mut img, (0, 0), rank, pip, artwork);
    ImageUtils::rgb_to_mat(&img)
}

/// Dark felt with bright rectangles painted on it
pub fn region_with_cards(width: u32, height: u32, cards: &[BBox]) -> Result<Mat> {
    let mut img = RgbImage::from_pixel(width, height, FELT);
    for card in cards {
        fill(&mut img, *card, CARD);
    }
    ImageUtils::rgb_to_mat(&img)
}

/// Exact rank glyphs for `ranks` plus one bordered pip as the suit template
pub fn templates(ranks: &[Rank]) -> Result<TemplateSet> {
    let mut set = TemplateSet::new();
    for &rank in ranks {
        let mut img = RgbImage::from_pixel(RANK_SIZE.0 as u32, RANK_SIZE.1 as u32, CARD);
        for b in rank_blocks(rank) {
            fill(&mut img, b, INK);
        }
        let gray = ImageUtils::to_gray(&ImageUtils::rgb_to_mat(&img)?)?;
        set = set.with_rank(GlyphTemplate::new(rank, gray));
    }

    let mut pip = RgbImage::from_pixel(PIP.width as u32 + 4, PIP.height as u32 + 4, CARD);
    fill(&mut pip, BBox::new(2, 2, PIP.width, PIP.height), INK);
    let gray = ImageUtils::to_gray(&ImageUtils::rgb_to_mat(&pip)?)?;
    Ok(set.with_suit(GlyphTemplate::new(Suit::Spades, gray)))
}
