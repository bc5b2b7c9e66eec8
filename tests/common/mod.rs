//! Synthetic table captures shared by the integration tests
#![allow(dead_code)]

use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::Path;

pub const FELT: Rgb<u8> = Rgb([30, 90, 40]);
pub const CARD: Rgb<u8> = Rgb([245, 245, 245]);
pub const INK: Rgb<u8> = Rgb([0, 0, 0]);
pub const RED: Rgb<u8> = Rgb([220, 20, 20]);
pub const BLUE: Rgb<u8> = Rgb([20, 40, 220]);

pub const CARD_W: u32 = 100;
pub const CARD_H: u32 = 140;

/// (x, y, width, height) in glyph coordinates
type Block = (u32, u32, u32, u32);

fn fill(img: &mut RgbImage, (x, y, w, h): Block, color: Rgb<u8>) {
    for py in y..y + h {
        for px in x..x + w {
            img.put_pixel(px, py, color);
        }
    }
}

/// 14x20 closed outline with a per-rank inner mark
fn rank_blocks(token: &str) -> Vec<Block> {
    let mut blocks = vec![(0, 0, 14, 2), (0, 18, 14, 2), (0, 0, 2, 20), (12, 0, 2, 20)];
    match token {
        "a" => blocks.push((2, 9, 10, 3)),
        "k" => blocks.push((6, 2, 3, 16)),
        _ => {
            blocks.push((2, 2, 5, 5));
            blocks.push((7, 13, 5, 5));
        }
    }
    blocks
}

/// Card face at `origin`: rank glyph at (8, 8), 12x12 pip at (19, 36),
/// optional 50x50 block of pip colour standing in for court artwork
pub fn paint_card(
    img: &mut RgbImage,
    origin: (u32, u32),
    token: &str,
    pip: Rgb<u8>,
    artwork: bool,
) {
    let (ox, oy) = origin;
    fill(img, (ox, oy, CARD_W, CARD_H), CARD);
    for (x, y, w, h) in rank_blocks(token) {
        fill(img, (ox + 8 + x, oy + 8 + y, w, h), INK);
    }
    fill(img, (ox + 19, oy + 36, 12, 12), pip);
    if artwork {
        fill(img, (ox + 30, oy + 75, 50, 50), pip);
    }
}

/// A spades, K hearts, 10 diamonds left to right on felt
pub fn community_strip() -> RgbImage {
    let mut img = RgbImage::from_pixel(360, 160, FELT);
    paint_card(&mut img, (10, 10), "a", INK, false);
    paint_card(&mut img, (130, 10), "k", RED, true);
    paint_card(&mut img, (250, 10), "10", BLUE, false);
    img
}

/// K hearts (red artwork), 10 spades (black artwork), with a gap between
pub fn hand_pair() -> RgbImage {
    let mut img = RgbImage::from_pixel(240, 160, FELT);
    paint_card(&mut img, (10, 10), "k", RED, true);
    paint_card(&mut img, (130, 10), "10", INK, true);
    img
}

pub fn empty_felt(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, FELT)
}

/// Rank templates `a`, `k`, `10` and a `spades` pip template as PNG files
pub fn write_templates(dir: &Path) -> image::ImageResult<()> {
    for token in ["a", "k", "10"] {
        let mut glyph = GrayImage::from_pixel(14, 20, Luma([245]));
        for (x, y, w, h) in rank_blocks(token) {
            for py in y..y + h {
                for px in x..x + w {
                    glyph.put_pixel(px, py, Luma([0]));
                }
            }
        }
        glyph.save(dir.join(format!("{}.png", token)))?;
    }

    let pip = GrayImage::from_fn(16, 16, |x, y| {
        if (2..14).contains(&x) && (2..14).contains(&y) { Luma([0]) } else { Luma([245]) }
    });
    pip.save(dir.join("spades.png"))
}
