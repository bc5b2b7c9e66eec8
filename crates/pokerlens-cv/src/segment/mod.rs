//! Card segmentation: region image → ordered, canonically sized card crops
//!
//! Each strategy implements [`SegmentationStrategy`]; a [`SegmentationPolicy`]
//! runs a primary strategy and swaps in a fallback when the primary does not
//! produce the expected number of cards.

pub mod contour;
pub mod split;

pub use contour::{ContourSegmenter, LargestContoursSegmenter};
pub use split::{GeometricSplit, SplitKind};

use crate::bbox::BBox;
use crate::utils::ImageUtils;
use crate::Result;
use opencv::{core::Mat, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Canonical card width every later stage relies on
pub const CANONICAL_WIDTH: i32 = 100;
/// Canonical card height every later stage relies on
pub const CANONICAL_HEIGHT: i32 = 140;

/// One card cropped from a region and resized to the canonical size
#[derive(Debug, Clone)]
pub struct CardCandidate {
    pub image: Mat,
    /// Left edge in the source region, used for ordering
    pub x_offset: i32,
    /// Crop rectangle in the source region
    pub source: BBox,
}

impl CardCandidate {
    /// Crop `bbox` out of `region` and normalize it to 100x140
    pub fn from_region(region: &Mat, bbox: BBox) -> Result<Self> {
        let crop = ImageUtils::crop(region, &bbox)?;
        let image = ImageUtils::resize_exact(&crop, CANONICAL_WIDTH, CANONICAL_HEIGHT)?;
        Ok(Self {
            image,
            x_offset: bbox.x,
            source: bbox,
        })
    }

    /// Wrap an image that is already a single card
    pub fn from_card_image(card: &Mat) -> Result<Self> {
        let bbox = BBox::new(0, 0, card.cols(), card.rows());
        Self::from_region(card, bbox)
    }
}

/// Common contract of every segmentation approach
pub trait SegmentationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cards found in `region`, ordered by ascending x offset
    fn segment(&self, region: &Mat) -> Result<Vec<CardCandidate>>;
}

/// Serializable description of a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyKind {
    /// Bright external contours with both sides above `min_size`;
    /// `morphology_kernel` adds a close+open pass first
    Contours {
        threshold: f64,
        min_size: i32,
        morphology_kernel: Option<i32>,
    },
    /// The `count` largest bright contours regardless of size
    LargestContours { threshold: f64, count: usize },
    /// Fixed geometric split into two cards
    Split { split: SplitKind },
}

impl StrategyKind {
    pub fn contours() -> Self {
        StrategyKind::Contours {
            threshold: 200.0,
            min_size: 50,
            morphology_kernel: None,
        }
    }

    pub fn morphological_contours() -> Self {
        StrategyKind::Contours {
            threshold: 200.0,
            min_size: 50,
            morphology_kernel: Some(5),
        }
    }

    pub fn build(&self) -> Box<dyn SegmentationStrategy> {
        match self {
            StrategyKind::Contours {
                threshold,
                min_size,
                morphology_kernel,
            } => Box::new(ContourSegmenter {
                threshold: *threshold,
                min_size: *min_size,
                morphology_kernel: *morphology_kernel,
            }),
            StrategyKind::LargestContours { threshold, count } => {
                Box::new(LargestContoursSegmenter {
                    threshold: *threshold,
                    count: *count,
                })
            }
            StrategyKind::Split { split } => Box::new(GeometricSplit::new(*split)),
        }
    }
}

/// Primary strategy, optional fallback and the card count that decides
/// between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationPlan {
    pub primary: StrategyKind,
    pub fallback: Option<StrategyKind>,
    pub expected_cards: Option<usize>,
}

impl SegmentationPlan {
    /// Community strip: plain contours, any number of cards
    pub fn community() -> Self {
        Self {
            primary: StrategyKind::contours(),
            fallback: None,
            expected_cards: None,
        }
    }

    /// Two-card hand: merged contours, else the asymmetric hole-card split
    pub fn hand() -> Self {
        Self {
            primary: StrategyKind::morphological_contours(),
            fallback: Some(StrategyKind::Split {
                split: SplitKind::asymmetric(),
            }),
            expected_cards: Some(2),
        }
    }

    pub fn build(&self) -> SegmentationPolicy {
        let policy = SegmentationPolicy::new(self.primary.build());
        match (&self.fallback, self.expected_cards) {
            (Some(fallback), Some(expected)) => policy.with_fallback(fallback.build(), expected),
            _ => policy,
        }
    }
}

/// Runs the primary strategy, falling back when the count is off
pub struct SegmentationPolicy {
    primary: Box<dyn SegmentationStrategy>,
    fallback: Option<Box<dyn SegmentationStrategy>>,
    expected_cards: Option<usize>,
}

impl SegmentationPolicy {
    pub fn new(primary: Box<dyn SegmentationStrategy>) -> Self {
        Self {
            primary,
            fallback: None,
            expected_cards: None,
        }
    }

    /// Swap in `fallback` whenever the primary does not find `expected_cards`
    pub fn with_fallback(
        mut self,
        fallback: Box<dyn SegmentationStrategy>,
        expected_cards: usize,
    ) -> Self {
        self.fallback = Some(fallback);
        self.expected_cards = Some(expected_cards);
        self
    }

    pub fn segment(&self, region: &Mat) -> Result<Vec<CardCandidate>> {
        let mut cards = self.primary.segment(region)?;
        debug!("{} segmentation found {} card(s)", self.primary.name(), cards.len());

        if let (Some(expected), Some(fallback)) = (self.expected_cards, &self.fallback) {
            if cards.len() != expected {
                info!(
                    "{} found {} card(s), expected {}; falling back to {}",
                    self.primary.name(),
                    cards.len(),
                    expected,
                    fallback.name()
                );
                cards = fallback.segment(region)?;
            }
        }

        cards.sort_by_key(|c| c.x_offset);
        Ok(cards)
    }
}
