//! Fixed geometric split of a two-card hand region

use super::{CardCandidate, SegmentationStrategy};
use crate::bbox::BBox;
use crate::Result;
use anyhow::bail;
use opencv::{core::Mat, prelude::*};
use serde::{Deserialize, Serialize};

/// Where to cut a two-card region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitKind {
    /// Two equal halves
    Midpoint,
    /// Cut at `fraction` of the width, then keep only the left half of the
    /// right part to isolate the partly hidden hole card
    Asymmetric { fraction: f64 },
}

impl SplitKind {
    pub fn asymmetric() -> Self {
        SplitKind::Asymmetric { fraction: 0.44 }
    }

    /// Left and right card boxes for a region of the given size
    pub fn boxes(&self, width: i32, height: i32) -> (BBox, BBox) {
        match *self {
            SplitKind::Midpoint => {
                let mid = width / 2;
                (BBox::new(0, 0, mid, height), BBox::from_corners(mid, 0, width, height))
            }
            SplitKind::Asymmetric { fraction } => {
                let split = (width as f64 * fraction) as i32;
                let right_width = (width - split) / 2;
                (BBox::new(0, 0, split, height), BBox::new(split, 0, right_width, height))
            }
        }
    }
}

/// Deterministic two-card segmentation; always yields exactly two cards
#[derive(Debug, Clone)]
pub struct GeometricSplit {
    kind: SplitKind,
}

impl GeometricSplit {
    pub fn new(kind: SplitKind) -> Self {
        Self { kind }
    }
}

impl SegmentationStrategy for GeometricSplit {
    fn name(&self) -> &'static str {
        match self.kind {
            SplitKind::Midpoint => "midpoint-split",
            SplitKind::Asymmetric { .. } => "asymmetric-split",
        }
    }

    fn segment(&self, region: &Mat) -> Result<Vec<CardCandidate>> {
        let (left, right) = self.kind.boxes(region.cols(), region.rows());
        if left.is_empty() || right.is_empty() {
            bail!(
                "{}x{} region is too small to split into two cards",
                region.cols(),
                region.rows()
            );
        }

        Ok(vec![
            CardCandidate::from_region(region, left)?,
            CardCandidate::from_region(region, right)?,
        ])
    }
}
