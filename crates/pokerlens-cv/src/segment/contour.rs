//! Contour-based card segmentation

use super::{CardCandidate, SegmentationStrategy};
use crate::utils::{ContourUtils, ImageUtils};
use crate::Result;
use opencv::core::Mat;

/// Card faces are near-white on a darker table: threshold, take external
/// contours, keep boxes larger than `min_size` on both sides.
#[derive(Debug, Clone)]
pub struct ContourSegmenter {
    pub threshold: f64,
    pub min_size: i32,
    /// Close+open kernel applied before contour extraction, merging
    /// fragmented outlines of overlapping hand cards
    pub morphology_kernel: Option<i32>,
}

impl SegmentationStrategy for ContourSegmenter {
    fn name(&self) -> &'static str {
        if self.morphology_kernel.is_some() {
            "morphological-contour"
        } else {
            "contour"
        }
    }

    fn segment(&self, region: &Mat) -> Result<Vec<CardCandidate>> {
        let gray = ImageUtils::to_gray(region)?;
        let mut binary = ImageUtils::binarize(&gray, self.threshold, false)?;
        if let Some(kernel) = self.morphology_kernel {
            binary = ContourUtils::close_open(&binary, kernel)?;
        }

        let mut cards = Vec::new();
        for blob in ContourUtils::external_blobs(&binary)? {
            if blob.bbox.exceeds(self.min_size) {
                cards.push(CardCandidate::from_region(region, blob.bbox)?);
            }
        }

        cards.sort_by_key(|c| c.x_offset);
        Ok(cards)
    }
}

/// Keeps the `count` largest bright contours by area, for tightly
/// overlapping cards where the size filter would reject partial outlines
#[derive(Debug, Clone)]
pub struct LargestContoursSegmenter {
    pub threshold: f64,
    pub count: usize,
}

impl SegmentationStrategy for LargestContoursSegmenter {
    fn name(&self) -> &'static str {
        "largest-contours"
    }

    fn segment(&self, region: &Mat) -> Result<Vec<CardCandidate>> {
        let gray = ImageUtils::to_gray(region)?;
        let binary = ImageUtils::binarize(&gray, self.threshold, false)?;

        let mut blobs = ContourUtils::external_blobs(&binary)?;
        blobs.sort_by(|a, b| b.area.total_cmp(&a.area));
        blobs.truncate(self.count);

        let mut cards = blobs
            .into_iter()
            .filter(|blob| !blob.bbox.is_empty())
            .map(|blob| CardCandidate::from_region(region, blob.bbox))
            .collect::<Result<Vec<_>>>()?;

        cards.sort_by_key(|c| c.x_offset);
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::fixtures::region_with_cards;

    #[test]
    fn test_small_blobs_are_filtered() -> Result<()> {
        let region = region_with_cards(
            300,
            150,
            &[BBox::new(10, 10, 80, 120), BBox::new(120, 10, 30, 30), BBox::new(200, 10, 70, 100)],
        )?;
        let segmenter = ContourSegmenter {
            threshold: 200.0,
            min_size: 50,
            morphology_kernel: None,
        };

        let cards = segmenter.segment(&region)?;
        let offsets: Vec<i32> = cards.iter().map(|c| c.x_offset).collect();
        assert_eq!(offsets, vec![10, 200]);
        Ok(())
    }

    #[test]
    fn test_largest_contours_keeps_biggest_two() -> Result<()> {
        let region = region_with_cards(
            300,
            150,
            &[BBox::new(10, 10, 40, 40), BBox::new(80, 10, 90, 120), BBox::new(200, 10, 60, 110)],
        )?;
        let segmenter = LargestContoursSegmenter {
            threshold: 200.0,
            count: 2,
        };

        let cards = segmenter.segment(&region)?;
        let offsets: Vec<i32> = cards.iter().map(|c| c.x_offset).collect();
        assert_eq!(offsets, vec![80, 200]);
        Ok(())
    }
}
