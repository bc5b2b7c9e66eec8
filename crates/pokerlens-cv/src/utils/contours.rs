//! External contour extraction on binary masks

use crate::bbox::BBox;
use crate::Result;
use anyhow::Context;
use opencv::{
    core::{self, Mat, Point, Scalar},
    imgproc,
    prelude::*,
};

/// Bounding box and enclosed area of one external contour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    pub bbox: BBox,
    pub area: f64,
}

pub struct ContourUtils;

impl ContourUtils {
    /// External contours of a binary mask (non-zero = foreground), in
    /// OpenCV's discovery order
    pub fn external_blobs(binary: &Mat) -> Result<Vec<Blob>> {
        let mut contours = core::Vector::<core::Vector<Point>>::new();
        imgproc::find_contours(
            binary,
            &mut contours,
            imgproc::RETR_EXTERNAL,
            imgproc::CHAIN_APPROX_SIMPLE,
            Point::new(0, 0),
        )
        .context("Contour extraction failed")?;

        let mut blobs = Vec::with_capacity(contours.len());
        for contour in contours.iter() {
            let rect = imgproc::bounding_rect(&contour)?;
            let area = imgproc::contour_area(&contour, false)?;
            blobs.push(Blob {
                bbox: BBox::from_rect(rect),
                area,
            });
        }

        Ok(blobs)
    }

    /// Contour with the largest enclosed area; earlier contours win ties
    pub fn largest_blob(binary: &Mat) -> Result<Option<Blob>> {
        let blobs = Self::external_blobs(binary)?;
        Ok(blobs.into_iter().fold(None, |best: Option<Blob>, blob| match best {
            Some(b) if b.area >= blob.area => Some(b),
            _ => Some(blob),
        }))
    }

    /// Morphological close followed by open with a square kernel, merging
    /// fragmented outlines and dropping specks
    pub fn close_open(binary: &Mat, kernel_size: i32) -> Result<Mat> {
        let kernel = Mat::new_rows_cols_with_default(
            kernel_size,
            kernel_size,
            core::CV_8UC1,
            Scalar::all(1.0),
        )?;
        let anchor = Point::new(-1, -1);
        let border_value = imgproc::morphology_default_border_value()?;

        let mut closed = Mat::default();
        imgproc::morphology_ex(
            binary,
            &mut closed,
            imgproc::MORPH_CLOSE,
            &kernel,
            anchor,
            1,
            core::BORDER_CONSTANT,
            border_value,
        )
        .context("Morphological close failed")?;

        let mut opened = Mat::default();
        imgproc::morphology_ex(
            &closed,
            &mut opened,
            imgproc::MORPH_OPEN,
            &kernel,
            anchor,
            1,
            core::BORDER_CONSTANT,
            border_value,
        )
        .context("Morphological open failed")?;

        Ok(opened)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ImageUtils;

    fn paint(mat: &mut Mat, bbox: BBox, value: u8) -> Result<()> {
        for y in bbox.y..bbox.bottom() {
            for x in bbox.x..bbox.right() {
                *mat.at_2d_mut::<u8>(y, x)? = value;
            }
        }
        Ok(())
    }

    #[test]
    fn test_blobs_report_bounding_boxes() -> Result<()> {
        let mut mask = ImageUtils::filled_gray(100, 60, 0)?;
        paint(&mut mask, BBox::new(5, 5, 20, 30), 255)?;
        paint(&mut mask, BBox::new(50, 10, 10, 10), 255)?;

        let mut boxes: Vec<BBox> = ContourUtils::external_blobs(&mask)?
            .into_iter()
            .map(|b| b.bbox)
            .collect();
        boxes.sort_by_key(|b| b.x);

        assert_eq!(boxes, vec![BBox::new(5, 5, 20, 30), BBox::new(50, 10, 10, 10)]);
        Ok(())
    }

    #[test]
    fn test_largest_blob_on_empty_mask() -> Result<()> {
        let mask = ImageUtils::filled_gray(30, 30, 0)?;
        assert!(ContourUtils::largest_blob(&mask)?.is_none());
        Ok(())
    }

    #[test]
    fn test_close_bridges_thin_gap() -> Result<()> {
        let mut mask = ImageUtils::filled_gray(80, 40, 0)?;
        paint(&mut mask, BBox::new(5, 5, 30, 30), 255)?;
        paint(&mut mask, BBox::new(37, 5, 30, 30), 255)?;

        assert_eq!(ContourUtils::external_blobs(&mask)?.len(), 2);
        let merged = ContourUtils::close_open(&mask, 5)?;
        assert_eq!(ContourUtils::external_blobs(&merged)?.len(), 1);
        Ok(())
    }
}
