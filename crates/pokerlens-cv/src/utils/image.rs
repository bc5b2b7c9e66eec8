//! Image processing utilities: conversions, crops and resizing

use crate::bbox::BBox;
use crate::Result;
use anyhow::{Context, bail};
use opencv::{
    core::{self, CV_8U, CV_8UC1, Mat, Scalar, Size},
    imgcodecs, imgproc,
    prelude::*,
};
use opencv_match::prelude::*;
use std::path::Path;

/// Image utility functions shared by every pipeline stage
pub struct ImageUtils;

impl ImageUtils {
    /// Load image as single-channel 8-bit Mat using opencv-match
    pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let img = image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?
            .to_rgba8();

        let gray = opencv_match::convert::mat_to_grayscale(&img.try_into_cv()?, true)
            .context("Failed to convert image to grayscale")?;

        let mut gray_8u = Mat::default();
        gray.convert_to(&mut gray_8u, CV_8U, 1.0, 0.0)?;
        Ok(gray_8u)
    }

    /// Load image as a BGR Mat
    pub fn load_color<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let img = image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?
            .to_rgb8();

        Self::rgb_to_mat(&img)
    }

    /// Save Mat as image
    pub fn save_image<P: AsRef<Path>>(mat: &Mat, path: P) -> Result<()> {
        let path_str = path.as_ref().to_string_lossy();

        imgcodecs::imwrite(&path_str, mat, &core::Vector::new())
            .with_context(|| format!("Failed to save image: {}", path_str))?;

        Ok(())
    }

    /// Convert image::RgbImage to a BGR Mat, the channel order imgproc expects
    pub fn rgb_to_mat(rgb_image: &image::RgbImage) -> Result<Mat> {
        let rgb: Mat = rgb_image
            .try_into_cv()
            .context("Failed to convert RGB image to OpenCV Mat")?;

        let mut bgr = Mat::default();
        imgproc::cvt_color_def(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR)
            .context("RGB to BGR conversion failed")?;
        Ok(bgr)
    }

    /// Convert a BGR Mat back to image::RgbImage
    pub fn mat_to_rgb(mat: &Mat) -> Result<image::RgbImage> {
        let bgr = Self::to_bgr(mat)?;
        let mut rgb = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB)
            .context("BGR to RGB conversion failed")?;

        rgb.try_into_cv()
            .context("Failed to convert OpenCV Mat to RGB image")
    }

    /// Grayscale copy of a BGR or already single-channel Mat
    pub fn to_gray(mat: &Mat) -> Result<Mat> {
        match mat.channels() {
            1 => Ok(mat.try_clone()?),
            3 => {
                let mut gray = Mat::default();
                imgproc::cvt_color_def(mat, &mut gray, imgproc::COLOR_BGR2GRAY)
                    .context("BGR to grayscale conversion failed")?;
                Ok(gray)
            }
            4 => {
                let mut gray = Mat::default();
                imgproc::cvt_color_def(mat, &mut gray, imgproc::COLOR_BGRA2GRAY)
                    .context("BGRA to grayscale conversion failed")?;
                Ok(gray)
            }
            n => bail!("Unsupported channel count for grayscale conversion: {}", n),
        }
    }

    /// Three-channel BGR copy of a gray, BGR or BGRA Mat
    pub fn to_bgr(mat: &Mat) -> Result<Mat> {
        let code = match mat.channels() {
            3 => return Ok(mat.try_clone()?),
            1 => imgproc::COLOR_GRAY2BGR,
            4 => imgproc::COLOR_BGRA2BGR,
            n => bail!("Unsupported channel count for BGR conversion: {}", n),
        };
        let mut bgr = Mat::default();
        imgproc::cvt_color_def(mat, &mut bgr, code).context("BGR conversion failed")?;
        Ok(bgr)
    }

    /// HSV copy of a BGR Mat (8-bit hue spans 0..180)
    pub fn to_hsv(mat: &Mat) -> Result<Mat> {
        let bgr = Self::to_bgr(mat)?;
        let mut hsv = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut hsv, imgproc::COLOR_BGR2HSV)
            .context("BGR to HSV conversion failed")?;
        Ok(hsv)
    }

    /// Fixed-level binarization. With `invert`, pixels at or below the level
    /// become foreground (dark ink on a light card face).
    pub fn binarize(gray: &Mat, level: f64, invert: bool) -> Result<Mat> {
        let kind = if invert {
            imgproc::THRESH_BINARY_INV
        } else {
            imgproc::THRESH_BINARY
        };
        let mut binary = Mat::default();
        imgproc::threshold(gray, &mut binary, level, 255.0, kind).context("Threshold failed")?;
        Ok(binary)
    }

    /// Owned copy of a sub-rectangle, clamped to the image bounds
    pub fn crop(mat: &Mat, bbox: &BBox) -> Result<Mat> {
        let clamped = bbox.clamp_to(mat.cols(), mat.rows());
        if clamped.is_empty() {
            bail!("Crop {:?} lies outside a {}x{} image", bbox, mat.cols(), mat.rows());
        }
        let roi = Mat::roi(mat, clamped.to_rect())?;
        Ok(roi.try_clone()?)
    }

    /// Resize to an exact width x height
    pub fn resize_exact(mat: &Mat, width: i32, height: i32) -> Result<Mat> {
        let mut resized = Mat::default();
        imgproc::resize(
            mat,
            &mut resized,
            Size::new(width, height),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )
        .with_context(|| format!("Resize to {}x{} failed", width, height))?;
        Ok(resized)
    }

    /// Solid single-channel image, mostly for synthetic fixtures
    pub fn filled_gray(width: i32, height: i32, value: u8) -> Result<Mat> {
        Ok(Mat::new_rows_cols_with_default(
            height,
            width,
            CV_8UC1,
            Scalar::all(value as f64),
        )?)
    }
}
