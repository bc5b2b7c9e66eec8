//! Multi-scale template matching of a glyph against labelled templates

use super::{GlyphTemplate, MatchingMethod, MatcherConfig, TemplateSet};
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use opencv::{
    core::{self, Mat, Size},
    imgproc,
    prelude::*,
};
use pokerlens_core::{Rank, Suit};
use std::fmt::Display;
use tracing::{debug, warn};

/// Best template for a glyph. `label` is `None` when no template fitted the
/// glyph at any scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOutcome<L> {
    pub label: Option<L>,
    /// Similarity in [0, 1], higher is better
    pub confidence: f64,
    pub scale: f64,
}

impl<L> MatchOutcome<L> {
    pub fn none() -> Self {
        Self {
            label: None,
            confidence: 0.0,
            scale: 0.0,
        }
    }
}

/// Running best (label, scale, similarity) across a sweep
struct Best<L> {
    label: L,
    token: String,
    scale: f64,
    score: f64,
}

/// OpenCV-based multi-scale template matcher
pub struct TemplateMatcher {
    config: MatcherConfig,
    scales: Vec<f64>,
}

impl TemplateMatcher {
    /// Create new template matcher
    pub fn new(config: MatcherConfig) -> Self {
        let scales = config.scale_factors();
        Self { config, scales }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Rank glyph against the rank templates with the configured method
    pub fn match_rank(&self, glyph: &Mat, templates: &TemplateSet) -> Result<MatchOutcome<Rank>> {
        self.best_match(glyph, templates.ranks(), self.config.method)
    }

    /// Best suit-template similarity over every matching method, with
    /// squared-difference scores mapped onto a similarity scale
    pub fn suit_similarity(
        &self,
        glyph: &Mat,
        templates: &TemplateSet,
    ) -> Result<MatchOutcome<Suit>> {
        let mut best = MatchOutcome::none();
        for method in MatchingMethod::ALL {
            let outcome = self.best_match(glyph, templates.suits(), method)?;
            let improves = best.label.is_none() || outcome.confidence > best.confidence;
            if outcome.label.is_some() && improves {
                best = outcome;
            }
        }
        Ok(best)
    }

    /// Sweep every template across every scale and keep the single best
    /// score. Exact ties go to the lexicographically smaller label token.
    pub fn best_match<L: Copy + Display>(
        &self,
        glyph: &Mat,
        templates: &[GlyphTemplate<L>],
        method: MatchingMethod,
    ) -> Result<MatchOutcome<L>> {
        let search = ImageUtils::to_gray(glyph)?;
        let (search_w, search_h) = (search.cols(), search.rows());
        let mut best: Option<Best<L>> = None;

        for template in templates {
            let token = template.label.to_string();

            for &scale in &self.scales {
                let scaled = match self.scale_template(&template.image, scale) {
                    Ok(Some(scaled)) => scaled,
                    Ok(None) => continue,
                    Err(e) => {
                        warn!("Skipping template {} at scale {:.3}: {:#}", token, scale, e);
                        continue;
                    }
                };

                // Template must fit inside the search image
                if scaled.cols() > search_w || scaled.rows() > search_h {
                    continue;
                }

                let score = match self.score_single_scale(&search, &scaled, method) {
                    Ok(score) => score,
                    Err(e) => {
                        warn!(
                            "Match failed for template {} at scale {:.3} \
                             (glyph {}x{}, template {}x{}): {:#}",
                            token,
                            scale,
                            search_w,
                            search_h,
                            scaled.cols(),
                            scaled.rows(),
                            e
                        );
                        continue;
                    }
                };

                if !score.is_finite() {
                    continue;
                }

                let better = match &best {
                    None => true,
                    Some(b) => score > b.score || (score == b.score && token < b.token),
                };
                if better {
                    best = Some(Best {
                        label: template.label,
                        token: token.clone(),
                        scale,
                        score,
                    });
                }
            }
        }

        Ok(match best {
            Some(b) => {
                debug!(
                    "Best {:?} match: {} at scale {:.3} (score {:.3})",
                    method, b.token, b.scale, b.score
                );
                MatchOutcome {
                    label: Some(b.label),
                    confidence: b.score.clamp(0.0, 1.0),
                    scale: b.scale,
                }
            }
            None => MatchOutcome::none(),
        })
    }

    /// Best similarity of one template placed anywhere in the search image
    fn score_single_scale(
        &self,
        search: &Mat,
        template: &Mat,
        method: MatchingMethod,
    ) -> Result<f64> {
        let mut result = Mat::default();
        imgproc::match_template(
            search,
            template,
            &mut result,
            method.to_opencv(),
            &core::no_array(),
        )
        .context("Template matching failed")?;

        let mut min_val = 0.0;
        let mut max_val = 0.0;
        core::min_max_loc(
            &result,
            Some(&mut min_val),
            Some(&mut max_val),
            None,
            None,
            &core::no_array(),
        )?;

        let raw = if method.is_inverted() { min_val } else { max_val };
        Ok(method.similarity(raw))
    }

    /// Resize a template by `scale`; `None` when it collapses to nothing
    pub(crate) fn scale_template(&self, template: &Mat, scale: f64) -> Result<Option<Mat>> {
        let original_size = template.size()?;
        let new_width = (original_size.width as f64 * scale).round() as i32;
        let new_height = (original_size.height as f64 * scale).round() as i32;
        if new_width < 1 || new_height < 1 {
            return Ok(None);
        }

        let mut scaled = Mat::default();
        imgproc::resize(
            template,
            &mut scaled,
            Size::new(new_width, new_height),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )?;

        Ok(Some(scaled))
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new(MatcherConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::template::GlyphTemplate;

    /// Connected glyph: a frame with a rank-specific bar pattern
    fn glyph(bars: &[(i32, i32, i32, i32)]) -> Result<Mat> {
        let mut mat = ImageUtils::filled_gray(16, 22, 255)?;
        let mut fill = |b: BBox| -> Result<()> {
            for y in b.y..b.bottom() {
                for x in b.x..b.right() {
                    *mat.at_2d_mut::<u8>(y, x)? = 0;
                }
            }
            Ok(())
        };
        fill(BBox::new(0, 0, 16, 2))?;
        fill(BBox::new(0, 0, 2, 22))?;
        for &(x, y, w, h) in bars {
            fill(BBox::new(x, y, w, h))?;
        }
        Ok(mat)
    }

    fn library() -> Result<TemplateSet> {
        Ok(TemplateSet::new()
            .with_rank(GlyphTemplate::new(Rank::Ace, glyph(&[(2, 9, 12, 3)])?))
            .with_rank(GlyphTemplate::new(Rank::King, glyph(&[(11, 2, 3, 18), (2, 18, 9, 3)])?))
            .with_rank(GlyphTemplate::new(Rank::Ten, glyph(&[(6, 4, 3, 16)])?)))
    }

    fn pad(mat: &Mat, margin: i32) -> Result<Mat> {
        let mut padded = Mat::default();
        core::copy_make_border(
            mat,
            &mut padded,
            margin,
            margin,
            margin,
            margin,
            core::BORDER_CONSTANT,
            core::Scalar::all(255.0),
        )?;
        Ok(padded)
    }

    #[test]
    fn test_exact_scaled_template_is_recovered() -> Result<()> {
        let templates = library()?;
        let matcher = TemplateMatcher::default();
        let scales = matcher.config().scale_factors();
        assert_eq!(scales.len(), 30);

        for template in templates.ranks() {
            for &scale in &scales {
                let scaled = matcher
                    .scale_template(&template.image, scale)?
                    .expect("non-empty scaled template");
                let search = pad(&scaled, 4)?;

                let outcome = matcher.match_rank(&search, &templates)?;
                assert_eq!(
                    outcome.label,
                    Some(template.label),
                    "{} at scale {}",
                    template.label,
                    scale
                );
                assert!(
                    outcome.confidence >= 0.99,
                    "{} at scale {}: confidence {}",
                    template.label,
                    scale,
                    outcome.confidence
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_oversized_templates_are_skipped() -> Result<()> {
        let templates = library()?;
        let matcher = TemplateMatcher::default();
        let tiny = ImageUtils::filled_gray(6, 6, 255)?;

        let outcome = matcher.match_rank(&tiny, &templates)?;
        assert_eq!(outcome.label, None);
        assert_eq!(outcome.confidence, 0.0);
        Ok(())
    }

    #[test]
    fn test_equal_scores_break_ties_by_token() -> Result<()> {
        let shape = glyph(&[(2, 9, 12, 3)])?;
        let templates = TemplateSet::new()
            .with_rank(GlyphTemplate::new(Rank::King, shape.clone()))
            .with_rank(GlyphTemplate::new(Rank::Ace, shape.clone()));
        let search = pad(&shape, 4)?;

        let outcome = TemplateMatcher::default().match_rank(&search, &templates)?;
        assert_eq!(outcome.label, Some(Rank::Ace));
        Ok(())
    }
}
