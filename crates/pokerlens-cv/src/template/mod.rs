//! Template library and multi-scale template matching

pub mod loader;
pub mod matcher;

pub use loader::TemplateLoader;
pub use matcher::{MatchOutcome, TemplateMatcher};

use opencv::core::Mat;
use pokerlens_core::{Rank, Suit};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::PathBuf;

/// One labelled single-channel reference glyph
#[derive(Debug, Clone)]
pub struct GlyphTemplate<L> {
    pub label: L,
    pub image: Mat,
    pub source: Option<PathBuf>,
}

impl<L> GlyphTemplate<L> {
    pub fn new(label: L, image: Mat) -> Self {
        Self {
            label,
            image,
            source: None,
        }
    }

    pub fn with_source(mut self, path: PathBuf) -> Self {
        self.source = Some(path);
        self
    }
}

/// Rank and suit reference glyphs for one analysis run.
///
/// Built once, then shared read-only by every matching call. Templates are
/// kept ordered by label token so iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    ranks: Vec<GlyphTemplate<Rank>>,
    suits: Vec<GlyphTemplate<Suit>>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a rank template
    pub fn with_rank(mut self, template: GlyphTemplate<Rank>) -> Self {
        insert_sorted(&mut self.ranks, template);
        self
    }

    /// Add or replace a suit template
    pub fn with_suit(mut self, template: GlyphTemplate<Suit>) -> Self {
        insert_sorted(&mut self.suits, template);
        self
    }

    pub fn ranks(&self) -> &[GlyphTemplate<Rank>] {
        &self.ranks
    }

    pub fn suits(&self) -> &[GlyphTemplate<Suit>] {
        &self.suits
    }

    pub fn rank_count(&self) -> usize {
        self.ranks.len()
    }

    pub fn suit_count(&self) -> usize {
        self.suits.len()
    }
}

fn insert_sorted<L: PartialEq + Display>(
    list: &mut Vec<GlyphTemplate<L>>,
    template: GlyphTemplate<L>,
) {
    list.retain(|t| t.label != template.label);
    let token = template.label.to_string();
    let pos = list
        .iter()
        .position(|t| t.label.to_string() > token)
        .unwrap_or(list.len());
    list.insert(pos, template);
}

/// Template matching metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchingMethod {
    /// Normalized cross-correlation
    CCorrNormed,
    /// Correlation coefficient (robust to linear lighting changes)
    CCoeffNormed,
    /// Squared difference (inverted: lower is better)
    SqDiffNormed,
}

impl MatchingMethod {
    pub const ALL: [MatchingMethod; 3] = [
        MatchingMethod::CCoeffNormed,
        MatchingMethod::CCorrNormed,
        MatchingMethod::SqDiffNormed,
    ];

    pub fn to_opencv(&self) -> i32 {
        use opencv::imgproc::*;
        match self {
            MatchingMethod::CCorrNormed => TM_CCORR_NORMED,
            MatchingMethod::CCoeffNormed => TM_CCOEFF_NORMED,
            MatchingMethod::SqDiffNormed => TM_SQDIFF_NORMED,
        }
    }

    pub fn is_inverted(&self) -> bool {
        matches!(self, MatchingMethod::SqDiffNormed)
    }

    /// Map a raw score onto "higher is better"
    pub fn similarity(&self, raw: f64) -> f64 {
        if self.is_inverted() { 1.0 - raw } else { raw }
    }
}

/// Multi-scale sweep settings. Defaults were tuned empirically on table
/// captures; treat them as data, not derived values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub scale_min: f64,
    pub scale_max: f64,
    pub scale_steps: usize,
    pub method: MatchingMethod,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            scale_min: 0.5,
            scale_max: 2.0,
            scale_steps: 30,
            method: MatchingMethod::CCoeffNormed,
        }
    }
}

impl MatcherConfig {
    /// Linearly spaced scale factors, both ends inclusive
    pub fn scale_factors(&self) -> Vec<f64> {
        match self.scale_steps {
            0 => Vec::new(),
            1 => vec![self.scale_min],
            n => {
                let step = (self.scale_max - self.scale_min) / (n - 1) as f64;
                (0..n).map(|i| self.scale_min + step * i as f64).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ImageUtils;
    use crate::Result;

    #[test]
    fn test_scale_factors_span_range() {
        let scales = MatcherConfig::default().scale_factors();

        assert_eq!(scales.len(), 30);
        assert!((scales[0] - 0.5).abs() < 1e-12);
        assert!((scales[29] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_templates_ordered_by_token() -> Result<()> {
        let glyph = ImageUtils::filled_gray(4, 4, 0)?;
        let set = TemplateSet::new()
            .with_rank(GlyphTemplate::new(Rank::King, glyph.clone()))
            .with_rank(GlyphTemplate::new(Rank::Ten, glyph.clone()))
            .with_rank(GlyphTemplate::new(Rank::Ace, glyph.clone()))
            .with_rank(GlyphTemplate::new(Rank::King, glyph));

        let labels: Vec<Rank> = set.ranks().iter().map(|t| t.label).collect();
        assert_eq!(labels, vec![Rank::Ten, Rank::Ace, Rank::King]);
        Ok(())
    }

    #[test]
    fn test_sqdiff_similarity_is_inverted() {
        assert_eq!(MatchingMethod::SqDiffNormed.similarity(0.25), 0.75);
        assert_eq!(MatchingMethod::CCoeffNormed.similarity(0.25), 0.25);
    }
}
