//! Per-card resolution: glyphs → rank score → suit verdict → label
//!
//! A card walks `Segmented → GlyphsExtracted → RankScored → SuitScored` and
//! ends `Resolved` or `Unresolved`. Falling short of a threshold is a normal
//! outcome and is reported as an unresolved slot, never as an error.

use crate::segment::CardCandidate;
use crate::suit::{SuitClassifier, SuitConfig, SuitStrategy, SuitVerdict};
use crate::symbol::{SymbolConfig, SymbolExtractor, SymbolPair};
use crate::template::{MatchOutcome, MatcherConfig, TemplateMatcher, TemplateSet};
use crate::Result;
use pokerlens_core::{Card, IdentifiedCard, Rank, UnresolvedReason};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which suit evidence a region is resolved with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverFlow {
    /// Four-colour vote on the suit glyph, gated by a suit confidence
    Baseline,
    /// Red/black vote on the whole card (suit glyph for aces), gated by the
    /// rank confidence only
    Improved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Rank similarity must exceed this
    pub rank_threshold: f64,
    /// Baseline suit similarity must exceed this
    pub suit_threshold: f64,
    /// Re-derive J/Q/K suits from the whole card
    pub face_card_correction: bool,
    /// In the improved flow, classify an ace from its suit glyph
    pub ace_uses_suit_glyph: bool,
    pub community_flow: ResolverFlow,
    pub hand_flow: ResolverFlow,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            rank_threshold: 0.6,
            suit_threshold: 0.5,
            face_card_correction: true,
            ace_uses_suit_glyph: true,
            community_flow: ResolverFlow::Baseline,
            hand_flow: ResolverFlow::Improved,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStage {
    Segmented,
    GlyphsExtracted,
    RankScored,
    SuitScored,
    Resolved,
    Unresolved,
}

/// Final label plus the intermediate evidence that produced it
#[derive(Debug, Clone)]
pub struct Resolution {
    pub card: IdentifiedCard,
    /// Last stage reached before the terminal state
    pub reached: CardStage,
    pub symbols: Option<SymbolPair>,
    pub rank: Option<MatchOutcome<Rank>>,
    pub suit: Option<SuitVerdict>,
    /// Thresholded suit similarity (baseline flow only)
    pub suit_confidence: Option<f64>,
    /// Suit replaced by the face-card rule
    pub face_corrected: bool,
}

impl Resolution {
    fn unresolved(reached: CardStage, reason: UnresolvedReason) -> Self {
        Self {
            card: IdentifiedCard::unresolved(reason),
            reached,
            symbols: None,
            rank: None,
            suit: None,
            suit_confidence: None,
            face_corrected: false,
        }
    }

    pub fn stage(&self) -> CardStage {
        if self.card.is_resolved() {
            CardStage::Resolved
        } else {
            CardStage::Unresolved
        }
    }
}

pub struct CardResolver {
    extractor: SymbolExtractor,
    matcher: TemplateMatcher,
    classifier: SuitClassifier,
    config: ResolverConfig,
}

impl CardResolver {
    pub fn new(
        symbols: SymbolConfig,
        matcher: MatcherConfig,
        suit: SuitConfig,
        config: ResolverConfig,
    ) -> Self {
        Self {
            extractor: SymbolExtractor::new(symbols),
            matcher: TemplateMatcher::new(matcher),
            classifier: SuitClassifier::new(suit),
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Identify one canonical card. Same inputs always give the same result.
    pub fn resolve(
        &self,
        candidate: &CardCandidate,
        templates: &TemplateSet,
        flow: ResolverFlow,
    ) -> Result<Resolution> {
        let Some(symbols) = self.extractor.extract(&candidate.image)? else {
            debug!("Card at x={} -> unresolved: no glyph", candidate.x_offset);
            return Ok(Resolution::unresolved(CardStage::Segmented, UnresolvedReason::NoGlyph));
        };

        let rank_match = self.matcher.match_rank(&symbols.rank_glyph, templates)?;
        let mut resolution = Resolution {
            card: IdentifiedCard::unresolved(UnresolvedReason::NoRankMatch),
            reached: CardStage::RankScored,
            symbols: None,
            rank: Some(rank_match),
            suit: None,
            suit_confidence: None,
            face_corrected: false,
        };

        let Some(rank) = rank_match.label else {
            debug!("Card at x={} -> unresolved: no rank template fits", candidate.x_offset);
            resolution.symbols = Some(symbols);
            return Ok(resolution);
        };

        let (verdict, suit_confidence) = match flow {
            ResolverFlow::Baseline => {
                let verdict = self
                    .classifier
                    .classify(&symbols.suit_glyph, SuitStrategy::FourColor)?;
                let confidence = if templates.suit_count() > 0 {
                    self.matcher.suit_similarity(&symbols.suit_glyph, templates)?.confidence
                } else {
                    verdict.vote_share()
                };
                (verdict, Some(confidence))
            }
            ResolverFlow::Improved => {
                let source = if rank.is_ace() && self.config.ace_uses_suit_glyph {
                    &symbols.suit_glyph
                } else {
                    &candidate.image
                };
                (self.classifier.classify(source, SuitStrategy::RedBlack)?, None)
            }
        };
        resolution.reached = CardStage::SuitScored;
        resolution.suit_confidence = suit_confidence;

        let mut suit = verdict.suit;
        resolution.suit = Some(verdict);

        if rank_match.confidence <= self.config.rank_threshold {
            resolution.card = IdentifiedCard::unresolved(UnresolvedReason::RankBelowThreshold);
        } else if suit_confidence.is_some_and(|c| c <= self.config.suit_threshold) {
            resolution.card = IdentifiedCard::unresolved(UnresolvedReason::SuitBelowThreshold);
        } else {
            // Face cards: read the whole card red/black. The improved flow
            // already did exactly that for non-aces.
            let correct_face = self.config.face_card_correction && flow == ResolverFlow::Baseline;
            if rank.is_face() && correct_face {
                let corrected = self
                    .classifier
                    .classify(&candidate.image, SuitStrategy::RedBlack)?
                    .suit;
                resolution.face_corrected = corrected != suit;
                suit = corrected;
            }
            let confidence = suit_confidence
                .map_or(rank_match.confidence, |c| c.min(rank_match.confidence));
            resolution.card = IdentifiedCard::resolved(Card::new(rank, suit), confidence);
        }

        debug!(
            "Card at x={} -> {} (rank {} {:.3}, flow {:?})",
            candidate.x_offset, resolution.card, rank, rank_match.confidence, flow
        );
        resolution.symbols = Some(symbols);
        Ok(resolution)
    }
}

impl Default for CardResolver {
    fn default() -> Self {
        Self::new(
            SymbolConfig::default(),
            MatcherConfig::default(),
            SuitConfig::default(),
            ResolverConfig::default(),
        )
    }
}
