//! Region-to-labels orchestration

use super::config::AnalysisConfig;
use super::diagnostics::{Artifact, DiagnosticSink, DirectorySink, GlyphKind, NullSink, RunId};
use crate::bbox::BBox;
use crate::error::VisionError;
use crate::resolve::CardResolver;
use crate::segment::SegmentationPolicy;
use crate::template::{TemplateLoader, TemplateSet};
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use opencv::{core::Mat, prelude::*};
use pokerlens_core::{
    AnalysisResult, AnalysisStats, IdentifiedCard, RegionKind, RegionReport, UnresolvedReason,
};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Identifies the community and hand cards of a table capture
pub struct CardAnalyzer {
    config: AnalysisConfig,
    templates: TemplateSet,
    community: SegmentationPolicy,
    hand: SegmentationPolicy,
    resolver: CardResolver,
    sink: Box<dyn DiagnosticSink>,
}

impl CardAnalyzer {
    /// Analyzer over an already loaded template set, without diagnostics
    pub fn new(config: AnalysisConfig, templates: TemplateSet) -> Result<Self> {
        config.validate()?;
        if templates.rank_count() == 0 {
            warn!("Template set holds no rank templates; every card will be unresolved");
        }

        let resolver = CardResolver::new(
            config.symbols.clone(),
            config.matcher.clone(),
            config.suit.clone(),
            config.resolver.clone(),
        );

        Ok(Self {
            community: config.segmentation.community.build(),
            hand: config.segmentation.hand.build(),
            resolver,
            templates,
            sink: Box::new(NullSink),
            config,
        })
    }

    /// Load templates from `config.template_dir` and attach a directory sink
    /// when `config.diagnostics_dir` is set
    pub fn from_config(config: AnalysisConfig) -> Result<Self> {
        let templates = TemplateLoader::new()
            .add_template_dir(&config.template_dir)
            .load()
            .with_context(|| format!("Failed to load templates from {:?}", config.template_dir))?;

        let diagnostics = config.diagnostics_dir.clone();
        let analyzer = Self::new(config, templates)?;
        Ok(match diagnostics {
            Some(dir) => analyzer.with_diagnostics(Box::new(DirectorySink::new(dir))),
            None => analyzer,
        })
    }

    pub fn with_diagnostics(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Analyse two region image files. An unreadable file fails its own
    /// region only.
    pub fn analyze_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        community: P,
        hand: Q,
    ) -> AnalysisResult {
        let load = |path: &Path| -> Result<Mat> {
            ImageUtils::load_color(path).map_err(|e| {
                VisionError::UnreadableImage {
                    path: path.to_path_buf(),
                    reason: format!("{:#}", e),
                }
                .into()
            })
        };
        self.run(load(community.as_ref()), load(hand.as_ref()))
    }

    /// Analyse two in-memory region images
    pub fn analyze_images(
        &self,
        community: &image::RgbImage,
        hand: &image::RgbImage,
    ) -> AnalysisResult {
        self.run(ImageUtils::rgb_to_mat(community), ImageUtils::rgb_to_mat(hand))
    }

    /// Analyse two BGR region Mats
    pub fn analyze_mats(&self, community: &Mat, hand: &Mat) -> AnalysisResult {
        self.run(
            community.try_clone().map_err(Into::into),
            hand.try_clone().map_err(Into::into),
        )
    }

    /// Analyse many (community, hand) file pairs, in input order. With the
    /// `parallel` feature the pairs are spread over the rayon pool.
    pub fn analyze_batch<P: AsRef<Path> + Sync>(&self, pairs: &[(P, P)]) -> Vec<AnalysisResult> {
        let results: Vec<AnalysisResult>;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            results = pairs
                .par_iter()
                .map(|(community, hand)| self.analyze_files(community, hand))
                .collect();
        }

        #[cfg(not(feature = "parallel"))]
        {
            results = pairs
                .iter()
                .map(|(community, hand)| self.analyze_files(community, hand))
                .collect();
        }

        results
    }

    /// Identify the cards of one region
    pub fn analyze_region(
        &self,
        kind: RegionKind,
        region: &Mat,
        run: &RunId,
    ) -> Result<RegionReport> {
        if region.rows() == 0 || region.cols() == 0 {
            return Err(VisionError::EmptyRegion { kind }.into());
        }

        let policy = match kind {
            RegionKind::Community => &self.community,
            RegionKind::Hand => &self.hand,
        };
        let flow = self.config.flow(kind);
        let candidates = policy.segment(region)?;
        let diagnostics = self.sink.is_enabled();

        let mut cards = Vec::with_capacity(candidates.len());
        let mut annotated: Vec<(BBox, IdentifiedCard)> = Vec::new();

        for (index, candidate) in candidates.iter().enumerate() {
            if diagnostics {
                match ImageUtils::crop(region, &candidate.source) {
                    Ok(raw) => self.emit(run, Artifact::ExtractedCard { kind, index, image: &raw }),
                    Err(e) => warn!("Could not re-crop {} card {}: {:#}", kind, index, e),
                }
                self.emit(
                    run,
                    Artifact::ProcessedCard {
                        kind,
                        index,
                        image: &candidate.image,
                    },
                );
            }

            let card = match self.resolver.resolve(candidate, &self.templates, flow) {
                Ok(resolution) => {
                    if let Some(symbols) = resolution.symbols.as_ref().filter(|_| diagnostics) {
                        let glyphs = [
                            (GlyphKind::Rank, &symbols.rank_glyph),
                            (GlyphKind::Suit, &symbols.suit_glyph),
                        ];
                        for (glyph, image) in glyphs {
                            self.emit(run, Artifact::Symbol { kind, index, glyph, image });
                        }
                    }
                    resolution.card
                }
                Err(e) => {
                    warn!("{} card {} failed: {:#}", kind, index, e);
                    IdentifiedCard::unresolved(UnresolvedReason::ProcessingFailed)
                }
            };

            debug!("{} card {} -> {}", kind, index, card);
            if diagnostics {
                annotated.push((candidate.source, card.clone()));
            }
            cards.push(card);
        }

        if diagnostics {
            self.emit(
                run,
                Artifact::Region {
                    kind,
                    image: region,
                    cards: &annotated,
                },
            );
        }

        let report = RegionReport::new(kind, cards);
        info!(
            "{} region: {} card(s), {} resolved",
            kind,
            report.cards.len(),
            report.resolved_count()
        );
        Ok(report)
    }

    /// Export analysis results in JSON format
    pub fn export_json(&self, result: &AnalysisResult, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(result)
            .context("Failed to serialize analysis result")?;

        std::fs::write(output_path, json)
            .with_context(|| format!("Failed to write JSON to: {:?}", output_path))?;

        Ok(())
    }

    fn run(&self, community: Result<Mat>, hand: Result<Mat>) -> AnalysisResult {
        let start = Instant::now();
        let run = RunId::new();
        if let Err(e) = self.sink.begin_run(&run) {
            warn!("Could not prepare diagnostics for run {}: {:#}", run, e);
        }

        let community = self.contain(RegionKind::Community, community, &run);
        let hand = self.contain(RegionKind::Hand, hand, &run);

        let cards_segmented = community.cards.len() + hand.cards.len();
        let cards_resolved = community.resolved_count() + hand.resolved_count();
        let stats = AnalysisStats {
            cards_segmented,
            cards_resolved,
            cards_unresolved: cards_segmented - cards_resolved,
            processing_time_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Run {}: {}/{} card(s) resolved in {} ms",
            run, stats.cards_resolved, stats.cards_segmented, stats.processing_time_ms
        );

        AnalysisResult {
            run_id: run.to_string(),
            community,
            hand,
            stats,
        }
    }

    /// Turn a region-level failure into a failed report
    fn contain(&self, kind: RegionKind, region: Result<Mat>, run: &RunId) -> RegionReport {
        match region.and_then(|mat| self.analyze_region(kind, &mat, run)) {
            Ok(report) => report,
            Err(e) => {
                warn!("{} region aborted: {:#}", kind, e);
                RegionReport::failed(kind, format!("{:#}", e))
            }
        }
    }

    fn emit(&self, run: &RunId, artifact: Artifact<'_>) {
        if let Err(e) = self.sink.record(run, &artifact) {
            warn!("Diagnostic write failed for run {}: {:#}", run, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, BLUE, INK, RED};
    use image::RgbImage;
    use pokerlens_core::Rank;

    fn analyzer() -> Result<CardAnalyzer> {
        CardAnalyzer::new(
            AnalysisConfig::default(),
            fixtures::templates(&[Rank::Ace, Rank::King, Rank::Ten])?,
        )
    }

    fn community_strip() -> RgbImage {
        let mut img = RgbImage::from_pixel(360, 160, fixtures::FELT);
        fixtures::paint_card(&mut img, (10, 10), Rank::Ace, INK, false);
        fixtures::paint_card(&mut img, (130, 10), Rank::King, RED, true);
        fixtures::paint_card(&mut img, (250, 10), Rank::Ten, BLUE, false);
        img
    }

    #[test]
    fn test_community_strip_is_read_left_to_right() -> Result<()> {
        let hand = RgbImage::from_pixel(120, 90, fixtures::FELT);
        let result = analyzer()?.analyze_images(&community_strip(), &hand);

        assert_eq!(
            result.community.resolved_labels(),
            vec!["a_spades", "k_hearts", "10_diamonds"]
        );
        assert_eq!(result.hand.cards.len(), 2);
        assert_eq!(result.stats.cards_segmented, 5);
        assert_eq!(result.stats.cards_resolved, 3);
        Ok(())
    }

    #[test]
    fn test_hand_cards_take_their_suit_from_the_whole_card() -> Result<()> {
        let mut hand = RgbImage::from_pixel(240, 160, fixtures::FELT);
        fixtures::paint_card(&mut hand, (10, 10), Rank::King, RED, true);
        fixtures::paint_card(&mut hand, (130, 10), Rank::Ten, INK, true);
        let hand = ImageUtils::rgb_to_mat(&hand)?;

        let report = analyzer()?.analyze_region(RegionKind::Hand, &hand, &RunId::new())?;

        assert_eq!(
            report.labels(),
            vec![Some("k_hearts".to_string()), Some("10_spades".to_string())]
        );
        Ok(())
    }

    #[test]
    fn test_unreadable_file_fails_only_its_region() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let community = dir.path().join("community.png");
        community_strip().save(&community)?;

        let result = analyzer()?.analyze_files(&community, dir.path().join("missing.png"));

        assert!(result.hand.is_failed());
        assert!(result.hand.cards.is_empty());
        assert!(!result.community.is_failed());
        assert_eq!(result.community.resolved_count(), 3);
        Ok(())
    }

    #[test]
    fn test_empty_region_is_contained() -> Result<()> {
        let empty = Mat::default();
        let result = analyzer()?.analyze_mats(&empty, &empty);
        assert!(result.community.is_failed());
        assert!(result.hand.is_failed());
        assert_eq!(result.stats.cards_segmented, 0);
        Ok(())
    }

    #[test]
    fn test_diagnostics_land_in_run_directory() -> Result<()> {
        let root = tempfile::tempdir()?;
        let sink = DirectorySink::new(root.path());
        let analyzer = analyzer()?.with_diagnostics(Box::new(sink.clone()));

        let hand = RgbImage::from_pixel(120, 90, fixtures::FELT);
        let result = analyzer.analyze_images(&community_strip(), &hand);

        let run_dir = root.path().join(&result.run_id);
        assert!(run_dir.join("debug_png").join("community.png").is_file());
        assert!(run_dir.join("processed_cards").join("community_2.png").is_file());
        assert!(run_dir.join("processed_symbols").join("community_0_rank.png").is_file());
        Ok(())
    }

    #[test]
    fn test_export_json() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let analyzer = analyzer()?;
        let hand = RgbImage::from_pixel(120, 90, fixtures::FELT);
        let result = analyzer.analyze_images(&community_strip(), &hand);

        let path = dir.path().join("result.json");
        analyzer.export_json(&result, &path)?;
        let back: AnalysisResult = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(back, result);
        Ok(())
    }
}
