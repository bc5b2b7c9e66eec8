//! Table capture parsing using pokerlens-cv

use crate::table::TableLayout;
use anyhow::Context;
use pokerlens_core::{AnalysisResult, RegionReport};
use pokerlens_cv::{AnalysisConfig, CardAnalyzer, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Build an analyzer from an optional JSON config plus command-line overrides
pub fn build_analyzer(
    config_path: Option<&Path>,
    templates: Option<PathBuf>,
    diagnostics: Option<PathBuf>,
) -> Result<CardAnalyzer> {
    let mut config = match config_path {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(dir) = templates {
        config.template_dir = dir;
    }
    if diagnostics.is_some() {
        config.diagnostics_dir = diagnostics;
    }
    info!(
        "Templates from {:?}, diagnostics {}",
        config.template_dir,
        config
            .diagnostics_dir
            .as_ref()
            .map_or("off".to_string(), |d| format!("under {:?}", d))
    );
    CardAnalyzer::from_config(config)
}

/// Crop a full-table capture with `layout` and read both regions
pub fn parse_table_capture<P: AsRef<Path>>(
    analyzer: &CardAnalyzer,
    layout: &TableLayout,
    capture_path: P,
) -> Result<AnalysisResult> {
    let capture = image::open(capture_path.as_ref())
        .with_context(|| format!("Failed to open capture: {:?}", capture_path.as_ref()))?
        .to_rgb8();

    let (community, hand) = layout.split(&capture);
    Ok(analyzer.analyze_images(&community, &hand))
}

/// `a_spades k_hearts ?` style line; `?` marks an unresolved slot
pub fn format_region(report: &RegionReport) -> String {
    if let Some(reason) = &report.failure {
        return format!("failed ({})", reason);
    }
    report
        .labels()
        .into_iter()
        .map(|label| label.unwrap_or_else(|| "?".to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn print_result(source: &str, result: &AnalysisResult) {
    println!("{} [run {}]", source, result.run_id);
    println!("  community: {}", format_region(&result.community));
    println!("  hand:      {}", format_region(&result.hand));
    println!(
        "  resolved {}/{} in {}ms",
        result.stats.cards_resolved, result.stats.cards_segmented, result.stats.processing_time_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokerlens_core::{Card, IdentifiedCard, Rank, RegionKind, Suit, UnresolvedReason};

    #[test]
    fn test_format_region_marks_unresolved_slots() {
        let report = RegionReport::new(
            RegionKind::Community,
            vec![
                IdentifiedCard::resolved(Card::new(Rank::Queen, Suit::Clubs), 0.9),
                IdentifiedCard::unresolved(UnresolvedReason::RankBelowThreshold),
            ],
        );
        assert_eq!(format_region(&report), "q_clubs ?");
        assert_eq!(
            format_region(&RegionReport::failed(RegionKind::Hand, "unreadable")),
            "failed (unreadable)"
        );
    }
}
