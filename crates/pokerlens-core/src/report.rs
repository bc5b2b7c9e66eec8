//! Analysis results handed to downstream game-state logic

use crate::cards::IdentifiedCard;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which table region a report describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Community,
    Hand,
}

impl RegionKind {
    pub fn name(&self) -> &'static str {
        match self {
            RegionKind::Community => "community",
            RegionKind::Hand => "hand",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered card slots for one region.
///
/// `failure` is set only when the whole region could not be analysed (e.g. the
/// image was unreadable); `cards` is then empty. A present slot whose card is
/// unresolved is a normal, per-card outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionReport {
    pub kind: RegionKind,
    pub cards: Vec<IdentifiedCard>,
    pub failure: Option<String>,
}

impl RegionReport {
    pub fn new(kind: RegionKind, cards: Vec<IdentifiedCard>) -> Self {
        Self {
            kind,
            cards,
            failure: None,
        }
    }

    pub fn failed(kind: RegionKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            cards: Vec::new(),
            failure: Some(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// One entry per slot, left to right; `None` marks an unresolved card
    pub fn labels(&self) -> Vec<Option<String>> {
        self.cards.iter().map(IdentifiedCard::label).collect()
    }

    /// Labels of resolved cards only, left to right
    pub fn resolved_labels(&self) -> Vec<String> {
        self.cards.iter().filter_map(IdentifiedCard::label).collect()
    }

    pub fn resolved_count(&self) -> usize {
        self.cards.iter().filter(|c| c.is_resolved()).count()
    }
}

/// Summary numbers for one analysis call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub cards_segmented: usize,
    pub cards_resolved: usize,
    pub cards_unresolved: usize,
    pub processing_time_ms: u64,
}

/// Community and hand reports produced by one analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub run_id: String,
    pub community: RegionReport,
    pub hand: RegionReport,
    pub stats: AnalysisStats,
}

impl AnalysisResult {
    pub fn region(&self, kind: RegionKind) -> &RegionReport {
        match kind {
            RegionKind::Community => &self.community,
            RegionKind::Hand => &self.hand,
        }
    }
}
