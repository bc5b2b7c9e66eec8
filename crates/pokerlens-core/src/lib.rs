//! Pokerlens core data model
//!
//! Card labels, identification outcomes and per-region analysis reports.
//! Nothing here depends on OpenCV; the vision crate produces these values.

pub mod cards;
pub mod report;

pub use cards::{Card, IdentifiedCard, ParseCardError, Rank, Suit, SuitColor, UnresolvedReason};
pub use report::{AnalysisResult, AnalysisStats, RegionKind, RegionReport};
