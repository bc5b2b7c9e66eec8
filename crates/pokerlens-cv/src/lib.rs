//! Pokerlens Computer Vision Library
//!
//! Reads the community cards and the player's hand from poker table captures
//! with OpenCV: card segmentation, corner-glyph extraction, multi-scale rank
//! template matching and colour-band suit classification.

pub mod bbox;
pub mod error;
pub mod pipeline;
pub mod resolve;
pub mod segment;
pub mod suit;
pub mod symbol;
pub mod template;
pub mod utils;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used types
pub use bbox::BBox;
pub use error::VisionError;
pub use pipeline::{AnalysisConfig, CardAnalyzer, DiagnosticSink, DirectorySink, NullSink, RunId};
pub use resolve::{CardResolver, CardStage, Resolution, ResolverConfig, ResolverFlow};
pub use segment::{
    CardCandidate, SegmentationPlan, SegmentationPolicy, SegmentationStrategy, StrategyKind,
};
pub use suit::{SuitClassifier, SuitConfig, SuitStrategy, SuitVerdict};
pub use symbol::{SymbolConfig, SymbolExtractor, SymbolPair};
pub use template::{
    GlyphTemplate, MatchingMethod, MatcherConfig, TemplateLoader, TemplateMatcher, TemplateSet,
};

// Error handling
pub type Result<T> = anyhow::Result<T>;
