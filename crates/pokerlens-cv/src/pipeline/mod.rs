//! High-level analysis module

pub mod analyzer;
pub mod config;
pub mod diagnostics;

pub use analyzer::CardAnalyzer;
pub use config::{AnalysisConfig, SegmentationConfig};
pub use diagnostics::{Artifact, DiagnosticSink, DirectorySink, GlyphKind, NullSink, RunId};
