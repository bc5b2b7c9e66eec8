//! Optional diagnostic images, written per run
//!
//! Every analysis call gets its own [`RunId`], and a [`DirectorySink`] writes
//! under `<root>/<run-id>/`, so concurrent runs never touch each other's files.

use crate::bbox::BBox;
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use opencv::{
    core::{Mat, Point, Scalar},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
};
use pokerlens_core::{IdentifiedCard, RegionKind};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique identifier of one analysis call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    /// Timestamp, process id and a process-wide counter
    pub fn new() -> Self {
        let seq = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3f");
        Self(format!("{}-{}-{}", stamp, std::process::id(), seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which glyph of a card a symbol artifact holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphKind {
    Rank,
    Suit,
}

/// One intermediate image of a run
pub enum Artifact<'a> {
    /// Whole region with card boxes and labels drawn on it
    Region {
        kind: RegionKind,
        image: &'a Mat,
        cards: &'a [(BBox, IdentifiedCard)],
    },
    /// Raw crop of a card before normalization
    ExtractedCard { kind: RegionKind, index: usize, image: &'a Mat },
    /// Card at canonical size
    ProcessedCard { kind: RegionKind, index: usize, image: &'a Mat },
    Symbol {
        kind: RegionKind,
        index: usize,
        glyph: GlyphKind,
        image: &'a Mat,
    },
}

/// Destination for diagnostic images. Failures are reported to the caller,
/// which logs them; they never change an analysis result.
pub trait DiagnosticSink: Send + Sync {
    /// Prepare a clean destination for `run`
    fn begin_run(&self, run: &RunId) -> Result<()>;

    fn record(&self, run: &RunId, artifact: &Artifact<'_>) -> Result<()>;

    /// `false` lets the pipeline skip building artifacts nobody keeps
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn begin_run(&self, _run: &RunId) -> Result<()> {
        Ok(())
    }

    fn record(&self, _run: &RunId, _artifact: &Artifact<'_>) -> Result<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Writes PNGs under `<root>/<run-id>/`, one subdirectory per artifact kind
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub const SUBDIRS: [&'static str; 4] = [
        "debug_png",
        "extracted_cards",
        "processed_cards",
        "processed_symbols",
    ];

    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn run_dir(&self, run: &RunId) -> PathBuf {
        self.root.join(run.as_str())
    }

    fn annotate(image: &Mat, cards: &[(BBox, IdentifiedCard)]) -> Result<Mat> {
        let mut output = ImageUtils::to_bgr(image)?;
        for (bbox, card) in cards {
            let color = if card.is_resolved() {
                Scalar::new(0.0, 200.0, 0.0, 0.0)
            } else {
                Scalar::new(0.0, 0.0, 255.0, 0.0)
            };
            imgproc::rectangle(&mut output, bbox.to_rect(), color, 2, LINE_8, 0)?;

            let label = card.label().unwrap_or_else(|| "?".to_string());
            imgproc::put_text(
                &mut output,
                &label,
                Point::new(bbox.x + 2, (bbox.y - 4).max(10)),
                FONT_HERSHEY_SIMPLEX,
                0.4,
                color,
                1,
                LINE_8,
                false,
            )?;
        }
        Ok(output)
    }
}

impl DiagnosticSink for DirectorySink {
    fn begin_run(&self, run: &RunId) -> Result<()> {
        let dir = self.run_dir(run);
        if dir.exists() {
            fs::remove_dir_all(&dir).with_context(|| format!("Failed to clear {:?}", dir))?;
        }
        for sub in Self::SUBDIRS {
            let path = dir.join(sub);
            fs::create_dir_all(&path).with_context(|| format!("Failed to create {:?}", path))?;
        }
        Ok(())
    }

    fn record(&self, run: &RunId, artifact: &Artifact<'_>) -> Result<()> {
        let dir = self.run_dir(run);
        match artifact {
            Artifact::Region { kind, image, cards } => {
                let annotated = Self::annotate(image, cards)?;
                let path = dir.join("debug_png").join(format!("{}.png", kind));
                ImageUtils::save_image(&annotated, path)
            }
            Artifact::ExtractedCard { kind, index, image } => ImageUtils::save_image(
                image,
                dir.join("extracted_cards").join(format!("{}_{}.png", kind, index)),
            ),
            Artifact::ProcessedCard { kind, index, image } => ImageUtils::save_image(
                image,
                dir.join("processed_cards").join(format!("{}_{}.png", kind, index)),
            ),
            Artifact::Symbol {
                kind,
                index,
                glyph,
                image,
            } => {
                let suffix = match glyph {
                    GlyphKind::Rank => "rank",
                    GlyphKind::Suit => "suit",
                };
                let name = format!("{}_{}_{}.png", kind, index, suffix);
                ImageUtils::save_image(image, dir.join("processed_symbols").join(name))
            }
        }
    }
}
