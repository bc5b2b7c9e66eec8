//! Template loading from a directory of labelled glyph images

use super::{GlyphTemplate, TemplateSet};
use crate::error::VisionError;
use crate::utils::image::ImageUtils;
use crate::Result;
use anyhow::Context;
use pokerlens_core::{Rank, Suit};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Builds a [`TemplateSet`] from glyph images whose file stems are labels.
///
/// Stems are compared case-insensitively and must be a label token exactly:
/// a suit name (`hearts`) becomes a suit template, a rank token (`a`, `10`,
/// `k`) a rank template. Anything else, `ace.png` included, is skipped.
pub struct TemplateLoader {
    template_dirs: Vec<PathBuf>,
    supported_extensions: Vec<String>,
}

impl TemplateLoader {
    /// Create new template loader
    pub fn new() -> Self {
        Self {
            template_dirs: Vec::new(),
            supported_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "bmp".to_string(),
            ],
        }
    }

    /// Add template directory
    pub fn add_template_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.template_dirs.push(dir.as_ref().to_path_buf());
        self
    }

    /// Load every rank and suit template from the configured directories.
    /// Later directories override earlier ones for the same label.
    pub fn load(&self) -> Result<TemplateSet> {
        let mut set = TemplateSet::new();

        for dir in &self.template_dirs {
            if !dir.is_dir() {
                return Err(VisionError::TemplateDir { path: dir.clone() }.into());
            }

            let mut paths: Vec<PathBuf> = fs::read_dir(dir)
                .with_context(|| format!("Failed to read directory: {:?}", dir))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| self.is_supported(path))
                .collect();
            paths.sort();

            for path in paths {
                set = self.load_into(set, &path)?;
            }
        }

        info!(
            "Loaded {} rank and {} suit templates",
            set.rank_count(),
            set.suit_count()
        );

        Ok(set)
    }

    fn load_into(&self, set: TemplateSet, path: &Path) -> Result<TemplateSet> {
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_lowercase()) else {
            return Ok(set);
        };

        if let Ok(suit) = stem.parse::<Suit>() {
            let image = ImageUtils::load_grayscale(path)?;
            debug!("Suit template {} from {:?}", suit, path);
            let template = GlyphTemplate::new(suit, image).with_source(path.to_path_buf());
            return Ok(set.with_suit(template));
        }

        match stem.parse::<Rank>() {
            Ok(rank) => {
                let image = ImageUtils::load_grayscale(path)?;
                debug!("Rank template {} from {:?}", rank, path);
                Ok(set.with_rank(GlyphTemplate::new(rank, image).with_source(path.to_path_buf())))
            }
            Err(e) => {
                warn!("Skipping template {:?}: {}", path, e);
                Ok(set)
            }
        }
    }

    fn is_supported(&self, path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .map(|ext| {
                    self.supported_extensions
                        .contains(&ext.to_string_lossy().to_lowercase())
                })
                .unwrap_or(false)
    }
}

impl Default for TemplateLoader {
    fn default() -> Self {
        Self::new()
    }
}
