//! Analysis configuration

use crate::error::VisionError;
use crate::resolve::{ResolverConfig, ResolverFlow};
use crate::segment::{SegmentationPlan, SplitKind, StrategyKind};
use crate::suit::SuitConfig;
use crate::symbol::SymbolConfig;
use crate::template::MatcherConfig;
use crate::Result;
use anyhow::Context;
use pokerlens_core::RegionKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub template_dir: PathBuf,
    /// Root for per-run diagnostic images; `None` disables them
    pub diagnostics_dir: Option<PathBuf>,
    pub segmentation: SegmentationConfig,
    pub symbols: SymbolConfig,
    pub matcher: MatcherConfig,
    pub suit: SuitConfig,
    pub resolver: ResolverConfig,
}

/// Segmentation plan per region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    pub community: SegmentationPlan,
    pub hand: SegmentationPlan,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            community: SegmentationPlan::community(),
            hand: SegmentationPlan::hand(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::four_color_deck()
    }
}

impl AnalysisConfig {
    /// Table skin with a four-colour deck: community cards use the
    /// four-colour glyph vote, the hand uses the whole-card red/black vote
    pub fn four_color_deck() -> Self {
        Self {
            template_dir: "assets/templates".into(),
            diagnostics_dir: None,
            segmentation: SegmentationConfig::default(),
            symbols: SymbolConfig::default(),
            matcher: MatcherConfig::default(),
            suit: SuitConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }

    /// Classic red/black deck: every region uses the red/black vote
    pub fn two_color_deck() -> Self {
        let mut config = Self::four_color_deck();
        config.resolver.community_flow = ResolverFlow::Improved;
        config.resolver.hand_flow = ResolverFlow::Improved;
        config
    }

    pub fn flow(&self, kind: RegionKind) -> ResolverFlow {
        match kind {
            RegionKind::Community => self.resolver.community_flow,
            RegionKind::Hand => self.resolver.hand_flow,
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write config: {:?}", path))?;
        Ok(())
    }

    /// Reject values that would make a stage degenerate
    pub fn validate(&self) -> Result<()> {
        let m = &self.matcher;
        if m.scale_steps == 0 {
            return invalid("matcher.scale_steps must be at least 1");
        }
        if !(m.scale_min > 0.0) || m.scale_min > m.scale_max {
            return invalid(format!(
                "matcher scale range {}..{} must be positive and ascending",
                m.scale_min, m.scale_max
            ));
        }

        for (name, value) in [
            ("resolver.rank_threshold", self.resolver.rank_threshold),
            ("resolver.suit_threshold", self.resolver.suit_threshold),
            ("suit.red_black.area_ratio", self.suit.red_black.area_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{} must lie in [0, 1], got {}", name, value));
            }
        }

        let plans = [
            ("community", &self.segmentation.community),
            ("hand", &self.segmentation.hand),
        ];
        for (region, plan) in plans {
            for strategy in std::iter::once(&plan.primary).chain(plan.fallback.as_ref()) {
                validate_strategy(region, strategy)?;
            }
            if plan.expected_cards == Some(0) {
                return invalid(format!("{} segmentation expects zero cards", region));
            }
        }
        Ok(())
    }
}

fn validate_strategy(region: &str, strategy: &StrategyKind) -> Result<()> {
    match strategy {
        StrategyKind::Contours {
            morphology_kernel: Some(k),
            ..
        } if *k < 1 => invalid(format!("{} morphology kernel must be positive, got {}", region, k)),
        StrategyKind::LargestContours { count: 0, .. } => {
            invalid(format!("{} largest-contours strategy keeps zero cards", region))
        }
        StrategyKind::Split {
            split: SplitKind::Asymmetric { fraction },
        } if !(*fraction > 0.0 && *fraction < 1.0) => {
            invalid(format!("{} split fraction must lie in (0, 1), got {}", region, fraction))
        }
        _ => Ok(()),
    }
}

fn invalid<T>(message: impl Into<String>) -> Result<T> {
    Err(VisionError::Config(message.into()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() -> Result<()> {
        AnalysisConfig::four_color_deck().validate()?;
        AnalysisConfig::two_color_deck().validate()?;
        assert_eq!(
            AnalysisConfig::two_color_deck().flow(RegionKind::Community),
            ResolverFlow::Improved
        );
        assert_eq!(
            AnalysisConfig::default().flow(RegionKind::Community),
            ResolverFlow::Baseline
        );
        Ok(())
    }

    #[test]
    fn test_degenerate_values_are_rejected() {
        let mut config = AnalysisConfig::default();
        config.matcher.scale_steps = 0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.matcher.scale_min = 3.0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.segmentation.hand.fallback = Some(StrategyKind::Split {
            split: SplitKind::Asymmetric { fraction: 1.5 },
        });
        let err = config.validate().unwrap_err();
        assert!(matches!(err.downcast_ref::<VisionError>(), Some(VisionError::Config(_))));
    }

    #[test]
    fn test_json_file_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");

        let mut config = AnalysisConfig::two_color_deck();
        config.diagnostics_dir = Some("debug".into());
        config.to_json_file(&path)?;

        let loaded = AnalysisConfig::from_json_file(&path)?;
        assert_eq!(loaded.diagnostics_dir, Some(PathBuf::from("debug")));
        assert_eq!(loaded.resolver.hand_flow, ResolverFlow::Improved);
        assert_eq!(loaded.segmentation, config.segmentation);
        Ok(())
    }
}
