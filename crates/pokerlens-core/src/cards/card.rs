use super::{ParseCardError, Rank, Suit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fully labelled card. Displays as `rank_suit`, e.g. `k_hearts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.rank, self.suit)
    }
}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rank, suit) = s
            .split_once('_')
            .ok_or_else(|| ParseCardError::Label(s.to_string()))?;
        Ok(Card::new(rank.parse()?, suit.parse()?))
    }
}

/// Why a card slot carries no label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No ink contour in the corner index, or the derived suit area was empty
    NoGlyph,
    /// No rank template fitted inside the glyph at any scale
    NoRankMatch,
    RankBelowThreshold,
    SuitBelowThreshold,
    /// An image operation failed on this card; other cards are unaffected
    ProcessingFailed,
}

/// Outcome for one card slot. Unresolved is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IdentifiedCard {
    Resolved { card: Card, confidence: f64 },
    Unresolved { reason: UnresolvedReason },
}

impl IdentifiedCard {
    pub fn resolved(card: Card, confidence: f64) -> Self {
        IdentifiedCard::Resolved { card, confidence }
    }

    pub fn unresolved(reason: UnresolvedReason) -> Self {
        IdentifiedCard::Unresolved { reason }
    }

    pub fn card(&self) -> Option<Card> {
        match self {
            IdentifiedCard::Resolved { card, .. } => Some(*card),
            IdentifiedCard::Unresolved { .. } => None,
        }
    }

    pub fn rank(&self) -> Option<Rank> {
        self.card().map(|c| c.rank)
    }

    pub fn suit(&self) -> Option<Suit> {
        self.card().map(|c| c.suit)
    }

    pub fn confidence(&self) -> f64 {
        match self {
            IdentifiedCard::Resolved { confidence, .. } => *confidence,
            IdentifiedCard::Unresolved { .. } => 0.0,
        }
    }

    /// `rank_suit` label, or `None` for an unresolved slot
    pub fn label(&self) -> Option<String> {
        self.card().map(|c| c.label())
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, IdentifiedCard::Resolved { .. })
    }
}

impl fmt::Display for IdentifiedCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifiedCard::Resolved { card, confidence } => {
                write!(f, "{} ({:.2})", card, confidence)
            }
            IdentifiedCard::Unresolved { reason } => write!(f, "unresolved ({:?})", reason),
        }
    }
}
