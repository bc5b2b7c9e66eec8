//! Card identity types

pub mod card;
pub mod rank;
pub mod suit;

pub use card::{Card, IdentifiedCard, UnresolvedReason};
pub use rank::Rank;
pub use suit::{Suit, SuitColor};

use thiserror::Error;

/// Failure to parse a rank, suit or `rank_suit` label token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCardError {
    #[error("unknown rank token: {0:?}")]
    Rank(String),
    #[error("unknown suit token: {0:?}")]
    Suit(String),
    #[error("malformed card label (expected rank_suit): {0:?}")]
    Label(String),
}
